//! Application ports (traits) for external collaborators.
//!
//! ## Port Types
//!
//! - **Driven Ports**: Called by the application, implemented elsewhere
//!   - `Generator`: renders one facet of a stack into file artifacts
//!     (implemented in `stackforge-generators`)

pub mod generator;

pub use generator::{Generator, GeneratorOutput};

#[cfg(test)]
pub use generator::MockGenerator;
