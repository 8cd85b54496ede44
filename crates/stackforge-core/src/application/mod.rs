//! Application layer for StackForge.
//!
//! This layer contains:
//! - **Ports**: the `Generator` contract concrete generators implement
//! - **Services**: the registry, the dispatching `GenerationService` and the
//!   heuristic validator
//! - **Errors**: fatal `ApplicationError`s and non-fatal `GenerationError`s
//!
//! The application layer coordinates the domain layer and owns all logging;
//! business rules live in `crate::domain`.

pub mod error;
pub mod ports;
pub mod services;

pub use error::{ApplicationError, GenerationError};
pub use ports::{Generator, GeneratorOutput};
pub use services::{GenerationOutcome, GenerationService, GeneratorRegistry, validator};
