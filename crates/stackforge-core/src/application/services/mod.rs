pub mod generation_service;
pub mod registry;
pub mod validator;

pub use generation_service::{GenerationOutcome, GenerationService};
pub use registry::GeneratorRegistry;
