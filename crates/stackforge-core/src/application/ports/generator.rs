//! The generator capability contract.

use crate::application::error::GenerationError;
use crate::domain::{Facet, FileArtifact, GenerationContext, StackDescriptor};

/// What one `generate` call produced.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GeneratorOutput {
    pub artifacts: Vec<FileArtifact>,
    pub errors: Vec<GenerationError>,
}

impl GeneratorOutput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, artifact: FileArtifact) {
        self.artifacts.push(artifact);
    }

    pub fn fail(&mut self, error: GenerationError) {
        self.errors.push(error);
    }

    pub fn is_complete(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Renders one facet of a stack.
///
/// Implementations are stateless and shared across concurrent runs: they
/// read the context by shared reference and never mutate anything outside
/// the returned output. The registry dispatches purely through this trait.
#[cfg_attr(test, mockall::automock)]
pub trait Generator: Send + Sync {
    /// Stable identifier recorded on every artifact (`express-server`).
    fn id(&self) -> &'static str;

    fn facet(&self) -> Facet;

    /// Whether this generator can render `descriptor`'s selection for its facet.
    fn supports(&self, descriptor: &StackDescriptor) -> bool;

    /// Higher runs (and is merged) first.
    fn priority(&self) -> i32;

    /// A blocking generator owns the application entry point: any error it
    /// reports fails the whole run.
    fn is_blocking(&self) -> bool {
        false
    }

    /// Produce artifacts for `ctx`. A unit that cannot be rendered is
    /// reported in `errors`; everything else is still returned.
    fn generate(&self, ctx: &GenerationContext, descriptor: &StackDescriptor) -> GeneratorOutput;
}
