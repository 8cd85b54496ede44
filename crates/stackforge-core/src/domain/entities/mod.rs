pub mod artifact;
pub mod context;
pub mod descriptor;
pub mod finding;

pub use crate::domain::DomainError;
pub use artifact::{ArtifactKind, FileArtifact};
pub use context::{
    ArchitectureChoices, Binding, ComponentSpec, Entity, Field, GenerationContext, OperationDecl,
    ProjectInfo, Relation, RelationKind,
};
pub use descriptor::{
    DEFAULT_ENVIRONMENT, DEFAULT_LOCATION, DatabaseSelection, InfraSelection, ServerSelection,
    StackDescriptor, StackDescriptorBuilder, UiSelection,
};
pub use finding::{Severity, ValidationFinding, ValidationSummary};
