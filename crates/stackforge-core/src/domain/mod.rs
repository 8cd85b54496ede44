//! Core domain layer for StackForge.
//!
//! Pure business logic: no I/O, no logging, no async. Generators and the
//! validator consume these types through the application layer.
//!
//! - [`entities`]: the request (`StackDescriptor`, `GenerationContext`) and
//!   the results (`FileArtifact`, `ValidationSummary`)
//! - [`transform`]: case and type mapping shared by every generator
//! - [`operations`]: endpoint derivation with the default CRUD set
//! - [`infra`]: capability → resource resolution and dependency ordering

pub mod entities;
pub mod error;
pub mod infra;
pub mod operations;
pub mod transform;
pub mod value_objects;

mod validation;

pub use entities::{
    ArchitectureChoices, ArtifactKind, Binding, ComponentSpec, DatabaseSelection, Entity, Field,
    FileArtifact, GenerationContext, InfraSelection, OperationDecl, ProjectInfo, Relation,
    RelationKind, ServerSelection, Severity, StackDescriptor, StackDescriptorBuilder, UiSelection,
    ValidationFinding, ValidationSummary,
};
pub use error::{DomainError, ErrorCategory};
pub use operations::{HttpMethod, Operation, OperationKind, resolve_operations};
pub use validation::DomainValidator;
pub use value_objects::{
    AuthScheme, DatabaseEngine, Facet, InfraCapability, InfraPlatform, ModelFlavor,
    ServerFramework, StateManagement, Styling, UiFramework,
};
