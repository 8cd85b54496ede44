//! StackForge Core - multi-target code synthesis engine
//!
//! This crate provides the domain and application layers of the engine,
//! following hexagonal (ports and adapters) architecture.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │        stackforge (Engine facade)       │
//! │   config, logging, request manifests    │
//! └──────────────────┬──────────────────────┘
//!                    │ calls
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │          Application Services           │
//! │  GeneratorRegistry, GenerationService,  │
//! │          heuristic validator            │
//! └──────────────────┬──────────────────────┘
//!                    │ dispatches through
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │       Application Port: Generator       │
//! │ implemented in stackforge-generators    │
//! └──────────────────┬──────────────────────┘
//!                    │
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │         Domain Layer (Pure Logic)       │
//! │ StackDescriptor, GenerationContext,     │
//! │ operations, transforms, infra resolver  │
//! └─────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use stackforge_core::prelude::*;
//!
//! # fn generator() -> Arc<dyn Generator> { unimplemented!() }
//! let stack = StackDescriptor::builder()
//!     .server(ServerFramework::Express)
//!     .database(DatabaseEngine::PostgreSql)
//!     .build()
//!     .unwrap();
//! let ctx = GenerationContext::new(ProjectInfo::new("billing"));
//!
//! let mut registry = GeneratorRegistry::new();
//! registry.register(generator());
//!
//! let outcome = GenerationService::new(registry).run(&stack, &ctx).unwrap();
//! println!("{} files", outcome.artifacts.len());
//! ```

pub mod application;
pub mod domain;
pub mod error;

/// Public API - what external crates should use.
pub mod prelude {
    pub use crate::application::{
        ApplicationError, GenerationError, GenerationOutcome, GenerationService,
        GeneratorRegistry,
        ports::{Generator, GeneratorOutput},
        validator::{LanguageFamily, validate_artifacts},
    };
    pub use crate::domain::{
        ArchitectureChoices, ArtifactKind, AuthScheme, Binding, ComponentSpec, DatabaseEngine,
        DomainError, Entity, Facet, Field, FileArtifact, GenerationContext, InfraCapability,
        InfraPlatform, InfraSelection, ModelFlavor, OperationDecl, ProjectInfo, Relation,
        ServerFramework, Severity, StackDescriptor, StateManagement, Styling, UiFramework,
        ValidationFinding, ValidationSummary,
    };
    pub use crate::error::{SynthError, SynthResult};
}
