//! StackForge - multi-target code synthesis engine.
//!
//! This crate wires the engine together for callers: it loads
//! [`EngineConfig`], installs the tracing subscriber, reads
//! [`SynthesisRequest`] manifests and runs them through the builtin
//! generators.
//!
//! ```rust,no_run
//! use std::path::Path;
//! use stackforge::{Engine, EngineConfig, init_logging, write_artifacts};
//!
//! # fn main() -> anyhow::Result<()> {
//! let config = EngineConfig::load(None)?;
//! init_logging(&config.log)?;
//!
//! let engine = Engine::new(config);
//! let outcome = engine.synthesize_manifest(Path::new("invoice-desk.toml"))?;
//! write_artifacts(&outcome, Path::new("out"))?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod logging;
pub mod manifest;

pub use config::{EngineConfig, InfraDefaults, LogConfig};
pub use engine::{Engine, write_artifacts};
pub use error::{EngineError, EngineResult};
pub use logging::init_logging;
pub use manifest::{ManifestFormat, SynthesisRequest};

/// Core types callers need alongside the facade.
pub mod prelude {
    pub use crate::{Engine, EngineConfig, EngineError, SynthesisRequest};
    pub use stackforge_core::prelude::*;
}
