//! Facade errors.
//!
//! Wraps the core [`SynthError`] and adds the failures that only exist at
//! this layer: configuration sources, request manifests and output files.

use std::path::PathBuf;

use stackforge_core::error::SynthError;
use thiserror::Error;

/// Result type alias for facade operations.
pub type EngineResult<T> = Result<T, EngineError>;

#[derive(Debug, Error)]
pub enum EngineError {
    /// A configuration source could not be read or did not deserialize.
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// The manifest file could not be read.
    #[error("Cannot read manifest {path}: {source}")]
    ManifestIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The manifest was read but its content is not a valid request.
    #[error("Invalid manifest {path}: {reason}")]
    Manifest { path: PathBuf, reason: String },

    /// An artifact could not be written below the output directory.
    #[error("Cannot write {path}: {source}")]
    Output {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Unsupported manifest format '{extension}' for {path}")]
    UnsupportedManifest { path: PathBuf, extension: String },

    #[error(transparent)]
    Synthesis(#[from] SynthError),
}

impl EngineError {
    pub fn manifest(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::Manifest {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// Actionable hints for the caller.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::Config(_) => vec![
                "Check the TOML syntax of the configuration file".into(),
                "STACKFORGE_* variables use '__' between nested keys, e.g. STACKFORGE_LOG__LEVEL"
                    .into(),
            ],
            Self::ManifestIo { path, .. } => vec![format!(
                "Verify that {} exists and is readable",
                path.display()
            )],
            Self::Manifest { .. } => vec![
                "A manifest needs a 'stack' table and a 'context' table with a 'project'".into(),
            ],
            Self::Output { path, .. } => vec![format!(
                "Check that {} is writable and not an existing file",
                path.display()
            )],
            Self::UnsupportedManifest { .. } => {
                vec!["Use a .json or .toml manifest".into()]
            }
            Self::Synthesis(e) => e.suggestions(),
        }
    }
}
