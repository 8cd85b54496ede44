//! Engine configuration.
//!
//! [`EngineConfig`] is loaded once and handed to the [`Engine`](crate::Engine)
//! by value. The core crates never see it.
//!
//! # Resolution order (highest priority first)
//!
//! 1. `STACKFORGE_*` environment variables, `__` between nested keys
//!    (`STACKFORGE_LOG__LEVEL=debug`, `STACKFORGE_INFRA__DEFAULT_ENVIRONMENTS=dev,prod`)
//! 2. TOML file: the explicit path, else [`EngineConfig::config_path`] if present
//! 3. Built-in defaults

use std::path::{Path, PathBuf};

use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use stackforge_core::domain::entities::{DEFAULT_ENVIRONMENT, DEFAULT_LOCATION};
use tracing::debug;

use crate::error::EngineResult;

const ENV_PREFIX: &str = "STACKFORGE";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Fan generators out on the rayon pool.
    pub parallel: bool,
    /// Run the heuristic validator after generation.
    pub validate: bool,
    pub log: LogConfig,
    pub infra: InfraDefaults,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub level: String,
    pub json: bool,
}

/// Values applied to infrastructure selections that leave them out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InfraDefaults {
    pub default_environments: Vec<String>,
    pub default_location: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            parallel: true,
            validate: true,
            log: LogConfig::default(),
            infra: InfraDefaults::default(),
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "warn".into(),
            json: false,
        }
    }
}

impl Default for InfraDefaults {
    fn default() -> Self {
        Self {
            default_environments: vec![DEFAULT_ENVIRONMENT.into()],
            default_location: DEFAULT_LOCATION.into(),
        }
    }
}

impl EngineConfig {
    /// Load configuration from defaults, a TOML file and the process
    /// environment.
    ///
    /// An explicit `config_file` must exist; the default location is optional.
    pub fn load(config_file: Option<&Path>) -> EngineResult<Self> {
        Self::load_from(config_file, None)
    }

    /// Same as [`load`](Self::load) with the environment taken from `env`
    /// instead of the process when given.
    pub fn load_from(
        config_file: Option<&Path>,
        env: Option<config::Map<String, String>>,
    ) -> EngineResult<Self> {
        let (path, required) = match config_file {
            Some(path) => (path.to_path_buf(), true),
            None => (Self::config_path(), false),
        };
        debug!(path = %path.display(), required, "Loading engine configuration");

        let settings = Config::builder()
            .add_source(Config::try_from(&Self::default())?)
            .add_source(
                File::from(path.as_path())
                    .format(FileFormat::Toml)
                    .required(required),
            )
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("infra.default_environments")
                    .source(env),
            )
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    /// Path to the default configuration file.
    ///
    /// Uses `directories::ProjectDirs`, falling back to `.stackforge.toml` in
    /// the current directory.
    pub fn config_path() -> PathBuf {
        directories::ProjectDirs::from("dev", "stackforge", "stackforge")
            .map(|d| d.config_dir().join("config.toml"))
            .unwrap_or_else(|| PathBuf::from(".stackforge.toml"))
    }
}
