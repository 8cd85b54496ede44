//! End-to-end synthesis: request in, validated artifacts out.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context as _;
use stackforge_core::{
    application::{GenerationOutcome, GenerationService, GeneratorRegistry},
    domain::Facet,
};
use stackforge_generators::builtin_registry;
use tracing::{info, instrument, warn};

use crate::{
    config::EngineConfig,
    error::{EngineError, EngineResult},
    manifest::SynthesisRequest,
};

/// The engine facade: configuration plus a dispatcher over a registry.
#[derive(Debug, Clone)]
pub struct Engine {
    config: EngineConfig,
    service: GenerationService,
}

impl Engine {
    /// An engine over every builtin generator.
    pub fn new(config: EngineConfig) -> Self {
        Self::with_registry(config, builtin_registry())
    }

    pub fn with_registry(config: EngineConfig, registry: GeneratorRegistry) -> Self {
        let service = GenerationService::new(registry).with_parallel(config.parallel);
        Self { config, service }
    }

    /// Load configuration from `config_file` (or the default sources) and
    /// build an engine over the builtin generators.
    pub fn from_config_file(config_file: Option<&Path>) -> anyhow::Result<Self> {
        let config = EngineConfig::load(config_file).with_context(|| match config_file {
            Some(path) => format!("Failed to load configuration from {}", path.display()),
            None => "Failed to load configuration".to_string(),
        })?;
        Ok(Self::new(config))
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn registry(&self) -> &GeneratorRegistry {
        self.service.registry()
    }

    /// Generate every requested facet.
    pub fn synthesize(&self, request: &SynthesisRequest) -> EngineResult<GenerationOutcome> {
        let facets = request.stack.requested_facets();
        self.regenerate(request, &facets)
    }

    /// Generate only `facets` of the request.
    #[instrument(skip_all, fields(project = %request.context.project.name, facets = ?facets))]
    pub fn regenerate(
        &self,
        request: &SynthesisRequest,
        facets: &[Facet],
    ) -> EngineResult<GenerationOutcome> {
        let request = request.clone().with_infra_defaults(&self.config.infra)?;
        let mut outcome = self
            .service
            .run_facets(&request.stack, &request.context, facets)?;

        if !outcome.is_complete() {
            warn!(
                failures = outcome.failures.len(),
                "Synthesis finished with generator failures"
            );
        }
        if self.config.validate {
            let summary = outcome.validate();
            info!(
                files = summary.files_checked,
                errors = summary.error_count(),
                findings = summary.findings.len(),
                "Validated artifacts"
            );
        }
        Ok(outcome)
    }

    /// Load a manifest and synthesize it.
    pub fn synthesize_manifest(&self, path: &Path) -> EngineResult<GenerationOutcome> {
        self.synthesize(&SynthesisRequest::load(path)?)
    }
}

/// Write every artifact below `root`, creating directories as needed.
///
/// Returns the written paths in artifact order.
pub fn write_artifacts(outcome: &GenerationOutcome, root: &Path) -> EngineResult<Vec<PathBuf>> {
    let mut written = Vec::with_capacity(outcome.artifacts.len());
    for artifact in &outcome.artifacts {
        let path = root.join(artifact.path());
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| EngineError::Output {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        fs::write(&path, artifact.content()).map_err(|source| EngineError::Output {
            path: path.clone(),
            source,
        })?;
        written.push(path);
    }
    info!(files = written.len(), root = %root.display(), "Wrote artifacts");
    Ok(written)
}
