//! Request manifests: a stack selection and a generation context in one file.
//!
//! ```toml
//! [stack.server]
//! framework = "express"
//!
//! [stack.database]
//! engine = "postgres"
//!
//! [context.project]
//! name = "invoice-desk"
//!
//! [[context.entities]]
//! name = "Invoice"
//! fields = ["amount:decimal", "dueDate:date", "status:string"]
//! ```

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use stackforge_core::{
    domain::{DomainValidator, GenerationContext, StackDescriptor},
    error::SynthError,
};
use tracing::debug;

use crate::{
    config::InfraDefaults,
    error::{EngineError, EngineResult},
};

/// Manifest encodings, chosen by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManifestFormat {
    Json,
    Toml,
}

impl ManifestFormat {
    pub fn from_path(path: &Path) -> EngineResult<Self> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        match extension.as_str() {
            "json" => Ok(Self::Json),
            "toml" => Ok(Self::Toml),
            _ => Err(EngineError::UnsupportedManifest {
                path: path.to_path_buf(),
                extension,
            }),
        }
    }
}

impl fmt::Display for ManifestFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json => write!(f, "json"),
            Self::Toml => write!(f, "toml"),
        }
    }
}

/// One synthesis request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SynthesisRequest {
    pub stack: StackDescriptor,
    pub context: GenerationContext,
}

impl SynthesisRequest {
    pub fn new(stack: StackDescriptor, context: GenerationContext) -> Self {
        Self { stack, context }
    }

    /// Read and decode a manifest file; the format follows the extension.
    pub fn load(path: &Path) -> EngineResult<Self> {
        let format = ManifestFormat::from_path(path)?;
        let text = fs::read_to_string(path).map_err(|source| EngineError::ManifestIo {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), %format, bytes = text.len(), "Read manifest");
        Self::decode(&text, format, path)
    }

    /// Decode manifest text that did not come from a file.
    pub fn parse(text: &str, format: ManifestFormat) -> EngineResult<Self> {
        Self::decode(text, format, Path::new("<inline>"))
    }

    fn decode(text: &str, format: ManifestFormat, origin: &Path) -> EngineResult<Self> {
        let request: Self = match format {
            ManifestFormat::Json => {
                serde_json::from_str(text).map_err(|e| EngineError::manifest(origin, e))?
            }
            ManifestFormat::Toml => {
                toml::from_str(text).map_err(|e| EngineError::manifest(origin, e))?
            }
        };
        DomainValidator::validate_descriptor(&request.stack).map_err(SynthError::from)?;
        Ok(request)
    }

    /// Fill a missing infrastructure environment list or location from
    /// `defaults`. Declared values are kept.
    pub fn with_infra_defaults(self, defaults: &InfraDefaults) -> EngineResult<Self> {
        let Some(current) = self.stack.infrastructure() else {
            return Ok(self);
        };
        if !current.environments.is_empty() && current.location.is_some() {
            return Ok(self);
        }

        let mut infra = current.clone();
        if infra.environments.is_empty() {
            infra.environments = defaults.default_environments.clone();
        }
        if infra.location.is_none() {
            infra.location = Some(defaults.default_location.clone());
        }
        let stack = self
            .stack
            .into_builder()
            .infrastructure(infra)
            .build()
            .map_err(SynthError::from)?;
        Ok(Self {
            stack,
            context: self.context,
        })
    }

    /// Write this request as a manifest in `format`.
    pub fn save(&self, path: &Path, format: ManifestFormat) -> EngineResult<PathBuf> {
        let text = match format {
            ManifestFormat::Json => {
                serde_json::to_string_pretty(self).map_err(|e| EngineError::manifest(path, e))?
            }
            ManifestFormat::Toml => {
                toml::to_string_pretty(self).map_err(|e| EngineError::manifest(path, e))?
            }
        };
        fs::write(path, text).map_err(|source| EngineError::ManifestIo {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(path.to_path_buf())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stackforge_core::domain::{Facet, InfraCapability, ServerFramework};

    const JSON: &str = r#"{
        "stack": {
            "server": { "framework": "express", "port": 3000 },
            "infrastructure": { "platform": "bicep", "capabilities": ["compute", "telemetry"] }
        },
        "context": {
            "project": { "name": "invoice-desk" },
            "entities": [{ "name": "Invoice", "fields": ["amount:decimal", "notes:string?"] }]
        }
    }"#;

    #[test]
    fn format_follows_extension_case_insensitively() {
        assert_eq!(
            ManifestFormat::from_path(Path::new("stack.JSON")).unwrap(),
            ManifestFormat::Json
        );
        assert_eq!(
            ManifestFormat::from_path(Path::new("a/b/stack.toml")).unwrap(),
            ManifestFormat::Toml
        );
        assert!(matches!(
            ManifestFormat::from_path(Path::new("stack.yaml")),
            Err(EngineError::UnsupportedManifest { ref extension, .. }) if extension == "yaml"
        ));
        assert!(ManifestFormat::from_path(Path::new("stack")).is_err());
    }

    #[test]
    fn parses_json_with_aliases_and_shorthand_fields() {
        let request = SynthesisRequest::parse(JSON, ManifestFormat::Json).unwrap();
        assert_eq!(
            request.stack.server().unwrap().framework,
            ServerFramework::Express
        );
        assert_eq!(request.stack.server().unwrap().port, 3000);
        assert_eq!(
            request.stack.infrastructure().unwrap().capabilities,
            vec![InfraCapability::ComputeHosting, InfraCapability::Telemetry]
        );
        let invoice = request.context.entity("invoices").unwrap();
        assert!(invoice.field("amount").unwrap().is_required());
        assert!(!invoice.field("notes").unwrap().is_required());
    }

    #[test]
    fn empty_stack_is_rejected_after_decoding() {
        let text = r#"{ "stack": {}, "context": { "project": { "name": "x" } } }"#;
        assert!(matches!(
            SynthesisRequest::parse(text, ManifestFormat::Json),
            Err(EngineError::Synthesis(_))
        ));
    }

    #[test]
    fn syntax_errors_become_manifest_errors() {
        let err = SynthesisRequest::parse("[stack", ManifestFormat::Toml).unwrap_err();
        assert!(matches!(err, EngineError::Manifest { .. }));
    }

    #[test]
    fn infra_defaults_fill_only_missing_values() {
        let defaults = InfraDefaults {
            default_environments: vec!["dev".into(), "prod".into()],
            default_location: "westeurope".into(),
        };
        let request = SynthesisRequest::parse(JSON, ManifestFormat::Json)
            .unwrap()
            .with_infra_defaults(&defaults)
            .unwrap();
        let infra = request.stack.infrastructure().unwrap();
        assert_eq!(infra.environments(), vec!["dev", "prod"]);
        assert_eq!(infra.location(), "westeurope");
        assert_eq!(request.stack.server().unwrap().port, 3000);

        let declared = JSON.replace(
            r#""capabilities": ["compute", "telemetry"]"#,
            r#""capabilities": ["compute"], "environments": ["test"], "location": "uksouth""#,
        );
        let request = SynthesisRequest::parse(&declared, ManifestFormat::Json)
            .unwrap()
            .with_infra_defaults(&defaults)
            .unwrap();
        let infra = request.stack.infrastructure().unwrap();
        assert_eq!(infra.environments(), vec!["test"]);
        assert_eq!(infra.location(), "uksouth");
    }

    #[test]
    fn stacks_without_infrastructure_are_untouched() {
        let text = r#"{ "stack": { "ui": { "framework": "react" } }, "context": { "project": { "name": "x" } } }"#;
        let request = SynthesisRequest::parse(text, ManifestFormat::Json).unwrap();
        let filled = request
            .clone()
            .with_infra_defaults(&InfraDefaults::default())
            .unwrap();
        assert_eq!(filled, request);
        assert!(filled.stack.requests(Facet::Ui));
    }
}
