//! Manifest-to-disk runs through the facade.

use std::fs;

use stackforge::{
    Engine, EngineConfig, EngineError, ManifestFormat, SynthesisRequest, write_artifacts,
};
use stackforge_core::domain::{ArtifactKind, Facet};
use tempfile::TempDir;

const INVOICE_MANIFEST: &str = r#"
[stack.server]
framework = "express"

[stack.database]
engine = "postgres"

[stack.infrastructure]
platform = "bicep"
capabilities = ["compute", "sql"]

[context.project]
name = "invoice-desk"

[[context.entities]]
name = "Invoice"
fields = ["amount:decimal", "dueDate:date", "status:string"]
"#;

fn manifest(dir: &TempDir, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

#[test]
fn toml_manifest_synthesizes_and_writes_to_disk() {
    let dir = TempDir::new().unwrap();
    let path = manifest(&dir, "invoice.toml", INVOICE_MANIFEST);

    let engine = Engine::new(EngineConfig::default());
    let outcome = engine.synthesize_manifest(&path).unwrap();
    assert!(outcome.is_complete(), "{:?}", outcome.failures);

    let summary = outcome.validation.as_ref().unwrap();
    assert_eq!(summary.error_count(), 0, "{:?}", summary.findings);
    assert_eq!(summary.files_checked, outcome.artifacts.len());

    let routes: Vec<&str> = outcome
        .artifacts
        .iter()
        .filter(|a| a.kind() == ArtifactKind::Route)
        .map(|a| a.path())
        .collect();
    assert_eq!(routes, vec!["api/src/routes/invoice.routes.ts"]);
    assert!(
        outcome
            .artifact("infra/parameters/main.dev.parameters.json")
            .is_some()
    );

    let out = dir.path().join("out");
    let written = write_artifacts(&outcome, &out).unwrap();
    assert_eq!(written.len(), outcome.artifacts.len());
    let route = fs::read_to_string(out.join("api/src/routes/invoice.routes.ts")).unwrap();
    assert_eq!(route, outcome.artifact(routes[0]).unwrap().content());
}

#[test]
fn configured_infra_defaults_reach_the_parameter_files() {
    let dir = TempDir::new().unwrap();
    let config_path = manifest(
        &dir,
        "config.toml",
        "validate = false\n\n[infra]\ndefault_environments = [\"staging\", \"prod\"]\ndefault_location = \"northeurope\"\n",
    );
    let path = manifest(&dir, "invoice.toml", INVOICE_MANIFEST);

    let engine = Engine::from_config_file(Some(&config_path)).unwrap();
    let outcome = engine.synthesize_manifest(&path).unwrap();

    assert!(outcome.validation.is_none());
    assert!(
        outcome
            .artifact("infra/parameters/main.dev.parameters.json")
            .is_none()
    );
    let prod = outcome
        .artifact("infra/parameters/main.prod.parameters.json")
        .unwrap()
        .content();
    assert!(prod.contains("\"northeurope\""));
    assert!(
        outcome
            .artifact("infra/parameters/main.staging.parameters.json")
            .is_some()
    );
}

#[test]
fn saved_json_manifest_loads_back() {
    let dir = TempDir::new().unwrap();
    let original = SynthesisRequest::parse(INVOICE_MANIFEST, ManifestFormat::Toml).unwrap();
    let path = original
        .save(&dir.path().join("invoice.json"), ManifestFormat::Json)
        .unwrap();

    let loaded = SynthesisRequest::load(&path).unwrap();
    assert_eq!(loaded, original);
}

#[test]
fn subset_regeneration_through_the_facade() {
    let request = SynthesisRequest::parse(INVOICE_MANIFEST, ManifestFormat::Toml).unwrap();
    let outcome = Engine::new(EngineConfig::default())
        .regenerate(&request, &[Facet::Infrastructure])
        .unwrap();
    assert!(outcome.artifacts.iter().all(|a| a.generator() == "bicep-infra"));
}

#[test]
fn unsupported_and_missing_manifests_are_typed_errors() {
    let dir = TempDir::new().unwrap();
    let engine = Engine::new(EngineConfig::default());

    let yaml = manifest(&dir, "invoice.yaml", "stack: {}\n");
    let err = engine.synthesize_manifest(&yaml).unwrap_err();
    assert!(matches!(err, EngineError::UnsupportedManifest { .. }));

    let err = engine
        .synthesize_manifest(&dir.path().join("absent.json"))
        .unwrap_err();
    assert!(matches!(err, EngineError::ManifestIo { .. }));
    assert!(!err.suggestions().is_empty());
}

#[test]
fn missing_explicit_config_file_fails_with_context() {
    let dir = TempDir::new().unwrap();
    let err = Engine::from_config_file(Some(&dir.path().join("nope.toml"))).unwrap_err();
    assert!(err.to_string().contains("Failed to load configuration"));
}
