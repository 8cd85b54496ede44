//! The `StackDescriptor`: which facets one synthesis run targets.
//!
//! A descriptor is immutable once built. Every present selection is a facet
//! the run *must* cover; the dispatcher raises a configuration error if no
//! registered generator supports one of them.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

use crate::domain::{
    error::DomainError,
    transform::validate_identifier,
    value_objects::{
        DatabaseEngine, Facet, InfraCapability, InfraPlatform, ModelFlavor, ServerFramework,
        UiFramework,
    },
};

/// Location used when an infrastructure selection names none.
pub const DEFAULT_LOCATION: &str = "eastus";

/// Environment used when an infrastructure selection names none.
pub const DEFAULT_ENVIRONMENT: &str = "dev";

// ── Facet selections ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UiSelection {
    pub framework: UiFramework,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerSelection {
    pub framework: ServerFramework,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_port() -> u16 {
    8080
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseSelection {
    pub engine: DatabaseEngine,
    /// Explicit model flavour; inferred from the server facet when absent.
    #[serde(default)]
    pub models: Option<ModelFlavor>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InfraSelection {
    pub platform: InfraPlatform,
    pub capabilities: Vec<InfraCapability>,
    #[serde(default)]
    pub environments: Vec<String>,
    #[serde(default)]
    pub location: Option<String>,
}

impl InfraSelection {
    pub fn new(platform: InfraPlatform, capabilities: impl IntoIterator<Item = InfraCapability>) -> Self {
        Self {
            platform,
            capabilities: capabilities.into_iter().collect(),
            environments: Vec::new(),
            location: None,
        }
    }

    pub fn with_environments<I, S>(mut self, environments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.environments = environments.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Requested capabilities, deduplicated, in canonical order.
    pub fn normalized_capabilities(&self) -> Vec<InfraCapability> {
        let mut caps = self.capabilities.clone();
        caps.sort();
        caps.dedup();
        caps
    }

    /// Target environments; `[DEFAULT_ENVIRONMENT]` when none are declared.
    pub fn environments(&self) -> Vec<&str> {
        if self.environments.is_empty() {
            vec![DEFAULT_ENVIRONMENT]
        } else {
            self.environments.iter().map(String::as_str).collect()
        }
    }

    pub fn location(&self) -> &str {
        self.location.as_deref().unwrap_or(DEFAULT_LOCATION)
    }
}

// ── Aggregate ────────────────────────────────────────────────────────────────

/// The set of requested facets plus per-facet configuration for one run.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StackDescriptor {
    #[serde(default)]
    ui: Option<UiSelection>,
    #[serde(default)]
    server: Option<ServerSelection>,
    #[serde(default)]
    database: Option<DatabaseSelection>,
    #[serde(default)]
    infrastructure: Option<InfraSelection>,
}

impl StackDescriptor {
    pub fn builder() -> StackDescriptorBuilder {
        StackDescriptorBuilder::default()
    }

    /// Reopen the selections for changes; `build` validates again.
    pub fn into_builder(self) -> StackDescriptorBuilder {
        StackDescriptorBuilder { inner: self }
    }

    pub fn ui(&self) -> Option<&UiSelection> {
        self.ui.as_ref()
    }
    pub fn server(&self) -> Option<&ServerSelection> {
        self.server.as_ref()
    }
    pub fn database(&self) -> Option<&DatabaseSelection> {
        self.database.as_ref()
    }
    pub fn infrastructure(&self) -> Option<&InfraSelection> {
        self.infrastructure.as_ref()
    }

    /// Whether `facet` is part of this stack.
    pub fn requests(&self, facet: Facet) -> bool {
        match facet {
            Facet::Ui => self.ui.is_some(),
            Facet::Server => self.server.is_some(),
            Facet::Database => self.database.is_some(),
            Facet::Infrastructure => self.infrastructure.is_some(),
        }
    }

    /// Requested facets in canonical order.
    pub fn requested_facets(&self) -> Vec<Facet> {
        Facet::ALL.into_iter().filter(|f| self.requests(*f)).collect()
    }

    /// Effective persistence model flavour for the database facet.
    pub fn model_flavor(&self) -> ModelFlavor {
        self.database
            .as_ref()
            .and_then(|db| db.models)
            .or_else(|| self.server.as_ref().map(|s| s.framework.default_models()))
            .unwrap_or(ModelFlavor::TypeOrm)
    }

    /// Validate internal consistency.
    ///
    /// Called by the builder. Available for re-validation after
    /// deserialization.
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.requested_facets().is_empty() {
            return Err(DomainError::InvalidDescriptor(
                "no facet selected; request at least one of ui, server, database, infrastructure"
                    .into(),
            ));
        }

        if let Some(infra) = &self.infrastructure {
            if infra.capabilities.is_empty() {
                return Err(DomainError::InvalidDescriptor(
                    "infrastructure selection declares no capabilities".into(),
                ));
            }
            let mut seen = HashSet::new();
            for env in &infra.environments {
                validate_environment(env)?;
                if !seen.insert(env.to_ascii_lowercase()) {
                    return Err(DomainError::InvalidDescriptor(format!(
                        "environment '{env}' is declared twice"
                    )));
                }
            }
        }

        Ok(())
    }
}

/// Environment names: ASCII letters, digits and `-` only.
fn validate_environment(env: &str) -> Result<(), DomainError> {
    validate_identifier("environment", env)?;
    match env.chars().find(|c| !(c.is_ascii_alphanumeric() || *c == '-')) {
        Some(bad) => Err(DomainError::InvalidIdentifier {
            subject: "environment".into(),
            name: env.into(),
            reason: format!("contains unsupported character '{bad}'; use letters, digits and '-'"),
        }),
        None => Ok(()),
    }
}

impl fmt::Display for StackDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if let Some(ui) = &self.ui {
            parts.push(format!("ui={}", ui.framework));
        }
        if let Some(server) = &self.server {
            parts.push(format!("server={}", server.framework));
        }
        if let Some(db) = &self.database {
            parts.push(format!("database={}", db.engine));
        }
        if let Some(infra) = &self.infrastructure {
            parts.push(format!("infrastructure={}", infra.platform));
        }
        write!(f, "[{}]", parts.join(", "))
    }
}

// ── Builder ──────────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct StackDescriptorBuilder {
    inner: StackDescriptor,
}

impl StackDescriptorBuilder {
    pub fn ui(mut self, framework: UiFramework) -> Self {
        self.inner.ui = Some(UiSelection { framework });
        self
    }

    pub fn server(mut self, framework: ServerFramework) -> Self {
        self.inner.server = Some(ServerSelection {
            framework,
            port: default_port(),
        });
        self
    }

    pub fn server_port(mut self, port: u16) -> Self {
        if let Some(server) = self.inner.server.as_mut() {
            server.port = port;
        }
        self
    }

    pub fn database(mut self, engine: DatabaseEngine) -> Self {
        self.inner.database = Some(DatabaseSelection { engine, models: None });
        self
    }

    pub fn database_models(mut self, models: ModelFlavor) -> Self {
        if let Some(db) = self.inner.database.as_mut() {
            db.models = Some(models);
        }
        self
    }

    pub fn infrastructure(mut self, selection: InfraSelection) -> Self {
        self.inner.infrastructure = Some(selection);
        self
    }

    pub fn build(self) -> Result<StackDescriptor, DomainError> {
        self.inner.validate()?;
        Ok(self.inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_lists_facets_in_canonical_order() {
        let stack = StackDescriptor::builder()
            .database(DatabaseEngine::PostgreSql)
            .server(ServerFramework::Express)
            .build()
            .unwrap();
        assert_eq!(stack.requested_facets(), vec![Facet::Server, Facet::Database]);
        assert!(!stack.requests(Facet::Ui));
    }

    #[test]
    fn empty_descriptor_is_rejected() {
        assert!(StackDescriptor::builder().build().is_err());
    }

    #[test]
    fn model_flavor_follows_server_unless_explicit() {
        let stack = StackDescriptor::builder()
            .server(ServerFramework::AspNetCore)
            .database(DatabaseEngine::AzureSql)
            .build()
            .unwrap();
        assert_eq!(stack.model_flavor(), ModelFlavor::EfCore);

        let stack = StackDescriptor::builder()
            .server(ServerFramework::AspNetCore)
            .database(DatabaseEngine::PostgreSql)
            .database_models(ModelFlavor::TypeOrm)
            .build()
            .unwrap();
        assert_eq!(stack.model_flavor(), ModelFlavor::TypeOrm);
    }

    #[test]
    fn infra_defaults_and_normalization() {
        let infra = InfraSelection::new(
            InfraPlatform::AzureBicep,
            [InfraCapability::Telemetry, InfraCapability::ComputeHosting, InfraCapability::Telemetry],
        );
        assert_eq!(
            infra.normalized_capabilities(),
            vec![InfraCapability::ComputeHosting, InfraCapability::Telemetry]
        );
        assert_eq!(infra.environments(), vec!["dev"]);
        assert_eq!(infra.location(), DEFAULT_LOCATION);
    }

    #[test]
    fn duplicate_environments_are_rejected() {
        let infra = InfraSelection::new(InfraPlatform::AzureBicep, [InfraCapability::ObjectStorage])
            .with_environments(["dev", "DEV"]);
        let result = StackDescriptor::builder().infrastructure(infra).build();
        assert!(result.is_err());
    }

    #[test]
    fn reopened_descriptor_keeps_other_selections() {
        let stack = StackDescriptor::builder()
            .server(ServerFramework::Express)
            .server_port(3000)
            .build()
            .unwrap()
            .into_builder()
            .database(DatabaseEngine::MySql)
            .build()
            .unwrap();
        assert_eq!(stack.server().unwrap().port, 3000);
        assert!(stack.requests(Facet::Database));
    }

    #[test]
    fn environment_names_are_limited_to_letters_digits_and_dashes() {
        let with = |env: &str| {
            StackDescriptor::builder()
                .infrastructure(
                    InfraSelection::new(InfraPlatform::AzureBicep, [InfraCapability::ObjectStorage])
                        .with_environments([env]),
                )
                .build()
        };
        assert!(with("prod-eu2").is_ok());
        for bad in ["my env", "qa_1", "dev.local", " dev"] {
            assert!(
                matches!(with(bad), Err(DomainError::InvalidIdentifier { .. })),
                "{bad:?} accepted"
            );
        }
    }

    #[test]
    fn deserializes_from_json() {
        let stack: StackDescriptor = serde_json::from_str(
            r#"{ "server": { "framework": "express" }, "database": { "engine": "postgres" } }"#,
        )
        .unwrap();
        assert_eq!(stack.server().unwrap().port, 8080);
        assert_eq!(stack.database().unwrap().engine, DatabaseEngine::PostgreSql);
    }
}
