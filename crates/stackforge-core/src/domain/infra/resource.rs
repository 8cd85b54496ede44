//! Cloud resource kinds and the nodes the resolver builds from them.
//!
//! Each kind is described exactly once by a [`ResourceDef`] in
//! [`RESOURCE_REGISTRY`]: ARM type, API version, verified module reference,
//! naming abbreviation and declared outputs. Graph building, Bicep rendering
//! and module lookup by ARM type all read this table.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResourceKind {
    AppServicePlan,
    WebApp,
    SqlServer,
    SqlDatabase,
    StorageAccount,
    KeyVault,
    LogAnalyticsWorkspace,
    ApplicationInsights,
}

/// An output a resource module exposes to its dependents.
#[derive(Debug, Clone, Copy)]
pub struct OutputDef {
    pub name: &'static str,
    /// Bicep expression relative to the module's `resource` symbol.
    pub expression: &'static str,
}

#[derive(Debug, Clone, Copy)]
pub struct ResourceDef {
    pub kind: ResourceKind,
    pub arm_type: &'static str,
    pub api_version: &'static str,
    /// Azure Verified Module the emitted module mirrors.
    pub module_ref: &'static str,
    /// Naming abbreviation (`app`, `kv`, ...).
    pub abbreviation: &'static str,
    pub outputs: &'static [OutputDef],
}

const ID: OutputDef = OutputDef {
    name: "id",
    expression: "id",
};
const NAME: OutputDef = OutputDef {
    name: "name",
    expression: "name",
};

pub static RESOURCE_REGISTRY: &[ResourceDef] = &[
    ResourceDef {
        kind: ResourceKind::AppServicePlan,
        arm_type: "Microsoft.Web/serverfarms",
        api_version: "2023-12-01",
        module_ref: "br/public:avm/res/web/serverfarm:0.4.0",
        abbreviation: "asp",
        outputs: &[ID, NAME],
    },
    ResourceDef {
        kind: ResourceKind::WebApp,
        arm_type: "Microsoft.Web/sites",
        api_version: "2023-12-01",
        module_ref: "br/public:avm/res/web/site:0.12.0",
        abbreviation: "app",
        outputs: &[
            ID,
            NAME,
            OutputDef {
                name: "defaultHostname",
                expression: "properties.defaultHostName",
            },
        ],
    },
    ResourceDef {
        kind: ResourceKind::SqlServer,
        arm_type: "Microsoft.Sql/servers",
        api_version: "2023-08-01-preview",
        module_ref: "br/public:avm/res/sql/server:0.10.0",
        abbreviation: "sql",
        outputs: &[
            ID,
            NAME,
            OutputDef {
                name: "fullyQualifiedDomainName",
                expression: "properties.fullyQualifiedDomainName",
            },
        ],
    },
    ResourceDef {
        kind: ResourceKind::SqlDatabase,
        arm_type: "Microsoft.Sql/servers/databases",
        api_version: "2023-08-01-preview",
        module_ref: "br/public:avm/res/sql/server:0.10.0",
        abbreviation: "sqldb",
        outputs: &[ID, NAME],
    },
    ResourceDef {
        kind: ResourceKind::StorageAccount,
        arm_type: "Microsoft.Storage/storageAccounts",
        api_version: "2023-05-01",
        module_ref: "br/public:avm/res/storage/storage-account:0.14.3",
        abbreviation: "st",
        outputs: &[
            ID,
            NAME,
            OutputDef {
                name: "primaryBlobEndpoint",
                expression: "properties.primaryEndpoints.blob",
            },
        ],
    },
    ResourceDef {
        kind: ResourceKind::KeyVault,
        arm_type: "Microsoft.KeyVault/vaults",
        api_version: "2023-07-01",
        module_ref: "br/public:avm/res/key-vault/vault:0.9.0",
        abbreviation: "kv",
        outputs: &[
            ID,
            NAME,
            OutputDef {
                name: "uri",
                expression: "properties.vaultUri",
            },
        ],
    },
    ResourceDef {
        kind: ResourceKind::LogAnalyticsWorkspace,
        arm_type: "Microsoft.OperationalInsights/workspaces",
        api_version: "2023-09-01",
        module_ref: "br/public:avm/res/operational-insights/workspace:0.7.0",
        abbreviation: "log",
        outputs: &[ID, NAME],
    },
    ResourceDef {
        kind: ResourceKind::ApplicationInsights,
        arm_type: "Microsoft.Insights/components",
        api_version: "2020-02-02",
        module_ref: "br/public:avm/res/insights/component:0.4.1",
        abbreviation: "appi",
        outputs: &[
            ID,
            NAME,
            OutputDef {
                name: "connectionString",
                expression: "properties.ConnectionString",
            },
        ],
    },
];

impl ResourceKind {
    /// Registry entry. `RESOURCE_REGISTRY` is laid out in declaration order.
    pub fn def(&self) -> &'static ResourceDef {
        &RESOURCE_REGISTRY[*self as usize]
    }

    /// Look a kind up by its ARM resource type, case-insensitively.
    pub fn from_arm_type(arm_type: &str) -> Option<Self> {
        RESOURCE_REGISTRY
            .iter()
            .find(|def| def.arm_type.eq_ignore_ascii_case(arm_type))
            .map(|def| def.kind)
    }

    pub fn declares_output(&self, output: &str) -> bool {
        self.def().outputs.iter().any(|o| o.name == output)
    }

    /// `<type>@<api-version>` as written in a Bicep `resource` declaration.
    pub fn bicep_type(&self) -> String {
        let def = self.def();
        format!("{}@{}", def.arm_type, def.api_version)
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.def().arm_type)
    }
}

/// A configuration value passed to a resource module.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "kebab-case")]
pub enum ConfigValue {
    Literal { value: Value },
    /// A deployment-level parameter of the composition.
    Param { name: String },
    /// An output of another node; creates a dependency edge.
    Output { node: String, output: String },
}

impl ConfigValue {
    pub fn literal(value: impl Into<Value>) -> Self {
        Self::Literal {
            value: value.into(),
        }
    }

    pub fn param(name: impl Into<String>) -> Self {
        Self::Param { name: name.into() }
    }

    pub fn output(node: impl Into<String>, output: impl Into<String>) -> Self {
        Self::Output {
            node: node.into(),
            output: output.into(),
        }
    }
}

/// One resource instance in the composition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceNode {
    pub kind: ResourceKind,
    /// Logical (symbolic) name, unique within a graph.
    pub name: String,
    /// Module inputs in emission order.
    pub config: Vec<(String, ConfigValue)>,
}

impl ResourceNode {
    pub fn new(kind: ResourceKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            config: Vec::new(),
        }
    }

    pub fn with(mut self, key: impl Into<String>, value: ConfigValue) -> Self {
        self.config.push((key.into(), value));
        self
    }

    /// `(key, node, output)` for every output reference in `config`.
    pub fn references(&self) -> impl Iterator<Item = (&str, &str, &str)> {
        self.config.iter().filter_map(|(key, value)| match value {
            ConfigValue::Output { node, output } => Some((key.as_str(), node.as_str(), output.as_str())),
            _ => None,
        })
    }

    /// Deployment parameters this node consumes.
    pub fn params(&self) -> impl Iterator<Item = &str> {
        self.config.iter().filter_map(|(_, value)| match value {
            ConfigValue::Param { name } => Some(name.as_str()),
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn every_kind_has_exactly_one_definition() {
        let kinds: HashSet<_> = RESOURCE_REGISTRY.iter().map(|d| d.kind).collect();
        assert_eq!(kinds.len(), RESOURCE_REGISTRY.len());
        for (index, def) in RESOURCE_REGISTRY.iter().enumerate() {
            assert_eq!(def.kind as usize, index);
            assert!(def.module_ref.starts_with("br/public:avm/res/"));
            assert!(def.outputs.iter().any(|o| o.name == "id"));
        }
    }

    #[test]
    fn lookup_by_arm_type() {
        assert_eq!(
            ResourceKind::from_arm_type("microsoft.web/sites"),
            Some(ResourceKind::WebApp)
        );
        assert_eq!(ResourceKind::from_arm_type("Microsoft.Compute/virtualMachines"), None);
    }

    #[test]
    fn node_lists_its_references_and_params() {
        let node = ResourceNode::new(ResourceKind::WebApp, "webApp")
            .with("location", ConfigValue::param("location"))
            .with("serverFarmId", ConfigValue::output("appServicePlan", "id"));
        assert_eq!(
            node.references().collect::<Vec<_>>(),
            vec![("serverFarmId", "appServicePlan", "id")]
        );
        assert_eq!(node.params().collect::<Vec<_>>(), vec!["location"]);
        assert!(ResourceKind::KeyVault.declares_output("uri"));
        assert!(!ResourceKind::KeyVault.declares_output("connectionString"));
    }
}
