//! Capability → resource inclusion rules and cross-resource wiring.
//!
//! Capabilities are deduplicated and applied in canonical order, so the
//! node list (and therefore the emitted modules) never depends on the order
//! a request lists them in.

use super::{
    graph::ResourceGraph,
    resource::{ConfigValue, ResourceKind, ResourceNode},
};
use crate::domain::{error::DomainError, value_objects::InfraCapability};

pub const APP_SERVICE_PLAN: &str = "appServicePlan";
pub const WEB_APP: &str = "webApp";
pub const SQL_SERVER: &str = "sqlServer";
pub const SQL_DATABASE: &str = "sqlDatabase";
pub const STORAGE_ACCOUNT: &str = "storageAccount";
pub const KEY_VAULT: &str = "keyVault";
pub const LOG_ANALYTICS: &str = "logAnalytics";
pub const APP_INSIGHTS: &str = "appInsights";

/// A deployment-level parameter a node may consume.
#[derive(Debug, Clone, Copy)]
pub struct ParamSpec {
    pub name: &'static str,
    pub description: &'static str,
    pub secure: bool,
    /// Value written to per-environment parameter files; `None` for secure
    /// parameters, which are supplied at deployment time.
    pub default: Option<&'static str>,
}

/// Parameters every composition declares.
pub static GLOBAL_PARAMS: &[ParamSpec] = &[
    ParamSpec {
        name: "location",
        description: "Azure region for all resources",
        secure: false,
        default: None,
    },
    ParamSpec {
        name: "environment",
        description: "Deployment environment name",
        secure: false,
        default: None,
    },
    ParamSpec {
        name: "namePrefix",
        description: "Prefix applied to every resource name",
        secure: false,
        default: None,
    },
];

/// Parameters introduced by individual resources.
pub static RESOURCE_PARAMS: &[ParamSpec] = &[
    ParamSpec {
        name: "sqlAdministratorLogin",
        description: "SQL server administrator login",
        secure: false,
        default: Some("sqladmin"),
    },
    ParamSpec {
        name: "sqlAdministratorPassword",
        description: "SQL server administrator password",
        secure: true,
        default: None,
    },
];

pub fn param_spec(name: &str) -> Option<&'static ParamSpec> {
    GLOBAL_PARAMS
        .iter()
        .chain(RESOURCE_PARAMS)
        .find(|p| p.name == name)
}

/// Nodes required by `capabilities`, wired together, in declaration order.
pub fn resolve_resources(capabilities: &[InfraCapability]) -> Vec<ResourceNode> {
    let mut caps = capabilities.to_vec();
    caps.sort();
    caps.dedup();

    let location = || ConfigValue::param("location");
    let mut nodes = Vec::new();
    for cap in &caps {
        match cap {
            InfraCapability::ComputeHosting => {
                nodes.push(
                    ResourceNode::new(ResourceKind::AppServicePlan, APP_SERVICE_PLAN)
                        .with("location", location())
                        .with("skuName", ConfigValue::literal("B1")),
                );
                nodes.push(
                    ResourceNode::new(ResourceKind::WebApp, WEB_APP)
                        .with("location", location())
                        .with("serverFarmId", ConfigValue::output(APP_SERVICE_PLAN, "id")),
                );
            }
            InfraCapability::RelationalStorage => {
                nodes.push(
                    ResourceNode::new(ResourceKind::SqlServer, SQL_SERVER)
                        .with("location", location())
                        .with("administratorLogin", ConfigValue::param("sqlAdministratorLogin"))
                        .with(
                            "administratorLoginPassword",
                            ConfigValue::param("sqlAdministratorPassword"),
                        ),
                );
                nodes.push(
                    ResourceNode::new(ResourceKind::SqlDatabase, SQL_DATABASE)
                        .with("location", location())
                        .with("serverName", ConfigValue::output(SQL_SERVER, "name"))
                        .with("skuName", ConfigValue::literal("Basic")),
                );
            }
            InfraCapability::ObjectStorage => nodes.push(
                ResourceNode::new(ResourceKind::StorageAccount, STORAGE_ACCOUNT)
                    .with("location", location())
                    .with("skuName", ConfigValue::literal("Standard_LRS")),
            ),
            InfraCapability::SecretStorage => nodes.push(
                ResourceNode::new(ResourceKind::KeyVault, KEY_VAULT)
                    .with("location", location())
                    .with("enableRbacAuthorization", ConfigValue::literal(true)),
            ),
            InfraCapability::Telemetry => {
                nodes.push(
                    ResourceNode::new(ResourceKind::LogAnalyticsWorkspace, LOG_ANALYTICS)
                        .with("location", location())
                        .with("retentionInDays", ConfigValue::literal(30)),
                );
                nodes.push(
                    ResourceNode::new(ResourceKind::ApplicationInsights, APP_INSIGHTS)
                        .with("location", location())
                        .with("workspaceResourceId", ConfigValue::output(LOG_ANALYTICS, "id")),
                );
            }
        }
    }

    wire_web_app(&mut nodes);
    nodes
}

/// Feed every present backing service into the web app's settings.
fn wire_web_app(nodes: &mut [ResourceNode]) {
    const WIRING: &[(&str, &str, &str)] = &[
        ("appInsightsConnectionString", APP_INSIGHTS, "connectionString"),
        ("keyVaultUri", KEY_VAULT, "uri"),
        ("sqlServerFqdn", SQL_SERVER, "fullyQualifiedDomainName"),
        ("sqlDatabaseName", SQL_DATABASE, "name"),
        ("storageBlobEndpoint", STORAGE_ACCOUNT, "primaryBlobEndpoint"),
    ];

    let present: Vec<String> = nodes.iter().map(|n| n.name.clone()).collect();
    let Some(web) = nodes.iter_mut().find(|n| n.kind == ResourceKind::WebApp) else {
        return;
    };
    for (key, node, output) in WIRING {
        if present.iter().any(|p| p == node) {
            web.config
                .push((key.to_string(), ConfigValue::output(*node, *output)));
        }
    }
}

/// Resolve and build the graph for `capabilities`.
pub fn resolve_graph(capabilities: &[InfraCapability]) -> Result<ResourceGraph, DomainError> {
    ResourceGraph::build(resolve_resources(capabilities))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(nodes: &[ResourceNode]) -> Vec<&str> {
        nodes.iter().map(|n| n.name.as_str()).collect()
    }

    #[test]
    fn compute_hosting_alone() {
        let nodes = resolve_resources(&[InfraCapability::ComputeHosting]);
        assert_eq!(names(&nodes), vec![APP_SERVICE_PLAN, WEB_APP]);
        assert_eq!(nodes[1].references().count(), 1);
    }

    #[test]
    fn capability_order_and_duplicates_do_not_matter() {
        let a = resolve_resources(&[
            InfraCapability::Telemetry,
            InfraCapability::ComputeHosting,
            InfraCapability::Telemetry,
        ]);
        let b = resolve_resources(&[InfraCapability::ComputeHosting, InfraCapability::Telemetry]);
        assert_eq!(a, b);
    }

    #[test]
    fn web_app_consumes_every_present_backing_service() {
        let nodes = resolve_resources(&InfraCapability::ALL);
        let web = nodes.iter().find(|n| n.name == WEB_APP).unwrap();
        let targets: Vec<&str> = web.references().map(|(_, node, _)| node).collect();
        assert_eq!(
            targets,
            vec![APP_SERVICE_PLAN, APP_INSIGHTS, KEY_VAULT, SQL_SERVER, SQL_DATABASE, STORAGE_ACCOUNT]
        );
    }

    #[test]
    fn web_app_is_ordered_after_its_dependencies() {
        let graph = resolve_graph(&InfraCapability::ALL).unwrap();
        let order: Vec<&str> = graph
            .topological_order()
            .unwrap()
            .into_iter()
            .map(|n| n.name.as_str())
            .collect();
        let pos = |name: &str| order.iter().position(|n| *n == name).unwrap();
        assert!(pos(WEB_APP) > pos(APP_SERVICE_PLAN));
        assert!(pos(WEB_APP) > pos(APP_INSIGHTS));
        assert!(pos(APP_INSIGHTS) > pos(LOG_ANALYTICS));
        assert!(pos(SQL_DATABASE) > pos(SQL_SERVER));
    }

    #[test]
    fn secure_params_have_no_default() {
        for spec in GLOBAL_PARAMS.iter().chain(RESOURCE_PARAMS) {
            if spec.secure {
                assert!(spec.default.is_none(), "{} must not carry a default", spec.name);
            }
        }
        assert!(param_spec("sqlAdministratorPassword").unwrap().secure);
    }
}
