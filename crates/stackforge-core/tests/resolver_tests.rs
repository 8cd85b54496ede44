//! Integration tests for the infrastructure resolver.

use stackforge_core::domain::{
    DomainError, InfraCapability,
    infra::{ConfigValue, ResourceGraph, ResourceKind, ResourceNode, resolve_graph, resolve_resources},
};

/// Every subset of the five capabilities, as bit masks 0..32.
fn all_combinations() -> impl Iterator<Item = Vec<InfraCapability>> {
    (0u32..32).map(|mask| {
        InfraCapability::ALL
            .iter()
            .enumerate()
            .filter(|(bit, _)| mask & (1 << bit) != 0)
            .map(|(_, cap)| *cap)
            .collect()
    })
}

#[test]
fn every_capability_combination_resolves_acyclically() {
    for caps in all_combinations() {
        let graph = resolve_graph(&caps)
            .unwrap_or_else(|e| panic!("graph for {caps:?} failed to build: {e}"));
        let order = graph
            .topological_order()
            .unwrap_or_else(|e| panic!("graph for {caps:?} has a cycle: {e}"));
        assert_eq!(order.len(), graph.nodes().len());

        let position = |name: &str| order.iter().position(|n| n.name == name).unwrap();
        for edge in graph.edges() {
            assert!(
                position(&edge.to) < position(&edge.from),
                "{} must come before {} for {caps:?}",
                edge.to,
                edge.from
            );
        }
    }
}

#[test]
fn resolution_is_deterministic_for_every_combination() {
    for caps in all_combinations() {
        let mut reversed = caps.clone();
        reversed.reverse();
        let a = resolve_graph(&caps).unwrap();
        let b = resolve_graph(&reversed).unwrap();
        let names = |g: &ResourceGraph| -> Vec<String> {
            g.topological_order()
                .unwrap()
                .into_iter()
                .map(|n| n.name.clone())
                .collect()
        };
        assert_eq!(names(&a), names(&b));
    }
}

#[test]
fn empty_capability_set_has_no_nodes() {
    assert!(resolve_resources(&[]).is_empty());
}

#[test]
fn node_kinds_follow_inclusion_rules() {
    let kinds = |caps: &[InfraCapability]| -> Vec<ResourceKind> {
        resolve_resources(caps).into_iter().map(|n| n.kind).collect()
    };
    assert_eq!(
        kinds(&[InfraCapability::RelationalStorage]),
        vec![ResourceKind::SqlServer, ResourceKind::SqlDatabase]
    );
    assert_eq!(
        kinds(&[InfraCapability::Telemetry]),
        vec![ResourceKind::LogAnalyticsWorkspace, ResourceKind::ApplicationInsights]
    );
    assert_eq!(kinds(&[InfraCapability::SecretStorage]), vec![ResourceKind::KeyVault]);
}

#[test]
fn explicit_cycle_is_rejected_and_named() {
    let graph = ResourceGraph::build(vec![
        ResourceNode::new(ResourceKind::WebApp, "web")
            .with("vaultUri", ConfigValue::output("vault", "uri")),
        ResourceNode::new(ResourceKind::KeyVault, "vault")
            .with("allowedHost", ConfigValue::output("web", "defaultHostname")),
    ])
    .unwrap();

    match graph.topological_order() {
        Err(DomainError::DependencyCycle { nodes }) => {
            assert!(nodes.contains(&"web".to_string()));
            assert!(nodes.contains(&"vault".to_string()));
        }
        other => panic!("expected DependencyCycle, got {other:?}"),
    }
}
