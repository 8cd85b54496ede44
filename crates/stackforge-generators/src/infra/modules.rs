//! One Bicep module per resource node.

use stackforge_core::domain::{
    infra::{ConfigValue, ResourceKind, ResourceNode, param_spec},
    transform::to_screaming_snake_case,
};

use super::{input_type, is_secure};
use crate::support::CodeWriter;

/// Inputs the web app maps onto its own properties; every other input
/// becomes an app setting.
const WEB_APP_STRUCTURAL: &[&str] = &["location", "serverFarmId"];

pub(super) fn module_file(node: &ResourceNode) -> String {
    let def = node.kind.def();
    let symbol = node.name.as_str();
    let mut w = CodeWriter::new();
    w.line(format!("// {}", def.arm_type))
        .line(format!("// Mirrors {}", def.module_ref))
        .blank()
        .line("@description('Resource name')")
        .line("param name string");

    for (key, value) in &node.config {
        w.blank();
        if is_secure(value) {
            w.line("@secure()");
        }
        if let ConfigValue::Param { name } = value {
            if let Some(spec) = param_spec(name) {
                w.line(format!("@description('{}')", spec.description));
            }
        }
        w.line(format!("param {key} {}", input_type(value)));
    }

    w.blank();
    resource(&mut w, node);

    for output in def.outputs {
        w.line(format!(
            "output {} string = {symbol}.{}",
            output.name, output.expression
        ));
    }
    w.finish()
}

fn has(node: &ResourceNode, key: &str) -> bool {
    node.config.iter().any(|(k, _)| k == key)
}

fn sku(w: &mut CodeWriter, node: &ResourceNode) {
    if has(node, "skuName") {
        w.open("sku: {").line("name: skuName").close("}");
    }
}

fn resource(w: &mut CodeWriter, node: &ResourceNode) {
    let symbol = node.name.as_str();
    let kind = node.kind;

    if kind == ResourceKind::SqlDatabase {
        w.line(format!(
            "resource server '{}' existing = {{",
            ResourceKind::SqlServer.bicep_type()
        ))
        .line("  name: serverName")
        .line("}")
        .blank();
    }

    w.open(format!("resource {symbol} '{}' = {{", kind.bicep_type()));
    if kind == ResourceKind::SqlDatabase {
        w.line("parent: server");
    }
    w.line("name: name");
    if has(node, "location") {
        w.line("location: location");
    }

    match kind {
        ResourceKind::AppServicePlan => {
            sku(w, node);
            w.line("kind: 'linux'")
                .open("properties: {")
                .line("reserved: true")
                .close("}");
        }
        ResourceKind::WebApp => {
            let settings: Vec<&str> = node
                .config
                .iter()
                .map(|(k, _)| k.as_str())
                .filter(|k| !WEB_APP_STRUCTURAL.contains(k))
                .collect();
            w.open("properties: {")
                .line("serverFarmId: serverFarmId")
                .line("httpsOnly: true")
                .open("siteConfig: {")
                .line("alwaysOn: true");
            if !settings.is_empty() {
                w.open("appSettings: [");
                for key in settings {
                    w.open("{")
                        .line(format!("name: '{}'", to_screaming_snake_case(key)))
                        .line(format!("value: {key}"))
                        .close("}");
                }
                w.close("]");
            }
            w.close("}").close("}");
        }
        ResourceKind::SqlServer => {
            w.open("properties: {")
                .line("administratorLogin: administratorLogin")
                .line("administratorLoginPassword: administratorLoginPassword")
                .line("minimalTlsVersion: '1.2'")
                .close("}");
        }
        ResourceKind::SqlDatabase => sku(w, node),
        ResourceKind::StorageAccount => {
            sku(w, node);
            w.line("kind: 'StorageV2'")
                .open("properties: {")
                .line("minimumTlsVersion: 'TLS1_2'")
                .line("allowBlobPublicAccess: false")
                .close("}");
        }
        ResourceKind::KeyVault => {
            w.open("properties: {")
                .line("tenantId: subscription().tenantId")
                .open("sku: {")
                .line("family: 'A'")
                .line("name: 'standard'")
                .close("}");
            if has(node, "enableRbacAuthorization") {
                w.line("enableRbacAuthorization: enableRbacAuthorization");
            }
            w.close("}");
        }
        ResourceKind::LogAnalyticsWorkspace => {
            w.open("properties: {")
                .open("sku: {")
                .line("name: 'PerGB2018'")
                .close("}");
            if has(node, "retentionInDays") {
                w.line("retentionInDays: retentionInDays");
            }
            w.close("}");
        }
        ResourceKind::ApplicationInsights => {
            w.line("kind: 'web'")
                .open("properties: {")
                .line("Application_Type: 'web'")
                .line("WorkspaceResourceId: workspaceResourceId")
                .close("}");
        }
    }
    w.close("}").blank();
}
