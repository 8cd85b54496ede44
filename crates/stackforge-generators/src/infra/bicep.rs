use serde_json::{Map, Value, json};
use stackforge_core::{
    application::ports::{Generator, GeneratorOutput},
    domain::{
        ArtifactKind, Facet, GenerationContext, InfraPlatform, InfraSelection, StackDescriptor,
        infra::{ConfigValue, GLOBAL_PARAMS, ParamSpec, ResourceKind, ResourceNode, param_spec, resolve_graph},
        transform::{to_kebab_case, to_pascal_case},
    },
};
use tracing::{debug, instrument};

use super::{literal, modules::module_file};
use crate::support::{CodeWriter, Sink, pretty_json, quoted};

const ID: &str = "bicep-infra";

const PARAMETERS_SCHEMA: &str =
    "https://schema.management.azure.com/schemas/2019-04-01/deploymentParameters.json#";

/// Outputs never surfaced from the composition.
const WITHHELD_OUTPUTS: &[&str] = &["connectionString"];

/// Renders the resolved resource graph as Bicep modules, a composition and
/// per-environment parameter files.
pub struct BicepInfraGenerator;

impl BicepInfraGenerator {
    pub fn new() -> Self {
        Self
    }
}

impl Default for BicepInfraGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl Generator for BicepInfraGenerator {
    fn id(&self) -> &'static str {
        ID
    }

    fn facet(&self) -> Facet {
        Facet::Infrastructure
    }

    fn supports(&self, descriptor: &StackDescriptor) -> bool {
        descriptor
            .infrastructure()
            .is_some_and(|i| i.platform == InfraPlatform::AzureBicep)
    }

    fn priority(&self) -> i32 {
        40
    }

    #[instrument(skip_all, fields(generator = ID))]
    fn generate(&self, ctx: &GenerationContext, descriptor: &StackDescriptor) -> GeneratorOutput {
        let mut sink = Sink::new(ID, Facet::Infrastructure);
        let Some(infra) = descriptor.infrastructure() else {
            sink.fail("infrastructure", "no infrastructure selection in the stack");
            return sink.finish();
        };

        let graph = match resolve_graph(&infra.normalized_capabilities()) {
            Ok(graph) => graph,
            Err(e) => {
                sink.fail_domain("resource graph", &e);
                return sink.finish();
            }
        };
        let order = match graph.topological_order() {
            Ok(order) => order,
            Err(e) => {
                sink.fail_domain("resource graph", &e);
                return sink.finish();
            }
        };
        debug!(
            nodes = order.len(),
            edges = graph.edges().len(),
            "Resolved resource graph"
        );

        for node in &order {
            sink.emit(
                format!("infra/modules/{}.bicep", to_kebab_case(&node.name)),
                ArtifactKind::InfraModule,
                module_file(node),
            );
        }
        sink.emit(
            "infra/main.bicep",
            ArtifactKind::InfraComposition,
            composition(ctx, infra, &order),
        );

        let params = used_params(&order);
        for environment in infra.environments() {
            sink.emit(
                format!("infra/parameters/main.{environment}.parameters.json"),
                ArtifactKind::InfraParameters,
                parameter_file(ctx, infra, &params, environment),
            );
        }
        sink.finish()
    }
}

/// Global parameters followed by the resource parameters some node consumes,
/// in first-use order.
fn used_params(order: &[&ResourceNode]) -> Vec<&'static ParamSpec> {
    let mut params: Vec<&'static ParamSpec> = GLOBAL_PARAMS.iter().collect();
    for name in order.iter().flat_map(|n| n.params()) {
        if let Some(spec) = param_spec(name) {
            if !params.iter().any(|p| p.name == spec.name) {
                params.push(spec);
            }
        }
    }
    params
}

/// Name expression for a node: prefix, abbreviation and environment, with
/// the storage and key vault naming limits applied.
fn name_expression(node: &ResourceNode) -> String {
    let abbreviation = node.kind.def().abbreviation;
    match node.kind {
        ResourceKind::StorageAccount => format!(
            "take(toLower(replace('${{namePrefix}}{abbreviation}${{environment}}', '-', '')), 24)"
        ),
        ResourceKind::KeyVault => {
            format!("take('${{namePrefix}}-{abbreviation}-${{environment}}', 24)")
        }
        _ => format!("'${{namePrefix}}-{abbreviation}-${{environment}}'"),
    }
}

fn composition(ctx: &GenerationContext, infra: &InfraSelection, order: &[&ResourceNode]) -> String {
    let mut w = CodeWriter::new();
    w.line(format!("// Infrastructure for {}", ctx.project.name))
        .line("targetScope = 'resourceGroup'");

    for spec in used_params(order) {
        w.blank();
        if spec.secure {
            w.line("@secure()");
        }
        w.line(format!("@description('{}')", spec.description));
        match spec.name {
            "location" => w.line("param location string = resourceGroup().location"),
            "environment" => {
                w.open("@allowed([");
                for environment in infra.environments() {
                    w.line(quoted(environment));
                }
                w.close("])").line("param environment string")
            }
            "namePrefix" => w.line(format!(
                "param namePrefix string = {}",
                quoted(&ctx.project.package_name())
            )),
            name => w.line(format!("param {name} string")),
        };
    }

    w.blank();
    for node in order {
        w.line(format!("var {}Name = {}", node.name, name_expression(node)));
    }

    for node in order {
        w.blank()
            .open(format!(
                "module {} 'modules/{}.bicep' = {{",
                node.name,
                to_kebab_case(&node.name)
            ))
            .line(format!("name: 'deploy-{}'", to_kebab_case(&node.name)))
            .open("params: {")
            .line(format!("name: {}Name", node.name));
        for (key, value) in &node.config {
            let expression = match value {
                ConfigValue::Literal { value } => literal(value),
                ConfigValue::Param { name } => name.clone(),
                ConfigValue::Output { node, output } => format!("{node}.outputs.{output}"),
            };
            w.line(format!("{key}: {expression}"));
        }
        w.close("}").close("}");
    }

    w.blank();
    for node in order {
        for output in node.kind.def().outputs {
            if WITHHELD_OUTPUTS.contains(&output.name) {
                continue;
            }
            w.line(format!(
                "output {}{} string = {}.outputs.{}",
                node.name,
                to_pascal_case(output.name),
                node.name,
                output.name
            ));
        }
    }
    w.finish()
}

fn parameter_file(
    ctx: &GenerationContext,
    infra: &InfraSelection,
    params: &[&'static ParamSpec],
    environment: &str,
) -> String {
    let mut values = Map::new();
    for spec in params.iter().filter(|p| !p.secure) {
        let value = match spec.name {
            "location" => infra.location().to_string(),
            "environment" => environment.to_string(),
            "namePrefix" => ctx.project.package_name(),
            _ => match spec.default {
                Some(default) => default.to_string(),
                None => continue,
            },
        };
        values.insert(spec.name.to_string(), json!({ "value": value }));
    }

    pretty_json(&json!({
        "$schema": PARAMETERS_SCHEMA,
        "contentVersion": "1.0.0.0",
        "parameters": Value::Object(values),
    }))
}
