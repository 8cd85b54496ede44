//! Infrastructure-as-code generators.

mod bicep;
mod modules;

pub use bicep::BicepInfraGenerator;

use serde_json::Value;
use stackforge_core::domain::infra::{ConfigValue, param_spec};

use crate::support::quoted;

/// Bicep type of a module input.
fn input_type(value: &ConfigValue) -> &'static str {
    match value {
        ConfigValue::Literal { value } => literal_type(value),
        ConfigValue::Param { .. } | ConfigValue::Output { .. } => "string",
    }
}

fn literal_type(value: &Value) -> &'static str {
    match value {
        Value::Bool(_) => "bool",
        Value::Number(_) => "int",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Null | Value::Object(_) => "object",
    }
}

fn is_secure(value: &ConfigValue) -> bool {
    match value {
        ConfigValue::Param { name } => param_spec(name).is_some_and(|p| p.secure),
        _ => false,
    }
}

/// Bicep literal for a JSON value.
fn literal(value: &Value) -> String {
    match value {
        Value::String(s) => quoted(s),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Null => "null".to_string(),
        Value::Array(items) => {
            let items: Vec<String> = items.iter().map(literal).collect();
            format!("[\n{}\n]", items.join("\n"))
        }
        Value::Object(map) => {
            let entries: Vec<String> = map
                .iter()
                .map(|(k, v)| format!("{k}: {}", literal(v)))
                .collect();
            format!("{{\n{}\n}}", entries.join("\n"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn literals_and_types_follow_json_values() {
        assert_eq!(literal(&json!("Standard_LRS")), "'Standard_LRS'");
        assert_eq!(literal(&json!(30)), "30");
        assert_eq!(literal(&json!(true)), "true");
        assert_eq!(input_type(&ConfigValue::literal(30)), "int");
        assert_eq!(input_type(&ConfigValue::output("plan", "id")), "string");
        assert!(is_secure(&ConfigValue::param("sqlAdministratorPassword")));
        assert!(!is_secure(&ConfigValue::param("location")));
    }
}
