//! Family-specific heuristic checks.

use regex::Regex;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::LazyLock;

use crate::domain::ValidationFinding;

static BICEP_DECLARATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^\s*(param|var|resource|module|output)\s+([A-Za-z_][A-Za-z0-9_]*)")
        .expect("valid regex")
});

static GUID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"["'][0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}["']"#)
        .expect("valid regex")
});

static OPAQUE_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"["']([A-Za-z0-9+=_\-]{32,})["']"#).expect("valid regex"));

static TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<(/?)([A-Za-z][A-Za-z0-9:._-]*)((?:[^>\x22']|\x22[^\x22]*\x22|'[^']*')*?)(/?)>")
        .expect("valid regex")
});

static COMMENT_OR_DECL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<!--.*?-->|<![^>]*>|<\?.*?\?>").expect("valid regex"));

static ALT_ATTR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(^|\s)alt\s*=").expect("valid regex"));

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source",
    "track", "wbr",
];

fn line_of(content: &str, offset: usize) -> usize {
    content[..offset].matches('\n').count() + 1
}

/// At least one `param`, `resource` or `module` declaration.
pub(super) fn bicep_minimum(file: &str, content: &str) -> Vec<ValidationFinding> {
    let has_any = BICEP_DECLARATION
        .captures_iter(content)
        .any(|c| matches!(&c[1], "param" | "resource" | "module"));
    if has_any {
        Vec::new()
    } else {
        vec![ValidationFinding::error(
            file,
            None,
            "Bicep file declares no param, resource or module",
        )]
    }
}

/// Duplicate symbolic names. Outputs live in their own namespace.
pub(super) fn bicep_duplicates(file: &str, content: &str) -> Vec<ValidationFinding> {
    let mut symbols: HashMap<String, usize> = HashMap::new();
    let mut outputs: HashMap<String, usize> = HashMap::new();
    let mut findings = Vec::new();

    for caps in BICEP_DECLARATION.captures_iter(content) {
        let (Some(whole), Some(keyword), Some(name)) = (caps.get(0), caps.get(1), caps.get(2))
        else {
            continue;
        };
        let line = line_of(content, whole.end());
        let scope = if keyword.as_str() == "output" {
            &mut outputs
        } else {
            &mut symbols
        };
        if let Some(first) = scope.get(name.as_str()) {
            findings.push(ValidationFinding::error(
                file,
                Some(line),
                format!(
                    "duplicate {} name '{}' (first declared on line {first})",
                    keyword.as_str(),
                    name.as_str()
                ),
            ));
        } else {
            scope.insert(name.as_str().to_string(), line);
        }
    }
    findings
}

/// JSON must parse; ARM templates and parameter files need their sections.
pub(super) fn json(file: &str, content: &str) -> Vec<ValidationFinding> {
    let value: Value = match serde_json::from_str(content) {
        Ok(value) => value,
        Err(e) => {
            return vec![ValidationFinding::error(
                file,
                Some(e.line()),
                format!("invalid JSON: {e}"),
            )];
        }
    };

    let schema = value
        .get("$schema")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_ascii_lowercase();
    let mut findings = Vec::new();

    if schema.contains("deploymentparameters") || file.ends_with(".parameters.json") {
        if !value.get("parameters").is_some_and(Value::is_object) {
            findings.push(ValidationFinding::error(
                file,
                None,
                "parameter file has no 'parameters' object",
            ));
        }
    } else if schema.contains("deploymenttemplate") {
        if value.get("resources").is_none() {
            findings.push(ValidationFinding::error(
                file,
                None,
                "ARM template has no 'resources' section",
            ));
        }
        if value.get("parameters").is_some_and(|p| !p.is_object()) {
            findings.push(ValidationFinding::error(
                file,
                None,
                "ARM template 'parameters' must be an object",
            ));
        }
    }
    findings
}

/// GUID-shaped or long opaque tokens inside quotes.
pub(super) fn sensitive_literals(file: &str, content: &str) -> Vec<ValidationFinding> {
    let mut findings: Vec<ValidationFinding> = GUID
        .find_iter(content)
        .map(|m| {
            ValidationFinding::warning(
                file,
                Some(line_of(content, m.start())),
                "GUID literal may be a hard-coded tenant, subscription or client id",
            )
        })
        .collect();

    for caps in OPAQUE_TOKEN.captures_iter(content) {
        let (Some(quoted), Some(token)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        if GUID.is_match(quoted.as_str()) {
            continue;
        }
        let text = token.as_str();
        let has_digit = text.chars().any(|c| c.is_ascii_digit());
        let has_alpha = text.chars().any(|c| c.is_ascii_alphabetic());
        if has_digit && has_alpha {
            findings.push(ValidationFinding::warning(
                file,
                Some(line_of(content, token.start())),
                "long opaque literal may be a hard-coded secret",
            ));
        }
    }
    findings.sort_by_key(|f| f.line);
    findings
}

/// Tag balance plus `<img>` alt text.
pub(super) fn markup(file: &str, content: &str) -> Vec<ValidationFinding> {
    // Blank comments and declarations so offsets (and line numbers) survive.
    let cleaned = COMMENT_OR_DECL.replace_all(content, |caps: &regex::Captures<'_>| {
        caps[0]
            .chars()
            .map(|c| if c == '\n' { '\n' } else { ' ' })
            .collect::<String>()
    });

    let mut findings = Vec::new();
    let mut open: Vec<(String, usize)> = Vec::new();

    for caps in TAG.captures_iter(&cleaned) {
        let Some(whole) = caps.get(0) else { continue };
        let line = line_of(&cleaned, whole.start());
        let closing = !caps[1].is_empty();
        let name = caps[2].to_ascii_lowercase();
        let attrs = caps.get(3).map_or("", |m| m.as_str());
        let self_closing = !caps[4].is_empty();

        if name == "img" && !closing && !ALT_ATTR.is_match(attrs) {
            findings.push(ValidationFinding::warning(
                file,
                Some(line),
                "<img> without alt text",
            ));
        }

        if self_closing || VOID_ELEMENTS.contains(&name.as_str()) {
            continue;
        }

        if !closing {
            open.push((name, line));
            continue;
        }

        match open.iter().rposition(|(n, _)| *n == name) {
            Some(pos) => {
                for (unclosed, at) in open.drain(pos + 1..) {
                    findings.push(ValidationFinding::error(
                        file,
                        Some(at),
                        format!("<{unclosed}> is never closed"),
                    ));
                }
                open.pop();
            }
            None => findings.push(ValidationFinding::error(
                file,
                Some(line),
                format!("closing </{name}> has no matching opening tag"),
            )),
        }
    }

    for (unclosed, at) in open {
        findings.push(ValidationFinding::error(
            file,
            Some(at),
            format!("<{unclosed}> is never closed"),
        ));
    }
    findings.sort_by_key(|f| f.line);
    findings
}

/// YAML forbids tabs in indentation.
pub(super) fn yaml(file: &str, content: &str) -> Vec<ValidationFinding> {
    content
        .lines()
        .enumerate()
        .filter(|(_, line)| {
            line.chars()
                .take_while(|c| c.is_whitespace())
                .any(|c| c == '\t')
        })
        .map(|(i, _)| {
            ValidationFinding::error(file, Some(i + 1), "tab character used for indentation")
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Severity;

    #[test]
    fn bicep_without_declarations_is_an_error() {
        assert_eq!(bicep_minimum("a.bicep", "// nothing here\n").len(), 1);
        assert!(bicep_minimum("a.bicep", "param location string\n").is_empty());
    }

    #[test]
    fn bicep_duplicates_respect_output_namespace() {
        let src = "param name string\nresource site 'x@1' = {}\noutput name string = site.name\nvar site = 1\n";
        let found = bicep_duplicates("a.bicep", src);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].line, Some(4));
        assert!(found[0].message.contains("'site'"));
    }

    #[test]
    fn json_must_parse() {
        let found = json("a.json", "{ \"a\": 1,, }");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].severity, Severity::Error);
    }

    #[test]
    fn parameter_files_need_a_parameters_object() {
        let bad = r#"{ "$schema": "https://schema.management.azure.com/schemas/2019-04-01/deploymentParameters.json#", "contentVersion": "1.0.0.0" }"#;
        assert_eq!(json("infra/parameters/main.dev.parameters.json", bad).len(), 1);

        let good = r#"{ "$schema": "https://schema.management.azure.com/schemas/2019-04-01/deploymentParameters.json#", "parameters": {} }"#;
        assert!(json("infra/parameters/main.dev.parameters.json", good).is_empty());
    }

    #[test]
    fn arm_templates_need_resources() {
        let bad = r#"{ "$schema": "https://schema.management.azure.com/schemas/2019-04-01/deploymentTemplate.json#", "parameters": [] }"#;
        assert_eq!(json("azuredeploy.json", bad).len(), 2);
    }

    #[test]
    fn sensitive_literals_are_warnings() {
        let src = "const tenant = '72f988bf-86f1-41af-91ab-2d7cd011db47';\nconst key = \"sk4f9a8b7c6d5e4f3a2b1c0d9e8f7a6b5c4\";\nconst word = 'abcdefghijklmnopqrstuvwxyzabcdefgh';\n";
        let found = sensitive_literals("a.ts", src);
        assert_eq!(found.len(), 2);
        assert!(found.iter().all(|f| f.severity == Severity::Warning));
        assert_eq!(found[1].line, Some(2));
    }

    #[test]
    fn markup_balance_and_alt_text() {
        let good = "<!DOCTYPE html>\n<html><head><meta charset=\"utf-8\"><title>x</title></head>\n<body><div id=\"root\"></div><br/><img src=\"a.png\" alt=\"logo\"></body></html>\n";
        assert!(markup("index.html", good).is_empty());

        let bad = "<div>\n<span>\n</div>\n<img src=\"a.png\">\n";
        let found = markup("index.html", bad);
        assert_eq!(found.iter().filter(|f| f.severity == Severity::Error).count(), 1);
        assert_eq!(found.iter().filter(|f| f.severity == Severity::Warning).count(), 1);
    }

    #[test]
    fn markup_comments_are_ignored() {
        let src = "<Project>\n  <!-- <PropertyGroup> -->\n</Project>\n";
        assert!(markup("a.csproj", src).is_empty());
    }

    #[test]
    fn yaml_tabs_are_errors() {
        let found = yaml("a.yml", "key:\n\tvalue: 1\n  ok: 2\n");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].line, Some(2));
    }
}
