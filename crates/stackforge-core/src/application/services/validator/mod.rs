//! Heuristic static validator for generated artifacts.
//!
//! This is deliberately *not* a compiler: it catches the mistakes a string
//! builder can make (unbalanced delimiters, unterminated literals, broken
//! JSON, unbalanced markup, duplicate Bicep declarations) plus a few
//! hygiene warnings. False positives and negatives are possible.
//!
//! Every check returns data. Nothing here panics on malformed input, and
//! files are validated in parallel with results kept in input order.

mod balance;
mod checks;

use rayon::prelude::*;
use std::fmt;
use tracing::{debug, instrument};

use crate::domain::{FileArtifact, ValidationFinding, ValidationSummary};

/// Source language family, detected from the file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LanguageFamily {
    TypeScript,
    CSharp,
    Python,
    Sql,
    Bicep,
    Json,
    Css,
    Markup,
    Yaml,
    Unknown,
}

impl LanguageFamily {
    pub fn detect(path: &str) -> Self {
        let file_name = path.rsplit('/').next().unwrap_or(path);
        let ext = file_name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "ts" | "tsx" | "js" | "jsx" | "mjs" => Self::TypeScript,
            "cs" => Self::CSharp,
            "py" => Self::Python,
            "sql" => Self::Sql,
            "bicep" => Self::Bicep,
            "json" => Self::Json,
            "css" | "scss" => Self::Css,
            "html" | "htm" | "xml" | "csproj" => Self::Markup,
            "yml" | "yaml" => Self::Yaml,
            _ => Self::Unknown,
        }
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::TypeScript => "typescript",
            Self::CSharp => "csharp",
            Self::Python => "python",
            Self::Sql => "sql",
            Self::Bicep => "bicep",
            Self::Json => "json",
            Self::Css => "css",
            Self::Markup => "markup",
            Self::Yaml => "yaml",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for LanguageFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validate one file.
pub fn validate_file(path: &str, content: &str) -> Vec<ValidationFinding> {
    let family = LanguageFamily::detect(path);

    if content.trim().is_empty() {
        return vec![ValidationFinding::warning(
            path,
            None,
            "file is empty; nothing to validate",
        )];
    }

    let mut findings = Vec::new();
    match family {
        LanguageFamily::Unknown => {
            findings.push(ValidationFinding::warning(
                path,
                None,
                "unrecognized file type; passed through without checks",
            ));
            return findings;
        }
        LanguageFamily::Markup => findings.extend(checks::markup(path, content)),
        LanguageFamily::Yaml => findings.extend(checks::yaml(path, content)),
        _ => findings.extend(balance::check(family, path, content)),
    }

    match family {
        LanguageFamily::Bicep => {
            findings.extend(checks::bicep_minimum(path, content));
            findings.extend(checks::bicep_duplicates(path, content));
        }
        LanguageFamily::Json => findings.extend(checks::json(path, content)),
        _ => {}
    }

    findings.extend(checks::sensitive_literals(path, content));
    findings
}

/// Validate every artifact. Findings keep artifact order.
#[instrument(skip_all, fields(files = artifacts.len()))]
pub fn validate_artifacts(artifacts: &[FileArtifact]) -> ValidationSummary {
    let per_file: Vec<Vec<ValidationFinding>> = artifacts
        .par_iter()
        .map(|a| validate_file(a.path(), a.content()))
        .collect();

    let summary = ValidationSummary {
        findings: per_file.into_iter().flatten().collect(),
        files_checked: artifacts.len(),
    };
    debug!(
        errors = summary.error_count(),
        warnings = summary.warning_count(),
        "Validation finished"
    );
    summary
}
