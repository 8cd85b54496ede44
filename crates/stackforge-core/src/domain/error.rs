// ============================================================================
// domain/error.rs - DOMAIN ERROR TAXONOMY
// ============================================================================

use thiserror::Error;

/// Root domain error type.
///
/// All errors are:
/// - Cloneable (recorded on outcomes, reported more than once)
/// - Categorizable (for display)
/// - Actionable (provides suggestions)
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DomainError {
    // ========================================================================
    // Input Errors
    // ========================================================================
    #[error("Invalid stack descriptor: {0}")]
    InvalidDescriptor(String),

    #[error("Invalid identifier '{name}' for {subject}: {reason}")]
    InvalidIdentifier {
        subject: String,
        name: String,
        reason: String,
    },

    #[error("Entity '{entity}' is malformed: {reason}")]
    MalformedEntity { entity: String, reason: String },

    #[error("Field shorthand '{input}' is invalid: expected 'name:type' or 'name:type?'")]
    InvalidFieldShorthand { input: String },

    #[error("Entity '{entity}' declares a relation to unknown entity '{target}'")]
    UnknownRelationTarget { entity: String, target: String },

    #[error("Component '{component}' is malformed: {reason}")]
    MalformedComponent { component: String, reason: String },

    #[error("Artifact path '{path}' is invalid: {reason}")]
    InvalidArtifactPath { path: String, reason: String },

    // ========================================================================
    // Resource Graph Errors
    // ========================================================================
    #[error("Resource '{node}' references unknown resource '{target}'")]
    UnknownReference { node: String, target: String },

    #[error("Resource '{node}' references output '{output}' which '{target}' does not declare")]
    UnknownOutput {
        node: String,
        target: String,
        output: String,
    },

    #[error("Duplicate resource name '{name}'")]
    DuplicateResource { name: String },

    #[error("Dependency cycle among resources: {}", nodes.join(" -> "))]
    DependencyCycle { nodes: Vec<String> },
}

impl DomainError {
    /// Get user-actionable suggestions for fixing this error.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::InvalidDescriptor(msg) => vec![
                "Check the facet selections in the stack descriptor".into(),
                format!("Details: {msg}"),
            ],
            Self::InvalidIdentifier { subject, .. } => vec![
                format!("Rename {subject} using letters, digits, '_' or '-'"),
                "Identifiers must start with a letter".into(),
            ],
            Self::MalformedEntity { entity, .. } | Self::UnknownRelationTarget { entity, .. } => {
                vec![
                    format!("Fix the declaration of entity '{entity}'"),
                    "Other entities are still generated".into(),
                ]
            }
            Self::DependencyCycle { nodes } => vec![
                format!("Break the reference loop between: {}", nodes.join(", ")),
                "A resource cannot consume an output that depends on itself".into(),
            ],
            Self::UnknownReference { target, .. } => vec![
                format!("Declare resource '{target}' or remove the reference"),
            ],
            Self::InvalidArtifactPath { .. } => vec![
                "Artifact paths must be relative, '/'-separated and free of '..'".into(),
            ],
            _ => vec!["See documentation for more details".into()],
        }
    }

    /// Error category for display styling.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidDescriptor(_)
            | Self::InvalidIdentifier { .. }
            | Self::InvalidFieldShorthand { .. }
            | Self::MalformedEntity { .. }
            | Self::MalformedComponent { .. }
            | Self::InvalidArtifactPath { .. } => ErrorCategory::Validation,
            Self::UnknownRelationTarget { .. }
            | Self::UnknownReference { .. }
            | Self::UnknownOutput { .. } => ErrorCategory::NotFound,
            Self::DuplicateResource { .. } | Self::DependencyCycle { .. } => {
                ErrorCategory::Configuration
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    NotFound,
    Configuration,
    Conflict,
    Internal,
}
