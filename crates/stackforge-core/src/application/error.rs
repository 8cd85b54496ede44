//! Application layer errors.
//!
//! These errors represent failures in orchestration, not business logic.
//! Business logic errors are `DomainError` from `crate::domain`.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{DomainError, Facet};
use crate::error::ErrorCategory;

/// Fatal errors raised while dispatching generators.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ApplicationError {
    /// A requested facet has no supporting generator.
    #[error("No registered generator supports the {facet} facet of stack {stack}")]
    Configuration { facet: Facet, stack: String },

    /// Two artifacts claim the same path.
    #[error("Path conflict at '{path}': produced by both '{first}' and '{second}'")]
    PathConflict {
        path: String,
        first: String,
        second: String,
    },

    /// A generator that owns an entry point could not finish.
    #[error("Blocking generator '{generator}' ({facet}) failed: {reason}")]
    BlockingGeneratorFailed {
        generator: String,
        facet: Facet,
        reason: String,
    },

    /// `run_facets` was asked for a facet the stack does not request.
    #[error("Facet {facet} is not part of stack {stack}")]
    FacetNotRequested { facet: Facet, stack: String },
}

impl ApplicationError {
    /// Get user-actionable suggestions.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::Configuration { facet, .. } => vec![
                format!("Register a generator for the {facet} facet"),
                format!("Or remove the {facet} selection from the stack"),
            ],
            Self::PathConflict { first, second, .. } => vec![
                format!("'{first}' and '{second}' must write to distinct paths"),
                "Check whether two generators were registered for the same facet".into(),
            ],
            Self::BlockingGeneratorFailed { generator, .. } => vec![
                format!("Fix the input rejected by '{generator}'"),
                "The run stops because this generator owns the application entry point".into(),
            ],
            Self::FacetNotRequested { facet, .. } => {
                vec![format!("Add a {facet} selection to the stack or drop it from the subset")]
            }
        }
    }

    /// Get error category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Configuration { .. } | Self::FacetNotRequested { .. } => {
                ErrorCategory::Configuration
            }
            Self::PathConflict { .. } => ErrorCategory::Conflict,
            Self::BlockingGeneratorFailed { .. } => ErrorCategory::Generation,
        }
    }
}

/// A non-fatal failure to render one unit of a request.
///
/// Recorded on the outcome; the generator still returns every other
/// artifact it could produce.
#[derive(Debug, Error, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[error("[{generator}] {facet} / {subject}: {reason}")]
pub struct GenerationError {
    pub generator: String,
    pub facet: Facet,
    /// The entity, component, file or resource that failed.
    pub subject: String,
    pub reason: String,
}

impl GenerationError {
    pub fn new(
        generator: impl Into<String>,
        facet: Facet,
        subject: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            generator: generator.into(),
            facet,
            subject: subject.into(),
            reason: reason.into(),
        }
    }

    pub fn from_domain(
        generator: impl Into<String>,
        facet: Facet,
        subject: impl Into<String>,
        error: &DomainError,
    ) -> Self {
        Self::new(generator, facet, subject, error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_facet_and_generator() {
        let err = ApplicationError::BlockingGeneratorFailed {
            generator: "express-server".into(),
            facet: Facet::Server,
            reason: "entity 'X' is malformed".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("express-server"));
        assert!(msg.contains("server"));
        assert_eq!(err.category(), ErrorCategory::Generation);
    }

    #[test]
    fn generation_error_display() {
        let err = GenerationError::new("react-ui", Facet::Ui, "OrderList", "unknown entity 'Order'");
        assert_eq!(err.to_string(), "[react-ui] ui / OrderList: unknown entity 'Order'");
    }
}
