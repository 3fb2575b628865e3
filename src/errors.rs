use serde::Serialize;

use crate::models::{QuotationAction, QuotationStatus};

/// Errors surfaced by the engine.
///
/// Data-quality problems (negative prices, unmatched products, missing
/// baselines) are deliberately *not* errors: the calculators are total
/// functions and report those as [`crate::models::DataQualityWarning`]s
/// embedded in their results. Everything here is a hard failure of a
/// workflow request or a collaborator.
#[derive(Debug, thiserror::Error, Serialize)]
pub enum EngineError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("illegal transition: {action} is not allowed from {current} (allowed: {allowed:?})")]
    IllegalTransition {
        current: QuotationStatus,
        action: QuotationAction,
        allowed: Vec<QuotationAction>,
    },

    #[error("missing required field '{field}' for {action}")]
    MissingRequiredField {
        action: QuotationAction,
        field: &'static str,
    },

    /// Another writer got there first. The quotation was left untouched;
    /// callers may re-read and retry. The engine never retries on its own.
    #[error("conflict: {0}")]
    Conflict(String),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("persistence timed out: {0}")]
    Timeout(String),

    #[error("event error: {0}")]
    Event(String),

    #[error("repository error: {0}")]
    Repository(
        #[from]
        #[serde(skip)]
        anyhow::Error,
    ),
}

impl From<validator::ValidationErrors> for EngineError {
    fn from(err: validator::ValidationErrors) -> Self {
        EngineError::Validation(err.to_string())
    }
}

impl EngineError {
    /// Whether the caller may reasonably retry after re-reading state.
    /// This is the single source of truth for retryability.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Conflict(_) | Self::Timeout(_))
    }

    /// Convenience constructor for conflicting concurrent transitions.
    pub fn conflict(message: impl Into<String>) -> Self {
        EngineError::Conflict(message.into())
    }
}
