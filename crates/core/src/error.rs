// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Contributors

//! Shared error type for the engine and its adapters.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("step '{step}' timed out after {timeout_secs}s")]
    Timeout { step: String, timeout_secs: u64 },

    #[error("execution cancelled")]
    Cancelled,

    #[error("step '{step}' failed: {message}")]
    StepFailure { step: String, message: String },

    #[error("template error: {0}")]
    TemplateError(String),

    #[error("predicate error: {0}")]
    PredicateError(String),

    #[error("storage error: {0}")]
    StorageError(String),

    #[error("config error: {0}")]
    ConfigError(String),

    #[error("authentication error: {0}")]
    AuthError(String),
}

impl EngineError {
    /// Stable kind name for logging fields, independent of the formatted
    /// message.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Timeout { .. } => "timeout",
            Self::Cancelled => "cancelled",
            Self::StepFailure { .. } => "step_failure",
            Self::TemplateError(_) => "template_error",
            Self::PredicateError(_) => "predicate_error",
            Self::StorageError(_) => "storage_error",
            Self::ConfigError(_) => "config_error",
            Self::AuthError(_) => "auth_error",
        }
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
