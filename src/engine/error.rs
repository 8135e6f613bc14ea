//! Errors that cross the engine's public boundary.

use crate::builder::ConfigurationError;
use thiserror::Error;

/// Failures returned by engine calls.
///
/// Technical failures of callbacks never appear here: they are routed to
/// error transitions or reported through the `ProcessingError` lifecycle
/// action.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error("Expected {role} of type {expected}")]
    TypeMismatch {
        role: &'static str,
        expected: &'static str,
    },

    #[error("No {kind} named '{name}'")]
    UnresolvedName { kind: &'static str, name: String },
}

impl EngineError {
    pub fn is_configuration(&self) -> bool {
        matches!(self, EngineError::Configuration(_))
    }
}
