//! Error types for research-model.

use thiserror::Error;

/// Errors that can occur when calling a generative model.
#[derive(Debug, Error)]
pub enum ModelError {
    /// The backend failed, timed out, or returned an unusable response.
    #[error("Generation error ({provider}): {message}")]
    GenerationError {
        /// The generation backend that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    ConfigError(String),
}

impl ModelError {
    pub(crate) fn generation(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::GenerationError { provider: provider.into(), message: message.into() }
    }
}

/// Result type alias for ModelError
pub type Result<T> = std::result::Result<T, ModelError>;
