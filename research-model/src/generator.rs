//! The [`Generator`] capability.

use async_trait::async_trait;

use crate::error::Result;

/// A generative model answering a single prompt with a single completion.
///
/// Calls are stateless: no conversation history, no streaming. Failures
/// surface as [`ModelError::GenerationError`](crate::ModelError::GenerationError)
/// and are never retried here; retry policy belongs to the caller.
#[async_trait]
pub trait Generator: Send + Sync {
    /// The model identifier, used in logs.
    fn name(&self) -> &str;

    /// Send `prompt` and return the model's text completion.
    async fn complete(&self, prompt: &str) -> Result<String>;
}
