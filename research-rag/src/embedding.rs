//! The [`Embedder`] capability: turning text into vectors.

use async_trait::async_trait;

use crate::error::Result;

/// A backend that generates vector embeddings from text input.
///
/// Implementations wrap specific embedding services (OpenAI, Ollama, etc.)
/// behind a unified async interface. The default [`embed_batch`](Embedder::embed_batch)
/// implementation calls [`embed`](Embedder::embed) sequentially;
/// backends that support native batching should override it.
///
/// The same instance must serve ingestion and queries: vectors from
/// different models live in different spaces and compare meaninglessly.
///
/// # Example
///
/// ```rust,ignore
/// use research_rag::Embedder;
///
/// let embedder = MyEmbedder::new();
/// let embedding = embedder.embed("hello world").await?;
/// assert_eq!(embedding.len(), embedder.dimensions());
/// ```
#[async_trait]
pub trait Embedder: Send + Sync {
    /// A short name identifying the backend, used in logs and errors.
    fn name(&self) -> &str;

    /// Generate an embedding vector for a single text input.
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Generate embedding vectors for a batch of text inputs.
    ///
    /// The default implementation calls [`embed`](Embedder::embed)
    /// sequentially for each input.
    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        let mut results = Vec::with_capacity(texts.len());
        for text in texts {
            results.push(self.embed(text).await?);
        }
        Ok(results)
    }

    /// Return the dimensionality of embeddings produced by this backend.
    fn dimensions(&self) -> usize;
}
