//! The [`VectorIndex`] capability: storing and searching chunk embeddings.

use async_trait::async_trait;

use crate::document::{Chunk, SearchResult};
use crate::error::Result;

/// A storage backend for chunk embeddings with cosine similarity search.
///
/// Implementations manage named collections of [`Chunk`]s. A collection's
/// vector dimension is fixed when it is created. Concurrent readers and
/// writers are the backend's responsibility; callers never lock.
///
/// # Example
///
/// ```rust,ignore
/// use research_rag::{VectorIndex, InMemoryVectorIndex};
///
/// let index = InMemoryVectorIndex::new();
/// index.create_collection("docs", 1024).await?;
/// index.upsert("docs", &chunks).await?;
/// let results = index.search("docs", &query_embedding, 3).await?;
/// ```
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Create a named collection with cosine distance.
    ///
    /// No-op if it already exists with the same dimension. Fails with
    /// [`RagError::DimensionMismatch`](crate::RagError::DimensionMismatch)
    /// if it exists with a different one.
    async fn create_collection(&self, name: &str, dimensions: usize) -> Result<()>;

    /// Return the vector dimension of a collection, or `None` if it does not exist.
    async fn collection_dimensions(&self, name: &str) -> Result<Option<usize>>;

    /// Delete a named collection and all its data.
    async fn delete_collection(&self, name: &str) -> Result<()>;

    /// Upsert chunks into a collection. Chunks must have embeddings set.
    async fn upsert(&self, collection: &str, chunks: &[Chunk]) -> Result<()>;

    /// Search for the `top_k` most similar chunks to the given embedding.
    ///
    /// Returns results ordered by descending similarity score, at most
    /// `top_k` of them and fewer if the collection holds fewer.
    async fn search(
        &self,
        collection: &str,
        embedding: &[f32],
        top_k: usize,
    ) -> Result<Vec<SearchResult>>;
}
