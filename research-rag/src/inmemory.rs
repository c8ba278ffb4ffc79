//! In-memory vector index using cosine similarity.
//!
//! [`InMemoryVectorIndex`] keeps every collection in a `HashMap` guarded by a
//! `tokio::sync::RwLock`. Nothing is persisted; it suits development, tests,
//! and single-user sessions.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::document::{Chunk, SearchResult};
use crate::error::{RagError, Result};
use crate::vector_index::VectorIndex;

const BACKEND: &str = "InMemory";

#[derive(Debug)]
struct Collection {
    dimensions: usize,
    chunks: HashMap<String, Chunk>,
}

/// An in-memory vector index using cosine similarity for search.
///
/// Collections map chunk ID → chunk. All operations are async-safe via
/// `tokio::sync::RwLock`.
///
/// # Example
///
/// ```rust,ignore
/// use research_rag::{InMemoryVectorIndex, VectorIndex};
///
/// let index = InMemoryVectorIndex::new();
/// index.create_collection("docs", 384).await?;
/// ```
#[derive(Debug, Default)]
pub struct InMemoryVectorIndex {
    collections: RwLock<HashMap<String, Collection>>,
}

impl InMemoryVectorIndex {
    /// Create a new empty in-memory vector index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of chunks stored in a collection, `0` if it does not exist.
    pub async fn len(&self, collection: &str) -> usize {
        self.collections.read().await.get(collection).map_or(0, |c| c.chunks.len())
    }
}

fn missing(collection: &str) -> RagError {
    RagError::retrieval(BACKEND, format!("collection '{collection}' does not exist"))
}

/// Compute cosine similarity between two vectors.
///
/// Returns 0.0 if either vector has zero magnitude.
pub(crate) fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

#[async_trait]
impl VectorIndex for InMemoryVectorIndex {
    async fn create_collection(&self, name: &str, dimensions: usize) -> Result<()> {
        let mut collections = self.collections.write().await;
        let collection = collections
            .entry(name.to_string())
            .or_insert_with(|| Collection { dimensions, chunks: HashMap::new() });
        if collection.dimensions != dimensions {
            return Err(RagError::DimensionMismatch {
                collection: name.to_string(),
                expected: collection.dimensions,
                actual: dimensions,
            });
        }
        Ok(())
    }

    async fn collection_dimensions(&self, name: &str) -> Result<Option<usize>> {
        Ok(self.collections.read().await.get(name).map(|c| c.dimensions))
    }

    async fn delete_collection(&self, name: &str) -> Result<()> {
        self.collections.write().await.remove(name);
        Ok(())
    }

    async fn upsert(&self, collection: &str, chunks: &[Chunk]) -> Result<()> {
        let mut collections = self.collections.write().await;
        let store = collections.get_mut(collection).ok_or_else(|| missing(collection))?;

        // Validate the whole batch before touching the collection.
        if let Some(bad) = chunks.iter().find(|c| c.embedding.len() != store.dimensions) {
            return Err(RagError::DimensionMismatch {
                collection: collection.to_string(),
                expected: store.dimensions,
                actual: bad.embedding.len(),
            });
        }

        for chunk in chunks {
            store.chunks.insert(chunk.id.clone(), chunk.clone());
        }
        Ok(())
    }

    async fn search(
        &self,
        collection: &str,
        embedding: &[f32],
        top_k: usize,
    ) -> Result<Vec<SearchResult>> {
        let collections = self.collections.read().await;
        let store = collections.get(collection).ok_or_else(|| missing(collection))?;

        let mut scored: Vec<SearchResult> = store
            .chunks
            .values()
            .map(|chunk| {
                let score = cosine_similarity(&chunk.embedding, embedding);
                SearchResult { chunk: chunk.clone(), score }
            })
            .collect();

        scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(top_k);
        Ok(scored)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk(id: &str, embedding: Vec<f32>) -> Chunk {
        Chunk {
            id: id.to_string(),
            text: format!("text of {id}"),
            embedding,
            metadata: HashMap::new(),
            document_id: "doc".to_string(),
        }
    }

    #[test]
    fn cosine_of_zero_vector_is_zero() {
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
        assert!((cosine_similarity(&[2.0, 0.0], &[1.0, 0.0]) - 1.0).abs() < 1e-6);
    }

    #[tokio::test]
    async fn recreating_with_other_dimension_fails() {
        let index = InMemoryVectorIndex::new();
        index.create_collection("docs", 3).await.unwrap();
        index.create_collection("docs", 3).await.unwrap();
        let err = index.create_collection("docs", 4).await.unwrap_err();
        assert!(matches!(err, RagError::DimensionMismatch { expected: 3, actual: 4, .. }));
    }

    #[tokio::test]
    async fn upsert_rejects_wrong_dimension_without_partial_write() {
        let index = InMemoryVectorIndex::new();
        index.create_collection("docs", 2).await.unwrap();
        let err = index
            .upsert("docs", &[chunk("a", vec![1.0, 0.0]), chunk("b", vec![1.0, 0.0, 0.0])])
            .await
            .unwrap_err();
        assert!(matches!(err, RagError::DimensionMismatch { expected: 2, actual: 3, .. }));
        assert_eq!(index.len("docs").await, 0);
    }

    #[tokio::test]
    async fn upsert_into_missing_collection_is_retrieval_error() {
        let index = InMemoryVectorIndex::new();
        let err = index.upsert("nope", &[chunk("a", vec![1.0])]).await.unwrap_err();
        assert!(matches!(err, RagError::RetrievalError { .. }));
    }

    #[tokio::test]
    async fn search_returns_nearest_first() {
        let index = InMemoryVectorIndex::new();
        index.create_collection("docs", 2).await.unwrap();
        index
            .upsert(
                "docs",
                &[chunk("x", vec![1.0, 0.0]), chunk("y", vec![0.0, 1.0]), chunk("xy", vec![1.0, 1.0])],
            )
            .await
            .unwrap();

        let results = index.search("docs", &[1.0, 0.1], 2).await.unwrap();
        let ids: Vec<&str> = results.iter().map(|r| r.chunk.id.as_str()).collect();
        assert_eq!(ids, vec!["x", "xy"]);
    }

    #[tokio::test]
    async fn delete_collection_forgets_dimension() {
        let index = InMemoryVectorIndex::new();
        index.create_collection("docs", 2).await.unwrap();
        index.delete_collection("docs").await.unwrap();
        assert_eq!(index.collection_dimensions("docs").await.unwrap(), None);
    }
}
