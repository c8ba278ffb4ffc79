//! Nearest-neighbour retrieval of chunk text for a query.

use std::sync::Arc;

use tracing::{debug, error};

use crate::document::SearchResult;
use crate::embedding::Embedder;
use crate::error::Result;
use crate::vector_index::VectorIndex;

/// Finds the chunks most similar to a query string.
pub struct Retriever {
    embedder: Arc<dyn Embedder>,
    index: Arc<dyn VectorIndex>,
    collection: String,
}

impl Retriever {
    /// Create a retriever reading from `collection`.
    ///
    /// `embedder` must be the one the collection was ingested with.
    pub fn new(
        embedder: Arc<dyn Embedder>,
        index: Arc<dyn VectorIndex>,
        collection: impl Into<String>,
    ) -> Self {
        Self { embedder, index, collection: collection.into() }
    }

    /// Return the text of the `k` chunks nearest to `query`, best first.
    ///
    /// Returns fewer than `k` when the collection holds fewer chunks, and an
    /// empty list when it is empty or has not been created yet.
    pub async fn search(&self, query: &str, k: usize) -> Result<Vec<String>> {
        let results = self.search_scored(query, k).await?;
        Ok(results.into_iter().map(|r| r.chunk.text).collect())
    }

    /// Like [`search`](Self::search), keeping the scores and chunk metadata.
    pub async fn search_scored(&self, query: &str, k: usize) -> Result<Vec<SearchResult>> {
        if k == 0 {
            return Ok(Vec::new());
        }
        if self.index.collection_dimensions(&self.collection).await?.is_none() {
            debug!(collection = %self.collection, "collection does not exist yet");
            return Ok(Vec::new());
        }

        let query_embedding = self.embedder.embed(query).await.inspect_err(|e| {
            error!(error = %e, "embedding failed during query");
        })?;

        let results =
            self.index.search(&self.collection, &query_embedding, k).await.inspect_err(|e| {
                error!(collection = %self.collection, error = %e, "vector index search failed");
            })?;

        debug!(collection = %self.collection, k, result_count = results.len(), "query completed");
        Ok(results)
    }
}
