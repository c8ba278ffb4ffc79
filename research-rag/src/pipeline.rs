//! Wiring for a matched ingestor/retriever pair.
//!
//! The [`RagPipeline`] builder hands one [`Embedder`] and one [`VectorIndex`]
//! to both an [`Ingestor`] and a [`Retriever`], so queries are always
//! embedded by the model that embedded the collection.
//!
//! # Example
//!
//! ```rust,ignore
//! use research_rag::{RagPipeline, RagConfig, InMemoryVectorIndex};
//!
//! let pipeline = RagPipeline::builder()
//!     .config(RagConfig::default())
//!     .embedder(Arc::new(my_embedder))
//!     .vector_index(Arc::new(InMemoryVectorIndex::new()))
//!     .collection("local_research")
//!     .build()?;
//!
//! pipeline.ingestor().ingest(Path::new("paper.pdf")).await?;
//! let passages = pipeline.retriever().search("search query", 3).await?;
//! ```

use std::sync::Arc;

use crate::config::RagConfig;
use crate::embedding::Embedder;
use crate::error::{RagError, Result};
use crate::ingest::Ingestor;
use crate::retriever::Retriever;
use crate::vector_index::VectorIndex;

/// The collection name used when none is configured.
pub const DEFAULT_COLLECTION: &str = "local_research";

/// An [`Ingestor`] and a [`Retriever`] sharing the same backends.
pub struct RagPipeline {
    config: RagConfig,
    ingestor: Arc<Ingestor>,
    retriever: Arc<Retriever>,
}

impl RagPipeline {
    /// Create a new [`RagPipelineBuilder`].
    pub fn builder() -> RagPipelineBuilder {
        RagPipelineBuilder::default()
    }

    /// Return a reference to the pipeline configuration.
    pub fn config(&self) -> &RagConfig {
        &self.config
    }

    /// The ingestor half of the pipeline.
    pub fn ingestor(&self) -> Arc<Ingestor> {
        Arc::clone(&self.ingestor)
    }

    /// The retriever half of the pipeline.
    pub fn retriever(&self) -> Arc<Retriever> {
        Arc::clone(&self.retriever)
    }
}

/// Builder for constructing a [`RagPipeline`].
///
/// `embedder` and `vector_index` are required. `config` defaults to
/// [`RagConfig::default`] and `collection` to [`DEFAULT_COLLECTION`].
#[derive(Default)]
pub struct RagPipelineBuilder {
    config: Option<RagConfig>,
    embedder: Option<Arc<dyn Embedder>>,
    vector_index: Option<Arc<dyn VectorIndex>>,
    collection: Option<String>,
}

impl RagPipelineBuilder {
    /// Set the pipeline configuration.
    pub fn config(mut self, config: RagConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the embedding backend.
    pub fn embedder(mut self, embedder: Arc<dyn Embedder>) -> Self {
        self.embedder = Some(embedder);
        self
    }

    /// Set the vector index backend.
    pub fn vector_index(mut self, index: Arc<dyn VectorIndex>) -> Self {
        self.vector_index = Some(index);
        self
    }

    /// Set the collection name.
    pub fn collection(mut self, name: impl Into<String>) -> Self {
        self.collection = Some(name.into());
        self
    }

    /// Build the [`RagPipeline`], validating that all required fields are set.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::ConfigError`] if a required field is missing, the
    /// collection name is empty, or the embedder reports zero dimensions.
    pub fn build(self) -> Result<RagPipeline> {
        let config = self.config.unwrap_or_default();
        let embedder = self
            .embedder
            .ok_or_else(|| RagError::ConfigError("embedder is required".to_string()))?;
        let index = self
            .vector_index
            .ok_or_else(|| RagError::ConfigError("vector_index is required".to_string()))?;
        let collection = self.collection.unwrap_or_else(|| DEFAULT_COLLECTION.to_string());

        if collection.trim().is_empty() {
            return Err(RagError::ConfigError("collection name must not be empty".to_string()));
        }
        if embedder.dimensions() == 0 {
            return Err(RagError::ConfigError(format!(
                "embedder '{}' reports zero dimensions",
                embedder.name()
            )));
        }

        let chunker = config.strategy.chunker(config.chunk_size, config.chunk_overlap);
        let ingestor = Ingestor::new(Arc::clone(&embedder), Arc::clone(&index), chunker, &collection);
        let retriever = Retriever::new(embedder, index, collection);

        Ok(RagPipeline { config, ingestor: Arc::new(ingestor), retriever: Arc::new(retriever) })
    }
}
