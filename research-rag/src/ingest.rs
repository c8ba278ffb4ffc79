//! The document ingestor: load → chunk → embed → store.

use std::path::Path;
use std::sync::Arc;

use tracing::{error, info};

use crate::chunking::Chunker;
use crate::document::Document;
use crate::embedding::Embedder;
use crate::error::{RagError, Result};
use crate::loader;
use crate::vector_index::VectorIndex;

/// Chunks sent to the embedder per request. Well under OpenAI's per-request
/// input and token limits for 1000-character chunks.
pub const DEFAULT_EMBED_BATCH_SIZE: usize = 96;

/// Turns documents on disk into embedded chunks in a named collection.
///
/// Every ingestion mints a new document id, so ingesting the same file
/// twice stores its chunks twice. The index does not de-duplicate by
/// content.
pub struct Ingestor {
    embedder: Arc<dyn Embedder>,
    index: Arc<dyn VectorIndex>,
    chunker: Box<dyn Chunker>,
    collection: String,
    batch_size: usize,
}

impl Ingestor {
    /// Create an ingestor writing into `collection`.
    pub fn new(
        embedder: Arc<dyn Embedder>,
        index: Arc<dyn VectorIndex>,
        chunker: Box<dyn Chunker>,
        collection: impl Into<String>,
    ) -> Self {
        Self {
            embedder,
            index,
            chunker,
            collection: collection.into(),
            batch_size: DEFAULT_EMBED_BATCH_SIZE,
        }
    }

    /// Limit how many chunks go to the embedder in one call. Zero is treated as one.
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// The collection this ingestor writes into.
    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Ingest the document at `path` and return the number of chunks stored.
    ///
    /// # Errors
    ///
    /// - [`RagError::IngestionError`] if the file cannot be loaded.
    /// - [`RagError::EmbeddingError`] if the embedding backend fails.
    /// - [`RagError::DimensionMismatch`] if the vectors do not fit the collection.
    /// - [`RagError::RetrievalError`] if the vector index rejects the write.
    pub async fn ingest(&self, path: &Path) -> Result<usize> {
        let document = loader::load_document(path).await?;
        self.ingest_document(&document).await
    }

    /// Ingest the file at `path`, recording `source_name` as its origin.
    pub async fn ingest_named(&self, path: &Path, source_name: &str) -> Result<usize> {
        let document = loader::load_document_as(path, source_name).await?;
        self.ingest_document(&document).await
    }

    /// Ingest an already-loaded document and return the number of chunks stored.
    pub async fn ingest_document(&self, document: &Document) -> Result<usize> {
        let dimensions = self.embedder.dimensions();

        let mut chunks = self.chunker.chunk(document);
        if chunks.is_empty() {
            info!(document.id = %document.id, chunk_count = 0, "ingested document (empty)");
            return Ok(0);
        }

        let texts: Vec<&str> = chunks.iter().map(|c| c.text.as_str()).collect();
        let mut embeddings = Vec::with_capacity(texts.len());
        for batch in texts.chunks(self.batch_size) {
            let batch_embeddings = self.embedder.embed_batch(batch).await.inspect_err(|e| {
                error!(document.id = %document.id, error = %e, "embedding failed during ingestion");
            })?;
            embeddings.extend(batch_embeddings);
        }

        if embeddings.len() != chunks.len() {
            return Err(RagError::embedding(
                self.embedder.name(),
                format!("expected {} embeddings, got {}", chunks.len(), embeddings.len()),
            ));
        }
        if let Some(bad) = embeddings.iter().find(|e| e.len() != dimensions) {
            return Err(RagError::DimensionMismatch {
                collection: self.collection.clone(),
                expected: dimensions,
                actual: bad.len(),
            });
        }

        for (chunk, embedding) in chunks.iter_mut().zip(embeddings) {
            chunk.embedding = embedding;
        }

        self.index.create_collection(&self.collection, dimensions).await.inspect_err(|e| {
            error!(collection = %self.collection, error = %e, "failed to prepare collection");
        })?;
        self.index.upsert(&self.collection, &chunks).await.inspect_err(|e| {
            error!(document.id = %document.id, error = %e, "upsert failed during ingestion");
        })?;

        let chunk_count = chunks.len();
        info!(
            document.id = %document.id,
            source = document.source_uri.as_deref().unwrap_or_default(),
            collection = %self.collection,
            chunk_count,
            "ingested document"
        );
        Ok(chunk_count)
    }
}
