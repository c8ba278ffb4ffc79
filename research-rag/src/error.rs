//! Error types for the `research-rag` crate.

use thiserror::Error;

/// Errors that can occur while ingesting or retrieving documents.
#[derive(Debug, Error)]
pub enum RagError {
    /// The document could not be loaded: missing, unreadable, or of an unsupported type.
    #[error("Ingestion error ({path}): {message}")]
    IngestionError {
        /// The path of the document that failed to load.
        path: String,
        /// A description of the failure.
        message: String,
    },

    /// An error occurred during embedding generation.
    #[error("Embedding error ({provider}): {message}")]
    EmbeddingError {
        /// The embedding provider that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// An embedding does not have the dimension the collection was created with.
    ///
    /// This is an embedding-class failure: the vectors cannot be stored.
    #[error("Embedding dimension mismatch in collection '{collection}': expected {expected}, got {actual}")]
    DimensionMismatch {
        /// The target collection.
        collection: String,
        /// The dimension the collection holds.
        expected: usize,
        /// The dimension that was offered.
        actual: usize,
    },

    /// The vector index is unavailable or rejected an operation.
    #[error("Retrieval error ({backend}): {message}")]
    RetrievalError {
        /// The vector index backend that produced the error.
        backend: String,
        /// A description of the failure.
        message: String,
    },

    /// A configuration validation error.
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl RagError {
    pub(crate) fn ingestion(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::IngestionError { path: path.into(), message: message.into() }
    }

    pub(crate) fn embedding(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::EmbeddingError { provider: provider.into(), message: message.into() }
    }

    pub(crate) fn retrieval(backend: impl Into<String>, message: impl Into<String>) -> Self {
        Self::RetrievalError { backend: backend.into(), message: message.into() }
    }
}

/// A convenience result type for RAG operations.
pub type Result<T> = std::result::Result<T, RagError>;
