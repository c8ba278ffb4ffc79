//! Error types for the research orchestrator.

use research_model::ModelError;
use research_rag::RagError;
use thiserror::Error;

/// Errors that abort a research run.
///
/// Nothing is retried and no partial report is produced: gathered
/// evidence is dropped with the failing run.
#[derive(Debug, Error)]
pub enum ResearchError {
    /// The topic was empty or whitespace.
    #[error("Invalid topic: {0}")]
    InvalidTopic(String),

    /// Embedding or vector index failure while gathering evidence.
    #[error(transparent)]
    Retrieval(#[from] RagError),

    /// The generative model failed while decomposing or synthesizing.
    #[error(transparent)]
    Generation(#[from] ModelError),
}

/// A convenience result type for research runs.
pub type Result<T> = std::result::Result<T, ResearchError>;
