//! # research-rag
//!
//! Document ingestion and retrieval for the deep research service.
//!
//! Documents are loaded from disk, split into overlapping chunks, embedded
//! by an [`Embedder`], and stored in a [`VectorIndex`] collection. A
//! [`Retriever`] embeds queries with the same embedder and returns the
//! nearest chunks.
//!
//! ## Backends
//!
//! | Capability | Backend | Availability |
//! |------------|---------|--------------|
//! | [`Embedder`] | [`OpenAIEmbedder`] | always |
//! | [`Embedder`] | [`OllamaEmbedder`] | always |
//! | [`VectorIndex`] | [`InMemoryVectorIndex`] | always |
//! | [`VectorIndex`] | `QdrantVectorIndex` | feature `qdrant` |
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use research_rag::*;
//!
//! let pipeline = RagPipeline::builder()
//!     .embedder(Arc::new(OllamaEmbedder::new()))
//!     .vector_index(Arc::new(InMemoryVectorIndex::new()))
//!     .build()?;
//!
//! let chunk_count = pipeline.ingestor().ingest(Path::new("notes.md")).await?;
//! let passages = pipeline.retriever().search("What color is the sky?", 3).await?;
//! ```

pub mod chunking;
pub mod config;
pub mod document;
pub mod embedding;
pub mod error;
pub mod inmemory;
pub mod ingest;
pub mod loader;
pub mod ollama;
pub mod openai;
pub mod pipeline;
pub mod retriever;
pub mod vector_index;

#[cfg(feature = "qdrant")]
pub mod qdrant;

pub use chunking::{Chunker, ChunkingStrategy, FixedSizeChunker, RecursiveChunker};
pub use config::{RagConfig, RagConfigBuilder};
pub use document::{Chunk, Document, SearchResult};
pub use embedding::Embedder;
pub use error::{RagError, Result};
pub use inmemory::InMemoryVectorIndex;
pub use ingest::Ingestor;
pub use loader::{DocumentKind, load_document};
pub use ollama::OllamaEmbedder;
pub use openai::OpenAIEmbedder;
pub use pipeline::{DEFAULT_COLLECTION, RagPipeline, RagPipelineBuilder};
pub use retriever::Retriever;
pub use vector_index::VectorIndex;

#[cfg(feature = "qdrant")]
pub use qdrant::QdrantVectorIndex;
