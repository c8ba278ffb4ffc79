//! Qdrant vector index backend.
//!
//! Provides [`QdrantVectorIndex`] which implements [`VectorIndex`] using
//! the [qdrant-client](https://docs.rs/qdrant-client) crate over gRPC.
//!
//! # Example
//!
//! ```rust,ignore
//! use research_rag::qdrant::QdrantVectorIndex;
//!
//! let index = QdrantVectorIndex::new("http://localhost:6334")?;
//! index.create_collection("local_research", 1024).await?;
//! index.upsert("local_research", &chunks).await?;
//! let results = index.search("local_research", &query_embedding, 3).await?;
//! ```

use std::collections::HashMap;

use async_trait::async_trait;
use qdrant_client::qdrant::value::Kind;
use qdrant_client::qdrant::vectors_config::Config as VectorsConfigKind;
use qdrant_client::qdrant::{
    CreateCollectionBuilder, Distance, PointStruct, SearchPointsBuilder, UpsertPointsBuilder,
    Value as QdrantValue, VectorParamsBuilder,
};
use qdrant_client::{Payload, Qdrant};
use tracing::debug;
use uuid::Uuid;

use crate::document::{Chunk, SearchResult};
use crate::error::{RagError, Result};
use crate::vector_index::VectorIndex;

const BACKEND: &str = "qdrant";

/// A [`VectorIndex`] backed by [Qdrant](https://qdrant.tech/).
///
/// Collections map to Qdrant collections with cosine distance. Chunk text,
/// document id, and metadata are stored as payload. Qdrant only accepts
/// UUIDs or integers as point ids, so each chunk id is mapped to a
/// deterministic UUIDv5 and kept verbatim in the payload.
pub struct QdrantVectorIndex {
    client: Qdrant,
}

impl QdrantVectorIndex {
    /// Create a new Qdrant vector index connecting to the given URL.
    pub fn new(url: &str) -> Result<Self> {
        let client = Qdrant::from_url(url).build().map_err(Self::map_err)?;
        Ok(Self { client })
    }

    fn map_err(e: qdrant_client::QdrantError) -> RagError {
        RagError::retrieval(BACKEND, e.to_string())
    }

    fn point_id(chunk_id: &str) -> String {
        Uuid::new_v5(&Uuid::NAMESPACE_OID, chunk_id.as_bytes()).to_string()
    }

    /// Extract a string from a Qdrant payload value.
    fn extract_string(value: &QdrantValue) -> Option<String> {
        match &value.kind {
            Some(Kind::StringValue(s)) => Some(s.clone()),
            _ => None,
        }
    }

    fn to_point(chunk: &Chunk) -> Result<PointStruct> {
        let metadata: serde_json::Map<String, serde_json::Value> = chunk
            .metadata
            .iter()
            .map(|(k, v)| (k.clone(), serde_json::Value::String(v.clone())))
            .collect();
        let payload = Payload::try_from(serde_json::json!({
            "chunk_id": chunk.id,
            "text": chunk.text,
            "document_id": chunk.document_id,
            "metadata": metadata,
        }))
        .map_err(|e| RagError::retrieval(BACKEND, format!("invalid payload: {e}")))?;

        Ok(PointStruct::new(Self::point_id(&chunk.id), chunk.embedding.clone(), payload))
    }
}

#[async_trait]
impl VectorIndex for QdrantVectorIndex {
    async fn create_collection(&self, name: &str, dimensions: usize) -> Result<()> {
        if let Some(existing) = self.collection_dimensions(name).await? {
            if existing != dimensions {
                return Err(RagError::DimensionMismatch {
                    collection: name.to_string(),
                    expected: existing,
                    actual: dimensions,
                });
            }
            debug!(collection = name, "qdrant collection already exists, skipping creation");
            return Ok(());
        }

        self.client
            .create_collection(
                CreateCollectionBuilder::new(name)
                    .vectors_config(VectorParamsBuilder::new(dimensions as u64, Distance::Cosine)),
            )
            .await
            .map_err(Self::map_err)?;

        debug!(collection = name, dimensions, "created qdrant collection");
        Ok(())
    }

    async fn collection_dimensions(&self, name: &str) -> Result<Option<usize>> {
        if !self.client.collection_exists(name).await.map_err(Self::map_err)? {
            return Ok(None);
        }

        let info = self.client.collection_info(name).await.map_err(Self::map_err)?;
        let size = info
            .result
            .and_then(|r| r.config)
            .and_then(|c| c.params)
            .and_then(|p| p.vectors_config)
            .and_then(|v| v.config)
            .and_then(|config| match config {
                VectorsConfigKind::Params(params) => Some(params.size as usize),
                VectorsConfigKind::ParamsMap(_) => None,
            })
            .ok_or_else(|| {
                RagError::retrieval(
                    BACKEND,
                    format!("collection '{name}' does not use a single unnamed vector"),
                )
            })?;
        Ok(Some(size))
    }

    async fn delete_collection(&self, name: &str) -> Result<()> {
        self.client.delete_collection(name).await.map_err(Self::map_err)?;
        debug!(collection = name, "deleted qdrant collection");
        Ok(())
    }

    async fn upsert(&self, collection: &str, chunks: &[Chunk]) -> Result<()> {
        if chunks.is_empty() {
            return Ok(());
        }

        let points = chunks.iter().map(Self::to_point).collect::<Result<Vec<_>>>()?;

        self.client
            .upsert_points(UpsertPointsBuilder::new(collection, points).wait(true))
            .await
            .map_err(Self::map_err)?;

        debug!(collection, count = chunks.len(), "upserted chunks to qdrant");
        Ok(())
    }

    async fn search(
        &self,
        collection: &str,
        embedding: &[f32],
        top_k: usize,
    ) -> Result<Vec<SearchResult>> {
        let response = self
            .client
            .search_points(
                SearchPointsBuilder::new(collection, embedding.to_vec(), top_k as u64)
                    .with_payload(true),
            )
            .await
            .map_err(Self::map_err)?;

        let results = response
            .result
            .into_iter()
            .map(|scored| {
                let field = |key: &str| {
                    scored.payload.get(key).and_then(Self::extract_string).unwrap_or_default()
                };

                let metadata: HashMap<String, String> = scored
                    .payload
                    .get("metadata")
                    .and_then(|v| match &v.kind {
                        Some(Kind::StructValue(s)) => Some(
                            s.fields
                                .iter()
                                .filter_map(|(k, v)| {
                                    Self::extract_string(v).map(|s| (k.clone(), s))
                                })
                                .collect(),
                        ),
                        _ => None,
                    })
                    .unwrap_or_default();

                SearchResult {
                    chunk: Chunk {
                        id: field("chunk_id"),
                        text: field("text"),
                        embedding: vec![],
                        metadata,
                        document_id: field("document_id"),
                    },
                    score: scored.score,
                }
            })
            .collect();

        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn point_ids_are_stable_uuids() {
        let a = QdrantVectorIndex::point_id("doc_0");
        assert_eq!(a, QdrantVectorIndex::point_id("doc_0"));
        assert_ne!(a, QdrantVectorIndex::point_id("doc_1"));
        assert!(Uuid::parse_str(&a).is_ok());
    }
}
