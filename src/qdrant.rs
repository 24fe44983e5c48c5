//! Qdrant vector index backend.
//!
//! Provides [`QdrantVectorIndex`] which implements [`VectorIndex`] using
//! the [qdrant-client](https://docs.rs/qdrant-client) crate over gRPC.
//! This module is only available when the `qdrant` feature is enabled.
//!
//! # Example
//!
//! ```rust,ignore
//! use docqa::qdrant::QdrantVectorIndex;
//!
//! let index = QdrantVectorIndex::connect("http://localhost:6334", "documents", 768).await?;
//! index.upsert(&chunks).await?;
//! let results = index.search(&query_embedding, 3).await?;
//! ```

use async_trait::async_trait;
use qdrant_client::qdrant::point_id::PointIdOptions;
use qdrant_client::qdrant::value::Kind;
use qdrant_client::qdrant::{
    Condition, CountPointsBuilder, CreateCollectionBuilder, DeletePointsBuilder, Distance, Filter,
    PointStruct, SearchPointsBuilder, UpsertPointsBuilder, Value as QdrantValue,
    VectorParamsBuilder,
};
use qdrant_client::{Payload, Qdrant};
use tracing::debug;
use uuid::Uuid;

use crate::document::{Chunk, SearchResult};
use crate::error::{QaError, Result};
use crate::vectorstore::VectorIndex;

/// A durable [`VectorIndex`] backed by [Qdrant](https://qdrant.tech/).
///
/// One index maps to one Qdrant collection with cosine distance. Chunk
/// text and provenance are stored as point payload; the deterministic
/// chunk UUID doubles as the point id, so upserts overwrite in place.
/// Returned chunks carry empty embedding vectors — the stored vector is
/// not read back on search.
pub struct QdrantVectorIndex {
    client: Qdrant,
    collection: String,
    dimensions: usize,
}

impl QdrantVectorIndex {
    /// Connect to Qdrant and ensure the collection exists.
    ///
    /// The collection is created with cosine distance and the given
    /// dimensionality if it is not already present.
    pub async fn connect(url: &str, collection: impl Into<String>, dimensions: usize) -> Result<Self> {
        let client = Qdrant::from_url(url).build().map_err(Self::map_err)?;
        let index = Self { client, collection: collection.into(), dimensions };
        index.ensure_collection().await?;
        Ok(index)
    }

    /// Build an index over an existing client, ensuring the collection exists.
    pub async fn from_client(
        client: Qdrant,
        collection: impl Into<String>,
        dimensions: usize,
    ) -> Result<Self> {
        let index = Self { client, collection: collection.into(), dimensions };
        index.ensure_collection().await?;
        Ok(index)
    }

    async fn ensure_collection(&self) -> Result<()> {
        let collections = self.client.list_collections().await.map_err(Self::map_err)?;
        let exists = collections.collections.iter().any(|c| c.name == self.collection);
        if exists {
            debug!(collection = %self.collection, "qdrant collection already exists");
            return Ok(());
        }

        self.client
            .create_collection(
                CreateCollectionBuilder::new(&self.collection).vectors_config(
                    VectorParamsBuilder::new(self.dimensions as u64, Distance::Cosine),
                ),
            )
            .await
            .map_err(Self::map_err)?;

        debug!(collection = %self.collection, dimensions = self.dimensions, "created qdrant collection");
        Ok(())
    }

    fn map_err(e: qdrant_client::QdrantError) -> QaError {
        QaError::IndexUnavailable { backend: "qdrant".to_string(), message: e.to_string() }
    }

    /// Extract a string from a Qdrant payload value.
    fn extract_string(value: &QdrantValue) -> Option<String> {
        match &value.kind {
            Some(Kind::StringValue(s)) => Some(s.clone()),
            _ => None,
        }
    }

    /// Extract an integer from a Qdrant payload value.
    fn extract_integer(value: &QdrantValue) -> Option<i64> {
        match &value.kind {
            Some(Kind::IntegerValue(i)) => Some(*i),
            _ => None,
        }
    }
}

#[async_trait]
impl VectorIndex for QdrantVectorIndex {
    async fn upsert(&self, chunks: &[Chunk]) -> Result<()> {
        if chunks.is_empty() {
            return Ok(());
        }

        for chunk in chunks {
            if chunk.text.trim().is_empty() {
                return Err(QaError::InvalidChunk(format!("chunk {} has empty text", chunk.id)));
            }
            if chunk.embedding.len() != self.dimensions {
                return Err(QaError::DimensionMismatch {
                    expected: self.dimensions,
                    actual: chunk.embedding.len(),
                });
            }
        }

        let points: Vec<PointStruct> = chunks
            .iter()
            .map(|chunk| {
                let payload = Payload::try_from(serde_json::json!({
                    "text": chunk.text,
                    "document_id": chunk.document_id,
                    "page": chunk.page,
                }))
                .unwrap_or_default();

                PointStruct::new(chunk.id.to_string(), chunk.embedding.clone(), payload)
            })
            .collect();

        self.client
            .upsert_points(UpsertPointsBuilder::new(&self.collection, points).wait(true))
            .await
            .map_err(Self::map_err)?;

        debug!(collection = %self.collection, count = chunks.len(), "upserted chunks to qdrant");
        Ok(())
    }

    async fn search(&self, embedding: &[f32], top_k: usize) -> Result<Vec<SearchResult>> {
        if embedding.len() != self.dimensions {
            return Err(QaError::DimensionMismatch {
                expected: self.dimensions,
                actual: embedding.len(),
            });
        }

        let response = self
            .client
            .search_points(
                SearchPointsBuilder::new(&self.collection, embedding.to_vec(), top_k as u64)
                    .with_payload(true),
            )
            .await
            .map_err(Self::map_err)?;

        let results = response
            .result
            .into_iter()
            .map(|scored| {
                let id = scored
                    .id
                    .as_ref()
                    .and_then(|pid| match &pid.point_id_options {
                        Some(PointIdOptions::Uuid(s)) => Uuid::parse_str(s).ok(),
                        _ => None,
                    })
                    .unwrap_or_default();

                let text =
                    scored.payload.get("text").and_then(Self::extract_string).unwrap_or_default();

                let document_id = scored
                    .payload
                    .get("document_id")
                    .and_then(Self::extract_string)
                    .unwrap_or_default();

                let page = scored
                    .payload
                    .get("page")
                    .and_then(Self::extract_integer)
                    .unwrap_or_default() as u32;

                SearchResult {
                    chunk: Chunk { id, document_id, page, text, embedding: Vec::new() },
                    score: scored.score,
                }
            })
            .collect();

        Ok(results)
    }

    async fn remove_document(&self, document_id: &str) -> Result<()> {
        self.client
            .delete_points(
                DeletePointsBuilder::new(&self.collection)
                    .points(Filter::must([Condition::matches(
                        "document_id",
                        document_id.to_string(),
                    )]))
                    .wait(true),
            )
            .await
            .map_err(Self::map_err)?;

        debug!(collection = %self.collection, document_id, "removed document from qdrant");
        Ok(())
    }

    async fn count(&self) -> Result<usize> {
        let response = self
            .client
            .count(CountPointsBuilder::new(&self.collection).exact(true))
            .await
            .map_err(Self::map_err)?;

        Ok(response.result.map(|r| r.count as usize).unwrap_or(0))
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}
