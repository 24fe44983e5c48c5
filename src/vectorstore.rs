//! Vector index trait for storing and searching chunk embeddings.

use async_trait::async_trait;

use crate::document::{Chunk, SearchResult};
use crate::error::Result;

/// A storage backend for chunk embeddings with similarity search.
///
/// Implementations persist (id, embedding, text, provenance) entries and
/// answer nearest-neighbor queries by cosine similarity. Entries are keyed
/// by chunk id: upserting an existing id overwrites the whole entry
/// atomically — a reader never observes mixed old/new fields. Concurrent
/// queries proceed without blocking on unrelated upserts.
///
/// # Example
///
/// ```rust,ignore
/// use docqa::{InMemoryVectorIndex, VectorIndex};
///
/// let index = InMemoryVectorIndex::new(384);
/// index.upsert(&chunks).await?;
/// let results = index.search(&query_embedding, 3).await?;
/// ```
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Insert or overwrite entries keyed by chunk id.
    ///
    /// # Errors
    ///
    /// Returns [`QaError::InvalidChunk`](crate::QaError::InvalidChunk) for
    /// a chunk with empty text and
    /// [`QaError::DimensionMismatch`](crate::QaError::DimensionMismatch)
    /// for an embedding of the wrong dimensionality.
    async fn upsert(&self, chunks: &[Chunk]) -> Result<()>;

    /// Return up to `top_k` entries ranked by descending cosine similarity.
    ///
    /// Fewer than `top_k` results are returned when fewer entries exist;
    /// an empty index yields an empty result, not an error. For a fixed
    /// index state and query embedding the ordering is deterministic, with
    /// ties broken by insertion order.
    ///
    /// # Errors
    ///
    /// Returns [`QaError::DimensionMismatch`](crate::QaError::DimensionMismatch)
    /// if the query embedding has the wrong dimensionality.
    async fn search(&self, embedding: &[f32], top_k: usize) -> Result<Vec<SearchResult>>;

    /// Delete every entry belonging to `document_id`.
    async fn remove_document(&self, document_id: &str) -> Result<()>;

    /// Return the number of stored entries.
    async fn count(&self) -> Result<usize>;

    /// Return the dimensionality this index was created with.
    fn dimensions(&self) -> usize;
}
