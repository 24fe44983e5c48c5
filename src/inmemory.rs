//! In-memory vector index using cosine similarity.
//!
//! This module provides [`InMemoryVectorIndex`], a zero-dependency index
//! guarded by a `tokio::sync::RwLock`. Suitable for development, testing,
//! and small corpora; use the feature-gated Qdrant backend for a durable
//! index.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::document::{Chunk, SearchResult};
use crate::error::{QaError, Result};
use crate::vectorstore::VectorIndex;

/// Entries in insertion order plus an id lookup into the slot vector.
///
/// Overwrites replace a slot in place, so similarity ties stay stable
/// across re-ingestion.
#[derive(Debug, Default)]
struct Entries {
    slots: Vec<Chunk>,
    by_id: HashMap<Uuid, usize>,
}

/// An in-memory [`VectorIndex`] using cosine similarity for search.
///
/// Writers are serialized and readers proceed concurrently via
/// `tokio::sync::RwLock`; entries are replaced whole, so a reader never
/// observes a torn entry.
#[derive(Debug)]
pub struct InMemoryVectorIndex {
    entries: RwLock<Entries>,
    dimensions: usize,
}

impl InMemoryVectorIndex {
    /// Create a new empty index for embeddings of the given dimensionality.
    pub fn new(dimensions: usize) -> Self {
        Self { entries: RwLock::new(Entries::default()), dimensions }
    }

    fn check_dimensions(&self, embedding: &[f32]) -> Result<()> {
        if embedding.len() != self.dimensions {
            return Err(QaError::DimensionMismatch {
                expected: self.dimensions,
                actual: embedding.len(),
            });
        }
        Ok(())
    }
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
    async fn upsert(&self, chunks: &[Chunk]) -> Result<()> {
        for chunk in chunks {
            if chunk.text.trim().is_empty() {
                return Err(QaError::InvalidChunk(format!("chunk {} has empty text", chunk.id)));
            }
            self.check_dimensions(&chunk.embedding)?;
        }

        let mut guard = self.entries.write().await;
        let entries = &mut *guard;
        for chunk in chunks {
            match entries.by_id.get(&chunk.id) {
                Some(&slot) => entries.slots[slot] = chunk.clone(),
                None => {
                    let slot = entries.slots.len();
                    entries.by_id.insert(chunk.id, slot);
                    entries.slots.push(chunk.clone());
                }
            }
        }
        Ok(())
    }

    async fn search(&self, embedding: &[f32], top_k: usize) -> Result<Vec<SearchResult>> {
        self.check_dimensions(embedding)?;

        let entries = self.entries.read().await;
        let mut scored: Vec<SearchResult> = entries
            .slots
            .iter()
            .map(|chunk| SearchResult {
                chunk: chunk.clone(),
                score: cosine_similarity(&chunk.embedding, embedding),
            })
            .collect();

        // Stable sort keeps insertion order for equal scores.
        scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(top_k);
        Ok(scored)
    }

    async fn remove_document(&self, document_id: &str) -> Result<()> {
        let mut guard = self.entries.write().await;
        let entries = &mut *guard;
        entries.slots.retain(|chunk| chunk.document_id != document_id);
        entries.by_id =
            entries.slots.iter().enumerate().map(|(slot, chunk)| (chunk.id, slot)).collect();
        Ok(())
    }

    async fn count(&self) -> Result<usize> {
        Ok(self.entries.read().await.slots.len())
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}
