//! Data types for pages, chunks, search results, and citations.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single page of extracted document text.
///
/// Pages are 1-based and always carry non-empty, trimmed text; pages that
/// are empty after trimming are dropped during extraction.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Page {
    /// 1-based page number.
    pub number: u32,
    /// Trimmed page text.
    pub text: String,
}

/// A retrievable unit of text with its provenance and vector embedding.
///
/// Chunk ids are derived deterministically from the source document id and
/// page number, so re-ingesting the same document overwrites rather than
/// duplicates index entries.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Chunk {
    /// Deterministic unique identifier.
    pub id: Uuid,
    /// Identifier of the source document (e.g. the filename).
    pub document_id: String,
    /// 1-based page number this chunk was taken from.
    pub page: u32,
    /// The text content of the chunk. Never empty.
    pub text: String,
    /// The vector embedding for this chunk's text.
    ///
    /// Empty until the pipeline attaches one at indexing time.
    pub embedding: Vec<f32>,
}

/// A retrieved [`Chunk`] paired with a cosine similarity score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    /// The retrieved chunk.
    pub chunk: Chunk,
    /// The similarity score (higher is more relevant).
    pub score: f32,
}

/// A (document id, page) pair identifying the source of evidence.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Citation {
    /// Identifier of the source document.
    pub document_id: String,
    /// 1-based page number.
    pub page: u32,
}

impl Citation {
    /// Create a citation pointing at a chunk's source.
    pub fn for_chunk(chunk: &Chunk) -> Self {
        Self { document_id: chunk.document_id.clone(), page: chunk.page }
    }
}

impl std::fmt::Display for Citation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}, page {}", self.document_id, self.page)
    }
}
