//! Chunking strategies for extracted pages.
//!
//! This module provides the [`Chunker`] trait and two implementations:
//!
//! - [`PageChunker`] — one chunk per non-empty page (the default)
//! - [`WindowChunker`] — length-bounded character windows with overlap,
//!   keeping page provenance per sub-chunk

use uuid::Uuid;

use crate::document::{Chunk, Page};

/// Derive the deterministic id for a page-granularity chunk.
///
/// The id is a UUID v5 of `document_id:page`, so re-ingesting the same
/// document/page pair always yields the same id and upserts overwrite
/// instead of duplicating.
pub fn chunk_id(document_id: &str, page: u32) -> Uuid {
    Uuid::new_v5(&Uuid::NAMESPACE_OID, format!("{document_id}:{page}").as_bytes())
}

/// Derive the deterministic id for the `index`-th sub-chunk of a page.
pub fn sub_chunk_id(document_id: &str, page: u32, index: usize) -> Uuid {
    Uuid::new_v5(&Uuid::NAMESPACE_OID, format!("{document_id}:{page}:{index}").as_bytes())
}

/// A strategy for converting extracted pages into chunks.
///
/// Implementations produce [`Chunk`]s with text and provenance but no
/// embeddings. Embeddings are attached later by the pipeline.
pub trait Chunker: Send + Sync {
    /// Split a document's pages into chunks.
    ///
    /// Every returned chunk has non-empty text, carries the page number it
    /// came from, and an id derived deterministically from its provenance.
    fn chunk(&self, document_id: &str, pages: &[Page]) -> Vec<Chunk>;
}

/// One chunk per non-empty page.
///
/// Page-granularity chunking keeps citations at the precision users
/// expect (page numbers) without the complexity of semantic splitting.
#[derive(Debug, Clone, Copy, Default)]
pub struct PageChunker;

impl PageChunker {
    /// Create a new page-granularity chunker.
    pub fn new() -> Self {
        Self
    }
}

impl Chunker for PageChunker {
    fn chunk(&self, document_id: &str, pages: &[Page]) -> Vec<Chunk> {
        pages
            .iter()
            .filter(|page| !page.text.trim().is_empty())
            .map(|page| Chunk {
                id: chunk_id(document_id, page.number),
                document_id: document_id.to_string(),
                page: page.number,
                text: page.text.trim().to_string(),
                embedding: Vec::new(),
            })
            .collect()
    }
}

/// Splits each page into fixed-size character windows with overlap.
///
/// Sub-chunks keep the page number of the page they were cut from, so
/// citation precision is unchanged. Ids are derived from
/// (document id, page, window index). `overlap` must be smaller than
/// `window_size`; a degenerate configuration falls back to stepping one
/// character at a time.
#[derive(Debug, Clone)]
pub struct WindowChunker {
    window_size: usize,
    overlap: usize,
}

impl WindowChunker {
    /// Create a new `WindowChunker`.
    ///
    /// # Arguments
    ///
    /// * `window_size` — maximum number of characters per chunk
    /// * `overlap` — number of overlapping characters between consecutive chunks
    pub fn new(window_size: usize, overlap: usize) -> Self {
        Self { window_size, overlap }
    }

    /// Split text into windows at character boundaries.
    fn split(&self, text: &str) -> Vec<String> {
        let chars: Vec<char> = text.chars().collect();
        if chars.is_empty() {
            return Vec::new();
        }

        let step = self.window_size.saturating_sub(self.overlap).max(1);
        let mut windows = Vec::new();
        let mut start = 0;

        while start < chars.len() {
            let end = (start + self.window_size).min(chars.len());
            windows.push(chars[start..end].iter().collect());
            if end == chars.len() {
                break;
            }
            start += step;
        }

        windows
    }
}

impl Chunker for WindowChunker {
    fn chunk(&self, document_id: &str, pages: &[Page]) -> Vec<Chunk> {
        let mut chunks = Vec::new();

        for page in pages {
            for (index, window) in self.split(&page.text).into_iter().enumerate() {
                let text = window.trim().to_string();
                if text.is_empty() {
                    continue;
                }
                chunks.push(Chunk {
                    id: sub_chunk_id(document_id, page.number, index),
                    document_id: document_id.to_string(),
                    page: page.number,
                    text,
                    embedding: Vec::new(),
                });
            }
        }

        chunks
    }
}
