//! Page-level text extraction from document bytes.

use tracing::{debug, warn};

use crate::document::Page;
use crate::error::{QaError, Result};

/// Extracts an ordered sequence of text pages from raw document bytes.
///
/// Implementations return pages in document order with 1-based numbering
/// and trimmed text; pages that are empty after trimming carry no
/// retrievable content and are dropped.
pub trait TextExtractor: Send + Sync {
    /// Extract the non-empty pages of a document.
    ///
    /// # Errors
    ///
    /// Returns [`QaError::Extraction`] if the bytes are not a parseable
    /// document of the expected format.
    fn extract(&self, bytes: &[u8]) -> Result<Vec<Page>>;
}

/// A [`TextExtractor`] for PDF documents, backed by [`lopdf`].
///
/// Text is extracted page by page so that every chunk downstream keeps a
/// page number for citations. A page whose text cannot be decoded is
/// logged and skipped rather than failing the whole document.
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfTextExtractor;

impl PdfTextExtractor {
    /// Create a new PDF text extractor.
    pub fn new() -> Self {
        Self
    }
}

impl TextExtractor for PdfTextExtractor {
    fn extract(&self, bytes: &[u8]) -> Result<Vec<Page>> {
        let doc = lopdf::Document::load_mem(bytes)
            .map_err(|e| QaError::Extraction(format!("failed to parse PDF: {e}")))?;

        let mut pages = Vec::new();
        for number in doc.get_pages().keys().copied() {
            let text = match doc.extract_text(&[number]) {
                Ok(text) => text,
                Err(e) => {
                    warn!(page = number, error = %e, "skipping page with undecodable text");
                    continue;
                }
            };

            let text = text.trim();
            if text.is_empty() {
                continue;
            }

            pages.push(Page { number, text: text.to_string() });
        }

        debug!(page_count = pages.len(), "extracted pages");
        Ok(pages)
    }
}
