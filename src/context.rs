//! Evidence block assembly from retrieval results.

use tracing::debug;

use crate::document::{Citation, SearchResult};

/// A formatted, size-bounded evidence block with its citation list.
///
/// `citations` holds one entry per included passage, in retrieval order;
/// the final answer's source list is derived from it.
#[derive(Debug, Clone, PartialEq)]
pub struct EvidenceBlock {
    /// The formatted evidence text handed to the answering provider.
    pub text: String,
    /// (document id, page) for each included passage, in rank order.
    pub citations: Vec<Citation>,
}

impl EvidenceBlock {
    /// True when no passage was included.
    pub fn is_empty(&self) -> bool {
        self.citations.is_empty()
    }
}

/// Formats retrieval results into an [`EvidenceBlock`] under a character
/// budget.
///
/// Passages are included whole, in rank order. The first passage that
/// does not fit is dropped together with everything ranked below it —
/// a higher-ranked passage is never cut short to make room for a lower
/// one. The only exception is a top-ranked passage that alone exceeds the
/// budget: it is truncated at a character boundary so that retrieval
/// evidence is never silently discarded.
#[derive(Debug, Clone, Copy)]
pub struct ContextAssembler {
    budget: usize,
}

impl ContextAssembler {
    /// Create an assembler with the given character budget.
    pub fn new(budget: usize) -> Self {
        Self { budget }
    }

    /// Format one passage with its rank marker and provenance.
    fn format_entry(rank: usize, result: &SearchResult) -> String {
        format!(
            "[{rank}] From {}, page {}:\n{}\n\n",
            result.chunk.document_id, result.chunk.page, result.chunk.text
        )
    }

    /// Assemble an evidence block from ranked retrieval results.
    pub fn assemble(&self, results: &[SearchResult]) -> EvidenceBlock {
        let mut text = String::new();
        let mut citations = Vec::new();
        let mut used = 0;

        for (index, result) in results.iter().enumerate() {
            let entry = Self::format_entry(index + 1, result);
            let entry_len = entry.chars().count();

            if used + entry_len > self.budget {
                if index == 0 {
                    // A lone top-ranked passage larger than the whole
                    // budget is truncated rather than dropped.
                    text.extend(entry.chars().take(self.budget));
                    citations.push(Citation::for_chunk(&result.chunk));
                }
                debug!(
                    included = citations.len(),
                    dropped = results.len() - citations.len(),
                    "evidence budget reached"
                );
                break;
            }

            text.push_str(&entry);
            used += entry_len;
            citations.push(Citation::for_chunk(&result.chunk));
        }

        EvidenceBlock { text: text.trim_end().to_string(), citations }
    }
}
