//! Question-answering pipeline orchestrator.
//!
//! The [`QaPipeline`] coordinates the two flows of the system over a
//! shared [`VectorIndex`]:
//!
//! - **ingest**: extract → chunk → embed → upsert
//! - **answer**: embed → search → assemble evidence → generate
//!
//! All collaborators are injected as trait objects, so tests substitute
//! in-process fakes for the embedding and answering providers.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use docqa::{InMemoryVectorIndex, QaConfig, QaPipeline};
//!
//! let pipeline = QaPipeline::builder()
//!     .config(QaConfig::default())
//!     .embedding_provider(Arc::new(embedder))
//!     .vector_index(Arc::new(InMemoryVectorIndex::new(768)))
//!     .answer_provider(Arc::new(generator))
//!     .build()?;
//!
//! let report = pipeline.ingest("report.pdf", &bytes).await?;
//! let answer = pipeline.answer("What does the report conclude?").await?;
//! ```

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{error, info};
use uuid::Uuid;

use crate::chunking::{Chunker, PageChunker};
use crate::config::QaConfig;
use crate::context::ContextAssembler;
use crate::document::Citation;
use crate::embedding::EmbeddingProvider;
use crate::error::{QaError, Result};
use crate::extract::{PdfTextExtractor, TextExtractor};
use crate::generation::AnswerProvider;
use crate::vectorstore::VectorIndex;

/// A synthesized answer with the evidence it was grounded in.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Answer {
    /// The generated answer text.
    pub answer: String,
    /// (document id, page) pairs used as evidence, in rank order. Empty
    /// when retrieval found nothing.
    pub sources: Vec<Citation>,
}

/// A chunk that could not be embedded or indexed during ingestion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkFailure {
    /// Id of the failed chunk.
    pub chunk_id: Uuid,
    /// Page the chunk was taken from.
    pub page: u32,
    /// Description of the failure.
    pub error: String,
}

/// Outcome of ingesting one document.
///
/// Ingestion continues past per-chunk failures; the report says exactly
/// which chunks made it into the index and which did not.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestReport {
    /// Identifier the document was ingested under.
    pub document_id: String,
    /// Number of non-empty pages extracted.
    pub pages: usize,
    /// Number of chunks successfully embedded and indexed.
    pub chunks_indexed: usize,
    /// Chunks that failed to embed or upsert.
    pub failures: Vec<ChunkFailure>,
}

/// The pipeline orchestrator.
///
/// Construct one via [`QaPipeline::builder()`].
pub struct QaPipeline {
    config: QaConfig,
    extractor: Arc<dyn TextExtractor>,
    chunker: Arc<dyn Chunker>,
    embedding_provider: Arc<dyn EmbeddingProvider>,
    vector_index: Arc<dyn VectorIndex>,
    answer_provider: Arc<dyn AnswerProvider>,
}

impl QaPipeline {
    /// Create a new [`QaPipelineBuilder`].
    pub fn builder() -> QaPipelineBuilder {
        QaPipelineBuilder::default()
    }

    /// Return a reference to the pipeline configuration.
    pub fn config(&self) -> &QaConfig {
        &self.config
    }

    /// Return a reference to the shared vector index.
    pub fn vector_index(&self) -> &Arc<dyn VectorIndex> {
        &self.vector_index
    }

    /// Ingest a document: extract → chunk → embed → upsert.
    ///
    /// Prior index entries for `document_id` are removed first, so
    /// re-ingestion fully replaces the document — including chunks for
    /// pages that no longer exist. Chunks are then processed one at a
    /// time; a chunk whose embedding or upsert fails is recorded in the
    /// report and ingestion continues with the rest.
    ///
    /// # Errors
    ///
    /// Returns [`QaError::Extraction`] if the bytes are not a parseable
    /// document, and [`QaError::IndexUnavailable`] if prior entries
    /// cannot be removed. Per-chunk embedding and indexing failures do
    /// not fail the call; they are surfaced in
    /// [`IngestReport::failures`].
    pub async fn ingest(&self, document_id: &str, bytes: &[u8]) -> Result<IngestReport> {
        let pages = self.extractor.extract(bytes).inspect_err(|e| {
            error!(document_id, error = %e, "extraction failed during ingestion");
        })?;

        let chunks = self.chunker.chunk(document_id, &pages);

        self.vector_index.remove_document(document_id).await.inspect_err(|e| {
            error!(document_id, error = %e, "failed to clear prior entries");
        })?;

        let mut report = IngestReport {
            document_id: document_id.to_string(),
            pages: pages.len(),
            chunks_indexed: 0,
            failures: Vec::new(),
        };

        for mut chunk in chunks {
            let embedding = match self.embedding_provider.embed(&chunk.text).await {
                Ok(embedding) => embedding,
                Err(e) => {
                    error!(document_id, page = chunk.page, error = %e, "chunk embedding failed");
                    report.failures.push(ChunkFailure {
                        chunk_id: chunk.id,
                        page: chunk.page,
                        error: e.to_string(),
                    });
                    continue;
                }
            };
            chunk.embedding = embedding;

            match self.vector_index.upsert(std::slice::from_ref(&chunk)).await {
                Ok(()) => report.chunks_indexed += 1,
                Err(e) => {
                    error!(document_id, page = chunk.page, error = %e, "chunk upsert failed");
                    report.failures.push(ChunkFailure {
                        chunk_id: chunk.id,
                        page: chunk.page,
                        error: e.to_string(),
                    });
                }
            }
        }

        info!(
            document_id,
            pages = report.pages,
            chunks_indexed = report.chunks_indexed,
            failures = report.failures.len(),
            "ingested document"
        );
        Ok(report)
    }

    /// Answer a question from the indexed documents.
    ///
    /// Embeds the question, retrieves the configured number of nearest
    /// chunks, assembles them into a budgeted evidence block, and asks
    /// the answering provider. When retrieval legitimately finds nothing
    /// the configured no-answer message is returned with empty sources;
    /// provider and index failures are surfaced as errors, never papered
    /// over with a fabricated answer.
    ///
    /// # Errors
    ///
    /// Returns [`QaError::Embedding`], [`QaError::IndexUnavailable`],
    /// [`QaError::DimensionMismatch`], or [`QaError::Generation`] when
    /// the corresponding step fails.
    pub async fn answer(&self, question: &str) -> Result<Answer> {
        let query_embedding = self.embedding_provider.embed(question).await.inspect_err(|e| {
            error!(error = %e, "query embedding failed");
        })?;

        let results = self
            .vector_index
            .search(&query_embedding, self.config.top_k)
            .await
            .inspect_err(|e| {
                error!(error = %e, "vector index search failed");
            })?;

        let threshold = self.config.similarity_threshold;
        let results: Vec<_> = results.into_iter().filter(|r| r.score >= threshold).collect();

        if results.is_empty() {
            info!(question_len = question.len(), "no relevant chunks retrieved");
            return Ok(Answer {
                answer: self.config.no_answer_message.clone(),
                sources: Vec::new(),
            });
        }

        let evidence = ContextAssembler::new(self.config.context_budget).assemble(&results);

        let answer =
            self.answer_provider.generate(question, &evidence.text).await.inspect_err(|e| {
                error!(error = %e, "answer generation failed");
            })?;

        info!(sources = evidence.citations.len(), "answered question");
        Ok(Answer { answer, sources: evidence.citations })
    }

    /// Check that the shared vector index is reachable.
    ///
    /// # Errors
    ///
    /// Returns [`QaError::IndexUnavailable`] when the index backend does
    /// not respond.
    pub async fn health(&self) -> Result<()> {
        self.vector_index.count().await.map(|_| ())
    }
}

/// Builder for constructing a [`QaPipeline`].
///
/// The embedding provider, vector index, and answer provider are
/// required; the extractor defaults to [`PdfTextExtractor`], the chunker
/// to [`PageChunker`], and the configuration to [`QaConfig::default()`].
#[derive(Default)]
pub struct QaPipelineBuilder {
    config: Option<QaConfig>,
    extractor: Option<Arc<dyn TextExtractor>>,
    chunker: Option<Arc<dyn Chunker>>,
    embedding_provider: Option<Arc<dyn EmbeddingProvider>>,
    vector_index: Option<Arc<dyn VectorIndex>>,
    answer_provider: Option<Arc<dyn AnswerProvider>>,
}

impl QaPipelineBuilder {
    /// Set the pipeline configuration.
    pub fn config(mut self, config: QaConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the text extractor.
    pub fn extractor(mut self, extractor: Arc<dyn TextExtractor>) -> Self {
        self.extractor = Some(extractor);
        self
    }

    /// Set the chunking strategy.
    pub fn chunker(mut self, chunker: Arc<dyn Chunker>) -> Self {
        self.chunker = Some(chunker);
        self
    }

    /// Set the embedding provider.
    pub fn embedding_provider(mut self, provider: Arc<dyn EmbeddingProvider>) -> Self {
        self.embedding_provider = Some(provider);
        self
    }

    /// Set the vector index backend.
    pub fn vector_index(mut self, index: Arc<dyn VectorIndex>) -> Self {
        self.vector_index = Some(index);
        self
    }

    /// Set the answer generation provider.
    pub fn answer_provider(mut self, provider: Arc<dyn AnswerProvider>) -> Self {
        self.answer_provider = Some(provider);
        self
    }

    /// Build the [`QaPipeline`], validating that all required
    /// collaborators are set and that the embedding provider and vector
    /// index agree on dimensionality.
    ///
    /// # Errors
    ///
    /// Returns [`QaError::Config`] if a required collaborator is missing
    /// or the embedding space does not match the index.
    pub fn build(self) -> Result<QaPipeline> {
        let embedding_provider = self
            .embedding_provider
            .ok_or_else(|| QaError::Config("embedding_provider is required".to_string()))?;
        let vector_index = self
            .vector_index
            .ok_or_else(|| QaError::Config("vector_index is required".to_string()))?;
        let answer_provider = self
            .answer_provider
            .ok_or_else(|| QaError::Config("answer_provider is required".to_string()))?;

        if embedding_provider.dimensions() != vector_index.dimensions() {
            return Err(QaError::Config(format!(
                "embedding provider produces {}-dimensional vectors but the index expects {}",
                embedding_provider.dimensions(),
                vector_index.dimensions()
            )));
        }

        Ok(QaPipeline {
            config: self.config.unwrap_or_default(),
            extractor: self.extractor.unwrap_or_else(|| Arc::new(PdfTextExtractor::new())),
            chunker: self.chunker.unwrap_or_else(|| Arc::new(PageChunker::new())),
            embedding_provider,
            vector_index,
            answer_provider,
        })
    }
}
