//! # docqa
//!
//! Retrieval-augmented question answering over PDF documents with
//! page-level citations.
//!
//! ## Overview
//!
//! The crate ingests PDF documents, indexes their text page by page for
//! semantic retrieval, and answers natural-language questions by
//! retrieving the most relevant passages and forwarding them, with the
//! question, to a generative text model. Two flows share one
//! [`VectorIndex`]:
//!
//! - **ingest**: [`TextExtractor`] → [`Chunker`] → [`EmbeddingProvider`]
//!   → [`VectorIndex::upsert`]
//! - **answer**: [`EmbeddingProvider`] → [`VectorIndex::search`] →
//!   [`ContextAssembler`] → [`AnswerProvider`]
//!
//! Every collaborator is a trait object injected into the
//! [`QaPipeline`], so backends are swappable and tests run against
//! in-process fakes.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use docqa::{InMemoryVectorIndex, QaConfig, QaPipeline};
//! use docqa::gemini::GeminiProvider;
//!
//! let gemini = Arc::new(GeminiProvider::from_env()?);
//! let pipeline = QaPipeline::builder()
//!     .config(QaConfig::builder().top_k(3).build()?)
//!     .embedding_provider(gemini.clone())
//!     .vector_index(Arc::new(InMemoryVectorIndex::new(768)))
//!     .answer_provider(gemini)
//!     .build()?;
//!
//! let report = pipeline.ingest("report.pdf", &std::fs::read("report.pdf")?).await?;
//! println!("indexed {} chunks", report.chunks_indexed);
//!
//! let answer = pipeline.answer("What does the report conclude?").await?;
//! for source in &answer.sources {
//!     println!("cited: {source}");
//! }
//! ```
//!
//! ## Feature flags
//!
//! - `gemini` — Gemini embedding and answer providers over REST
//! - `openai` — OpenAI embedding and answer providers over REST
//! - `qdrant` — durable [`VectorIndex`] backed by Qdrant

pub mod chunking;
pub mod config;
pub mod context;
pub mod document;
pub mod embedding;
pub mod error;
pub mod extract;
pub mod generation;
pub mod inmemory;
pub mod pipeline;
pub mod vectorstore;

#[cfg(feature = "gemini")]
pub mod gemini;
#[cfg(feature = "openai")]
pub mod openai;
#[cfg(feature = "qdrant")]
pub mod qdrant;

pub use chunking::{Chunker, PageChunker, WindowChunker};
pub use config::{QaConfig, QaConfigBuilder, NO_ANSWER_MESSAGE};
pub use context::{ContextAssembler, EvidenceBlock};
pub use document::{Chunk, Citation, Page, SearchResult};
pub use embedding::EmbeddingProvider;
pub use error::{QaError, Result};
pub use extract::{PdfTextExtractor, TextExtractor};
pub use generation::AnswerProvider;
pub use inmemory::InMemoryVectorIndex;
pub use pipeline::{Answer, ChunkFailure, IngestReport, QaPipeline, QaPipelineBuilder};
pub use vectorstore::VectorIndex;
