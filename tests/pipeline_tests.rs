//! End-to-end pipeline tests with in-process collaborator fakes.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use docqa::{
    AnswerProvider, EmbeddingProvider, InMemoryVectorIndex, Page, QaConfig, QaError, QaPipeline,
    TextExtractor, VectorIndex, NO_ANSWER_MESSAGE,
};

const DIM: usize = 8;

/// Deterministic embedder: identical text always maps to the same unit
/// vector, so a query equal to a stored chunk ranks first with
/// similarity 1.0.
struct HashEmbedder {
    dims: usize,
}

impl HashEmbedder {
    fn new(dims: usize) -> Self {
        Self { dims }
    }

    fn vector_for(&self, text: &str) -> Vec<f32> {
        let mut v: Vec<f32> = (0..self.dims)
            .map(|i| {
                let mut hasher = DefaultHasher::new();
                text.trim().hash(&mut hasher);
                i.hash(&mut hasher);
                // Map the hash into [-1.0, 1.0].
                (hasher.finish() % 2000) as f32 / 1000.0 - 1.0
            })
            .collect();
        let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for x in &mut v {
                *x /= norm;
            }
        }
        v
    }
}

#[async_trait]
impl EmbeddingProvider for HashEmbedder {
    async fn embed(&self, text: &str) -> docqa::Result<Vec<f32>> {
        Ok(self.vector_for(text))
    }

    fn dimensions(&self) -> usize {
        self.dims
    }
}

/// Embedder that fails for texts containing a marker substring.
struct FaultyEmbedder {
    inner: HashEmbedder,
    fail_marker: &'static str,
}

#[async_trait]
impl EmbeddingProvider for FaultyEmbedder {
    async fn embed(&self, text: &str) -> docqa::Result<Vec<f32>> {
        if text.contains(self.fail_marker) {
            return Err(QaError::Embedding {
                provider: "Faulty".into(),
                message: "provider unavailable".into(),
            });
        }
        self.inner.embed(text).await
    }

    fn dimensions(&self) -> usize {
        self.inner.dims
    }
}

/// Extractor that returns preset pages regardless of input bytes.
struct StubExtractor {
    pages: Vec<Page>,
}

impl StubExtractor {
    fn new(pages: &[(u32, &str)]) -> Self {
        Self {
            pages: pages
                .iter()
                .map(|(number, text)| Page { number: *number, text: text.to_string() })
                .collect(),
        }
    }
}

impl TextExtractor for StubExtractor {
    fn extract(&self, _bytes: &[u8]) -> docqa::Result<Vec<Page>> {
        Ok(self.pages.clone())
    }
}

/// Answer provider that returns a fixed answer and records the evidence
/// block it was given.
#[derive(Default)]
struct CapturingAnswerer {
    seen_context: Mutex<Option<String>>,
}

#[async_trait]
impl AnswerProvider for CapturingAnswerer {
    async fn generate(&self, _question: &str, context: &str) -> docqa::Result<String> {
        *self.seen_context.lock().await = Some(context.to_string());
        Ok("Synthesized answer.".to_string())
    }
}

/// Answer provider that always fails.
struct FailingAnswerer;

#[async_trait]
impl AnswerProvider for FailingAnswerer {
    async fn generate(&self, _question: &str, _context: &str) -> docqa::Result<String> {
        Err(QaError::Generation { provider: "Failing".into(), message: "quota exceeded".into() })
    }
}

fn pipeline_with(
    extractor: Arc<dyn TextExtractor>,
    embedder: Arc<dyn EmbeddingProvider>,
    index: Arc<InMemoryVectorIndex>,
    answerer: Arc<dyn AnswerProvider>,
) -> QaPipeline {
    QaPipeline::builder()
        .config(QaConfig::default())
        .extractor(extractor)
        .embedding_provider(embedder)
        .vector_index(index)
        .answer_provider(answerer)
        .build()
        .expect("valid pipeline")
}

/// Build a minimal PDF with one text page and one empty page.
fn two_page_pdf() -> Vec<u8> {
    use lopdf::content::{Content, Operation};
    use lopdf::{dictionary, Document, Object, Stream};

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let content = Content {
        operations: vec![
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec!["F1".into(), 12.into()]),
            Operation::new("Td", vec![100.into(), 700.into()]),
            Operation::new("Tj", vec![Object::string_literal("The sky is blue.")]),
            Operation::new("ET", vec![]),
        ],
    };
    let content_id =
        doc.add_object(Stream::new(dictionary! {}, content.encode().expect("encode content")));
    let text_page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
    });

    let empty_content_id = doc.add_object(Stream::new(
        dictionary! {},
        Content { operations: vec![] }.encode().expect("encode content"),
    ));
    let empty_page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => empty_content_id,
    });

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![text_page_id.into(), empty_page_id.into()],
            "Count" => 2,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).expect("serialize PDF");
    bytes
}

#[tokio::test]
async fn ingesting_a_pdf_skips_empty_pages() {
    let index = Arc::new(InMemoryVectorIndex::new(DIM));
    let pipeline = QaPipeline::builder()
        .embedding_provider(Arc::new(HashEmbedder::new(DIM)))
        .vector_index(index.clone())
        .answer_provider(Arc::new(CapturingAnswerer::default()))
        .build()
        .expect("valid pipeline");

    let report = pipeline.ingest("sky.pdf", &two_page_pdf()).await.unwrap();

    assert_eq!(report.pages, 1);
    assert_eq!(report.chunks_indexed, 1);
    assert!(report.failures.is_empty());
    assert_eq!(index.count().await.unwrap(), 1);
}

#[tokio::test]
async fn ingest_produces_one_chunk_per_non_empty_page() {
    let index = Arc::new(InMemoryVectorIndex::new(DIM));
    let pipeline = pipeline_with(
        Arc::new(StubExtractor::new(&[(1, "alpha text"), (2, "beta text"), (3, "gamma text")])),
        Arc::new(HashEmbedder::new(DIM)),
        index.clone(),
        Arc::new(CapturingAnswerer::default()),
    );

    let report = pipeline.ingest("notes.pdf", b"unused").await.unwrap();

    assert_eq!(report.chunks_indexed, 3);
    assert_eq!(index.count().await.unwrap(), 3);
}

#[tokio::test]
async fn unparseable_document_fails_ingestion() {
    let index = Arc::new(InMemoryVectorIndex::new(DIM));
    let pipeline = QaPipeline::builder()
        .embedding_provider(Arc::new(HashEmbedder::new(DIM)))
        .vector_index(index)
        .answer_provider(Arc::new(CapturingAnswerer::default()))
        .build()
        .expect("valid pipeline");

    let err = pipeline.ingest("bad.pdf", b"definitely not a pdf").await.unwrap_err();
    assert!(matches!(err, QaError::Extraction(_)));
}

#[tokio::test]
async fn answer_without_ingestion_returns_canned_response() {
    let index = Arc::new(InMemoryVectorIndex::new(DIM));
    let pipeline = pipeline_with(
        Arc::new(StubExtractor::new(&[])),
        Arc::new(HashEmbedder::new(DIM)),
        index,
        Arc::new(CapturingAnswerer::default()),
    );

    let answer = pipeline.answer("What color is the sky?").await.unwrap();

    assert_eq!(answer.answer, NO_ANSWER_MESSAGE);
    assert!(answer.sources.is_empty());
}

#[tokio::test]
async fn answer_cites_sources_in_rank_order() {
    let index = Arc::new(InMemoryVectorIndex::new(DIM));
    let answerer = Arc::new(CapturingAnswerer::default());
    let pipeline = QaPipeline::builder()
        // Admit weakly similar chunks so both pages are retrieved.
        .config(QaConfig::builder().similarity_threshold(-1.0).build().unwrap())
        .extractor(Arc::new(StubExtractor::new(&[(1, "the sky is blue"), (2, "grass is green")])))
        .embedding_provider(Arc::new(HashEmbedder::new(DIM)))
        .vector_index(index)
        .answer_provider(answerer.clone())
        .build()
        .expect("valid pipeline");

    pipeline.ingest("colors.pdf", b"unused").await.unwrap();

    // The question is identical to the page 1 chunk text, so that chunk
    // ranks first with cosine similarity 1.0.
    let answer = pipeline.answer("the sky is blue").await.unwrap();

    assert_eq!(answer.answer, "Synthesized answer.");
    assert_eq!(answer.sources.len(), 2);
    assert_eq!(answer.sources[0].document_id, "colors.pdf");
    assert_eq!(answer.sources[0].page, 1);
    assert_eq!(answer.sources[1].page, 2);

    let context = answerer.seen_context.lock().await.clone().expect("generator was called");
    assert!(context.contains("the sky is blue"));
    assert!(context.contains("colors.pdf"));
    assert!(context.contains("page 1"));
}

#[tokio::test]
async fn re_ingestion_fully_replaces_a_document() {
    let index = Arc::new(InMemoryVectorIndex::new(DIM));
    let embedder = Arc::new(HashEmbedder::new(DIM));
    let answerer = Arc::new(CapturingAnswerer::default());

    let first = pipeline_with(
        Arc::new(StubExtractor::new(&[(1, "old first page"), (2, "old second page"), (3, "old third page")])),
        embedder.clone(),
        index.clone(),
        answerer.clone(),
    );
    first.ingest("report.pdf", b"unused").await.unwrap();
    assert_eq!(index.count().await.unwrap(), 3);

    // The document shrank to two pages; page 3 must not linger.
    let second = pipeline_with(
        Arc::new(StubExtractor::new(&[(1, "new first page"), (2, "new second page")])),
        embedder,
        index.clone(),
        answerer,
    );
    second.ingest("report.pdf", b"unused").await.unwrap();

    assert_eq!(index.count().await.unwrap(), 2);
    let results = index.search(&HashEmbedder::new(DIM).vector_for("new first page"), 1).await.unwrap();
    assert_eq!(results[0].chunk.text, "new first page");
}

#[tokio::test]
async fn re_ingestion_is_idempotent() {
    let index = Arc::new(InMemoryVectorIndex::new(DIM));
    let pipeline = pipeline_with(
        Arc::new(StubExtractor::new(&[(1, "alpha"), (2, "beta")])),
        Arc::new(HashEmbedder::new(DIM)),
        index.clone(),
        Arc::new(CapturingAnswerer::default()),
    );

    pipeline.ingest("doc.pdf", b"unused").await.unwrap();
    pipeline.ingest("doc.pdf", b"unused").await.unwrap();

    assert_eq!(index.count().await.unwrap(), 2);
}

#[tokio::test]
async fn per_chunk_failures_are_reported_and_ingestion_continues() {
    let index = Arc::new(InMemoryVectorIndex::new(DIM));
    let pipeline = pipeline_with(
        Arc::new(StubExtractor::new(&[(1, "healthy text"), (2, "poison text"), (3, "more healthy text")])),
        Arc::new(FaultyEmbedder { inner: HashEmbedder::new(DIM), fail_marker: "poison" }),
        index.clone(),
        Arc::new(CapturingAnswerer::default()),
    );

    let report = pipeline.ingest("mixed.pdf", b"unused").await.unwrap();

    assert_eq!(report.chunks_indexed, 2);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].page, 2);
    assert!(report.failures[0].error.contains("provider unavailable"));
    assert_eq!(index.count().await.unwrap(), 2);
}

#[tokio::test]
async fn generation_failure_surfaces_as_error_not_canned_answer() {
    let index = Arc::new(InMemoryVectorIndex::new(DIM));
    let pipeline = pipeline_with(
        Arc::new(StubExtractor::new(&[(1, "some indexed text")])),
        Arc::new(HashEmbedder::new(DIM)),
        index,
        Arc::new(FailingAnswerer),
    );

    pipeline.ingest("doc.pdf", b"unused").await.unwrap();
    let err = pipeline.answer("some indexed text").await.unwrap_err();

    assert!(matches!(err, QaError::Generation { .. }));
}

#[tokio::test]
async fn builder_rejects_mismatched_embedding_space() {
    let result = QaPipeline::builder()
        .embedding_provider(Arc::new(HashEmbedder::new(DIM)))
        .vector_index(Arc::new(InMemoryVectorIndex::new(DIM * 2)))
        .answer_provider(Arc::new(CapturingAnswerer::default()))
        .build();

    assert!(matches!(result, Err(QaError::Config(_))));
}

#[tokio::test]
async fn health_reports_index_reachable() {
    let index = Arc::new(InMemoryVectorIndex::new(DIM));
    let pipeline = pipeline_with(
        Arc::new(StubExtractor::new(&[])),
        Arc::new(HashEmbedder::new(DIM)),
        index,
        Arc::new(CapturingAnswerer::default()),
    );

    pipeline.health().await.unwrap();
}
