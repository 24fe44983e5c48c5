//! Gemini embedding and answer providers over the REST API.
//!
//! This module is only available when the `gemini` feature is enabled.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::embedding::EmbeddingProvider;
use crate::error::{QaError, Result};
use crate::generation::{answer_prompt, AnswerProvider};

/// The default Gemini API base URL.
const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// The default model for embeddings.
const DEFAULT_EMBED_MODEL: &str = "text-embedding-004";

/// The default dimensionality for `text-embedding-004`.
const DEFAULT_DIMENSIONS: usize = 768;

/// The default model for answer generation.
const DEFAULT_GENERATE_MODEL: &str = "gemini-2.5-flash";

/// An [`EmbeddingProvider`] and [`AnswerProvider`] backed by the Gemini
/// REST API.
///
/// Uses `reqwest` to call `embedContent`, `batchEmbedContents`, and
/// `generateContent` directly.
///
/// # Configuration
///
/// - `embed_model` – defaults to `text-embedding-004` (768 dimensions).
/// - `generate_model` – defaults to `gemini-2.5-flash`.
/// - `api_key` – from the constructor or the `GOOGLE_API_KEY`
///   environment variable.
///
/// # Example
///
/// ```rust,ignore
/// use docqa::gemini::GeminiProvider;
///
/// let provider = GeminiProvider::from_env()?;
/// let embedding = provider.embed("hello world").await?;
/// ```
pub struct GeminiProvider {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    embed_model: String,
    generate_model: String,
    dimensions: usize,
}

impl GeminiProvider {
    /// Create a new provider with the given API key and default models.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.is_empty() {
            return Err(QaError::Embedding {
                provider: "Gemini".into(),
                message: "API key must not be empty".into(),
            });
        }

        Ok(Self {
            client: reqwest::Client::new(),
            api_key,
            base_url: GEMINI_BASE_URL.into(),
            embed_model: DEFAULT_EMBED_MODEL.into(),
            generate_model: DEFAULT_GENERATE_MODEL.into(),
            dimensions: DEFAULT_DIMENSIONS,
        })
    }

    /// Create a new provider using the `GOOGLE_API_KEY` environment variable.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("GOOGLE_API_KEY").map_err(|_| QaError::Embedding {
            provider: "Gemini".into(),
            message: "GOOGLE_API_KEY environment variable not set".into(),
        })?;
        Self::new(api_key)
    }

    /// Set the embedding model and its dimensionality.
    pub fn with_embed_model(mut self, model: impl Into<String>, dimensions: usize) -> Self {
        self.embed_model = model.into();
        self.dimensions = dimensions;
        self
    }

    /// Set the generation model (e.g. `gemini-2.5-pro`).
    pub fn with_generate_model(mut self, model: impl Into<String>) -> Self {
        self.generate_model = model.into();
        self
    }

    /// Override the API base URL (useful for tests and proxies).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    async fn post_json<T: serde::de::DeserializeOwned>(
        &self,
        url: String,
        body: &impl Serialize,
        provider_error: impl Fn(String) -> QaError,
    ) -> Result<T> {
        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| {
                error!(provider = "Gemini", error = %e, "request failed");
                provider_error(format!("request failed: {e}"))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let detail = serde_json::from_str::<ErrorResponse>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);

            error!(provider = "Gemini", %status, "API error");
            return Err(provider_error(format!("API returned {status}: {detail}")));
        }

        response.json().await.map_err(|e| {
            error!(provider = "Gemini", error = %e, "failed to parse response");
            provider_error(format!("failed to parse response: {e}"))
        })
    }

    fn embedding_error(message: String) -> QaError {
        QaError::Embedding { provider: "Gemini".into(), message }
    }

    fn generation_error(message: String) -> QaError {
        QaError::Generation { provider: "Gemini".into(), message }
    }
}

// ── Gemini API request/response types ──────────────────────────────

#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Serialize)]
struct EmbedRequest<'a> {
    model: String,
    content: Content<'a>,
}

#[derive(Serialize)]
struct BatchEmbedRequest<'a> {
    requests: Vec<EmbedRequest<'a>>,
}

#[derive(Deserialize)]
struct EmbedResponse {
    embedding: EmbeddingValues,
}

#[derive(Deserialize)]
struct BatchEmbedResponse {
    embeddings: Vec<EmbeddingValues>,
}

#[derive(Deserialize)]
struct EmbeddingValues {
    values: Vec<f32>,
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: String,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: String,
}

// ── Provider implementations ───────────────────────────────────────

#[async_trait]
impl EmbeddingProvider for GeminiProvider {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        debug!(provider = "Gemini", text_len = text.len(), "embedding single text");

        let request = EmbedRequest {
            model: format!("models/{}", self.embed_model),
            content: Content { parts: vec![Part { text }] },
        };
        let url = format!("{}/models/{}:embedContent", self.base_url, self.embed_model);

        let response: EmbedResponse =
            self.post_json(url, &request, Self::embedding_error).await?;
        Ok(response.embedding.values)
    }

    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        debug!(provider = "Gemini", batch_size = texts.len(), "embedding batch");

        let request = BatchEmbedRequest {
            requests: texts
                .iter()
                .map(|text| EmbedRequest {
                    model: format!("models/{}", self.embed_model),
                    content: Content { parts: vec![Part { text }] },
                })
                .collect(),
        };
        let url = format!("{}/models/{}:batchEmbedContents", self.base_url, self.embed_model);

        let response: BatchEmbedResponse =
            self.post_json(url, &request, Self::embedding_error).await?;
        Ok(response.embeddings.into_iter().map(|e| e.values).collect())
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}

#[async_trait]
impl AnswerProvider for GeminiProvider {
    async fn generate(&self, question: &str, context: &str) -> Result<String> {
        debug!(
            provider = "Gemini",
            model = %self.generate_model,
            context_len = context.len(),
            "generating answer"
        );

        let prompt = answer_prompt(question, context);
        let request =
            GenerateRequest { contents: vec![Content { parts: vec![Part { text: &prompt }] }] };
        let url = format!("{}/models/{}:generateContent", self.base_url, self.generate_model);

        let response: GenerateResponse =
            self.post_json(url, &request, Self::generation_error).await?;

        let answer: String = response
            .candidates
            .first()
            .map(|c| c.content.parts.iter().map(|p| p.text.as_str()).collect())
            .unwrap_or_default();

        if answer.is_empty() {
            return Err(Self::generation_error("API returned no candidates".into()));
        }

        Ok(answer)
    }
}
