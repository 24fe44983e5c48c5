//! Configuration for the question-answering pipeline.

use serde::{Deserialize, Serialize};

use crate::error::{QaError, Result};

/// Message returned when retrieval finds nothing to answer from.
pub const NO_ANSWER_MESSAGE: &str =
    "No relevant information found in the documents. Please make sure you've uploaded PDF files first.";

/// Configuration parameters for the question-answering pipeline.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QaConfig {
    /// Number of top results to retrieve for each question.
    pub top_k: usize,
    /// Maximum size of the assembled evidence block, in characters.
    pub context_budget: usize,
    /// Minimum similarity score for retrieved results (results below this
    /// are filtered out).
    pub similarity_threshold: f32,
    /// Answer returned when retrieval legitimately finds no matches.
    pub no_answer_message: String,
}

impl Default for QaConfig {
    fn default() -> Self {
        Self {
            top_k: 3,
            context_budget: 6000,
            similarity_threshold: 0.0,
            no_answer_message: NO_ANSWER_MESSAGE.to_string(),
        }
    }
}

impl QaConfig {
    /// Create a new builder for constructing a [`QaConfig`].
    pub fn builder() -> QaConfigBuilder {
        QaConfigBuilder::default()
    }
}

/// Builder for constructing a validated [`QaConfig`].
#[derive(Debug, Clone, Default)]
pub struct QaConfigBuilder {
    config: QaConfig,
}

impl QaConfigBuilder {
    /// Set the number of top results to retrieve for each question.
    pub fn top_k(mut self, k: usize) -> Self {
        self.config.top_k = k;
        self
    }

    /// Set the evidence block budget in characters.
    pub fn context_budget(mut self, budget: usize) -> Self {
        self.config.context_budget = budget;
        self
    }

    /// Set the minimum similarity threshold for filtering results.
    pub fn similarity_threshold(mut self, threshold: f32) -> Self {
        self.config.similarity_threshold = threshold;
        self
    }

    /// Set the answer returned when retrieval finds no matches.
    pub fn no_answer_message(mut self, message: impl Into<String>) -> Self {
        self.config.no_answer_message = message.into();
        self
    }

    /// Build the [`QaConfig`], validating that parameters are consistent.
    ///
    /// # Errors
    ///
    /// Returns [`QaError::Config`] if:
    /// - `top_k == 0`
    /// - `context_budget == 0`
    /// - `similarity_threshold` is outside `[-1.0, 1.0]`
    pub fn build(self) -> Result<QaConfig> {
        if self.config.top_k == 0 {
            return Err(QaError::Config("top_k must be greater than zero".to_string()));
        }
        if self.config.context_budget == 0 {
            return Err(QaError::Config("context_budget must be greater than zero".to_string()));
        }
        if !(-1.0..=1.0).contains(&self.config.similarity_threshold) {
            return Err(QaError::Config(format!(
                "similarity_threshold ({}) must be within [-1.0, 1.0]",
                self.config.similarity_threshold
            )));
        }
        Ok(self.config)
    }
}
