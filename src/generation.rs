//! Answer generation trait and the shared retrieval prompt.

use async_trait::async_trait;

use crate::error::Result;

/// A provider that synthesizes a natural-language answer from a question
/// and an evidence block.
///
/// Implementations wrap generative text backends (Gemini, OpenAI, etc.)
/// behind a unified async interface. The evidence block is assembled by
/// [`ContextAssembler`](crate::ContextAssembler) and already carries
/// citation markers for each passage.
#[async_trait]
pub trait AnswerProvider: Send + Sync {
    /// Generate an answer to `question` grounded in `context`.
    ///
    /// # Errors
    ///
    /// Returns [`QaError::Generation`](crate::QaError::Generation) on
    /// provider failure, quota, or timeout conditions.
    async fn generate(&self, question: &str, context: &str) -> Result<String>;
}

/// Build the grounded answering prompt sent to generative backends.
///
/// Instructs the model to answer only from the supplied passages and to
/// cite page numbers when referencing information.
pub fn answer_prompt(question: &str, context: &str) -> String {
    format!(
        "Based on the following context, answer the question. Include relevant \
         page numbers in your response.\n\n\
         Context:\n{context}\n\n\
         Question: {question}\n\n\
         Please provide a clear and concise answer with specific citations to \
         page numbers when referencing information."
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_carries_question_and_context() {
        let prompt = answer_prompt("Why is the sky blue?", "[1] sky.pdf, page 1\nRayleigh scattering.");
        assert!(prompt.contains("Why is the sky blue?"));
        assert!(prompt.contains("Rayleigh scattering."));
        assert!(prompt.contains("page numbers"));
    }
}
