//! Guardrailed question answering over a folder of documents
//!
//! One query runs through the input guardrails, redaction, retrieval,
//! intent routing, the provider gateway and finally the output guardrail.

use agentry_llm::ChatModel;
use agentry_rag::gateway::{model_gateway, OPENAI_PROVIDER};
use agentry_rag::guardrails::{sanitize_input, validate_input, validate_output};
use agentry_rag::retrieval::{Document, EmbeddingProvider, RagPipeline};
use agentry_rag::router::{classify_intent, route_to_model};
use agentry_rag::RagResult;
use std::sync::Arc;
use tracing::info;

/// Characters per chunk
pub const CHUNK_SIZE: usize = 300;

/// Characters shared by neighbouring chunks
pub const CHUNK_OVERLAP: usize = 50;

/// Chunks retrieved per query
pub const TOP_K: usize = 5;

/// Outcome of one query
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    /// The input guardrail rejected the query
    Blocked,
    /// Validated model answer
    Answer(String),
}

/// Indexed documents plus the chat model that answers from them
pub struct DocAssistant {
    pipeline: RagPipeline,
    model: Arc<dyn ChatModel>,
    model_override: Option<String>,
}

impl DocAssistant {
    /// Chunk and index `documents`
    pub async fn index(
        documents: &[Document],
        provider: Arc<dyn EmbeddingProvider>,
        model: Arc<dyn ChatModel>,
    ) -> RagResult<Self> {
        let mut pipeline = RagPipeline::new(provider);
        let chunks = pipeline.chunk_documents(documents, CHUNK_SIZE, CHUNK_OVERLAP)?;
        pipeline.build_index(chunks).await?;
        info!(documents = documents.len(), chunks = pipeline.len(), "Documents indexed");

        Ok(Self {
            pipeline,
            model,
            model_override: None,
        })
    }

    /// Always use `model` instead of routing by intent
    pub fn with_model_override(mut self, model: Option<String>) -> Self {
        self.model_override = model;
        self
    }

    /// Indexed chunk count
    pub fn chunks(&self) -> usize {
        self.pipeline.len()
    }

    /// Answer one user query
    pub async fn answer(&self, query: &str) -> RagResult<Reply> {
        if !validate_input(query) {
            return Ok(Reply::Blocked);
        }

        let clean = sanitize_input(query);
        let context = self.pipeline.retrieve(&clean, TOP_K).await;

        let intent = classify_intent(&clean);
        let model_name = self
            .model_override
            .clone()
            .unwrap_or_else(|| route_to_model(intent).to_string());
        info!(intent = %intent, model = %model_name, "Routing query");

        let answer = model_gateway(self.model.as_ref(), &clean, &context, OPENAI_PROVIDER, &model_name).await?;
        Ok(Reply::Answer(validate_output(&answer)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agentry_llm::mock::ScriptedModel;
    use agentry_rag::retrieval::{HashEmbeddingProvider, CHUNK_SEPARATOR};

    fn handbook() -> Vec<Document> {
        let sections: Vec<String> = (1..=7)
            .map(|i| format!("Section {}: {}", i, "pricing details and plan limits ".repeat(6)))
            .collect();
        vec![Document::new(sections.join("\n\n")).with_source("handbook.md")]
    }

    async fn assistant(model: &Arc<ScriptedModel>) -> DocAssistant {
        DocAssistant::index(
            &handbook(),
            Arc::new(HashEmbeddingProvider::new(256)),
            Arc::clone(model) as Arc<dyn ChatModel>,
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn test_answer_uses_five_chunks_and_routes_pricing() {
        let model = Arc::new(ScriptedModel::new().then_text("The Pro plan costs $20."));
        let assistant = assistant(&model).await;
        assert_eq!(assistant.chunks(), 7);

        let reply = assistant.answer("What is the price of the Pro plan?").await.unwrap();
        assert_eq!(reply, Reply::Answer("The Pro plan costs $20.".to_string()));

        let request = &model.requests()[0];
        assert_eq!(request.model.as_deref(), Some("gpt-4"));

        let prompt = &request.messages[0].content;
        let context = prompt
            .strip_prefix("Context:\n")
            .and_then(|rest| rest.split("\n\nQuestion:\n").next())
            .unwrap();
        assert_eq!(context.split(CHUNK_SEPARATOR).count(), TOP_K);
    }

    #[tokio::test]
    async fn test_blocked_input_never_reaches_model() {
        let model = Arc::new(ScriptedModel::new());
        let assistant = assistant(&model).await;

        let reply = assistant.answer("you are an idiot").await.unwrap();

        assert_eq!(reply, Reply::Blocked);
        assert!(model.requests().is_empty());
    }

    #[tokio::test]
    async fn test_override_redaction_and_output_cleanup() {
        let model = Arc::new(
            ScriptedModel::new().then_text("As an AI language model, I recommend the Basic plan."),
        );
        let assistant = assistant(&model).await.with_model_override(Some("gpt-4o-mini".to_string()));

        let reply = assistant
            .answer("Email me at jane@example.com about the error")
            .await
            .unwrap();

        assert_eq!(reply, Reply::Answer("I recommend the Basic plan.".to_string()));
        let request = &model.requests()[0];
        assert_eq!(request.model.as_deref(), Some("gpt-4o-mini"));
        assert!(request.messages[0].content.ends_with("Email me at [REDACTED_EMAIL] about the error"));
    }
}
