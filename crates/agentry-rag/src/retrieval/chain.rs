//! Question answering over retrieved documents

use super::document::Document;
use crate::error::RagResult;
use agentry_llm::{ChatMessage, ChatModel, ChatRequest};
use std::sync::Arc;
use tracing::info;

/// Default system prompt; `{context}` is replaced with the formatted documents
pub const RAG_SYSTEM_PROMPT: &str = "You are a document assistant. Use the following context to answer the question.
If you don't know the answer, just say that you don't know. Don't try to make up an answer.
Always cite your sources using the document metadata.

Context: {context}";

/// Render documents as numbered blocks with their source
pub fn format_documents(documents: &[Document]) -> String {
    documents
        .iter()
        .enumerate()
        .map(|(i, doc)| {
            format!(
                "Document {}:\n{}\nSource: {}",
                i + 1,
                doc.content,
                doc.source().unwrap_or("Unknown")
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Answers a question from a set of documents with one model call
pub struct RagChain {
    model: Arc<dyn ChatModel>,
    system_prompt: String,
    temperature: f32,
}

impl RagChain {
    /// Chain with the default prompt and temperature 0
    pub fn new(model: Arc<dyn ChatModel>) -> Self {
        Self {
            model,
            system_prompt: RAG_SYSTEM_PROMPT.to_string(),
            temperature: 0.0,
        }
    }

    /// Replace the system prompt; it should contain `{context}`
    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    /// Set the sampling temperature
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Answer `question` from `documents`
    pub async fn generate_response(&self, question: &str, documents: &[Document]) -> RagResult<String> {
        let context = format_documents(documents);
        let system = self.system_prompt.replace("{context}", &context);

        info!(documents = documents.len(), "Generating answer from documents");

        let request = ChatRequest::new(vec![ChatMessage::system(system), ChatMessage::user(question)])
            .with_temperature(self.temperature);
        let response = self.model.chat(request).await?;
        Ok(response.content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agentry_llm::mock::ScriptedModel;

    #[test]
    fn test_format_documents() {
        let docs = vec![
            Document::new("Clause 1").with_source("contract.pdf"),
            Document::new("Clause 2"),
        ];
        assert_eq!(
            format_documents(&docs),
            "Document 1:\nClause 1\nSource: contract.pdf\n\nDocument 2:\nClause 2\nSource: Unknown"
        );
    }

    #[tokio::test]
    async fn test_generate_response_embeds_context() {
        let model = Arc::new(ScriptedModel::new().then_text("The term is 12 months."));
        let chain = RagChain::new(model.clone());

        let answer = chain
            .generate_response("How long is the term?", &[Document::new("Term: 12 months")])
            .await
            .unwrap();

        assert_eq!(answer, "The term is 12 months.");
        let request = &model.requests()[0];
        assert!(request.messages[0].content.contains("Document 1:\nTerm: 12 months"));
        assert_eq!(request.messages[1].content, "How long is the term?");
        assert_eq!(request.temperature, Some(0.0));
    }
}
