//! Scripted chat model for tests and offline demos
//!
//! [`ScriptedModel`] replays queued responses in order and records every
//! request it receives, so agent loops can be exercised deterministically.

use crate::client::{ChatModel, EmbeddingModel};
use crate::error::{LlmError, LlmResult};
use crate::types::{ChatRequest, ChatResponse, ToolCall};
use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::VecDeque;

/// A chat model that replays queued responses
#[derive(Default)]
pub struct ScriptedModel {
    responses: Mutex<VecDeque<ChatResponse>>,
    requests: Mutex<Vec<ChatRequest>>,
    fallback: Option<ChatResponse>,
}

impl ScriptedModel {
    /// Create an empty script
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a text response
    pub fn then_text(self, content: impl Into<String>) -> Self {
        self.then(ChatResponse::text(content))
    }

    /// Queue a single tool call response
    pub fn then_tool_call(self, name: impl Into<String>, arguments: Value) -> Self {
        let id = format!("call_{}", uuid::Uuid::new_v4().simple());
        self.then(ChatResponse::tool_calls(vec![ToolCall::new(
            id, name, arguments,
        )]))
    }

    /// Queue an arbitrary response
    pub fn then(self, response: ChatResponse) -> Self {
        self.responses.lock().push_back(response);
        self
    }

    /// Response returned once the queue is exhausted
    pub fn with_fallback(mut self, response: ChatResponse) -> Self {
        self.fallback = Some(response);
        self
    }

    /// Requests received so far
    pub fn requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().clone()
    }

    /// Number of responses not yet consumed
    pub fn remaining(&self) -> usize {
        self.responses.lock().len()
    }
}

#[async_trait]
impl ChatModel for ScriptedModel {
    async fn chat(&self, request: ChatRequest) -> LlmResult<ChatResponse> {
        self.requests.lock().push(request);

        let next = self.responses.lock().pop_front();
        next.or_else(|| self.fallback.clone())
            .ok_or(LlmError::EmptyResponse)
    }

    fn model_name(&self) -> &str {
        "scripted"
    }
}

/// Embedding model that maps each text to a fixed-size bag of letters
///
/// Only useful for tests: texts sharing letters end up close together.
pub struct LetterEmbeddingModel;

#[async_trait]
impl EmbeddingModel for LetterEmbeddingModel {
    async fn embed(&self, inputs: &[String]) -> LlmResult<Vec<Vec<f32>>> {
        Ok(inputs
            .iter()
            .map(|text| {
                let mut vector = vec![0.0f32; 26];
                for c in text.to_ascii_lowercase().bytes() {
                    if c.is_ascii_lowercase() {
                        vector[(c - b'a') as usize] += 1.0;
                    }
                }
                let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
                if norm > 0.0 {
                    vector.iter_mut().for_each(|x| *x /= norm);
                }
                vector
            })
            .collect())
    }

    fn model_name(&self) -> &str {
        "letters"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ChatMessage;
    use serde_json::json;

    #[tokio::test]
    async fn test_replays_in_order() {
        let model = ScriptedModel::new()
            .then_tool_call("lookup", json!({"q": "wifi"}))
            .then_text("done");

        let first = model
            .chat(ChatRequest::new(vec![ChatMessage::user("a")]))
            .await
            .unwrap();
        assert!(first.has_tool_calls());

        let second = model
            .chat(ChatRequest::new(vec![ChatMessage::user("b")]))
            .await
            .unwrap();
        assert_eq!(second.content, "done");

        assert_eq!(model.requests().len(), 2);
        assert!(model.chat(ChatRequest::default()).await.is_err());
    }

    #[tokio::test]
    async fn test_fallback_after_exhaustion() {
        let model = ScriptedModel::new().with_fallback(ChatResponse::text("again"));
        let response = model.chat(ChatRequest::default()).await.unwrap();
        assert_eq!(response.content, "again");
    }
}
