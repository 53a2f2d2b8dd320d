//! HTTP client for OpenAI-compatible endpoints

use crate::config::ClientConfig;
use crate::error::{LlmError, LlmResult};
use crate::types::{
    ChatMessage, ChatRequest, ChatResponse, CompletionPayload, EmbeddingPayload, ToolDefinition,
};
use async_trait::async_trait;
use serde_json::json;
use tracing::{debug, warn};

/// Anything that can answer a chat completion request
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Run one chat completion
    async fn chat(&self, request: ChatRequest) -> LlmResult<ChatResponse>;

    /// Default model name
    fn model_name(&self) -> &str;
}

/// Anything that can turn texts into embedding vectors
#[async_trait]
pub trait EmbeddingModel: Send + Sync {
    /// Embed every input, preserving order
    async fn embed(&self, inputs: &[String]) -> LlmResult<Vec<Vec<f32>>>;

    /// Embedding model name
    fn model_name(&self) -> &str;
}

/// OpenAI-compatible chat and embeddings client
#[derive(Clone)]
pub struct Client {
    http: reqwest::Client,
    config: ClientConfig,
}

impl Client {
    /// Create a client from an explicit configuration
    pub fn new(config: ClientConfig) -> LlmResult<Self> {
        if config.api_key.trim().is_empty() {
            return Err(LlmError::configuration("API key must not be empty"));
        }

        let http = reqwest::Client::builder().timeout(config.timeout).build()?;

        Ok(Self { http, config })
    }

    /// Create a client from the environment (see [`ClientConfig::from_env`])
    pub fn from_env() -> LlmResult<Self> {
        Self::new(ClientConfig::from_env()?)
    }

    /// Clone this client targeting another default chat model
    pub fn with_model(&self, model: impl Into<String>) -> Self {
        let mut client = self.clone();
        client.config.model = model.into();
        client
    }

    /// Client configuration
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Chat completion without tools
    pub async fn chat_completion(&self, messages: Vec<ChatMessage>) -> LlmResult<ChatResponse> {
        self.chat(ChatRequest::new(messages)).await
    }

    /// Chat completion advertising `tools`
    pub async fn chat_completion_with_tools(
        &self,
        messages: Vec<ChatMessage>,
        tools: Vec<ToolDefinition>,
    ) -> LlmResult<ChatResponse> {
        self.chat(ChatRequest::new(messages).with_tools(tools)).await
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.config.base_url, path)
    }

    async fn post(&self, path: &str, body: &serde_json::Value) -> LlmResult<reqwest::Response> {
        let response = self
            .http
            .post(self.endpoint(path))
            .bearer_auth(&self.config.api_key)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), path, "Model endpoint returned an error");
            return Err(LlmError::api(status.as_u16(), body));
        }

        Ok(response)
    }
}

#[async_trait]
impl ChatModel for Client {
    async fn chat(&self, request: ChatRequest) -> LlmResult<ChatResponse> {
        let body = request.to_body(&self.config.model);

        debug!(
            model = %body["model"],
            message_count = request.messages.len(),
            tool_count = request.tools.len(),
            "Sending chat completion request"
        );

        let payload: CompletionPayload = self.post("chat/completions", &body).await?.json().await?;

        let choice = payload
            .choices
            .into_iter()
            .next()
            .ok_or(LlmError::EmptyResponse)?;

        let response = ChatResponse {
            content: choice.message.content,
            tool_calls: choice.message.tool_calls.filter(|calls| !calls.is_empty()),
            model: payload.model,
            finish_reason: choice.finish_reason,
            usage: payload.usage,
        };

        debug!(
            content_length = response.content.len(),
            tool_call_count = response.tool_calls.as_ref().map(|t| t.len()).unwrap_or(0),
            "Chat completion received"
        );

        Ok(response)
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}

#[async_trait]
impl EmbeddingModel for Client {
    async fn embed(&self, inputs: &[String]) -> LlmResult<Vec<Vec<f32>>> {
        if inputs.is_empty() {
            return Ok(Vec::new());
        }

        let body = json!({
            "model": self.config.embedding_model,
            "input": inputs,
        });

        debug!(
            model = %self.config.embedding_model,
            input_count = inputs.len(),
            "Sending embeddings request"
        );

        let mut payload: EmbeddingPayload = self.post("embeddings", &body).await?.json().await?;

        if payload.data.len() != inputs.len() {
            return Err(LlmError::EmptyResponse);
        }

        payload.data.sort_by_key(|d| d.index);
        Ok(payload.data.into_iter().map(|d| d.embedding).collect())
    }

    fn model_name(&self) -> &str {
        &self.config.embedding_model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ToolDefinition;
    use wiremock::matchers::{bearer_token, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> Client {
        Client::new(ClientConfig::new("sk-test").with_base_url(server.uri())).unwrap()
    }

    #[tokio::test]
    async fn test_chat_completion_text() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(bearer_token("sk-test"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "model": "gpt-4o-mini",
                "choices": [{
                    "message": { "role": "assistant", "content": "Hello there" },
                    "finish_reason": "stop"
                }],
                "usage": { "prompt_tokens": 5, "completion_tokens": 2, "total_tokens": 7 }
            })))
            .mount(&server)
            .await;

        let response = client_for(&server)
            .chat_completion(vec![ChatMessage::user("Hi")])
            .await
            .unwrap();

        assert_eq!(response.content, "Hello there");
        assert!(!response.has_tool_calls());
        assert_eq!(response.usage.unwrap().total_tokens, 7);
    }

    #[tokio::test]
    async fn test_chat_completion_tool_calls() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "model": "gpt-4o-mini",
                "choices": [{
                    "message": {
                        "role": "assistant",
                        "content": null,
                        "tool_calls": [{
                            "id": "call_abc",
                            "type": "function",
                            "function": { "name": "get_weather", "arguments": "{\"city\":\"Paris\"}" }
                        }]
                    },
                    "finish_reason": "tool_calls"
                }]
            })))
            .mount(&server)
            .await;

        let tools = vec![ToolDefinition::new(
            "get_weather",
            "Get the weather",
            json!({"type": "object", "properties": {"city": {"type": "string"}}}),
        )];
        let response = client_for(&server)
            .chat_completion_with_tools(vec![ChatMessage::user("Weather in Paris?")], tools)
            .await
            .unwrap();

        let calls = response.tool_calls.unwrap();
        assert_eq!(calls[0].function.name, "get_weather");
        assert_eq!(calls[0].parse_arguments().unwrap()["city"], "Paris");
    }

    #[tokio::test]
    async fn test_api_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(401).set_body_string("invalid key"))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .chat_completion(vec![ChatMessage::user("Hi")])
            .await
            .unwrap_err();

        match err {
            LlmError::Api { status, body } => {
                assert_eq!(status, 401);
                assert_eq!(body, "invalid key");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_no_choices_is_empty_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"model": "m", "choices": []})),
            )
            .mount(&server)
            .await;

        let err = client_for(&server)
            .chat_completion(vec![ChatMessage::user("Hi")])
            .await
            .unwrap_err();
        assert!(matches!(err, LlmError::EmptyResponse));
    }

    #[tokio::test]
    async fn test_embeddings_sorted_by_index() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/embeddings"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [
                    { "index": 1, "embedding": [0.0, 1.0] },
                    { "index": 0, "embedding": [1.0, 0.0] }
                ]
            })))
            .mount(&server)
            .await;

        let vectors = client_for(&server)
            .embed(&["first".to_string(), "second".to_string()])
            .await
            .unwrap();

        assert_eq!(vectors, vec![vec![1.0, 0.0], vec![0.0, 1.0]]);
    }

    #[test]
    fn test_empty_api_key_rejected() {
        assert!(Client::new(ClientConfig::new("  ")).is_err());
    }

    #[test]
    fn test_with_model_keeps_endpoint() {
        let client = Client::new(ClientConfig::new("sk").with_base_url("http://local/v1")).unwrap();
        let gpt4 = client.with_model("gpt-4");

        assert_eq!(ChatModel::model_name(&gpt4), "gpt-4");
        assert_eq!(gpt4.config().base_url, "http://local/v1");
    }
}
