//! Chat completion wire types

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Role of a chat message author
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// Instructions for the model
    System,
    /// End-user input
    User,
    /// Model output
    Assistant,
    /// Result of a tool call
    Tool,
    /// Developer instructions (newer OpenAI models)
    Developer,
}

impl std::fmt::Display for MessageRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let role = match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
            Self::Tool => "tool",
            Self::Developer => "developer",
        };
        f.write_str(role)
    }
}

/// A single chat message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Author role
    pub role: MessageRole,

    /// Text content
    #[serde(default, deserialize_with = "null_as_empty")]
    pub content: String,

    /// Optional author name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Tool calls requested by the assistant
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<ToolCall>>,

    /// Identifier of the tool call this message answers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

impl ChatMessage {
    /// Create a message with the given role and content
    pub fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            name: None,
            tool_calls: None,
            tool_call_id: None,
        }
    }

    /// Create a system message
    pub fn system(content: impl Into<String>) -> Self {
        Self::new(MessageRole::System, content)
    }

    /// Create a user message
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(MessageRole::User, content)
    }

    /// Create an assistant message
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(MessageRole::Assistant, content)
    }

    /// Create a developer message
    pub fn developer(content: impl Into<String>) -> Self {
        Self::new(MessageRole::Developer, content)
    }

    /// Create a tool result message answering `call_id`
    pub fn tool(call_id: impl Into<String>, content: impl Into<String>) -> Self {
        let mut msg = Self::new(MessageRole::Tool, content);
        msg.tool_call_id = Some(call_id.into());
        msg
    }

    /// Attach tool calls to an assistant message
    pub fn with_tool_calls(mut self, tool_calls: Vec<ToolCall>) -> Self {
        self.tool_calls = if tool_calls.is_empty() {
            None
        } else {
            Some(tool_calls)
        };
        self
    }

    /// Set the author name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Whether this message carries at least one tool call
    pub fn has_tool_calls(&self) -> bool {
        self.tool_calls.as_ref().is_some_and(|calls| !calls.is_empty())
    }
}

/// Function name and raw JSON arguments of a tool call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolFunction {
    /// Function name
    pub name: String,

    /// Arguments encoded as a JSON string
    #[serde(default)]
    pub arguments: String,
}

/// A tool call requested by the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Call identifier echoed back in the tool message
    pub id: String,

    /// Always `function`
    #[serde(rename = "type", default = "function_type")]
    pub call_type: String,

    /// Function being called
    pub function: ToolFunction,
}

fn function_type() -> String {
    "function".to_string()
}

impl ToolCall {
    /// Create a function tool call
    pub fn new(id: impl Into<String>, name: impl Into<String>, arguments: Value) -> Self {
        Self {
            id: id.into(),
            call_type: function_type(),
            function: ToolFunction {
                name: name.into(),
                arguments: arguments.to_string(),
            },
        }
    }

    /// Parse the JSON arguments, treating an empty string as `{}`
    pub fn parse_arguments(&self) -> Result<Value, serde_json::Error> {
        if self.function.arguments.trim().is_empty() {
            return Ok(json!({}));
        }
        serde_json::from_str(&self.function.arguments)
    }
}

/// A function the model may call
#[derive(Debug, Clone, PartialEq)]
pub struct ToolDefinition {
    /// Function name
    pub name: String,

    /// What the function does, shown to the model
    pub description: String,

    /// JSON schema of the arguments object
    pub parameters: Value,
}

impl ToolDefinition {
    /// Create a tool definition
    pub fn new(name: impl Into<String>, description: impl Into<String>, parameters: Value) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters,
        }
    }

    /// OpenAI `tools` array entry
    pub fn to_openai(&self) -> Value {
        json!({
            "type": "function",
            "function": {
                "name": self.name,
                "description": self.description,
                "parameters": self.parameters,
            }
        })
    }
}

impl Serialize for ToolDefinition {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_openai().serialize(serializer)
    }
}

/// Requested shape of the model output
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ResponseFormat {
    /// Free text
    #[default]
    Text,

    /// JSON matching a schema
    JsonSchema {
        /// Schema name
        name: String,
        /// JSON schema
        schema: Value,
        /// Whether the provider should enforce the schema strictly
        strict: bool,
    },
}

impl ResponseFormat {
    /// OpenAI `response_format` value
    pub fn to_openai(&self) -> Value {
        match self {
            Self::Text => json!({ "type": "text" }),
            Self::JsonSchema {
                name,
                schema,
                strict,
            } => json!({
                "type": "json_schema",
                "json_schema": {
                    "name": name,
                    "schema": schema,
                    "strict": strict,
                }
            }),
        }
    }
}

/// A chat completion request
#[derive(Debug, Clone, Default)]
pub struct ChatRequest {
    /// Conversation so far
    pub messages: Vec<ChatMessage>,

    /// Tools the model may call
    pub tools: Vec<ToolDefinition>,

    /// Model override; the client default is used when `None`
    pub model: Option<String>,

    /// Sampling temperature
    pub temperature: Option<f32>,

    /// Completion token limit
    pub max_tokens: Option<u32>,

    /// Output format
    pub response_format: Option<ResponseFormat>,
}

impl ChatRequest {
    /// Create a request for the given messages
    pub fn new(messages: Vec<ChatMessage>) -> Self {
        Self {
            messages,
            ..Default::default()
        }
    }

    /// Set the tools
    pub fn with_tools(mut self, tools: Vec<ToolDefinition>) -> Self {
        self.tools = tools;
        self
    }

    /// Override the model
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Set the temperature
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Set the completion token limit
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Request a particular output format
    pub fn with_response_format(mut self, format: ResponseFormat) -> Self {
        self.response_format = Some(format);
        self
    }

    /// Build the request body for `model`
    pub(crate) fn to_body(&self, model: &str) -> Value {
        let mut body = json!({
            "model": self.model.as_deref().unwrap_or(model),
            "messages": self.messages,
        });

        if !self.tools.is_empty() {
            body["tools"] = Value::Array(self.tools.iter().map(ToolDefinition::to_openai).collect());
        }
        if let Some(temperature) = self.temperature {
            body["temperature"] = json!(temperature);
        }
        if let Some(max_tokens) = self.max_tokens {
            body["max_tokens"] = json!(max_tokens);
        }
        if let Some(format) = &self.response_format {
            body["response_format"] = format.to_openai();
        }

        body
    }
}

/// Token accounting reported by the provider
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Usage {
    /// Prompt tokens
    #[serde(default)]
    pub prompt_tokens: u32,
    /// Completion tokens
    #[serde(default)]
    pub completion_tokens: u32,
    /// Total tokens
    #[serde(default)]
    pub total_tokens: u32,
}

/// A chat completion response
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChatResponse {
    /// Text content (may be empty when only tool calls are returned)
    pub content: String,

    /// Tool calls requested by the model
    pub tool_calls: Option<Vec<ToolCall>>,

    /// Model that produced the response
    pub model: String,

    /// Why generation stopped
    pub finish_reason: Option<String>,

    /// Token usage, when reported
    pub usage: Option<Usage>,
}

impl ChatResponse {
    /// A plain text response
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            finish_reason: Some("stop".to_string()),
            ..Default::default()
        }
    }

    /// A response that only requests tool calls
    pub fn tool_calls(calls: Vec<ToolCall>) -> Self {
        Self {
            tool_calls: Some(calls),
            finish_reason: Some("tool_calls".to_string()),
            ..Default::default()
        }
    }

    /// Whether the response requests at least one tool call
    pub fn has_tool_calls(&self) -> bool {
        self.tool_calls.as_ref().is_some_and(|calls| !calls.is_empty())
    }

    /// Convert into an assistant message for the conversation
    pub fn to_message(&self) -> ChatMessage {
        ChatMessage::assistant(self.content.clone())
            .with_tool_calls(self.tool_calls.clone().unwrap_or_default())
    }
}

// OpenAI response payloads

#[derive(Debug, Deserialize)]
pub(crate) struct CompletionPayload {
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub choices: Vec<ChoicePayload>,
    #[serde(default)]
    pub usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChoicePayload {
    pub message: ChatMessage,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct EmbeddingPayload {
    #[serde(default)]
    pub data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct EmbeddingData {
    pub index: usize,
    pub embedding: Vec<f32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_message_serialization() {
        let msg = ChatMessage::tool("call_1", "sunny");
        let value = serde_json::to_value(&msg).unwrap();

        assert_eq!(value["role"], "tool");
        assert_eq!(value["tool_call_id"], "call_1");
        assert!(value.get("tool_calls").is_none());
    }

    #[test]
    fn test_null_content_deserializes_empty() {
        let msg: ChatMessage = serde_json::from_value(json!({
            "role": "assistant",
            "content": null,
            "tool_calls": [{
                "id": "call_1",
                "type": "function",
                "function": { "name": "get_weather", "arguments": "{\"city\":\"London\"}" }
            }]
        }))
        .unwrap();

        assert!(msg.content.is_empty());
        assert!(msg.has_tool_calls());
        let call = &msg.tool_calls.unwrap()[0];
        assert_eq!(call.parse_arguments().unwrap()["city"], "London");
    }

    #[test]
    fn test_empty_arguments_parse_as_object() {
        let call = ToolCall {
            id: "1".into(),
            call_type: "function".into(),
            function: ToolFunction {
                name: "noop".into(),
                arguments: String::new(),
            },
        };
        assert_eq!(call.parse_arguments().unwrap(), json!({}));
    }

    #[test]
    fn test_request_body_includes_optional_fields() {
        let request = ChatRequest::new(vec![ChatMessage::user("hi")])
            .with_tools(vec![ToolDefinition::new(
                "echo",
                "Echo input",
                json!({"type": "object", "properties": {}}),
            )])
            .with_temperature(0.7)
            .with_max_tokens(500);

        let body = request.to_body("gpt-4o-mini");
        assert_eq!(body["model"], "gpt-4o-mini");
        assert_eq!(body["tools"][0]["function"]["name"], "echo");
        assert_eq!(body["max_tokens"], 500);
        assert!(body.get("response_format").is_none());

        let body = request.with_model("gpt-4").to_body("gpt-4o-mini");
        assert_eq!(body["model"], "gpt-4");
    }
}
