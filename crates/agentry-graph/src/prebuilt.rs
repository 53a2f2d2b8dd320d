//! Prebuilt nodes for the assistant/tools loop
//!
//! ```rust,ignore
//! let graph = StateGraph::new("support")
//!     .add_node("assistant", AgentNode::new("assistant", model.clone()).bind_tools(&tools))
//!     .add_node("tools", ToolNode::new(tools, model))
//!     .add_edge(START, "assistant")
//!     .add_conditional_edges("assistant", tools_condition, [("tools", "tools"), (END, END)])
//!     .add_edge("tools", "assistant")
//!     .compile()?;
//! ```

use crate::core::ExecutionContext;
use crate::error::GraphResult;
use crate::graph::END;
use crate::node::Node;
use crate::state::{GraphState, StateUpdate};
use agentry_llm::{ChatMessage, ChatModel, ChatRequest, MessageRole, ToolCall, ToolDefinition};
use agentry_rag::agent::{RunConfig, RunContext, Tool, ToolContext};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Calls a chat model on the conversation and appends its reply
pub struct AgentNode {
    name: String,
    model: Arc<dyn ChatModel>,
    system_prompt: Option<String>,
    tools: Vec<ToolDefinition>,
    model_name: Option<String>,
    temperature: Option<f32>,
}

impl AgentNode {
    /// Node called `name` backed by `model`
    pub fn new(name: impl Into<String>, model: Arc<dyn ChatModel>) -> Self {
        Self {
            name: name.into(),
            model,
            system_prompt: None,
            tools: Vec::new(),
            model_name: None,
            temperature: None,
        }
    }

    /// Prepend a system message to every call
    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    /// Advertise `tools` to the model
    pub fn bind_tools(mut self, tools: &[Arc<dyn Tool>]) -> Self {
        self.tools.extend(tools.iter().map(|t| t.definition()));
        self
    }

    /// Override the model name
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model_name = Some(model.into());
        self
    }

    /// Sampling temperature
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    fn request(&self, state: &GraphState) -> ChatRequest {
        let mut messages = Vec::with_capacity(state.messages().len() + 1);
        if let Some(prompt) = &self.system_prompt {
            messages.push(ChatMessage::system(prompt.clone()));
        }
        messages.extend(state.messages().iter().cloned());

        let mut request = ChatRequest::new(messages).with_tools(self.tools.clone());
        if let Some(model) = &self.model_name {
            request = request.with_model(model.clone());
        }
        if let Some(temperature) = self.temperature {
            request = request.with_temperature(temperature);
        }
        request
    }
}

#[async_trait]
impl Node for AgentNode {
    async fn execute(&self, state: &GraphState, ctx: &ExecutionContext) -> GraphResult<StateUpdate> {
        debug!(
            node = %self.name,
            step = ctx.step(),
            messages = state.messages().len(),
            "Calling model"
        );

        let response = self.model.chat(self.request(state)).await?;

        if response.has_tool_calls() {
            info!(node = %self.name, calls = response.tool_calls.as_ref().map_or(0, Vec::len), "Model requested tools");
        }
        Ok(StateUpdate::new().message(response.to_message()))
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Runs the tool calls of the last assistant message
pub struct ToolNode {
    tools: Vec<Arc<dyn Tool>>,
    config: RunConfig,
}

impl ToolNode {
    /// Node running `tools`; `model` is handed to tools that call agents
    pub fn new(tools: Vec<Arc<dyn Tool>>, model: Arc<dyn ChatModel>) -> Self {
        Self {
            tools,
            config: RunConfig::new(model),
        }
    }

    async fn run_call(&self, ctx: &ToolContext<()>, call: &ToolCall) -> String {
        let name = &call.function.name;
        let Some(tool) = self.tools.iter().find(|t| t.name() == *name) else {
            let names: Vec<String> = self.tools.iter().map(|t| t.name()).collect();
            warn!(tool = %name, "Model called an unknown tool");
            return format!("Error: {} is not a valid tool, try one of [{}].", name, names.join(", "));
        };

        let result = match call.parse_arguments() {
            Ok(args) => tool.call(ctx, args).await,
            Err(e) => Err(agentry_rag::RagError::tool(name.clone(), format!("invalid arguments: {}", e))),
        };

        match result {
            Ok(output) => output,
            Err(e) => {
                warn!(tool = %name, error = %e, "Tool failed");
                format!("Error: {}\n please fix your mistakes.", e)
            }
        }
    }
}

#[async_trait]
impl Node for ToolNode {
    async fn execute(&self, state: &GraphState, ctx: &ExecutionContext) -> GraphResult<StateUpdate> {
        let calls = state
            .last_message()
            .filter(|m| m.role == MessageRole::Assistant)
            .and_then(|m| m.tool_calls.clone())
            .unwrap_or_default();

        let tool_ctx = ToolContext {
            context: RunContext::new(()),
            config: self.config.clone(),
            agent_name: ctx.node().to_string(),
        };

        let mut messages = Vec::with_capacity(calls.len());
        for call in &calls {
            info!(tool = %call.function.name, "Running tool");
            let output = self.run_call(&tool_ctx, call).await;
            messages.push(ChatMessage::tool(call.id.clone(), output));
        }

        Ok(StateUpdate::new().messages(messages))
    }

    fn name(&self) -> &str {
        "tools"
    }
}

/// Route to `"tools"` when the last message asks for tool calls, else to END
pub fn tools_condition(state: &GraphState) -> String {
    match state.last_message() {
        Some(message) if message.has_tool_calls() => "tools".to_string(),
        _ => END.to_string(),
    }
}
