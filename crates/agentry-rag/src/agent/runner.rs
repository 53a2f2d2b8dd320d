//! The agent loop
//!
//! [`Runner::run`] drives a conversation: it calls the model with the current
//! agent's instructions, tools and handoffs, executes any tool calls, switches
//! agents on handoff, and stops when the model answers without calling a
//! tool.

use super::agent::{Agent, OutputSchema};
use super::context::RunContext;
use super::tool::ToolContext;
use crate::error::{RagError, RagResult};
use agentry_llm::{ChatMessage, ChatModel, ChatRequest, ToolCall, ToolDefinition};
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Default turn budget
pub const DEFAULT_MAX_TURNS: usize = 10;

const MULTIPLE_HANDOFFS: &str = "Multiple handoffs detected, ignoring this one.";

/// Settings shared by every agent in a run
pub struct RunConfig<C = ()> {
    /// Model used for every turn
    pub model: Arc<dyn ChatModel>,

    /// Maximum number of model calls before giving up
    pub max_turns: usize,

    agents: HashMap<String, Arc<Agent<C>>>,
}

impl<C: Send + Sync + 'static> RunConfig<C> {
    /// Run with `model` and the default turn budget
    pub fn new(model: Arc<dyn ChatModel>) -> Self {
        Self {
            model,
            max_turns: DEFAULT_MAX_TURNS,
            agents: HashMap::new(),
        }
    }

    /// Set the turn budget
    pub fn with_max_turns(mut self, max_turns: usize) -> Self {
        self.max_turns = max_turns;
        self
    }

    /// Register an agent so named handoffs can reach it
    pub fn with_agent(mut self, agent: Arc<Agent<C>>) -> Self {
        self.agents.insert(agent.name().to_string(), agent);
        self
    }

    /// Register several agents
    pub fn with_agents(mut self, agents: impl IntoIterator<Item = Arc<Agent<C>>>) -> Self {
        for agent in agents {
            self.agents.insert(agent.name().to_string(), agent);
        }
        self
    }

    /// Registered agent by name
    pub fn agent(&self, name: &str) -> Option<&Arc<Agent<C>>> {
        self.agents.get(name)
    }
}

impl<C> Clone for RunConfig<C> {
    fn clone(&self) -> Self {
        Self {
            model: Arc::clone(&self.model),
            max_turns: self.max_turns,
            agents: self.agents.clone(),
        }
    }
}

/// Input to a run
#[derive(Debug, Clone)]
pub enum RunInput {
    /// A single user message
    Text(String),

    /// A conversation so far, e.g. from [`RunResult::to_input_list`]
    Messages(Vec<ChatMessage>),
}

impl RunInput {
    fn into_messages(self) -> Vec<ChatMessage> {
        match self {
            Self::Text(text) => vec![ChatMessage::user(text)],
            Self::Messages(messages) => messages,
        }
    }
}

impl From<&str> for RunInput {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for RunInput {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<Vec<ChatMessage>> for RunInput {
    fn from(messages: Vec<ChatMessage>) -> Self {
        Self::Messages(messages)
    }
}

/// Something that happened during a run
#[derive(Debug, Clone, PartialEq)]
pub enum RunItem {
    /// Text produced by an agent
    MessageOutput {
        /// Agent that spoke
        agent: String,
        /// Message text
        content: String,
    },

    /// The model asked for a handoff
    HandoffCall {
        /// Agent that asked
        agent: String,
        /// Handoff tool name
        tool_name: String,
    },

    /// Control moved to another agent
    HandoffOutput {
        /// Agent that handed off
        source: String,
        /// Agent that took over
        target: String,
    },

    /// The model asked for a tool call
    ToolCall {
        /// Agent that asked
        agent: String,
        /// Tool name
        name: String,
        /// Raw JSON arguments
        arguments: String,
    },

    /// A tool returned
    ToolCallOutput {
        /// Agent that owns the tool
        agent: String,
        /// Tool name
        name: String,
        /// Tool output or error text
        output: String,
    },
}

impl RunItem {
    /// Agent the item belongs to
    pub fn agent(&self) -> &str {
        match self {
            Self::MessageOutput { agent, .. }
            | Self::HandoffCall { agent, .. }
            | Self::ToolCall { agent, .. }
            | Self::ToolCallOutput { agent, .. } => agent,
            Self::HandoffOutput { source, .. } => source,
        }
    }

    /// One-line rendering for chat transcripts
    pub fn describe(&self) -> String {
        match self {
            Self::MessageOutput { agent, content } => format!("**{}:** {}", agent, content),
            Self::HandoffOutput { source, target } => {
                format!("Handed off from {} to {}", source, target)
            }
            Self::ToolCall { agent, .. } => format!("{}: Calling a tool", agent),
            Self::ToolCallOutput { agent, output, .. } => {
                format!("{}: Tool call output: {}", agent, output)
            }
            Self::HandoffCall { agent, .. } => format!("{}: Skipping item: HandoffCallItem", agent),
        }
    }
}

impl fmt::Display for RunItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.describe())
    }
}

/// Outcome of a run
pub struct RunResult<C = ()> {
    /// Items produced, in order
    pub new_items: Vec<RunItem>,

    /// Text of the final answer
    pub final_output: String,

    /// Agent that produced the final answer
    pub last_agent: Arc<Agent<C>>,

    /// Context after the run
    pub context: RunContext<C>,

    input: Vec<ChatMessage>,
    generated: Vec<ChatMessage>,
}

impl<C> RunResult<C> {
    /// Messages generated during the run (assistant and tool messages)
    pub fn new_messages(&self) -> &[ChatMessage] {
        &self.generated
    }

    /// Original input followed by everything generated, ready to feed into
    /// the next run of the same session
    pub fn to_input_list(&self) -> Vec<ChatMessage> {
        self.input.iter().chain(self.generated.iter()).cloned().collect()
    }

    /// Parse the final answer as JSON into `T`
    pub fn final_output_as<T: DeserializeOwned>(&self) -> RagResult<T> {
        parse_structured(&self.final_output)
    }
}

impl<C> fmt::Debug for RunResult<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RunResult")
            .field("new_items", &self.new_items)
            .field("final_output", &self.final_output)
            .field("last_agent", &self.last_agent.name)
            .finish()
    }
}

/// Parse JSON, tolerating a surrounding fenced code block
pub fn parse_structured<T: DeserializeOwned>(text: &str) -> RagResult<T> {
    serde_json::from_str(strip_code_fence(text)).map_err(RagError::OutputParse)
}

fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };

    // Drop the info string (```json) up to the first newline
    let body = rest.split_once('\n').map(|(_, body)| body).unwrap_or(rest);
    body.strip_suffix("```").unwrap_or(body).trim()
}

/// Runs agents
pub struct Runner;

impl Runner {
    /// Run `agent` on `input` until it produces a final answer
    pub async fn run<C: Send + Sync + 'static>(
        agent: Arc<Agent<C>>,
        input: impl Into<RunInput>,
        context: RunContext<C>,
        config: &RunConfig<C>,
    ) -> RagResult<RunResult<C>> {
        let input = input.into().into_messages();
        let mut generated: Vec<ChatMessage> = Vec::new();
        let mut items: Vec<RunItem> = Vec::new();
        let mut current = agent;

        let mut registry = config.agents.clone();
        registry
            .entry(current.name().to_string())
            .or_insert_with(|| Arc::clone(&current));

        info!(
            agent = %current.name(),
            input_messages = input.len(),
            max_turns = config.max_turns,
            "Starting agent run"
        );

        for turn in 1..=config.max_turns {
            let request = build_request(&current, &context, &registry, &input, &generated);

            debug!(
                agent = %current.name(),
                turn,
                message_count = request.messages.len(),
                tool_count = request.tools.len(),
                "Calling model"
            );

            let response = config.model.chat(request).await?;

            if !response.has_tool_calls() {
                info!(agent = %current.name(), turns = turn, "Agent produced final output");

                generated.push(ChatMessage::assistant(response.content.clone()));
                items.push(RunItem::MessageOutput {
                    agent: current.name().to_string(),
                    content: response.content.clone(),
                });

                return Ok(RunResult {
                    new_items: items,
                    final_output: response.content,
                    last_agent: current,
                    context,
                    input,
                    generated,
                });
            }

            generated.push(response.to_message());
            if !response.content.trim().is_empty() {
                items.push(RunItem::MessageOutput {
                    agent: current.name().to_string(),
                    content: response.content.clone(),
                });
            }

            let tool_ctx = ToolContext {
                context: context.clone(),
                config: config.clone(),
                agent_name: current.name().to_string(),
            };

            let calls = response.tool_calls.unwrap_or_default();
            let mut next_agent: Option<Arc<Agent<C>>> = None;

            for call in &calls {
                let is_handoff = current
                    .handoffs()
                    .iter()
                    .any(|h| h.tool_name() == call.function.name);

                let output = if is_handoff {
                    let target = run_handoff(&current, call, &context, &registry, &mut items, next_agent.is_some()).await;
                    match target {
                        HandoffStep::Switched(agent, output) => {
                            registry
                                .entry(agent.name().to_string())
                                .or_insert_with(|| Arc::clone(&agent));
                            next_agent = Some(agent);
                            output
                        }
                        HandoffStep::Rejected(output) => output,
                    }
                } else {
                    run_tool(&current, call, &tool_ctx, &mut items).await
                };

                generated.push(ChatMessage::tool(call.id.clone(), output));
            }

            if let Some(next) = next_agent {
                current = next;
            }
        }

        error!(max_turns = config.max_turns, "Agent run exceeded maximum turns");
        Err(RagError::MaxTurnsExceeded {
            max_turns: config.max_turns,
        })
    }

    /// Run `agent` requiring a JSON answer that deserializes into `T`
    pub async fn run_typed<T, C>(
        agent: &Agent<C>,
        input: impl Into<RunInput>,
        context: RunContext<C>,
        config: &RunConfig<C>,
    ) -> RagResult<T>
    where
        T: DeserializeOwned + JsonSchema,
        C: Send + Sync + 'static,
    {
        let agent = Arc::new(agent.with_output_schema(OutputSchema::of::<T>()));
        let result = Self::run(agent, input, context, config).await?;
        result.final_output_as()
    }
}

fn build_request<C: Send + Sync + 'static>(
    agent: &Agent<C>,
    context: &RunContext<C>,
    registry: &HashMap<String, Arc<Agent<C>>>,
    input: &[ChatMessage],
    generated: &[ChatMessage],
) -> ChatRequest {
    let instructions = agent.instructions().render(context);

    let mut messages = Vec::with_capacity(input.len() + generated.len() + 1);
    if !instructions.is_empty() {
        messages.push(ChatMessage::system(instructions));
    }
    messages.extend(input.iter().cloned());
    messages.extend(generated.iter().cloned());

    let mut tools: Vec<ToolDefinition> = agent.tools().iter().map(|t| t.definition()).collect();
    tools.extend(agent.handoffs().iter().map(|h| h.definition(registry)));

    let mut request = ChatRequest::new(messages).with_tools(tools);
    if let Some(model) = agent.model() {
        request = request.with_model(model);
    }
    let settings = agent.settings();
    if let Some(temperature) = settings.temperature {
        request = request.with_temperature(temperature);
    }
    if let Some(max_tokens) = settings.max_tokens {
        request = request.with_max_tokens(max_tokens);
    }
    if let Some(schema) = agent.output_schema() {
        request = request.with_response_format(schema.response_format());
    }
    request
}

enum HandoffStep<C> {
    Switched(Arc<Agent<C>>, String),
    Rejected(String),
}

async fn run_handoff<C: Send + Sync + 'static>(
    current: &Agent<C>,
    call: &ToolCall,
    context: &RunContext<C>,
    registry: &HashMap<String, Arc<Agent<C>>>,
    items: &mut Vec<RunItem>,
    already_handed_off: bool,
) -> HandoffStep<C> {
    items.push(RunItem::HandoffCall {
        agent: current.name().to_string(),
        tool_name: call.function.name.clone(),
    });

    if already_handed_off {
        warn!(agent = %current.name(), tool = %call.function.name, "Ignoring additional handoff");
        return HandoffStep::Rejected(MULTIPLE_HANDOFFS.to_string());
    }

    let Some(handoff) = current
        .handoffs()
        .iter()
        .find(|h| h.tool_name() == call.function.name)
    else {
        return HandoffStep::Rejected(format!(
            "Tool {} not found in agent {}",
            call.function.name,
            current.name()
        ));
    };

    let Some(target) = handoff.resolve(registry) else {
        warn!(target = %handoff.agent_name(), "Handoff target is not registered");
        return HandoffStep::Rejected(format!(
            "Error: agent {} is not available. Please fix your mistakes.",
            handoff.agent_name()
        ));
    };

    let args = call.parse_arguments().unwrap_or_else(|_| json!({}));
    if let Err(e) = handoff.invoke(context, args).await {
        warn!(target = %target.name(), error = %e, "Handoff rejected");
        return HandoffStep::Rejected(format!("Error: {}. Please fix your mistakes.", e));
    }

    info!(source = %current.name(), target = %target.name(), "Handing off");

    items.push(RunItem::HandoffOutput {
        source: current.name().to_string(),
        target: target.name().to_string(),
    });

    let output = json!({ "assistant": target.name() }).to_string();
    HandoffStep::Switched(target, output)
}

async fn run_tool<C: Send + Sync + 'static>(
    current: &Agent<C>,
    call: &ToolCall,
    tool_ctx: &ToolContext<C>,
    items: &mut Vec<RunItem>,
) -> String {
    let name = call.function.name.clone();
    items.push(RunItem::ToolCall {
        agent: current.name().to_string(),
        name: name.clone(),
        arguments: call.function.arguments.clone(),
    });

    let output = match current.find_tool(&name) {
        None => {
            warn!(tool = %name, agent = %current.name(), "Model requested an unknown tool");
            format!("Tool {} not found in agent {}", name, current.name())
        }
        Some(tool) => {
            let args = call.parse_arguments().unwrap_or(Value::Null);
            info!(tool = %name, agent = %current.name(), "Executing tool");
            match tool.call(tool_ctx, args).await {
                Ok(output) => output,
                Err(e) => {
                    warn!(tool = %name, error = %e, "Tool execution failed");
                    format!("Error: {}. Please fix your mistakes.", e)
                }
            }
        }
    };

    debug!(tool = %name, output_length = output.len(), "Tool finished");

    items.push(RunItem::ToolCallOutput {
        agent: current.name().to_string(),
        name,
        output: output.clone(),
    });
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::{FunctionTool, Handoff};
    use agentry_llm::mock::ScriptedModel;
    use agentry_llm::{ChatResponse, MessageRole};
    use serde::Deserialize;

    #[derive(Debug, Deserialize, JsonSchema, PartialEq)]
    struct Weather {
        temperature: f64,
        conditions: String,
    }

    fn weather_tool() -> FunctionTool {
        FunctionTool::new(
            "get_weather",
            "Get the weather",
            json!({"type": "object", "properties": {"city": {"type": "string"}}}),
            |_ctx, args: Value| async move {
                let city = args["city"].as_str().unwrap_or_default().to_string();
                if city.is_empty() {
                    return Err(RagError::tool("get_weather", "city is required"));
                }
                Ok(format!("Sunny in {}", city))
            },
        )
    }

    fn config(model: &Arc<ScriptedModel>) -> RunConfig {
        RunConfig::new(Arc::clone(model) as Arc<dyn ChatModel>)
    }

    #[tokio::test]
    async fn test_plain_answer() {
        let model = Arc::new(ScriptedModel::new().then_text("Hello there"));
        let agent = Agent::builder("Assistant")
            .instructions("You are a helpful assistant")
            .build_arc();

        let result = Runner::run(agent, "Hi", RunContext::new(()), &config(&model))
            .await
            .unwrap();

        assert_eq!(result.final_output, "Hello there");
        assert_eq!(result.new_items.len(), 1);
        assert_eq!(result.new_items[0].describe(), "**Assistant:** Hello there");

        let request = &model.requests()[0];
        assert_eq!(request.messages[0].role, MessageRole::System);
        assert_eq!(request.messages[1].content, "Hi");
    }

    #[tokio::test]
    async fn test_tool_call_then_answer() {
        let model = Arc::new(
            ScriptedModel::new()
                .then_tool_call("get_weather", json!({"city": "Tokyo"}))
                .then_text("It is sunny in Tokyo"),
        );
        let agent = Agent::builder("Weather").tool(weather_tool()).build_arc();

        let result = Runner::run(agent, "Weather in Tokyo?", RunContext::new(()), &config(&model))
            .await
            .unwrap();

        assert_eq!(result.final_output, "It is sunny in Tokyo");
        assert!(result.new_items.contains(&RunItem::ToolCallOutput {
            agent: "Weather".to_string(),
            name: "get_weather".to_string(),
            output: "Sunny in Tokyo".to_string(),
        }));

        let second = &model.requests()[1];
        let tool_msg = second.messages.last().unwrap();
        assert_eq!(tool_msg.role, MessageRole::Tool);
        assert_eq!(tool_msg.content, "Sunny in Tokyo");
        assert_eq!(second.tools.len(), 1);
    }

    #[tokio::test]
    async fn test_tool_errors_are_fed_back() {
        let model = Arc::new(
            ScriptedModel::new()
                .then_tool_call("get_weather", json!({}))
                .then_tool_call("get_stock_price", json!({}))
                .then_text("done"),
        );
        let agent = Agent::builder("Weather").tool(weather_tool()).build_arc();

        let result = Runner::run(agent, "?", RunContext::new(()), &config(&model))
            .await
            .unwrap();

        let outputs: Vec<&str> = result
            .new_messages()
            .iter()
            .filter(|m| m.role == MessageRole::Tool)
            .map(|m| m.content.as_str())
            .collect();
        assert_eq!(
            outputs[0],
            "Error: tool 'get_weather' failed: city is required. Please fix your mistakes."
        );
        assert_eq!(outputs[1], "Tool get_stock_price not found in agent Weather");
    }

    #[tokio::test]
    async fn test_handoff_switches_agent() {
        let billing = Agent::builder("Billing Agent")
            .instructions("You handle billing")
            .build_arc();
        let triage = Agent::builder("Triage Agent")
            .instructions("Route the customer")
            .handoff(Arc::clone(&billing))
            .build_arc();

        let model = Arc::new(
            ScriptedModel::new()
                .then_tool_call("transfer_to_billing_agent", json!({}))
                .then_text("I can help with your invoice"),
        );

        let result = Runner::run(triage, "I was charged twice", RunContext::new(()), &config(&model))
            .await
            .unwrap();

        assert_eq!(result.last_agent.name(), "Billing Agent");
        assert!(result.new_items.iter().any(|i| i.describe() == "Handed off from Triage Agent to Billing Agent"));

        let requests = model.requests();
        assert_eq!(requests[0].tools[0].name, "transfer_to_billing_agent");
        assert_eq!(requests[1].messages[0].content, "You handle billing");

        let handoff_msg = result
            .new_messages()
            .iter()
            .find(|m| m.role == MessageRole::Tool)
            .unwrap();
        assert_eq!(handoff_msg.content, r#"{"assistant":"Billing Agent"}"#);
    }

    #[tokio::test]
    async fn test_only_first_handoff_is_honored() {
        let sales = Agent::builder("Sales").build_arc();
        let support = Agent::builder("Support").build_arc();
        let main = Agent::builder("Main")
            .handoff(Arc::clone(&sales))
            .handoff(Arc::clone(&support))
            .build_arc();

        let model = Arc::new(
            ScriptedModel::new()
                .then(ChatResponse::tool_calls(vec![
                    ToolCall::new("c1", "transfer_to_support", json!({})),
                    ToolCall::new("c2", "transfer_to_sales", json!({})),
                ]))
                .then_text("Support here"),
        );

        let result = Runner::run(main, "help", RunContext::new(()), &config(&model))
            .await
            .unwrap();

        assert_eq!(result.last_agent.name(), "Support");
        let ignored = result
            .new_messages()
            .iter()
            .find(|m| m.tool_call_id.as_deref() == Some("c2"))
            .unwrap();
        assert_eq!(ignored.content, MULTIPLE_HANDOFFS);
    }

    #[tokio::test]
    async fn test_named_handoff_back_to_registered_agent() {
        let faq = Agent::builder("FAQ Agent")
            .handoff(Handoff::named("Triage Agent"))
            .build_arc();
        let triage = Agent::builder("Triage Agent")
            .handoff(Arc::clone(&faq))
            .build_arc();

        let model = Arc::new(
            ScriptedModel::new()
                .then_tool_call("transfer_to_faq_agent", json!({}))
                .then_tool_call("transfer_to_triage_agent", json!({}))
                .then_text("Back at triage"),
        );

        let result = Runner::run(triage, "question", RunContext::new(()), &config(&model))
            .await
            .unwrap();

        assert_eq!(result.last_agent.name(), "Triage Agent");
    }

    #[tokio::test]
    async fn test_max_turns_exceeded() {
        let model = Arc::new(
            ScriptedModel::new()
                .with_fallback(ChatResponse::tool_calls(vec![ToolCall::new("c", "get_weather", json!({"city": "Oslo"}))])),
        );
        let agent = Agent::builder("Loop").tool(weather_tool()).build_arc();

        let err = Runner::run(agent, "?", RunContext::new(()), &config(&model).with_max_turns(3))
            .await
            .unwrap_err();

        assert!(matches!(err, RagError::MaxTurnsExceeded { max_turns: 3 }));
        assert_eq!(model.requests().len(), 3);
    }

    #[tokio::test]
    async fn test_run_typed_parses_fenced_json() {
        let model = Arc::new(ScriptedModel::new().then_text(
            "```json\n{\"temperature\": 21.5, \"conditions\": \"Clear\"}\n```",
        ));
        let agent: Agent = Agent::builder("Structured").build();

        let weather: Weather = Runner::run_typed(&agent, "Weather?", RunContext::new(()), &config(&model))
            .await
            .unwrap();

        assert_eq!(
            weather,
            Weather {
                temperature: 21.5,
                conditions: "Clear".to_string()
            }
        );
        assert!(model.requests()[0].response_format.is_some());
    }

    #[tokio::test]
    async fn test_input_list_continues_session() {
        let model = Arc::new(ScriptedModel::new().then_text("first").then_text("second"));
        let agent = Agent::builder("Chat").build_arc();
        let cfg = config(&model);

        let first = Runner::run(Arc::clone(&agent), "one", RunContext::new(()), &cfg)
            .await
            .unwrap();

        let mut history = first.to_input_list();
        assert_eq!(history.len(), 2);
        history.push(ChatMessage::user("two"));

        let second = Runner::run(first.last_agent, history, RunContext::new(()), &cfg)
            .await
            .unwrap();

        assert_eq!(second.final_output, "second");
        assert_eq!(second.to_input_list().len(), 4);
    }

    #[tokio::test]
    async fn test_agent_as_tool_returns_nested_output() {
        let notes = Agent::builder("Note Taker").instructions("notes").build_arc();
        let assistant = Agent::builder("Assistant")
            .instructions("Use your tools")
            .shared_tool(notes.as_tool("note_taking", "Take a note"))
            .build_arc();

        let model = Arc::new(
            ScriptedModel::new()
                .then_tool_call("note_taking", json!({"input": "buy milk"}))
                .then_text("Noted: milk")
                .then_text("Done"),
        );

        let result = Runner::run(assistant, "Remember milk", RunContext::new(()), &config(&model))
            .await
            .unwrap();

        assert_eq!(result.final_output, "Done");
        assert_eq!(result.last_agent.name(), "Assistant");
        assert!(result.new_items.contains(&RunItem::ToolCallOutput {
            agent: "Assistant".to_string(),
            name: "note_taking".to_string(),
            output: "Noted: milk".to_string(),
        }));

        let requests = model.requests();
        assert_eq!(requests.len(), 3);
        assert_eq!(requests[0].tools[0].name, "note_taking");
        assert_eq!(requests[1].messages[0].content, "notes");
        assert_eq!(requests[1].messages[1].content, "buy milk");
        let tool_msg = requests[2].messages.last().unwrap();
        assert_eq!(tool_msg.role, MessageRole::Tool);
        assert_eq!(tool_msg.content, "Noted: milk");
    }

    #[tokio::test]
    async fn test_run_result_debug_names_last_agent() {
        let model = Arc::new(ScriptedModel::new().then_text("ok"));
        let agent = Agent::builder("Reporter").build_arc();

        let result = Runner::run(agent, "hi", RunContext::new(()), &config(&model))
            .await
            .unwrap();

        let debug = format!("{:?}", result);
        assert!(debug.contains("last_agent: \"Reporter\""));
        assert!(debug.contains("final_output: \"ok\""));
    }

    #[test]
    fn test_strip_code_fence() {
        assert_eq!(strip_code_fence("```json\n{}\n```"), "{}");
        assert_eq!(strip_code_fence("  {\"a\": 1} "), "{\"a\": 1}");
    }
}
