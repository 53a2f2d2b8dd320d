//! Handoffs: transferring a conversation to another agent
//!
//! A handoff is advertised to the model as a tool named
//! `transfer_to_<agent_name>`. Calling it switches the active agent for the
//! rest of the run.

use super::agent::Agent;
use super::context::RunContext;
use super::tool::schema_for;
use crate::error::{RagError, RagResult};
use agentry_llm::ToolDefinition;
use futures::future::BoxFuture;
use schemars::JsonSchema;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

/// Preamble explaining handoffs to an agent that takes part in them
pub const RECOMMENDED_PROMPT_PREFIX: &str = "# System context\nYou are part of a multi-agent system designed to make agent coordination and execution easy. \
The system uses two primary abstractions: **Agents** and **Handoffs**. An agent encompasses instructions and tools \
and can hand off a conversation to another agent when appropriate. Handoffs are achieved by calling a handoff \
function, generally named `transfer_to_<agent_name>`. Transfers between agents are handled seamlessly in the \
background; do not mention or draw attention to these transfers in your conversation with the user.\n";

/// `instructions` prefixed with [`RECOMMENDED_PROMPT_PREFIX`]
pub fn prompt_with_handoff_instructions(instructions: &str) -> String {
    format!("{}\n\n{}", RECOMMENDED_PROMPT_PREFIX, instructions)
}

type HandoffCallback<C> =
    Arc<dyn Fn(RunContext<C>, Value) -> BoxFuture<'static, RagResult<()>> + Send + Sync>;

/// Who a handoff transfers to
pub enum HandoffTarget<C> {
    /// A concrete agent
    Agent(Arc<Agent<C>>),

    /// An agent looked up by name in the run's registry
    ///
    /// Lets two agents hand off to each other without a reference cycle.
    Named(String),
}

impl<C> Clone for HandoffTarget<C> {
    fn clone(&self) -> Self {
        match self {
            Self::Agent(agent) => Self::Agent(Arc::clone(agent)),
            Self::Named(name) => Self::Named(name.clone()),
        }
    }
}

/// A handoff to another agent
pub struct Handoff<C = ()> {
    target: HandoffTarget<C>,
    tool_name_override: Option<String>,
    tool_description_override: Option<String>,
    on_handoff: Option<HandoffCallback<C>>,
    input_schema: Option<Value>,
}

impl<C> Clone for Handoff<C> {
    fn clone(&self) -> Self {
        Self {
            target: self.target.clone(),
            tool_name_override: self.tool_name_override.clone(),
            tool_description_override: self.tool_description_override.clone(),
            on_handoff: self.on_handoff.clone(),
            input_schema: self.input_schema.clone(),
        }
    }
}

impl<C: Send + Sync + 'static> Handoff<C> {
    /// Handoff to a concrete agent
    pub fn new(agent: Arc<Agent<C>>) -> Self {
        Self::with_target(HandoffTarget::Agent(agent))
    }

    /// Handoff to an agent registered on the run under `name`
    pub fn named(name: impl Into<String>) -> Self {
        Self::with_target(HandoffTarget::Named(name.into()))
    }

    fn with_target(target: HandoffTarget<C>) -> Self {
        Self {
            target,
            tool_name_override: None,
            tool_description_override: None,
            on_handoff: None,
            input_schema: None,
        }
    }

    /// Replace the default `transfer_to_<agent>` tool name
    pub fn tool_name_override(mut self, name: impl Into<String>) -> Self {
        self.tool_name_override = Some(name.into());
        self
    }

    /// Replace the default tool description
    pub fn tool_description_override(mut self, description: impl Into<String>) -> Self {
        self.tool_description_override = Some(description.into());
        self
    }

    /// Run `callback` when the handoff is invoked
    ///
    /// The callback receives the arguments the model supplied (an empty
    /// object unless an input type is set).
    pub fn on_handoff<F, Fut>(mut self, callback: F) -> Self
    where
        F: Fn(RunContext<C>, Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = RagResult<()>> + Send + 'static,
    {
        self.on_handoff = Some(Arc::new(move |ctx, input| Box::pin(callback(ctx, input))));
        self
    }

    /// Require the model to pass arguments matching `T`
    pub fn input_type<T: JsonSchema>(mut self) -> Self {
        self.input_schema = Some(schema_for::<T>());
        self
    }

    /// Handoff target
    pub fn target(&self) -> &HandoffTarget<C> {
        &self.target
    }

    /// Name of the target agent
    pub fn agent_name(&self) -> &str {
        match &self.target {
            HandoffTarget::Agent(agent) => agent.name(),
            HandoffTarget::Named(name) => name,
        }
    }

    /// Tool name advertised to the model
    pub fn tool_name(&self) -> String {
        self.tool_name_override
            .clone()
            .unwrap_or_else(|| default_tool_name(self.agent_name()))
    }

    /// Resolve the target agent, consulting `registry` for named targets
    pub fn resolve(&self, registry: &HashMap<String, Arc<Agent<C>>>) -> Option<Arc<Agent<C>>> {
        match &self.target {
            HandoffTarget::Agent(agent) => Some(Arc::clone(agent)),
            HandoffTarget::Named(name) => registry.get(name).cloned(),
        }
    }

    /// Tool definition advertised to the model
    pub fn definition(&self, registry: &HashMap<String, Arc<Agent<C>>>) -> ToolDefinition {
        let description = self.tool_description_override.clone().unwrap_or_else(|| {
            let extra = self
                .resolve(registry)
                .and_then(|agent| agent.handoff_description().map(String::from))
                .unwrap_or_default();
            format!(
                "Handoff to the {} agent to handle the request. {}",
                self.agent_name(),
                extra
            )
            .trim_end()
            .to_string()
        });

        let parameters = self.input_schema.clone().unwrap_or_else(|| {
            json!({
                "type": "object",
                "properties": {},
                "additionalProperties": false,
            })
        });

        ToolDefinition::new(self.tool_name(), description, parameters)
    }

    /// Validate the model's arguments and run the callback
    pub async fn invoke(&self, ctx: &RunContext<C>, input: Value) -> RagResult<()> {
        if let Some(schema) = &self.input_schema {
            validate_required(schema, &input).map_err(|field| {
                RagError::validation(
                    "handoff_input",
                    format!("missing required field '{}'", field),
                    input.to_string(),
                )
            })?;
        }

        if let Some(callback) = &self.on_handoff {
            callback(ctx.clone(), input).await?;
        }

        Ok(())
    }
}

impl<C: Send + Sync + 'static> From<Arc<Agent<C>>> for Handoff<C> {
    fn from(agent: Arc<Agent<C>>) -> Self {
        Self::new(agent)
    }
}

impl<C: Send + Sync + 'static> From<Agent<C>> for Handoff<C> {
    fn from(agent: Agent<C>) -> Self {
        Self::new(Arc::new(agent))
    }
}

fn validate_required(schema: &Value, input: &Value) -> Result<(), String> {
    let Some(required) = schema.get("required").and_then(Value::as_array) else {
        return Ok(());
    };

    for field in required.iter().filter_map(Value::as_str) {
        let present = input.get(field).is_some_and(|v| !v.is_null());
        if !present {
            return Err(field.to_string());
        }
    }
    Ok(())
}

/// `transfer_to_` followed by the snake-cased agent name
pub fn default_tool_name(agent_name: &str) -> String {
    format!("transfer_to_{}", to_snake_case(agent_name))
}

fn to_snake_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c.to_ascii_lowercase());
        } else if !out.ends_with('_') {
            out.push('_');
        }
    }
    out.trim_matches('_').to_string()
}
