//! Agent configuration

use super::context::RunContext;
use super::handoff::Handoff;
use super::tool::{schema_for, AgentTool, Tool};
use agentry_llm::ResponseFormat;
use schemars::JsonSchema;
use std::sync::Arc;

/// System prompt of an agent
pub enum Instructions<C> {
    /// Fixed text
    Static(String),

    /// Rendered from the run context on every turn
    Dynamic(Arc<dyn Fn(&C) -> String + Send + Sync>),
}

impl<C> Instructions<C> {
    /// Render against the current context
    pub fn render(&self, ctx: &RunContext<C>) -> String {
        match self {
            Self::Static(text) => text.clone(),
            Self::Dynamic(f) => ctx.read(|c| f(c)),
        }
    }
}

impl<C> Clone for Instructions<C> {
    fn clone(&self) -> Self {
        match self {
            Self::Static(text) => Self::Static(text.clone()),
            Self::Dynamic(f) => Self::Dynamic(Arc::clone(f)),
        }
    }
}

/// Sampling parameters
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ModelSettings {
    /// Sampling temperature
    pub temperature: Option<f32>,

    /// Completion token limit
    pub max_tokens: Option<u32>,
}

/// JSON schema the final answer must follow
#[derive(Debug, Clone, PartialEq)]
pub struct OutputSchema {
    /// Schema name sent to the provider
    pub name: String,

    /// JSON schema
    pub schema: serde_json::Value,
}

impl OutputSchema {
    /// Derive from a Rust type
    pub fn of<T: JsonSchema>() -> Self {
        Self {
            name: T::schema_name().to_string(),
            schema: schema_for::<T>(),
        }
    }

    /// Response format for the chat request
    pub fn response_format(&self) -> ResponseFormat {
        ResponseFormat::JsonSchema {
            name: self.name.clone(),
            schema: self.schema.clone(),
            strict: false,
        }
    }
}

/// An agent: instructions, tools and handoff targets passed to the runner
pub struct Agent<C = ()> {
    pub(crate) name: String,
    pub(crate) instructions: Instructions<C>,
    pub(crate) handoff_description: Option<String>,
    pub(crate) tools: Vec<Arc<dyn Tool<C>>>,
    pub(crate) handoffs: Vec<Handoff<C>>,
    pub(crate) model: Option<String>,
    pub(crate) output_schema: Option<OutputSchema>,
    pub(crate) settings: ModelSettings,
}

impl<C: Send + Sync + 'static> Agent<C> {
    /// Start building an agent
    pub fn builder(name: impl Into<String>) -> AgentBuilder<C> {
        AgentBuilder::new(name)
    }

    /// Agent name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Instructions
    pub fn instructions(&self) -> &Instructions<C> {
        &self.instructions
    }

    /// Description shown to agents that can hand off to this one
    pub fn handoff_description(&self) -> Option<&str> {
        self.handoff_description.as_deref()
    }

    /// Registered tools
    pub fn tools(&self) -> &[Arc<dyn Tool<C>>] {
        &self.tools
    }

    /// Registered handoffs
    pub fn handoffs(&self) -> &[Handoff<C>] {
        &self.handoffs
    }

    /// Model override
    pub fn model(&self) -> Option<&str> {
        self.model.as_deref()
    }

    /// Structured output schema
    pub fn output_schema(&self) -> Option<&OutputSchema> {
        self.output_schema.as_ref()
    }

    /// Sampling settings
    pub fn settings(&self) -> ModelSettings {
        self.settings
    }

    /// Find a tool by name
    pub fn find_tool(&self, name: &str) -> Option<&Arc<dyn Tool<C>>> {
        self.tools.iter().find(|t| t.name() == name)
    }

    /// Expose this agent as a tool of another agent
    pub fn as_tool(
        self: &Arc<Self>,
        tool_name: impl Into<String>,
        tool_description: impl Into<String>,
    ) -> Arc<dyn Tool<C>> {
        Arc::new(AgentTool::new(Arc::clone(self), tool_name, tool_description))
    }

    /// Copy of this agent with a different output schema
    pub fn with_output_schema(&self, schema: OutputSchema) -> Self {
        let mut agent = self.clone();
        agent.output_schema = Some(schema);
        agent
    }
}

impl<C> Clone for Agent<C> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            instructions: self.instructions.clone(),
            handoff_description: self.handoff_description.clone(),
            tools: self.tools.clone(),
            handoffs: self.handoffs.clone(),
            model: self.model.clone(),
            output_schema: self.output_schema.clone(),
            settings: self.settings,
        }
    }
}

impl<C> std::fmt::Debug for Agent<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Agent")
            .field("name", &self.name)
            .field("tools", &self.tools.len())
            .field("handoffs", &self.handoffs.len())
            .field("model", &self.model)
            .finish()
    }
}

/// Builder for [`Agent`]
pub struct AgentBuilder<C = ()> {
    agent: Agent<C>,
}

impl<C: Send + Sync + 'static> AgentBuilder<C> {
    /// Start with a name and empty instructions
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            agent: Agent {
                name: name.into(),
                instructions: Instructions::Static(String::new()),
                handoff_description: None,
                tools: Vec::new(),
                handoffs: Vec::new(),
                model: None,
                output_schema: None,
                settings: ModelSettings::default(),
            },
        }
    }

    /// Fixed instructions
    pub fn instructions(mut self, instructions: impl Into<String>) -> Self {
        self.agent.instructions = Instructions::Static(instructions.into());
        self
    }

    /// Instructions rendered from the run context
    pub fn dynamic_instructions<F>(mut self, f: F) -> Self
    where
        F: Fn(&C) -> String + Send + Sync + 'static,
    {
        self.agent.instructions = Instructions::Dynamic(Arc::new(f));
        self
    }

    /// Description used by agents handing off to this one
    pub fn handoff_description(mut self, description: impl Into<String>) -> Self {
        self.agent.handoff_description = Some(description.into());
        self
    }

    /// Add a tool
    pub fn tool(mut self, tool: impl Tool<C> + 'static) -> Self {
        self.agent.tools.push(Arc::new(tool));
        self
    }

    /// Add an already shared tool
    pub fn shared_tool(mut self, tool: Arc<dyn Tool<C>>) -> Self {
        self.agent.tools.push(tool);
        self
    }

    /// Add a handoff
    pub fn handoff(mut self, handoff: impl Into<Handoff<C>>) -> Self {
        self.agent.handoffs.push(handoff.into());
        self
    }

    /// Use a specific model instead of the run default
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.agent.model = Some(model.into());
        self
    }

    /// Require the final answer to deserialize into `T`
    pub fn output_type<T: JsonSchema>(mut self) -> Self {
        self.agent.output_schema = Some(OutputSchema::of::<T>());
        self
    }

    /// Set the temperature
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.agent.settings.temperature = Some(temperature);
        self
    }

    /// Set the completion token limit
    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.agent.settings.max_tokens = Some(max_tokens);
        self
    }

    /// Finish
    pub fn build(self) -> Agent<C> {
        self.agent
    }

    /// Finish and share
    pub fn build_arc(self) -> Arc<Agent<C>> {
        Arc::new(self.agent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Default)]
    struct Vars {
        user_name: String,
    }

    #[derive(Deserialize, JsonSchema)]
    #[allow(dead_code)]
    struct Weather {
        temperature: f64,
        conditions: String,
    }

    #[test]
    fn test_dynamic_instructions_render_context() {
        let agent: Agent<Vars> = Agent::builder("Main Agent")
            .dynamic_instructions(|vars: &Vars| format!("Greet {} and help them.", vars.user_name))
            .build();

        let ctx = RunContext::new(Vars {
            user_name: "Alice".to_string(),
        });
        assert_eq!(agent.instructions().render(&ctx), "Greet Alice and help them.");
    }

    #[test]
    fn test_output_type_schema() {
        let agent: Agent = Agent::builder("Weather").output_type::<Weather>().build();
        let schema = agent.output_schema().unwrap();

        assert_eq!(schema.name, "Weather");
        assert!(schema.schema["properties"]["temperature"].is_object());
        assert!(matches!(
            schema.response_format(),
            ResponseFormat::JsonSchema { .. }
        ));
    }
}
