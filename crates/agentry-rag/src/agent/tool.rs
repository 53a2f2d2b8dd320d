//! Tools an agent can call
//!
//! A tool is a named function with a JSON-schema argument object. The model
//! asks for a call, the runner executes it and feeds the text result back.

use super::agent::Agent;
use super::context::RunContext;
use super::runner::{RunConfig, Runner};
use crate::error::{RagError, RagResult};
use agentry_llm::ToolDefinition;
use async_trait::async_trait;
use futures::future::BoxFuture;
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use std::future::Future;
use std::sync::Arc;
use tracing::debug;

/// Everything a tool sees while executing
pub struct ToolContext<C> {
    /// Shared run state
    pub context: RunContext<C>,

    /// Configuration of the enclosing run
    pub config: RunConfig<C>,

    /// Name of the agent that requested the call
    pub agent_name: String,
}

/// A callable tool
#[async_trait]
pub trait Tool<C = ()>: Send + Sync {
    /// Definition advertised to the model
    fn definition(&self) -> ToolDefinition;

    /// Execute with parsed JSON arguments
    async fn call(&self, ctx: &ToolContext<C>, args: Value) -> RagResult<String>;

    /// Tool name
    fn name(&self) -> String {
        self.definition().name
    }
}

type ToolHandler<C> =
    Arc<dyn Fn(RunContext<C>, Value) -> BoxFuture<'static, RagResult<String>> + Send + Sync>;

/// A tool backed by an async closure
pub struct FunctionTool<C = ()> {
    definition: ToolDefinition,
    handler: ToolHandler<C>,
}

impl<C: Send + Sync + 'static> FunctionTool<C> {
    /// Build a tool from raw JSON arguments
    pub fn new<F, Fut>(
        name: impl Into<String>,
        description: impl Into<String>,
        parameters: Value,
        handler: F,
    ) -> Self
    where
        F: Fn(RunContext<C>, Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = RagResult<String>> + Send + 'static,
    {
        Self {
            definition: ToolDefinition::new(name, description, parameters),
            handler: Arc::new(move |ctx, args| Box::pin(handler(ctx, args))),
        }
    }

    /// Build a tool whose arguments deserialize into `A`
    ///
    /// The parameter schema is derived from `A`.
    pub fn typed<A, F, Fut>(name: impl Into<String>, description: impl Into<String>, handler: F) -> Self
    where
        A: DeserializeOwned + JsonSchema + Send + 'static,
        F: Fn(RunContext<C>, A) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = RagResult<String>> + Send + 'static,
    {
        let name = name.into();
        let tool_name = name.clone();
        let handler = Arc::new(handler);

        Self {
            definition: ToolDefinition::new(name, description, schema_for::<A>()),
            handler: Arc::new(move |ctx, args| {
                let handler = Arc::clone(&handler);
                let tool_name = tool_name.clone();
                Box::pin(async move {
                    let args: A = serde_json::from_value(args).map_err(|e| {
                        RagError::tool(tool_name, format!("invalid arguments: {}", e))
                    })?;
                    handler(ctx, args).await
                })
            }),
        }
    }
}

#[async_trait]
impl<C: Send + Sync + 'static> Tool<C> for FunctionTool<C> {
    fn definition(&self) -> ToolDefinition {
        self.definition.clone()
    }

    async fn call(&self, ctx: &ToolContext<C>, args: Value) -> RagResult<String> {
        debug!(tool = %self.definition.name, agent = %ctx.agent_name, "Executing function tool");
        (self.handler)(ctx.context.clone(), args).await
    }
}

/// JSON schema for `T`, trimmed to what tool and output definitions need
pub fn schema_for<T: JsonSchema>() -> Value {
    let mut schema = serde_json::to_value(schemars::schema_for!(T)).unwrap_or_else(|_| json!({}));
    if let Some(obj) = schema.as_object_mut() {
        obj.remove("$schema");
        obj.remove("title");
    }
    schema
}

#[derive(Deserialize, JsonSchema)]
struct AgentToolInput {
    /// The request to hand to the agent
    input: String,
}

/// Exposes an agent as a tool; the nested run's final output is the result
pub struct AgentTool<C> {
    agent: Arc<Agent<C>>,
    name: String,
    description: String,
}

impl<C: Send + Sync + 'static> AgentTool<C> {
    /// Wrap `agent` under the given tool name
    pub fn new(agent: Arc<Agent<C>>, name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            agent,
            name: name.into(),
            description: description.into(),
        }
    }
}

#[async_trait]
impl<C: Send + Sync + 'static> Tool<C> for AgentTool<C> {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new(
            self.name.clone(),
            self.description.clone(),
            schema_for::<AgentToolInput>(),
        )
    }

    async fn call(&self, ctx: &ToolContext<C>, args: Value) -> RagResult<String> {
        let input: AgentToolInput = serde_json::from_value(args)
            .map_err(|e| RagError::tool(&self.name, format!("invalid arguments: {}", e)))?;

        debug!(tool = %self.name, agent = %self.agent.name(), "Running agent as tool");

        let result = Box::pin(Runner::run(
            Arc::clone(&self.agent),
            input.input,
            ctx.context.clone(),
            &ctx.config,
        ))
        .await?;

        Ok(result.final_output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agentry_llm::mock::ScriptedModel;

    #[derive(Deserialize, JsonSchema)]
    struct CityArgs {
        /// City name
        city: String,
    }

    fn tool_ctx() -> ToolContext<()> {
        ToolContext {
            context: RunContext::new(()),
            config: RunConfig::new(Arc::new(ScriptedModel::new())),
            agent_name: "tester".to_string(),
        }
    }

    #[tokio::test]
    async fn test_typed_tool_schema_and_call() {
        let tool: FunctionTool = FunctionTool::typed(
            "get_weather",
            "Get the weather for a city",
            |_ctx, args: CityArgs| async move { Ok(format!("Sunny in {}", args.city)) },
        );

        let def = tool.definition();
        assert_eq!(def.parameters["type"], "object");
        assert!(def.parameters["properties"]["city"].is_object());
        assert!(def.parameters.get("$schema").is_none());

        let out = tool.call(&tool_ctx(), json!({"city": "Oslo"})).await.unwrap();
        assert_eq!(out, "Sunny in Oslo");
    }

    #[tokio::test]
    async fn test_typed_tool_rejects_bad_arguments() {
        let tool: FunctionTool = FunctionTool::typed("get_weather", "Weather", |_ctx, args: CityArgs| async move {
            Ok(args.city)
        });

        let err = tool.call(&tool_ctx(), json!({"town": "Oslo"})).await.unwrap_err();
        assert!(matches!(err, RagError::Tool { .. }));
    }

    #[tokio::test]
    async fn test_function_tool_mutates_context() {
        let tool = FunctionTool::new(
            "count",
            "Increment a counter",
            json!({"type": "object", "properties": {}}),
            |ctx: RunContext<u32>, _args| async move {
                let value = ctx.update(|n| {
                    *n += 1;
                    *n
                });
                Ok(value.to_string())
            },
        );

        let ctx = ToolContext {
            context: RunContext::new(41u32),
            config: RunConfig::new(Arc::new(ScriptedModel::new())),
            agent_name: "counter".to_string(),
        };
        assert_eq!(tool.call(&ctx, json!({})).await.unwrap(), "42");
        assert_eq!(ctx.context.snapshot(), 42);
    }
}
