//! Text analysis graphs
//!
//! [`research_graph`] is a two-step researcher → summarizer pipeline.
//! [`analysis_graph`] lets a first agent pick a local tool (sentiment or
//! topic lookup) and routes to a specialist based on which one it used.

use agentry_graph::prelude::*;
use agentry_llm::{ChatMessage, ChatModel, ChatRequest, ToolCall};
use agentry_rag::agent::{FunctionTool, RunConfig, RunContext, Tool, ToolContext};
use async_trait::async_trait;
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::info;

/// Input used by the research demo
pub const SAMPLE_TEXT: &str = "Here's a text about AI: Artificial Intelligence (AI) is transforming various industries through machine learning and deep learning. It enables computers to learn from data and make decisions. Key applications include natural language processing, computer vision, and robotics.";

const POSITIVE_WORDS: [&str; 5] = ["good", "great", "excellent", "positive", "happy"];
const NEGATIVE_WORDS: [&str; 5] = ["bad", "poor", "terrible", "negative", "sad"];

/// Keyword sentiment: `"positive"`, `"negative"` or `"neutral"`
pub fn analyze_sentiment(text: &str) -> &'static str {
    let text = text.to_lowercase();
    let positive = POSITIVE_WORDS.iter().filter(|w| text.contains(*w)).count();
    let negative = NEGATIVE_WORDS.iter().filter(|w| text.contains(*w)).count();

    match positive.cmp(&negative) {
        std::cmp::Ordering::Greater => "positive",
        std::cmp::Ordering::Less => "negative",
        std::cmp::Ordering::Equal => "neutral",
    }
}

/// Short description of `topic` from a tiny knowledge base
pub fn get_topic_info(topic: &str) -> &'static str {
    match topic.to_lowercase().as_str() {
        "ai" => "Artificial Intelligence is the simulation of human intelligence by machines.",
        "ml" => "Machine Learning is a subset of AI that focuses on learning from data.",
        "nlp" => "Natural Language Processing deals with the interaction between computers and human language.",
        _ => "Topic not found in knowledge base.",
    }
}

#[derive(Deserialize, JsonSchema)]
struct SentimentArgs {
    /// Text to analyze
    text: String,
}

#[derive(Deserialize, JsonSchema)]
struct TopicArgs {
    /// Topic to look up, e.g. "ai"
    topic: String,
}

/// `analyze_sentiment` as a tool
pub fn sentiment_tool() -> FunctionTool {
    FunctionTool::typed(
        "analyze_sentiment",
        "Analyze the sentiment of the given text.",
        |_ctx, args: SentimentArgs| async move { Ok(analyze_sentiment(&args.text).to_string()) },
    )
}

/// `get_topic_info` as a tool
pub fn topic_tool() -> FunctionTool {
    FunctionTool::typed(
        "get_topic_info",
        "Get information about a specific topic.",
        |_ctx, args: TopicArgs| async move { Ok(get_topic_info(&args.topic).to_string()) },
    )
}

/// Researcher → summarizer
pub fn research_graph(model: Arc<dyn ChatModel>) -> GraphResult<CompiledGraph> {
    StateGraph::new("research")
        .add_node(
            "researcher",
            AgentNode::new("researcher", model.clone())
                .with_system_prompt("You are a research assistant. Analyze the given text and extract key points.")
                .with_temperature(0.0),
        )
        .add_node(
            "summarizer",
            AgentNode::new("summarizer", model)
                .with_system_prompt("You are a summarization expert. Create a concise summary of the key points.")
                .with_temperature(0.0),
        )
        .set_entry_point("researcher")
        .add_edge("researcher", "summarizer")
        .add_edge("summarizer", END)
        .compile()
}

/// A local tool and where the graph goes after the triage agent calls it
struct ToolRoute {
    tool: FunctionTool,
    next: &'static str,
    /// State key and value to record, from the call arguments and tool output
    record: fn(&Value, &str) -> (&'static str, String),
}

/// First agent of [`analysis_graph`]
///
/// When the model calls one of the local tools the node runs it, records
/// the result under `sentiment` or `topic`, and sets `next` to the matching
/// specialist. Otherwise `next` is `"end"`.
pub struct TriageNode {
    model: Arc<dyn ChatModel>,
    routes: Vec<ToolRoute>,
    config: RunConfig,
}

impl TriageNode {
    /// Triage backed by `model`
    pub fn new(model: Arc<dyn ChatModel>) -> Self {
        Self {
            routes: vec![
                ToolRoute {
                    tool: sentiment_tool(),
                    next: "sentiment_analyzer",
                    record: |_, output| ("sentiment", output.to_string()),
                },
                ToolRoute {
                    tool: topic_tool(),
                    next: "topic_researcher",
                    record: |args, _| ("topic", args["topic"].as_str().unwrap_or_default().to_string()),
                },
            ],
            config: RunConfig::new(model.clone()),
            model,
        }
    }

    async fn run_tool(&self, call: &ToolCall, ctx: &ExecutionContext) -> GraphResult<(String, StateUpdate)> {
        let name = &call.function.name;
        let route = self
            .routes
            .iter()
            .find(|r| r.tool.name() == *name)
            .ok_or_else(|| GraphError::execution(ctx.node(), format!("unknown tool '{}'", name)))?;

        let args = call
            .parse_arguments()
            .map_err(|e| GraphError::execution(ctx.node(), format!("bad tool arguments: {}", e)))?;

        let tool_ctx = ToolContext {
            context: RunContext::new(()),
            config: self.config.clone(),
            agent_name: ctx.node().to_string(),
        };
        let output = route.tool.call(&tool_ctx, args.clone()).await?;

        let (key, value) = (route.record)(&args, &output);
        Ok((output, StateUpdate::new().set("next", route.next).set(key, value)))
    }
}

#[async_trait]
impl Node for TriageNode {
    async fn execute(&self, state: &GraphState, ctx: &ExecutionContext) -> GraphResult<StateUpdate> {
        let mut messages = vec![ChatMessage::system(
            "You are an AI assistant. Analyze the user's input and determine if you need to analyze sentiment or get topic information.",
        )];
        messages.extend(state.messages().iter().cloned());

        let tools = self.routes.iter().map(|r| r.tool.definition()).collect();
        let request = ChatRequest::new(messages).with_tools(tools).with_temperature(0.0);
        let response = self.model.chat(request).await?;

        let Some(call) = response.tool_calls.as_ref().and_then(|calls| calls.first()) else {
            return Ok(StateUpdate::new().message(response.to_message()).set("next", "end"));
        };

        let (result, update) = self.run_tool(call, ctx).await?;
        info!(tool = %call.function.name, result = %result, "Triage ran a tool");

        // Only the first call is answered, so only it stays on the assistant message
        let assistant = ChatMessage::assistant(response.content.clone()).with_tool_calls(vec![call.clone()]);
        Ok(update.messages(vec![assistant, ChatMessage::tool(call.id.clone(), result)]))
    }

    fn name(&self) -> &str {
        "initial_agent"
    }
}

/// Value of the `next` key, `"end"` when unset
pub fn route_next(state: &GraphState) -> String {
    state.get_string("next").unwrap_or("end").to_string()
}

/// Triage → sentiment analyzer or topic researcher
pub fn analysis_graph(model: Arc<dyn ChatModel>) -> GraphResult<CompiledGraph> {
    StateGraph::new("analysis")
        .add_node("initial_agent", TriageNode::new(model.clone()))
        .add_node(
            "sentiment_analyzer",
            AgentNode::new("sentiment_analyzer", model.clone())
                .with_system_prompt("You are a sentiment analysis expert. Provide insights based on the sentiment analysis.")
                .with_temperature(0.0),
        )
        .add_node(
            "topic_researcher",
            AgentNode::new("topic_researcher", model)
                .with_system_prompt("You are a topic research expert. Provide detailed information about the given topic.")
                .with_temperature(0.0),
        )
        .set_entry_point("initial_agent")
        .add_conditional_edges(
            "initial_agent",
            route_next,
            [
                ("sentiment_analyzer", "sentiment_analyzer"),
                ("topic_researcher", "topic_researcher"),
                ("end", END),
            ],
        )
        .add_edge("sentiment_analyzer", END)
        .add_edge("topic_researcher", END)
        .compile()
}

#[cfg(test)]
mod tests {
    use super::*;
    use agentry_llm::mock::ScriptedModel;
    use agentry_llm::MessageRole;
    use serde_json::json;

    #[test]
    fn test_sentiment() {
        assert_eq!(analyze_sentiment("I'm really happy with the new AI features!"), "positive");
        assert_eq!(analyze_sentiment("This product is terrible and I'm very disappointed."), "negative");
        assert_eq!(analyze_sentiment("Tell me more about machine learning."), "neutral");
        assert_eq!(analyze_sentiment("good but sad"), "neutral");
    }

    #[test]
    fn test_topic_info() {
        assert!(get_topic_info("ML").starts_with("Machine Learning"));
        assert_eq!(get_topic_info("quantum"), "Topic not found in knowledge base.");
    }

    #[test]
    fn test_tool_schemas_require_their_argument() {
        assert_eq!(sentiment_tool().definition().parameters["required"], json!(["text"]));
        assert_eq!(topic_tool().definition().parameters["required"], json!(["topic"]));
    }

    #[tokio::test]
    async fn test_research_graph_runs_both_agents() {
        let model = Arc::new(
            ScriptedModel::new()
                .then_text("Key points: ML, deep learning, robotics")
                .then_text("AI learns from data and powers NLP, vision and robotics."),
        );
        let graph = research_graph(model.clone()).unwrap();

        let state = graph.invoke(GraphState::from_user(SAMPLE_TEXT)).await.unwrap();

        assert_eq!(state.messages().len(), 3);
        assert_eq!(state.messages()[1].content, "Key points: ML, deep learning, robotics");
        let requests = model.requests();
        assert!(requests[1].messages[0].content.contains("summarization expert"));
    }

    #[tokio::test]
    async fn test_analysis_graph_routes_on_tool_choice() {
        let model = Arc::new(
            ScriptedModel::new()
                .then_tool_call("analyze_sentiment", json!({"text": "I'm really happy!"}))
                .then_text("The user is clearly pleased."),
        );
        let graph = analysis_graph(model.clone()).unwrap();

        let state = graph
            .invoke(GraphState::from_user("I'm really happy with the new AI features!"))
            .await
            .unwrap();

        assert_eq!(state.get_string("sentiment"), Some("positive"));
        assert_eq!(state.get_string("next"), Some("sentiment_analyzer"));
        assert_eq!(state.last_ai_text(), Some("The user is clearly pleased."));

        let requests = model.requests();
        assert_eq!(requests[0].tools.len(), 2);
        assert_eq!(requests[1].messages.last().map(|m| m.role), Some(MessageRole::Tool));
    }

    #[tokio::test]
    async fn test_analysis_graph_topic_route_calls_topic_tool() {
        let model = Arc::new(
            ScriptedModel::new()
                .then_tool_call("get_topic_info", json!({"topic": "ML"}))
                .then_text("Machine learning learns patterns from data."),
        );
        let graph = analysis_graph(model.clone()).unwrap();

        let state = graph
            .invoke(GraphState::from_user("Tell me more about ML."))
            .await
            .unwrap();

        assert_eq!(state.get_string("topic"), Some("ML"));
        assert_eq!(state.get_string("next"), Some("topic_researcher"));
        let tool_message = model.requests()[1].messages.last().cloned().unwrap();
        assert_eq!(tool_message.role, MessageRole::Tool);
        assert!(tool_message.content.starts_with("Machine Learning is a subset of AI"));
    }

    #[tokio::test]
    async fn test_analysis_graph_rejects_unknown_tool() {
        let model = Arc::new(ScriptedModel::new().then_tool_call("web_search", json!({"q": "ai"})));
        let graph = analysis_graph(model).unwrap();

        let err = graph.invoke(GraphState::from_user("search")).await.unwrap_err();

        assert!(matches!(err, GraphError::Execution { ref node, ref message }
            if node == "initial_agent" && message.contains("web_search")));
    }

    #[tokio::test]
    async fn test_analysis_graph_ends_without_tool() {
        let model = Arc::new(ScriptedModel::new().then_text("Hello!"));
        let graph = analysis_graph(model.clone()).unwrap();

        let state = graph.invoke(GraphState::from_user("hi")).await.unwrap();

        assert_eq!(state.get_string("next"), Some("end"));
        assert_eq!(state.last_ai_text(), Some("Hello!"));
        assert_eq!(model.requests().len(), 1);
    }
}
