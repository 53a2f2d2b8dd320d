//! Airline customer support agents
//!
//! A triage agent hands off to an FAQ agent, which answers from the FAQ
//! document, and to a seat booking agent, which edits the passenger's
//! [`AirlineContext`]. Both specialists can hand back to triage.
//!
//! [`support_graph`] is the same FAQ behind a graph-based assistant/tools
//! loop instead of hand-offs.

use agentry_graph::prelude::*;
use agentry_llm::{ChatMessage, ChatModel, ChatRequest, ToolDefinition};
use agentry_rag::agent::{Agent, FunctionTool, Handoff, RunContext, Tool, RECOMMENDED_PROMPT_PREFIX};
use agentry_rag::retrieval::{split_markdown_sections, Document, EmbeddingProvider, VectorStoreRetriever};
use agentry_rag::{RagError, RagResult};
use async_trait::async_trait;
use rand::Rng;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

/// FAQ document the support agents answer from
pub const AIRLINE_FAQ: &str = include_str!("../data/airline_faq.md");

/// Name of the triage agent, used by hand-backs
pub const TRIAGE_AGENT: &str = "Triage Agent";

/// Attempts the support assistant makes before accepting an empty reply
pub const MAX_EMPTY_RETRIES: usize = 3;

const NO_ANSWER: &str = "I'm sorry, I don't know the answer to that question.";

/// Per-session passenger details
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AirlineContext {
    /// Passenger name
    pub passenger_name: Option<String>,
    /// Booking reference
    pub confirmation_number: Option<String>,
    /// Current seat
    pub seat_number: Option<String>,
    /// Flight being changed
    pub flight_number: Option<String>,
}

/// Retriever over the `##` sections of `faq`
pub async fn faq_retriever(
    faq: &str,
    provider: Arc<dyn EmbeddingProvider>,
) -> RagResult<VectorStoreRetriever> {
    let documents: Vec<Document> = split_markdown_sections(faq)
        .into_iter()
        .map(|section| Document::new(section.trim()).with_source("airline_faq.md"))
        .collect();
    VectorStoreRetriever::from_docs(documents, provider).await
}

#[derive(Deserialize, JsonSchema)]
struct FaqArgs {
    /// The customer's question
    question: String,
}

/// `faq_lookup`: the best matching FAQ section
pub fn faq_lookup_tool(retriever: Arc<VectorStoreRetriever>) -> FunctionTool<AirlineContext> {
    FunctionTool::typed(
        "faq_lookup",
        "Lookup frequently asked questions.",
        move |_ctx, args: FaqArgs| {
            let retriever = Arc::clone(&retriever);
            async move {
                let hits = retriever.query(&args.question, 1).await?;
                Ok(hits
                    .into_iter()
                    .next()
                    .map(|hit| hit.item.content)
                    .unwrap_or_else(|| NO_ANSWER.to_string()))
            }
        },
    )
}

#[derive(Deserialize, JsonSchema)]
struct UpdateSeatArgs {
    /// The confirmation number for the flight
    confirmation_number: String,
    /// The new seat to update to
    new_seat: String,
}

/// `update_seat`: record the new seat on the context
///
/// Fails until a flight number has been assigned by the seat booking
/// hand-off.
pub fn update_seat_tool() -> FunctionTool<AirlineContext> {
    FunctionTool::typed(
        "update_seat",
        "Update the seat for a given confirmation number.",
        |ctx: RunContext<AirlineContext>, args: UpdateSeatArgs| async move {
            ctx.update(|airline: &mut AirlineContext| {
                if airline.flight_number.is_none() {
                    return Err(RagError::tool("update_seat", "Flight number is required"));
                }
                airline.confirmation_number = Some(args.confirmation_number.clone());
                airline.seat_number = Some(args.new_seat.clone());
                Ok(())
            })?;

            info!(confirmation = %args.confirmation_number, seat = %args.new_seat, "Seat updated");
            Ok(format!(
                "Updated seat to {} for confirmation number {}",
                args.new_seat, args.confirmation_number
            ))
        },
    )
}

#[derive(Deserialize, JsonSchema)]
struct PolicyArgs {
    /// What to look up
    query: String,
}

/// `lookup_policy`: the two best matching FAQ sections, for the graph demo
pub fn lookup_policy_tool(retriever: Arc<VectorStoreRetriever>) -> FunctionTool {
    FunctionTool::typed(
        "lookup_policy",
        "Consult the company policies to check whether certain options are permitted. Use this before making any flight changes or performing other 'write' events.",
        move |_ctx, args: PolicyArgs| {
            let retriever = Arc::clone(&retriever);
            async move {
                let hits = retriever.query(&args.query, 2).await?;
                Ok(hits
                    .into_iter()
                    .map(|hit| hit.item.content)
                    .collect::<Vec<_>>()
                    .join("\n\n"))
            }
        },
    )
}

/// The three airline agents
pub struct AirlineAgents {
    /// Entry point
    pub triage: Arc<Agent<AirlineContext>>,
    /// Answers FAQ questions
    pub faq: Arc<Agent<AirlineContext>>,
    /// Changes seats
    pub seat_booking: Arc<Agent<AirlineContext>>,
}

impl AirlineAgents {
    /// Build the agents around an FAQ retriever
    pub fn new(retriever: Arc<VectorStoreRetriever>) -> Self {
        let faq = Agent::builder("FAQ Agent")
            .handoff_description("A helpful agent that can answer questions about the airline.")
            .instructions(format!(
                "{}\nYou are an FAQ agent. If you are speaking to a customer, you probably were transferred to from the triage agent.\n\
                 Use the following routine to support the customer.\n\
                 # Routine\n\
                 1. Identify the last question asked by the customer.\n\
                 2. Use the faq lookup tool to answer the question. Do not rely on your own knowledge.\n\
                 3. If you cannot answer the question, transfer back to the triage agent.",
                RECOMMENDED_PROMPT_PREFIX
            ))
            .tool(faq_lookup_tool(retriever))
            .handoff(Handoff::named(TRIAGE_AGENT))
            .build_arc();

        let seat_booking = Agent::builder("Seat Booking Agent")
            .handoff_description("A helpful agent that can update a seat on a flight.")
            .instructions(format!(
                "{}\nYou are a seat booking agent. If you are speaking to a customer, you probably were transferred to from the triage agent.\n\
                 Use the following routine to support the customer.\n\
                 # Routine\n\
                 1. Ask for their confirmation number.\n\
                 2. Ask the customer what their desired seat number is.\n\
                 3. Use the update seat tool to update the seat on the flight.\n\
                 If the customer asks a question that is not related to the routine, transfer back to the triage agent.",
                RECOMMENDED_PROMPT_PREFIX
            ))
            .tool(update_seat_tool())
            .handoff(Handoff::named(TRIAGE_AGENT))
            .build_arc();

        let triage = Agent::builder(TRIAGE_AGENT)
            .handoff_description("A triage agent that can delegate a customer's request to the appropriate agent.")
            .instructions(format!(
                "{}\nYou are a helpful triaging agent. You can use your tools to delegate questions to other appropriate agents.",
                RECOMMENDED_PROMPT_PREFIX
            ))
            .handoff(Arc::clone(&faq))
            .handoff(Handoff::new(Arc::clone(&seat_booking)).on_handoff(|ctx, _input| {
                let flight_number = format!("FLT-{}", rand::thread_rng().gen_range(100..=999));
                async move {
                    info!(flight = %flight_number, "Assigned flight for seat booking");
                    ctx.update(|airline: &mut AirlineContext| airline.flight_number = Some(flight_number));
                    Ok(())
                }
            }))
            .build_arc();

        Self {
            triage,
            faq,
            seat_booking,
        }
    }

    /// All agents, for registering on a run so hand-backs resolve
    pub fn all(&self) -> Vec<Arc<Agent<AirlineContext>>> {
        vec![
            Arc::clone(&self.triage),
            Arc::clone(&self.faq),
            Arc::clone(&self.seat_booking),
        ]
    }
}

/// Assistant node of [`support_graph`]
///
/// The system prompt names the passenger from the `passenger_id`
/// configurable value. An empty reply without tool calls is retried with a
/// nudge, up to [`MAX_EMPTY_RETRIES`] attempts.
pub struct SupportAssistant {
    model: Arc<dyn ChatModel>,
    tools: Vec<ToolDefinition>,
}

impl SupportAssistant {
    /// Assistant offering `tools`
    pub fn new(model: Arc<dyn ChatModel>, tools: &[Arc<dyn Tool>]) -> Self {
        Self {
            model,
            tools: tools.iter().map(|t| t.definition()).collect(),
        }
    }

    fn system_prompt(passenger: &str) -> String {
        format!(
            "You are a helpful customer support assistant for the airline. \
             Use the provided tools to search for company policies and other information to assist the user's queries. \
             When searching, be persistent. Expand your query bounds if the first search returns no results. \
             If a search comes up empty, expand your search before giving up.\n\n\
             Current user:\n<User>\n{}\n</User>\nCurrent time: {}.",
            passenger,
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
        )
    }
}

#[async_trait]
impl Node for SupportAssistant {
    async fn execute(&self, state: &GraphState, ctx: &ExecutionContext) -> GraphResult<StateUpdate> {
        let passenger = ctx
            .configurable("passenger_id")
            .and_then(|v| v.as_str())
            .ok_or_else(|| GraphError::validation("passenger_id", "No passenger ID configured."))?;

        let mut messages = vec![ChatMessage::system(Self::system_prompt(passenger))];
        messages.extend(state.messages().iter().cloned());

        let mut attempt = 1;
        loop {
            let request = ChatRequest::new(messages.clone())
                .with_tools(self.tools.clone())
                .with_temperature(1.0);
            let response = self.model.chat(request).await?;

            if response.has_tool_calls() || !response.content.trim().is_empty() || attempt >= MAX_EMPTY_RETRIES {
                return Ok(StateUpdate::new().message(response.to_message()));
            }

            warn!(attempt, "Assistant returned an empty reply, retrying");
            messages.push(ChatMessage::user("Respond with a real output."));
            attempt += 1;
        }
    }

    fn name(&self) -> &str {
        "assistant"
    }
}

/// Assistant/tools loop over `lookup_policy`
pub fn support_graph(model: Arc<dyn ChatModel>, retriever: Arc<VectorStoreRetriever>) -> GraphResult<CompiledGraph> {
    let tools: Vec<Arc<dyn Tool>> = vec![Arc::new(lookup_policy_tool(retriever))];

    StateGraph::new("customer_support")
        .add_node("assistant", SupportAssistant::new(model.clone(), &tools))
        .add_node("tools", ToolNode::new(tools, model))
        .add_edge(START, "assistant")
        .add_conditional_edges("assistant", tools_condition, [("tools", "tools"), (END, END)])
        .add_edge("tools", "assistant")
        .compile()
}
