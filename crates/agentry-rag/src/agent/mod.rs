//! # Agents
//!
//! Agents with tools and handoffs, driven by [`Runner`].
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use agentry_rag::agent::{Agent, RunConfig, RunContext, Runner};
//!
//! let billing = Agent::builder("Billing Agent")
//!     .instructions("You handle billing questions.")
//!     .build_arc();
//!
//! let triage = Agent::builder("Triage Agent")
//!     .instructions("Route the customer to the right specialist.")
//!     .handoff(billing)
//!     .build_arc();
//!
//! let config = RunConfig::new(Arc::new(Client::from_env()?));
//! let result = Runner::run(triage, "I was charged twice", RunContext::new(()), &config).await?;
//! println!("{}: {}", result.last_agent.name(), result.final_output);
//! ```

mod agent;
mod context;
mod handoff;
pub mod memory;
mod runner;
mod tool;

pub use agent::{Agent, AgentBuilder, Instructions, ModelSettings, OutputSchema};
pub use context::RunContext;
pub use handoff::{
    default_tool_name, prompt_with_handoff_instructions, Handoff, HandoffTarget,
    RECOMMENDED_PROMPT_PREFIX,
};
pub use memory::{
    generate_session_id, ComposableMemory, ConversationMemory, ConversationMemoryStore, VectorMemory,
};
pub use runner::{
    parse_structured, RunConfig, RunInput, RunItem, RunResult, Runner, DEFAULT_MAX_TURNS,
};
pub use tool::{schema_for, AgentTool, FunctionTool, Tool, ToolContext};
