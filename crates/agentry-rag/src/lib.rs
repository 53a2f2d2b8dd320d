//! # Agentry RAG
//!
//! Agents with tools and handoffs, conversation memory, and a small
//! retrieval toolkit.
//!
//! - [`agent`]: agents, tools, handoffs and the [`Runner`](agent::Runner) loop
//! - [`storage`]: async key/value [`Memory`](storage::Memory) backends
//! - [`retrieval`]: documents, splitters, embeddings and vector search
//! - [`guardrails`], [`router`], [`gateway`]: the document RAG CLI pieces
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use agentry_rag::prelude::*;
//!
//! let agent = Agent::builder("Assistant")
//!     .instructions("You are a helpful assistant")
//!     .build_arc();
//!
//! let config = RunConfig::new(Arc::new(Client::from_env()?));
//! let result = Runner::run(agent, "Write a haiku about Rust", RunContext::new(()), &config).await?;
//! println!("{}", result.final_output);
//! ```

#![warn(missing_docs)]

pub mod agent;
pub mod config;
pub mod error;
pub mod gateway;
pub mod guardrails;
pub mod retrieval;
pub mod router;
pub mod storage;

pub use error::{RagError, RagResult};

/// Commonly used types
pub mod prelude {
    pub use crate::agent::{
        Agent, AgentBuilder, ConversationMemory, ConversationMemoryStore, FunctionTool, Handoff,
        RunConfig, RunContext, RunItem, RunResult, Runner, Tool, ToolContext,
    };
    pub use crate::config::RagSettings;
    pub use crate::error::{RagError, RagResult};
    pub use crate::retrieval::{
        Document, EmbeddingProvider, HashEmbeddingProvider, RagPipeline, TextSplitter,
        VectorStoreRetriever,
    };
    pub use crate::storage::{InMemoryStorage, Memory, MemoryValue};
}
