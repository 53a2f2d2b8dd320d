//! # Agentry
//!
//! Agents on OpenAI-compatible chat models:
//!
//! - **Agentry LLM**: chat completion and embeddings client with tool calling
//! - **Agentry RAG**: agents, tools, handoffs, conversation memory and retrieval
//! - **Agentry Graph**: state graph workflows and sequential crews
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use agentry::prelude::*;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let model = Arc::new(Client::from_env()?);
//!
//!     let agent = Agent::builder("Assistant")
//!         .instructions("You are a helpful assistant")
//!         .build_arc();
//!
//!     let config = RunConfig::new(model);
//!     let result = Runner::run(agent, "What is Rust?", RunContext::new(()), &config).await?;
//!     println!("{}", result.final_output);
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//!              agentry
//!   (umbrella crate, re-exports)
//!                 |
//!       +---------+---------+
//!       |         |         |
//!     llm  <--   rag  <--  graph
//! ```

#![doc(html_root_url = "https://docs.rs/agentry/0.1.0")]
#![warn(missing_docs)]

#[cfg(feature = "llm")]
pub use agentry_llm as llm;

#[cfg(feature = "rag")]
pub use agentry_rag as rag;

#[cfg(feature = "graph")]
pub use agentry_graph as graph;

/// Commonly used types and traits
pub mod prelude {
    #[cfg(feature = "llm")]
    pub use crate::llm::{ChatMessage, ChatModel, ChatResponse, Client, MessageRole};

    #[cfg(feature = "rag")]
    pub use crate::rag::prelude::*;

    #[cfg(feature = "graph")]
    pub use crate::graph::prelude::*;
}
