//! # Agentry LLM
//!
//! OpenAI-compatible chat completion and embeddings client.
//!
//! Any endpoint that speaks the `/chat/completions` and `/embeddings`
//! protocol works: OpenAI itself, Gemini's compatibility layer, local
//! servers such as Ollama or vLLM.
//!
//! ```rust,no_run
//! use agentry_llm::{ChatMessage, Client};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = Client::from_env()?;
//! let response = client
//!     .chat_completion(vec![ChatMessage::user("What is Rust?")])
//!     .await?;
//! println!("{}", response.content);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod client;
mod config;
mod error;
pub mod mock;
mod types;

pub use client::{ChatModel, Client, EmbeddingModel};
pub use config::{ClientConfig, Provider, GEMINI_BASE_URL, OPENAI_BASE_URL};
pub use error::{LlmError, LlmResult};
pub use types::{
    ChatMessage, ChatRequest, ChatResponse, MessageRole, ResponseFormat, ToolCall,
    ToolDefinition, ToolFunction, Usage,
};
