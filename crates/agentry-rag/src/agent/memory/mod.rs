//! Conversation history for agents
//!
//! [`ConversationMemory`] is a plain in-process buffer. [`ConversationMemoryStore`]
//! keeps the same history in any [`Memory`](crate::storage::Memory) backend,
//! namespaced per session. [`VectorMemory`] recalls older exchanges by
//! similarity, and [`ComposableMemory`] combines it with a chat buffer.

mod conversation;
mod vector;

pub use conversation::{generate_session_id, ConversationMemory, ConversationMemoryStore};
pub use vector::{with_retrieved_context, ComposableMemory, VectorMemory, DEFAULT_SIMILARITY_TOP_K};
