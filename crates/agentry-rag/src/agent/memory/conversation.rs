//! Conversation memory, in-process and storage-backed

use crate::error::{RagError, RagResult};
use crate::storage::{Memory, MemoryValue};
use agentry_llm::{ChatMessage, MessageRole};
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

/// Default number of messages kept
pub const DEFAULT_MAX_LENGTH: usize = 50;

/// Drop the oldest non-system messages until at most `max_length` remain
///
/// A leading system message is never dropped.
fn prune(messages: &mut Vec<ChatMessage>, max_length: usize) -> usize {
    if messages.len() <= max_length {
        return 0;
    }

    let start = usize::from(matches!(
        messages.first().map(|m| &m.role),
        Some(MessageRole::System)
    ));
    let excess = messages.len() - max_length;
    let removable = excess.min(messages.len() - start);
    messages.drain(start..start + removable);
    removable
}

/// In-process chat history with a length cap
#[derive(Debug, Clone)]
pub struct ConversationMemory {
    messages: Vec<ChatMessage>,
    max_length: usize,
}

impl Default for ConversationMemory {
    fn default() -> Self {
        Self::with_max_length(DEFAULT_MAX_LENGTH)
    }
}

impl ConversationMemory {
    /// Empty history with the default cap
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty history keeping at most `max_length` messages
    pub fn with_max_length(max_length: usize) -> Self {
        Self {
            messages: Vec::new(),
            max_length: max_length.max(1),
        }
    }

    /// Append a message, pruning the oldest ones past the cap
    pub fn add_message(&mut self, message: ChatMessage) {
        self.messages.push(message);
        prune(&mut self.messages, self.max_length);
    }

    /// Messages in order
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Owned copy of the history, ready for a chat request
    pub fn to_messages(&self) -> Vec<ChatMessage> {
        self.messages.clone()
    }

    /// Drop everything except a leading system message
    pub fn clear(&mut self) {
        let system = self
            .messages
            .first()
            .filter(|m| m.role == MessageRole::System)
            .cloned();
        self.messages.clear();
        self.messages.extend(system);
    }

    /// Number of messages
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Whether there are no messages
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

/// Conversation memory backed by a [`Memory`] store
///
/// Messages live under `session::{id}::conversation::msg_{n}` with the
/// length in `session::{id}::conversation::count`. With `persist` off the
/// history is kept in-process only.
pub struct ConversationMemoryStore {
    storage: Arc<dyn Memory>,
    namespace: String,
    max_length: usize,
    persist: bool,
    cache: Mutex<ConversationMemory>,
}

impl ConversationMemoryStore {
    /// Create a store for `session_id`
    pub fn new(storage: Arc<dyn Memory>, session_id: impl AsRef<str>, max_length: usize, persist: bool) -> Self {
        Self {
            storage,
            namespace: format!("session::{}::conversation", session_id.as_ref()),
            max_length: max_length.max(1),
            persist,
            cache: Mutex::new(ConversationMemory::with_max_length(max_length)),
        }
    }

    /// Storage namespace of this session
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Append a message
    pub async fn add_message(&self, message: ChatMessage) -> RagResult<()> {
        if !self.persist {
            self.cache.lock().add_message(message);
            return Ok(());
        }

        let count = self.count().await?;
        self.storage
            .set(&self.message_key(count), message_to_value(&message)?)
            .await?;
        self.set_count(count + 1).await?;

        if count + 1 > self.max_length {
            self.prune_stored().await?;
        }
        Ok(())
    }

    /// All messages in order
    pub async fn get_messages(&self) -> RagResult<Vec<ChatMessage>> {
        if !self.persist {
            return Ok(self.cache.lock().to_messages());
        }

        let count = self.count().await?;
        let keys: Vec<String> = (0..count).map(|i| self.message_key(i)).collect();

        self.storage
            .mget(&keys)
            .await?
            .into_iter()
            .flatten()
            .map(|value| value_to_message(&value))
            .collect()
    }

    /// Number of stored messages
    pub async fn count(&self) -> RagResult<usize> {
        if !self.persist {
            return Ok(self.cache.lock().len());
        }

        let count = self
            .storage
            .get(&self.count_key())
            .await?
            .and_then(|v| v.as_integer())
            .unwrap_or(0);
        Ok(usize::try_from(count).unwrap_or(0))
    }

    /// Drop everything except a leading system message
    pub async fn clear(&self) -> RagResult<()> {
        if !self.persist {
            self.cache.lock().clear();
            return Ok(());
        }

        let system = self
            .get_messages()
            .await?
            .into_iter()
            .next()
            .filter(|m| m.role == MessageRole::System);

        self.storage.clear(Some(&self.namespace)).await?;

        if let Some(message) = system {
            self.add_message(message).await?;
        }
        Ok(())
    }

    /// Whether the conversation is empty
    pub async fn is_empty(&self) -> RagResult<bool> {
        Ok(self.count().await? == 0)
    }

    fn message_key(&self, index: usize) -> String {
        format!("{}::msg_{}", self.namespace, index)
    }

    fn count_key(&self) -> String {
        format!("{}::count", self.namespace)
    }

    async fn set_count(&self, count: usize) -> RagResult<()> {
        let count = i64::try_from(count)
            .map_err(|_| RagError::validation("count", "must fit in i64", count.to_string()))?;
        self.storage.set(&self.count_key(), MemoryValue::Integer(count)).await
    }

    async fn prune_stored(&self) -> RagResult<()> {
        let mut messages = self.get_messages().await?;
        let removed = prune(&mut messages, self.max_length);
        if removed == 0 {
            return Ok(());
        }

        debug!(namespace = %self.namespace, removed, "Pruning conversation history");

        self.storage.clear(Some(&self.namespace)).await?;
        let pairs = messages
            .iter()
            .enumerate()
            .map(|(i, m)| Ok((self.message_key(i), message_to_value(m)?)))
            .collect::<RagResult<Vec<_>>>()?;
        self.storage.mset(&pairs).await?;
        self.set_count(messages.len()).await
    }
}

fn message_to_value(message: &ChatMessage) -> RagResult<MemoryValue> {
    let json = serde_json::to_value(message)
        .map_err(|e| RagError::storage("serialize_message", std::io::Error::other(e)))?;
    Ok(MemoryValue::Json(json))
}

fn value_to_message(value: &MemoryValue) -> RagResult<ChatMessage> {
    let json = value.as_json().ok_or_else(|| {
        RagError::storage(
            "invalid_message_type",
            std::io::Error::new(std::io::ErrorKind::InvalidData, "Expected JSON value"),
        )
    })?;

    serde_json::from_value(json.clone())
        .map_err(|e| RagError::storage("deserialize_message", std::io::Error::other(e)))
}

/// Generate a unique session ID
pub fn generate_session_id() -> String {
    Uuid::new_v4().to_string()
}
