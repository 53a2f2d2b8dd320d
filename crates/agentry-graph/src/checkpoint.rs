//! Checkpointers persist graph state between invocations of the same thread

use crate::error::{GraphError, GraphResult};
use crate::state::GraphState;
use agentry_rag::storage::{Memory, MemoryValue};
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

/// Saves and restores thread state
#[async_trait]
pub trait Checkpointer: Send + Sync {
    /// Last saved state of `thread_id`
    async fn get(&self, thread_id: &str) -> GraphResult<Option<GraphState>>;

    /// Save the state of `thread_id`
    async fn put(&self, thread_id: &str, state: &GraphState) -> GraphResult<()>;
}

/// In-process checkpointer
#[derive(Debug, Default)]
pub struct MemorySaver {
    threads: RwLock<HashMap<String, GraphState>>,
}

impl MemorySaver {
    /// Empty saver
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of saved threads
    pub fn len(&self) -> usize {
        self.threads.read().len()
    }

    /// Whether nothing is saved
    pub fn is_empty(&self) -> bool {
        self.threads.read().is_empty()
    }
}

#[async_trait]
impl Checkpointer for MemorySaver {
    async fn get(&self, thread_id: &str) -> GraphResult<Option<GraphState>> {
        Ok(self.threads.read().get(thread_id).cloned())
    }

    async fn put(&self, thread_id: &str, state: &GraphState) -> GraphResult<()> {
        self.threads
            .write()
            .insert(thread_id.to_string(), state.clone());
        Ok(())
    }
}

/// Checkpointer writing JSON snapshots into a [`Memory`] backend
///
/// Snapshots live under `graph::{thread_id}::checkpoint`.
pub struct StorageSaver {
    storage: Arc<dyn Memory>,
}

impl StorageSaver {
    /// Save into `storage`
    pub fn new(storage: Arc<dyn Memory>) -> Self {
        Self { storage }
    }

    fn key(thread_id: &str) -> String {
        format!("graph::{}::checkpoint", thread_id)
    }
}

#[async_trait]
impl Checkpointer for StorageSaver {
    async fn get(&self, thread_id: &str) -> GraphResult<Option<GraphState>> {
        let Some(value) = self.storage.get(&Self::key(thread_id)).await? else {
            return Ok(None);
        };
        let json = value
            .as_json()
            .ok_or_else(|| GraphError::validation("checkpoint", "expected a JSON snapshot"))?;
        let state = serde_json::from_value(json.clone())
            .map_err(|e| GraphError::validation("checkpoint", e.to_string()))?;
        Ok(Some(state))
    }

    async fn put(&self, thread_id: &str, state: &GraphState) -> GraphResult<()> {
        let json = serde_json::to_value(state)
            .map_err(|e| GraphError::validation("checkpoint", e.to_string()))?;
        self.storage
            .set(&Self::key(thread_id), MemoryValue::Json(json))
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agentry_llm::ChatMessage;
    use agentry_rag::storage::InMemoryStorage;

    #[tokio::test]
    async fn test_memory_saver_round_trip() {
        let saver = MemorySaver::new();
        assert!(saver.get("t1").await.unwrap().is_none());

        saver.put("t1", &GraphState::from_user("hi")).await.unwrap();
        let state = saver.get("t1").await.unwrap().unwrap();
        assert_eq!(state.messages().len(), 1);
        assert_eq!(saver.len(), 1);
    }

    #[tokio::test]
    async fn test_storage_saver_persists_json() {
        let storage = Arc::new(InMemoryStorage::new());
        let saver = StorageSaver::new(storage.clone());

        let mut state = GraphState::from_user("hi").with("passenger_id", "3442 587242");
        state.push_message(ChatMessage::assistant("hello"));
        saver.put("thread-9", &state).await.unwrap();

        assert!(storage.exists("graph::thread-9::checkpoint").await.unwrap());
        assert_eq!(saver.get("thread-9").await.unwrap(), Some(state));
    }
}
