//! In-process storage backend

use super::{Memory, MemoryQuery, MemoryValue};
use crate::error::RagResult;
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;

/// Storage backed by a `HashMap` behind a read/write lock
#[derive(Debug, Default)]
pub struct InMemoryStorage {
    entries: RwLock<HashMap<String, MemoryValue>>,
}

impl InMemoryStorage {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }
}

fn in_namespace(key: &str, namespace: Option<&str>) -> bool {
    match namespace {
        None => true,
        Some(ns) => key
            .strip_prefix(ns)
            .is_some_and(|rest| rest.starts_with("::")),
    }
}

#[async_trait]
impl Memory for InMemoryStorage {
    async fn get(&self, key: &str) -> RagResult<Option<MemoryValue>> {
        Ok(self.entries.read().get(key).cloned())
    }

    async fn set(&self, key: &str, value: MemoryValue) -> RagResult<()> {
        self.entries.write().insert(key.to_string(), value);
        Ok(())
    }

    async fn delete(&self, key: &str) -> RagResult<bool> {
        Ok(self.entries.write().remove(key).is_some())
    }

    async fn exists(&self, key: &str) -> RagResult<bool> {
        Ok(self.entries.read().contains_key(key))
    }

    async fn keys(&self, query: &MemoryQuery) -> RagResult<Vec<String>> {
        let mut keys: Vec<String> = self
            .entries
            .read()
            .keys()
            .filter(|k| in_namespace(k, query.namespace.as_deref()))
            .cloned()
            .collect();
        keys.sort();

        if let Some(limit) = query.limit {
            keys.truncate(limit);
        }
        Ok(keys)
    }

    async fn count(&self, namespace: Option<&str>) -> RagResult<usize> {
        Ok(self
            .entries
            .read()
            .keys()
            .filter(|k| in_namespace(k, namespace))
            .count())
    }

    async fn clear(&self, namespace: Option<&str>) -> RagResult<()> {
        self.entries
            .write()
            .retain(|k, _| !in_namespace(k, namespace));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_namespace_isolation() {
        let storage = InMemoryStorage::new();
        storage.set("session::a::x", 1i64.into()).await.unwrap();
        storage.set("session::a::y", 2i64.into()).await.unwrap();
        storage.set("session::ab::x", 3i64.into()).await.unwrap();

        assert_eq!(storage.count(Some("session::a")).await.unwrap(), 2);
        assert_eq!(storage.count(None).await.unwrap(), 3);

        let keys = storage
            .keys(&MemoryQuery::new().with_namespace("session::a"))
            .await
            .unwrap();
        assert_eq!(keys, vec!["session::a::x", "session::a::y"]);

        storage.clear(Some("session::a")).await.unwrap();
        assert!(storage.exists("session::ab::x").await.unwrap());
        assert!(!storage.exists("session::a::x").await.unwrap());
    }

    #[tokio::test]
    async fn test_batch_operations() {
        let storage = InMemoryStorage::new();
        storage
            .mset(&[
                ("k1".to_string(), "one".into()),
                ("k2".to_string(), true.into()),
            ])
            .await
            .unwrap();

        let values = storage
            .mget(&["k1".to_string(), "missing".to_string()])
            .await
            .unwrap();
        assert_eq!(values[0].as_ref().and_then(|v| v.as_string()), Some("one"));
        assert!(values[1].is_none());

        let removed = storage
            .mdelete(&["k1".to_string(), "k2".to_string(), "k3".to_string()])
            .await
            .unwrap();
        assert_eq!(removed, 2);
    }
}
