//! # Key/value storage for agent memory
//!
//! Keys are namespaced with `::` separators (`session::<id>::conversation::msg_0`).
//! Namespace queries match on the `<namespace>::` prefix.

mod memory;

pub use memory::InMemoryStorage;

use crate::error::RagResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A stored value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MemoryValue {
    /// UTF-8 text
    String(String),
    /// Signed integer
    Integer(i64),
    /// Floating point number
    Float(f64),
    /// Boolean flag
    Boolean(bool),
    /// Arbitrary JSON
    Json(serde_json::Value),
    /// Raw bytes
    Bytes(Vec<u8>),
}

impl MemoryValue {
    /// Borrow as text
    pub fn as_string(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Read as an integer
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Read as a float (integers widen)
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(f) => Some(*f),
            Self::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Read as a boolean
    pub fn as_boolean(&self) -> Option<bool> {
        match self {
            Self::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Borrow as JSON
    pub fn as_json(&self) -> Option<&serde_json::Value> {
        match self {
            Self::Json(v) => Some(v),
            _ => None,
        }
    }
}

impl From<&str> for MemoryValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for MemoryValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<i64> for MemoryValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<f64> for MemoryValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<bool> for MemoryValue {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<serde_json::Value> for MemoryValue {
    fn from(value: serde_json::Value) -> Self {
        Self::Json(value)
    }
}

/// Filter for key listings
#[derive(Debug, Clone, Default)]
pub struct MemoryQuery {
    /// Only keys under this namespace
    pub namespace: Option<String>,

    /// Maximum number of keys returned
    pub limit: Option<usize>,
}

impl MemoryQuery {
    /// Match every key
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict to a namespace
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    /// Cap the number of keys
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Async key/value store backing agent memory
#[async_trait]
pub trait Memory: Send + Sync {
    /// Read a value
    async fn get(&self, key: &str) -> RagResult<Option<MemoryValue>>;

    /// Write a value
    async fn set(&self, key: &str, value: MemoryValue) -> RagResult<()>;

    /// Remove a value, returning whether it existed
    async fn delete(&self, key: &str) -> RagResult<bool>;

    /// Whether a key is present
    async fn exists(&self, key: &str) -> RagResult<bool>;

    /// List keys, sorted
    async fn keys(&self, query: &MemoryQuery) -> RagResult<Vec<String>>;

    /// Count keys in a namespace (or all keys)
    async fn count(&self, namespace: Option<&str>) -> RagResult<usize>;

    /// Remove every key in a namespace (or everything)
    async fn clear(&self, namespace: Option<&str>) -> RagResult<()>;

    /// Read several values
    async fn mget(&self, keys: &[String]) -> RagResult<Vec<Option<MemoryValue>>> {
        let mut values = Vec::with_capacity(keys.len());
        for key in keys {
            values.push(self.get(key).await?);
        }
        Ok(values)
    }

    /// Write several values
    async fn mset(&self, pairs: &[(String, MemoryValue)]) -> RagResult<()> {
        for (key, value) in pairs {
            self.set(key, value.clone()).await?;
        }
        Ok(())
    }

    /// Remove several values, returning how many existed
    async fn mdelete(&self, keys: &[String]) -> RagResult<usize> {
        let mut removed = 0;
        for key in keys {
            if self.delete(key).await? {
                removed += 1;
            }
        }
        Ok(removed)
    }
}
