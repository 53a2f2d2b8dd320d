//! Documents and their metadata

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Metadata key holding where a document came from
pub const SOURCE_KEY: &str = "source";

/// A piece of text with string metadata
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Text content
    pub content: String,

    /// Arbitrary metadata (`source`, `page`, ...)
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

impl Document {
    /// Document without metadata
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            metadata: HashMap::new(),
        }
    }

    /// Add a metadata entry
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Set the `source` metadata entry
    pub fn with_source(self, source: impl Into<String>) -> Self {
        self.with_metadata(SOURCE_KEY, source)
    }

    /// The `source` metadata entry, if any
    pub fn source(&self) -> Option<&str> {
        self.metadata.get(SOURCE_KEY).map(String::as_str)
    }
}

impl From<&str> for Document {
    fn from(content: &str) -> Self {
        Self::new(content)
    }
}

impl From<String> for Document {
    fn from(content: String) -> Self {
        Self::new(content)
    }
}
