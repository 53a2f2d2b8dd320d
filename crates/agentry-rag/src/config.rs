//! Document processing settings

use crate::error::{RagError, RagResult};
use serde::Deserialize;

/// Settings for chunking and retrieval
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RagSettings {
    /// Maximum characters per chunk
    pub chunk_size: usize,

    /// Characters shared between neighbouring chunks
    pub chunk_overlap: usize,

    /// Number of chunks retrieved per query
    pub top_k: usize,

    /// Dimensionality of the embedding vectors
    pub embedding_dimensions: usize,
}

impl Default for RagSettings {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            chunk_overlap: 200,
            top_k: 4,
            embedding_dimensions: 1536,
        }
    }
}

impl RagSettings {
    /// Load from `AGENTRY_RAG_*` environment variables over the defaults
    pub fn from_env() -> RagResult<Self> {
        Self::load(config::Environment::with_prefix("AGENTRY_RAG"))
    }

    fn load(environment: config::Environment) -> RagResult<Self> {
        let defaults = Self::default();
        let settings: Self = config::Config::builder()
            .set_default("chunk_size", defaults.chunk_size as u64)?
            .set_default("chunk_overlap", defaults.chunk_overlap as u64)?
            .set_default("top_k", defaults.top_k as u64)?
            .set_default("embedding_dimensions", defaults.embedding_dimensions as u64)?
            .add_source(environment)
            .build()?
            .try_deserialize()?;

        settings.validate()?;
        Ok(settings)
    }

    /// Check cross-field constraints
    pub fn validate(&self) -> RagResult<()> {
        if self.chunk_size == 0 {
            return Err(RagError::validation("chunk_size", "must be positive", "0"));
        }
        if self.chunk_overlap >= self.chunk_size {
            return Err(RagError::validation(
                "chunk_overlap",
                "must be smaller than chunk_size",
                format!("{} >= {}", self.chunk_overlap, self.chunk_size),
            ));
        }
        if self.top_k == 0 {
            return Err(RagError::validation("top_k", "must be positive", "0"));
        }
        Ok(())
    }

    /// Set chunking parameters
    pub fn with_chunking(mut self, chunk_size: usize, chunk_overlap: usize) -> Self {
        self.chunk_size = chunk_size;
        self.chunk_overlap = chunk_overlap;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(vars: &[(&str, &str)]) -> config::Environment {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        config::Environment::with_prefix("AGENTRY_RAG").source(Some(map))
    }

    #[test]
    fn test_defaults() {
        let settings = RagSettings::load(env(&[])).unwrap();
        assert_eq!(settings, RagSettings::default());
    }

    #[test]
    fn test_overrides() {
        let settings = RagSettings::load(env(&[
            ("AGENTRY_RAG_CHUNK_SIZE", "300"),
            ("AGENTRY_RAG_CHUNK_OVERLAP", "50"),
        ]))
        .unwrap();
        assert_eq!(settings.chunk_size, 300);
        assert_eq!(settings.chunk_overlap, 50);
    }

    #[test]
    fn test_overlap_must_be_smaller() {
        let err = RagSettings::default().with_chunking(100, 100).validate();
        assert!(matches!(err, Err(RagError::Validation { .. })));
    }
}
