//! Embeddings and embedding providers

use crate::error::{RagError, RagResult};
use agentry_llm::EmbeddingModel;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// A dense vector plus the model that produced it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Embedding {
    /// Vector components
    pub vector: Vec<f32>,

    /// Dimensionality
    pub dimensions: usize,

    /// Producing model
    pub model: String,
}

impl Embedding {
    /// Wrap a vector
    pub fn new(vector: Vec<f32>, model: impl Into<String>) -> Self {
        let dimensions = vector.len();
        Self {
            vector,
            dimensions,
            model: model.into(),
        }
    }

    fn check_dimensions(&self, other: &Embedding) -> RagResult<()> {
        if self.dimensions != other.dimensions {
            return Err(RagError::validation(
                "embedding_dimensions",
                "dimensions must match",
                format!("{} vs {}", self.dimensions, other.dimensions),
            ));
        }
        Ok(())
    }

    /// Dot product
    pub fn dot(&self, other: &Embedding) -> RagResult<f32> {
        self.check_dimensions(other)?;
        Ok(self.vector.iter().zip(&other.vector).map(|(a, b)| a * b).sum())
    }

    /// Cosine similarity; zero when either vector is zero
    pub fn cosine_similarity(&self, other: &Embedding) -> RagResult<f32> {
        let dot = self.dot(other)?;
        let norm_a = self.norm();
        let norm_b = other.norm();

        if norm_a == 0.0 || norm_b == 0.0 {
            return Ok(0.0);
        }
        Ok(dot / (norm_a * norm_b))
    }

    /// Euclidean distance
    pub fn euclidean_distance(&self, other: &Embedding) -> RagResult<f32> {
        self.check_dimensions(other)?;
        let sum: f32 = self
            .vector
            .iter()
            .zip(&other.vector)
            .map(|(a, b)| (a - b).powi(2))
            .sum();
        Ok(sum.sqrt())
    }

    /// L2 norm
    pub fn norm(&self) -> f32 {
        self.vector.iter().map(|x| x * x).sum::<f32>().sqrt()
    }
}

/// Something that turns text into embeddings
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Embed one text
    async fn embed(&self, text: &str) -> RagResult<Embedding>;

    /// Embed several texts, preserving order
    async fn embed_batch(&self, texts: &[String]) -> RagResult<Vec<Embedding>> {
        let mut out = Vec::with_capacity(texts.len());
        for text in texts {
            out.push(self.embed(text).await?);
        }
        Ok(out)
    }

    /// Model name
    fn model_name(&self) -> &str;

    /// Vector size
    fn dimensions(&self) -> usize;
}

/// Deterministic offline embeddings from hashed tokens
///
/// Every lowercase alphanumeric token lands in a signed bucket, and the
/// result is L2 normalized, so texts sharing words score higher. Good for
/// demos and tests, useless for real semantics.
#[derive(Debug, Clone)]
pub struct HashEmbeddingProvider {
    dimensions: usize,
}

impl HashEmbeddingProvider {
    /// Provider producing `dimensions`-sized vectors
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions: dimensions.max(1),
        }
    }

    fn hash_embed(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dimensions];

        let tokens = text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
            .map(str::to_lowercase);

        for token in tokens {
            let mut hasher = DefaultHasher::new();
            token.hash(&mut hasher);
            let hash = hasher.finish();

            let bucket = (hash % self.dimensions as u64) as usize;
            let sign = if (hash >> 63) & 1 == 0 { 1.0 } else { -1.0 };
            vector[bucket] += sign;
        }

        let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            vector.iter_mut().for_each(|x| *x /= norm);
        }
        vector
    }
}

impl Default for HashEmbeddingProvider {
    fn default() -> Self {
        Self::new(256)
    }
}

#[async_trait]
impl EmbeddingProvider for HashEmbeddingProvider {
    async fn embed(&self, text: &str) -> RagResult<Embedding> {
        Ok(Embedding::new(self.hash_embed(text), "hash"))
    }

    fn model_name(&self) -> &str {
        "hash-embedding"
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}

/// Embeddings from a hosted [`EmbeddingModel`]
pub struct RemoteEmbeddingProvider {
    model: Arc<dyn EmbeddingModel>,
    dimensions: usize,
}

impl RemoteEmbeddingProvider {
    /// Wrap `model`, which produces `dimensions`-sized vectors
    pub fn new(model: Arc<dyn EmbeddingModel>, dimensions: usize) -> Self {
        Self { model, dimensions }
    }
}

#[async_trait]
impl EmbeddingProvider for RemoteEmbeddingProvider {
    async fn embed(&self, text: &str) -> RagResult<Embedding> {
        let mut batch = self.embed_batch(&[text.to_string()]).await?;
        batch.pop().ok_or_else(|| {
            RagError::validation("embedding_response", "must contain one vector", "0")
        })
    }

    async fn embed_batch(&self, texts: &[String]) -> RagResult<Vec<Embedding>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let vectors = self.model.embed(texts).await?;
        if vectors.len() != texts.len() {
            return Err(RagError::validation(
                "embedding_response",
                "must contain one vector per input",
                format!("{} for {} inputs", vectors.len(), texts.len()),
            ));
        }

        let model = self.model.model_name().to_string();
        Ok(vectors
            .into_iter()
            .map(|v| Embedding::new(v, model.clone()))
            .collect())
    }

    fn model_name(&self) -> &str {
        self.model.model_name()
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}

/// A search hit
#[derive(Debug, Clone)]
pub struct SearchResult<T> {
    /// The item found
    pub item: T,

    /// Similarity score, higher is closer
    pub score: f32,

    /// Distance, for distance-based indexes
    pub distance: Option<f32>,
}

impl<T> SearchResult<T> {
    /// Hit with a similarity score
    pub fn new(item: T, score: f32) -> Self {
        Self {
            item,
            score,
            distance: None,
        }
    }

    /// Attach a distance
    pub fn with_distance(mut self, distance: f32) -> Self {
        self.distance = Some(distance);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agentry_llm::mock::LetterEmbeddingModel;

    #[test]
    fn test_embedding_metrics() {
        let a = Embedding::new(vec![1.0, 0.0, 0.0], "test");
        let b = Embedding::new(vec![0.0, 1.0, 0.0], "test");

        assert!((a.cosine_similarity(&a).unwrap() - 1.0).abs() < 1e-6);
        assert!(a.cosine_similarity(&b).unwrap().abs() < 1e-6);
        assert!((a.euclidean_distance(&b).unwrap() - 2f32.sqrt()).abs() < 1e-6);
    }

    #[test]
    fn test_dimension_mismatch() {
        let a = Embedding::new(vec![1.0, 0.0], "test");
        let b = Embedding::new(vec![1.0, 0.0, 0.0], "test");
        assert!(a.cosine_similarity(&b).is_err());
        assert!(a.euclidean_distance(&b).is_err());
    }

    #[tokio::test]
    async fn test_hash_embeddings_are_normalized_and_deterministic() {
        let provider = HashEmbeddingProvider::new(64);
        let a = provider.embed("checked baggage allowance").await.unwrap();
        let again = provider.embed("Checked baggage allowance").await.unwrap();

        assert_eq!(a, again);
        assert!((a.norm() - 1.0).abs() < 1e-5);
        assert_eq!(a.dimensions, 64);
    }

    #[tokio::test]
    async fn test_hash_embeddings_reward_shared_tokens() {
        let provider = HashEmbeddingProvider::new(4096);
        let query = provider.embed("wifi on the plane").await.unwrap();
        let related = provider.embed("Is there wifi on the plane? Yes, free wifi.").await.unwrap();
        let unrelated = provider.embed("Baggage allowance is one carry-on bag").await.unwrap();

        assert!(query.dot(&related).unwrap() > query.dot(&unrelated).unwrap());
    }

    #[tokio::test]
    async fn test_remote_provider_keeps_order() {
        let provider = RemoteEmbeddingProvider::new(Arc::new(LetterEmbeddingModel), 26);
        let batch = provider
            .embed_batch(&["aaa".to_string(), "zzz".to_string()])
            .await
            .unwrap();

        assert_eq!(batch.len(), 2);
        assert!(batch[0].vector[0] > 0.0);
        assert!(batch[1].vector[25] > 0.0);
    }
}
