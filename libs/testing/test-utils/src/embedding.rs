//! Deterministic embedding provider
//!
//! `StubEmbeddingProvider` hashes each text into a unit vector so the same
//! text always embeds to the same vector without any network access.

use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::sync::Mutex;

use async_trait::async_trait;
use domain_vector::{Embedding, EmbeddingProvider, VectorError, VectorResult};

/// Dimension of `text-embedding-3-small` and `text-embedding-ada-002`
pub const DEFAULT_STUB_DIMENSION: usize = 1536;

pub struct StubEmbeddingProvider {
    dimension: usize,
    overrides: HashMap<String, Embedding>,
    failure: Option<String>,
    requests: Mutex<Vec<(String, String)>>,
}

impl Default for StubEmbeddingProvider {
    fn default() -> Self {
        Self::new(DEFAULT_STUB_DIMENSION)
    }
}

impl StubEmbeddingProvider {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            overrides: HashMap::new(),
            failure: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Return `vector` for `text` instead of the hashed one
    pub fn with_vector(mut self, text: impl Into<String>, vector: Embedding) -> Self {
        self.overrides.insert(text.into(), vector);
        self
    }

    /// Every call fails with `VectorError::EmbeddingProvider(message)`
    pub fn failing(mut self, message: impl Into<String>) -> Self {
        self.failure = Some(message.into());
        self
    }

    /// `(model, text)` pairs in request order
    pub fn requests(&self) -> Vec<(String, String)> {
        self.requests
            .lock()
            .map(|r| r.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }

    /// The vector this provider returns for `text`
    pub fn vector_for(&self, text: &str) -> Embedding {
        if let Some(vector) = self.overrides.get(text) {
            return vector.clone();
        }

        let mut hasher = DefaultHasher::new();
        text.hash(&mut hasher);
        let mut state = hasher.finish() | 1;

        // xorshift64
        let mut vector: Embedding = (0..self.dimension)
            .map(|_| {
                state ^= state << 13;
                state ^= state >> 7;
                state ^= state << 17;
                (state >> 40) as f32 / (1u64 << 23) as f32 - 1.0
            })
            .collect();

        let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            vector.iter_mut().for_each(|x| *x /= norm);
        }
        vector
    }
}

#[async_trait]
impl EmbeddingProvider for StubEmbeddingProvider {
    async fn embed(&self, model: &str, text: &str) -> VectorResult<Embedding> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push((model.to_string(), text.to_string()));
        }
        if let Some(message) = &self.failure {
            return Err(VectorError::EmbeddingProvider(message.clone()));
        }
        Ok(self.vector_for(text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_same_text_same_vector() {
        let provider = StubEmbeddingProvider::new(8);
        let a = provider.embed("m", "天涼了").await.unwrap();
        let b = provider.embed("m", "天涼了").await.unwrap();
        let c = provider.embed("m", "說了再見").await.unwrap();

        assert_eq!(a.len(), 8);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_vectors_are_unit_length() {
        let provider = StubEmbeddingProvider::default();
        let v = provider.vector_for("hello");
        let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();

        assert_eq!(v.len(), DEFAULT_STUB_DIMENSION);
        assert!((norm - 1.0).abs() < 1e-3);
    }

    #[tokio::test]
    async fn test_override_and_failure() {
        let provider = StubEmbeddingProvider::new(2).with_vector("x", vec![1.0, 0.0]);
        assert_eq!(provider.embed("m", "x").await.unwrap(), vec![1.0, 0.0]);

        let failing = StubEmbeddingProvider::new(2).failing("401 Unauthorized");
        let err = failing.embed("m", "x").await.unwrap_err();
        assert!(matches!(err, VectorError::EmbeddingProvider(ref m) if m == "401 Unauthorized"));
        assert_eq!(failing.requests(), vec![("m".to_string(), "x".to_string())]);
    }
}
