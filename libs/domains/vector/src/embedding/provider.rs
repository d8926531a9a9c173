use async_trait::async_trait;

use crate::error::VectorResult;
use crate::models::Embedding;

/// Trait for embedding generation providers
///
/// `embed` is a single synchronous-in-flow request: no retry happens at this
/// layer, a failure is returned to the caller unchanged.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Generate the embedding for a single text
    async fn embed(&self, model: &str, text: &str) -> VectorResult<Embedding>;

    /// Embed texts one request at a time, in order, stopping at the first failure
    async fn embed_batch(&self, model: &str, texts: &[String]) -> VectorResult<Vec<Embedding>> {
        let mut embeddings = Vec::with_capacity(texts.len());
        for text in texts {
            embeddings.push(self.embed(model, text).await?);
        }
        Ok(embeddings)
    }
}
