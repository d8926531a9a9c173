use std::sync::Arc;

use tracing::{info, instrument};

use crate::embedding::EmbeddingProvider;
use crate::error::VectorResult;
use crate::ingestion::{Ingestor, PointIdStrategy};
use crate::models::{Embedding, QueryResult, Record};
use crate::provisioner::{ExhaustionHook, Provisioner, ProvisionerConfig};
use crate::query::QueryService;
use crate::repository::VectorRepository;

/// Outcome of [`VectorService::index_records`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexReport {
    pub dimension: u64,
    pub points: usize,
}

/// Vector service combining embedding generation with the store pipeline
///
/// Owns the provisioner, ingestor and query service over one shared
/// repository handle. Every step is awaited before the next one starts.
pub struct VectorService<R: VectorRepository> {
    embedding_provider: Arc<dyn EmbeddingProvider>,
    model: String,
    provisioner: Provisioner<R>,
    ingestor: Ingestor<R>,
    query: QueryService<R>,
}

impl<R: VectorRepository> VectorService<R> {
    pub fn new(
        repository: Arc<R>,
        embedding_provider: Arc<dyn EmbeddingProvider>,
        model: impl Into<String>,
        provisioner_config: ProvisionerConfig,
    ) -> Self {
        Self {
            embedding_provider,
            model: model.into(),
            provisioner: Provisioner::new(Arc::clone(&repository), provisioner_config),
            ingestor: Ingestor::new(Arc::clone(&repository)),
            query: QueryService::new(repository),
        }
    }

    pub fn with_exhaustion_hook(mut self, hook: Arc<dyn ExhaustionHook>) -> Self {
        self.provisioner = self.provisioner.with_exhaustion_hook(hook);
        self
    }

    pub fn with_id_strategy(mut self, strategy: PointIdStrategy) -> Self {
        self.ingestor = self.ingestor.with_id_strategy(strategy);
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Embed each record's text, one request at a time.
    pub async fn embed_records(&self, records: &[Record]) -> VectorResult<Vec<Embedding>> {
        let texts: Vec<String> = records.iter().map(|r| r.text.clone()).collect();
        self.embedding_provider.embed_batch(&self.model, &texts).await
    }

    /// Embed records, recreate the collection for their dimension, upsert them.
    ///
    /// The dimension comes from the first embedding, so an empty batch fails
    /// in provisioning.
    #[instrument(skip(self, records), fields(records = records.len()))]
    pub async fn index_records(
        &self,
        collection_name: &str,
        records: &[Record],
    ) -> VectorResult<IndexReport> {
        info!("Generating embeddings...");
        let embeddings = self.embed_records(records).await?;
        let dimension = embeddings.first().map(Vec::len).unwrap_or_default() as u64;

        info!(
            "Setting up collection with {} vectors of dim {}...",
            embeddings.len(),
            dimension
        );
        self.provisioner.provision(collection_name, dimension).await?;
        let points = self
            .ingestor
            .ingest(collection_name, records, embeddings)
            .await?;

        Ok(IndexReport { dimension, points })
    }

    /// Embed `text` and return the `limit` most similar stored records.
    #[instrument(skip(self))]
    pub async fn search_text(
        &self,
        collection_name: &str,
        text: &str,
        limit: u64,
    ) -> VectorResult<Vec<QueryResult>> {
        let query_vector = self.embedding_provider.embed(&self.model, text).await?;
        self.query.search(collection_name, query_vector, limit).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::MockEmbeddingProvider;
    use crate::error::VectorError;
    use crate::models::ScoredHit;
    use crate::repository::MockVectorRepository;
    use mockall::predicate::eq;
    use serde_json::json;

    #[tokio::test]
    async fn test_embedding_failure_aborts_before_store_calls() {
        let mut provider = MockEmbeddingProvider::new();
        provider
            .expect_embed_batch()
            .times(1)
            .returning(|_, _| Err(VectorError::EmbeddingProvider("quota exceeded".to_string())));

        let mut repo = MockVectorRepository::new();
        repo.expect_list_collections().never();
        repo.expect_upsert().never();

        let service = VectorService::new(
            Arc::new(repo),
            Arc::new(provider),
            "text-embedding-3-small",
            ProvisionerConfig::default(),
        );

        let err = service
            .index_records("lyrics", &[Record::new(1, "a")])
            .await
            .unwrap_err();
        assert!(matches!(err, VectorError::EmbeddingProvider(_)));
    }

    #[tokio::test]
    async fn test_search_text_embeds_with_configured_model() {
        let mut provider = MockEmbeddingProvider::new();
        provider
            .expect_embed()
            .with(eq("text-embedding-3-small"), eq("我說再見"))
            .times(1)
            .returning(|_, _| Ok(vec![1.0, 0.0]));

        let mut repo = MockVectorRepository::new();
        repo.expect_search().times(1).returning(|_, query| {
            assert_eq!(query.vector, vec![1.0, 0.0]);
            Ok(vec![ScoredHit {
                point_id: Some(0),
                score: 0.8,
                payload: json!({"text": "說了再見", "id": 1}).as_object().cloned().unwrap(),
            }])
        });

        let service = VectorService::new(
            Arc::new(repo),
            Arc::new(provider),
            "text-embedding-3-small",
            ProvisionerConfig::default(),
        );

        let results = service.search_text("lyrics", "我說再見", 2).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].id, Some(1));
    }
}
