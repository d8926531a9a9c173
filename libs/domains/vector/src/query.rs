use std::sync::Arc;

use tracing::{debug, instrument};

use crate::error::VectorResult;
use crate::models::{Embedding, QueryResult, SearchQuery};
use crate::repository::VectorRepository;

/// Top-k similarity search projected to [`QueryResult`]s
pub struct QueryService<R: VectorRepository> {
    repository: Arc<R>,
}

impl<R: VectorRepository> QueryService<R> {
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    /// Up to `limit` results in the store's order (best score first).
    #[instrument(skip(self, query_vector), fields(dimension = query_vector.len()))]
    pub async fn search(
        &self,
        collection_name: &str,
        query_vector: Embedding,
        limit: u64,
    ) -> VectorResult<Vec<QueryResult>> {
        if limit == 0 {
            return Ok(Vec::new());
        }

        let hits = self
            .repository
            .search(collection_name, SearchQuery::text(query_vector, limit))
            .await?;
        debug!(hits = hits.len(), "Search completed");

        Ok(hits.into_iter().map(QueryResult::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::VectorError;
    use crate::models::ScoredHit;
    use crate::repository::MockVectorRepository;
    use mockall::predicate::{eq, function};
    use serde_json::json;

    fn hit(point_id: u64, text: &str, id: i64, score: f32) -> ScoredHit {
        ScoredHit {
            point_id: Some(point_id),
            score,
            payload: json!({"text": text, "id": id}).as_object().cloned().unwrap(),
        }
    }

    #[tokio::test]
    async fn test_search_projects_hits_in_store_order() {
        let mut repo = MockVectorRepository::new();
        repo.expect_search()
            .with(
                eq("lyrics"),
                function(|q: &SearchQuery| {
                    q.vector_name == "text" && q.limit == 2 && !q.with_vectors && q.with_payload
                }),
            )
            .times(1)
            .returning(|_, _| Ok(vec![hit(0, "A", 1, 0.91), hit(1, "B", 2, 0.42)]));

        let results = QueryService::new(Arc::new(repo))
            .search("lyrics", vec![0.5; 4], 2)
            .await
            .unwrap();

        assert_eq!(
            results,
            vec![
                QueryResult { lyric: "A".to_string(), id: Some(1), score: 0.91 },
                QueryResult { lyric: "B".to_string(), id: Some(2), score: 0.42 },
            ]
        );
    }

    #[tokio::test]
    async fn test_empty_collection_yields_empty_results() {
        let mut repo = MockVectorRepository::new();
        repo.expect_search().times(1).returning(|_, _| Ok(vec![]));

        let results = QueryService::new(Arc::new(repo))
            .search("lyrics", vec![0.5; 4], 5)
            .await
            .unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_zero_limit_skips_store() {
        let mut repo = MockVectorRepository::new();
        repo.expect_search().never();

        let results = QueryService::new(Arc::new(repo))
            .search("lyrics", vec![0.5; 4], 0)
            .await
            .unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_search_failure_propagates() {
        let mut repo = MockVectorRepository::new();
        repo.expect_search()
            .returning(|_, _| Err(VectorError::StoreQuery("collection not found".to_string())));

        let err = QueryService::new(Arc::new(repo))
            .search("missing", vec![0.5; 4], 1)
            .await
            .unwrap_err();
        assert!(matches!(err, VectorError::StoreQuery(_)));
    }
}
