//! In-memory vector store
//!
//! Provides an `InMemoryVectorRepository` that implements the domain's
//! `VectorRepository` with brute-force cosine scoring, plus knobs to inject
//! the failures a remote store produces.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use domain_vector::{
    ScoredHit, SearchQuery, StoredPoint, VectorConfig, VectorError, VectorRepository,
    VectorResult,
};

/// A call observed by [`InMemoryVectorRepository`]
#[derive(Debug, Clone, PartialEq)]
pub enum RepositoryCall {
    ListCollections,
    DeleteCollection(String),
    CreateCollection(String, VectorConfig),
    Upsert {
        collection: String,
        points: usize,
        wait: bool,
    },
    Search {
        collection: String,
        limit: u64,
    },
}

#[derive(Default)]
struct Faults {
    list_failures: u32,
    create_failures: u32,
    ignore_deletes: bool,
    hide_created: bool,
    fail_upsert: bool,
    fail_search: bool,
}

struct Collection {
    config: VectorConfig,
    points: BTreeMap<u64, StoredPoint>,
}

#[derive(Default)]
struct State {
    collections: BTreeMap<String, Collection>,
    faults: Faults,
    calls: Vec<RepositoryCall>,
}

/// Brute-force vector store for tests
///
/// Scores are cosine similarity regardless of the configured distance.
/// Collections are listed in name order.
///
/// # Example
///
/// ```
/// use test_utils::InMemoryVectorRepository;
///
/// let repo = InMemoryVectorRepository::new().failing_creates(2);
/// assert!(repo.calls().is_empty());
/// ```
#[derive(Default)]
pub struct InMemoryVectorRepository {
    state: Mutex<State>,
}

impl InMemoryVectorRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// The next `count` `list_collections` calls fail
    pub fn failing_lists(self, count: u32) -> Self {
        self.lock().faults.list_failures = count;
        self
    }

    /// The next `count` `create_collection` calls fail
    pub fn failing_creates(self, count: u32) -> Self {
        self.lock().faults.create_failures = count;
        self
    }

    /// Deletes report success but leave the collection in place
    pub fn ignoring_deletes(self) -> Self {
        self.lock().faults.ignore_deletes = true;
        self
    }

    /// Created collections never show up in `list_collections`
    pub fn hiding_created(self) -> Self {
        self.lock().faults.hide_created = true;
        self
    }

    pub fn failing_upserts(self) -> Self {
        self.lock().faults.fail_upsert = true;
        self
    }

    pub fn failing_searches(self) -> Self {
        self.lock().faults.fail_search = true;
        self
    }

    /// Seed a collection directly, bypassing call recording
    pub fn with_collection(self, name: &str, config: VectorConfig) -> Self {
        self.lock().collections.insert(
            name.to_string(),
            Collection {
                config,
                points: BTreeMap::new(),
            },
        );
        self
    }

    /// Every call made so far, in order
    pub fn calls(&self) -> Vec<RepositoryCall> {
        self.lock().calls.clone()
    }

    pub fn count_calls(&self, matches: impl Fn(&RepositoryCall) -> bool) -> usize {
        self.lock().calls.iter().filter(|call| matches(call)).count()
    }

    pub fn upsert_count(&self) -> usize {
        self.count_calls(|call| matches!(call, RepositoryCall::Upsert { .. }))
    }

    pub fn has_collection(&self, name: &str) -> bool {
        self.lock().collections.contains_key(name)
    }

    pub fn collection_config(&self, name: &str) -> Option<VectorConfig> {
        self.lock().collections.get(name).map(|c| c.config.clone())
    }

    /// Stored points of a collection, ordered by point id
    pub fn points(&self, name: &str) -> Vec<StoredPoint> {
        self.lock()
            .collections
            .get(name)
            .map(|c| c.points.values().cloned().collect())
            .unwrap_or_default()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Cosine similarity; zero when either vector has no magnitude
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    (dot / (norm_a * norm_b)).clamp(-1.0, 1.0)
}

#[async_trait]
impl VectorRepository for InMemoryVectorRepository {
    async fn list_collections(&self) -> VectorResult<Vec<String>> {
        let mut state = self.lock();
        state.calls.push(RepositoryCall::ListCollections);
        if state.faults.list_failures > 0 {
            state.faults.list_failures -= 1;
            return Err(VectorError::Qdrant("list collections unavailable".to_string()));
        }
        Ok(state.collections.keys().cloned().collect())
    }

    async fn delete_collection(&self, collection_name: &str) -> VectorResult<bool> {
        let mut state = self.lock();
        state
            .calls
            .push(RepositoryCall::DeleteCollection(collection_name.to_string()));
        if state.faults.ignore_deletes {
            return Ok(true);
        }
        Ok(state.collections.remove(collection_name).is_some())
    }

    async fn create_collection(
        &self,
        collection_name: &str,
        config: VectorConfig,
    ) -> VectorResult<()> {
        let mut state = self.lock();
        state.calls.push(RepositoryCall::CreateCollection(
            collection_name.to_string(),
            config.clone(),
        ));
        if state.faults.create_failures > 0 {
            state.faults.create_failures -= 1;
            return Err(VectorError::Qdrant("connection refused".to_string()));
        }
        if state.collections.contains_key(collection_name) {
            return Err(VectorError::Qdrant(format!(
                "Collection `{}` already exists!",
                collection_name
            )));
        }
        if !state.faults.hide_created {
            state.collections.insert(
                collection_name.to_string(),
                Collection {
                    config,
                    points: BTreeMap::new(),
                },
            );
        }
        Ok(())
    }

    async fn upsert(
        &self,
        collection_name: &str,
        points: Vec<StoredPoint>,
        wait: bool,
    ) -> VectorResult<usize> {
        let mut state = self.lock();
        state.calls.push(RepositoryCall::Upsert {
            collection: collection_name.to_string(),
            points: points.len(),
            wait,
        });
        if state.faults.fail_upsert {
            return Err(VectorError::StoreWrite("upsert rejected".to_string()));
        }

        let collection = state.collections.get_mut(collection_name).ok_or_else(|| {
            VectorError::StoreWrite(format!("Collection `{}` doesn't exist", collection_name))
        })?;

        for point in &points {
            if point.vector_name != collection.config.vector_name {
                return Err(VectorError::StoreWrite(format!(
                    "Unknown vector name `{}`",
                    point.vector_name
                )));
            }
            if point.vector.len() as u64 != collection.config.dimension {
                return Err(VectorError::StoreWrite(format!(
                    "Wrong input: Vector dimension error: expected dim: {}, got {}",
                    collection.config.dimension,
                    point.vector.len()
                )));
            }
        }

        let written = points.len();
        for point in points {
            collection.points.insert(point.id, point);
        }
        Ok(written)
    }

    async fn search(
        &self,
        collection_name: &str,
        query: SearchQuery,
    ) -> VectorResult<Vec<ScoredHit>> {
        let mut state = self.lock();
        state.calls.push(RepositoryCall::Search {
            collection: collection_name.to_string(),
            limit: query.limit,
        });
        if state.faults.fail_search {
            return Err(VectorError::StoreQuery("search unavailable".to_string()));
        }

        let collection = state.collections.get(collection_name).ok_or_else(|| {
            VectorError::StoreQuery(format!("Collection `{}` doesn't exist", collection_name))
        })?;
        if query.vector.len() as u64 != collection.config.dimension {
            return Err(VectorError::StoreQuery(format!(
                "Wrong input: Vector dimension error: expected dim: {}, got {}",
                collection.config.dimension,
                query.vector.len()
            )));
        }

        let mut hits: Vec<ScoredHit> = collection
            .points
            .values()
            .filter(|point| point.vector_name == query.vector_name)
            .map(|point| ScoredHit {
                point_id: Some(point.id),
                score: cosine_similarity(&query.vector, &point.vector),
                payload: if query.with_payload {
                    point.payload.to_json()
                } else {
                    serde_json::Map::new()
                },
            })
            .collect();

        hits.sort_by(|a, b| b.score.total_cmp(&a.score));
        hits.truncate(query.limit as usize);
        Ok(hits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain_vector::{PointPayload, Record};

    fn point(id: u64, vector: Vec<f32>, record_id: i64) -> StoredPoint {
        StoredPoint::new(id, vector, PointPayload::from(&Record::new(record_id, "lyric")))
    }

    #[test]
    fn test_cosine_similarity() {
        assert!((cosine_similarity(&[1.0, 0.0], &[1.0, 0.0]) - 1.0).abs() < 1e-6);
        assert!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).abs() < 1e-6);
        assert!((cosine_similarity(&[1.0, 0.0], &[-1.0, 0.0]) + 1.0).abs() < 1e-6);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
    }

    #[tokio::test]
    async fn test_search_orders_by_score_and_truncates() {
        let repo = InMemoryVectorRepository::new().with_collection("c", VectorConfig::text(2));
        repo.upsert(
            "c",
            vec![
                point(0, vec![0.0, 1.0], 10),
                point(1, vec![1.0, 0.0], 11),
                point(2, vec![1.0, 1.0], 12),
            ],
            true,
        )
        .await
        .unwrap();

        let hits = repo
            .search("c", SearchQuery::text(vec![1.0, 0.0], 2))
            .await
            .unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].point_id, Some(1));
        assert_eq!(hits[1].point_id, Some(2));
        assert!(hits[0].score >= hits[1].score);
    }

    #[tokio::test]
    async fn test_upsert_replaces_existing_id() {
        let repo = InMemoryVectorRepository::new().with_collection("c", VectorConfig::text(1));
        repo.upsert("c", vec![point(0, vec![1.0], 1)], true).await.unwrap();
        repo.upsert("c", vec![point(0, vec![1.0], 2)], true).await.unwrap();

        let points = repo.points("c");
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].payload.id, 2);
        assert_eq!(repo.upsert_count(), 2);
    }

    #[tokio::test]
    async fn test_upsert_dimension_mismatch() {
        let repo = InMemoryVectorRepository::new().with_collection("c", VectorConfig::text(3));
        let err = repo
            .upsert("c", vec![point(0, vec![1.0], 1)], true)
            .await
            .unwrap_err();
        assert!(matches!(err, VectorError::StoreWrite(_)));
    }

    #[tokio::test]
    async fn test_injected_create_failures_run_out() {
        let repo = InMemoryVectorRepository::new().failing_creates(1);
        assert!(repo.create_collection("c", VectorConfig::text(2)).await.is_err());
        assert!(repo.create_collection("c", VectorConfig::text(2)).await.is_ok());
        assert!(repo.has_collection("c"));
    }

    #[tokio::test]
    async fn test_ignored_delete_keeps_collection() {
        let repo = InMemoryVectorRepository::new()
            .with_collection("c", VectorConfig::text(2))
            .ignoring_deletes();
        assert!(repo.delete_collection("c").await.unwrap());
        assert!(repo.has_collection("c"));
    }

    #[tokio::test]
    async fn test_search_missing_collection() {
        let repo = InMemoryVectorRepository::new();
        let err = repo
            .search("missing", SearchQuery::text(vec![1.0], 1))
            .await
            .unwrap_err();
        assert!(matches!(err, VectorError::StoreQuery(_)));
    }
}
