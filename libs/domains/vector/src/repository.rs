use async_trait::async_trait;

use crate::error::VectorResult;
use crate::models::{ScoredHit, SearchQuery, StoredPoint, VectorConfig};

/// Repository trait for the vector store operations the pipeline consumes
///
/// Collection names are used verbatim. Implementations map write failures to
/// `VectorError::StoreWrite` and search failures to `VectorError::StoreQuery`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VectorRepository: Send + Sync {
    // ===== Collection Management =====

    /// Names of every collection in the store
    async fn list_collections(&self) -> VectorResult<Vec<String>>;

    /// Delete a collection
    async fn delete_collection(&self, collection_name: &str) -> VectorResult<bool>;

    /// Create a collection with a single named vector field
    async fn create_collection(
        &self,
        collection_name: &str,
        config: VectorConfig,
    ) -> VectorResult<()>;

    // ===== Point Operations =====

    /// Upsert all points in one call; `wait` blocks until the write is durable
    async fn upsert(
        &self,
        collection_name: &str,
        points: Vec<StoredPoint>,
        wait: bool,
    ) -> VectorResult<usize>;

    /// Search for the nearest points, best match first
    async fn search(
        &self,
        collection_name: &str,
        query: SearchQuery,
    ) -> VectorResult<Vec<ScoredHit>>;
}
