//! Shared test utilities for the vector domain and the lyrics demo
//!
//! This crate provides reusable test infrastructure:
//! - `InMemoryVectorRepository`: Cosine brute-force store with failure injection (always available)
//! - `StubEmbeddingProvider`: Deterministic, offline embeddings (always available)
//! - `TestQdrant`: Qdrant container with automatic cleanup (feature: "qdrant")
//! - `TestDataBuilder`: Deterministic test data generation (always available)
//! - `assertions`: Custom assertion helpers (always available)
//!
//! # Features
//!
//! - `qdrant` (default): Enables the Qdrant container helper
//!
//! # Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use test_utils::{InMemoryVectorRepository, StubEmbeddingProvider, TestDataBuilder};
//!
//! #[tokio::test]
//! async fn my_search_test() {
//!     let repo = Arc::new(InMemoryVectorRepository::new());
//!     let embedder = StubEmbeddingProvider::new(8);
//!     let builder = TestDataBuilder::from_test_name("my_search_test");
//!
//!     let collection = builder.collection_name("lyrics");
//!     let records = builder.records(3);
//! }
//! ```
//!
//! ## Qdrant Testing
//!
//! ```rust,ignore
//! use test_utils::TestQdrant;
//!
//! #[tokio::test]
//! #[ignore = "requires docker"]
//! async fn my_qdrant_test() {
//!     let qdrant = TestQdrant::new().await;
//!     let repository = qdrant.repository();
//! }
//! ```

mod embedding;
mod memory;

#[cfg(feature = "qdrant")]
mod qdrant;

pub use embedding::{StubEmbeddingProvider, DEFAULT_STUB_DIMENSION};
pub use memory::{cosine_similarity, InMemoryVectorRepository, RepositoryCall};

#[cfg(feature = "qdrant")]
pub use qdrant::TestQdrant;

use domain_vector::Record;

/// Builder for test data with deterministic randomization
///
/// This ensures tests are reproducible by using seeded data.
pub struct TestDataBuilder {
    seed: u64,
}

impl TestDataBuilder {
    /// Create a new builder with a seed (for deterministic tests)
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    /// Create from test name (generates seed from test name hash)
    ///
    /// # Example
    ///
    /// ```
    /// use test_utils::TestDataBuilder;
    ///
    /// let builder = TestDataBuilder::from_test_name("test_search_lyrics");
    /// ```
    pub fn from_test_name(name: &str) -> Self {
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};

        let mut hasher = DefaultHasher::new();
        name.hash(&mut hasher);
        Self::new(hasher.finish())
    }

    /// Generate a collection name unique to this seed
    ///
    /// # Example
    ///
    /// ```
    /// use test_utils::TestDataBuilder;
    ///
    /// let builder = TestDataBuilder::new(12345);
    /// assert_eq!(builder.collection_name("lyrics"), "test-lyrics-12345");
    /// ```
    pub fn collection_name(&self, prefix: &str) -> String {
        format!("test-{}-{}", prefix, self.seed)
    }

    /// `count` records with ids `1..=count` and distinct texts
    pub fn records(&self, count: usize) -> Vec<Record> {
        (1..=count as i64)
            .map(|id| Record::new(id, format!("lyric {} of {}", id, self.seed)))
            .collect()
    }

    /// The two sample lyrics the demo indexes
    pub fn sample_lyrics() -> Vec<Record> {
        vec![
            Record::new(1, "說了再見，才發現再也見不到"),
            Record::new(2, "天涼了，雨下了，妳走了"),
        ]
    }
}

/// Test assertion helpers
pub mod assertions {
    use domain_vector::QueryResult;

    /// Assert that scores never increase from one result to the next
    pub fn assert_scores_descending(results: &[QueryResult], context: &str) {
        for pair in results.windows(2) {
            assert!(
                pair[0].score >= pair[1].score,
                "{}: scores not descending ({} then {})",
                context,
                pair[0].score,
                pair[1].score
            );
        }
    }

    /// Assert that every score is a valid cosine similarity
    pub fn assert_cosine_scores(results: &[QueryResult], context: &str) {
        for result in results {
            assert!(
                (-1.0..=1.0).contains(&result.score),
                "{}: score {} outside [-1, 1]",
                context,
                result.score
            );
        }
    }

    /// Assert that an optional value is Some
    pub fn assert_some<T>(value: Option<T>, context: &str) -> T {
        value.unwrap_or_else(|| panic!("{}: expected Some, got None", context))
    }
}
