//! Vector Domain Library
//!
//! Text embedding and similarity search over a Qdrant collection, with the
//! embedding generated by an Azure OpenAI deployment.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │                VectorService                 │  ← embed → provision → ingest → search
//! └──────┬───────────────┬──────────────┬────────┘
//!        │               │              │
//! ┌──────▼──────┐ ┌──────▼─────┐ ┌──────▼───────┐   ┌───────────────────┐
//! │ Provisioner │ │  Ingestor  │ │ QueryService │   │ EmbeddingProvider │
//! └──────┬──────┘ └──────┬─────┘ └──────┬───────┘   │      (trait)      │
//!        └───────────────┼──────────────┘           └─────────┬─────────┘
//!               ┌────────▼─────────┐                ┌─────────▼─────────┐
//!               │ VectorRepository │                │AzureOpenAIProvider│
//!               │     (trait)      │                └───────────────────┘
//!               └────────┬─────────┘
//!               ┌────────▼─────────┐
//!               │ QdrantRepository │
//!               └──────────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use domain_vector::{
//!     AzureOpenAIProvider, ProvisionerConfig, QdrantConfig, QdrantRepository, Record,
//!     VectorService,
//! };
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let repository = Arc::new(QdrantRepository::new(QdrantConfig::from_env()?)?);
//! let provider = AzureOpenAIProvider::from_env()?;
//! let model = provider.config().model.clone();
//!
//! let service =
//!     VectorService::new(repository, Arc::new(provider), model, ProvisionerConfig::default());
//! service.index_records("lyrics", &[Record::new(1, "天涼了，雨下了，妳走了")]).await?;
//! let results = service.search_text("lyrics", "我說再見", 2).await?;
//! # Ok(())
//! # }
//! ```

pub mod embedding;
pub mod error;
pub mod ingestion;
pub mod models;
pub mod provisioner;
pub mod qdrant;
pub mod query;
pub mod repository;
pub mod service;

// Re-export commonly used types
pub use embedding::{AzureOpenAIConfig, AzureOpenAIProvider, EmbeddingProvider};
pub use error::{VectorError, VectorResult};
pub use ingestion::{Ingestor, PointIdStrategy};
pub use models::{
    DistanceMetric, Embedding, PointPayload, QueryResult, Record, ScoredHit, SearchQuery,
    StoredPoint, VectorConfig, TEXT_VECTOR_NAME,
};
pub use provisioner::{ExhaustionHook, LocalStorageCleanup, Provisioner, ProvisionerConfig};
pub use qdrant::{QdrantConfig, QdrantRepository};
pub use query::QueryService;
pub use repository::VectorRepository;
pub use service::{IndexReport, VectorService};
