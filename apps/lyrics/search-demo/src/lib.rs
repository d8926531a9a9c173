//! Lyrics Search Demo
//!
//! Embeds two sample lyrics with Azure OpenAI, stores them in a fresh Qdrant
//! collection and prints the lyrics closest to a query.
//!
//! ## Flow
//!
//! ```text
//! sample lyrics
//!   ↓ (AzureOpenAIProvider, one request per lyric)
//! embeddings (dimension D from the first one)
//!   ↓ (Provisioner: drop + create "text" vector field, cosine, size D)
//! empty collection
//!   ↓ (Ingestor: one waiting upsert, point id = position)
//! indexed collection
//!   ↓ (QueryService: embed query, top-k search)
//! ranked results on stdout
//! ```
//!
//! ## Modules
//!
//! - `app`: Initialization and top-level error reporting
//! - `demo`: Demo flow and console rendering
//! - `settings`: Demo settings (`QDRANT_COLLECTION`, `LYRICS_QUERY`, ...)

pub mod app;
pub mod demo;
pub mod settings;

// Re-export for convenience
pub use app::run;
pub use settings::DemoSettings;
