use core_config::ConfigError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum VectorError {
    /// The remote embedding call failed.
    #[error("Embedding provider error: {0}")]
    EmbeddingProvider(String),

    /// Collection setup failed after exhausting every attempt.
    #[error("Failed to provision collection '{collection}' after {attempts} attempts: {source}")]
    Provisioning {
        collection: String,
        attempts: u32,
        #[source]
        source: Box<VectorError>,
    },

    /// Upsert was rejected or could not be delivered.
    #[error("Store write error: {0}")]
    StoreWrite(String),

    /// Similarity search failed.
    #[error("Store query error: {0}")]
    StoreQuery(String),

    /// Collection lifecycle call (list, create, delete) failed.
    #[error("Qdrant error: {0}")]
    Qdrant(String),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type VectorResult<T> = Result<T, VectorError>;

impl VectorError {
    /// Short machine-friendly name of the variant, used as a log field.
    pub fn kind(&self) -> &'static str {
        match self {
            VectorError::EmbeddingProvider(_) => "embedding_provider",
            VectorError::Provisioning { .. } => "provisioning",
            VectorError::StoreWrite(_) => "store_write",
            VectorError::StoreQuery(_) => "store_query",
            VectorError::Qdrant(_) => "qdrant",
            VectorError::Validation(_) => "validation",
            VectorError::Config(_) => "config",
        }
    }
}

impl From<qdrant_client::QdrantError> for VectorError {
    fn from(err: qdrant_client::QdrantError) -> Self {
        VectorError::Qdrant(err.to_string())
    }
}

impl From<reqwest::Error> for VectorError {
    fn from(err: reqwest::Error) -> Self {
        VectorError::EmbeddingProvider(err.to_string())
    }
}

impl From<ConfigError> for VectorError {
    fn from(err: ConfigError) -> Self {
        VectorError::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_provisioning_error_carries_last_error() {
        let err = VectorError::Provisioning {
            collection: "lyrics".to_string(),
            attempts: 3,
            source: Box::new(VectorError::Qdrant("connection refused".to_string())),
        };

        assert_eq!(
            err.to_string(),
            "Failed to provision collection 'lyrics' after 3 attempts: Qdrant error: connection refused"
        );
        let source = err.source().map(|s| s.to_string());
        assert_eq!(source.as_deref(), Some("Qdrant error: connection refused"));
        assert_eq!(err.kind(), "provisioning");
    }

    #[test]
    fn test_config_error_conversion() {
        let err: VectorError =
            ConfigError::MissingEnvVar("AZURE_OPENAI_API_KEY".to_string()).into();
        assert!(
            matches!(err, VectorError::Config(ref msg) if msg.contains("AZURE_OPENAI_API_KEY"))
        );
    }
}
