//! Demo settings loaded from the environment

use std::path::PathBuf;

use core_config::{env_optional, env_or_default, env_parse_or_default, ConfigError, FromEnv};

pub const DEFAULT_COLLECTION: &str = "lyrics";
pub const DEFAULT_QUERY: &str = "我說再見";
pub const DEFAULT_LIMIT: u64 = 2;
pub const DEFAULT_MAX_RETRIES: u32 = 3;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DemoSettings {
    pub collection_name: String,
    pub query: String,
    pub limit: u64,
    pub max_retries: u32,
    /// Local Qdrant storage root; enables collection cleanup after provisioning gives up
    pub local_storage: Option<PathBuf>,
}

impl Default for DemoSettings {
    fn default() -> Self {
        Self {
            collection_name: DEFAULT_COLLECTION.to_string(),
            query: DEFAULT_QUERY.to_string(),
            limit: DEFAULT_LIMIT,
            max_retries: DEFAULT_MAX_RETRIES,
            local_storage: None,
        }
    }
}

impl DemoSettings {
    pub fn with_collection_name(mut self, name: impl Into<String>) -> Self {
        self.collection_name = name.into();
        self
    }

    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = query.into();
        self
    }

    pub fn with_limit(mut self, limit: u64) -> Self {
        self.limit = limit;
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_local_storage(mut self, root: impl Into<PathBuf>) -> Self {
        self.local_storage = Some(root.into());
        self
    }
}

impl FromEnv for DemoSettings {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            collection_name: env_or_default("QDRANT_COLLECTION", DEFAULT_COLLECTION),
            query: env_or_default("LYRICS_QUERY", DEFAULT_QUERY),
            limit: env_parse_or_default("LYRICS_SEARCH_LIMIT", DEFAULT_LIMIT)?,
            max_retries: env_parse_or_default("QDRANT_MAX_RETRIES", DEFAULT_MAX_RETRIES)?,
            local_storage: env_optional("QDRANT_LOCAL_STORAGE").map(PathBuf::from),
        })
    }
}
