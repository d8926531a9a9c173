//! Collection provisioning with bounded retry
//!
//! [`Provisioner::provision`] drops and recreates a collection so that, on
//! success, it exists with the requested `"text"` vector configuration and
//! holds no points. Each attempt:
//!
//! 1. lists collections and deletes the target if present, then waits for
//!    the deletion to settle (failures here are logged, not fatal)
//! 2. creates the collection
//! 3. re-lists collections and checks the new one is visible
//!
//! A failed attempt `k` (0-indexed) is followed by a `2^k * backoff_unit`
//! pause when attempts remain. When every attempt has failed, the current
//! collections are logged, the optional [`ExhaustionHook`] runs, and
//! [`VectorError::Provisioning`] is returned with the last error.

use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error, info, instrument, warn};

use crate::error::{VectorError, VectorResult};
use crate::models::VectorConfig;
use crate::repository::VectorRepository;

/// Retry and pacing settings for [`Provisioner`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisionerConfig {
    pub max_retries: u32,
    /// Base of the exponential backoff between attempts
    pub backoff_unit: Duration,
    /// Pause after deleting an existing collection
    pub settle_delay: Duration,
}

impl Default for ProvisionerConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            backoff_unit: Duration::from_secs(1),
            settle_delay: Duration::from_secs(2),
        }
    }
}

impl ProvisionerConfig {
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_backoff_unit(mut self, unit: Duration) -> Self {
        self.backoff_unit = unit;
        self
    }

    pub fn with_settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = delay;
        self
    }

    /// Pause after failed attempt `attempt` (0-indexed): `2^attempt` units.
    pub fn backoff_after(&self, attempt: u32) -> Duration {
        let factor = 2u32.checked_pow(attempt).unwrap_or(u32::MAX);
        self.backoff_unit.saturating_mul(factor)
    }
}

/// Callback run once when provisioning has exhausted its attempts
///
/// Hooks are advisory: they cannot change the reported outcome and must
/// swallow their own failures.
pub trait ExhaustionHook: Send + Sync {
    fn on_exhausted(&self, collection_name: &str, error: &VectorError);
}

/// Removes a co-located Qdrant storage directory for the collection
///
/// Only meaningful when the store writes to a directory this process can
/// reach, e.g. a local container with `./qdrant_storage` mounted.
#[derive(Debug, Clone)]
pub struct LocalStorageCleanup {
    storage_root: PathBuf,
}

impl LocalStorageCleanup {
    pub fn new(storage_root: impl Into<PathBuf>) -> Self {
        Self {
            storage_root: storage_root.into(),
        }
    }

    /// `<root>/collections/<name>`, or `None` when the name is not a single
    /// plain path component (empty, absolute, `..`, or containing separators).
    pub fn collection_dir(&self, collection_name: &str) -> Option<PathBuf> {
        if collection_name.contains(['/', '\\']) {
            return None;
        }
        let mut components = Path::new(collection_name).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(name)), None) => {
                Some(self.storage_root.join("collections").join(name))
            }
            _ => None,
        }
    }
}

impl ExhaustionHook for LocalStorageCleanup {
    fn on_exhausted(&self, collection_name: &str, _error: &VectorError) {
        let Some(dir) = self.collection_dir(collection_name) else {
            warn!(
                collection = collection_name,
                "Collection name is not a plain directory name, skipping cleanup"
            );
            return;
        };
        if !dir.exists() {
            debug!(path = %dir.display(), "No local collection data to clean up");
            return;
        }

        warn!(path = %dir.display(), "Removing collection data directory");
        match std::fs::remove_dir_all(&dir) {
            Ok(()) => warn!("Data directory removed. Restart the store before retrying."),
            Err(e) => error!(path = %dir.display(), error = %e, "Failed to force cleanup"),
        }
    }
}

/// Ensures a collection exists, empty, with the expected vector configuration
pub struct Provisioner<R: VectorRepository> {
    repository: Arc<R>,
    config: ProvisionerConfig,
    on_exhausted: Option<Arc<dyn ExhaustionHook>>,
}

impl<R: VectorRepository> Provisioner<R> {
    pub fn new(repository: Arc<R>, config: ProvisionerConfig) -> Self {
        Self {
            repository,
            config,
            on_exhausted: None,
        }
    }

    pub fn with_exhaustion_hook(mut self, hook: Arc<dyn ExhaustionHook>) -> Self {
        self.on_exhausted = Some(hook);
        self
    }

    pub fn config(&self) -> &ProvisionerConfig {
        &self.config
    }

    /// Drop and recreate `collection_name` for `vector_dim`-sized cosine vectors.
    #[instrument(skip(self), fields(max_retries = self.config.max_retries))]
    pub async fn provision(&self, collection_name: &str, vector_dim: u64) -> VectorResult<()> {
        let max_retries = self.config.max_retries;
        if max_retries == 0 {
            return Err(VectorError::Validation(
                "max_retries must be at least 1".to_string(),
            ));
        }
        if vector_dim == 0 {
            return Err(VectorError::Validation(
                "vector dimension must be greater than zero".to_string(),
            ));
        }

        let mut attempt = 0;
        loop {
            let err = match self.attempt(collection_name, vector_dim, attempt).await {
                Ok(()) => {
                    info!(
                        attempt = attempt + 1,
                        "Successfully created collection '{}'", collection_name
                    );
                    return Ok(());
                }
                Err(err) => err,
            };

            if attempt + 1 >= max_retries {
                error!(error = %err, "Failed to set up collection after {} attempts", max_retries);
                self.dump_collections().await;
                if let Some(hook) = &self.on_exhausted {
                    hook.on_exhausted(collection_name, &err);
                }
                return Err(VectorError::Provisioning {
                    collection: collection_name.to_string(),
                    attempts: max_retries,
                    source: Box::new(err),
                });
            }

            let backoff = self.config.backoff_after(attempt);
            warn!(
                attempt = attempt + 1,
                error = %err,
                backoff_ms = backoff.as_millis() as u64,
                "Provisioning attempt failed, retrying"
            );
            tokio::time::sleep(backoff).await;
            attempt += 1;
        }
    }

    async fn attempt(
        &self,
        collection_name: &str,
        vector_dim: u64,
        attempt: u32,
    ) -> VectorResult<()> {
        self.drop_existing(collection_name, attempt).await;

        info!("Creating collection '{}' with vector size {}", collection_name, vector_dim);
        self.repository
            .create_collection(collection_name, VectorConfig::text(vector_dim))
            .await?;

        let names = self.repository.list_collections().await?;
        if names.iter().any(|name| name == collection_name) {
            Ok(())
        } else {
            Err(VectorError::Qdrant(format!(
                "Failed to verify collection '{}' creation",
                collection_name
            )))
        }
    }

    async fn drop_existing(&self, collection_name: &str, attempt: u32) {
        let names = match self.repository.list_collections().await {
            Ok(names) => names,
            Err(e) => {
                warn!(error = %e, "Failed to check/delete collection");
                return;
            }
        };

        if !names.iter().any(|name| name == collection_name) {
            debug!("Collection '{}' not found, nothing to delete", collection_name);
            return;
        }

        info!(
            "Deleting existing collection '{}' (attempt {}/{})",
            collection_name,
            attempt + 1,
            self.config.max_retries
        );
        if let Err(e) = self.repository.delete_collection(collection_name).await {
            warn!(error = %e, "Failed to check/delete collection");
            return;
        }
        tokio::time::sleep(self.config.settle_delay).await;
    }

    async fn dump_collections(&self) {
        match self.repository.list_collections().await {
            Ok(names) => info!(collections = ?names, "Current collections"),
            Err(e) => warn!(error = %e, "Could not list collections"),
        }
    }
}
