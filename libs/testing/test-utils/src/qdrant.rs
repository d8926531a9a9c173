//! Qdrant test infrastructure
//!
//! Provides a `TestQdrant` helper that starts a Qdrant container for testing.

use std::sync::Arc;

use domain_vector::{QdrantConfig, QdrantRepository};
use testcontainers::core::{IntoContainerPort, WaitFor};
use testcontainers::runners::AsyncRunner;
use testcontainers::{ContainerAsync, GenericImage};

const QDRANT_IMAGE: &str = "qdrant/qdrant";
const QDRANT_TAG: &str = "v1.13.4";

/// gRPC port inside the container
const QDRANT_GRPC_PORT: u16 = 6334;

/// Test Qdrant wrapper that ensures proper cleanup
///
/// The container is automatically stopped and removed when this struct is dropped.
///
/// # Example
///
/// ```no_run
/// use test_utils::TestQdrant;
///
/// # async fn example() {
/// let qdrant = TestQdrant::new().await;
/// let repository = qdrant.repository();
/// // Hand the repository to a Provisioner, Ingestor or QueryService
/// # }
/// ```
pub struct TestQdrant {
    #[allow(dead_code)]
    container: ContainerAsync<GenericImage>,
    repository: Arc<QdrantRepository>,
    pub url: String,
}

impl TestQdrant {
    /// Create a new test Qdrant instance
    ///
    /// Uses the pinned `qdrant/qdrant` image and waits for the gRPC listener.
    pub async fn new() -> Self {
        let container = GenericImage::new(QDRANT_IMAGE, QDRANT_TAG)
            .with_exposed_port(QDRANT_GRPC_PORT.tcp())
            .with_wait_for(WaitFor::message_on_stdout("gRPC listening"))
            .start()
            .await
            .expect("Failed to start Qdrant container");

        let host_port = container
            .get_host_port_ipv4(QDRANT_GRPC_PORT)
            .await
            .expect("Failed to get Qdrant port");

        let url = format!("http://127.0.0.1:{}", host_port);
        let repository = QdrantRepository::new(QdrantConfig::new(url.clone()))
            .expect("Failed to create Qdrant client");

        tracing::info!(port = host_port, tag = QDRANT_TAG, "Test Qdrant ready");

        Self {
            container,
            repository: Arc::new(repository),
            url,
        }
    }

    /// Shared repository handle (cheap to clone)
    pub fn repository(&self) -> Arc<QdrantRepository> {
        Arc::clone(&self.repository)
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl Drop for TestQdrant {
    fn drop(&mut self) {
        tracing::debug!("Cleaning up test Qdrant container");
    }
}
