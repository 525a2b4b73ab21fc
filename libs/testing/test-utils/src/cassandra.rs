//! Cassandra test infrastructure
//!
//! Provides a `TestCassandra` helper that starts a single-node Cassandra container.

use repository::cassandra::{CassandraConfig, ScyllaSessionProvider};
use std::sync::Arc;
use std::time::Duration;
use testcontainers::core::{IntoContainerPort, WaitFor};
use testcontainers::runners::AsyncRunner;
use testcontainers::{ContainerAsync, GenericImage, ImageExt};

const CQL_PORT: u16 = 9042;

/// Test Cassandra wrapper that ensures proper cleanup
///
/// The container is stopped and removed when this struct is dropped.
///
/// ```no_run
/// use test_utils::TestCassandra;
///
/// # async fn example() {
/// let cassandra = TestCassandra::new().await;
/// let provider = cassandra.provider().await;
/// # }
/// ```
pub struct TestCassandra {
    #[allow(dead_code)]
    container: ContainerAsync<GenericImage>,
    pub config: CassandraConfig,
}

impl TestCassandra {
    /// Start Cassandra 5 with a small heap
    pub async fn new() -> Self {
        let container = GenericImage::new("cassandra", "5.0")
            .with_exposed_port(CQL_PORT.tcp())
            .with_wait_for(WaitFor::message_on_stdout(
                "Starting listening for CQL clients",
            ))
            .with_env_var("MAX_HEAP_SIZE", "512M")
            .with_env_var("HEAP_NEWSIZE", "128M")
            .start()
            .await
            .expect("Failed to start Cassandra container");

        let host_port = container
            .get_host_port_ipv4(CQL_PORT)
            .await
            .expect("Failed to get Cassandra port");

        let config = CassandraConfig::new([format!("127.0.0.1:{host_port}")])
            .with_connect_timeout(Duration::from_secs(60));

        tracing::info!(port = host_port, "Test Cassandra ready (cassandra 5.0)");

        Self { container, config }
    }

    /// Session provider connected to the container
    pub async fn provider(&self) -> Arc<ScyllaSessionProvider> {
        let provider = ScyllaSessionProvider::connect(&self.config)
            .await
            .expect("Failed to connect to Cassandra");
        Arc::new(provider)
    }
}
