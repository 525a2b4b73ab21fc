use scylla::client::execution_profile::ExecutionProfile;
use scylla::client::session::Session;
use scylla::client::session_builder::SessionBuilder;
use scylla::errors::NewSessionError;
use scylla::policies::load_balancing::DefaultPolicy;
use std::sync::Arc;
use tracing::{info, warn};

use super::CassandraConfig;

/// Probe run once per new driver session
const HANDSHAKE_QUERY: &str = "SELECT release_version FROM system.local";

/// Failure to open a driver session
#[derive(Debug, thiserror::Error)]
pub enum CassandraError {
    #[error("Cassandra error: {0}")]
    Scylla(#[from] NewSessionError),

    #[error("Connection failed: {0}")]
    ConnectionFailed(String),
}

/// Driver session shared by every lease; the driver pools connections per node
pub type CassandraSession = Arc<Session>;

/// Connect to `contact_points` with every other setting at its default
pub async fn connect<I, S>(contact_points: I) -> Result<CassandraSession, CassandraError>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    connect_from_config(&CassandraConfig::new(contact_points)).await
}

/// Open a driver session and check that the cluster answers queries
///
/// ```ignore
/// use core_config::FromEnv;
///
/// let session = connect_from_config(&CassandraConfig::from_env()?).await?;
/// ```
pub async fn connect_from_config(
    config: &CassandraConfig,
) -> Result<CassandraSession, CassandraError> {
    info!(
        nodes = ?config.contact_points,
        datacenter = config.datacenter.as_deref(),
        "Connecting to Cassandra"
    );

    let session = session_builder(config).build().await?;

    let version = session
        .query_unpaged(HANDSHAKE_QUERY, &[])
        .await
        .map_err(|e| {
            warn!(error = %e, "Cassandra handshake query failed");
            CassandraError::ConnectionFailed(e.to_string())
        })?
        .into_rows_result()
        .ok()
        .and_then(|rows| rows.maybe_first_row::<(String,)>().ok().flatten())
        .map(|(version,)| version);

    info!(release_version = version.as_deref(), "Connected to Cassandra");
    Ok(Arc::new(session))
}

fn session_builder(config: &CassandraConfig) -> SessionBuilder {
    let mut profile = ExecutionProfile::builder().request_timeout(Some(config.request_timeout));
    if let Some(datacenter) = &config.datacenter {
        profile = profile.load_balancing_policy(
            DefaultPolicy::builder()
                .prefer_datacenter(datacenter.clone())
                .token_aware(true)
                .build(),
        );
    }

    let mut builder = SessionBuilder::new()
        .known_nodes(&config.contact_points)
        .connection_timeout(config.connect_timeout)
        .default_execution_profile_handle(profile.build().into_handle());

    if let Some(credentials) = &config.credentials {
        builder = builder.user(&credentials.username, credentials.password());
    }

    builder
}
