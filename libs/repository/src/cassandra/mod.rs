//! Cassandra/ScyllaDB session provider
//!
//! Uses the `scylla` driver, which is compatible with both Apache Cassandra
//! and ScyllaDB.
//!
//! # Example
//!
//! ```ignore
//! use repository::cassandra::{CassandraConfig, ScyllaSessionProvider};
//!
//! let config = CassandraConfig::new(["10.0.0.1:9042"])
//!     .with_datacenter("dc1")
//!     .with_credentials("user", "password");
//! let provider = Arc::new(ScyllaSessionProvider::connect(&config).await?);
//! let users = UserRepository::new(identity, provider, config.replication_factor).await?;
//! ```

mod config;
mod connector;
mod session;

pub use config::{CassandraConfig, Credentials};
pub use connector::{CassandraError, CassandraSession, connect, connect_from_config};
pub use session::{ScyllaSession, ScyllaSessionProvider};
