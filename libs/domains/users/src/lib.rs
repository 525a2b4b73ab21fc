//! Users Domain
//!
//! A users table served by the generic `BaseRepository`:
//!
//! ```text
//! ┌────────────────┐
//! │ UserRepository │  ← insert/update/delete (conditional), find by id, find all
//! └───────┬────────┘
//!         │
//! ┌───────▼────────┐
//! │ BaseRepository │  ← scoped statements, session handling, error translation
//! └───────┬────────┘
//!         │
//! ┌───────▼────────┐
//! │SessionProvider │  ← Scylla driver, or stubs in tests
//! └────────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use domain_users::{User, UserRepository};
//! use repository::cassandra::{CassandraConfig, ScyllaSessionProvider};
//! use repository::identity_of;
//!
//! let config = CassandraConfig::new(vec!["127.0.0.1:9042"]);
//! let provider = Arc::new(ScyllaSessionProvider::connect(&config).await?);
//! let users = UserRepository::new(identity_of("games", "users")?, provider, 1).await?;
//!
//! users.insert_user(&User::new("u1", "secret")).await?;
//! let user = users.find_user_by_id("u1").await?;
//! ```

pub mod error;
pub mod models;
pub mod repository;

// Re-export commonly used types
pub use error::{UserError, UserResult};
pub use models::User;
pub use self::repository::UserRepository;
