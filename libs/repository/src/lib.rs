//! Typed repositories over a Cassandra-style keyspace/table store
//!
//! A concrete repository supplies its keyspace and table, a [`SessionProvider`], an
//! optional [`KeyspaceValidator`] and a [`RowTransformer`]. [`BaseRepository`] adds
//! statement builders scoped to that table and helpers that run work on a fresh
//! session with uniform error translation.
//!
//! # Features
//!
//! - `cassandra` - session provider backed by the `scylla` driver
//! - `config` - load the driver configuration from environment variables
//!
//! # Example
//!
//! ```ignore
//! use repository::{BaseRepository, RepositoryIdentity, RepositoryResult};
//! use repository::cql::{BuildableQuery, OngoingWhereClause, bind_marker};
//!
//! let identity = RepositoryIdentity::identity_of("games", "users")?;
//! let base = BaseRepository::new(identity, provider, transformer);
//!
//! let select = base
//!     .select_statement()
//!     .all()
//!     .where_column("id")
//!     .is_equal_to(bind_marker())
//!     .build();
//!
//! let user = base
//!     .apply_with_session(async |session| -> RepositoryResult<Option<User>> {
//!         let result = session.execute_with_values(&select, &["u1".into()]).await?;
//!         result.one().map(|row| base.transform_row(&row)).transpose()
//!     })
//!     .await?;
//! ```

mod base;
pub mod cql;
mod error;
mod identity;
pub mod row;
mod session;
mod transform;

#[cfg(feature = "cassandra")]
pub mod cassandra;

pub use base::{BaseRepository, SharedTransformer};
pub use error::{BoxError, DriverError, RepositoryError, RepositoryResult};
pub use identity::{RepositoryIdentity, identity_of};
pub use row::{ColumnError, FromValue, Row, Value};
pub use session::{CqlSession, ResultSet, SessionProvider, SessionRow};
pub use transform::{KeyspaceValidator, RowTransformer};
