//! The generic repository every concrete repository is built on
//!
//! [`BaseRepository`] owns the identity of the table it serves, a shared
//! [`SessionProvider`] and a shared [`RowTransformer`]. It offers statement builders
//! scoped to its keyspace and table, and helpers that run work against a freshly
//! acquired session and release it on every exit path.

use std::fmt;
use std::ops::AsyncFnOnce;
use std::sync::Arc;
use tracing::{debug, trace, warn};

use crate::cql::{
    AlterKeyspace, AlterTable, BuildableQuery, CreateKeyspace, CreateTable, Delete, DropSchema,
    Identifier, Insert, Select, Truncate, Update,
};
use crate::error::{RepositoryError, RepositoryResult};
use crate::identity::RepositoryIdentity;
use crate::session::{CqlSession, SessionProvider, SessionRow};
use crate::transform::{KeyspaceValidator, RowTransformer};

/// Row transformer shared between repositories
pub type SharedTransformer<R, V> = Arc<dyn RowTransformer<R, V>>;

/// A session held for the duration of one operation
///
/// Dropping the scope releases the session, whether the operation finished,
/// failed, panicked or was cancelled.
struct SessionScope<'a, S> {
    session: S,
    identity: &'a RepositoryIdentity,
}

impl<S> Drop for SessionScope<'_, S> {
    fn drop(&mut self) {
        trace!(identity = %self.identity, "Releasing session");
    }
}

pub struct BaseRepository<P: SessionProvider, V> {
    identity: RepositoryIdentity,
    provider: Arc<P>,
    transformer: SharedTransformer<SessionRow<P>, V>,
}

impl<P: SessionProvider, V> BaseRepository<P, V> {
    /// Create a repository; performs no I/O
    pub fn new(
        identity: RepositoryIdentity,
        provider: Arc<P>,
        transformer: SharedTransformer<SessionRow<P>, V>,
    ) -> Self {
        debug!(identity = %identity, "Creating repository");
        Self {
            identity,
            provider,
            transformer,
        }
    }

    /// Create a repository after running the validator's statement for its keyspace
    ///
    /// The statement runs exactly once. If it fails, construction fails with the
    /// wrapped error and no repository is returned.
    pub async fn with_keyspace_validation(
        identity: RepositoryIdentity,
        provider: Arc<P>,
        transformer: SharedTransformer<SessionRow<P>, V>,
        validator: &impl KeyspaceValidator,
    ) -> RepositoryResult<Self> {
        let repository = Self::new(identity, provider, transformer);
        let statement = validator.validate_keyspace(repository.keyspace());
        debug!(keyspace = %repository.keyspace(), cql = %statement, "Validating keyspace");
        repository.execute_statement(&statement).await?;
        Ok(repository)
    }

    pub fn identity(&self) -> &RepositoryIdentity {
        &self.identity
    }

    pub fn keyspace(&self) -> &Identifier {
        self.identity.keyspace()
    }

    pub fn table(&self) -> &Identifier {
        self.identity.table()
    }

    async fn open_session(&self) -> RepositoryResult<SessionScope<'_, P::Session>> {
        match self.provider.provide_session().await {
            Ok(session) => {
                trace!(identity = %self.identity, "Acquired session");
                Ok(SessionScope {
                    session,
                    identity: &self.identity,
                })
            }
            Err(err) => {
                warn!(identity = %self.identity, error = %err, "Failed to acquire session");
                Err(RepositoryError::session_operation(
                    format!("Failed to acquire session for {}", self.identity),
                    err,
                ))
            }
        }
    }

    /// Execute a statement on a fresh session and discard its result
    pub async fn execute_statement(&self, query: &impl BuildableQuery) -> RepositoryResult<()> {
        let statement = query.build();
        self.execute_with_session(async |session| -> RepositoryResult<()> {
            session.execute(&statement).await.map_err(|err| {
                RepositoryError::session_operation(
                    format!("Failed to execute statement {statement}"),
                    err,
                )
            })?;
            Ok(())
        })
        .await
    }

    /// Run `operation` against a fresh session, releasing it afterwards
    ///
    /// A failure to acquire the session is reported as
    /// [`RepositoryError::SessionOperation`]. Errors returned by `operation`
    /// are passed through unchanged.
    pub async fn execute_with_session<F, E>(&self, operation: F) -> Result<(), E>
    where
        F: AsyncFnOnce(&P::Session) -> Result<(), E>,
        E: From<RepositoryError>,
    {
        self.apply_with_session(operation).await
    }

    /// Like [`execute_with_session`](Self::execute_with_session), returning the
    /// value produced by `operation`
    pub async fn apply_with_session<F, R, E>(&self, operation: F) -> Result<R, E>
    where
        F: AsyncFnOnce(&P::Session) -> Result<R, E>,
        E: From<RepositoryError>,
    {
        let scope = self.open_session().await?;
        operation(&scope.session).await
    }

    /// Convert a driver row into a domain value
    pub fn transform_row(&self, row: &SessionRow<P>) -> RepositoryResult<V> {
        self.transformer.transform_row(row).map_err(|source| {
            let row = format!("{row:?}");
            debug!(identity = %self.identity, row = %row, error = %source, "Failed to transform row");
            RepositoryError::RowTransformation { row, source }
        })
    }

    /// Convert rows in order, stopping at the first failure
    pub fn transform_rows(
        &self,
        rows: impl IntoIterator<Item = SessionRow<P>>,
    ) -> RepositoryResult<Vec<V>> {
        rows.into_iter().map(|row| self.transform_row(&row)).collect()
    }

    pub fn create_table_statement(&self) -> CreateTable {
        CreateTable::new(self.keyspace().clone(), self.table().clone())
    }

    pub fn alter_table_statement(&self) -> AlterTable {
        AlterTable::new(self.keyspace().clone(), self.table().clone())
    }

    pub fn drop_table_statement(&self) -> DropSchema {
        DropSchema::table(self.keyspace().clone(), self.table().clone())
    }

    pub fn create_keyspace_statement(&self) -> CreateKeyspace {
        CreateKeyspace::new(self.keyspace().clone())
    }

    pub fn alter_keyspace_statement(&self) -> AlterKeyspace {
        AlterKeyspace::new(self.keyspace().clone())
    }

    pub fn drop_keyspace_statement(&self) -> DropSchema {
        DropSchema::keyspace(self.keyspace().clone())
    }

    pub fn insert_statement(&self) -> Insert {
        Insert::new(self.keyspace().clone(), self.table().clone())
    }

    pub fn update_statement(&self) -> Update {
        Update::new(self.keyspace().clone(), self.table().clone())
    }

    pub fn select_statement(&self) -> Select {
        Select::new(self.keyspace().clone(), self.table().clone())
    }

    pub fn truncate_statement(&self) -> Truncate {
        Truncate::new(self.keyspace().clone(), self.table().clone())
    }

    pub fn delete_statement(&self) -> Delete {
        Delete::new(self.keyspace().clone(), self.table().clone())
    }
}

impl<P: SessionProvider, V> Clone for BaseRepository<P, V> {
    fn clone(&self) -> Self {
        Self {
            identity: self.identity.clone(),
            provider: Arc::clone(&self.provider),
            transformer: Arc::clone(&self.transformer),
        }
    }
}

impl<P: SessionProvider, V> fmt::Debug for BaseRepository<P, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BaseRepository")
            .field("identity", &self.identity)
            .finish_non_exhaustive()
    }
}
