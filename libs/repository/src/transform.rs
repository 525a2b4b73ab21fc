use crate::cql::{BuildableQuery, Identifier, Statement};
use crate::error::BoxError;

/// Converts a driver row into a domain value
///
/// Closures `Fn(&R) -> Result<V, BoxError>` implement this trait.
pub trait RowTransformer<R, V>: Send + Sync {
    fn transform_row(&self, row: &R) -> Result<V, BoxError>;
}

impl<R, V, F> RowTransformer<R, V> for F
where
    F: Fn(&R) -> Result<V, BoxError> + Send + Sync,
{
    fn transform_row(&self, row: &R) -> Result<V, BoxError> {
        self(row)
    }
}

/// Produces the statement that makes sure a keyspace exists before a repository uses it
pub trait KeyspaceValidator: Send + Sync {
    fn validate_keyspace(&self, keyspace: &Identifier) -> Statement;
}

impl<F, Q> KeyspaceValidator for F
where
    F: Fn(&Identifier) -> Q + Send + Sync,
    Q: BuildableQuery,
{
    fn validate_keyspace(&self, keyspace: &Identifier) -> Statement {
        self(keyspace).build()
    }
}
