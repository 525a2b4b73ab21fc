//! Session capabilities
//!
//! A [`SessionProvider`] hands out one session per repository operation. The
//! session is owned by that operation alone and dropped when it finishes.

use async_trait::async_trait;
use std::fmt::Debug;

use crate::cql::Statement;
use crate::error::DriverError;
use crate::row::Value;

/// Rows returned by a statement together with its lightweight-transaction outcome
#[derive(Clone, Debug, PartialEq)]
pub struct ResultSet<R> {
    applied: bool,
    rows: Vec<R>,
}

impl<R> ResultSet<R> {
    pub fn new(applied: bool, rows: Vec<R>) -> Self {
        Self { applied, rows }
    }

    /// Result of a statement that returns no rows
    pub fn applied() -> Self {
        Self::new(true, Vec::new())
    }

    /// Result of a conditional write the database refused
    pub fn not_applied(rows: Vec<R>) -> Self {
        Self::new(false, rows)
    }

    /// Whether a conditional write (`IF EXISTS`, `IF NOT EXISTS`, `IF ...`) took effect.
    /// Unconditional statements are always applied.
    pub fn was_applied(&self) -> bool {
        self.applied
    }

    /// First row, if any
    pub fn one(self) -> Option<R> {
        self.rows.into_iter().next()
    }

    pub fn rows(&self) -> &[R] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<R> {
        self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl<R> Default for ResultSet<R> {
    fn default() -> Self {
        Self::applied()
    }
}

impl<R> IntoIterator for ResultSet<R> {
    type Item = R;
    type IntoIter = std::vec::IntoIter<R>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.into_iter()
    }
}

impl<'a, R> IntoIterator for &'a ResultSet<R> {
    type Item = &'a R;
    type IntoIter = std::slice::Iter<'a, R>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

/// An open session able to run statements
#[async_trait]
pub trait CqlSession: Send + Sync {
    /// Row type produced by the driver
    type Row: Debug + Send + Sync;
    /// Prepared statement handle
    type Prepared: Send + Sync;

    /// Execute a statement without bound values
    async fn execute(&self, statement: &Statement) -> Result<ResultSet<Self::Row>, DriverError>;

    /// Prepare a statement for repeated execution
    async fn prepare(&self, statement: &Statement) -> Result<Self::Prepared, DriverError>;

    /// Bind values to a prepared statement and execute it
    async fn execute_prepared(
        &self,
        prepared: &Self::Prepared,
        values: &[Value],
    ) -> Result<ResultSet<Self::Row>, DriverError>;

    /// Prepare, bind and execute in one call
    async fn execute_with_values(
        &self,
        statement: &Statement,
        values: &[Value],
    ) -> Result<ResultSet<Self::Row>, DriverError> {
        let prepared = self.prepare(statement).await?;
        self.execute_prepared(&prepared, values).await
    }
}

/// Source of sessions; may fail to connect
#[async_trait]
pub trait SessionProvider: Send + Sync {
    type Session: CqlSession;

    async fn provide_session(&self) -> Result<Self::Session, DriverError>;
}

/// Row type of the sessions handed out by a provider
pub type SessionRow<P> = <<P as SessionProvider>::Session as CqlSession>::Row;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_result_is_applied_and_empty() {
        let result: ResultSet<u32> = ResultSet::default();
        assert!(result.was_applied());
        assert!(result.is_empty());
        assert_eq!(result.one(), None);
    }

    #[test]
    fn test_not_applied_keeps_existing_rows() {
        let result = ResultSet::not_applied(vec!["existing"]);
        assert!(!result.was_applied());
        assert_eq!(result.len(), 1);
        assert_eq!(result.one(), Some("existing"));
    }

    #[test]
    fn test_iteration_preserves_order() {
        let result = ResultSet::new(true, vec![1, 2, 3]);
        let borrowed: Vec<_> = (&result).into_iter().copied().collect();
        assert_eq!(borrowed, vec![1, 2, 3]);
        assert_eq!(result.into_rows(), vec![1, 2, 3]);
    }
}
