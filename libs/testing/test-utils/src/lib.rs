//! Test support for crates built on `repository`
//!
//! - [`StubSessionProvider`]: scripted in-process sessions with an acquire/release ledger
//! - [`TestDataBuilder`]: reproducible ids, passwords and rows derived from a seed
//! - [`assertions`]: panicking helpers with context messages
//! - `TestCassandra` (feature `cassandra`): throwaway single-node Cassandra container
//!
//! ```rust,ignore
//! use test_utils::{StubSessionProvider, TestDataBuilder};
//!
//! #[tokio::test]
//! async fn test_lookup_releases_its_session() {
//!     let builder = TestDataBuilder::from_test_name("test_lookup_releases_its_session");
//!     let provider = Arc::new(
//!         StubSessionProvider::new().with_rows("SELECT", vec![builder.user_row()]),
//!     );
//!     // build the repository over `provider` and run the lookup, then
//!     assert_eq!(provider.open_sessions(), 0);
//! }
//! ```

use repository::{Row, Value};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

#[cfg(feature = "cassandra")]
mod cassandra;
mod stub;

#[cfg(feature = "cassandra")]
pub use cassandra::TestCassandra;
pub use stub::{ExecutedStatement, StubSession, StubSessionProvider};

/// Reproducible test data: the same seed always yields the same values
pub struct TestDataBuilder {
    seed: u64,
}

impl TestDataBuilder {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    /// Seed from a hash of the test name, so each test gets its own data
    pub fn from_test_name(name: &str) -> Self {
        let mut hasher = DefaultHasher::new();
        name.hash(&mut hasher);
        Self::new(hasher.finish())
    }

    /// ```
    /// use test_utils::TestDataBuilder;
    ///
    /// assert_eq!(TestDataBuilder::new(7).name("user", "id"), "test-user-7-id");
    /// ```
    pub fn name(&self, prefix: &str, suffix: &str) -> String {
        format!("test-{prefix}-{}-{suffix}", self.seed)
    }

    /// Keyspace name that is a valid unquoted CQL identifier
    pub fn keyspace(&self) -> String {
        format!("test_ks_{}", self.seed % 1_000_000)
    }

    pub fn user_id(&self) -> String {
        self.name("user", "id")
    }

    pub fn password(&self) -> String {
        self.name("password", "secret")
    }

    /// `id`/`password` row as a users table returns it
    pub fn user_row(&self) -> Row {
        Row::from_pairs([
            ("id", Value::from(self.user_id())),
            ("password", Value::from(self.password())),
        ])
    }
}

/// Test assertion helpers
pub mod assertions {
    use std::error::Error;

    /// Assert that an optional value is Some
    pub fn assert_some<T>(value: Option<T>, context: &str) -> T {
        value.unwrap_or_else(|| panic!("{}: expected Some, got None", context))
    }

    /// Assert that an error's direct cause renders as `expected`
    pub fn assert_source_message(err: &dyn Error, expected: &str, context: &str) {
        let source = err
            .source()
            .unwrap_or_else(|| panic!("{}: expected a source for '{}'", context, err));
        assert_eq!(source.to_string(), expected, "{}: unexpected source", context);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_seed_same_data() {
        assert_eq!(TestDataBuilder::new(42).user_row(), TestDataBuilder::new(42).user_row());
        assert_eq!(
            TestDataBuilder::from_test_name("a").user_id(),
            TestDataBuilder::from_test_name("a").user_id()
        );
    }

    #[test]
    fn test_different_test_names_different_data() {
        assert_ne!(
            TestDataBuilder::from_test_name("test1").user_id(),
            TestDataBuilder::from_test_name("test2").user_id()
        );
    }

    #[test]
    fn test_keyspace_is_plain_identifier() {
        let keyspace = TestDataBuilder::from_test_name("any").keyspace();
        assert!(
            keyspace
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
        );
    }

    #[test]
    fn test_assert_source_message_reads_direct_cause() {
        let err = repository::RepositoryError::session_operation("outer", "inner cause");
        assertions::assert_source_message(&err, "inner cause", "session operation");
    }
}
