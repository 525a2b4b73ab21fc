use std::fmt;

use crate::cql::Identifier;
use crate::error::{RepositoryError, RepositoryResult};

/// Keyspace and table a repository is bound to
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct RepositoryIdentity {
    keyspace: Identifier,
    table: Identifier,
}

impl RepositoryIdentity {
    /// Build an identity from CQL names, e.g. `identity_of("games", "users")`
    pub fn identity_of(keyspace: &str, table: &str) -> RepositoryResult<Self> {
        Self::new(Identifier::from_cql(keyspace), Identifier::from_cql(table))
    }

    pub fn new(keyspace: Identifier, table: Identifier) -> RepositoryResult<Self> {
        if keyspace.as_internal().trim().is_empty() {
            return Err(RepositoryError::InvalidIdentity(
                "keyspace name must not be empty".to_string(),
            ));
        }
        if table.as_internal().trim().is_empty() {
            return Err(RepositoryError::InvalidIdentity(
                "table name must not be empty".to_string(),
            ));
        }
        Ok(Self { keyspace, table })
    }

    pub fn keyspace(&self) -> &Identifier {
        &self.keyspace
    }

    pub fn table(&self) -> &Identifier {
        &self.table
    }
}

impl fmt::Display for RepositoryIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.keyspace, self.table)
    }
}

/// Shorthand for [`RepositoryIdentity::identity_of`]
pub fn identity_of(keyspace: &str, table: &str) -> RepositoryResult<RepositoryIdentity> {
    RepositoryIdentity::identity_of(keyspace, table)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_of() {
        let identity = identity_of("games", "users").unwrap();
        assert_eq!(identity.keyspace().as_internal(), "games");
        assert_eq!(identity.table().as_internal(), "users");
        assert_eq!(identity.to_string(), "games.users");
    }

    #[test]
    fn test_empty_parts_are_rejected() {
        assert!(matches!(
            identity_of("", "users"),
            Err(RepositoryError::InvalidIdentity(_))
        ));
        assert!(matches!(
            identity_of("games", "  "),
            Err(RepositoryError::InvalidIdentity(_))
        ));
    }

    #[test]
    fn test_quoted_names_are_preserved() {
        let identity = identity_of("\"Games\"", "users").unwrap();
        assert_eq!(identity.keyspace().as_internal(), "Games");
        assert_eq!(identity.to_string(), "\"Games\".users");
    }
}
