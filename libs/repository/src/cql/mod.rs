//! CQL statement builders
//!
//! Builders only produce text; they never talk to a session. Every builder implements
//! [`BuildableQuery`], and [`BuildableQuery::build`] freezes it into a [`Statement`]
//! that can be prepared once and executed many times.
//!
//! ```
//! use repository::cql::{self, BuildableQuery, OngoingWhereClause, bind_marker};
//!
//! let select = cql::select_from("games", "users")
//!     .all()
//!     .where_column("id")
//!     .is_equal_to(bind_marker())
//!     .build();
//! assert_eq!(select.as_cql(), "SELECT * FROM games.users WHERE id=?");
//! ```

/// Implements `BuildableQuery` through the builder's `Display` impl
macro_rules! buildable_via_display {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl $crate::cql::BuildableQuery for $ty {
                fn as_cql(&self) -> String {
                    self.to_string()
                }
            }
        )+
    };
}
pub(crate) use buildable_via_display;

mod identifier;
mod query;
mod schema;
mod term;

pub use identifier::Identifier;
pub use query::{Delete, Insert, Select, Truncate, Update};
pub use schema::{AlterKeyspace, AlterTable, CreateKeyspace, CreateTable, DropSchema, Replication};
pub use term::{
    ClusteringOrder, ColumnRelation, DataType, OngoingWhereClause, Operator, Relation, Term,
    bind_marker, literal, named_bind_marker, raw,
};

use std::fmt;

/// A fully formed, immutable CQL statement
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Statement {
    cql: String,
}

impl Statement {
    pub fn new(cql: impl Into<String>) -> Self {
        Self { cql: cql.into() }
    }

    pub fn as_cql(&self) -> &str {
        &self.cql
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.cql)
    }
}

/// Anything that can be rendered into a [`Statement`]
pub trait BuildableQuery {
    fn as_cql(&self) -> String;

    fn build(&self) -> Statement {
        Statement::new(self.as_cql())
    }
}

impl BuildableQuery for Statement {
    fn as_cql(&self) -> String {
        self.cql.clone()
    }

    fn build(&self) -> Statement {
        self.clone()
    }
}

/// `keyspace.table` as rendered in statements
pub(crate) fn qualified(keyspace: &Identifier, table: &Identifier) -> String {
    format!("{}.{}", keyspace.as_cql(), table.as_cql())
}

pub fn create_keyspace(keyspace: impl Into<Identifier>) -> CreateKeyspace {
    CreateKeyspace::new(keyspace.into())
}

pub fn alter_keyspace(keyspace: impl Into<Identifier>) -> AlterKeyspace {
    AlterKeyspace::new(keyspace.into())
}

pub fn drop_keyspace(keyspace: impl Into<Identifier>) -> DropSchema {
    DropSchema::keyspace(keyspace.into())
}

pub fn create_table(keyspace: impl Into<Identifier>, table: impl Into<Identifier>) -> CreateTable {
    CreateTable::new(keyspace.into(), table.into())
}

pub fn alter_table(keyspace: impl Into<Identifier>, table: impl Into<Identifier>) -> AlterTable {
    AlterTable::new(keyspace.into(), table.into())
}

pub fn drop_table(keyspace: impl Into<Identifier>, table: impl Into<Identifier>) -> DropSchema {
    DropSchema::table(keyspace.into(), table.into())
}

pub fn insert_into(keyspace: impl Into<Identifier>, table: impl Into<Identifier>) -> Insert {
    Insert::new(keyspace.into(), table.into())
}

pub fn update(keyspace: impl Into<Identifier>, table: impl Into<Identifier>) -> Update {
    Update::new(keyspace.into(), table.into())
}

pub fn select_from(keyspace: impl Into<Identifier>, table: impl Into<Identifier>) -> Select {
    Select::new(keyspace.into(), table.into())
}

pub fn delete_from(keyspace: impl Into<Identifier>, table: impl Into<Identifier>) -> Delete {
    Delete::new(keyspace.into(), table.into())
}

pub fn truncate(keyspace: impl Into<Identifier>, table: impl Into<Identifier>) -> Truncate {
    Truncate::new(keyspace.into(), table.into())
}
