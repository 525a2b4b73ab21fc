use std::fmt;

use super::term::write_where;
use super::{
    ClusteringOrder, Identifier, OngoingWhereClause, Relation, Term, buildable_via_display,
    qualified,
};

#[derive(Clone, Debug, Default, PartialEq)]
struct Using {
    ttl: Option<Term>,
    timestamp: Option<Term>,
}

impl fmt::Display for Using {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.ttl, &self.timestamp) {
            (None, None) => Ok(()),
            (Some(ttl), None) => write!(f, " USING TTL {ttl}"),
            (None, Some(ts)) => write!(f, " USING TIMESTAMP {ts}"),
            (Some(ttl), Some(ts)) => write!(f, " USING TTL {ttl} AND TIMESTAMP {ts}"),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
enum Condition {
    #[default]
    None,
    IfExists,
    IfNotExists,
    Relations(Vec<Relation>),
}

impl Condition {
    fn push(&mut self, relation: Relation) {
        match self {
            Condition::Relations(relations) => relations.push(relation),
            _ => *self = Condition::Relations(vec![relation]),
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Condition::None => Ok(()),
            Condition::IfExists => f.write_str(" IF EXISTS"),
            Condition::IfNotExists => f.write_str(" IF NOT EXISTS"),
            Condition::Relations(relations) => {
                f.write_str(" IF ")?;
                for (i, relation) in relations.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" AND ")?;
                    }
                    write!(f, "{relation}")?;
                }
                Ok(())
            }
        }
    }
}

/// `INSERT INTO`
#[derive(Clone, Debug, PartialEq)]
pub struct Insert {
    keyspace: Identifier,
    table: Identifier,
    assignments: Vec<(Identifier, Term)>,
    if_not_exists: bool,
    using: Using,
}

impl Insert {
    pub fn new(keyspace: Identifier, table: Identifier) -> Self {
        Self {
            keyspace,
            table,
            assignments: Vec::new(),
            if_not_exists: false,
            using: Using::default(),
        }
    }

    /// Set a column; setting the same column again replaces its term
    pub fn value(mut self, column: impl Into<Identifier>, term: Term) -> Self {
        let column = column.into();
        match self.assignments.iter_mut().find(|(name, _)| *name == column) {
            Some((_, existing)) => *existing = term,
            None => self.assignments.push((column, term)),
        }
        self
    }

    pub fn if_not_exists(mut self) -> Self {
        self.if_not_exists = true;
        self
    }

    pub fn using_ttl(mut self, ttl: Term) -> Self {
        self.using.ttl = Some(ttl);
        self
    }

    pub fn using_timestamp(mut self, timestamp: Term) -> Self {
        self.using.timestamp = Some(timestamp);
        self
    }
}

impl fmt::Display for Insert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let columns: Vec<String> = self.assignments.iter().map(|(c, _)| c.as_cql()).collect();
        let values: Vec<String> = self.assignments.iter().map(|(_, t)| t.to_string()).collect();
        write!(
            f,
            "INSERT INTO {} ({}) VALUES ({})",
            qualified(&self.keyspace, &self.table),
            columns.join(","),
            values.join(",")
        )?;
        if self.if_not_exists {
            f.write_str(" IF NOT EXISTS")?;
        }
        write!(f, "{}", self.using)
    }
}

#[derive(Clone, Debug, PartialEq)]
enum Assignment {
    Set(Identifier, Term),
    Increment(Identifier, Term),
    Decrement(Identifier, Term),
}

impl fmt::Display for Assignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Assignment::Set(column, term) => write!(f, "{column}={term}"),
            Assignment::Increment(column, term) => write!(f, "{column}={column}+{term}"),
            Assignment::Decrement(column, term) => write!(f, "{column}={column}-{term}"),
        }
    }
}

/// `UPDATE`
#[derive(Clone, Debug, PartialEq)]
pub struct Update {
    keyspace: Identifier,
    table: Identifier,
    assignments: Vec<Assignment>,
    relations: Vec<Relation>,
    condition: Condition,
    using: Using,
}

impl Update {
    pub fn new(keyspace: Identifier, table: Identifier) -> Self {
        Self {
            keyspace,
            table,
            assignments: Vec::new(),
            relations: Vec::new(),
            condition: Condition::None,
            using: Using::default(),
        }
    }

    pub fn set_column(mut self, column: impl Into<Identifier>, term: Term) -> Self {
        self.assignments.push(Assignment::Set(column.into(), term));
        self
    }

    /// `column=column+term`, for counters
    pub fn increment(mut self, column: impl Into<Identifier>, term: Term) -> Self {
        self.assignments
            .push(Assignment::Increment(column.into(), term));
        self
    }

    pub fn decrement(mut self, column: impl Into<Identifier>, term: Term) -> Self {
        self.assignments
            .push(Assignment::Decrement(column.into(), term));
        self
    }

    pub fn if_exists(mut self) -> Self {
        self.condition = Condition::IfExists;
        self
    }

    /// Lightweight-transaction condition; replaces `IF EXISTS`
    pub fn if_relation(mut self, relation: Relation) -> Self {
        self.condition.push(relation);
        self
    }

    pub fn using_ttl(mut self, ttl: Term) -> Self {
        self.using.ttl = Some(ttl);
        self
    }

    pub fn using_timestamp(mut self, timestamp: Term) -> Self {
        self.using.timestamp = Some(timestamp);
        self
    }
}

impl OngoingWhereClause for Update {
    fn where_relation(mut self, relation: Relation) -> Self {
        self.relations.push(relation);
        self
    }
}

impl fmt::Display for Update {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "UPDATE {}{} SET ",
            qualified(&self.keyspace, &self.table),
            self.using
        )?;
        for (i, assignment) in self.assignments.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{assignment}")?;
        }
        write_where(f, &self.relations)?;
        write!(f, "{}", self.condition)
    }
}

#[derive(Clone, Debug, PartialEq)]
enum Selector {
    Column(Identifier),
    CountAll,
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selector::Column(column) => write!(f, "{column}"),
            Selector::CountAll => f.write_str("count(*)"),
        }
    }
}

/// `SELECT`
///
/// With no selectors the statement selects `*`.
#[derive(Clone, Debug, PartialEq)]
pub struct Select {
    keyspace: Identifier,
    table: Identifier,
    selectors: Vec<Selector>,
    relations: Vec<Relation>,
    ordering: Vec<(Identifier, ClusteringOrder)>,
    limit: Option<Term>,
    per_partition_limit: Option<Term>,
    allow_filtering: bool,
}

impl Select {
    pub fn new(keyspace: Identifier, table: Identifier) -> Self {
        Self {
            keyspace,
            table,
            selectors: Vec::new(),
            relations: Vec::new(),
            ordering: Vec::new(),
            limit: None,
            per_partition_limit: None,
            allow_filtering: false,
        }
    }

    /// Select every column, dropping any selector added so far
    pub fn all(mut self) -> Self {
        self.selectors.clear();
        self
    }

    pub fn column(mut self, column: impl Into<Identifier>) -> Self {
        self.selectors.push(Selector::Column(column.into()));
        self
    }

    pub fn columns<C: Into<Identifier>>(self, columns: impl IntoIterator<Item = C>) -> Self {
        columns
            .into_iter()
            .fold(self, |select, column| select.column(column))
    }

    pub fn count_all(mut self) -> Self {
        self.selectors.push(Selector::CountAll);
        self
    }

    pub fn order_by(mut self, column: impl Into<Identifier>, order: ClusteringOrder) -> Self {
        self.ordering.push((column.into(), order));
        self
    }

    pub fn limit(mut self, limit: Term) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn per_partition_limit(mut self, limit: Term) -> Self {
        self.per_partition_limit = Some(limit);
        self
    }

    pub fn allow_filtering(mut self) -> Self {
        self.allow_filtering = true;
        self
    }
}

impl OngoingWhereClause for Select {
    fn where_relation(mut self, relation: Relation) -> Self {
        self.relations.push(relation);
        self
    }
}

impl fmt::Display for Select {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SELECT ")?;
        if self.selectors.is_empty() {
            f.write_str("*")?;
        } else {
            for (i, selector) in self.selectors.iter().enumerate() {
                if i > 0 {
                    f.write_str(",")?;
                }
                write!(f, "{selector}")?;
            }
        }
        write!(f, " FROM {}", qualified(&self.keyspace, &self.table))?;
        write_where(f, &self.relations)?;
        if !self.ordering.is_empty() {
            f.write_str(" ORDER BY ")?;
            for (i, (column, order)) in self.ordering.iter().enumerate() {
                if i > 0 {
                    f.write_str(",")?;
                }
                write!(f, "{column} {order}")?;
            }
        }
        if let Some(limit) = &self.per_partition_limit {
            write!(f, " PER PARTITION LIMIT {limit}")?;
        }
        if let Some(limit) = &self.limit {
            write!(f, " LIMIT {limit}")?;
        }
        if self.allow_filtering {
            f.write_str(" ALLOW FILTERING")?;
        }
        Ok(())
    }
}

/// `DELETE`
///
/// With no columns the whole row is removed.
#[derive(Clone, Debug, PartialEq)]
pub struct Delete {
    keyspace: Identifier,
    table: Identifier,
    columns: Vec<Identifier>,
    relations: Vec<Relation>,
    condition: Condition,
    timestamp: Option<Term>,
}

impl Delete {
    pub fn new(keyspace: Identifier, table: Identifier) -> Self {
        Self {
            keyspace,
            table,
            columns: Vec::new(),
            relations: Vec::new(),
            condition: Condition::None,
            timestamp: None,
        }
    }

    pub fn column(mut self, column: impl Into<Identifier>) -> Self {
        self.columns.push(column.into());
        self
    }

    pub fn if_exists(mut self) -> Self {
        self.condition = Condition::IfExists;
        self
    }

    pub fn if_relation(mut self, relation: Relation) -> Self {
        self.condition.push(relation);
        self
    }

    pub fn using_timestamp(mut self, timestamp: Term) -> Self {
        self.timestamp = Some(timestamp);
        self
    }
}

impl OngoingWhereClause for Delete {
    fn where_relation(mut self, relation: Relation) -> Self {
        self.relations.push(relation);
        self
    }
}

impl fmt::Display for Delete {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("DELETE ")?;
        if !self.columns.is_empty() {
            let columns: Vec<String> = self.columns.iter().map(Identifier::as_cql).collect();
            write!(f, "{} ", columns.join(","))?;
        }
        write!(f, "FROM {}", qualified(&self.keyspace, &self.table))?;
        if let Some(timestamp) = &self.timestamp {
            write!(f, " USING TIMESTAMP {timestamp}")?;
        }
        write_where(f, &self.relations)?;
        write!(f, "{}", self.condition)
    }
}

/// `TRUNCATE`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Truncate {
    keyspace: Identifier,
    table: Identifier,
}

impl Truncate {
    pub fn new(keyspace: Identifier, table: Identifier) -> Self {
        Self { keyspace, table }
    }
}

impl fmt::Display for Truncate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TRUNCATE {}", qualified(&self.keyspace, &self.table))
    }
}

buildable_via_display!(Insert, Update, Select, Delete, Truncate);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cql::{BuildableQuery, bind_marker, literal};

    fn ks() -> Identifier {
        Identifier::from_cql("games")
    }

    fn tbl() -> Identifier {
        Identifier::from_cql("users")
    }

    #[test]
    fn test_insert_if_not_exists() {
        let cql = Insert::new(ks(), tbl())
            .value("id", bind_marker())
            .value("password", bind_marker())
            .if_not_exists()
            .as_cql();
        assert_eq!(
            cql,
            "INSERT INTO games.users (id,password) VALUES (?,?) IF NOT EXISTS"
        );
    }

    #[test]
    fn test_insert_repeated_column_replaces_term() {
        let cql = Insert::new(ks(), tbl())
            .value("id", literal("a"))
            .value("id", literal("b"))
            .using_ttl(literal(60))
            .as_cql();
        assert_eq!(cql, "INSERT INTO games.users (id) VALUES ('b') USING TTL 60");
    }

    #[test]
    fn test_update_if_exists() {
        let cql = Update::new(ks(), tbl())
            .set_column("password", bind_marker())
            .where_column("id")
            .is_equal_to(bind_marker())
            .if_exists()
            .as_cql();
        assert_eq!(cql, "UPDATE games.users SET password=? WHERE id=? IF EXISTS");
    }

    #[test]
    fn test_update_counters_and_conditions() {
        let cql = Update::new(ks(), Identifier::from_cql("stats"))
            .using_timestamp(bind_marker())
            .increment("wins", literal(1_i64))
            .decrement("lives", literal(1_i64))
            .where_column("id")
            .is_equal_to(bind_marker())
            .if_relation(Relation::column("wins").is_less_than(literal(100_i64)))
            .as_cql();
        assert_eq!(
            cql,
            "UPDATE games.stats USING TIMESTAMP ? SET wins=wins+1,lives=lives-1 WHERE id=? IF wins<100"
        );
    }

    #[test]
    fn test_select_all_by_default() {
        assert_eq!(
            Select::new(ks(), tbl()).as_cql(),
            "SELECT * FROM games.users"
        );
    }

    #[test]
    fn test_select_full_clause_order() {
        let cql = Select::new(ks(), Identifier::from_cql("scores"))
            .columns(["game", "points"])
            .where_column("game")
            .is_equal_to(bind_marker())
            .where_column("points")
            .is_greater_than(literal(10_i64))
            .order_by("played_at", ClusteringOrder::Desc)
            .per_partition_limit(literal(5))
            .limit(literal(10))
            .allow_filtering()
            .as_cql();
        assert_eq!(
            cql,
            "SELECT game,points FROM games.scores WHERE game=? AND points>10 \
             ORDER BY played_at DESC PER PARTITION LIMIT 5 LIMIT 10 ALLOW FILTERING"
        );
    }

    #[test]
    fn test_select_count() {
        assert_eq!(
            Select::new(ks(), tbl()).count_all().as_cql(),
            "SELECT count(*) FROM games.users"
        );
    }

    #[test]
    fn test_delete_if_exists() {
        let cql = Delete::new(ks(), tbl())
            .where_column("id")
            .is_equal_to(bind_marker())
            .if_exists()
            .as_cql();
        assert_eq!(cql, "DELETE FROM games.users WHERE id=? IF EXISTS");
    }

    #[test]
    fn test_delete_columns_with_timestamp() {
        let cql = Delete::new(ks(), tbl())
            .column("password")
            .using_timestamp(literal(1_i64))
            .where_relation(Relation::column("id").is_equal_to(literal("u1")))
            .as_cql();
        assert_eq!(
            cql,
            "DELETE password FROM games.users USING TIMESTAMP 1 WHERE id='u1'"
        );
    }

    #[test]
    fn test_truncate() {
        assert_eq!(Truncate::new(ks(), tbl()).as_cql(), "TRUNCATE games.users");
    }

    #[test]
    fn test_build_freezes_statement() {
        let statement = Select::new(ks(), tbl())
            .where_column("id")
            .is_equal_to(bind_marker())
            .build();
        assert_eq!(statement.as_cql(), "SELECT * FROM games.users WHERE id=?");
        assert_eq!(statement.build(), statement);
    }
}
