use std::fmt;

use super::Identifier;
use crate::row::Value;

/// Right-hand side of an assignment or relation
#[derive(Clone, Debug, PartialEq)]
pub enum Term {
    /// Anonymous bind marker (`?`)
    BindMarker,
    /// Named bind marker (`:name`)
    NamedBindMarker(Identifier),
    /// Inline literal value
    Literal(Value),
    /// Raw CQL, copied verbatim
    Raw(String),
    /// Parenthesised list of terms, used by `IN`
    Tuple(Vec<Term>),
}

pub fn bind_marker() -> Term {
    Term::BindMarker
}

pub fn named_bind_marker(name: impl Into<Identifier>) -> Term {
    Term::NamedBindMarker(name.into())
}

pub fn literal(value: impl Into<Value>) -> Term {
    Term::Literal(value.into())
}

pub fn raw(cql: impl Into<String>) -> Term {
    Term::Raw(cql.into())
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::BindMarker => f.write_str("?"),
            Term::NamedBindMarker(name) => write!(f, ":{name}"),
            Term::Literal(value) => write_literal(f, value),
            Term::Raw(cql) => f.write_str(cql),
            Term::Tuple(terms) => {
                f.write_str("(")?;
                write_joined(f, terms)?;
                f.write_str(")")
            }
        }
    }
}

fn write_joined<T: fmt::Display>(f: &mut fmt::Formatter<'_>, items: &[T]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(",")?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}

fn write_literal(f: &mut fmt::Formatter<'_>, value: &Value) -> fmt::Result {
    match value {
        Value::Null | Value::Unsupported(_) => f.write_str("NULL"),
        Value::Text(text) => write_quoted(f, text),
        Value::Int(v) => write!(f, "{v}"),
        Value::BigInt(v) => write!(f, "{v}"),
        Value::Varint(bytes) => {
            f.write_str("blobAsVarint(")?;
            write_hex(f, bytes)?;
            f.write_str(")")
        }
        // serialized form: 4-byte big-endian scale, then the unscaled varint
        Value::Decimal { unscaled, scale } => {
            f.write_str("blobAsDecimal(")?;
            write_hex(f, &[scale.to_be_bytes().as_slice(), unscaled.as_slice()].concat())?;
            f.write_str(")")
        }
        Value::Boolean(v) => write!(f, "{v}"),
        Value::Double(v) => write_float(f, *v),
        Value::Float(v) => write_float(f, f64::from(*v)),
        Value::Uuid(v) | Value::Timeuuid(v) => write!(f, "{v}"),
        Value::Timestamp(v) => write!(f, "{}", v.timestamp_millis()),
        Value::Date(v) => write!(f, "'{}'", v.format("%Y-%m-%d")),
        Value::Time(v) => write!(f, "'{}'", v.format("%H:%M:%S%.f")),
        Value::Inet(v) => write!(f, "'{v}'"),
        Value::Blob(bytes) => write_hex(f, bytes),
        Value::List(values) => {
            f.write_str("[")?;
            write_literals(f, values)?;
            f.write_str("]")
        }
        Value::Tuple(values) => {
            f.write_str("(")?;
            write_literals(f, values)?;
            f.write_str(")")
        }
        Value::Map(entries) => {
            f.write_str("{")?;
            for (i, (key, value)) in entries.iter().enumerate() {
                if i > 0 {
                    f.write_str(",")?;
                }
                write_literal(f, key)?;
                f.write_str(":")?;
                write_literal(f, value)?;
            }
            f.write_str("}")
        }
    }
}

fn write_literals(f: &mut fmt::Formatter<'_>, values: &[Value]) -> fmt::Result {
    for (i, item) in values.iter().enumerate() {
        if i > 0 {
            f.write_str(",")?;
        }
        write_literal(f, item)?;
    }
    Ok(())
}

fn write_quoted(f: &mut fmt::Formatter<'_>, text: &str) -> fmt::Result {
    write!(f, "'{}'", text.replace('\'', "''"))
}

fn write_hex(f: &mut fmt::Formatter<'_>, bytes: &[u8]) -> fmt::Result {
    f.write_str("0x")?;
    bytes.iter().try_for_each(|b| write!(f, "{b:02x}"))
}

/// CQL spells the non-finite values `NaN`, `Infinity` and `-Infinity`
fn write_float(f: &mut fmt::Formatter<'_>, v: f64) -> fmt::Result {
    if v.is_nan() {
        f.write_str("NaN")
    } else if v.is_infinite() {
        f.write_str(if v > 0.0 { "Infinity" } else { "-Infinity" })
    } else {
        write!(f, "{v:?}")
    }
}

/// Comparison operator of a relation
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operator {
    Eq,
    NotEq,
    Lt,
    Lte,
    Gt,
    Gte,
    In,
    Contains,
    ContainsKey,
}

impl Operator {
    fn as_cql(self) -> &'static str {
        match self {
            Operator::Eq => "=",
            Operator::NotEq => "!=",
            Operator::Lt => "<",
            Operator::Lte => "<=",
            Operator::Gt => ">",
            Operator::Gte => ">=",
            Operator::In => " IN ",
            Operator::Contains => " CONTAINS ",
            Operator::ContainsKey => " CONTAINS KEY ",
        }
    }
}

/// A `column <op> term` relation used in `WHERE` and `IF` clauses
#[derive(Clone, Debug, PartialEq)]
pub struct Relation {
    column: Identifier,
    operator: Operator,
    term: Term,
}

impl Relation {
    pub fn new(column: impl Into<Identifier>, operator: Operator, term: Term) -> Self {
        Self {
            column: column.into(),
            operator,
            term,
        }
    }

    /// Start a relation on a column
    pub fn column(column: impl Into<Identifier>) -> ColumnRelation<Relation> {
        ColumnRelation::new(column.into(), std::convert::identity)
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.column, self.operator.as_cql(), self.term)
    }
}

/// Pending relation on a column; completing it hands the relation back to its owner
pub struct ColumnRelation<T> {
    column: Identifier,
    complete: Box<dyn FnOnce(Relation) -> T>,
}

impl<T> ColumnRelation<T> {
    pub(crate) fn new(column: Identifier, complete: impl FnOnce(Relation) -> T + 'static) -> Self {
        Self {
            column,
            complete: Box::new(complete),
        }
    }

    fn finish(self, operator: Operator, term: Term) -> T {
        (self.complete)(Relation {
            column: self.column,
            operator,
            term,
        })
    }

    pub fn is_equal_to(self, term: Term) -> T {
        self.finish(Operator::Eq, term)
    }

    pub fn is_not_equal_to(self, term: Term) -> T {
        self.finish(Operator::NotEq, term)
    }

    pub fn is_less_than(self, term: Term) -> T {
        self.finish(Operator::Lt, term)
    }

    pub fn is_less_than_or_equal_to(self, term: Term) -> T {
        self.finish(Operator::Lte, term)
    }

    pub fn is_greater_than(self, term: Term) -> T {
        self.finish(Operator::Gt, term)
    }

    pub fn is_greater_than_or_equal_to(self, term: Term) -> T {
        self.finish(Operator::Gte, term)
    }

    /// `IN (...)`; a single bind marker binds the whole list
    pub fn is_in(self, terms: impl IntoIterator<Item = Term>) -> T {
        let mut terms: Vec<Term> = terms.into_iter().collect();
        let term = match terms.as_slice() {
            [Term::BindMarker] | [Term::NamedBindMarker(_)] => terms.remove(0),
            _ => Term::Tuple(terms),
        };
        self.finish(Operator::In, term)
    }

    pub fn contains(self, term: Term) -> T {
        self.finish(Operator::Contains, term)
    }

    pub fn contains_key(self, term: Term) -> T {
        self.finish(Operator::ContainsKey, term)
    }
}

/// Builders that accept `WHERE` relations
pub trait OngoingWhereClause: Sized + 'static {
    fn where_relation(self, relation: Relation) -> Self;

    fn where_column(self, column: impl Into<Identifier>) -> ColumnRelation<Self> {
        ColumnRelation::new(column.into(), move |relation| self.where_relation(relation))
    }

    fn where_relations(self, relations: impl IntoIterator<Item = Relation>) -> Self {
        relations
            .into_iter()
            .fold(self, |builder, relation| builder.where_relation(relation))
    }
}

pub(crate) fn write_where(f: &mut fmt::Formatter<'_>, relations: &[Relation]) -> fmt::Result {
    if relations.is_empty() {
        return Ok(());
    }
    f.write_str(" WHERE ")?;
    for (i, relation) in relations.iter().enumerate() {
        if i > 0 {
            f.write_str(" AND ")?;
        }
        write!(f, "{relation}")?;
    }
    Ok(())
}

/// Sort direction of a clustering column
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClusteringOrder {
    Asc,
    Desc,
}

impl fmt::Display for ClusteringOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ClusteringOrder::Asc => "ASC",
            ClusteringOrder::Desc => "DESC",
        })
    }
}

/// CQL column types
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DataType {
    Ascii,
    BigInt,
    Blob,
    Boolean,
    Counter,
    Date,
    Decimal,
    Double,
    Float,
    Inet,
    Int,
    SmallInt,
    Text,
    Time,
    Timestamp,
    TimeUuid,
    TinyInt,
    Uuid,
    VarInt,
    List(Box<DataType>),
    Set(Box<DataType>),
    Map(Box<DataType>, Box<DataType>),
    Frozen(Box<DataType>),
}

impl DataType {
    pub fn list_of(element: DataType) -> Self {
        DataType::List(Box::new(element))
    }

    pub fn set_of(element: DataType) -> Self {
        DataType::Set(Box::new(element))
    }

    pub fn map_of(key: DataType, value: DataType) -> Self {
        DataType::Map(Box::new(key), Box::new(value))
    }

    pub fn frozen(inner: DataType) -> Self {
        DataType::Frozen(Box::new(inner))
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataType::Ascii => f.write_str("ascii"),
            DataType::BigInt => f.write_str("bigint"),
            DataType::Blob => f.write_str("blob"),
            DataType::Boolean => f.write_str("boolean"),
            DataType::Counter => f.write_str("counter"),
            DataType::Date => f.write_str("date"),
            DataType::Decimal => f.write_str("decimal"),
            DataType::Double => f.write_str("double"),
            DataType::Float => f.write_str("float"),
            DataType::Inet => f.write_str("inet"),
            DataType::Int => f.write_str("int"),
            DataType::SmallInt => f.write_str("smallint"),
            DataType::Text => f.write_str("text"),
            DataType::Time => f.write_str("time"),
            DataType::Timestamp => f.write_str("timestamp"),
            DataType::TimeUuid => f.write_str("timeuuid"),
            DataType::TinyInt => f.write_str("tinyint"),
            DataType::Uuid => f.write_str("uuid"),
            DataType::VarInt => f.write_str("varint"),
            DataType::List(element) => write!(f, "list<{element}>"),
            DataType::Set(element) => write!(f, "set<{element}>"),
            DataType::Map(key, value) => write!(f, "map<{key},{value}>"),
            DataType::Frozen(inner) => write!(f, "frozen<{inner}>"),
        }
    }
}
