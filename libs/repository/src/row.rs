//! Driver-neutral values and rows
//!
//! Sessions translate their driver's column values into [`Value`] and hand rows to
//! row transformers as [`Row`], so transformers never depend on a concrete driver.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use std::fmt;
use std::net::IpAddr;
use uuid::Uuid;

/// A single CQL value
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Null,
    Text(String),
    Int(i32),
    BigInt(i64),
    /// Arbitrary precision integer, big-endian two's complement
    Varint(Vec<u8>),
    /// `unscaled * 10^-scale`, unscaled as big-endian two's complement
    Decimal {
        unscaled: Vec<u8>,
        scale: i32,
    },
    Boolean(bool),
    Double(f64),
    Float(f32),
    Uuid(Uuid),
    Timeuuid(Uuid),
    Timestamp(DateTime<Utc>),
    Date(NaiveDate),
    Time(NaiveTime),
    Inet(IpAddr),
    Blob(Vec<u8>),
    /// `list` and `set` columns
    List(Vec<Value>),
    Map(Vec<(Value, Value)>),
    Tuple(Vec<Value>),
    /// A column the row model has no representation for (durations, user defined
    /// types), kept as the driver's rendering so the row transformer decides.
    /// Cannot be bound; renders as `NULL` in literals.
    Unsupported(String),
}

impl Value {
    /// CQL name of the value's type, used in error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Text(_) => "text",
            Value::Int(_) => "int",
            Value::BigInt(_) => "bigint",
            Value::Varint(_) => "varint",
            Value::Decimal { .. } => "decimal",
            Value::Boolean(_) => "boolean",
            Value::Double(_) => "double",
            Value::Float(_) => "float",
            Value::Uuid(_) => "uuid",
            Value::Timeuuid(_) => "timeuuid",
            Value::Timestamp(_) => "timestamp",
            Value::Date(_) => "date",
            Value::Time(_) => "time",
            Value::Inet(_) => "inet",
            Value::Blob(_) => "blob",
            Value::List(_) => "list",
            Value::Map(_) => "map",
            Value::Tuple(_) => "tuple",
            Value::Unsupported(_) => "unsupported",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl From<&String> for Value {
    fn from(value: &String) -> Self {
        Value::Text(value.clone())
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::BigInt(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Boolean(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Double(value)
    }
}

impl From<f32> for Value {
    fn from(value: f32) -> Self {
        Value::Float(value)
    }
}

impl From<Uuid> for Value {
    fn from(value: Uuid) -> Self {
        Value::Uuid(value)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(value: DateTime<Utc>) -> Self {
        Value::Timestamp(value)
    }
}

impl From<NaiveDate> for Value {
    fn from(value: NaiveDate) -> Self {
        Value::Date(value)
    }
}

impl From<NaiveTime> for Value {
    fn from(value: NaiveTime) -> Self {
        Value::Time(value)
    }
}

impl From<IpAddr> for Value {
    fn from(value: IpAddr) -> Self {
        Value::Inet(value)
    }
}

impl From<Vec<u8>> for Value {
    fn from(value: Vec<u8>) -> Self {
        Value::Blob(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}

/// Conversion failure of a single value, before the column name is known
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueError {
    UnexpectedNull,
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },
}

/// Typed extraction from a [`Value`]
pub trait FromValue: Sized {
    fn from_value(value: &Value) -> Result<Self, ValueError>;
}

macro_rules! impl_from_value {
    ($ty:ty, $variant:ident, $expected:literal) => {
        impl FromValue for $ty {
            fn from_value(value: &Value) -> Result<Self, ValueError> {
                match value {
                    Value::$variant(inner) => Ok(inner.clone()),
                    Value::Null => Err(ValueError::UnexpectedNull),
                    other => Err(ValueError::TypeMismatch {
                        expected: $expected,
                        found: other.type_name(),
                    }),
                }
            }
        }
    };
}

impl_from_value!(String, Text, "text");
impl_from_value!(i32, Int, "int");
impl_from_value!(i64, BigInt, "bigint");
impl_from_value!(bool, Boolean, "boolean");
impl_from_value!(f64, Double, "double");
impl_from_value!(f32, Float, "float");
impl_from_value!(DateTime<Utc>, Timestamp, "timestamp");
impl_from_value!(NaiveDate, Date, "date");
impl_from_value!(NaiveTime, Time, "time");
impl_from_value!(IpAddr, Inet, "inet");
impl_from_value!(Vec<u8>, Blob, "blob");

/// Reads both `uuid` and `timeuuid` columns
impl FromValue for Uuid {
    fn from_value(value: &Value) -> Result<Self, ValueError> {
        match value {
            Value::Uuid(uuid) | Value::Timeuuid(uuid) => Ok(*uuid),
            Value::Null => Err(ValueError::UnexpectedNull),
            other => Err(ValueError::TypeMismatch {
                expected: "uuid",
                found: other.type_name(),
            }),
        }
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: &Value) -> Result<Self, ValueError> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }
}

impl FromValue for Value {
    fn from_value(value: &Value) -> Result<Self, ValueError> {
        Ok(value.clone())
    }
}

/// Failure to read a named column from a [`Row`]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ColumnError {
    #[error("Column '{0}' is not present in the row")]
    Missing(String),

    #[error("Column '{0}' is null")]
    UnexpectedNull(String),

    #[error("Column '{column}' holds {found}, expected {expected}")]
    TypeMismatch {
        column: String,
        expected: &'static str,
        found: &'static str,
    },
}

/// One result record: named columns in select order
#[derive(Clone, Default, PartialEq)]
pub struct Row {
    columns: Vec<(String, Value)>,
}

impl Row {
    pub fn new(columns: Vec<(String, Value)>) -> Self {
        Self { columns }
    }

    /// Convenience constructor for literal rows
    ///
    /// ```ignore
    /// let row = Row::from_pairs([("id", Value::from("u1")), ("password", Value::from("p"))]);
    /// ```
    pub fn from_pairs<N, I>(pairs: I) -> Self
    where
        N: Into<String>,
        I: IntoIterator<Item = (N, Value)>,
    {
        Self {
            columns: pairs
                .into_iter()
                .map(|(name, value)| (name.into(), value))
                .collect(),
        }
    }

    /// Raw value of a column, if present
    pub fn value(&self, name: &str) -> Option<&Value> {
        self.columns
            .iter()
            .find(|(column, _)| column == name)
            .map(|(_, value)| value)
    }

    /// Read a column as `T`
    pub fn get<T: FromValue>(&self, name: &str) -> Result<T, ColumnError> {
        let value = self
            .value(name)
            .ok_or_else(|| ColumnError::Missing(name.to_string()))?;

        T::from_value(value).map_err(|err| match err {
            ValueError::UnexpectedNull => ColumnError::UnexpectedNull(name.to_string()),
            ValueError::TypeMismatch { expected, found } => ColumnError::TypeMismatch {
                column: name.to_string(),
                expected,
                found,
            },
        })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.value(name).is_some()
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(name, _)| name.as_str())
    }

    pub fn columns(&self) -> &[(String, Value)] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// Lists column names and types only; values never reach logs or error messages
impl fmt::Debug for Row {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut row = f.debug_struct("Row");
        for (name, value) in &self.columns {
            row.field(name, &format_args!("{}", value.type_name()));
        }
        row.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user_row() -> Row {
        Row::from_pairs([
            ("id", Value::from("u1")),
            ("password", Value::from("p")),
            ("age", Value::Null),
        ])
    }

    #[test]
    fn test_get_typed_column() {
        let row = user_row();
        assert_eq!(row.get::<String>("id").unwrap(), "u1");
        assert_eq!(row.get::<Option<String>>("password").unwrap(), Some("p".into()));
    }

    #[test]
    fn test_get_missing_column() {
        let err = user_row().get::<String>("email").unwrap_err();
        assert_eq!(err, ColumnError::Missing("email".into()));
    }

    #[test]
    fn test_null_column() {
        let row = user_row();
        assert_eq!(row.get::<Option<i32>>("age").unwrap(), None);
        assert_eq!(
            row.get::<i32>("age").unwrap_err(),
            ColumnError::UnexpectedNull("age".into())
        );
    }

    #[test]
    fn test_type_mismatch() {
        let err = user_row().get::<i64>("id").unwrap_err();
        assert_eq!(
            err,
            ColumnError::TypeMismatch {
                column: "id".into(),
                expected: "bigint",
                found: "text",
            }
        );
        assert_eq!(err.to_string(), "Column 'id' holds text, expected bigint");
    }

    #[test]
    fn test_debug_rendering_hides_values() {
        let rendered = format!("{:?}", user_row());
        assert_eq!(rendered, "Row { id: text, password: text, age: null }");
        assert!(!rendered.contains("u1"));
    }

    #[test]
    fn test_uuid_reads_timeuuid_column() {
        let id = Uuid::new_v4();
        let row = Row::from_pairs([("created", Value::Timeuuid(id)), ("n", Value::Int(1))]);
        assert_eq!(row.get::<Uuid>("created").unwrap(), id);
        assert_eq!(
            row.get::<Uuid>("n").unwrap_err().to_string(),
            "Column 'n' holds int, expected uuid"
        );
    }

    #[test]
    fn test_unsupported_column_fails_only_when_read() {
        let row = Row::from_pairs([
            ("id", Value::from("u1")),
            ("ttl", Value::Unsupported("Duration(1mo)".into())),
        ]);
        assert_eq!(row.get::<String>("id").unwrap(), "u1");
        assert_eq!(
            row.get::<i64>("ttl").unwrap_err().to_string(),
            "Column 'ttl' holds unsupported, expected bigint"
        );
    }

    #[test]
    fn test_option_into_value() {
        assert_eq!(Value::from(None::<i32>), Value::Null);
        assert_eq!(Value::from(Some(7)), Value::Int(7));
    }
}
