use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveTime, TimeDelta, Timelike};
use scylla::response::query_result::{IntoRowsResultError, QueryResult};
use scylla::statement::prepared::PreparedStatement;
use scylla::value::{
    CqlDate, CqlDecimal, CqlTime, CqlTimestamp, CqlTimeuuid, CqlValue, CqlVarint,
};
use tracing::trace;
use uuid::Uuid;

use super::{CassandraConfig, CassandraError, CassandraSession, connect_from_config};
use crate::cql::Statement;
use crate::error::DriverError;
use crate::row::{Row, Value};
use crate::session::{CqlSession, ResultSet, SessionProvider};

/// Column the database adds to the result of a conditional write
const APPLIED_COLUMN: &str = "[applied]";

/// Hands out one [`ScyllaSession`] per repository operation over a shared driver session
#[derive(Clone)]
pub struct ScyllaSessionProvider {
    session: CassandraSession,
}

impl ScyllaSessionProvider {
    pub fn new(session: CassandraSession) -> Self {
        Self { session }
    }

    pub async fn connect(config: &CassandraConfig) -> Result<Self, CassandraError> {
        Ok(Self::new(connect_from_config(config).await?))
    }
}

#[async_trait]
impl SessionProvider for ScyllaSessionProvider {
    type Session = ScyllaSession;

    async fn provide_session(&self) -> Result<ScyllaSession, DriverError> {
        Ok(ScyllaSession {
            session: self.session.clone(),
        })
    }
}

/// Lease on the shared driver session, held by a single operation
pub struct ScyllaSession {
    session: CassandraSession,
}

#[async_trait]
impl CqlSession for ScyllaSession {
    type Row = Row;
    type Prepared = PreparedStatement;

    async fn execute(&self, statement: &Statement) -> Result<ResultSet<Row>, DriverError> {
        trace!(cql = %statement, "Executing statement");
        let result = self
            .session
            .query_unpaged(statement.as_cql(), &[])
            .await
            .map_err(|e| DriverError::with_context(format!("Failed to execute {statement}"), e))?;
        into_result_set(result)
    }

    async fn prepare(&self, statement: &Statement) -> Result<PreparedStatement, DriverError> {
        trace!(cql = %statement, "Preparing statement");
        self.session
            .prepare(statement.as_cql())
            .await
            .map_err(|e| DriverError::with_context(format!("Failed to prepare {statement}"), e))
    }

    async fn execute_prepared(
        &self,
        prepared: &PreparedStatement,
        values: &[Value],
    ) -> Result<ResultSet<Row>, DriverError> {
        let bound = values
            .iter()
            .map(to_cql_value)
            .collect::<Result<Vec<_>, _>>()?;
        let result = self
            .session
            .execute_unpaged(prepared, bound)
            .await
            .map_err(|e| {
                DriverError::with_context(
                    format!("Failed to execute {}", prepared.get_statement()),
                    e,
                )
            })?;
        into_result_set(result)
    }
}

fn into_result_set(result: QueryResult) -> Result<ResultSet<Row>, DriverError> {
    let rows_result = match result.into_rows_result() {
        Ok(rows_result) => rows_result,
        Err(IntoRowsResultError::ResultNotRows(_)) => return Ok(ResultSet::applied()),
        Err(e) => return Err(DriverError::with_context("Failed to read result", e)),
    };

    let names: Vec<String> = rows_result
        .column_specs()
        .iter()
        .map(|spec| spec.name().to_string())
        .collect();
    let rows = rows_result
        .rows::<scylla::value::Row>()
        .map_err(|e| DriverError::with_context("Failed to read rows", e))?
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| DriverError::with_context("Failed to deserialize row", e))?;

    Ok(to_result_set(&names, rows))
}

/// Decide the outcome from the raw rows, then convert every column
///
/// Column conversion never fails: values the row model cannot represent become
/// [`Value::Unsupported`] and are left to the row transformer.
fn to_result_set(names: &[String], rows: Vec<scylla::value::Row>) -> ResultSet<Row> {
    let applied = was_applied(names, rows.first());
    let rows = rows
        .into_iter()
        .map(|row| {
            Row::new(
                names
                    .iter()
                    .cloned()
                    .zip(row.columns.into_iter().map(from_cql_value))
                    .collect(),
            )
        })
        .collect();
    ResultSet::new(applied, rows)
}

/// Conditional writes report their outcome in the `[applied]` column of the first row
fn was_applied(names: &[String], first: Option<&scylla::value::Row>) -> bool {
    let applied = names
        .iter()
        .position(|name| name == APPLIED_COLUMN)
        .and_then(|index| first?.columns.get(index));
    !matches!(applied, Some(Some(CqlValue::Boolean(false))))
}

fn to_cql_value(value: &Value) -> Result<Option<CqlValue>, DriverError> {
    let cql = match value {
        Value::Null => return Ok(None),
        Value::Text(v) => CqlValue::Text(v.clone()),
        Value::Int(v) => CqlValue::Int(*v),
        Value::BigInt(v) => CqlValue::BigInt(*v),
        Value::Varint(v) => CqlValue::Varint(CqlVarint::from_signed_bytes_be(v.clone())),
        Value::Decimal { unscaled, scale } => CqlValue::Decimal(
            CqlDecimal::from_signed_be_bytes_and_exponent(unscaled.clone(), *scale),
        ),
        Value::Boolean(v) => CqlValue::Boolean(*v),
        Value::Double(v) => CqlValue::Double(*v),
        Value::Float(v) => CqlValue::Float(*v),
        Value::Uuid(v) => CqlValue::Uuid(*v),
        Value::Timeuuid(v) => CqlValue::Timeuuid(CqlTimeuuid::from(*v)),
        Value::Timestamp(v) => CqlValue::Timestamp(CqlTimestamp(v.timestamp_millis())),
        Value::Date(v) => CqlValue::Date(to_cql_date(*v)?),
        Value::Time(v) => CqlValue::Time(to_cql_time(*v)),
        Value::Inet(v) => CqlValue::Inet(*v),
        Value::Blob(v) => CqlValue::Blob(v.clone()),
        Value::List(items) => CqlValue::List(
            items
                .iter()
                .map(to_collection_element)
                .collect::<Result<_, _>>()?,
        ),
        Value::Map(entries) => CqlValue::Map(
            entries
                .iter()
                .map(|(key, value)| Ok((to_collection_element(key)?, to_collection_element(value)?)))
                .collect::<Result<_, DriverError>>()?,
        ),
        Value::Tuple(items) => CqlValue::Tuple(
            items
                .iter()
                .map(to_cql_value)
                .collect::<Result<_, _>>()?,
        ),
        Value::Unsupported(rendered) => {
            return Err(DriverError::msg(format!(
                "Cannot bind unsupported value {rendered}"
            )));
        }
    };
    Ok(Some(cql))
}

fn to_collection_element(value: &Value) -> Result<CqlValue, DriverError> {
    to_cql_value(value)?.ok_or_else(|| DriverError::msg("Collections cannot contain null values"))
}

fn from_cql_value(value: Option<CqlValue>) -> Value {
    let Some(value) = value else {
        return Value::Null;
    };
    match value {
        CqlValue::Empty => Value::Null,
        CqlValue::Ascii(v) | CqlValue::Text(v) => Value::Text(v),
        CqlValue::Int(v) => Value::Int(v),
        CqlValue::SmallInt(v) => Value::Int(i32::from(v)),
        CqlValue::TinyInt(v) => Value::Int(i32::from(v)),
        CqlValue::BigInt(v) => Value::BigInt(v),
        CqlValue::Counter(v) => Value::BigInt(v.0),
        CqlValue::Varint(v) => Value::Varint(v.as_signed_bytes_be_slice().to_vec()),
        CqlValue::Decimal(v) => {
            let (unscaled, scale) = v.as_signed_be_bytes_slice_and_exponent();
            Value::Decimal {
                unscaled: unscaled.to_vec(),
                scale,
            }
        }
        CqlValue::Boolean(v) => Value::Boolean(v),
        CqlValue::Double(v) => Value::Double(v),
        CqlValue::Float(v) => Value::Float(v),
        CqlValue::Uuid(v) => Value::Uuid(v),
        CqlValue::Timeuuid(v) => Value::Timeuuid(Uuid::from(v)),
        CqlValue::Timestamp(CqlTimestamp(millis)) => DateTime::from_timestamp_millis(millis)
            .map_or_else(|| unsupported(format!("Timestamp({millis})")), Value::Timestamp),
        CqlValue::Date(CqlDate(days)) => {
            from_cql_date(days).map_or_else(|| unsupported(format!("Date({days})")), Value::Date)
        }
        CqlValue::Time(CqlTime(nanos)) => {
            from_cql_time(nanos).map_or_else(|| unsupported(format!("Time({nanos})")), Value::Time)
        }
        CqlValue::Inet(v) => Value::Inet(v),
        CqlValue::Blob(v) => Value::Blob(v),
        CqlValue::List(items) | CqlValue::Set(items) => {
            Value::List(items.into_iter().map(|item| from_cql_value(Some(item))).collect())
        }
        CqlValue::Map(entries) => Value::Map(
            entries
                .into_iter()
                .map(|(key, value)| (from_cql_value(Some(key)), from_cql_value(Some(value))))
                .collect(),
        ),
        CqlValue::Tuple(items) => Value::Tuple(items.into_iter().map(from_cql_value).collect()),
        other => unsupported(format!("{other:?}")),
    }
}

fn unsupported(rendered: String) -> Value {
    Value::Unsupported(rendered)
}

/// `date` is days since the epoch, shifted so the epoch is 2^31
const DATE_EPOCH_OFFSET: i64 = 1 << 31;
const NANOS_PER_SECOND: i64 = 1_000_000_000;

fn epoch() -> NaiveDate {
    DateTime::UNIX_EPOCH.date_naive()
}

fn from_cql_date(days: u32) -> Option<NaiveDate> {
    epoch().checked_add_signed(TimeDelta::try_days(i64::from(days) - DATE_EPOCH_OFFSET)?)
}

fn to_cql_date(date: NaiveDate) -> Result<CqlDate, DriverError> {
    let days = (date - epoch()).num_days() + DATE_EPOCH_OFFSET;
    u32::try_from(days)
        .map(CqlDate)
        .map_err(|_| DriverError::msg(format!("Date {date} is out of range")))
}

fn from_cql_time(nanos_since_midnight: i64) -> Option<NaiveTime> {
    let secs = u32::try_from(nanos_since_midnight.div_euclid(NANOS_PER_SECOND)).ok()?;
    let nanos = u32::try_from(nanos_since_midnight.rem_euclid(NANOS_PER_SECOND)).ok()?;
    NaiveTime::from_num_seconds_from_midnight_opt(secs, nanos)
}

fn to_cql_time(time: NaiveTime) -> CqlTime {
    CqlTime(
        i64::from(time.num_seconds_from_midnight()) * NANOS_PER_SECOND
            + i64::from(time.nanosecond()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn raw_row(columns: Vec<Option<CqlValue>>) -> scylla::value::Row {
        scylla::value::Row { columns }
    }

    fn names(names: &[&str]) -> Vec<String> {
        names.iter().map(|name| name.to_string()).collect()
    }

    #[test]
    fn test_values_bind_as_cql_values() {
        let id = Uuid::new_v4();
        assert_eq!(
            to_cql_value(&Value::from("u1")).unwrap(),
            Some(CqlValue::Text("u1".into()))
        );
        assert_eq!(to_cql_value(&Value::from(id)).unwrap(), Some(CqlValue::Uuid(id)));
        assert_eq!(
            to_cql_value(&Value::Timeuuid(id)).unwrap(),
            Some(CqlValue::Timeuuid(CqlTimeuuid::from(id)))
        );
        assert_eq!(to_cql_value(&Value::Null).unwrap(), None);
        assert!(to_cql_value(&Value::List(vec![Value::Null])).is_err());
        assert!(to_cql_value(&Value::Unsupported("Duration".into())).is_err());
    }

    #[test]
    fn test_timestamps_keep_millisecond_precision() {
        let at = Utc.timestamp_millis_opt(1_700_000_000_123).unwrap();
        let bound = to_cql_value(&Value::from(at)).unwrap();
        assert_eq!(bound, Some(CqlValue::Timestamp(CqlTimestamp(1_700_000_000_123))));
        assert_eq!(from_cql_value(bound), Value::Timestamp(at));
    }

    #[test]
    fn test_dates_and_times_round_trip_through_driver_encoding() {
        let date = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
        let time = NaiveTime::from_hms_nano_opt(23, 59, 59, 999_999_999).unwrap();

        assert_eq!(to_cql_date(epoch()).unwrap(), CqlDate(1 << 31));
        assert_eq!(from_cql_value(Some(CqlValue::Date(to_cql_date(date).unwrap()))), Value::Date(date));
        assert_eq!(from_cql_value(Some(CqlValue::Time(to_cql_time(time)))), Value::Time(time));
        assert!(matches!(
            from_cql_value(Some(CqlValue::Time(CqlTime(-1)))),
            Value::Unsupported(_)
        ));
    }

    #[test]
    fn test_driver_values_are_read_into_values() {
        let id = Uuid::new_v4();
        assert_eq!(from_cql_value(None), Value::Null);
        assert_eq!(from_cql_value(Some(CqlValue::SmallInt(7))), Value::Int(7));
        assert_eq!(
            from_cql_value(Some(CqlValue::Set(vec![CqlValue::Text("a".into())]))),
            Value::List(vec![Value::from("a")])
        );
        assert_eq!(
            from_cql_value(Some(CqlValue::Timeuuid(CqlTimeuuid::from(id)))),
            Value::Timeuuid(id)
        );
        assert_eq!(
            from_cql_value(Some(CqlValue::Map(vec![(
                CqlValue::Text("color".into()),
                CqlValue::Int(3)
            )]))),
            Value::Map(vec![(Value::from("color"), Value::Int(3))])
        );
        assert_eq!(
            from_cql_value(Some(CqlValue::Tuple(vec![Some(CqlValue::Int(1)), None]))),
            Value::Tuple(vec![Value::Int(1), Value::Null])
        );
        assert_eq!(
            from_cql_value(Some(CqlValue::Varint(CqlVarint::from_signed_bytes_be(vec![0x01, 0x00])))),
            Value::Varint(vec![0x01, 0x00])
        );
    }

    #[test]
    fn test_unknown_driver_types_stay_in_the_row() {
        let names = names(&["id", "attrs"]);
        let duration = CqlValue::Duration(scylla::value::CqlDuration {
            months: 1,
            days: 0,
            nanoseconds: 0,
        });
        let result = to_result_set(
            &names,
            vec![raw_row(vec![Some(CqlValue::Text("u1".into())), Some(duration)])],
        );

        let row = result.one().unwrap();
        assert_eq!(row.get::<String>("id").unwrap(), "u1");
        assert!(matches!(row.value("attrs"), Some(Value::Unsupported(_))));
    }

    #[test]
    fn test_refused_write_with_timeuuid_column_is_not_applied() {
        let created = Uuid::new_v4();
        let names = names(&[APPLIED_COLUMN, "id", "created"]);
        let result = to_result_set(
            &names,
            vec![raw_row(vec![
                Some(CqlValue::Boolean(false)),
                Some(CqlValue::Text("u1".into())),
                Some(CqlValue::Timeuuid(CqlTimeuuid::from(created))),
            ])],
        );

        assert!(!result.was_applied());
        let existing = result.one().unwrap();
        assert_eq!(existing.get::<Uuid>("created").unwrap(), created);
    }

    #[test]
    fn test_applied_column_decides_outcome() {
        let names = names(&[APPLIED_COLUMN, "id"]);
        let refused = raw_row(vec![Some(CqlValue::Boolean(false)), None]);
        let accepted = raw_row(vec![Some(CqlValue::Boolean(true)), None]);
        let plain = raw_row(vec![Some(CqlValue::Text("u1".into()))]);

        assert!(!was_applied(&names, Some(&refused)));
        assert!(was_applied(&names, Some(&accepted)));
        assert!(was_applied(&names[1..], Some(&plain)));
        assert!(was_applied(&names, None));
    }
}
