//! In-process session provider for repository tests
//!
//! [`StubSessionProvider`] hands out [`StubSession`]s that record every statement
//! they execute and answer with scripted results. A shared ledger counts acquired
//! and released sessions so tests can check that every session is released.

use async_trait::async_trait;
use repository::cql::Statement;
use repository::{CqlSession, DriverError, ResultSet, Row, SessionProvider, Value};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

/// A statement as it reached the stub, with its bound values
#[derive(Clone, Debug, PartialEq)]
pub struct ExecutedStatement {
    pub cql: String,
    pub values: Vec<Value>,
}

enum Response {
    Result(ResultSet<Row>),
    Error(String),
}

struct Rule {
    fragment: String,
    response: Response,
}

#[derive(Default)]
struct Ledger {
    acquired: AtomicUsize,
    released: AtomicUsize,
    connect_error: Mutex<Option<String>>,
    executed: Mutex<Vec<ExecutedStatement>>,
    rules: Mutex<VecDeque<Rule>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl Ledger {
    /// First scripted response whose fragment occurs in the CQL; consumed on use
    fn respond(&self, cql: &str) -> Result<ResultSet<Row>, DriverError> {
        let mut rules = lock(&self.rules);
        let Some(index) = rules.iter().position(|rule| cql.contains(&rule.fragment)) else {
            return Ok(ResultSet::applied());
        };
        match rules.remove(index).map(|rule| rule.response) {
            Some(Response::Error(message)) => Err(DriverError::msg(message)),
            Some(Response::Result(result)) => Ok(result),
            None => Ok(ResultSet::applied()),
        }
    }
}

/// Scriptable [`SessionProvider`]
///
/// Statements without a matching scripted response succeed with an empty,
/// applied result.
///
/// ```ignore
/// let provider = StubSessionProvider::new()
///     .with_rows("SELECT", vec![Row::from_pairs([("id", Value::from("u1"))])]);
/// ```
#[derive(Clone, Default)]
pub struct StubSessionProvider {
    ledger: Arc<Ledger>,
}

impl StubSessionProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every acquisition fails with `message`
    pub fn failing(message: impl Into<String>) -> Self {
        let provider = Self::new();
        *lock(&provider.ledger.connect_error) = Some(message.into());
        provider
    }

    /// Answer the next statement containing `fragment` with `result`
    pub fn with_result(self, fragment: impl Into<String>, result: ResultSet<Row>) -> Self {
        self.push(fragment, Response::Result(result));
        self
    }

    /// Answer the next statement containing `fragment` with applied `rows`
    pub fn with_rows(self, fragment: impl Into<String>, rows: Vec<Row>) -> Self {
        self.with_result(fragment, ResultSet::new(true, rows))
    }

    /// Answer the next statement containing `fragment` with `[applied]=false`
    pub fn with_not_applied(self, fragment: impl Into<String>) -> Self {
        let row = Row::from_pairs([("[applied]", Value::Boolean(false))]);
        self.with_result(fragment, ResultSet::not_applied(vec![row]))
    }

    /// Fail the next statement containing `fragment`
    pub fn with_error(self, fragment: impl Into<String>, message: impl Into<String>) -> Self {
        self.push(fragment, Response::Error(message.into()));
        self
    }

    fn push(&self, fragment: impl Into<String>, response: Response) {
        lock(&self.ledger.rules).push_back(Rule {
            fragment: fragment.into(),
            response,
        });
    }

    pub fn acquired(&self) -> usize {
        self.ledger.acquired.load(Ordering::SeqCst)
    }

    pub fn released(&self) -> usize {
        self.ledger.released.load(Ordering::SeqCst)
    }

    /// Sessions acquired but not yet released
    pub fn open_sessions(&self) -> usize {
        self.acquired() - self.released()
    }

    pub fn executed(&self) -> Vec<ExecutedStatement> {
        lock(&self.ledger.executed).clone()
    }

    pub fn executed_cql(&self) -> Vec<String> {
        self.executed().into_iter().map(|s| s.cql).collect()
    }
}

#[async_trait]
impl SessionProvider for StubSessionProvider {
    type Session = StubSession;

    async fn provide_session(&self) -> Result<StubSession, DriverError> {
        if let Some(message) = lock(&self.ledger.connect_error).clone() {
            return Err(DriverError::msg(message));
        }
        self.ledger.acquired.fetch_add(1, Ordering::SeqCst);
        Ok(StubSession {
            ledger: Arc::clone(&self.ledger),
        })
    }
}

/// Session handed out by [`StubSessionProvider`]; dropping it counts as a release
pub struct StubSession {
    ledger: Arc<Ledger>,
}

impl StubSession {
    fn record(&self, cql: &str, values: &[Value]) -> Result<ResultSet<Row>, DriverError> {
        lock(&self.ledger.executed).push(ExecutedStatement {
            cql: cql.to_string(),
            values: values.to_vec(),
        });
        self.ledger.respond(cql)
    }
}

impl Drop for StubSession {
    fn drop(&mut self) {
        self.ledger.released.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl CqlSession for StubSession {
    type Row = Row;
    type Prepared = Statement;

    async fn execute(&self, statement: &Statement) -> Result<ResultSet<Row>, DriverError> {
        self.record(statement.as_cql(), &[])
    }

    async fn prepare(&self, statement: &Statement) -> Result<Statement, DriverError> {
        Ok(statement.clone())
    }

    async fn execute_prepared(
        &self,
        prepared: &Statement,
        values: &[Value],
    ) -> Result<ResultSet<Row>, DriverError> {
        self.record(prepared.as_cql(), values)
    }
}
