use std::fmt;

/// Boxed error used for causes coming from collaborators (drivers, row transformers)
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Error taxonomy for repository operations
///
/// Every variant describes an invariant violation rather than expected control flow:
/// infrastructure failures (`SessionOperation`), mapping failures (`RowTransformation`)
/// and business outcomes (`OperationNotApplied`) stay distinguishable.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    /// Session acquisition failed, or the driver failed while preparing, binding or
    /// executing a statement
    #[error("{message}")]
    SessionOperation {
        message: String,
        #[source]
        source: BoxError,
    },

    /// The row transformer could not convert a row into a domain value
    #[error("Failed to transform row {row}.")]
    RowTransformation {
        row: String,
        #[source]
        source: BoxError,
    },

    /// A write completed without error but the database reports it was not applied
    #[error("Operation not applied: {0}")]
    OperationNotApplied(String),

    /// Keyspace or table name rejected at construction
    #[error("Invalid repository identity: {0}")]
    InvalidIdentity(String),
}

impl RepositoryError {
    pub fn session_operation(message: impl Into<String>, cause: impl Into<BoxError>) -> Self {
        Self::SessionOperation {
            message: message.into(),
            source: cause.into(),
        }
    }

    pub fn not_applied(message: impl Into<String>) -> Self {
        Self::OperationNotApplied(message.into())
    }

    pub fn is_session_operation(&self) -> bool {
        matches!(self, Self::SessionOperation { .. })
    }

    pub fn is_row_transformation(&self) -> bool {
        matches!(self, Self::RowTransformation { .. })
    }

    pub fn is_not_applied(&self) -> bool {
        matches!(self, Self::OperationNotApplied(_))
    }
}

impl From<DriverError> for RepositoryError {
    fn from(err: DriverError) -> Self {
        Self::session_operation("Failed to execute session operation", err)
    }
}

/// Result type alias for repository operations
pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Failure reported by a session provider or a session
///
/// Driver specific errors are boxed here so they never leak through the
/// repository API with their concrete types.
#[derive(Debug)]
pub struct DriverError {
    message: String,
    source: Option<BoxError>,
}

impl DriverError {
    pub fn new(cause: impl Into<BoxError>) -> Self {
        let source = cause.into();
        Self {
            message: source.to_string(),
            source: Some(source),
        }
    }

    pub fn msg(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    pub fn with_context(message: impl Into<String>, cause: impl Into<BoxError>) -> Self {
        Self {
            message: message.into(),
            source: Some(cause.into()),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for DriverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for DriverError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|source| source.as_ref() as &(dyn std::error::Error + 'static))
    }
}
