use repository::{DriverError, RepositoryError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum UserError {
    #[error("User not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl UserError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, UserError::NotFound(_))
    }

    /// A conditional write was refused by the database
    pub fn is_not_applied(&self) -> bool {
        matches!(self, UserError::Repository(err) if err.is_not_applied())
    }
}

impl From<DriverError> for UserError {
    fn from(err: DriverError) -> Self {
        UserError::Repository(err.into())
    }
}

pub type UserResult<T> = Result<T, UserError>;
