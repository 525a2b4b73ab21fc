use repository::{BoxError, Row};
use serde::{Deserialize, Serialize};

/// User entity - matches the `id text PRIMARY KEY, password text` table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier
    pub id: String,
    /// Never exposed when serialized
    #[serde(skip_serializing)]
    pub password: String,
}

impl User {
    pub fn new(id: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            password: password.into(),
        }
    }

    /// Row transformer for the users table
    pub fn from_row(row: &Row) -> Result<Self, BoxError> {
        Ok(Self {
            id: row.get("id")?,
            password: row.get("password")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use repository::Value;

    #[test]
    fn test_from_row() {
        let row = Row::from_pairs([("id", Value::from("u1")), ("password", Value::from("p"))]);
        assert_eq!(User::from_row(&row).unwrap(), User::new("u1", "p"));
    }

    #[test]
    fn test_from_row_null_password_is_rejected() {
        let row = Row::from_pairs([("id", Value::from("u1")), ("password", Value::Null)]);
        let err = User::from_row(&row).unwrap_err();
        assert_eq!(err.to_string(), "Column 'password' is null");
    }

    #[test]
    fn test_password_is_not_serialized() {
        let json = serde_json::to_value(User::new("u1", "secret")).unwrap();
        assert_eq!(json, serde_json::json!({ "id": "u1" }));
    }
}
