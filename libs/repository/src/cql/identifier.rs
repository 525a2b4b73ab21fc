use std::fmt;

/// Keywords that cannot be used unquoted as identifiers
const RESERVED_KEYWORDS: &[&str] = &[
    "add", "allow", "alter", "and", "apply", "asc", "authorize", "batch", "begin", "by",
    "columnfamily", "create", "delete", "desc", "describe", "drop", "entries", "execute", "from",
    "full", "grant", "if", "in", "index", "infinity", "insert", "into", "is", "keyspace", "limit",
    "materialized", "mbean", "mbeans", "modify", "nan", "norecursive", "not", "null", "of", "on",
    "or", "order", "primary", "rename", "replace", "revoke", "schema", "select", "set", "table",
    "to", "token", "truncate", "unlogged", "unset", "update", "use", "using", "view", "where",
    "with",
];

/// A CQL identifier (keyspace, table or column name)
///
/// The internal form is the exact name stored by the database. Unquoted CQL input is
/// case-insensitive and folded to lower case; quoted input is kept verbatim.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Identifier {
    internal: String,
}

impl Identifier {
    /// Build an identifier from its CQL form (`users`, `"MixedCase"`)
    pub fn from_cql(cql: &str) -> Self {
        let cql = cql.trim();
        let internal = match cql.strip_prefix('"').and_then(|s| s.strip_suffix('"')) {
            Some(quoted) => quoted.replace("\"\"", "\""),
            None => cql.to_lowercase(),
        };
        Self { internal }
    }

    /// Build an identifier from the exact name stored by the database
    pub fn from_internal(internal: impl Into<String>) -> Self {
        Self {
            internal: internal.into(),
        }
    }

    pub fn as_internal(&self) -> &str {
        &self.internal
    }

    /// Render the identifier for a CQL statement, quoting it when needed
    pub fn as_cql(&self) -> String {
        if needs_quotes(&self.internal) {
            format!("\"{}\"", self.internal.replace('"', "\"\""))
        } else {
            self.internal.clone()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.internal.is_empty()
    }
}

fn needs_quotes(name: &str) -> bool {
    let mut chars = name.chars();
    let starts_plain = matches!(chars.next(), Some(c) if c.is_ascii_lowercase());
    !starts_plain
        || !chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
        || RESERVED_KEYWORDS.contains(&name)
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_cql())
    }
}

impl From<&str> for Identifier {
    fn from(cql: &str) -> Self {
        Self::from_cql(cql)
    }
}

impl From<String> for Identifier {
    fn from(cql: String) -> Self {
        Self::from_cql(&cql)
    }
}

impl From<&Identifier> for Identifier {
    fn from(identifier: &Identifier) -> Self {
        identifier.clone()
    }
}
