use std::fmt;
use std::time::Duration;

#[cfg(feature = "config")]
use core_config::{ConfigError, FromEnv, env_list, env_parse};

const DEFAULT_CONTACT_POINT: &str = "127.0.0.1:9042";
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Plain-text authenticator credentials; the password never appears in `Debug`
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    pub fn password(&self) -> &str {
        &self.password
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Cluster settings for the Scylla/Cassandra session provider
///
/// ```ignore
/// use repository::cassandra::CassandraConfig;
///
/// let config = CassandraConfig::new(["10.0.0.1:9042", "10.0.0.2:9042"])
///     .with_keyspace("games")
///     .with_datacenter("dc1")
///     .with_credentials("cassandra", "cassandra");
///
/// // or, with the `config` feature
/// let config = CassandraConfig::from_env()?;
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CassandraConfig {
    /// `host:port` nodes used to discover the cluster
    pub contact_points: Vec<String>,

    /// Keyspace repositories bind to when none is given explicitly
    pub keyspace: Option<String>,

    /// Datacenter preferred by the load balancing policy
    pub datacenter: Option<String>,

    pub credentials: Option<Credentials>,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,

    /// SimpleStrategy factor for keyspaces created on first use
    pub replication_factor: u32,
}

impl CassandraConfig {
    pub fn new<I, S>(contact_points: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            contact_points: contact_points.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    pub fn with_keyspace(mut self, keyspace: impl Into<String>) -> Self {
        self.keyspace = Some(keyspace.into());
        self
    }

    pub fn with_datacenter(mut self, datacenter: impl Into<String>) -> Self {
        self.datacenter = Some(datacenter.into());
        self
    }

    pub fn with_credentials(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.credentials = Some(Credentials::new(username, password));
        self
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_replication_factor(mut self, replication_factor: u32) -> Self {
        self.replication_factor = replication_factor;
        self
    }

    pub fn keyspace(&self) -> Option<&str> {
        self.keyspace.as_deref()
    }
}

impl Default for CassandraConfig {
    fn default() -> Self {
        Self {
            contact_points: vec![DEFAULT_CONTACT_POINT.to_string()],
            keyspace: None,
            datacenter: None,
            credentials: None,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            replication_factor: 1,
        }
    }
}

/// Reads:
///
/// - `CASSANDRA_CONTACT_POINTS` (required, comma separated)
/// - `CASSANDRA_KEYSPACE`, `CASSANDRA_DATACENTER`
/// - `CASSANDRA_USERNAME` and `CASSANDRA_PASSWORD`, both or neither
/// - `CASSANDRA_CONNECT_TIMEOUT_SECS` (10), `CASSANDRA_REQUEST_TIMEOUT_SECS` (30)
/// - `CASSANDRA_REPLICATION_FACTOR` (1)
#[cfg(feature = "config")]
impl FromEnv for CassandraConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let contact_points = env_list("CASSANDRA_CONTACT_POINTS")?;
        if contact_points.is_empty() {
            return Err(ConfigError::ParseError {
                key: "CASSANDRA_CONTACT_POINTS".to_string(),
                details: "expected at least one host:port".to_string(),
            });
        }

        let credentials = match (
            std::env::var("CASSANDRA_USERNAME").ok(),
            std::env::var("CASSANDRA_PASSWORD").ok(),
        ) {
            (Some(username), Some(password)) => Some(Credentials::new(username, password)),
            (None, None) => None,
            (Some(_), None) => {
                return Err(ConfigError::MissingEnvVar("CASSANDRA_PASSWORD".to_string()));
            }
            (None, Some(_)) => {
                return Err(ConfigError::MissingEnvVar("CASSANDRA_USERNAME".to_string()));
            }
        };

        Ok(Self {
            contact_points,
            keyspace: std::env::var("CASSANDRA_KEYSPACE").ok(),
            datacenter: std::env::var("CASSANDRA_DATACENTER").ok(),
            credentials,
            connect_timeout: Duration::from_secs(env_parse(
                "CASSANDRA_CONNECT_TIMEOUT_SECS",
                DEFAULT_CONNECT_TIMEOUT.as_secs(),
            )?),
            request_timeout: Duration::from_secs(env_parse(
                "CASSANDRA_REQUEST_TIMEOUT_SECS",
                DEFAULT_REQUEST_TIMEOUT.as_secs(),
            )?),
            replication_factor: env_parse("CASSANDRA_REPLICATION_FACTOR", 1)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_keeps_defaults_for_everything_but_nodes() {
        let config = CassandraConfig::new(["10.0.0.1:9042"]);

        assert_eq!(config.contact_points, vec!["10.0.0.1:9042"]);
        assert_eq!(
            config,
            CassandraConfig {
                contact_points: vec!["10.0.0.1:9042".to_string()],
                ..CassandraConfig::default()
            }
        );
        assert_eq!(config.connect_timeout, Duration::from_secs(10));
        assert_eq!(config.request_timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_builder_setters() {
        let config = CassandraConfig::default()
            .with_keyspace("games")
            .with_datacenter("dc1")
            .with_credentials("user", "pass")
            .with_request_timeout(Duration::from_secs(5))
            .with_replication_factor(3);

        assert_eq!(config.keyspace(), Some("games"));
        assert_eq!(config.datacenter.as_deref(), Some("dc1"));
        assert_eq!(config.credentials, Some(Credentials::new("user", "pass")));
        assert_eq!(config.request_timeout, Duration::from_secs(5));
        assert_eq!(config.replication_factor, 3);
    }

    #[test]
    fn test_debug_hides_password() {
        let config = CassandraConfig::default().with_credentials("admin", "hunter2");
        let rendered = format!("{config:?}");

        assert!(rendered.contains("admin"));
        assert!(!rendered.contains("hunter2"));
    }

    #[cfg(feature = "config")]
    mod from_env {
        use super::*;

        const UNSET: [(&str, Option<&str>); 7] = [
            ("CASSANDRA_KEYSPACE", None),
            ("CASSANDRA_DATACENTER", None),
            ("CASSANDRA_USERNAME", None),
            ("CASSANDRA_PASSWORD", None),
            ("CASSANDRA_CONNECT_TIMEOUT_SECS", None),
            ("CASSANDRA_REQUEST_TIMEOUT_SECS", None),
            ("CASSANDRA_REPLICATION_FACTOR", None),
        ];

        fn with_env<R>(vars: &[(&str, Option<&str>)], check: impl FnOnce() -> R) -> R {
            let mut all: Vec<(&str, Option<&str>)> = UNSET.to_vec();
            all.extend_from_slice(vars);
            temp_env::with_vars(all, check)
        }

        #[test]
        fn test_reads_nodes_and_overrides() {
            with_env(
                &[
                    ("CASSANDRA_CONTACT_POINTS", Some("10.0.0.1:9042, 10.0.0.2:9042")),
                    ("CASSANDRA_KEYSPACE", Some("games")),
                    ("CASSANDRA_REPLICATION_FACTOR", Some("3")),
                    ("CASSANDRA_REQUEST_TIMEOUT_SECS", Some("5")),
                ],
                || {
                    let config = CassandraConfig::from_env().unwrap();
                    assert_eq!(config.contact_points, vec!["10.0.0.1:9042", "10.0.0.2:9042"]);
                    assert_eq!(config.keyspace(), Some("games"));
                    assert_eq!(config.replication_factor, 3);
                    assert_eq!(config.request_timeout, Duration::from_secs(5));
                    assert_eq!(config.connect_timeout, Duration::from_secs(10));
                    assert!(config.credentials.is_none());
                },
            );
        }

        #[test]
        fn test_missing_contact_points() {
            with_env(&[("CASSANDRA_CONTACT_POINTS", None)], || {
                let err = CassandraConfig::from_env().unwrap_err();
                assert!(matches!(err, ConfigError::MissingEnvVar(ref key) if key == "CASSANDRA_CONTACT_POINTS"));
            });
        }

        #[test]
        fn test_blank_contact_points() {
            with_env(&[("CASSANDRA_CONTACT_POINTS", Some(" , "))], || {
                let err = CassandraConfig::from_env().unwrap_err();
                assert!(matches!(err, ConfigError::ParseError { .. }));
            });
        }

        #[test]
        fn test_username_without_password() {
            with_env(
                &[
                    ("CASSANDRA_CONTACT_POINTS", Some("10.0.0.1:9042")),
                    ("CASSANDRA_USERNAME", Some("admin")),
                ],
                || {
                    let err = CassandraConfig::from_env().unwrap_err();
                    assert!(matches!(err, ConfigError::MissingEnvVar(ref key) if key == "CASSANDRA_PASSWORD"));
                },
            );
        }

        #[test]
        fn test_invalid_replication_factor() {
            with_env(
                &[
                    ("CASSANDRA_CONTACT_POINTS", Some("10.0.0.1:9042")),
                    ("CASSANDRA_REPLICATION_FACTOR", Some("three")),
                ],
                || {
                    let err = CassandraConfig::from_env().unwrap_err();
                    assert!(err.to_string().contains("CASSANDRA_REPLICATION_FACTOR"));
                },
            );
        }
    }
}
