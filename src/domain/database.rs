//! Connection-string classification.
//!
//! A `DATABASE_URL` starting with `sqlite` selects the embedded engine and
//! skips every network wait. Anything else is treated as a networked
//! relational database reachable through the readiness endpoint.

use std::fmt;
use std::path::PathBuf;

use crate::error::ConfigError;

/// Where the application's database lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatabaseTarget {
    /// Single-file (or in-memory) SQLite database.
    Embedded(EmbeddedDatabase),
    /// Database served over the network.
    Networked { url: String },
}

/// Location of an embedded SQLite database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmbeddedDatabase {
    File(PathBuf),
    Memory,
}

impl EmbeddedDatabase {
    /// Connection string accepted by diesel's `SqliteConnection`.
    #[must_use]
    pub fn connection_string(&self) -> String {
        match self {
            Self::File(path) => path.to_string_lossy().into_owned(),
            Self::Memory => ":memory:".to_string(),
        }
    }
}

impl DatabaseTarget {
    /// Classify a `DATABASE_URL` value.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the value is blank, a sqlite URL has
    /// no path, or the scheme is a sqlite variant other than `sqlite:` and
    /// `sqlite3:`.
    pub fn parse(raw: &str) -> Result<Self, ConfigError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(ConfigError::MissingField {
                field: "DATABASE_URL",
            });
        }

        let scheme = raw.split_once(':').map_or(raw, |(scheme, _)| scheme);
        match scheme {
            "sqlite" | "sqlite3" => {}
            other if other.starts_with("sqlite") => {
                return Err(ConfigError::InvalidValue {
                    field: "DATABASE_URL",
                    reason: format!("unsupported sqlite scheme `{other}:`; use sqlite:"),
                })
            }
            _ => {
                return Ok(Self::Networked {
                    url: raw.to_string(),
                })
            }
        }

        let rest = raw.get(scheme.len() + 1..).unwrap_or("");
        let rest = rest.strip_prefix("//").unwrap_or(rest);

        let embedded = match rest {
            ":memory:" => EmbeddedDatabase::Memory,
            "" => {
                return Err(ConfigError::InvalidValue {
                    field: "DATABASE_URL",
                    reason: format!("sqlite URL `{raw}` has no database path"),
                })
            }
            path => EmbeddedDatabase::File(PathBuf::from(path)),
        };

        Ok(Self::Embedded(embedded))
    }

    /// True for the embedded fast path.
    #[must_use]
    pub fn is_embedded(&self) -> bool {
        matches!(self, Self::Embedded(_))
    }

    /// URL scheme, for diagnostics.
    #[must_use]
    pub fn scheme(&self) -> &str {
        match self {
            Self::Embedded(_) => "sqlite",
            Self::Networked { url } => url.split_once("://").map_or("unknown", |(s, _)| s),
        }
    }
}

impl fmt::Display for DatabaseTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Embedded(db) => write!(f, "sqlite:{}", db.connection_string()),
            Self::Networked { url } => f.write_str(&redact_password(url)),
        }
    }
}

/// Mask the password component of a URL for logging.
#[must_use]
pub fn redact_password(raw: &str) -> String {
    match url::Url::parse(raw) {
        Ok(mut parsed) if parsed.password().is_some() => {
            let _ = parsed.set_password(Some("****"));
            parsed.to_string()
        }
        _ => raw.to_string(),
    }
}

/// Host and port probed for readiness.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Endpoint {
    pub host: String,
    pub port: u16,
}

impl Endpoint {
    #[must_use]
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}
