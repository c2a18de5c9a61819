//! Application settings loading and validation.
//!
//! Tunables come from an optional TOML file named by `PROCMINE_CONFIG`;
//! every deployment variable is then read from the environment (after
//! `.env` has been loaded by the binary) and overrides the file. The
//! result is parsed and validated once, at startup, into [`Settings`].
//!
//! # Example
//!
//! ```no_run
//! use procmine::infrastructure::config::Settings;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let settings = Settings::load()?;
//!     settings.logging.init();
//!     Ok(())
//! }
//! ```

use std::fmt;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use super::logging::LoggingConfig;
use super::retry::{ClientConfig, ReadinessConfig};
use super::server::ServerConfig;
use crate::domain::{DatabaseTarget, Endpoint};
use crate::error::{ConfigError, Result};

pub const CONFIG_PATH_VAR: &str = "PROCMINE_CONFIG";
const DEFAULT_DB_HOST: &str = "db";
const DEFAULT_DB_PORT: u16 = 5432;
const DEFAULT_FALLBACK_HOST: &str = "127.0.0.1";
const DEFAULT_API_URL: &str = "http://localhost:8000";

/// Tunables read from the optional TOML file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FileConfig {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub readiness: ReadinessConfig,
    #[serde(default)]
    pub client: ClientConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

impl FileConfig {
    /// Parse configuration from TOML content.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML content is malformed.
    pub fn parse_toml(content: &str) -> std::result::Result<Self, ConfigError> {
        toml::from_str(content).map_err(ConfigError::Parse)
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load<P: AsRef<Path>>(path: P) -> std::result::Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadFile)?;
        Self::parse_toml(&content)
    }
}

/// A value that must never appear in logs.
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(****)")
    }
}

/// Credentials of a networked database, surfaced only in redacted form.
#[derive(Debug, Clone, Default)]
pub struct DatabaseCredentials {
    pub name: Option<String>,
    pub user: Option<String>,
    pub password: Option<Secret>,
}

/// Validated runtime settings shared by every subcommand.
#[derive(Debug, Clone)]
pub struct Settings {
    pub logging: LoggingConfig,
    /// Raw `DATABASE_URL`; parsed on demand by [`Settings::database_target`].
    pub database_url: Option<String>,
    pub db_host: String,
    pub db_port: u16,
    pub fallback_host: String,
    pub credentials: DatabaseCredentials,
    pub readiness: ReadinessConfig,
    pub migrate_command: Option<String>,
    pub secret_key: Option<Secret>,
    pub debug: bool,
    pub api_url: String,
    pub client: ClientConfig,
    pub server: ServerConfig,
    /// `BIND_ADDR`, overriding whichever listener the process runs.
    pub bind_override: Option<String>,
}

impl Settings {
    /// Load from `PROCMINE_CONFIG` (if set) and the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be read or parsed, or if
    /// an environment value is malformed.
    #[allow(clippy::result_large_err)]
    pub fn load() -> Result<Self> {
        let file = match std::env::var(CONFIG_PATH_VAR) {
            Ok(path) if !path.trim().is_empty() => FileConfig::load(path.trim())?,
            _ => FileConfig::default(),
        };
        Ok(Self::from_sources(file, |key| std::env::var(key).ok())?)
    }

    /// Merge file tunables with variables from `env`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] for malformed values.
    pub fn from_sources<F>(file: FileConfig, env: F) -> std::result::Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| env(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let mut readiness = file.readiness;
        if let Some(raw) = var("DB_WAIT_MAX_ATTEMPTS") {
            readiness.max_attempts = parse_number("DB_WAIT_MAX_ATTEMPTS", &raw)?;
        }
        if let Some(raw) = var("DB_WAIT_TIMEOUT_SECS") {
            readiness.deadline_secs = Some(parse_number("DB_WAIT_TIMEOUT_SECS", &raw)?);
        }

        let mut logging = file.logging;
        if let Some(format) = var("LOG_FORMAT") {
            logging.format = format;
        }

        let mut server = file.server;
        if let Some(dir) = var("MODELS_DIR") {
            server.models_dir = PathBuf::from(dir);
        }
        if let Some(dot) = var("GRAPHVIZ_DOT") {
            server.graphviz_dot = dot;
        }

        let settings = Self {
            logging,
            database_url: var("DATABASE_URL"),
            db_host: var("DB_HOST").unwrap_or_else(|| DEFAULT_DB_HOST.to_string()),
            db_port: match var("DB_PORT") {
                Some(raw) => parse_number("DB_PORT", &raw)?,
                None => DEFAULT_DB_PORT,
            },
            fallback_host: var("DB_FALLBACK_HOST")
                .unwrap_or_else(|| DEFAULT_FALLBACK_HOST.to_string()),
            credentials: DatabaseCredentials {
                name: var("POSTGRES_DB"),
                user: var("POSTGRES_USER"),
                password: var("POSTGRES_PASSWORD").map(Secret::new),
            },
            readiness,
            migrate_command: var("MIGRATE_COMMAND"),
            secret_key: var("SECRET_KEY").map(Secret::new),
            debug: match var("DEBUG") {
                Some(raw) => parse_flag("DEBUG", &raw)?,
                None => false,
            },
            api_url: var("API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            client: file.client,
            server,
            bind_override: var("BIND_ADDR"),
        };
        settings.validate()?;
        Ok(settings)
    }

    /// Validate configuration values.
    ///
    /// Checks that tunables are within range and that addresses parse.
    /// Requirements specific to one command (a database URL, a secret key)
    /// are checked by that command.
    fn validate(&self) -> std::result::Result<(), ConfigError> {
        self.readiness.validate()?;
        self.client.validate()?;

        if self.db_host.contains(char::is_whitespace) {
            return Err(ConfigError::InvalidValue {
                field: "DB_HOST",
                reason: "must not contain whitespace".to_string(),
            });
        }
        url::Url::parse(&self.api_url).map_err(|e| ConfigError::InvalidValue {
            field: "API_URL",
            reason: e.to_string(),
        })?;
        if let Some(bind) = &self.bind_override {
            parse_bind("BIND_ADDR", bind)?;
        }
        Ok(())
    }

    /// Classified `DATABASE_URL`.
    ///
    /// # Errors
    ///
    /// [`ConfigError::MissingField`] when unset, or the parse error.
    pub fn database_target(&self) -> std::result::Result<DatabaseTarget, ConfigError> {
        DatabaseTarget::parse(self.database_url.as_deref().unwrap_or(""))
    }

    /// `DB_HOST:DB_PORT`, polled first.
    #[must_use]
    pub fn primary_endpoint(&self) -> Endpoint {
        Endpoint::new(self.db_host.clone(), self.db_port)
    }

    /// `DB_FALLBACK_HOST:DB_PORT`, probed once after the primary poll is exhausted.
    #[must_use]
    pub fn fallback_endpoint(&self) -> Endpoint {
        Endpoint::new(self.fallback_host.clone(), self.db_port)
    }

    /// The application secret, unless running in debug mode.
    ///
    /// # Errors
    ///
    /// [`ConfigError::MissingField`] when `SECRET_KEY` is unset outside debug mode.
    pub fn require_secret(&self) -> std::result::Result<Option<&Secret>, ConfigError> {
        match (&self.secret_key, self.debug) {
            (Some(secret), _) => Ok(Some(secret)),
            (None, true) => Ok(None),
            (None, false) => Err(ConfigError::MissingField {
                field: "SECRET_KEY",
            }),
        }
    }

    /// Listen address of the API server.
    ///
    /// # Errors
    ///
    /// [`ConfigError::InvalidValue`] when the address does not parse.
    pub fn api_bind(&self) -> std::result::Result<SocketAddr, ConfigError> {
        match &self.bind_override {
            Some(bind) => parse_bind("BIND_ADDR", bind),
            None => parse_bind("server.api_bind", &self.server.api_bind),
        }
    }

    /// Listen address of the dashboard service.
    ///
    /// # Errors
    ///
    /// [`ConfigError::InvalidValue`] when the address does not parse.
    pub fn dashboard_bind(&self) -> std::result::Result<SocketAddr, ConfigError> {
        match &self.bind_override {
            Some(bind) => parse_bind("BIND_ADDR", bind),
            None => parse_bind("server.dashboard_bind", &self.server.dashboard_bind),
        }
    }
}

fn parse_number<T: std::str::FromStr>(
    field: &'static str,
    raw: &str,
) -> std::result::Result<T, ConfigError>
where
    T::Err: fmt::Display,
{
    raw.parse().map_err(|e: T::Err| ConfigError::InvalidValue {
        field,
        reason: format!("`{raw}`: {e}"),
    })
}

fn parse_flag(field: &'static str, raw: &str) -> std::result::Result<bool, ConfigError> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            field,
            reason: format!("`{raw}` is not a boolean"),
        }),
    }
}

fn parse_bind(field: &'static str, raw: &str) -> std::result::Result<SocketAddr, ConfigError> {
    raw.parse().map_err(|_| ConfigError::InvalidValue {
        field,
        reason: format!("`{raw}` is not a socket address"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn settings(pairs: &[(&str, &str)]) -> std::result::Result<Settings, ConfigError> {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Settings::from_sources(FileConfig::default(), |key| env.get(key).cloned())
    }

    #[test]
    fn defaults_match_deployment_conventions() {
        let s = settings(&[]).unwrap();
        assert_eq!(s.primary_endpoint().to_string(), "db:5432");
        assert_eq!(s.fallback_endpoint().to_string(), "127.0.0.1:5432");
        assert_eq!(s.readiness.max_attempts, 30);
        assert!(s.readiness.deadline().is_none());
        assert_eq!(s.api_bind().unwrap().port(), 8000);
        assert_eq!(s.dashboard_bind().unwrap().port(), 8501);
        assert!(!s.debug);
    }

    #[test]
    fn env_overrides_endpoint_and_poll() {
        let s = settings(&[
            ("DB_HOST", "postgres"),
            ("DB_PORT", "6543"),
            ("DB_FALLBACK_HOST", "localhost"),
            ("DB_WAIT_MAX_ATTEMPTS", "4"),
            ("DB_WAIT_TIMEOUT_SECS", "90"),
        ])
        .unwrap();
        assert_eq!(s.primary_endpoint(), Endpoint::new("postgres", 6543));
        assert_eq!(s.fallback_endpoint(), Endpoint::new("localhost", 6543));
        assert_eq!(s.readiness.max_attempts, 4);
        assert_eq!(s.readiness.deadline_secs, Some(90));
    }

    #[test]
    fn malformed_values_are_rejected() {
        assert!(matches!(
            settings(&[("DB_PORT", "not-a-port")]),
            Err(ConfigError::InvalidValue { field: "DB_PORT", .. })
        ));
        assert!(matches!(
            settings(&[("DEBUG", "maybe")]),
            Err(ConfigError::InvalidValue { field: "DEBUG", .. })
        ));
        assert!(matches!(
            settings(&[("DB_WAIT_MAX_ATTEMPTS", "0")]),
            Err(ConfigError::InvalidValue { field: "max_attempts", .. })
        ));
        assert!(matches!(
            settings(&[("BIND_ADDR", "nowhere")]),
            Err(ConfigError::InvalidValue { field: "BIND_ADDR", .. })
        ));
    }

    #[test]
    fn secret_required_outside_debug() {
        assert!(settings(&[]).unwrap().require_secret().is_err());
        assert!(settings(&[("DEBUG", "1")]).unwrap().require_secret().unwrap().is_none());
        let s = settings(&[("SECRET_KEY", "hunter2")]).unwrap();
        assert_eq!(s.require_secret().unwrap().unwrap().expose(), "hunter2");
        assert!(!format!("{s:?}").contains("hunter2"));
    }

    #[test]
    fn blank_database_url_is_missing() {
        let s = settings(&[("DATABASE_URL", "  ")]).unwrap();
        assert!(matches!(
            s.database_target(),
            Err(ConfigError::MissingField { field: "DATABASE_URL" })
        ));
    }

    #[test]
    fn toml_tunables_are_read() {
        let file = FileConfig::parse_toml(
            r#"
            [logging]
            format = "json"

            [readiness]
            max_attempts = 3
            probe_timeout_ms = 100

            [readiness.backoff]
            initial_delay_ms = 10
            max_delay_ms = 40

            [server]
            models_dir = "/data/models"
            "#,
        )
        .unwrap();
        assert_eq!(file.logging.format, "json");
        assert_eq!(file.readiness.max_attempts, 3);
        assert_eq!(file.readiness.backoff.max_delay_ms, 40);
        assert_eq!(file.server.models_dir, PathBuf::from("/data/models"));
        assert_eq!(file.server.graphviz_dot, "dot");
    }
}
