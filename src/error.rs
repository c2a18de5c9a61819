use std::process::ExitStatus;

use thiserror::Error;

/// Configuration-related errors with structured variants.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing required field: {field}")]
    MissingField { field: &'static str },

    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("failed to read config file: {0}")]
    ReadFile(#[source] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[source] toml::de::Error),

    #[error("no startup command given after `--`")]
    EmptyCommand,

    #[error("networked database at {url} needs MIGRATE_COMMAND to apply migrations")]
    NoMigratorForNetworked { url: String },

    #[error("{0}")]
    Other(String),
}

/// Database readiness failures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReadinessError {
    #[error(
        "database unreachable: {primary} failed {attempts} probe(s) and fallback {fallback} did not answer"
    )]
    Unreachable {
        primary: String,
        fallback: String,
        attempts: u32,
    },
}

/// Schema migration failures, kept apart from readiness failures.
#[derive(Error, Debug)]
pub enum MigrationError {
    #[error("migration command exited with {status}")]
    Rejected { status: ExitStatus },

    #[error("failed to run migration command: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("embedded migration failed: {0}")]
    Embedded(String),

    #[error("cannot open database for migration: {0}")]
    Connection(String),

    #[error("migration task aborted: {0}")]
    Aborted(String),
}

/// Failure to hand off to the server command.
#[derive(Error, Debug)]
pub enum LaunchError {
    #[error("failed to exec `{program}`: {source}")]
    Exec {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`{program}` exited with {status}")]
    ChildFailed { program: String, status: ExitStatus },
}

/// Event store errors.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("connection error: {0}")]
    Connection(String),

    #[error("database error: {0}")]
    Database(String),

    #[error("corrupt row: {0}")]
    Corrupt(String),
}

/// Event log ingestion errors.
#[derive(Error, Debug)]
pub enum IngestError {
    #[error("missing required column: {0}")]
    MissingColumn(&'static str),

    #[error("line {line}: {reason}")]
    InvalidRow { line: usize, reason: String },

    #[error("empty input")]
    Empty,
}

/// Predictive model errors.
#[derive(Error, Debug)]
pub enum ModelError {
    #[error("model not trained: {0}")]
    NotTrained(&'static str),

    #[error("not enough training data: need at least {needed} cases, have {have}")]
    InsufficientData { needed: usize, have: usize },

    #[error("failed to persist model: {0}")]
    Persist(String),
}

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Readiness(#[from] ReadinessError),

    #[error(transparent)]
    Migration(#[from] MigrationError),

    #[error(transparent)]
    Launch(#[from] LaunchError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Ingest(#[from] IngestError),

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    #[error("connection error: {0}")]
    Connection(String),

    #[error("render error: {0}")]
    Render(String),
}

impl Error {
    /// Process exit code reported for this error.
    ///
    /// Readiness and migration failures get distinct codes so container
    /// logs and orchestrators can tell them apart.
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) => 2,
            Self::Readiness(_) => 3,
            Self::Migration(_) => 4,
            Self::Launch(LaunchError::ChildFailed { status, .. }) => status.code().unwrap_or(5),
            Self::Launch(_) => 5,
            _ => 1,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

impl From<diesel::result::Error> for StoreError {
    fn from(err: diesel::result::Error) -> Self {
        StoreError::Database(err.to_string())
    }
}

impl From<diesel::r2d2::PoolError> for StoreError {
    fn from(err: diesel::r2d2::PoolError) -> Self {
        StoreError::Connection(err.to_string())
    }
}

impl From<diesel::result::Error> for Error {
    fn from(err: diesel::result::Error) -> Self {
        Error::Store(err.into())
    }
}
