//! Infrastructure configuration modules.

pub mod logging;
pub mod retry;
pub mod server;
pub mod settings;

pub use logging::LoggingConfig;
pub use retry::{BackoffConfig, ClientConfig, ReadinessConfig};
pub use server::ServerConfig;
pub use settings::{FileConfig, Secret, Settings};
