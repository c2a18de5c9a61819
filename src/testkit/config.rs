//! Canonical test configurations.
//!
//! Single source of truth for config structs used across tests.
//! Avoids each test module defining its own slightly-different defaults.

use std::collections::HashMap;

use crate::infrastructure::config::{BackoffConfig, ClientConfig, FileConfig, ReadinessConfig, Settings};

/// Backoff with zero delays and no jitter, so tests never wait.
pub fn backoff() -> BackoffConfig {
    BackoffConfig {
        initial_delay_ms: 0,
        max_delay_ms: 0,
        backoff_multiplier: 1.0,
        jitter: false,
    }
}

/// Readiness poll with `max_attempts` probes and no delays.
pub fn readiness(max_attempts: u32) -> ReadinessConfig {
    ReadinessConfig {
        max_attempts,
        probe_timeout_ms: 100,
        deadline_secs: None,
        backoff: backoff(),
    }
}

/// API client retrying `max_retries` times without waiting.
pub fn client(max_retries: u32) -> ClientConfig {
    ClientConfig {
        max_retries,
        request_timeout_ms: 2_000,
        backoff: backoff(),
    }
}

/// Settings built from the given variables only, with test timings.
///
/// # Panics
///
/// Panics when the variables do not validate.
pub fn settings(vars: &[(&str, &str)]) -> Settings {
    let env: HashMap<String, String> = vars
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect();
    let file = FileConfig {
        readiness: readiness(3),
        client: client(0),
        ..FileConfig::default()
    };
    Settings::from_sources(file, |key| env.get(key).cloned()).expect("valid test settings")
}
