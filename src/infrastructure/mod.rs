//! Infrastructure layer.
//!
//! Provides technical concerns that support the application without containing
//! business logic: configuration, the readiness poll, the entrypoint
//! procedure and adapter wiring.
//!
//! # Submodules
//!
//! - [`backoff`] - Exponential backoff shared by retries
//! - [`config`] - Configuration loading and validation
//! - [`entrypoint`] - Wait, migrate, hand off
//! - [`factory`] - Adapter construction from settings
//! - [`health`] - Health reporting
//! - [`operator`] - CLI operator port over loaded settings
//! - [`readiness`] - Bounded database readiness poll

pub mod backoff;
pub mod config;
pub mod entrypoint;
pub mod factory;
pub mod health;
pub mod operator;
pub mod readiness;
