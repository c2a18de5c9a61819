//! CLI module graph.

pub mod command;
pub mod dashboard;
pub mod dispatch;
pub mod entrypoint;
pub mod generate;
pub mod healthcheck;
pub mod load;
pub mod migrate;
pub mod output;
pub mod report;
pub mod serve;
pub mod train;

pub use dispatch::dispatch;
