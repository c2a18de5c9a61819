//! Outbound adapters (driven side).

pub mod graphviz;
pub mod model_store;
pub mod process;
pub mod sqlite;
pub mod tcp;
