//! Inbound ports (driving side): capabilities the CLI invokes.

pub mod operator;
