//! Dashboard service: filtered views and exports over the REST API.
//!
//! The dashboard owns no data. Every request is answered from the API
//! through [`ApiClient`](crate::api::ApiClient), which rides out API
//! restarts with retries.

pub mod export;
pub mod filter;
pub mod handlers;
pub mod routes;

pub use filter::{Filters, Overview};
pub use routes::{router, DashboardState};
