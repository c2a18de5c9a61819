//! REST API served by `procmine serve`.

pub mod error;
pub mod handlers;
pub mod routes;
pub mod server;
pub mod state;

pub use error::Problem;
pub use routes::router;
pub use server::serve;
pub use state::AppState;
