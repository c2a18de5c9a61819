//! Shared state of the API handlers.

use std::sync::Arc;

use crate::application::MiningService;

/// Shared handler state.
pub struct AppState<S> {
    pub service: Arc<MiningService<S>>,
    /// Include internal error details in problem documents.
    pub debug: bool,
}

impl<S> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            service: Arc::clone(&self.service),
            debug: self.debug,
        }
    }
}

impl<S> AppState<S> {
    pub fn new(service: MiningService<S>, debug: bool) -> Self {
        Self {
            service: Arc::new(service),
            debug,
        }
    }
}
