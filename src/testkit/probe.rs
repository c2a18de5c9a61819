//! Scripted connectivity probe.

use std::collections::{HashMap, VecDeque};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::domain::Endpoint;
use crate::port::ConnectivityProbe;

/// Answers from a per-endpoint script; unscripted probes fail.
#[derive(Debug, Default)]
pub struct ScriptedProbe {
    script: Mutex<HashMap<Endpoint, VecDeque<bool>>>,
    calls: Mutex<Vec<Endpoint>>,
}

impl ScriptedProbe {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue answers for `endpoint`, consumed one per probe.
    #[must_use]
    pub fn answer(self, endpoint: &Endpoint, answers: impl IntoIterator<Item = bool>) -> Self {
        self.script
            .lock()
            .entry(endpoint.clone())
            .or_default()
            .extend(answers);
        self
    }

    /// Every probe made, in order.
    pub fn calls(&self) -> Vec<Endpoint> {
        self.calls.lock().clone()
    }

    pub fn calls_to(&self, endpoint: &Endpoint) -> usize {
        self.calls.lock().iter().filter(|e| *e == endpoint).count()
    }
}

#[async_trait]
impl ConnectivityProbe for ScriptedProbe {
    async fn probe(&self, endpoint: &Endpoint, _timeout: Duration) -> bool {
        self.calls.lock().push(endpoint.clone());
        self.script
            .lock()
            .get_mut(endpoint)
            .and_then(VecDeque::pop_front)
            .unwrap_or(false)
    }
}
