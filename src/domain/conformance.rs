//! Conformance of traces against a reference transition model.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::event::{EventLog, Trace};

/// Allowed start activities and directly-follows transitions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceModel {
    pub start: HashSet<String>,
    pub transitions: HashSet<(String, String)>,
}

impl ReferenceModel {
    pub fn new<S: Into<String>>(
        start: impl IntoIterator<Item = S>,
        transitions: impl IntoIterator<Item = (S, S)>,
    ) -> Self {
        Self {
            start: start.into_iter().map(Into::into).collect(),
            transitions: transitions
                .into_iter()
                .map(|(a, b)| (a.into(), b.into()))
                .collect(),
        }
    }

    /// Lifecycle of an issue-tracker ticket, reopen loops included.
    #[must_use]
    pub fn issue_lifecycle() -> Self {
        Self::new(
            ["Create Issue"],
            [
                ("Create Issue", "Assign Issue"),
                ("Assign Issue", "Start Work"),
                ("Start Work", "Commit Code"),
                ("Commit Code", "Commit Code"),
                ("Commit Code", "Code Review"),
                ("Code Review", "Commit Code"),
                ("Code Review", "Resolve Issue"),
                ("Resolve Issue", "Close Issue"),
                ("Resolve Issue", "Reopen Issue"),
                ("Close Issue", "Reopen Issue"),
                ("Reopen Issue", "Assign Issue"),
                ("Reopen Issue", "Start Work"),
            ],
        )
    }

    fn allows(&self, from: &str, to: &str) -> bool {
        self.transitions
            .contains(&(from.to_owned(), to.to_owned()))
    }

    /// Fraction of a trace's moves (start plus transitions) the model allows.
    ///
    /// An empty trace has no moves and is treated as fitting.
    #[must_use]
    pub fn trace_fitness(&self, trace: &Trace) -> f64 {
        let Some(first) = trace.events.first() else {
            return 1.0;
        };

        let mut moves = 1usize;
        let mut allowed = usize::from(self.start.contains(&first.activity));
        for pair in trace.events.windows(2) {
            moves += 1;
            if self.allows(&pair[0].activity, &pair[1].activity) {
                allowed += 1;
            }
        }
        allowed as f64 / moves as f64
    }
}

/// Aggregate conformance of a log.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConformanceReport {
    pub fitness: f64,
    pub conforming_cases: usize,
    pub total_cases: usize,
}

#[must_use]
pub fn conformance(log: &EventLog, model: &ReferenceModel) -> ConformanceReport {
    let scores: Vec<f64> = log
        .traces()
        .iter()
        .map(|t| model.trace_fitness(t))
        .collect();
    let total_cases = scores.len();
    let conforming_cases = scores.iter().filter(|s| **s >= 1.0).count();
    let fitness = if total_cases == 0 {
        1.0
    } else {
        scores.iter().sum::<f64>() / total_cases as f64
    };

    ConformanceReport {
        fitness,
        conforming_cases,
        total_cases,
    }
}
