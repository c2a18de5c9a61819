//! Directly-follows process maps and their Graphviz rendering.

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::str::FromStr;

use serde::Serialize;

use super::event::EventLog;

const START_NODE: &str = "__start__";
const END_NODE: &str = "__end__";

/// Discovery technique used to build a process map.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum Miner {
    /// Every observed directly-follows relation.
    DirectlyFollows,
    /// Directly-follows relations whose dependency measure reaches the threshold.
    Heuristic { threshold: f64 },
}

impl Miner {
    pub const DEFAULT_THRESHOLD: f64 = 0.5;

    /// Parse a miner name with an optional dependency threshold.
    ///
    /// # Errors
    ///
    /// Returns the offending name for anything other than `dfg` or
    /// `heuristic`.
    pub fn parse(name: &str, threshold: Option<f64>) -> Result<Self, String> {
        match name.trim().to_ascii_lowercase().as_str() {
            "" | "dfg" | "directly-follows" => Ok(Self::DirectlyFollows),
            "heuristic" | "heuristics" => Ok(Self::Heuristic {
                threshold: threshold.unwrap_or(Self::DEFAULT_THRESHOLD),
            }),
            other => Err(other.to_string()),
        }
    }
}

/// Output format of a rendered map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MapFormat {
    #[default]
    Png,
    Dot,
}

impl FromStr for MapFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "png" => Ok(Self::Png),
            "dot" | "gv" => Ok(Self::Dot),
            other => Err(other.to_string()),
        }
    }
}

/// Discovered control-flow graph.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProcessMap {
    /// Activity frequencies.
    pub nodes: BTreeMap<String, usize>,
    /// Directly-follows counts, including artificial start/end edges.
    pub edges: BTreeMap<(String, String), usize>,
}

impl ProcessMap {
    #[must_use]
    pub fn discover(log: &EventLog, miner: Miner) -> Self {
        let mut map = Self::directly_follows(log);
        if let Miner::Heuristic { threshold } = miner {
            map.retain_dependencies(threshold);
        }
        map
    }

    fn directly_follows(log: &EventLog) -> Self {
        let mut map = Self::default();
        for trace in log.traces() {
            let (Some(first), Some(last)) = (trace.events.first(), trace.events.last()) else {
                continue;
            };
            map.bump_edge(START_NODE, &first.activity);
            map.bump_edge(&last.activity, END_NODE);
            for event in &trace.events {
                *map.nodes.entry(event.activity.clone()).or_default() += 1;
            }
            for pair in trace.events.windows(2) {
                map.bump_edge(&pair[0].activity, &pair[1].activity);
            }
        }
        map
    }

    fn bump_edge(&mut self, from: &str, to: &str) {
        *self
            .edges
            .entry((from.to_string(), to.to_string()))
            .or_default() += 1;
    }

    fn count(&self, from: &str, to: &str) -> usize {
        self.edges
            .get(&(from.to_string(), to.to_string()))
            .copied()
            .unwrap_or(0)
    }

    /// Dependency measure between two activities.
    ///
    /// `(|a>b| - |b>a|) / (|a>b| + |b>a| + 1)` for distinct activities and
    /// `|a>a| / (|a>a| + 1)` for self-loops.
    #[must_use]
    pub fn dependency(&self, a: &str, b: &str) -> f64 {
        let ab = self.count(a, b) as f64;
        if a == b {
            return ab / (ab + 1.0);
        }
        let ba = self.count(b, a) as f64;
        (ab - ba) / (ab + ba + 1.0)
    }

    fn retain_dependencies(&mut self, threshold: f64) {
        let keep: Vec<(String, String)> = self
            .edges
            .keys()
            .filter(|(a, b)| a == START_NODE || b == END_NODE || self.dependency(a, b) >= threshold)
            .cloned()
            .collect();
        self.edges.retain(|key, _| keep.contains(key));
    }

    /// Graphviz DOT source for the map.
    #[must_use]
    pub fn to_dot(&self) -> String {
        let mut dot = String::from("digraph process_map {\n");
        dot.push_str("  rankdir=LR;\n");
        dot.push_str("  node [shape=box, style=rounded, fontname=\"Helvetica\"];\n");
        dot.push_str(&format!(
            "  {} [label=\"\", shape=circle, style=filled, fillcolor=green, width=0.3];\n",
            quote(START_NODE)
        ));
        dot.push_str(&format!(
            "  {} [label=\"\", shape=doublecircle, style=filled, fillcolor=red, width=0.3];\n",
            quote(END_NODE)
        ));

        for (activity, freq) in &self.nodes {
            let _ = writeln!(
                dot,
                "  {} [label={}];",
                quote(activity),
                quote(&format!("{activity}\n({freq})"))
            );
        }

        let max = self.edges.values().copied().max().unwrap_or(1).max(1) as f64;
        for ((from, to), count) in &self.edges {
            let width = 1.0 + 4.0 * (*count as f64 / max);
            let _ = writeln!(
                dot,
                "  {} -> {} [label=\"{count}\", penwidth={width:.2}];",
                quote(from),
                quote(to)
            );
        }

        dot.push_str("}\n");
        dot
    }
}

fn quote(raw: &str) -> String {
    let escaped = raw
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n");
    format!("\"{escaped}\"")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::event::Event;
    use chrono::{Duration, TimeZone, Utc};

    fn log(traces: &[&[&str]]) -> EventLog {
        let base = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let mut events = Vec::new();
        for (case, acts) in traces.iter().enumerate() {
            for (i, act) in acts.iter().enumerate() {
                events.push(Event::new(
                    format!("C{case}"),
                    *act,
                    base + Duration::minutes(i as i64),
                    "",
                ));
            }
        }
        EventLog::from_events(events)
    }

    #[test]
    fn dfg_counts_edges_and_nodes() {
        let map = ProcessMap::discover(&log(&[&["a", "b", "c"], &["a", "c"]]), Miner::DirectlyFollows);
        assert_eq!(map.nodes["a"], 2);
        assert_eq!(map.count("a", "b"), 1);
        assert_eq!(map.count("a", "c"), 1);
        assert_eq!(map.count(START_NODE, "a"), 2);
        assert_eq!(map.count("c", END_NODE), 2);
    }

    #[test]
    fn heuristic_drops_weak_dependencies() {
        // a>b four times, b>a once: (4-1)/(4+1+1) = 0.5 kept at 0.5, dropped at 0.6
        let traces: &[&[&str]] = &[&["a", "b"], &["a", "b"], &["a", "b"], &["a", "b"], &["b", "a"]];
        let kept = ProcessMap::discover(&log(traces), Miner::Heuristic { threshold: 0.5 });
        assert_eq!(kept.count("a", "b"), 4);
        assert_eq!(kept.count("b", "a"), 0);

        let strict = ProcessMap::discover(&log(traces), Miner::Heuristic { threshold: 0.6 });
        assert_eq!(strict.count("a", "b"), 0);
        assert_eq!(strict.count(START_NODE, "a"), 4);
    }

    #[test]
    fn self_loop_dependency() {
        let map = ProcessMap::discover(&log(&[&["a", "a", "a"]]), Miner::DirectlyFollows);
        assert!((map.dependency("a", "a") - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn miner_names() {
        assert_eq!(Miner::parse("dfg", None).unwrap(), Miner::DirectlyFollows);
        assert_eq!(
            Miner::parse("Heuristic", Some(0.8)).unwrap(),
            Miner::Heuristic { threshold: 0.8 }
        );
        assert_eq!(Miner::parse("alpha", None).unwrap_err(), "alpha");
    }

    #[test]
    fn dot_output_escapes_labels() {
        let map = ProcessMap::discover(&log(&[&["say \"hi\""]]), Miner::DirectlyFollows);
        let dot = map.to_dot();
        assert!(dot.starts_with("digraph process_map {"));
        assert!(dot.contains("say \\\"hi\\\""));
        assert!(dot.trim_end().ends_with('}'));
    }
}
