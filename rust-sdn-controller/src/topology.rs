//! Link bookkeeping between network nodes.
//!
//! The topology does not influence packet processing; it is kept for display.

use serde::Serialize;
use std::fmt;

/// Directed adjacency lists in the order links were first added.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Topology {
    links: Vec<(String, Vec<String>)>,
}

impl Topology {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a `source -> target` link. Returns false if it already existed.
    pub fn add_connection(&mut self, source: &str, target: &str) -> bool {
        let idx = match self.links.iter().position(|(s, _)| s == source) {
            Some(idx) => idx,
            None => {
                self.links.push((source.to_string(), Vec::new()));
                self.links.len() - 1
            }
        };

        let targets = &mut self.links[idx].1;
        if targets.iter().any(|t| t == target) {
            return false;
        }
        targets.push(target.to_string());
        true
    }

    pub fn neighbors(&self, source: &str) -> &[String] {
        self.links
            .iter()
            .find(|(s, _)| s == source)
            .map(|(_, targets)| targets.as_slice())
            .unwrap_or(&[])
    }

    pub fn link_count(&self) -> usize {
        self.links.iter().map(|(_, t)| t.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }
}

impl fmt::Display for Topology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (source, targets) in &self.links {
            writeln!(f, "{} connected to: {}", source, targets.join(", "))?;
        }
        Ok(())
    }
}
