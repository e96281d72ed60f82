//! Flow table operations.
//!
//! A table belongs to exactly one switch. Rules are only ever appended; the
//! priority of a new rule is the table length after insertion, so priorities
//! run 1, 2, 3, ... in insertion order.

use log::debug;
use rust_sdn_common::{Packet, SwitchId};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::action::Action;
use crate::matcher::{self, FlowMatch, LookupOrder};

/// An installed (match, action) pair.
#[derive(Debug, Clone)]
pub struct FlowRule {
    priority: u32,
    flow_match: FlowMatch,
    action: Action,
    hits: u64,
    created_at: SystemTime,
}

impl FlowRule {
    fn new(priority: u32, flow_match: FlowMatch, action: Action) -> Self {
        Self {
            priority,
            flow_match,
            action,
            hits: 0,
            created_at: SystemTime::now(),
        }
    }

    pub fn priority(&self) -> u32 {
        self.priority
    }

    pub fn flow_match(&self) -> &FlowMatch {
        &self.flow_match
    }

    pub fn action(&self) -> &Action {
        &self.action
    }

    /// Number of packets this rule has matched.
    pub fn hits(&self) -> u64 {
        self.hits
    }

    pub fn created_at(&self) -> SystemTime {
        self.created_at
    }

    pub fn snapshot(&self) -> RuleSnapshot {
        let created_at_ms = self
            .created_at
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or_default();
        RuleSnapshot {
            priority: self.priority,
            flow_match: self.flow_match.clone(),
            action: self.action.clone(),
            hits: self.hits,
            created_at_ms,
        }
    }
}

impl fmt::Display for FlowRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Priority {}: {} -> {} (hits: {})",
            self.priority, self.flow_match, self.action, self.hits
        )
    }
}

/// Serializable copy of a rule for dumps and reports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleSnapshot {
    pub priority: u32,
    #[serde(rename = "match")]
    pub flow_match: FlowMatch,
    pub action: Action,
    pub hits: u64,
    /// Creation time, milliseconds since the Unix epoch.
    pub created_at_ms: u64,
}

/// Ordered rules of one switch.
#[derive(Debug, Clone)]
pub struct FlowTable {
    switch_id: SwitchId,
    order: LookupOrder,
    rules: Vec<FlowRule>,
}

impl FlowTable {
    pub fn new(switch_id: SwitchId, order: LookupOrder) -> Self {
        Self {
            switch_id,
            order,
            rules: Vec::new(),
        }
    }

    /// Appends a rule and returns the priority it was given.
    ///
    /// Identical rules are not merged; each call adds a new entry.
    pub fn add_rule(&mut self, flow_match: FlowMatch, action: Action) -> u32 {
        let priority = self.rules.len() as u32 + 1;
        debug!(
            "Installing rule on {}: priority {} {} -> {}",
            self.switch_id, priority, flow_match, action
        );
        self.rules.push(FlowRule::new(priority, flow_match, action));
        priority
    }

    /// Finds the rule that handles `packet` without touching hit counters.
    pub fn lookup(&self, packet: &Packet) -> Option<&FlowRule> {
        matcher::select(&self.rules, packet, self.order).map(|idx| &self.rules[idx])
    }

    /// Finds the rule that handles `packet` and counts the hit on it.
    pub fn match_packet(&mut self, packet: &Packet) -> Option<&FlowRule> {
        let idx = matcher::select(&self.rules, packet, self.order)?;
        let rule = &mut self.rules[idx];
        rule.hits += 1;
        Some(&*rule)
    }

    pub fn rules(&self) -> &[FlowRule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn switch_id(&self) -> &SwitchId {
        &self.switch_id
    }

    pub fn order(&self) -> LookupOrder {
        self.order
    }

    pub fn dump(&self) -> Vec<RuleSnapshot> {
        self.rules.iter().map(FlowRule::snapshot).collect()
    }
}

impl fmt::Display for FlowTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Switch {}:", self.switch_id)?;
        for rule in &self.rules {
            writeln!(f, "  {}", rule)?;
        }
        Ok(())
    }
}
