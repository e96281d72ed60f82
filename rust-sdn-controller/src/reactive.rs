//! Reactive flow installation.
//!
//! When a packet misses every rule, the controller asks the policy what to do.
//! The policy keys on the destination port and, when it knows the port,
//! produces a per-source rule so the rest of the flow hits the table.

use log::warn;
use rust_sdn_common::Packet;
use rust_sdn_flow::{Action, FlowMatch};
use serde::{Deserialize, Serialize};

/// One row of the policy: traffic to `dst_port` is sent out of `out_port`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyEntry {
    pub dst_port: u16,
    pub out_port: u16,
}

/// What the controller does with a missed packet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MissDecision {
    /// Install `flow_match -> action`, then apply `action` to the packet.
    Install { flow_match: FlowMatch, action: Action },
    /// Drop the packet without installing anything.
    Drop,
}

/// Ordered destination-port table; the first entry for a port wins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReactivePolicy {
    entries: Vec<PolicyEntry>,
}

impl ReactivePolicy {
    pub fn new(entries: Vec<PolicyEntry>) -> Self {
        Self { entries }
    }

    /// A policy that drops every miss.
    pub fn drop_all() -> Self {
        Self::new(Vec::new())
    }

    pub fn entries(&self) -> &[PolicyEntry] {
        &self.entries
    }

    pub fn decide(&self, packet: &Packet) -> MissDecision {
        let Some(dst_port) = packet.dst_port else {
            return MissDecision::Drop;
        };
        let Some(entry) = self.entries.iter().find(|e| e.dst_port == dst_port) else {
            return MissDecision::Drop;
        };
        let Some(src_ip) = packet.src_ip else {
            warn!(
                "Packet to port {} has no source address; dropping without installing a rule",
                dst_port
            );
            return MissDecision::Drop;
        };

        MissDecision::Install {
            flow_match: FlowMatch::any().with_src_ip(src_ip).with_dst_port(dst_port),
            action: Action::forward(entry.out_port),
        }
    }
}

impl Default for ReactivePolicy {
    /// HTTP and HTTPS out of port 2, DNS out of port 3, everything else dropped.
    fn default() -> Self {
        Self::new(vec![
            PolicyEntry { dst_port: 80, out_port: 2 },
            PolicyEntry { dst_port: 443, out_port: 2 },
            PolicyEntry { dst_port: 53, out_port: 3 },
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    fn from(src: Ipv4Addr, dst_port: u16) -> Packet {
        Packet::new().with_src_ip(src).with_dst_port(dst_port)
    }

    #[test]
    fn test_default_policy_table() {
        let policy = ReactivePolicy::default();
        let src = Ipv4Addr::new(10, 0, 0, 7);

        for (port, out) in [(80, 2), (443, 2), (53, 3)] {
            assert_eq!(
                policy.decide(&from(src, port)),
                MissDecision::Install {
                    flow_match: FlowMatch::any().with_src_ip(src).with_dst_port(port),
                    action: Action::forward(out),
                }
            );
        }
    }

    #[test]
    fn test_unknown_port_is_dropped() {
        let policy = ReactivePolicy::default();
        let src = Ipv4Addr::new(10, 0, 0, 7);
        assert_eq!(policy.decide(&from(src, 22)), MissDecision::Drop);
        assert_eq!(policy.decide(&Packet::new().with_src_ip(src)), MissDecision::Drop);
    }

    #[test]
    fn test_missing_source_is_dropped() {
        let policy = ReactivePolicy::default();
        assert_eq!(policy.decide(&Packet::new().with_dst_port(80)), MissDecision::Drop);
    }

    #[test]
    fn test_custom_and_empty_policies() {
        let policy = ReactivePolicy::new(vec![PolicyEntry { dst_port: 22, out_port: 9 }]);
        let src = Ipv4Addr::new(192, 168, 1, 1);
        assert!(matches!(
            policy.decide(&from(src, 22)),
            MissDecision::Install { action: Action::Forward { port: 9 }, .. }
        ));
        assert_eq!(policy.decide(&from(src, 80)), MissDecision::Drop);

        assert_eq!(ReactivePolicy::drop_all().decide(&from(src, 80)), MissDecision::Drop);
    }
}
