//! Match engine: predicate evaluation and rule selection.

use rust_sdn_common::{Packet, Protocol, QosPriority};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::Ipv4Addr;

use crate::flow_table::FlowRule;

/// Direction in which a flow table is scanned.
///
/// Priorities are handed out in insertion order, so scanning by highest
/// priority is the same as scanning newest-first.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LookupOrder {
    /// Oldest rule first; the first installed matching rule wins.
    #[default]
    Insertion,
    /// Highest priority number first; the newest matching rule wins.
    HighestPriority,
}

/// Conjunctive equality predicate over packet fields.
///
/// Unset fields are wildcards. A set field requires the packet to carry the
/// same field with an equal value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FlowMatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub src_ip: Option<Ipv4Addr>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dst_ip: Option<Ipv4Addr>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub src_port: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dst_port: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protocol: Option<Protocol>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qos_priority: Option<QosPriority>,
}

impl FlowMatch {
    /// A predicate with no constraints; matches every packet.
    pub fn any() -> Self {
        Self::default()
    }

    pub fn with_src_ip(mut self, ip: Ipv4Addr) -> Self {
        self.src_ip = Some(ip);
        self
    }

    pub fn with_dst_ip(mut self, ip: Ipv4Addr) -> Self {
        self.dst_ip = Some(ip);
        self
    }

    pub fn with_src_port(mut self, port: u16) -> Self {
        self.src_port = Some(port);
        self
    }

    pub fn with_dst_port(mut self, port: u16) -> Self {
        self.dst_port = Some(port);
        self
    }

    pub fn with_protocol(mut self, protocol: Protocol) -> Self {
        self.protocol = Some(protocol);
        self
    }

    pub fn with_size(mut self, size: u32) -> Self {
        self.size = Some(size);
        self
    }

    pub fn with_qos_priority(mut self, qos: QosPriority) -> Self {
        self.qos_priority = Some(qos);
        self
    }

    pub fn is_wildcard(&self) -> bool {
        *self == Self::any()
    }

    /// True when every constrained field is present in `packet` with an
    /// equal value.
    pub fn matches(&self, packet: &Packet) -> bool {
        field_matches(self.src_ip, packet.src_ip)
            && field_matches(self.dst_ip, packet.dst_ip)
            && field_matches(self.src_port, packet.src_port)
            && field_matches(self.dst_port, packet.dst_port)
            && field_matches(self.protocol, packet.protocol)
            && field_matches(self.size, packet.size)
            && field_matches(self.qos_priority, packet.qos_priority)
    }
}

fn field_matches<T: PartialEq>(required: Option<T>, actual: Option<T>) -> bool {
    match required {
        None => true,
        Some(value) => actual == Some(value),
    }
}

impl fmt::Display for FlowMatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut fields = Vec::new();
        if let Some(v) = self.src_ip {
            fields.push(format!("src_ip={}", v));
        }
        if let Some(v) = self.dst_ip {
            fields.push(format!("dst_ip={}", v));
        }
        if let Some(v) = self.src_port {
            fields.push(format!("src_port={}", v));
        }
        if let Some(v) = self.dst_port {
            fields.push(format!("dst_port={}", v));
        }
        if let Some(v) = self.protocol {
            fields.push(format!("protocol={}", v));
        }
        if let Some(v) = self.size {
            fields.push(format!("size={}", v));
        }
        if let Some(v) = self.qos_priority {
            fields.push(format!("qos_priority={}", v));
        }
        if fields.is_empty() {
            return f.write_str("{*}");
        }
        write!(f, "{{{}}}", fields.join(", "))
    }
}

/// Index of the rule that handles `packet`, scanning in `order`.
pub fn select(rules: &[FlowRule], packet: &Packet, order: LookupOrder) -> Option<usize> {
    match order {
        LookupOrder::Insertion => rules.iter().position(|r| r.flow_match().matches(packet)),
        LookupOrder::HighestPriority => rules.iter().rposition(|r| r.flow_match().matches(packet)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn web_packet() -> Packet {
        Packet::flow(
            Ipv4Addr::new(10, 0, 0, 5),
            Ipv4Addr::new(10, 0, 0, 9),
            40000,
            80,
            Protocol::Tcp,
        )
    }

    #[test]
    fn test_wildcard_matches_everything() {
        assert!(FlowMatch::any().is_wildcard());
        assert!(FlowMatch::any().matches(&web_packet()));
        assert!(FlowMatch::any().matches(&Packet::new()));
    }

    #[test]
    fn test_all_fields_must_match() {
        let m = FlowMatch::any()
            .with_protocol(Protocol::Tcp)
            .with_dst_port(80);
        assert!(m.matches(&web_packet()));

        let m = FlowMatch::any()
            .with_protocol(Protocol::Udp)
            .with_dst_port(80);
        assert!(!m.matches(&web_packet()));
    }

    #[test]
    fn test_missing_packet_field_disqualifies() {
        let m = FlowMatch::any().with_size(1500);
        assert!(!m.matches(&web_packet()));
        assert!(m.matches(&web_packet().with_size(1500)));

        let m = FlowMatch::any().with_src_ip(Ipv4Addr::new(10, 0, 0, 5));
        assert!(!m.matches(&Packet::new().with_dst_port(80)));
    }

    #[test]
    fn test_display() {
        let m = FlowMatch::any()
            .with_src_ip(Ipv4Addr::new(10, 0, 0, 10))
            .with_src_port(2049);
        assert_eq!(m.to_string(), "{src_ip=10.0.0.10, src_port=2049}");
        assert_eq!(FlowMatch::any().to_string(), "{*}");
    }

    #[test]
    fn test_unknown_field_rejected_on_deserialize() {
        let ok: FlowMatch = serde_json::from_str(r#"{"dst_port":443,"protocol":"TCP"}"#).unwrap();
        assert_eq!(ok, FlowMatch::any().with_dst_port(443).with_protocol(Protocol::Tcp));

        let err = serde_json::from_str::<FlowMatch>(r#"{"vlan":7}"#);
        assert!(err.is_err());
    }
}
