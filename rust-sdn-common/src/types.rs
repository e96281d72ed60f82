//! Common types shared between the flow-table engine and the controller.
//!
//! Packets are plain values: every header field is optional so that a packet
//! only carries what its producer filled in, and a match predicate can tell a
//! missing field apart from a mismatching one.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;

use crate::error::Error;

/// Identifier of a switch managed by a controller (e.g. `"sw1"`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SwitchId(pub String);

impl SwitchId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SwitchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SwitchId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for SwitchId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl Borrow<str> for SwitchId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Transport protocol carried by a packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Protocol {
    Tcp,
    Udp,
    Icmp,
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Protocol::Tcp => "TCP",
            Protocol::Udp => "UDP",
            Protocol::Icmp => "ICMP",
        };
        f.write_str(s)
    }
}

impl FromStr for Protocol {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "TCP" => Ok(Protocol::Tcp),
            "UDP" => Ok(Protocol::Udp),
            "ICMP" => Ok(Protocol::Icmp),
            other => Err(Error::Config(format!("unknown protocol '{}'", other))),
        }
    }
}

/// QoS marking that a modify action may stamp on a packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QosPriority {
    Low,
    Normal,
    High,
}

impl fmt::Display for QosPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            QosPriority::Low => "low",
            QosPriority::Normal => "normal",
            QosPriority::High => "high",
        };
        f.write_str(s)
    }
}

impl FromStr for QosPriority {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "low" => Ok(QosPriority::Low),
            "normal" => Ok(QosPriority::Normal),
            "high" => Ok(QosPriority::High),
            other => Err(Error::Config(format!("unknown QoS priority '{}'", other))),
        }
    }
}

/// A packet as seen by a switch.
///
/// Fields the producer did not set stay `None`; a rule that requires such a
/// field never matches the packet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Packet {
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
    /// Payload size in bytes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qos_priority: Option<QosPriority>,
}

impl Packet {
    /// Creates a packet with no fields set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a fully addressed packet, the shape produced by traffic generators.
    pub fn flow(
        src_ip: Ipv4Addr,
        dst_ip: Ipv4Addr,
        src_port: u16,
        dst_port: u16,
        protocol: Protocol,
    ) -> Self {
        Self {
            src_ip: Some(src_ip),
            dst_ip: Some(dst_ip),
            src_port: Some(src_port),
            dst_port: Some(dst_port),
            protocol: Some(protocol),
            size: None,
            qos_priority: None,
        }
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
}

impl fmt::Display for Packet {
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
        write!(f, "{{{}}}", fields.join(", "))
    }
}
