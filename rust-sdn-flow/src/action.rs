//! Flow rule actions and their execution.

use rust_sdn_common::{Error, Packet, Protocol, QosPriority, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::Ipv4Addr;

/// Field values a modify action writes onto a packet. Unset fields are left alone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldRewrite {
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

impl FieldRewrite {
    pub fn qos(qos: QosPriority) -> Self {
        Self {
            qos_priority: Some(qos),
            ..Self::default()
        }
    }

    pub fn apply(&self, packet: &mut Packet) {
        if let Some(v) = self.src_ip {
            packet.src_ip = Some(v);
        }
        if let Some(v) = self.dst_ip {
            packet.dst_ip = Some(v);
        }
        if let Some(v) = self.src_port {
            packet.src_port = Some(v);
        }
        if let Some(v) = self.dst_port {
            packet.dst_port = Some(v);
        }
        if let Some(v) = self.protocol {
            packet.protocol = Some(v);
        }
        if let Some(v) = self.size {
            packet.size = Some(v);
        }
        if let Some(v) = self.qos_priority {
            packet.qos_priority = Some(v);
        }
    }
}

impl fmt::Display for FieldRewrite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Same layout as a packet carrying only the rewritten fields.
        let mut shown = Packet::new();
        self.apply(&mut shown);
        write!(f, "{}", shown)
    }
}

/// What a switch does with a packet that hit a rule. Exactly one kind applies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Action {
    Forward { port: u16 },
    Drop,
    Modify { fields: FieldRewrite },
}

impl Action {
    pub fn forward(port: u16) -> Self {
        Action::Forward { port }
    }

    pub fn modify(fields: FieldRewrite) -> Self {
        Action::Modify { fields }
    }

    /// Executes the action against `packet`.
    pub fn apply(&self, mut packet: Packet) -> ActionOutcome {
        match self {
            Action::Forward { port } => ActionOutcome::Forwarded { port: *port },
            Action::Drop => ActionOutcome::Dropped,
            Action::Modify { fields } => {
                fields.apply(&mut packet);
                ActionOutcome::Modified { packet }
            }
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Forward { port } => write!(f, "forward({})", port),
            Action::Drop => f.write_str("drop"),
            Action::Modify { fields } => write!(f, "modify{}", fields),
        }
    }
}

/// Loose action description as written in scenario files: any combination
/// of keys may be present.
///
/// Conversion keeps a single kind with precedence forward, then drop, then
/// modify. A description that sets both `forward_port` and `modify` therefore
/// forwards without rewriting the packet. `drop = false` counts as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ActionSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub forward_port: Option<u16>,
    #[serde(default)]
    pub drop: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modify: Option<FieldRewrite>,
}

impl TryFrom<ActionSpec> for Action {
    type Error = Error;

    fn try_from(spec: ActionSpec) -> Result<Self> {
        if let Some(port) = spec.forward_port {
            return Ok(Action::Forward { port });
        }
        if spec.drop {
            return Ok(Action::Drop);
        }
        if let Some(fields) = spec.modify {
            return Ok(Action::Modify { fields });
        }
        Err(Error::InvalidAction(
            "expected one of forward_port, drop or modify".to_string(),
        ))
    }
}

/// Result of running a packet through an action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ActionOutcome {
    Forwarded { port: u16 },
    Dropped,
    Modified { packet: Packet },
}

impl ActionOutcome {
    pub fn is_dropped(&self) -> bool {
        matches!(self, ActionOutcome::Dropped)
    }
}

impl fmt::Display for ActionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionOutcome::Forwarded { port } => write!(f, "forwarded to port {}", port),
            ActionOutcome::Dropped => f.write_str("dropped"),
            ActionOutcome::Modified { packet } => write!(f, "modified {}", packet),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forward_and_drop() {
        let packet = Packet::new().with_dst_port(80);
        assert_eq!(
            Action::forward(2).apply(packet.clone()),
            ActionOutcome::Forwarded { port: 2 }
        );
        assert_eq!(Action::Drop.apply(packet), ActionOutcome::Dropped);
    }

    #[test]
    fn test_modify_rewrites_packet() {
        let packet = Packet::new()
            .with_src_ip(Ipv4Addr::new(10, 0, 0, 10))
            .with_src_port(2049);
        let action = Action::modify(FieldRewrite::qos(QosPriority::Low));

        match action.apply(packet) {
            ActionOutcome::Modified { packet } => {
                assert_eq!(packet.qos_priority, Some(QosPriority::Low));
                assert_eq!(packet.src_port, Some(2049));
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[test]
    fn test_spec_forward_wins_over_modify() {
        let spec = ActionSpec {
            forward_port: Some(1),
            drop: false,
            modify: Some(FieldRewrite::qos(QosPriority::High)),
        };
        assert_eq!(Action::try_from(spec).unwrap(), Action::forward(1));
    }

    #[test]
    fn test_spec_drop_wins_over_modify() {
        let spec = ActionSpec {
            forward_port: None,
            drop: true,
            modify: Some(FieldRewrite::qos(QosPriority::High)),
        };
        assert_eq!(Action::try_from(spec).unwrap(), Action::Drop);
    }

    #[test]
    fn test_empty_spec_is_invalid() {
        let err = Action::try_from(ActionSpec::default()).unwrap_err();
        assert!(matches!(err, Error::InvalidAction(_)));
    }

    #[test]
    fn test_drop_false_is_not_a_kind() {
        let spec: ActionSpec = serde_json::from_str(r#"{"drop": false}"#).unwrap();
        let err = Action::try_from(spec).unwrap_err();
        assert!(matches!(err, Error::InvalidAction(_)));

        let spec: ActionSpec =
            serde_json::from_str(r#"{"drop": false, "modify": {"qos_priority": "high"}}"#).unwrap();
        assert!(matches!(Action::try_from(spec).unwrap(), Action::Modify { .. }));
    }

    #[test]
    fn test_outcome_json_shape() {
        let json = serde_json::to_string(&ActionOutcome::Forwarded { port: 1 }).unwrap();
        assert_eq!(json, r#"{"status":"forwarded","port":1}"#);
        let json = serde_json::to_string(&ActionOutcome::Dropped).unwrap();
        assert_eq!(json, r#"{"status":"dropped"}"#);
    }

    #[test]
    fn test_display() {
        assert_eq!(Action::forward(4).to_string(), "forward(4)");
        assert_eq!(Action::Drop.to_string(), "drop");
        assert_eq!(
            Action::modify(FieldRewrite::qos(QosPriority::High)).to_string(),
            "modify{qos_priority=high}"
        );
    }
}
