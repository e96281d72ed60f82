//! Switches managed by a controller.

use rust_sdn_common::SwitchId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Administrative status of a switch. Informational only: packets are
/// processed whatever the status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SwitchStatus {
    Active,
    Inactive,
}

impl fmt::Display for SwitchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SwitchStatus::Active => f.write_str("active"),
            SwitchStatus::Inactive => f.write_str("inactive"),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Switch {
    id: SwitchId,
    ports: u16,
    status: SwitchStatus,
    connected_hosts: Vec<String>,
    packet_count: u64,
}

impl Switch {
    pub fn new(id: SwitchId, ports: u16) -> Self {
        Self {
            id,
            ports,
            status: SwitchStatus::Active,
            connected_hosts: Vec::new(),
            packet_count: 0,
        }
    }

    pub fn id(&self) -> &SwitchId {
        &self.id
    }

    pub fn ports(&self) -> u16 {
        self.ports
    }

    pub fn status(&self) -> SwitchStatus {
        self.status
    }

    pub fn connected_hosts(&self) -> &[String] {
        &self.connected_hosts
    }

    /// Packets this switch has handed to the controller's pipeline.
    pub fn packet_count(&self) -> u64 {
        self.packet_count
    }

    pub(crate) fn record_packet(&mut self) {
        self.packet_count += 1;
    }

    pub(crate) fn set_status(&mut self, status: SwitchStatus) {
        self.status = status;
    }

    /// Returns false if the host was already attached.
    pub(crate) fn connect_host(&mut self, host: &str) -> bool {
        if self.connected_hosts.iter().any(|h| h == host) {
            return false;
        }
        self.connected_hosts.push(host.to_string());
        true
    }
}
