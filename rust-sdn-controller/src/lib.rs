//! SDN controller for the flow-table simulator.
//!
//! The controller owns the switches and their flow tables. Every packet goes
//! through [`Controller::process_packet`]: a table hit applies the rule's
//! action, a miss is handed to the [`ReactivePolicy`] which may install a new
//! rule before the packet is acted upon. Timings and hit/miss counters are
//! kept in a [`PerformanceMetrics`] owned by the controller.

use log::{debug, info, warn};
use rust_sdn_common::{metrics::PerformanceMetrics, Error, Packet, Result, SwitchId};
use rust_sdn_flow::{Action, ActionOutcome, FlowMatch, FlowTable, LookupOrder};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::time::Instant;

mod reactive;
mod report;
mod scenario;
mod shared;
mod switch;
mod topology;

pub use reactive::{MissDecision, PolicyEntry, ReactivePolicy};
pub use report::PerformanceReport;
pub use scenario::{load_config, ConnectionSpec, ControllerConfig, RuleSpec, SwitchSpec};
pub use shared::SharedController;
pub use switch::{Switch, SwitchStatus};
pub use topology::Topology;

/// Southbound flavour of a controller. Both behave identically here; the
/// type is carried into reports so runs can be told apart.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ControllerType {
    #[default]
    OpenFlow,
    P4,
}

impl fmt::Display for ControllerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ControllerType::OpenFlow => f.write_str("OpenFlow"),
            ControllerType::P4 => f.write_str("P4"),
        }
    }
}

impl FromStr for ControllerType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "openflow" => Ok(ControllerType::OpenFlow),
            "p4" => Ok(ControllerType::P4),
            other => Err(Error::Config(format!("unknown controller type '{}'", other))),
        }
    }
}

#[derive(Debug)]
pub struct Controller {
    name: String,
    controller_type: ControllerType,
    active: bool,
    lookup_order: LookupOrder,
    policy: ReactivePolicy,
    switches: BTreeMap<SwitchId, Switch>,
    flow_tables: BTreeMap<SwitchId, FlowTable>,
    topology: Topology,
    metrics: PerformanceMetrics,
}

impl Controller {
    /// Creates a stopped controller with insertion-order lookup and the
    /// default reactive policy.
    pub fn new(name: impl Into<String>, controller_type: ControllerType) -> Self {
        let name = name.into();
        info!("SDN Controller '{}' ({}) initialized", name, controller_type);
        Self {
            name,
            controller_type,
            active: false,
            lookup_order: LookupOrder::default(),
            policy: ReactivePolicy::default(),
            switches: BTreeMap::new(),
            flow_tables: BTreeMap::new(),
            topology: Topology::new(),
            metrics: PerformanceMetrics::new(),
        }
    }

    /// Sets the scan order for tables of switches added afterwards.
    pub fn with_lookup_order(mut self, order: LookupOrder) -> Self {
        self.lookup_order = order;
        self
    }

    pub fn with_reactive_policy(mut self, policy: ReactivePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn controller_type(&self) -> ControllerType {
        self.controller_type
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn reactive_policy(&self) -> &ReactivePolicy {
        &self.policy
    }

    pub fn start(&mut self) {
        self.active = true;
        info!("Controller '{}' is now active", self.name);
    }

    pub fn stop(&mut self) {
        self.active = false;
        info!("Controller '{}' has been stopped", self.name);
    }

    /// Registers a switch and gives it an empty flow table.
    ///
    /// Refused while the controller is stopped.
    pub fn add_switch(&mut self, switch_id: impl Into<SwitchId>, num_ports: u16) -> Result<()> {
        let switch_id = switch_id.into();
        if !self.active {
            warn!("Cannot add switch {}: controller is not active", switch_id);
            return Err(Error::ControllerInactive);
        }
        if self.switches.contains_key(&switch_id) {
            return Err(Error::SwitchExists(switch_id));
        }

        self.flow_tables.insert(
            switch_id.clone(),
            FlowTable::new(switch_id.clone(), self.lookup_order),
        );
        self.switches
            .insert(switch_id.clone(), Switch::new(switch_id.clone(), num_ports));
        info!("Switch {} with {} ports added to the network", switch_id, num_ports);
        Ok(())
    }

    /// Records a topology link. Has no effect on packet processing.
    pub fn add_connection(&mut self, source: &str, target: &str) {
        if self.topology.add_connection(source, target) {
            info!("Connection added from {} to {}", source, target);
        }
    }

    /// Appends a rule to a switch's table and returns its priority.
    pub fn add_flow_rule(
        &mut self,
        switch_id: &str,
        flow_match: FlowMatch,
        action: Action,
    ) -> Result<u32> {
        let table = self
            .flow_tables
            .get_mut(switch_id)
            .ok_or_else(|| Error::SwitchNotFound(SwitchId::from(switch_id)))?;
        Ok(table.add_rule(flow_match, action))
    }

    /// Runs one packet through a switch's pipeline.
    ///
    /// Allowed whether or not the controller is active.
    pub fn process_packet(&mut self, switch_id: &str, packet: Packet) -> Result<ActionOutcome> {
        let start = Instant::now();

        let switch = self
            .switches
            .get_mut(switch_id)
            .ok_or_else(|| Error::SwitchNotFound(SwitchId::from(switch_id)))?;
        switch.record_packet();

        let table = self
            .flow_tables
            .get_mut(switch_id)
            .ok_or_else(|| Error::SwitchNotFound(SwitchId::from(switch_id)))?;
        let hit = table.match_packet(&packet).map(|rule| rule.action().clone());

        let outcome = match hit {
            Some(action) => {
                self.metrics.record_hit();
                action.apply(packet)
            }
            None => {
                self.metrics.record_miss();
                self.handle_miss(switch_id, packet)?
            }
        };

        if outcome.is_dropped() {
            self.metrics.packets_dropped.increment();
        }
        self.metrics.record_processing_time(start.elapsed());

        Ok(outcome)
    }

    fn handle_miss(&mut self, switch_id: &str, packet: Packet) -> Result<ActionOutcome> {
        match self.policy.decide(&packet) {
            MissDecision::Install { flow_match, action } => {
                debug!(
                    "Miss on {} for {}; installing {} -> {}",
                    switch_id, packet, flow_match, action
                );
                self.add_flow_rule(switch_id, flow_match, action.clone())?;
                self.metrics.rules_installed.increment();
                Ok(action.apply(packet))
            }
            MissDecision::Drop => {
                debug!("Miss on {} for {}; dropping", switch_id, packet);
                Ok(ActionOutcome::Dropped)
            }
        }
    }

    pub fn performance_report(&self) -> PerformanceReport {
        PerformanceReport::from_metrics(&self.name, self.controller_type, &self.metrics)
    }

    pub fn metrics(&self) -> &PerformanceMetrics {
        &self.metrics
    }

    /// Starts a fresh measurement period. Flow tables and switch counters are kept.
    pub fn reset_metrics(&mut self) {
        self.metrics = PerformanceMetrics::new();
    }

    pub fn switch(&self, switch_id: &str) -> Option<&Switch> {
        self.switches.get(switch_id)
    }

    pub fn switches(&self) -> impl Iterator<Item = &Switch> {
        self.switches.values()
    }

    pub fn flow_table(&self, switch_id: &str) -> Option<&FlowTable> {
        self.flow_tables.get(switch_id)
    }

    pub fn flow_tables(&self) -> impl Iterator<Item = &FlowTable> {
        self.flow_tables.values()
    }

    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    pub fn connect_host(&mut self, switch_id: &str, host: &str) -> Result<()> {
        let switch = self
            .switches
            .get_mut(switch_id)
            .ok_or_else(|| Error::SwitchNotFound(SwitchId::from(switch_id)))?;
        if switch.connect_host(host) {
            info!("Host {} connected to switch {}", host, switch_id);
        }
        Ok(())
    }

    pub fn set_switch_status(&mut self, switch_id: &str, status: SwitchStatus) -> Result<()> {
        let switch = self
            .switches
            .get_mut(switch_id)
            .ok_or_else(|| Error::SwitchNotFound(SwitchId::from(switch_id)))?;
        switch.set_status(status);
        info!("Switch {} is now {}", switch_id, status);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_sdn_common::Protocol;
    use std::net::Ipv4Addr;

    fn running() -> Controller {
        let mut c = Controller::new("test", ControllerType::OpenFlow);
        c.start();
        c.add_switch("sw1", 4).unwrap();
        c
    }

    fn web(src: Ipv4Addr, dst_port: u16) -> Packet {
        Packet::new().with_src_ip(src).with_dst_port(dst_port)
    }

    #[test]
    fn test_add_switch_requires_active_controller() {
        let mut c = Controller::new("test", ControllerType::OpenFlow);
        assert!(!c.is_active());
        assert!(matches!(c.add_switch("sw1", 4), Err(Error::ControllerInactive)));
        assert_eq!(c.switches().count(), 0);
        assert!(c.flow_table("sw1").is_none());

        c.start();
        c.add_switch("sw1", 4).unwrap();
        c.stop();
        assert!(matches!(c.add_switch("sw2", 4), Err(Error::ControllerInactive)));
        assert_eq!(c.switches().count(), 1);
    }

    #[test]
    fn test_duplicate_switch_rejected() {
        let mut c = running();
        assert!(matches!(c.add_switch("sw1", 8), Err(Error::SwitchExists(_))));
        assert_eq!(c.switch("sw1").unwrap().ports(), 4);
    }

    #[test]
    fn test_add_flow_rule_unknown_switch() {
        let mut c = running();
        let err = c
            .add_flow_rule("sw9", FlowMatch::any().with_dst_port(80), Action::forward(1))
            .unwrap_err();
        assert!(matches!(err, Error::SwitchNotFound(ref id) if id.as_str() == "sw9"));
        assert!(c.flow_table("sw9").is_none());
    }

    #[test]
    fn test_process_unknown_switch() {
        let mut c = running();
        let err = c
            .process_packet("sw9", web(Ipv4Addr::new(10, 0, 0, 1), 80))
            .unwrap_err();
        assert!(matches!(err, Error::SwitchNotFound(_)));
        assert_eq!(c.metrics().samples(), 0);
    }

    #[test]
    fn test_static_rule_hit() {
        let mut c = running();
        assert_eq!(
            c.add_flow_rule("sw1", FlowMatch::any().with_dst_port(80), Action::forward(1))
                .unwrap(),
            1
        );

        let outcome = c
            .process_packet("sw1", web(Ipv4Addr::new(10, 0, 0, 5), 80))
            .unwrap();
        assert_eq!(outcome, ActionOutcome::Forwarded { port: 1 });

        let m = c.metrics();
        assert_eq!(m.flow_table_hits.value(), 1);
        assert_eq!(m.flow_table_misses.value(), 0);
        assert_eq!(m.controller_requests.value(), 0);
        assert_eq!(m.samples(), 1);
        assert_eq!(c.switch("sw1").unwrap().packet_count(), 1);
        assert_eq!(c.flow_table("sw1").unwrap().rules()[0].hits(), 1);
    }

    #[test]
    fn test_miss_installs_then_hits() {
        let mut c = running();
        let src = Ipv4Addr::new(10, 0, 0, 42);

        let first = c.process_packet("sw1", web(src, 80)).unwrap();
        assert_eq!(first, ActionOutcome::Forwarded { port: 2 });

        let table = c.flow_table("sw1").unwrap();
        assert_eq!(table.len(), 1);
        let rule = &table.rules()[0];
        assert_eq!(rule.flow_match(), &FlowMatch::any().with_src_ip(src).with_dst_port(80));
        assert_eq!(rule.action(), &Action::forward(2));
        assert_eq!(rule.hits(), 0);

        let second = c.process_packet("sw1", web(src, 80)).unwrap();
        assert_eq!(second, ActionOutcome::Forwarded { port: 2 });

        let table = c.flow_table("sw1").unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.rules()[0].hits(), 1);

        let m = c.metrics();
        assert_eq!(m.flow_table_hits.value(), 1);
        assert_eq!(m.flow_table_misses.value(), 1);
        assert_eq!(m.controller_requests.value(), 1);
        assert_eq!(m.rules_installed.value(), 1);
    }

    #[test]
    fn test_https_and_dns_misses() {
        let mut c = running();
        let src = Ipv4Addr::new(10, 0, 0, 3);

        assert_eq!(
            c.process_packet("sw1", web(src, 443)).unwrap(),
            ActionOutcome::Forwarded { port: 2 }
        );
        assert_eq!(
            c.process_packet("sw1", web(src, 53)).unwrap(),
            ActionOutcome::Forwarded { port: 3 }
        );
        assert_eq!(c.flow_table("sw1").unwrap().len(), 2);
    }

    #[test]
    fn test_other_port_miss_drops_without_rule() {
        let mut c = running();
        let outcome = c
            .process_packet("sw1", web(Ipv4Addr::new(10, 0, 0, 3), 22))
            .unwrap();
        assert_eq!(outcome, ActionOutcome::Dropped);
        assert!(c.flow_table("sw1").unwrap().is_empty());
        assert_eq!(c.metrics().packets_dropped.value(), 1);
        assert_eq!(c.metrics().flow_table_misses.value(), 1);
        assert_eq!(c.metrics().rules_installed.value(), 0);
    }

    #[test]
    fn test_processing_allowed_while_stopped() {
        let mut c = running();
        c.stop();
        let outcome = c
            .process_packet("sw1", web(Ipv4Addr::new(10, 0, 0, 3), 80))
            .unwrap();
        assert_eq!(outcome, ActionOutcome::Forwarded { port: 2 });
    }

    #[test]
    fn test_modify_action_returns_rewritten_packet() {
        use rust_sdn_common::QosPriority;
        use rust_sdn_flow::FieldRewrite;

        let mut c = running();
        c.add_flow_rule(
            "sw1",
            FlowMatch::any().with_protocol(Protocol::Udp),
            Action::modify(FieldRewrite::qos(QosPriority::Low)),
        )
        .unwrap();

        let packet = Packet::new().with_protocol(Protocol::Udp).with_dst_port(53);
        match c.process_packet("sw1", packet).unwrap() {
            ActionOutcome::Modified { packet } => {
                assert_eq!(packet.qos_priority, Some(QosPriority::Low));
                assert_eq!(packet.dst_port, Some(53));
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[test]
    fn test_hit_ratio_and_reset() {
        let mut c = running();
        let src = Ipv4Addr::new(10, 0, 0, 8);
        // One miss, three hits.
        for _ in 0..4 {
            c.process_packet("sw1", web(src, 80)).unwrap();
        }
        let report = c.performance_report();
        assert_eq!(report.flow_table_hits, 3);
        assert_eq!(report.flow_table_misses, 1);
        assert!((report.hit_ratio - 75.0).abs() < f64::EPSILON);
        assert_eq!(report.packets_processed, 4);

        c.reset_metrics();
        let report = c.performance_report();
        assert!(!report.has_data());
        assert_eq!(report.hit_ratio, 0.0);
        // Installed rules survive a metrics reset.
        assert_eq!(c.flow_table("sw1").unwrap().len(), 1);
        assert_eq!(c.switch("sw1").unwrap().packet_count(), 4);
    }

    #[test]
    fn test_highest_priority_lookup_order() {
        let mut c = Controller::new("test", ControllerType::P4)
            .with_lookup_order(LookupOrder::HighestPriority);
        c.start();
        c.add_switch("sw1", 4).unwrap();
        c.add_flow_rule("sw1", FlowMatch::any().with_dst_port(80), Action::forward(1))
            .unwrap();
        c.add_flow_rule("sw1", FlowMatch::any().with_dst_port(80), Action::forward(3))
            .unwrap();

        let outcome = c
            .process_packet("sw1", web(Ipv4Addr::new(10, 0, 0, 1), 80))
            .unwrap();
        assert_eq!(outcome, ActionOutcome::Forwarded { port: 3 });
    }

    #[test]
    fn test_switch_administration() {
        let mut c = running();
        c.connect_host("sw1", "h1").unwrap();
        c.set_switch_status("sw1", SwitchStatus::Inactive).unwrap();
        let sw = c.switch("sw1").unwrap();
        assert_eq!(sw.connected_hosts(), ["h1"]);
        assert_eq!(sw.status(), SwitchStatus::Inactive);

        assert!(matches!(
            c.connect_host("sw2", "h1"),
            Err(Error::SwitchNotFound(_))
        ));
        assert!(matches!(
            c.set_switch_status("sw2", SwitchStatus::Active),
            Err(Error::SwitchNotFound(_))
        ));
    }

    #[test]
    fn test_controller_type_parsing() {
        assert_eq!("OpenFlow".parse::<ControllerType>().unwrap(), ControllerType::OpenFlow);
        assert_eq!("p4".parse::<ControllerType>().unwrap(), ControllerType::P4);
        assert!("onos".parse::<ControllerType>().is_err());
    }
}
