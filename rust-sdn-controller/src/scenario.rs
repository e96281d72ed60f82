//! Scenario configuration for controllers.
//!
//! A scenario file describes one controller: its identity, lookup order,
//! reactive policy, and the switches, links and static rules to install at
//! start-up. Files may be TOML, JSON or YAML (picked by extension); values
//! can be overridden from `SDN_`-prefixed environment variables, e.g.
//! `SDN_NAME=edge-1`.

use log::info;
use rust_sdn_common::{Error, Result};
use rust_sdn_flow::{Action, ActionSpec, FlowMatch, LookupOrder};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::{Controller, ControllerType, ReactivePolicy};

/// Default number of ports for switches that do not state one.
pub const DEFAULT_SWITCH_PORTS: u16 = 4;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwitchSpec {
    pub id: String,

    #[serde(default = "default_ports")]
    pub ports: u16,

    /// Hosts attached to the switch
    #[serde(default)]
    pub hosts: Vec<String>,
}

fn default_ports() -> u16 {
    DEFAULT_SWITCH_PORTS
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionSpec {
    pub source: String,
    pub target: String,
}

/// A static rule to install on start-up.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleSpec {
    pub switch: String,

    #[serde(rename = "match", default)]
    pub flow_match: FlowMatch,

    #[serde(default)]
    pub action: ActionSpec,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    pub name: String,
    pub controller_type: ControllerType,
    pub lookup_order: LookupOrder,
    pub reactive_policy: ReactivePolicy,
    pub switches: Vec<SwitchSpec>,
    pub connections: Vec<ConnectionSpec>,
    pub rules: Vec<RuleSpec>,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            name: "SDN-Controller".to_string(),
            controller_type: ControllerType::OpenFlow,
            lookup_order: LookupOrder::Insertion,
            reactive_policy: ReactivePolicy::default(),
            switches: Vec::new(),
            connections: Vec::new(),
            rules: Vec::new(),
        }
    }
}

/// Load a scenario file, layering environment overrides on top.
pub fn load_config(path: &Path) -> Result<ControllerConfig> {
    if !path.exists() {
        return Err(Error::Config(format!(
            "scenario file {} not found",
            path.display()
        )));
    }

    let settings = config::Config::builder()
        .add_source(config::File::from(path))
        .add_source(
            config::Environment::with_prefix("SDN")
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?;

    let cfg: ControllerConfig = settings.try_deserialize()?;
    info!(
        "Loaded scenario '{}' from {}: {} switches, {} rules",
        cfg.name,
        path.display(),
        cfg.switches.len(),
        cfg.rules.len()
    );
    Ok(cfg)
}

impl Controller {
    /// Build a started controller populated from `cfg`.
    pub fn from_config(cfg: &ControllerConfig) -> Result<Self> {
        let mut controller = Controller::new(cfg.name.clone(), cfg.controller_type)
            .with_lookup_order(cfg.lookup_order)
            .with_reactive_policy(cfg.reactive_policy.clone());
        controller.start();

        for sw in &cfg.switches {
            controller.add_switch(sw.id.as_str(), sw.ports)?;
            for host in &sw.hosts {
                controller.connect_host(&sw.id, host)?;
            }
        }

        for link in &cfg.connections {
            controller.add_connection(&link.source, &link.target);
        }

        for rule in &cfg.rules {
            let action = Action::try_from(rule.action.clone())?;
            controller.add_flow_rule(&rule.switch, rule.flow_match.clone(), action)?;
        }

        Ok(controller)
    }
}
