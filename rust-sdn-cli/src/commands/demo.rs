//! Reference architectures for the SDN CLI
//!
//! Two controllers with the same two-switch network: an OpenFlow controller
//! with plain forwarding rules, and a P4 controller whose rules describe QoS
//! rewrites alongside an output port.

use anyhow::{Context, Result};
use log::info;
use rust_sdn_common::{Protocol, QosPriority};
use rust_sdn_controller::{load_config, Controller, ControllerType};
use rust_sdn_flow::{Action, ActionSpec, FieldRewrite, FlowMatch};
use std::path::Path;

use crate::traffic::{BACKUP_SERVER, NFS_PORT};
use crate::utils::print_controller_state;

/// Build both reference controllers
pub fn reference_controllers() -> Result<Vec<Controller>> {
    Ok(vec![openflow_controller()?, p4_controller()?])
}

/// Load the controller described by a scenario file, or fall back to the
/// reference controllers when no file is given
pub fn load_controllers(config: Option<&Path>) -> Result<Vec<Controller>> {
    match config {
        Some(path) => {
            let cfg = load_config(path)
                .with_context(|| format!("Failed to load scenario {}", path.display()))?;
            let controller = Controller::from_config(&cfg)
                .with_context(|| format!("Invalid scenario {}", path.display()))?;
            Ok(vec![controller])
        }
        None => reference_controllers(),
    }
}

fn base_network(name: &str, controller_type: ControllerType) -> Result<Controller> {
    let mut controller = Controller::new(name, controller_type);
    controller.start();
    controller.add_switch("sw1", 4)?;
    controller.add_switch("sw2", 4)?;
    controller.add_connection("sw1", "sw2");
    Ok(controller)
}

pub fn openflow_controller() -> Result<Controller> {
    let mut c = base_network("OpenFlow-Controller", ControllerType::OpenFlow)
        .context("Failed to build OpenFlow network")?;

    c.add_flow_rule("sw1", FlowMatch::any().with_dst_port(80), Action::forward(1))?;
    c.add_flow_rule("sw1", FlowMatch::any().with_dst_port(443), Action::forward(2))?;

    // Backup traffic
    c.add_flow_rule("sw1", backup_match(), Action::forward(4))?;

    Ok(c)
}

pub fn p4_controller() -> Result<Controller> {
    let mut c = base_network("P4-Controller", ControllerType::P4)
        .context("Failed to build P4 network")?;

    // Both rewrite rules also name an output port; the port takes precedence.
    c.add_flow_rule(
        "sw1",
        FlowMatch::any().with_protocol(Protocol::Tcp).with_dst_port(80),
        Action::try_from(ActionSpec {
            forward_port: Some(1),
            drop: false,
            modify: Some(FieldRewrite::qos(QosPriority::High)),
        })?,
    )?;
    c.add_flow_rule(
        "sw1",
        FlowMatch::any().with_protocol(Protocol::Udp),
        Action::forward(3),
    )?;
    c.add_flow_rule(
        "sw1",
        backup_match(),
        Action::try_from(ActionSpec {
            forward_port: Some(4),
            drop: false,
            modify: Some(FieldRewrite::qos(QosPriority::Low)),
        })?,
    )?;

    Ok(c)
}

fn backup_match() -> FlowMatch {
    FlowMatch::any().with_src_ip(BACKUP_SERVER).with_src_port(NFS_PORT)
}

/// Build the reference controllers and print their state
pub fn run_demo() -> Result<()> {
    info!("Building reference SDN architectures");

    for controller in reference_controllers()? {
        print_controller_state(&controller);
    }

    Ok(())
}
