//! SDN controller simulator
//!
//! Re-exports the workspace crates under one roof:
//!
//! * [`common`]: packets, errors and performance metrics
//! * [`flow`]: match predicates, actions and per-switch flow tables
//! * [`controller`]: switches, reactive rule installation and reporting

pub use rust_sdn_common as common;
pub use rust_sdn_controller as controller;
pub use rust_sdn_flow as flow;

pub use rust_sdn_common::{Error, Packet, Protocol, QosPriority, Result, SwitchId};
pub use rust_sdn_controller::{Controller, ControllerType, PerformanceReport, ReactivePolicy};
pub use rust_sdn_flow::{Action, ActionOutcome, FlowMatch, FlowTable, LookupOrder};
