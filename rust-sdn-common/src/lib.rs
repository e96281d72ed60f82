//! Common types and utilities for the SDN controller simulator.
//!
//! This crate provides the shared vocabulary used by the flow-table engine,
//! the controller and the command-line tooling: packets, switch identifiers,
//! the error type and the performance metric primitives.

pub mod error;
pub mod metrics;
pub mod types;

/// Reexport of common types
pub use error::Error;
pub use types::{Packet, Protocol, QosPriority, SwitchId};
pub type Result<T> = std::result::Result<T, Error>;
