//! Per-switch flow tables for the SDN controller simulator.
//!
//! A flow table is an append-only list of rules. Each rule pairs a conjunctive
//! match predicate with exactly one action; lookup is a linear first-match
//! scan whose direction is fixed per table by [`LookupOrder`].

pub mod action;
pub mod flow_table;
pub mod matcher;

pub use action::{Action, ActionOutcome, ActionSpec, FieldRewrite};
pub use flow_table::{FlowRule, FlowTable, RuleSnapshot};
pub use matcher::{FlowMatch, LookupOrder};
