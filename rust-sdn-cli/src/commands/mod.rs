//! Subcommand implementations for the SDN CLI

pub mod benchmark;
pub mod demo;
pub mod evaluate;
pub mod process;
pub mod timeline;
