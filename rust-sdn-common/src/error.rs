//! Error types for the SDN controller simulator.

use thiserror::Error;

use crate::types::SwitchId;

/// All possible errors that can occur within the controller and its flow tables.
#[derive(Error, Debug)]
pub enum Error {
    /// A switch was added while the controller was stopped.
    #[error("controller is not active")]
    ControllerInactive,

    /// The referenced switch has not been added to the controller.
    #[error("switch {0} does not exist")]
    SwitchNotFound(SwitchId),

    /// A switch with the same id is already registered.
    #[error("switch {0} already exists")]
    SwitchExists(SwitchId),

    /// An action description carries no recognised action kind.
    #[error("invalid action: {0}")]
    InvalidAction(String),

    /// Error while loading or interpreting a scenario configuration.
    #[error("configuration error: {0}")]
    Config(String),
}

impl From<config::ConfigError> for Error {
    fn from(err: config::ConfigError) -> Self {
        Error::Config(err.to_string())
    }
}
