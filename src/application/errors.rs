//! Application layer errors

use thiserror::Error;

/// General relay errors
#[derive(Error, Debug)]
pub enum RelayError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Network error: {0}")]
    Network(#[from] std::io::Error),

    #[error("Codec error: {0}")]
    Codec(#[from] CodecError),

    #[error("Robot error: {0}")]
    Robot(#[from] RobotError),

    #[error("Plan error: {0}")]
    Plan(#[from] PlanError),

    #[error("Connection closed by peer")]
    ConnectionClosed,

    #[error("Unexpected reply: {0}")]
    UnexpectedReply(String),
}

/// Wire encoding and decoding errors
#[derive(Error, Debug)]
pub enum CodecError {
    #[error("Failed to encode command: {0}")]
    Encode(#[from] rmp_serde::encode::Error),

    #[error("Failed to decode command: {0}")]
    Decode(#[from] rmp_serde::decode::Error),

    #[error("Frame exceeds {limit} bytes")]
    FrameTooLarge { limit: usize },
}

/// Errors raised by a robot backend
#[derive(Error, Debug)]
pub enum RobotError {
    #[error("Robot call {call} failed: {reason}")]
    CallFailed { call: String, reason: String },

    #[error("Unknown sensor: {0}")]
    UnknownSensor(String),

    #[error("Sensor {sensor} missing from status list (index {index})")]
    SensorUnavailable { sensor: String, index: usize },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Plan compilation errors
#[derive(Error, Debug)]
pub enum PlanError {
    #[error("Unknown action: {0}")]
    UnknownAction(String),

    #[error("Empty plan")]
    Empty,
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid value: {0}")]
    InvalidValue(String),

    #[error("No port configured for robot {0}")]
    UnknownRobot(String),

    #[error("Parse error: {0}")]
    Parse(String),
}
