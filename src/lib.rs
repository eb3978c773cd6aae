//! pepper-relay: forwards movement, speech and listen commands from a
//! planner to a robot over a MessagePack-over-TCP link.

pub mod domain;
pub mod application;
pub mod infrastructure;

pub use application::errors::RelayError;
pub use domain::entities::RobotCommand;
pub use infrastructure::adapters::tcp::{RelayServer, RobotClient};
pub use infrastructure::config::Config;
