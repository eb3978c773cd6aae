//! Domain traits - Abstractions for infrastructure implementations

pub mod robot;
pub mod sink;

pub use robot::{RobotSdk, RobotInfo};
pub use sink::CommandSink;
