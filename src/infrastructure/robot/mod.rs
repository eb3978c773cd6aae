//! Robot backends

pub mod simulated;

pub use simulated::{RobotCall, SimulatedRobot};
