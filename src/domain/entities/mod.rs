//! Domain entities - Commands, plan actions and sensors with no I/O

pub mod command;
pub mod direction;
pub mod sensor;

pub use command::{RobotCommand, DEFAULT_CHANNELS, DEFAULT_LISTEN_SECS};
pub use direction::{degrees_to_radians, shortest_turn, Action, Heading};
pub use sensor::{SensorStatus, TouchSensor};
