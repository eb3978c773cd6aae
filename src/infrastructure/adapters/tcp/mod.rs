//! TCP transport between the planner-side client and the robot-side server

pub mod client;
pub mod server;

pub use client::RobotClient;
pub use server::RelayServer;
