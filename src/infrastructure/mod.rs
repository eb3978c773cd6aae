//! Infrastructure layer - External concerns
//! 
//! This layer contains:
//! - Config: Configuration loading
//! - Robot: Robot SDK backends
//! - Adapters: TCP client/server and the interactive console

pub mod config;
pub mod robot;
pub mod adapters;
