//! Application layer - Use cases and orchestration
//! 
//! This layer contains:
//! - Services: Command execution on the robot, plan compilation
//! - Errors: Relay-specific errors
//! - Messaging: Wire codec, session dispatching, console parsing

pub mod errors;
pub mod services;
pub mod messaging;
