//! Domain layer - Core relay types with no network dependencies
//! 
//! This layer contains:
//! - Entities: Wire commands, plan actions, touch sensors
//! - Traits: Abstractions for infrastructure (RobotSdk, CommandSink)

pub mod entities;
pub mod traits;
