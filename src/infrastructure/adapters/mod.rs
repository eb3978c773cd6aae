//! Adapters - Transports and front-ends for the relay

pub mod console;
pub mod tcp;
