//! Application services - Command execution and plan orchestration

pub mod command_service;
pub mod plan_service;

pub use command_service::CommandService;
pub use plan_service::PlanService;
