use async_trait::async_trait;
use crate::domain::entities::RobotCommand;
use crate::application::errors::RelayError;

/// Anything that accepts commands one at a time and answers each with a reply
#[async_trait]
pub trait CommandSink: Send {
    async fn send(&mut self, command: RobotCommand) -> Result<String, RelayError>;
}
