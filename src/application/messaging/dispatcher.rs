//! Session dispatcher - Routes decoded commands to the command service

use std::sync::Arc;

use super::codec::{reply_for, reply_for_type, Frame, FrameDecoder};
use crate::application::errors::CodecError;
use crate::application::services::CommandService;
use crate::domain::entities::RobotCommand;

/// Per-connection dispatcher: buffers incoming bytes, runs each complete
/// command and produces one reply per command
pub struct SessionDispatcher {
    session: String,
    decoder: FrameDecoder,
    commands: Arc<CommandService>,
    handled: usize,
}

impl SessionDispatcher {
    pub fn new(session: impl Into<String>, commands: Arc<CommandService>) -> Self {
        Self {
            session: session.into(),
            decoder: FrameDecoder::new(),
            commands,
            handled: 0,
        }
    }

    /// Number of commands handled in this session
    pub fn handled(&self) -> usize {
        self.handled
    }

    /// Feed bytes from the socket and return the replies to send back
    pub async fn process(&mut self, data: &[u8]) -> Result<Vec<String>, CodecError> {
        self.decoder.extend(data);

        let mut replies = Vec::new();
        while let Some(frame) = self.decoder.next_frame()? {
            let reply = match frame {
                Frame::Command(command) => self.dispatch(&command).await,
                Frame::Rejected { kind, reason } => {
                    tracing::warn!("[{}] rejected {} command: {}", self.session, kind, reason);
                    reply_for_type(&kind, Some(&format!("error: {}", reason)))
                }
            };
            replies.push(reply);
        }
        Ok(replies)
    }

    async fn dispatch(&mut self, command: &RobotCommand) -> String {
        tracing::info!("[{}] from connected user: {}", self.session, command);
        self.handled += 1;

        match self.commands.handle(command).await {
            Ok(detail) => reply_for(command, detail.as_deref()),
            Err(e) => {
                tracing::warn!("[{}] {} failed: {}", self.session, command.type_name(), e);
                reply_for(command, Some(&format!("error: {}", e)))
            }
        }
    }
}
