//! Planner-side client: one request, one reply, in lock-step

use async_trait::async_trait;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

use crate::application::errors::RelayError;
use crate::application::messaging::{codec, MAX_FRAME};
use crate::domain::entities::RobotCommand;
use crate::domain::traits::CommandSink;

/// Client connection to a relay server
pub struct RobotClient {
    stream: TcpStream,
    peer: String,
}

impl RobotClient {
    pub async fn connect(host: &str, port: u16) -> Result<Self, RelayError> {
        let stream = TcpStream::connect((host, port)).await?;
        stream.set_nodelay(true)?;
        let peer = format!("{}:{}", host, port);
        tracing::info!("Connected to relay at {}", peer);

        Ok(Self { stream, peer })
    }

    pub fn peer(&self) -> &str {
        &self.peer
    }

    /// Move straight ahead `distance` meters (negative backs up)
    pub async fn forward(&mut self, distance: f64, block: bool) -> Result<String, RelayError> {
        self.request(RobotCommand::forward(distance, block)).await
    }

    /// Speak a sentence. `\pau=500\` inside the text inserts a 500 ms pause.
    pub async fn say(&mut self, sentence: &str) -> Result<String, RelayError> {
        self.request(RobotCommand::say(sentence)).await
    }

    /// Turn `angle` radians counter-clockwise around the vertical axis
    pub async fn turn(&mut self, angle: f64, block: bool) -> Result<String, RelayError> {
        self.request(RobotCommand::turn(angle, block)).await
    }

    /// Move to a pose relative to the current one (meters, radians)
    pub async fn move_to(&mut self, x: f64, y: f64, theta: f64, block: bool) -> Result<String, RelayError> {
        self.request(RobotCommand::Move { x, y, theta, block }).await
    }

    pub async fn stand(&mut self) -> Result<String, RelayError> {
        self.request(RobotCommand::Stand).await
    }

    pub async fn shutdown(&mut self) -> Result<String, RelayError> {
        self.request(RobotCommand::Shutdown).await
    }

    /// Record from the microphones for `duration` seconds. The recording
    /// is saved next to the server, not sent over the socket.
    pub async fn listen(&mut self, duration: f64, channels: &[u8], playback: bool) -> Result<String, RelayError> {
        self.request(RobotCommand::Listen {
            duration,
            channels: channels.to_vec(),
            playback,
        })
        .await
    }

    /// Whether a touch sensor (e.g. `Head/Touch/Front`) is pressed
    pub async fn touched(&mut self, sensor: &str) -> Result<bool, RelayError> {
        let reply = self.request(RobotCommand::Touched { sensor: sensor.to_string() }).await?;
        match reply.rsplit(": ").next() {
            Some("true") => Ok(true),
            Some("false") => Ok(false),
            _ => Err(RelayError::UnexpectedReply(reply)),
        }
    }

    pub async fn close(mut self) -> Result<(), RelayError> {
        self.stream.shutdown().await?;
        tracing::info!("Closed connection to {}", self.peer);
        Ok(())
    }

    async fn request(&mut self, command: RobotCommand) -> Result<String, RelayError> {
        let frame = codec::encode(&command)?;
        self.stream.write_all(&frame).await?;

        let mut buf = [0u8; MAX_FRAME];
        let n = self.stream.read(&mut buf).await?;
        if n == 0 {
            return Err(RelayError::ConnectionClosed);
        }

        let reply = String::from_utf8_lossy(&buf[..n]).into_owned();
        tracing::debug!("{} -> {}", command, reply);
        Ok(reply)
    }
}

#[async_trait]
impl CommandSink for RobotClient {
    async fn send(&mut self, command: RobotCommand) -> Result<String, RelayError> {
        self.request(command).await
    }
}
