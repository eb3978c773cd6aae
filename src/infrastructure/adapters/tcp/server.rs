use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use crate::application::errors::RelayError;
use crate::application::messaging::{SessionDispatcher, MAX_FRAME};
use crate::application::services::CommandService;

/// Robot-side server: accepts one client at a time and relays its
/// commands to the robot
pub struct RelayServer {
    listener: TcpListener,
    commands: Arc<CommandService>,
    accept_forever: bool,
}

impl RelayServer {
    pub async fn bind(host: &str, port: u16, commands: Arc<CommandService>) -> Result<Self, RelayError> {
        let listener = TcpListener::bind((host, port)).await?;
        tracing::info!("Relay listening on {}", listener.local_addr()?);

        Ok(Self {
            listener,
            commands,
            accept_forever: false,
        })
    }

    /// Keep accepting clients after the first session ends
    pub fn accept_forever(mut self, enabled: bool) -> Self {
        self.accept_forever = enabled;
        self
    }

    pub fn local_addr(&self) -> Result<SocketAddr, RelayError> {
        Ok(self.listener.local_addr()?)
    }

    /// Serve clients until the (last) session ends
    pub async fn run(self) -> Result<(), RelayError> {
        loop {
            let (stream, peer) = self.listener.accept().await?;
            tracing::info!("Connection from: {}", peer);

            match self.serve(stream).await {
                Ok(handled) => tracing::info!("Session with {} ended after {} commands", peer, handled),
                Err(e) => tracing::warn!("Session with {} aborted: {}", peer, e),
            }

            if !self.accept_forever {
                return Ok(());
            }
        }
    }

    async fn serve(&self, mut stream: TcpStream) -> Result<usize, RelayError> {
        let session = uuid::Uuid::new_v4().to_string();
        let mut dispatcher = SessionDispatcher::new(&session[..8], Arc::clone(&self.commands));
        let mut buf = [0u8; MAX_FRAME];

        loop {
            let n = stream.read(&mut buf).await?;
            if n == 0 {
                break;
            }

            for reply in dispatcher.process(&buf[..n]).await? {
                stream.write_all(reply.as_bytes()).await?;
            }
        }

        stream.shutdown().await.ok();
        Ok(dispatcher.handled())
    }
}
