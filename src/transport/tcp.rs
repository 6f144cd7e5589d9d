use anyhow::Result;
use async_trait::async_trait;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};

pub const REPLICATE_PREFIX: &str = "REPLICATE:";
pub const GOSSIP_PREFIX: &str = "GOSSIP|";

/// Receiver of inbound `REPLICATE:` messages. Implementations parse the raw
/// line themselves and must never propagate an error back to the connection
/// task; malformed input is logged and dropped.
#[async_trait]
pub trait ReplicateHandler: Send + Sync {
    async fn handle_replicate(&self, message: &str);
}

/// Receiver of inbound `GOSSIP|` messages. Same contract as
/// [`ReplicateHandler`]: log and drop, never fail the connection.
#[async_trait]
pub trait GossipHandler: Send + Sync {
    async fn handle_gossip(&self, message: &str);
}

/// Line-delimited TCP listener with the two message handlers injected at
/// construction time. No per-connection or per-peer customization exists.
pub struct TcpTransport {
    listener: TcpListener,
    replicate: Arc<dyn ReplicateHandler>,
    gossip: Arc<dyn GossipHandler>,
}

impl TcpTransport {
    pub async fn bind(
        addr: &str,
        replicate: Arc<dyn ReplicateHandler>,
        gossip: Arc<dyn GossipHandler>,
    ) -> Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        tracing::info!("TCP transport listening on {}", listener.local_addr()?);

        Ok(Self {
            listener,
            replicate,
            gossip,
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Accepts connections forever, serving each on its own task.
    pub async fn serve(self) {
        loop {
            match self.listener.accept().await {
                Ok((stream, peer)) => {
                    tracing::debug!("Accepted connection from {}", peer);

                    let replicate = self.replicate.clone();
                    let gossip = self.gossip.clone();
                    tokio::spawn(async move {
                        handle_connection(stream, replicate, gossip).await;
                    });
                }
                Err(e) => {
                    tracing::warn!("Failed to accept connection: {}", e);
                }
            }
        }
    }
}

/// Reads newline-terminated messages until the peer closes or a read error
/// occurs. Errors terminate only this connection's task.
async fn handle_connection(
    stream: TcpStream,
    replicate: Arc<dyn ReplicateHandler>,
    gossip: Arc<dyn GossipHandler>,
) {
    let mut lines = BufReader::new(stream).lines();

    loop {
        match lines.next_line().await {
            Ok(Some(message)) => {
                tracing::debug!("Received TCP message: {}", message);

                if message.starts_with(REPLICATE_PREFIX) {
                    replicate.handle_replicate(&message).await;
                } else if message.starts_with(GOSSIP_PREFIX) {
                    gossip.handle_gossip(&message).await;
                } else {
                    tracing::warn!("Unhandled message: {}", message);
                }
            }
            Ok(None) => break,
            Err(e) => {
                tracing::warn!("Error reading from connection: {}", e);
                break;
            }
        }
    }
}

/// Sends one newline-terminated message over a fresh connection, then
/// closes it. Dial and write errors surface to the caller.
pub async fn send_message(address: &str, message: &str) -> Result<()> {
    let mut stream = TcpStream::connect(address).await?;
    stream.write_all(message.as_bytes()).await?;
    stream.write_all(b"\n").await?;
    stream.shutdown().await?;
    Ok(())
}
