//! WebSocket server for dashboard clients
//!
//! Each connection becomes one subscriber: it gets the snapshot of active
//! alerts, then every event published afterwards, as JSON text frames.

use crate::scanner::ScannerHandle;
use futures_util::{SinkExt, StreamExt};
use std::net::SocketAddr;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::watch;
use tokio_tungstenite::{accept_async, tungstenite, tungstenite::Message};

/// Accepts dashboard connections and streams scanner events to them
pub struct DashboardServer {
    listener: TcpListener,
    handle: ScannerHandle,
}

impl DashboardServer {
    /// Bind the listening socket
    pub async fn bind(addr: &str, handle: ScannerHandle) -> anyhow::Result<Self> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to bind dashboard server on {}: {}", addr, e))?;

        Ok(Self { listener, handle })
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Accept connections until `shutdown` flips
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        if let Ok(addr) = self.listener.local_addr() {
            tracing::info!(%addr, "Dashboard server listening");
        }

        loop {
            tokio::select! {
                accepted = self.listener.accept() => {
                    match accepted {
                        Ok((stream, peer)) => {
                            let handle = self.handle.clone();
                            tokio::spawn(async move {
                                if let Err(e) = serve_client(stream, peer, handle).await {
                                    tracing::debug!(%peer, error = %e, "Dashboard connection ended with error");
                                }
                            });
                        }
                        Err(e) => {
                            tracing::warn!(error = %e, "Failed to accept connection");
                        }
                    }
                }
                _ = shutdown.changed() => {
                    tracing::info!("Dashboard server shutting down");
                    break;
                }
            }
        }
    }
}

async fn serve_client(
    stream: TcpStream,
    peer: SocketAddr,
    handle: ScannerHandle,
) -> Result<(), tungstenite::Error> {
    let ws_stream = accept_async(stream).await?;
    let (mut write, mut read) = ws_stream.split();

    let mut subscription = handle.subscribe().await;
    let id = subscription.id();
    tracing::info!(%peer, subscriber = %id, "Dashboard client connected");

    let result = loop {
        tokio::select! {
            event = subscription.recv() => {
                let Some(event) = event else {
                    break Ok(());
                };
                let text = match event.to_json() {
                    Ok(text) => text,
                    Err(e) => {
                        tracing::error!(error = %e, event = event.type_name(), "Failed to serialize event");
                        continue;
                    }
                };
                if let Err(e) = write.send(Message::Text(text)).await {
                    break Err(e);
                }
            }
            msg = read.next() => {
                match msg {
                    Some(Ok(Message::Close(_))) | None => break Ok(()),
                    Some(Ok(Message::Ping(data))) => {
                        if let Err(e) = write.send(Message::Pong(data)).await {
                            break Err(e);
                        }
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => break Err(e),
                }
            }
        }
    };

    handle.unsubscribe(id).await;
    tracing::info!(%peer, subscriber = %id, "Dashboard client disconnected");

    result
}
