//! Inbound message connections.
//!
//! Each accepted connection gets its own task: read one message, hand it
//! to the node, close. A connection that times out or carries something
//! undecodable is dropped and nothing else happens; the accept loop never
//! sees the error.

use std::net::SocketAddr;

use anyhow::Result;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::broadcast;

use crate::node::Node;
use crate::transport;

pub struct ConnectionListener {
    listener: TcpListener,
    node: Node,
    shutdown: broadcast::Receiver<()>,
}

impl ConnectionListener {
    pub fn new(listener: TcpListener, node: Node, shutdown: broadcast::Receiver<()>) -> Self {
        Self {
            listener,
            node,
            shutdown,
        }
    }

    pub async fn run(mut self) -> Result<()> {
        tracing::info!(addr = ?self.listener.local_addr().ok(), "message listener starting");

        loop {
            tokio::select! {
                _ = self.shutdown.recv() => {
                    tracing::info!("message listener shutting down");
                    return Ok(());
                }

                result = self.listener.accept() => {
                    let (stream, peer) = match result {
                        Ok(r) => r,
                        Err(e) => {
                            tracing::warn!(error = %e, "accept failed");
                            continue;
                        }
                    };
                    tokio::spawn(handle_connection(self.node.clone(), stream, peer));
                }
            }
        }
    }
}

/// Read the one message on `stream` and dispatch it.
pub async fn handle_connection(node: Node, mut stream: TcpStream, peer: SocketAddr) {
    let message = match transport::read_message(&mut stream, node.read_timeout()).await {
        Ok(m) => m,
        Err(e) => {
            tracing::debug!(%peer, error = %e, "dropping connection");
            return;
        }
    };

    tracing::debug!(%peer, kind = message.kind(), "message received");
    node.handle_message(message).await;
}
