//! The node — owns all per-process state and ties the protocol pieces
//! to sockets.
//!
//! `Node` is a cheap handle; clones share the same registry, result store,
//! search protocol and configuration.

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::net::{TcpListener, UdpSocket};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use lanshare_core::config::LanshareConfig;
use lanshare_core::{Message, NodeAddress, WireError};
use lanshare_services::{
    CommandReceiver, LocalCatalog, NodeCommand, PeerRegistry, SearchDispatch, SearchResultStore,
};

use crate::connection::ConnectionListener;
use crate::discovery::{self, broadcast as beacon, listener};
use crate::gossip::GossipExchanger;
use crate::protocol::{Delivery, SearchOutcome, SearchProtocol};
use crate::transport::{self, TransportError};

// ── Sockets ───────────────────────────────────────────────────────────────────

/// Listening sockets, bound before the node starts.
pub struct Listeners {
    pub message: TcpListener,
    pub discovery: Option<UdpSocket>,
}

impl Listeners {
    /// Bind the message listener and, if discovery is on, the beacon
    /// listener. Any failure is fatal: the node cannot work without them.
    pub async fn bind(config: &LanshareConfig) -> Result<Self> {
        let message_addr = SocketAddr::new(config.network.bind_addr, config.network.message_port);
        let message = TcpListener::bind(message_addr)
            .await
            .with_context(|| format!("failed to bind message listener on {message_addr}"))?;

        let discovery = if config.discovery.enabled {
            let addr = SocketAddr::new(config.network.bind_addr, config.network.discovery_port);
            let socket = discovery::bind_listener_socket(addr)
                .with_context(|| format!("failed to bind discovery listener on {addr}"))?;
            Some(UdpSocket::from_std(socket).context("failed to convert to tokio UdpSocket")?)
        } else {
            None
        };

        Ok(Self { message, discovery })
    }

    /// Port the message listener actually bound (matters when configured as 0).
    pub fn message_port(&self) -> Result<u16> {
        Ok(self.message.local_addr()?.port())
    }
}

/// Handles of the long-lived node tasks.
pub struct NodeTasks {
    pub connections: JoinHandle<Result<()>>,
    pub beacon_listener: Option<JoinHandle<Result<()>>>,
    pub beacon_broadcast: Option<JoinHandle<Result<()>>>,
}

// ── Node ──────────────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct Node {
    inner: Arc<NodeInner>,
}

struct NodeInner {
    config: LanshareConfig,
    registry: PeerRegistry,
    results: SearchResultStore,
    protocol: SearchProtocol,
    gossip: GossipExchanger,
}

impl Node {
    pub fn new(config: LanshareConfig, local: NodeAddress, catalog: Arc<dyn LocalCatalog>) -> Self {
        let registry = PeerRegistry::new(local);
        let results = SearchResultStore::new();
        let protocol = SearchProtocol::new(catalog, registry.clone(), results.clone());
        let gossip = GossipExchanger::new(registry.clone(), config.search.send_timeout());

        Self {
            inner: Arc::new(NodeInner {
                config,
                registry,
                results,
                protocol,
                gossip,
            }),
        }
    }

    pub fn local(&self) -> NodeAddress {
        self.inner.registry.local()
    }

    pub fn registry(&self) -> &PeerRegistry {
        &self.inner.registry
    }

    pub fn results(&self) -> &SearchResultStore {
        &self.inner.results
    }

    pub fn send_timeout(&self) -> Duration {
        self.inner.config.search.send_timeout()
    }

    pub fn read_timeout(&self) -> Duration {
        self.inner.config.search.read_timeout()
    }

    /// Issue a search from this node. `ttl: None` uses the configured default.
    ///
    /// Returns as soon as the query is dispatched; SEARCH deliveries run in
    /// the background and replies show up in the result store.
    pub fn search(&self, filename: &str, ttl: Option<u32>) -> Result<SearchDispatch, WireError> {
        let ttl = ttl.unwrap_or(self.inner.config.search.default_ttl);
        let outcome = self.inner.protocol.originate(filename, ttl)?;
        let local_hit = matches!(outcome, SearchOutcome::LocalHit);

        let deliveries = outcome.into_deliveries();
        let forwarded_to = deliveries.len();
        if !deliveries.is_empty() {
            let node = self.clone();
            tokio::spawn(async move {
                node.deliver(deliveries).await;
            });
        }

        Ok(SearchDispatch {
            filename: filename.to_string(),
            ttl,
            local_hit,
            forwarded_to,
        })
    }

    /// Push our peer list to `target` and remember it as a peer.
    pub async fn introduce(&self, target: NodeAddress) -> Result<usize, TransportError> {
        let sent = self.inner.gossip.send_peer_list(target).await?;
        if self.inner.registry.insert(target) {
            tracing::info!(peer = %target, "peer added by introduction");
        }
        Ok(sent)
    }

    /// Act on one inbound message.
    pub async fn handle_message(&self, message: Message) {
        match message {
            Message::Search {
                filename,
                ttl,
                origin_address,
            } => {
                let outcome = self.inner.protocol.on_search(&filename, ttl, origin_address);
                self.deliver(outcome.into_deliveries()).await;
            }
            Message::Found {
                filename,
                responder_address,
            } => {
                self.inner.protocol.on_found(&filename, responder_address);
            }
            Message::SyncPeers { peer_addresses } => {
                self.inner.gossip.on_receive(peer_addresses);
            }
        }
    }

    /// Send every delivery concurrently. A failed edge is logged and does
    /// not affect the others. Returns the number that succeeded.
    pub async fn deliver(&self, deliveries: Vec<Delivery>) -> usize {
        if deliveries.is_empty() {
            return 0;
        }
        let timeout = self.send_timeout();
        let sends = deliveries.into_iter().map(|d| async move {
            match transport::send_message(d.target, &d.message, timeout).await {
                Ok(()) => true,
                Err(e) => {
                    tracing::warn!(
                        peer = %d.target,
                        kind = d.message.kind(),
                        error = %e,
                        "delivery failed"
                    );
                    false
                }
            }
        });
        futures::future::join_all(sends)
            .await
            .into_iter()
            .filter(|ok| *ok)
            .count()
    }

    /// Spawn the message acceptor and, when discovery sockets were bound,
    /// the beacon listener and broadcaster.
    pub fn spawn(&self, listeners: Listeners, shutdown: broadcast::Receiver<()>) -> NodeTasks {
        let connections = tokio::spawn(
            ConnectionListener::new(listeners.message, self.clone(), shutdown).run(),
        );

        let (beacon_listener, beacon_broadcast) = match listeners.discovery {
            Some(socket) => {
                let network = &self.inner.config.network;
                // Beacon peers are assumed to listen where we do. The
                // configured port may be 0; the bound one never is.
                let listener_task = tokio::spawn(listener::listener_loop(
                    socket,
                    self.inner.registry.clone(),
                    self.inner.gossip.clone(),
                    self.local().port(),
                ));

                let dest = SocketAddr::new(IpAddr::V4(network.broadcast_addr), network.discovery_port);
                let (min, max) = self.inner.config.discovery.interval_bounds();
                let broadcast_task = tokio::spawn(async move {
                    let result = beacon::broadcast_loop(dest, min, max).await;
                    if let Err(e) = &result {
                        tracing::error!(error = %e, "beacon broadcast failed");
                    }
                    result
                });

                (Some(listener_task), Some(broadcast_task))
            }
            None => {
                tracing::info!("discovery disabled, peers only via gossip");
                (None, None)
            }
        };

        NodeTasks {
            connections,
            beacon_listener,
            beacon_broadcast,
        }
    }

    /// Serve commands from the API until the channel closes.
    pub async fn serve_commands(self, mut commands: CommandReceiver) {
        while let Some(command) = commands.recv().await {
            match command {
                NodeCommand::Search {
                    filename,
                    ttl,
                    reply,
                } => {
                    let result = self.search(&filename, ttl).map_err(|e| e.to_string());
                    let _ = reply.send(result);
                }
                NodeCommand::Introduce { target, reply } => {
                    if target == self.local() {
                        let _ = reply.send(Err(format!("{target} is this node")));
                        continue;
                    }
                    let node = self.clone();
                    tokio::spawn(async move {
                        let result = node.introduce(target).await.map_err(|e| e.to_string());
                        let _ = reply.send(result);
                    });
                }
            }
        }
        tracing::debug!("command channel closed");
    }
}
