//! Peer-list gossip.
//!
//! Beacons only reach the local broadcast domain. Gossip carries whole
//! peer lists between nodes so that membership spreads transitively: a
//! node pushes its list (itself included, the receiver left out) to every
//! newly discovered peer, and a receiver merges what it gets. Merging is set union, so applying
//! the same payload twice changes nothing.

use std::time::Duration;

use lanshare_core::{Message, NodeAddress};
use lanshare_services::PeerRegistry;

use crate::transport::{self, TransportError};

#[derive(Debug, Clone)]
pub struct GossipExchanger {
    registry: PeerRegistry,
    send_timeout: Duration,
}

impl GossipExchanger {
    pub fn new(registry: PeerRegistry, send_timeout: Duration) -> Self {
        Self {
            registry,
            send_timeout,
        }
    }

    /// SYNC_PEERS for `target`: every known peer except `target`, plus this node.
    pub fn peer_list_for(&self, target: NodeAddress) -> Message {
        let mut peers = self.registry.snapshot_except(&target);
        peers.push(self.registry.local());
        Message::sync_peers(peers)
    }

    /// Push our peer list to `target`. Returns the number of addresses sent.
    pub async fn send_peer_list(&self, target: NodeAddress) -> Result<usize, TransportError> {
        let message = self.peer_list_for(target);
        let count = match &message {
            Message::SyncPeers { peer_addresses } => peer_addresses.len(),
            _ => 0,
        };
        transport::send_message(target, &message, self.send_timeout).await?;
        tracing::debug!(%target, peers = count, "peer list pushed");
        Ok(count)
    }

    /// Fire-and-forget push. Failure is logged, never propagated.
    pub fn spawn_push(&self, target: NodeAddress) {
        let gossip = self.clone();
        tokio::spawn(async move {
            if let Err(e) = gossip.send_peer_list(target).await {
                tracing::warn!(%target, error = %e, "peer list push failed");
            }
        });
    }

    /// Merge a received peer list. Returns how many peers were new.
    pub fn on_receive(&self, peers: impl IntoIterator<Item = NodeAddress>) -> usize {
        let added = self.registry.merge(peers);
        if added > 0 {
            tracing::info!(added, known = self.registry.len(), "peer list updated via gossip");
        }
        added
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;

    fn addr(s: &str) -> NodeAddress {
        s.parse().unwrap()
    }

    fn exchanger(local: &str) -> GossipExchanger {
        GossipExchanger::new(PeerRegistry::new(addr(local)), Duration::from_secs(2))
    }

    #[test]
    fn peer_list_includes_self() {
        let gossip = exchanger("10.0.0.1");
        gossip.registry.insert(addr("10.0.0.2"));
        assert_eq!(
            gossip.peer_list_for(addr("10.0.0.9")),
            Message::sync_peers([addr("10.0.0.1"), addr("10.0.0.2")])
        );
    }

    #[test]
    fn peer_list_leaves_out_the_receiver() {
        let gossip = exchanger("10.0.0.1");
        gossip.registry.insert(addr("10.0.0.2"));
        gossip.registry.insert(addr("10.0.0.3"));
        assert_eq!(
            gossip.peer_list_for(addr("10.0.0.2")),
            Message::sync_peers([addr("10.0.0.1"), addr("10.0.0.3")])
        );
    }

    #[test]
    fn peer_list_of_lonely_node_is_just_self() {
        let gossip = exchanger("10.0.0.1");
        assert_eq!(
            gossip.peer_list_for(addr("10.0.0.2")),
            Message::sync_peers([addr("10.0.0.1")])
        );
    }

    #[test]
    fn receive_excludes_self_and_is_idempotent() {
        let gossip = exchanger("10.0.0.1");
        let payload = [addr("10.0.0.1"), addr("10.0.0.2"), addr("10.0.0.3")];

        assert_eq!(gossip.on_receive(payload), 2);
        let once = gossip.registry.snapshot();
        assert_eq!(gossip.on_receive(payload), 0);
        assert_eq!(gossip.registry.snapshot(), once);
        assert!(!gossip.registry.contains(&addr("10.0.0.1")));
    }

    #[tokio::test]
    async fn send_peer_list_reaches_target() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let target = NodeAddress::from(listener.local_addr().unwrap());
        let gossip = exchanger("10.0.0.1");
        gossip.registry.insert(addr("10.0.0.2"));

        let server = tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            transport::read_message(&mut stream, Duration::from_secs(2))
                .await
                .unwrap()
        });

        let sent = gossip.send_peer_list(target).await.unwrap();
        assert_eq!(sent, 2);
        assert_eq!(
            server.await.unwrap(),
            Message::sync_peers([addr("10.0.0.1"), addr("10.0.0.2")])
        );
    }
}
