//! Beacon listener.
//!
//! Receives datagrams on the discovery port. A valid beacon from another
//! host registers that host on the well-known message port; if it was new,
//! our peer list is pushed to it straight away. Anything that is not a
//! beacon is discarded without an error.

use std::net::SocketAddr;

use anyhow::Result;
use tokio::net::UdpSocket;

use lanshare_core::wire::is_beacon;
use lanshare_core::NodeAddress;
use lanshare_services::PeerRegistry;

use crate::gossip::GossipExchanger;

/// Decide what a datagram means. Returns the peer when it is new.
pub fn accept_beacon(
    datagram: &[u8],
    sender: SocketAddr,
    registry: &PeerRegistry,
    message_port: u16,
) -> Option<NodeAddress> {
    if !is_beacon(datagram) {
        tracing::trace!(%sender, len = datagram.len(), "discarding non-beacon datagram");
        return None;
    }

    // Our own broadcast loops back with our IP and an ephemeral port.
    if sender.ip() == registry.local().ip() {
        tracing::trace!("ignoring own beacon");
        return None;
    }

    let peer = NodeAddress::with_port(sender.ip(), message_port);
    registry.insert(peer).then_some(peer)
}

/// Listen for beacons and populate the registry.
///
/// Runs forever — cancel by dropping the task handle.
pub async fn listener_loop(
    socket: UdpSocket,
    registry: PeerRegistry,
    gossip: GossipExchanger,
    message_port: u16,
) -> Result<()> {
    let mut buf = vec![0u8; 1024];

    tracing::info!(addr = ?socket.local_addr().ok(), "beacon listener starting");

    loop {
        let (len, sender) = match socket.recv_from(&mut buf).await {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!(error = %e, "recv_from failed");
                continue;
            }
        };

        if let Some(peer) = accept_beacon(&buf[..len], sender, &registry, message_port) {
            tracing::info!(%peer, known = registry.len(), "peer discovered via beacon");
            gossip.spawn_push(peer);
        }
    }
}
