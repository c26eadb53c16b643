//! Peer registry — every node address this node has learned about.
//!
//! Populated by the discovery listener (one address per beacon) and by
//! gossip (bulk merge). Read by the search protocol for fan-out and by
//! gossip for snapshots. Entries are never removed.

use std::sync::Arc;

use dashmap::DashSet;
use lanshare_core::NodeAddress;

/// Shared set of known peers. Never contains the local address.
#[derive(Debug, Clone)]
pub struct PeerRegistry {
    local: NodeAddress,
    peers: Arc<DashSet<NodeAddress>>,
}

impl PeerRegistry {
    pub fn new(local: NodeAddress) -> Self {
        Self {
            local,
            peers: Arc::new(DashSet::new()),
        }
    }

    /// The address this registry treats as self.
    pub fn local(&self) -> NodeAddress {
        self.local
    }

    /// Atomic check-and-insert. Returns true only when `addr` was not
    /// known before and is not the local address, so exactly one caller
    /// observes a given peer as new.
    pub fn insert(&self, addr: NodeAddress) -> bool {
        if addr == self.local {
            return false;
        }
        self.peers.insert(addr)
    }

    /// Set union with `addrs`, minus self. Returns how many were new.
    pub fn merge(&self, addrs: impl IntoIterator<Item = NodeAddress>) -> usize {
        addrs.into_iter().filter(|a| self.insert(*a)).count()
    }

    pub fn contains(&self, addr: &NodeAddress) -> bool {
        self.peers.contains(addr)
    }

    /// Sorted copy of the current membership.
    pub fn snapshot(&self) -> Vec<NodeAddress> {
        let mut peers: Vec<NodeAddress> = self.peers.iter().map(|p| *p).collect();
        peers.sort();
        peers
    }

    /// Sorted copy of the membership without `excluded`.
    pub fn snapshot_except(&self, excluded: &NodeAddress) -> Vec<NodeAddress> {
        let mut peers = self.snapshot();
        peers.retain(|p| p != excluded);
        peers
    }

    pub fn len(&self) -> usize {
        self.peers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.peers.is_empty()
    }
}
