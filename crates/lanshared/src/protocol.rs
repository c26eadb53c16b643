//! Search flooding protocol.
//!
//! Decides what a node does with a query, either one it issues itself or a
//! SEARCH that arrived from a peer. The protocol performs no I/O: it
//! returns the deliveries to make and the node carries them out. That
//! keeps the rules below testable against a simulated network.
//!
//! For a query evaluated at this node:
//!
//! - file hosted here, query ours: record self as responder, no traffic.
//! - file hosted here, query relayed: FOUND goes straight to the origin,
//!   one hop, however many relays the SEARCH crossed.
//! - miss, ttl > 1: forward with ttl - 1 to every known peer except the
//!   origin.
//! - miss, ttl <= 1: drop. Nothing signals "not found".
//!
//! A locally issued query goes to every known peer with the full ttl.
//! There is no query id and no seen-cache: in a cyclic peer graph the same
//! query can reach a node several times, each copy spending its own ttl.

use std::sync::Arc;

use lanshare_core::{Message, NodeAddress, WireError};
use lanshare_services::{LocalCatalog, PeerRegistry, SearchResultStore};

/// One outbound message to one peer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    pub target: NodeAddress,
    pub message: Message,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    /// Hosted here and the query is ours; already recorded.
    LocalHit,
    /// Hosted here; reply to the origin.
    Replied(Delivery),
    /// Not hosted here; flood onwards. May be empty when there are no peers.
    Forwarded(Vec<Delivery>),
    /// Not hosted here and out of hops.
    Dropped,
}

impl SearchOutcome {
    pub fn into_deliveries(self) -> Vec<Delivery> {
        match self {
            SearchOutcome::LocalHit | SearchOutcome::Dropped => Vec::new(),
            SearchOutcome::Replied(d) => vec![d],
            SearchOutcome::Forwarded(ds) => ds,
        }
    }
}

#[derive(Clone)]
pub struct SearchProtocol {
    local: NodeAddress,
    catalog: Arc<dyn LocalCatalog>,
    registry: PeerRegistry,
    results: SearchResultStore,
}

impl SearchProtocol {
    pub fn new(
        catalog: Arc<dyn LocalCatalog>,
        registry: PeerRegistry,
        results: SearchResultStore,
    ) -> Self {
        Self {
            local: registry.local(),
            catalog,
            registry,
            results,
        }
    }

    /// Start a query from this node.
    pub fn originate(&self, filename: &str, ttl: u32) -> Result<SearchOutcome, WireError> {
        let query = Message::search(filename, ttl, self.local)?;

        if self.catalog.exists(filename) {
            self.results.record(filename, self.local);
            tracing::info!(filename, "search satisfied locally");
            return Ok(SearchOutcome::LocalHit);
        }

        let deliveries: Vec<Delivery> = self
            .registry
            .snapshot()
            .into_iter()
            .map(|target| Delivery {
                target,
                message: query.clone(),
            })
            .collect();

        tracing::info!(filename, ttl, peers = deliveries.len(), "search issued");
        Ok(SearchOutcome::Forwarded(deliveries))
    }

    /// Evaluate a SEARCH received from a peer.
    pub fn on_search(&self, filename: &str, ttl: u32, origin: NodeAddress) -> SearchOutcome {
        if self.catalog.exists(filename) {
            if origin == self.local {
                self.results.record(filename, self.local);
                return SearchOutcome::LocalHit;
            }
            tracing::debug!(filename, %origin, "hosting requested file, replying to origin");
            return SearchOutcome::Replied(Delivery {
                target: origin,
                message: Message::found(filename, self.local),
            });
        }

        // Our own query echoed back to us; it already went to every peer we know.
        if origin == self.local {
            tracing::trace!(filename, "ignoring own search");
            return SearchOutcome::Dropped;
        }

        if ttl <= 1 {
            tracing::trace!(filename, %origin, "search out of hops, dropping");
            return SearchOutcome::Dropped;
        }

        let forward = Message::Search {
            filename: filename.to_string(),
            ttl: ttl - 1,
            origin_address: origin,
        };
        let deliveries: Vec<Delivery> = self
            .registry
            .snapshot_except(&origin)
            .into_iter()
            .map(|target| Delivery {
                target,
                message: forward.clone(),
            })
            .collect();

        tracing::debug!(filename, %origin, ttl = ttl - 1, peers = deliveries.len(), "forwarding search");
        SearchOutcome::Forwarded(deliveries)
    }

    /// Record a FOUND reply. Returns the responder it replaced, if any.
    pub fn on_found(&self, filename: &str, responder: NodeAddress) -> Option<NodeAddress> {
        tracing::info!(filename, %responder, "search result received");
        self.results.record(filename, responder)
    }
}
