//! Search result store — which node answered for which filename.
//!
//! One responder per filename; a later FOUND overwrites an earlier one.
//! Lives for the whole process, there is no clear.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

use dashmap::DashMap;
use lanshare_core::NodeAddress;

/// A recorded answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchHit {
    pub responder: NodeAddress,
    /// When this answer was recorded. Used for display only, it carries no
    /// ordering relative to when the query was issued.
    pub recorded_at: Instant,
}

#[derive(Debug, Clone, Default)]
pub struct SearchResultStore {
    hits: Arc<DashMap<String, SearchHit>>,
}

impl SearchResultStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `responder` for `filename`, last writer wins.
    /// Returns the responder that was replaced, if any.
    pub fn record(&self, filename: impl Into<String>, responder: NodeAddress) -> Option<NodeAddress> {
        self.hits
            .insert(
                filename.into(),
                SearchHit {
                    responder,
                    recorded_at: Instant::now(),
                },
            )
            .map(|prev| prev.responder)
    }

    pub fn get(&self, filename: &str) -> Option<NodeAddress> {
        self.hits.get(filename).map(|h| h.responder)
    }

    pub fn hit(&self, filename: &str) -> Option<SearchHit> {
        self.hits.get(filename).map(|h| *h)
    }

    /// filename → responder, ordered by filename.
    pub fn snapshot(&self) -> BTreeMap<String, NodeAddress> {
        self.hits
            .iter()
            .map(|e| (e.key().clone(), e.value().responder))
            .collect()
    }

    /// Like `snapshot`, with timestamps.
    pub fn hits(&self) -> BTreeMap<String, SearchHit> {
        self.hits
            .iter()
            .map(|e| (e.key().clone(), *e.value()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.hits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }
}
