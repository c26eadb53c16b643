//! lanshare wire format.
//!
//! Two channels exist:
//!
//! - Discovery: connectionless UDP broadcast on DISCOVERY_PORT. The payload
//!   is the fixed BEACON_TAG, nothing else.
//! - Messages: one TCP connection per message on MESSAGE_PORT. The payload
//!   is a single JSON object terminated by `\n`, tagged by its `type` field.
//!
//! Changing a tag or a field name here breaks interop with running nodes.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::address::NodeAddress;

/// UDP port beacons are broadcast to and received on.
pub const DISCOVERY_PORT: u16 = 6001;

/// TCP port every node accepts messages on.
pub const MESSAGE_PORT: u16 = 6000;

/// Hop budget for locally originated searches.
pub const DEFAULT_TTL: u32 = 4;

/// Presence beacon payload.
pub const BEACON_TAG: &[u8] = b"LANSHARE_DISCOVERY";

/// Largest message frame a node will read. A SYNC_PEERS with a few thousand
/// addresses fits comfortably.
pub const MAX_MESSAGE_BYTES: usize = 64 * 1024;

/// Frame terminator.
pub const FRAME_END: u8 = b'\n';

// ── Beacon ────────────────────────────────────────────────────────────────────

/// Does this datagram carry the presence beacon?
///
/// Trailing whitespace is tolerated so that line-oriented senders interop.
pub fn is_beacon(datagram: &[u8]) -> bool {
    datagram.trim_ascii_end() == BEACON_TAG
}

// ── Messages ──────────────────────────────────────────────────────────────────

/// Point-to-point protocol message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    tag = "type",
    rename_all = "SCREAMING_SNAKE_CASE",
    rename_all_fields = "camelCase"
)]
pub enum Message {
    /// A query in flight. `origin_address` is the node that issued the
    /// query, not the node that forwarded it.
    Search {
        filename: String,
        ttl: u32,
        origin_address: NodeAddress,
    },

    /// Reply routed straight back to the query origin.
    Found {
        filename: String,
        responder_address: NodeAddress,
    },

    /// Full peer-list snapshot, sender included.
    SyncPeers { peer_addresses: BTreeSet<NodeAddress> },
}

#[derive(Debug, thiserror::Error)]
pub enum WireError {
    #[error("empty frame")]
    Empty,
    #[error("frame of {0} bytes exceeds limit of {MAX_MESSAGE_BYTES}")]
    Oversize(usize),
    #[error("malformed message: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("search for '{0}' carries ttl 0")]
    ZeroTtl(String),
    #[error("search filename is empty")]
    EmptyFilename,
}

impl Message {
    /// Build a SEARCH. ttl must be at least 1.
    pub fn search(
        filename: impl Into<String>,
        ttl: u32,
        origin_address: NodeAddress,
    ) -> Result<Self, WireError> {
        let filename = filename.into();
        if filename.is_empty() {
            return Err(WireError::EmptyFilename);
        }
        if ttl == 0 {
            return Err(WireError::ZeroTtl(filename));
        }
        Ok(Message::Search {
            filename,
            ttl,
            origin_address,
        })
    }

    pub fn found(filename: impl Into<String>, responder_address: NodeAddress) -> Self {
        Message::Found {
            filename: filename.into(),
            responder_address,
        }
    }

    pub fn sync_peers(peer_addresses: impl IntoIterator<Item = NodeAddress>) -> Self {
        Message::SyncPeers {
            peer_addresses: peer_addresses.into_iter().collect(),
        }
    }

    /// Tag as it appears on the wire. Used in log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            Message::Search { .. } => "SEARCH",
            Message::Found { .. } => "FOUND",
            Message::SyncPeers { .. } => "SYNC_PEERS",
        }
    }

    /// Serialize to a single newline-terminated frame.
    pub fn encode(&self) -> Result<Vec<u8>, WireError> {
        let mut frame = serde_json::to_vec(self)?;
        if frame.len() + 1 > MAX_MESSAGE_BYTES {
            return Err(WireError::Oversize(frame.len() + 1));
        }
        frame.push(FRAME_END);
        Ok(frame)
    }

    /// Parse one frame. The terminator is optional.
    ///
    /// Any failure means the frame is discarded; callers never act on a
    /// partially understood message.
    pub fn decode(frame: &[u8]) -> Result<Self, WireError> {
        if frame.len() > MAX_MESSAGE_BYTES {
            return Err(WireError::Oversize(frame.len()));
        }
        let body = frame.trim_ascii();
        if body.is_empty() {
            return Err(WireError::Empty);
        }
        let message: Message = serde_json::from_slice(body)?;
        if let Message::Search { filename, ttl, .. } = &message {
            if filename.is_empty() {
                return Err(WireError::EmptyFilename);
            }
            if *ttl == 0 {
                return Err(WireError::ZeroTtl(filename.clone()));
            }
        }
        Ok(message)
    }
}
