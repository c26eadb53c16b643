//! HTTP API handlers — exposes node state as JSON and forwards user
//! actions to the node.

pub mod peers;
pub mod search;
pub mod status;

use std::sync::Arc;

use axum::http::StatusCode;
use tokio::sync::oneshot;

use lanshare_core::NodeAddress;
use lanshare_services::{
    CommandSender, LocalCatalog, NodeCommand, PeerRegistry, SearchResultStore,
};

#[derive(Clone)]
pub struct ApiState {
    /// The node's own advertised address.
    pub local: NodeAddress,
    pub registry: PeerRegistry,
    pub results: SearchResultStore,
    pub catalog: Arc<dyn LocalCatalog>,
    /// Channel to the node; searches and introductions go through here.
    pub commands: CommandSender,
    pub default_ttl: u32,
}

// ── Shared helpers ────────────────────────────────────────────────────────────

/// Send a command to the node and wait for its immediate reply.
async fn ask_node<T>(
    state: &ApiState,
    build: impl FnOnce(oneshot::Sender<T>) -> NodeCommand,
) -> Result<T, (StatusCode, String)> {
    let (reply_tx, reply_rx) = oneshot::channel();
    state.commands.send(build(reply_tx)).await.map_err(|_| {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            "node is not running".to_string(),
        )
    })?;
    reply_rx.await.map_err(|_| {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            "node dropped the request".to_string(),
        )
    })
}

// Re-export handler functions for use in router setup.
pub use peers::{handle_connect, handle_peers};
pub use search::{handle_result, handle_results, handle_search};
pub use status::{handle_files, handle_status};
