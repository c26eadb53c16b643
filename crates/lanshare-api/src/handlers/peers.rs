//! /peers handlers.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use lanshare_core::NodeAddress;
use lanshare_services::NodeCommand;

use super::{ask_node, ApiState};

// ── /peers (GET) ──────────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct PeersResponse {
    pub local: String,
    pub peers: Vec<String>,
}

pub async fn handle_peers(State(state): State<ApiState>) -> Json<PeersResponse> {
    let peers = state
        .registry
        .snapshot()
        .into_iter()
        .map(|p| p.to_string())
        .collect();

    Json(PeersResponse {
        local: state.local.to_string(),
        peers,
    })
}

// ── /peers/connect (POST) ─────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct ConnectRequest {
    /// "ip" or "ip:port".
    pub addr: String,
}

#[derive(Debug, Serialize)]
pub struct ConnectResponse {
    pub target: String,
    pub addresses_sent: usize,
}

pub async fn handle_connect(
    State(state): State<ApiState>,
    Json(req): Json<ConnectRequest>,
) -> Result<Json<ConnectResponse>, (StatusCode, String)> {
    let target: NodeAddress = req
        .addr
        .parse()
        .map_err(|e| (StatusCode::BAD_REQUEST, format!("{e}")))?;

    let addresses_sent = ask_node(&state, |reply| NodeCommand::Introduce { target, reply })
        .await?
        .map_err(|e| (StatusCode::BAD_GATEWAY, e))?;

    tracing::info!(%target, addresses_sent, "introduced via API");
    Ok(Json(ConnectResponse {
        target: target.to_string(),
        addresses_sent,
    }))
}
