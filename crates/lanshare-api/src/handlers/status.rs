//! /status and /files handlers.

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use super::ApiState;

// ── /status ──────────────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct StatusResponse {
    pub address: String,
    pub peers_known: usize,
    pub shared_files: usize,
    pub results: usize,
    pub default_ttl: u32,
}

pub async fn handle_status(State(state): State<ApiState>) -> Json<StatusResponse> {
    Json(StatusResponse {
        address: state.local.to_string(),
        peers_known: state.registry.len(),
        shared_files: state.catalog.list().len(),
        results: state.results.len(),
        default_ttl: state.default_ttl,
    })
}

// ── /files ────────────────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct FilesResponse {
    /// Shared files, newest first.
    pub files: Vec<String>,
}

pub async fn handle_files(State(state): State<ApiState>) -> Json<FilesResponse> {
    Json(FilesResponse {
        files: state.catalog.list(),
    })
}
