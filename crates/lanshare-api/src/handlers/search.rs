//! /search and /results handlers.
//!
//! A search request returns once the query has left this node. Answers
//! arrive asynchronously; clients poll /results/{filename}.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use lanshare_services::{NodeCommand, SearchDispatch, SearchHit};

use super::{ask_node, ApiState};

// ── /search (POST) ────────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct SearchRequest {
    pub filename: String,
    #[serde(default)]
    pub ttl: Option<u32>,
}

pub async fn handle_search(
    State(state): State<ApiState>,
    Json(req): Json<SearchRequest>,
) -> Result<Json<SearchDispatch>, (StatusCode, String)> {
    let filename = req.filename.trim().to_string();
    if filename.is_empty() {
        return Err((StatusCode::BAD_REQUEST, "filename is empty".to_string()));
    }
    if req.ttl == Some(0) {
        return Err((StatusCode::BAD_REQUEST, "ttl must be at least 1".to_string()));
    }

    let ttl = req.ttl;
    let dispatch = ask_node(&state, |reply| NodeCommand::Search {
        filename,
        ttl,
        reply,
    })
    .await?
    .map_err(|e| (StatusCode::BAD_REQUEST, e))?;

    tracing::info!(
        filename = %dispatch.filename,
        ttl = dispatch.ttl,
        local_hit = dispatch.local_hit,
        forwarded_to = dispatch.forwarded_to,
        "search issued via API"
    );
    Ok(Json(dispatch))
}

// ── /results ──────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct ResultEntry {
    pub filename: String,
    pub responder: String,
    pub age_secs: u64,
}

impl ResultEntry {
    fn new(filename: String, hit: SearchHit) -> Self {
        Self {
            filename,
            responder: hit.responder.to_string(),
            age_secs: hit.recorded_at.elapsed().as_secs(),
        }
    }
}

#[derive(Serialize)]
pub struct ResultsResponse {
    pub results: Vec<ResultEntry>,
}

pub async fn handle_results(State(state): State<ApiState>) -> Json<ResultsResponse> {
    let results = state
        .results
        .hits()
        .into_iter()
        .map(|(filename, hit)| ResultEntry::new(filename, hit))
        .collect();

    Json(ResultsResponse { results })
}

pub async fn handle_result(
    State(state): State<ApiState>,
    Path(filename): Path<String>,
) -> Result<Json<ResultEntry>, (StatusCode, String)> {
    state
        .results
        .hit(&filename)
        .map(|hit| Json(ResultEntry::new(filename.clone(), hit)))
        .ok_or((StatusCode::NOT_FOUND, format!("no result for {filename}")))
}
