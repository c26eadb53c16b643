//! Search and result commands.

use std::time::Duration;

use anyhow::{Result, anyhow};
use serde::{Deserialize, Serialize};

use super::http::{base_url, get_json, get_json_opt, post_json_body};

const POLL_INTERVAL: Duration = Duration::from_millis(250);

#[derive(Serialize)]
struct SearchRequest<'a> {
    filename: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    ttl: Option<u32>,
}

#[derive(Deserialize)]
struct SearchDispatch {
    filename: String,
    ttl: u32,
    local_hit: bool,
    forwarded_to: usize,
}

#[derive(Deserialize)]
struct ResultEntry {
    filename: String,
    responder: String,
    age_secs: u64,
}

#[derive(Deserialize)]
struct ResultsResponse {
    results: Vec<ResultEntry>,
}

/// Issue a search, then poll for an answer for up to `wait`.
pub async fn cmd_search(port: u16, filename: &str, ttl: Option<u32>, wait: Duration) -> Result<()> {
    let dispatch: SearchDispatch = post_json_body(
        &format!("{}/search", base_url(port)),
        &SearchRequest { filename, ttl },
    )
    .await?;

    if dispatch.local_hit {
        println!("'{}' is shared by this node.", dispatch.filename);
        return Ok(());
    }
    if dispatch.forwarded_to == 0 {
        println!("No peers known, search for '{}' went nowhere.", dispatch.filename);
        return Ok(());
    }
    println!(
        "Searching for '{}' (ttl {}, sent to {} peers)...",
        dispatch.filename, dispatch.ttl, dispatch.forwarded_to
    );

    let mut url = reqwest::Url::parse(&format!("{}/results", base_url(port)))?;
    url.path_segments_mut()
        .map_err(|_| anyhow!("invalid API base url"))?
        .push(&dispatch.filename);
    let deadline = tokio::time::Instant::now() + wait;
    loop {
        // A stale entry from an earlier search also counts; the store has
        // no notion of which query produced it.
        if let Some(hit) = get_json_opt::<ResultEntry>(url.as_str()).await? {
            println!("Found '{}' at {}", hit.filename, hit.responder);
            return Ok(());
        }
        if tokio::time::Instant::now() >= deadline {
            break;
        }
        tokio::time::sleep(POLL_INTERVAL).await;
    }

    println!("No answer within {}s.", wait.as_secs());
    Ok(())
}

pub async fn cmd_results(port: u16) -> Result<()> {
    let resp: ResultsResponse = get_json(&format!("{}/results", base_url(port))).await?;

    if resp.results.is_empty() {
        println!("No search results yet.");
        return Ok(());
    }

    println!("═══════════════════════════════════════");
    println!("  Search Results ({})", resp.results.len());
    println!("═══════════════════════════════════════");
    for r in &resp.results {
        println!("  ┌─ {}", r.filename);
        println!("  │  responder : {}", r.responder);
        println!("  └─ recorded  : {}s ago", r.age_secs);
    }

    Ok(())
}
