//! Node status and shared file commands.

use anyhow::Result;
use serde::Deserialize;

use super::http::{base_url, get_json};

// ── Response types ────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct StatusResponse {
    address: String,
    peers_known: usize,
    shared_files: usize,
    results: usize,
    default_ttl: u32,
}

#[derive(Deserialize)]
struct FilesResponse {
    files: Vec<String>,
}

// ── Commands ──────────────────────────────────────────────────────────────────

pub async fn cmd_status(port: u16) -> Result<()> {
    let resp: StatusResponse = get_json(&format!("{}/status", base_url(port))).await?;

    println!("═══════════════════════════════════════");
    println!("  lanshare Node Status");
    println!("═══════════════════════════════════════");
    println!("  Address          : {}", resp.address);
    println!("  Peers known      : {}", resp.peers_known);
    println!("  Shared files     : {}", resp.shared_files);
    println!("  Search results   : {}", resp.results);
    println!("  Default TTL      : {}", resp.default_ttl);

    Ok(())
}

pub async fn cmd_files(port: u16) -> Result<()> {
    let resp: FilesResponse = get_json(&format!("{}/files", base_url(port))).await?;

    if resp.files.is_empty() {
        println!("No shared files.");
        return Ok(());
    }

    println!("═══════════════════════════════════════");
    println!("  Shared Files ({})", resp.files.len());
    println!("═══════════════════════════════════════");
    for f in &resp.files {
        println!("  {}", f);
    }

    Ok(())
}
