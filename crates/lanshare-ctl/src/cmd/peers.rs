//! Peer listing and direct introduction.

use anyhow::Result;
use serde::{Deserialize, Serialize};

use super::http::{base_url, get_json, post_json_body};

#[derive(Deserialize)]
struct PeersResponse {
    local: String,
    peers: Vec<String>,
}

#[derive(Serialize)]
struct ConnectRequest<'a> {
    addr: &'a str,
}

#[derive(Deserialize)]
struct ConnectResponse {
    target: String,
    addresses_sent: usize,
}

pub async fn cmd_peers(port: u16) -> Result<()> {
    let resp: PeersResponse = get_json(&format!("{}/peers", base_url(port))).await?;

    println!("  This node : {}", resp.local);
    if resp.peers.is_empty() {
        println!("No peers discovered yet.");
        return Ok(());
    }

    println!("═══════════════════════════════════════");
    println!("  Known Peers ({})", resp.peers.len());
    println!("═══════════════════════════════════════");
    for p in &resp.peers {
        println!("  {}", p);
    }

    Ok(())
}

pub async fn cmd_connect(port: u16, addr: &str) -> Result<()> {
    let resp: ConnectResponse = post_json_body(
        &format!("{}/peers/connect", base_url(port)),
        &ConnectRequest { addr },
    )
    .await?;

    println!(
        "Introduced to {} ({} addresses sent).",
        resp.target, resp.addresses_sent
    );
    Ok(())
}
