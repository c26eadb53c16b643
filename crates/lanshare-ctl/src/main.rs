//! lanshare-ctl — command-line interface for the lanshare daemon.

use std::time::Duration;

use anyhow::{Context, Result};

mod cmd;

const DEFAULT_PORT: u16 = 8000;
const DEFAULT_WAIT_SECS: u64 = 5;

fn print_usage() {
    println!("Usage: lanshare-ctl [--port <port>] <command>");
    println!();
    println!("Commands:");
    println!("  status                 Show node address and counters");
    println!("  peers                  List known peers");
    println!("  files                  List files this node shares");
    println!("  results                List search results received so far");
    println!("  search <filename>      Search the network for a file");
    println!("      --ttl <n>          Hop limit (default: node setting)");
    println!("      --wait <secs>      How long to wait for an answer (default: {})", DEFAULT_WAIT_SECS);
    println!("  connect <ip[:port]>    Introduce this node to a peer directly");
    println!();
    println!("Options:");
    println!("  --port <port>   API port (default: {})", DEFAULT_PORT);
}

fn parse_value<T: std::str::FromStr>(args: &[String], i: usize, flag: &str) -> Result<T> {
    args.get(i)
        .with_context(|| format!("{flag} requires a value"))?
        .parse()
        .map_err(|_| anyhow::anyhow!("{flag} must be a number"))
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();

    let mut port = DEFAULT_PORT;
    let mut ttl: Option<u32> = None;
    let mut wait = DEFAULT_WAIT_SECS;
    let mut remaining: Vec<&str> = Vec::new();
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--port" => {
                i += 1;
                port = parse_value(&args, i, "--port")?;
            }
            "--ttl" => {
                i += 1;
                ttl = Some(parse_value(&args, i, "--ttl")?);
            }
            "--wait" => {
                i += 1;
                wait = parse_value(&args, i, "--wait")?;
            }
            other => remaining.push(other),
        }
        i += 1;
    }

    match remaining.as_slice() {
        ["status"] | []                 => cmd::status::cmd_status(port).await,
        ["peers"]                       => cmd::peers::cmd_peers(port).await,
        ["files"]                       => cmd::status::cmd_files(port).await,
        ["results"]                     => cmd::search::cmd_results(port).await,
        ["search", filename]            => {
            cmd::search::cmd_search(port, filename, ttl, Duration::from_secs(wait)).await
        }
        ["connect", addr]               => cmd::peers::cmd_connect(port, addr).await,
        ["help"] | ["--help"] | ["-h"]  => { print_usage(); Ok(()) }
        other => {
            eprintln!("Unknown command: {}", other.join(" "));
            eprintln!();
            print_usage();
            std::process::exit(1);
        }
    }
}
