//! lanshare integration test harness.
//!
//! Every test runs real nodes in-process on 127.0.0.1, each with its own
//! ephemeral message port. Beacon discovery is off: nodes on one IP are
//! indistinguishable by beacon, so topologies are wired by hand or through
//! gossip introductions.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tokio::sync::broadcast;

use lanshare_core::config::LanshareConfig;
use lanshare_core::NodeAddress;
use lanshare_services::MemoryCatalog;
use lanshared::{Listeners, Node, NodeTasks};

mod gossip;
mod resilience;
mod search;

// ── Harness ───────────────────────────────────────────────────────────────────

pub struct TestNode {
    pub node: Node,
    pub addr: NodeAddress,
    pub catalog: MemoryCatalog,
    shutdown: broadcast::Sender<()>,
    tasks: NodeTasks,
}

impl TestNode {
    /// Start a node sharing `files`.
    pub async fn start(files: &[&str]) -> Result<Self> {
        let mut config = LanshareConfig::default();
        config.network.bind_addr = "127.0.0.1".parse()?;
        config.network.message_port = 0;
        config.discovery.enabled = false;
        config.identity.advertise_addr = "127.0.0.1".into();
        config.search.send_timeout_ms = 1000;
        config.search.read_timeout_ms = 1000;

        let listeners = Listeners::bind(&config).await?;
        let addr = NodeAddress::loopback(listeners.message_port()?);
        let catalog = MemoryCatalog::with_files(files.iter().copied());
        let node = Node::new(config, addr, Arc::new(catalog.clone()));

        let (shutdown, _) = broadcast::channel(1);
        let tasks = node.spawn(listeners, shutdown.subscribe());

        Ok(Self {
            node,
            addr,
            catalog,
            shutdown,
            tasks,
        })
    }

    /// Make `self` aware of `other`. One direction only.
    pub fn knows(&self, other: &TestNode) {
        self.node.registry().insert(other.addr);
    }
}

impl Drop for TestNode {
    fn drop(&mut self) {
        let _ = self.shutdown.send(());
        self.tasks.connections.abort();
    }
}

/// Start one node per entry of `shares`.
pub async fn start_nodes(shares: &[&[&str]]) -> Result<Vec<TestNode>> {
    let mut nodes = Vec::with_capacity(shares.len());
    for files in shares {
        nodes.push(TestNode::start(files).await?);
    }
    Ok(nodes)
}

/// Poll `check` until it holds or `within` elapses.
pub async fn eventually(within: Duration, check: impl Fn() -> bool) -> bool {
    let deadline = tokio::time::Instant::now() + within;
    loop {
        if check() {
            return true;
        }
        if tokio::time::Instant::now() >= deadline {
            return false;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
}

/// Long enough for any flood on a handful of loopback nodes to settle.
pub const SETTLE: Duration = Duration::from_millis(500);
pub const PATIENCE: Duration = Duration::from_secs(5);
