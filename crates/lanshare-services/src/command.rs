//! Commands from the API layer to the running node.
//!
//! The API owns no sockets. It hands user requests to the daemon over an
//! mpsc channel and waits on a oneshot for the immediate outcome. Search
//! replies from the network land in the result store later.

use lanshare_core::NodeAddress;
use serde::Serialize;
use tokio::sync::{mpsc, oneshot};

/// Capacity of the API → daemon command channel.
pub const COMMAND_QUEUE_DEPTH: usize = 64;

/// What happened when a locally issued search was dispatched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchDispatch {
    pub filename: String,
    pub ttl: u32,
    /// The file is hosted here; the result was recorded with self as responder.
    pub local_hit: bool,
    /// Number of peers a SEARCH was sent towards. Delivery is best-effort.
    pub forwarded_to: usize,
}

pub type SearchReply = Result<SearchDispatch, String>;

/// Outcome of a direct introduction: number of addresses pushed.
pub type IntroduceResult = Result<usize, String>;

#[derive(Debug)]
pub enum NodeCommand {
    /// Issue a search. `ttl: None` uses the configured default.
    Search {
        filename: String,
        ttl: Option<u32>,
        reply: oneshot::Sender<SearchReply>,
    },
    /// Push our peer list to `target` so both sides learn each other
    /// without a beacon.
    Introduce {
        target: NodeAddress,
        reply: oneshot::Sender<IntroduceResult>,
    },
}

pub type CommandSender = mpsc::Sender<NodeCommand>;
pub type CommandReceiver = mpsc::Receiver<NodeCommand>;

pub fn command_channel() -> (CommandSender, CommandReceiver) {
    mpsc::channel(COMMAND_QUEUE_DEPTH)
}
