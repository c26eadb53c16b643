//! lanshared — the lanshare node.
//!
//! A node announces itself with UDP beacons, learns peers from beacons and
//! gossip, and answers TTL-bounded flooded searches for files it hosts.
//! The binary in main.rs wires these pieces to real sockets; the library
//! exists so nodes can be embedded and tested in-process.

pub mod connection;
pub mod discovery;
pub mod gossip;
pub mod identity;
pub mod node;
pub mod protocol;
pub mod transport;

pub use node::{Listeners, Node, NodeTasks};
pub use protocol::{Delivery, SearchOutcome, SearchProtocol};
