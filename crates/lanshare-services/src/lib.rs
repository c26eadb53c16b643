//! lanshare-services — shared node state and the local catalog seam.
//!
//! Everything here is cheap to clone and safe to share across tasks:
//! the daemon, the connection handlers, and the API all hold handles
//! to the same underlying state.

pub mod catalog;
pub mod command;
pub mod registry;
pub mod results;

pub use catalog::{DirCatalog, LocalCatalog, MemoryCatalog};
pub use command::{
    command_channel, CommandReceiver, CommandSender, IntroduceResult, NodeCommand, SearchDispatch,
    SearchReply,
};
pub use registry::PeerRegistry;
pub use results::{SearchHit, SearchResultStore};
