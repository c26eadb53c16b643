//! CLI command modules.

pub mod http;
pub mod peers;
pub mod search;
pub mod status;
