//! lanshare-core — node addresses, wire format, and configuration.
//! All other lanshare crates depend on this one.

pub mod address;
pub mod config;
pub mod wire;

pub use address::{AddressError, NodeAddress};
pub use wire::{Message, WireError};
