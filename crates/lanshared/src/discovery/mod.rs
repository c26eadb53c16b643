//! Presence discovery over UDP broadcast.
//!
//! Every node periodically broadcasts a fixed beacon on the discovery
//! port and listens on the same port. A beacon from a host we have not
//! seen before registers that host and triggers a gossip push to it.

use std::net::{SocketAddr, UdpSocket};

use anyhow::{Context, Result};
use socket2::{Domain, Protocol, Socket, Type};

pub mod broadcast;
pub mod listener;

/// Bind the beacon listener socket.
///
/// SO_REUSEADDR lets a restarted node rebind immediately. Failure here is
/// fatal for discovery: without the socket no beacon can be received.
pub fn bind_listener_socket(addr: SocketAddr) -> Result<UdpSocket> {
    let socket = Socket::new(Domain::for_address(addr), Type::DGRAM, Some(Protocol::UDP))
        .context("socket()")?;

    socket.set_reuse_address(true).context("SO_REUSEADDR")?;
    socket.set_broadcast(true).context("SO_BROADCAST")?;
    socket.set_nonblocking(true).context("set_nonblocking")?;
    socket
        .bind(&addr.into())
        .with_context(|| format!("bind({addr})"))?;

    Ok(socket.into())
}

/// Create a UDP socket allowed to send to the broadcast address.
pub fn make_broadcast_socket() -> Result<UdpSocket> {
    let socket = Socket::new(Domain::IPV4, Type::DGRAM, Some(Protocol::UDP)).context("socket()")?;

    socket.set_broadcast(true).context("SO_BROADCAST")?;
    socket.set_nonblocking(true).context("set_nonblocking")?;
    let any: SocketAddr = ([0, 0, 0, 0], 0).into();
    socket.bind(&any.into()).context("bind()")?;

    Ok(socket.into())
}
