//! Local identity — which address peers should use to reach this node.
//!
//! The routing table already knows which interface faces the LAN. A UDP
//! socket "connected" to an outside address picks that interface without
//! sending anything, and its local address is the one we want.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr, UdpSocket};

use lanshare_core::config::LanshareConfig;
use lanshare_core::NodeAddress;

/// Resolve the IP this host uses to reach `probe`.
/// Falls back to loopback when no route exists.
pub fn resolve(probe: SocketAddr) -> IpAddr {
    match probe_local_ip(probe) {
        Ok(ip) if !ip.is_unspecified() => ip,
        Ok(_) => {
            tracing::warn!(%probe, "probe returned unspecified address, using loopback");
            IpAddr::V4(Ipv4Addr::LOCALHOST)
        }
        Err(e) => {
            tracing::warn!(%probe, error = %e, "no route to probe address, using loopback");
            IpAddr::V4(Ipv4Addr::LOCALHOST)
        }
    }
}

fn probe_local_ip(probe: SocketAddr) -> std::io::Result<IpAddr> {
    let bind: SocketAddr = match probe {
        SocketAddr::V4(_) => (Ipv4Addr::UNSPECIFIED, 0).into(),
        SocketAddr::V6(_) => (Ipv6Addr::UNSPECIFIED, 0).into(),
    };
    let socket = UdpSocket::bind(bind)?;
    socket.connect(probe)?;
    Ok(socket.local_addr()?.ip())
}

/// The node's own address: advertised IP (or resolved one) plus the port
/// the message listener actually bound.
pub fn local_address(config: &LanshareConfig, message_port: u16) -> NodeAddress {
    let ip = config
        .identity
        .advertise_addr
        .parse::<IpAddr>()
        .unwrap_or_else(|_| resolve(config.identity.probe_addr));
    NodeAddress::with_port(ip, message_port)
}
