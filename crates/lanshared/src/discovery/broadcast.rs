//! Beacon broadcast.
//!
//! Sends BEACON_TAG to the broadcast address, then sleeps a random
//! interval inside the configured window so nodes started together drift
//! apart. Nothing is acknowledged; a failed send is logged and the loop
//! carries on.

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::{Context, Result};
use rand::Rng;
use tokio::net::UdpSocket;
use tokio::time;

use lanshare_core::wire::BEACON_TAG;

use super::make_broadcast_socket;

/// Broadcast beacons to `dest` forever.
///
/// Runs forever — cancel by dropping the task handle.
pub async fn broadcast_loop(dest: SocketAddr, min: Duration, max: Duration) -> Result<()> {
    let socket = make_broadcast_socket().context("failed to create broadcast socket")?;
    let socket = UdpSocket::from_std(socket).context("failed to convert to tokio UdpSocket")?;

    tracing::info!(
        %dest,
        min_ms = min.as_millis() as u64,
        max_ms = max.as_millis() as u64,
        "beacon broadcast starting"
    );

    loop {
        match socket.send_to(BEACON_TAG, dest).await {
            Ok(n) => tracing::trace!(bytes = n, "beacon sent"),
            Err(e) => tracing::warn!(error = %e, "beacon send failed"),
        }

        let delay = jittered_interval(&mut rand::thread_rng(), min, max);
        time::sleep(delay).await;
    }
}

/// Uniform draw from [min, max], millisecond resolution.
pub fn jittered_interval<R: Rng + ?Sized>(rng: &mut R, min: Duration, max: Duration) -> Duration {
    let lo = min.as_millis() as u64;
    let hi = max.as_millis() as u64;
    if lo >= hi {
        return min;
    }
    Duration::from_millis(rng.gen_range(lo..=hi))
}
