//! Point-to-point message transport.
//!
//! One TCP connection carries exactly one framed message. Every outbound
//! attempt is bounded by a timeout on connect and on write; there are no
//! retries. A failure affects only the edge it happened on.

use std::io;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::time;

use lanshare_core::wire::{FRAME_END, MAX_MESSAGE_BYTES};
use lanshare_core::{Message, NodeAddress, WireError};

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("connect to {0} timed out")]
    ConnectTimeout(NodeAddress),
    #[error("connect to {0} failed: {1}")]
    Connect(NodeAddress, #[source] io::Error),
    #[error("write to {0} timed out")]
    WriteTimeout(NodeAddress),
    #[error("write to {0} failed: {1}")]
    Write(NodeAddress, #[source] io::Error),
    #[error("read timed out")]
    ReadTimeout,
    #[error("read failed: {0}")]
    Read(#[source] io::Error),
    #[error(transparent)]
    Wire(#[from] WireError),
}

/// Deliver `message` to `target` on a fresh connection.
pub async fn send_message(
    target: NodeAddress,
    message: &Message,
    timeout: Duration,
) -> Result<(), TransportError> {
    let frame = message.encode()?;

    let mut stream = time::timeout(timeout, TcpStream::connect(target.socket_addr()))
        .await
        .map_err(|_| TransportError::ConnectTimeout(target))?
        .map_err(|e| TransportError::Connect(target, e))?;

    time::timeout(timeout, async {
        stream.write_all(&frame).await?;
        stream.shutdown().await
    })
    .await
    .map_err(|_| TransportError::WriteTimeout(target))?
    .map_err(|e| TransportError::Write(target, e))?;

    tracing::trace!(%target, kind = message.kind(), bytes = frame.len(), "message sent");
    Ok(())
}

/// Read the single message a connection carries.
///
/// Reads up to the frame terminator or EOF, never more than
/// MAX_MESSAGE_BYTES + 1 bytes.
pub async fn read_message<R>(reader: &mut R, timeout: Duration) -> Result<Message, TransportError>
where
    R: AsyncRead + Unpin,
{
    let mut frame = Vec::with_capacity(256);
    let mut limited = BufReader::new(reader.take(MAX_MESSAGE_BYTES as u64 + 1));

    time::timeout(timeout, limited.read_until(FRAME_END, &mut frame))
        .await
        .map_err(|_| TransportError::ReadTimeout)?
        .map_err(TransportError::Read)?;

    Ok(Message::decode(&frame)?)
}
