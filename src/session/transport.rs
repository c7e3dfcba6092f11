//! The channel between host and guest.
//!
//! The coordinator only assumes a reliable, ordered, point-to-point pipe.
//! [`MemoryTransport`] provides one inside a single process; a network
//! transport implements the same trait.

use crate::errors::{SessionError, SessionResult};
use crate::session::protocol::{decode, encode, WireMessage};
use async_trait::async_trait;
use tokio::sync::mpsc;
use tracing::trace;

const CHANNEL_CAPACITY: usize = 32;

#[async_trait]
pub trait Transport: Send {
    /// Deliver one message to the peer.
    async fn send(&mut self, message: &WireMessage) -> SessionResult<()>;

    /// Wait for the next message. A closed channel is `SessionError::Disconnected`.
    async fn recv(&mut self) -> SessionResult<WireMessage>;
}

/// One end of an in-process channel. Messages travel as encoded JSON text so
/// the codec is exercised exactly as it would be on a socket.
#[derive(Debug)]
pub struct MemoryTransport {
    outgoing: mpsc::Sender<String>,
    incoming: mpsc::Receiver<String>,
}

/// Two connected ends.
pub fn memory_pair() -> (MemoryTransport, MemoryTransport) {
    let (a_tx, b_rx) = mpsc::channel(CHANNEL_CAPACITY);
    let (b_tx, a_rx) = mpsc::channel(CHANNEL_CAPACITY);
    (
        MemoryTransport {
            outgoing: a_tx,
            incoming: a_rx,
        },
        MemoryTransport {
            outgoing: b_tx,
            incoming: b_rx,
        },
    )
}

#[async_trait]
impl Transport for MemoryTransport {
    async fn send(&mut self, message: &WireMessage) -> SessionResult<()> {
        let text = encode(message)?;
        trace!(kind = message.kind(), bytes = text.len(), "send");
        self.outgoing
            .send(text)
            .await
            .map_err(|_| SessionError::Disconnected)
    }

    async fn recv(&mut self) -> SessionResult<WireMessage> {
        let text = self.incoming.recv().await.ok_or(SessionError::Disconnected)?;
        let message = decode(&text)?;
        trace!(kind = message.kind(), "recv");
        Ok(message)
    }
}
