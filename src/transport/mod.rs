//! Transport seam between the controller and the wire.
//!
//! Pure transport layer, no protocol parsing. The duplex channel is split
//! into its two directions: the controller keeps the outbound half and the
//! background listener owns the inbound half, so neither path ever waits
//! on the other.

pub mod mock;
pub mod ws;

pub use ws::WsConnector;

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

/// Transport failures the controller has to handle. Receive problems are
/// deliberately absent; see [`Inbound`].
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("connect failed: {0}")]
    Connect(#[source] tokio_tungstenite::tungstenite::Error),

    #[error("connect timed out after {0:?}")]
    ConnectTimeout(Duration),

    #[error("send failed: {0}")]
    Send(#[source] tokio_tungstenite::tungstenite::Error),

    #[error("close failed: {0}")]
    Close(#[source] tokio_tungstenite::tungstenite::Error),

    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),
}

/// Result of one inbound poll.
///
/// Read timeouts are the expected idle case on this link, so they are a
/// value here rather than an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inbound {
    /// Text the operator should see.
    Text(String),
    /// Read timeout or a frame with nothing to show.
    Idle,
    /// Peer closed or the read failed; nothing more will arrive.
    Closed,
}

/// Outbound half of the connection. Stays with the controller.
#[async_trait]
pub trait WireSink: Send + 'static {
    async fn send(&mut self, frame: String) -> Result<(), TransportError>;
    async fn close(&mut self) -> Result<(), TransportError>;
}

/// Inbound half of the connection. Moves into the background listener.
#[async_trait]
pub trait WireSource: Send + 'static {
    /// One poll, bounded by the transport's read timeout.
    async fn receive(&mut self) -> Inbound;
}

/// Opens one connection and hands back its two halves.
#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(&self)
    -> Result<(Box<dyn WireSink>, Box<dyn WireSource>), TransportError>;
}
