//! Transport contract.
//!
//! A [`Connector`] opens connections; resolving `connect` means the
//! connection is open. A [`Connection`] delivers ordered frames:
//! `recv` yields `Some(Ok(frame))` per message, `Some(Err(_))` on a
//! transport error, and `None` once the peer has closed.

use crate::error::TransportError;
use async_trait::async_trait;
use bytes::Bytes;

/// Opens connections to an endpoint.
#[async_trait]
pub trait Connector: Send + Sync {
    /// Opens a connection to `url`.
    ///
    /// # Errors
    /// Returns `TransportError` if the endpoint cannot be reached.
    async fn connect(&self, url: &str) -> Result<Box<dyn Connection>, TransportError>;
}

/// An open duplex connection carrying text frames out and raw frames in.
#[async_trait]
pub trait Connection: Send {
    /// Sends one text frame.
    ///
    /// # Errors
    /// Returns `TransportError` if the frame cannot be written.
    async fn send(&mut self, text: String) -> Result<(), TransportError>;

    /// Receives the next frame. Must be cancel safe.
    async fn recv(&mut self) -> Option<Result<Bytes, TransportError>>;

    /// Closes the connection and releases its resources.
    ///
    /// Closing an already closed connection succeeds.
    ///
    /// # Errors
    /// Returns `TransportError` if the close handshake fails.
    async fn close(&mut self) -> Result<(), TransportError>;
}
