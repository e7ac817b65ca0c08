//! Error types for client operations.

use lightstream_core::{ChannelGroup, ConfigError};
use lightstream_marketdata::StoreError;
use lightstream_transport::TransportError;
use thiserror::Error;

/// Error type for client operations.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Invalid configuration, raised before any connection attempt.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Connection timeout.
    #[error("connection timeout")]
    ConnectTimeout,

    /// Transport error.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// The group was requested but has not produced a record yet.
    #[error("{0} not ready")]
    NotReady(ChannelGroup),

    /// The group was not part of the subscription.
    #[error("{0} not subscribed")]
    NotSubscribed(ChannelGroup),

    /// Requested groups did not all become ready in time.
    #[error("timed out waiting for market data")]
    ReadyTimeout,

    /// Maximum reconnect attempts reached.
    #[error("maximum reconnect attempts reached")]
    MaxReconnectAttempts,

    /// Client was closed.
    #[error("client closed")]
    Closed,
}

impl From<StoreError> for ClientError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::NotReady(group) => Self::NotReady(group),
        }
    }
}
