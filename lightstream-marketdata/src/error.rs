//! Error types for market data operations.

use lightstream_core::{ChannelGroup, DecodeError};
use thiserror::Error;

/// Error returned by store read accessors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum StoreError {
    /// No data has arrived yet for the group.
    #[error("no {0} data received yet")]
    NotReady(ChannelGroup),
}

/// Error raised while routing one inbound frame.
///
/// Always confined to the offending frame; the dispatcher logs it and moves on.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// Frame could not be decoded.
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// Channel is not part of the subscription.
    #[error("unknown channel: {channel}")]
    UnknownChannel {
        /// Channel identifier as received.
        channel: String,
    },

    /// Payload does not have the shape expected for its channel.
    #[error("malformed payload on {channel}: {source}")]
    Payload {
        /// Channel identifier as received.
        channel: String,
        /// Underlying decode failure.
        source: serde_json::Error,
    },
}
