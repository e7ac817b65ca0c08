//! Error types for Lightstream core operations.

use thiserror::Error;

/// Error raised while validating a subscription before any connection attempt.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Symbol is empty.
    #[error("symbol must not be empty")]
    EmptySymbol,

    /// Symbol contains characters that cannot appear in a channel name.
    #[error("invalid symbol: {symbol:?}")]
    InvalidSymbol {
        /// The rejected symbol.
        symbol: String,
    },

    /// Channel group name is not one of `board_snapshot`, `tickers`, `executions`.
    #[error("unknown channel group: {name:?}")]
    UnknownChannelGroup {
        /// The rejected group name.
        name: String,
    },

    /// Reconnection settings cannot produce a usable backoff schedule.
    #[error("invalid reconnect settings: {message}")]
    InvalidReconnect {
        /// Description of the rejected setting.
        message: String,
    },
}

/// Error raised while decoding an inbound frame.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// Frame is not valid JSON or does not match the envelope shape.
    #[error("malformed frame: {0}")]
    Json(#[from] serde_json::Error),

    /// Frame is valid JSON-RPC but carries neither params, result nor error.
    #[error("frame has no params, result or error member")]
    MissingParams,
}

/// Result type alias for configuration checks.
pub type Result<T> = std::result::Result<T, ConfigError>;
