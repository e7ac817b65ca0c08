//! JSON-RPC envelope decoding and subscribe request encoding.
//!
//! Channel data arrives as
//! `{"jsonrpc":"2.0","method":"channelMessage","params":{"channel":..,"message":..}}`.
//! Replies to our own requests carry `id` with `result` or `error` instead.

use crate::error::DecodeError;
use serde::Deserialize;
use serde_json::{Value, json};

/// Method name of outbound subscribe requests.
pub const SUBSCRIBE_METHOD: &str = "subscribe";

#[derive(Debug, Deserialize)]
struct Envelope {
    id: Option<Value>,
    params: Option<ChannelParams>,
    result: Option<Value>,
    error: Option<RpcError>,
}

#[derive(Debug, Deserialize)]
struct ChannelParams {
    channel: String,
    message: Value,
}

/// Error object of a JSON-RPC reply.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RpcError {
    /// Error code.
    pub code: i64,
    /// Human readable message.
    pub message: String,
    /// Optional extra data.
    #[serde(default)]
    pub data: Option<Value>,
}

/// Payload published on a channel.
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelMessage {
    /// Channel identifier the payload was published on.
    pub channel: String,
    /// Undecoded payload.
    pub payload: Value,
}

/// Decoded inbound frame.
#[derive(Debug, Clone, PartialEq)]
pub enum Inbound {
    /// Channel data.
    Channel(ChannelMessage),
    /// Successful reply to a request.
    Reply {
        /// Request id, if the server echoed one.
        id: Option<Value>,
        /// Reply result.
        result: Value,
    },
    /// Error reply to a request.
    Error {
        /// Request id, if the server echoed one.
        id: Option<Value>,
        /// Error object.
        error: RpcError,
    },
}

/// Decodes one frame into a tagged record.
///
/// # Errors
/// Returns `DecodeError` if the frame is not JSON, does not match the
/// envelope shape, or carries none of `params`, `result` and `error`.
pub fn decode(frame: &[u8]) -> Result<Inbound, DecodeError> {
    let envelope: Envelope = serde_json::from_slice(frame)?;

    if let Some(params) = envelope.params {
        return Ok(Inbound::Channel(ChannelMessage {
            channel: params.channel,
            payload: params.message,
        }));
    }
    if let Some(error) = envelope.error {
        return Ok(Inbound::Error {
            id: envelope.id,
            error,
        });
    }
    match (envelope.id, envelope.result) {
        (id, Some(result)) => Ok(Inbound::Reply { id, result }),
        (Some(id), None) => Ok(Inbound::Reply {
            id: Some(id),
            result: Value::Null,
        }),
        (None, None) => Err(DecodeError::MissingParams),
    }
}

/// Encodes a subscribe request for `channel`.
#[must_use]
pub fn subscribe_request(channel: &str) -> String {
    json!({
        "method": SUBSCRIBE_METHOD,
        "params": { "channel": channel },
    })
    .to_string()
}
