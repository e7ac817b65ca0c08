//! # Lightstream Core
//!
//! Core types for the Lightstream market data client.
//!
//! This crate provides:
//! - Channel groups and concrete channel naming for a symbol
//! - The JSON-RPC envelope decoder and subscribe request encoder
//! - Error types for configuration and decoding

pub mod channel;
pub mod error;
pub mod wire;

pub use channel::{ChannelGroup, ChannelKind, DEFAULT_NAMESPACE, Subscription, channel_name};
pub use error::{ConfigError, DecodeError};
pub use wire::{ChannelMessage, Inbound, RpcError, decode, subscribe_request};
