//! # Lightstream Transport
//!
//! Connection layer consumed by the Lightstream client.
//!
//! This crate provides:
//! - [`Connector`] / [`Connection`] - the contract the client drives
//! - [`ws`] - WebSocket transport over TLS
//! - [`memory`] - In-process transport with a scriptable peer

pub mod connector;
pub mod error;
pub mod memory;
#[cfg(feature = "ws")]
pub mod ws;

pub use connector::{Connection, Connector};
pub use error::TransportError;
pub use memory::{MemoryConnector, MemoryPeer};
#[cfg(feature = "ws")]
pub use ws::WsConnector;
