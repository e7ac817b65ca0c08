//! # Lightstream Client
//!
//! Streaming market data client.
//!
//! This crate provides:
//! - Client builder with configuration options
//! - Connection supervision with optional automatic reconnection
//! - A readiness barrier over the requested channel groups
//! - Read accessors over the order book, tickers and executions

pub mod builder;
pub mod client;
pub mod error;
pub mod reconnect;
pub mod state;
mod supervisor;

pub use builder::{ClientBuilder, ClientConfig, DEFAULT_ENDPOINT};
pub use client::FeedClient;
pub use error::ClientError;
pub use reconnect::{ReconnectConfig, ReconnectState};
pub use state::{ClientEvent, ClientStatus, ConnectionState};
