//! # Lightstream
//!
//! Streaming market data client for JSON-RPC exchange feeds.
//!
//! Lightstream subscribes to the board, ticker and execution channels of one
//! symbol and keeps a consistent local view of each: an order book rebuilt
//! from snapshots and incremental updates, a bounded ticker history, and a
//! bounded execution ledger indexed by order acceptance id.
//!
//! ## Features
//!
//! - **Snapshot + delta book sync** - Sorted bids and asks with the latest mid price
//! - **Bounded histories** - FIFO eviction for tickers and executions
//! - **Acceptance id lookup** - Executions indexed by buy and sell acceptance id
//! - **Supervised connection** - Connect timeout, readiness barrier, optional reconnect
//! - **Pluggable transport** - WebSocket over TLS or in-memory for tests
//!
//! ## Quick Start
//!
//! ```ignore
//! use lightstream::prelude::*;
//!
//! let client = ClientBuilder::new("BTC_JPY")
//!     .channels([ChannelGroup::BoardSnapshot, ChannelGroup::Tickers])
//!     .connect()
//!     .await?;
//!
//! let book = client.get_board_snapshot()?;
//! println!("best bid {:?}", book.bids.first());
//! ```
//!
//! ## Crate Organization
//!
//! - [`core`] - Channel naming and the JSON-RPC wire codec
//! - [`marketdata`] - Order book, ticker history, execution ledger, dispatcher
//! - [`transport`] - WebSocket and in-memory transports
//! - [`client`] - Connection supervisor and the public client handle

pub mod prelude;

/// Channel naming and the JSON-RPC wire codec.
pub mod core {
    pub use lightstream_core::*;
}

/// Market data stores and the feed dispatcher.
pub mod marketdata {
    pub use lightstream_marketdata::*;
}

/// Transport layer.
pub mod transport {
    pub use lightstream_transport::*;
}

/// Client engine.
pub mod client {
    pub use lightstream_client::*;
}

pub use lightstream_client::{ClientBuilder, ClientError, FeedClient};
pub use lightstream_core::{ChannelGroup, Subscription};
pub use lightstream_marketdata::{BookView, Execution, MAX_LIMIT_LEN, Ticker};
