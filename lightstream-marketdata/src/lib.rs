//! # Lightstream Market Data
//!
//! In-memory market data state rebuilt from the feed.
//!
//! This crate provides:
//! - Order book reconstruction from snapshots and incremental deltas
//! - Bounded ticker history
//! - Bounded execution ledger indexed by order acceptance id
//! - Lock-guarded stores shared between the receive loop and readers
//! - The feed dispatcher routing decoded frames to the stores

pub mod book;
pub mod dispatcher;
pub mod error;
pub mod executions;
pub mod store;
pub mod ticker;

/// Maximum number of tickers and executions retained.
pub const MAX_LIMIT_LEN: usize = 1000;

pub use book::{
    BoardMessage, BookSide, BookStats, BookStatus, BookView, DeltaOutcome, OrderBook, PriceLevel,
    Side,
};
pub use dispatcher::{DispatchStats, FeedDispatcher, Routed};
pub use error::{DispatchError, StoreError};
pub use executions::{Execution, ExecutionLedger};
pub use store::{MarketStore, StoreConfig};
pub use ticker::{Ticker, TickerBuffer};
