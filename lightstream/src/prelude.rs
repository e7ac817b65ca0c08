//! Prelude module for convenient imports.
//!
//! ```ignore
//! use lightstream::prelude::*;
//! ```

// Core types
pub use lightstream_core::{
    ChannelGroup, ChannelKind, ConfigError, DEFAULT_NAMESPACE, Subscription,
};

// Market data types
pub use lightstream_marketdata::{
    BookStatus, BookView, DispatchStats, Execution, MAX_LIMIT_LEN, PriceLevel, Side, Ticker,
};

// Transport types
pub use lightstream_transport::{Connection, Connector, MemoryConnector, TransportError};

// Client types
pub use lightstream_client::{
    ClientBuilder, ClientError, ClientEvent, ClientStatus, ConnectionState, FeedClient,
    ReconnectConfig,
};
