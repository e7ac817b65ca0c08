//! Bounded ticker history.

use crate::MAX_LIMIT_LEN;
use crate::error::StoreError;
use chrono::{DateTime, Utc};
use lightstream_core::ChannelGroup;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::VecDeque;
use std::sync::Arc;

/// Ticker record as published by the exchange.
///
/// Well-known fields are typed; everything else is kept in `extra`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Ticker {
    /// Product code, e.g. `BTC_JPY`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_code: Option<String>,
    /// Exchange state, e.g. `RUNNING`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    /// Exchange timestamp (RFC 3339).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    /// Exchange tick id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tick_id: Option<u64>,
    /// Best bid price.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub best_bid: Option<Decimal>,
    /// Best ask price.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub best_ask: Option<Decimal>,
    /// Size at the best bid.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub best_bid_size: Option<Decimal>,
    /// Size at the best ask.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub best_ask_size: Option<Decimal>,
    /// Last traded price.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ltp: Option<Decimal>,
    /// 24h volume.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume: Option<Decimal>,
    /// 24h volume for this product only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume_by_product: Option<Decimal>,
    /// Fields not modelled above.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Ticker {
    /// Parses the exchange timestamp.
    #[must_use]
    pub fn exchange_time(&self) -> Option<DateTime<Utc>> {
        self.timestamp
            .as_deref()
            .and_then(|ts| DateTime::parse_from_rfc3339(ts).ok())
            .map(|ts| ts.with_timezone(&Utc))
    }
}

/// FIFO ticker history capped at a fixed length.
#[derive(Debug)]
pub struct TickerBuffer {
    history: VecDeque<Arc<Ticker>>,
    capacity: usize,
}

impl TickerBuffer {
    /// Creates a buffer holding at most [`MAX_LIMIT_LEN`] tickers.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(MAX_LIMIT_LEN)
    }

    /// Creates a buffer holding at most `capacity` tickers.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            history: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Appends a ticker, dropping the oldest ones beyond capacity.
    pub fn push(&mut self, ticker: Ticker) {
        self.history.push_back(Arc::new(ticker));
        while self.history.len() > self.capacity {
            self.history.pop_front();
        }
    }

    /// Returns the most recent ticker.
    ///
    /// # Errors
    /// Returns `StoreError::NotReady` if no ticker has arrived.
    pub fn latest(&self) -> Result<Arc<Ticker>, StoreError> {
        self.history
            .back()
            .cloned()
            .ok_or(StoreError::NotReady(ChannelGroup::Tickers))
    }

    /// Returns the retained tickers, oldest first.
    #[must_use]
    pub fn history(&self) -> Vec<Arc<Ticker>> {
        self.history.iter().cloned().collect()
    }

    /// Returns the capacity.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the number of retained tickers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.history.len()
    }

    /// Returns true if no ticker is retained.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    /// Drops all tickers.
    pub fn clear(&mut self) {
        self.history.clear();
    }
}

impl Default for TickerBuffer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    fn ticker(tick_id: u64) -> Ticker {
        Ticker {
            tick_id: Some(tick_id),
            ..Ticker::default()
        }
    }

    #[test]
    fn test_latest_empty() {
        let buffer = TickerBuffer::new();
        assert_eq!(
            buffer.latest().unwrap_err(),
            StoreError::NotReady(ChannelGroup::Tickers)
        );
    }

    #[test]
    fn test_push_1001_evicts_first() {
        let mut buffer = TickerBuffer::new();
        for i in 1..=1001 {
            buffer.push(ticker(i));
        }

        assert_eq!(buffer.len(), MAX_LIMIT_LEN);
        assert_eq!(buffer.latest().unwrap().tick_id, Some(1001));

        let history = buffer.history();
        assert_eq!(history[0].tick_id, Some(2));
        assert!(history.iter().all(|t| t.tick_id != Some(1)));
    }

    #[test]
    fn test_clear() {
        let mut buffer = TickerBuffer::with_capacity(4);
        buffer.push(ticker(1));
        buffer.clear();
        assert!(buffer.is_empty());
        assert!(buffer.latest().is_err());
    }

    #[test]
    fn test_deserialize_keeps_unknown_fields() {
        let t: Ticker = serde_json::from_value(json!({
            "product_code": "BTC_JPY",
            "timestamp": "2019-04-11T05:14:12.3739915Z",
            "tick_id": 25965446,
            "best_bid": 580006,
            "best_ask": 580771,
            "ltp": 580790.5,
            "total_bid_depth": 1454.0,
        }))
        .unwrap();

        assert_eq!(t.product_code.as_deref(), Some("BTC_JPY"));
        assert_eq!(t.best_bid, Some(Decimal::from(580006)));
        assert_eq!(t.ltp, Some(Decimal::new(5807905, 1)));
        assert!(t.extra.contains_key("total_bid_depth"));

        let time = t.exchange_time().unwrap();
        assert_eq!(time.timestamp(), 1554959652);
    }

    proptest! {
        #[test]
        fn prop_history_bounded_and_latest_is_last(
            capacity in 1usize..32,
            pushes in 0u64..100,
        ) {
            let mut buffer = TickerBuffer::with_capacity(capacity);
            for i in 0..pushes {
                buffer.push(ticker(i));
                prop_assert!(buffer.len() <= capacity);
                prop_assert_eq!(buffer.latest().unwrap().tick_id, Some(i));
            }
        }
    }
}
