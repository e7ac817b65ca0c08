//! Shared market data stores.
//!
//! The receive loop is the only writer; any number of readers query through
//! the accessors. Each store sits behind its own lock, so a reader sees a
//! book, ticker history or ledger either entirely before or entirely after
//! a message was applied.

use crate::MAX_LIMIT_LEN;
use crate::book::{BoardMessage, BookStats, BookStatus, BookView, DeltaOutcome, OrderBook};
use crate::error::StoreError;
use crate::executions::{Execution, ExecutionLedger};
use crate::ticker::{Ticker, TickerBuffer};
use lightstream_core::ChannelGroup;
use parking_lot::RwLock;
use std::sync::Arc;

/// Retention limits for the stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreConfig {
    /// Maximum tickers retained.
    pub ticker_capacity: usize,
    /// Maximum executions retained.
    pub execution_capacity: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            ticker_capacity: MAX_LIMIT_LEN,
            execution_capacity: MAX_LIMIT_LEN,
        }
    }
}

/// Order book, ticker history and execution ledger for one subscription.
#[derive(Debug)]
pub struct MarketStore {
    book: RwLock<OrderBook>,
    tickers: RwLock<TickerBuffer>,
    executions: RwLock<ExecutionLedger>,
}

impl MarketStore {
    /// Creates empty stores.
    #[must_use]
    pub fn new(config: StoreConfig) -> Self {
        Self {
            book: RwLock::new(OrderBook::new()),
            tickers: RwLock::new(TickerBuffer::with_capacity(config.ticker_capacity)),
            executions: RwLock::new(ExecutionLedger::with_capacity(config.execution_capacity)),
        }
    }

    /// Returns the current book view.
    ///
    /// # Errors
    /// Returns `StoreError::NotReady` before the first snapshot.
    pub fn book_view(&self) -> Result<Arc<BookView>, StoreError> {
        self.book
            .read()
            .view()
            .ok_or(StoreError::NotReady(ChannelGroup::BoardSnapshot))
    }

    /// Returns the book synchronization state.
    #[must_use]
    pub fn book_status(&self) -> BookStatus {
        self.book.read().status()
    }

    /// Returns the book counters.
    #[must_use]
    pub fn book_stats(&self) -> BookStats {
        self.book.read().stats()
    }

    /// Returns the most recent ticker.
    ///
    /// # Errors
    /// Returns `StoreError::NotReady` if no ticker has arrived.
    pub fn latest_ticker(&self) -> Result<Arc<Ticker>, StoreError> {
        self.tickers.read().latest()
    }

    /// Returns the retained tickers, oldest first.
    #[must_use]
    pub fn ticker_history(&self) -> Vec<Arc<Ticker>> {
        self.tickers.read().history()
    }

    /// Looks up executions by acceptance id; see [`ExecutionLedger::executions_for`].
    #[must_use]
    pub fn executions_for(&self, acceptance_id: Option<&str>) -> Vec<Arc<Execution>> {
        self.executions.read().executions_for(acceptance_id)
    }

    /// Returns the number of retained executions.
    #[must_use]
    pub fn execution_count(&self) -> usize {
        self.executions.read().len()
    }

    /// Replaces the book with a snapshot.
    pub fn apply_snapshot(&self, snapshot: BoardMessage) {
        self.book.write().apply_snapshot(snapshot);
    }

    /// Merges a delta into the book.
    pub fn apply_delta(&self, delta: BoardMessage) -> DeltaOutcome {
        self.book.write().apply_delta(delta)
    }

    /// Appends a ticker.
    pub fn push_ticker(&self, ticker: Ticker) {
        self.tickers.write().push(ticker);
    }

    /// Appends an execution batch and evicts down to capacity under one lock.
    ///
    /// Returns `(appended, evicted)`.
    pub fn append_executions(&self, batch: Vec<Execution>) -> (usize, usize) {
        let mut ledger = self.executions.write();
        let appended = ledger.append_batch(batch);
        let evicted = ledger.evict_to_capacity();
        (appended, evicted)
    }

    /// Flags the book as stale until the next snapshot.
    pub fn mark_book_stale(&self) {
        self.book.write().mark_stale();
    }

    /// Empties every store.
    pub fn clear(&self) {
        self.book.write().clear();
        self.tickers.write().clear();
        self.executions.write().clear();
    }
}

impl Default for MarketStore {
    fn default() -> Self {
        Self::new(StoreConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::book::PriceLevel;
    use rust_decimal::Decimal;
    use serde_json::Map;
    use std::thread;

    fn snapshot(bid: i64, ask: i64) -> BoardMessage {
        BoardMessage {
            mid_price: None,
            bids: vec![PriceLevel::new(Decimal::from(bid), Decimal::ONE)],
            asks: vec![PriceLevel::new(Decimal::from(ask), Decimal::ONE)],
            extra: Map::new(),
        }
    }

    #[test]
    fn test_not_ready_before_data() {
        let store = MarketStore::default();
        assert_eq!(
            store.book_view().unwrap_err(),
            StoreError::NotReady(ChannelGroup::BoardSnapshot)
        );
        assert_eq!(
            store.latest_ticker().unwrap_err(),
            StoreError::NotReady(ChannelGroup::Tickers)
        );
        assert!(store.executions_for(None).is_empty());
        assert_eq!(store.book_status(), BookStatus::Empty);
    }

    #[test]
    fn test_append_executions_evicts() {
        let store = MarketStore::new(StoreConfig {
            ticker_capacity: 2,
            execution_capacity: 2,
        });
        let batch = (0..3)
            .map(|i| Execution {
                id: Some(i),
                ..Execution::default()
            })
            .collect();

        assert_eq!(store.append_executions(batch), (3, 1));
        assert_eq!(store.execution_count(), 2);
    }

    #[test]
    fn test_clear_resets_everything() {
        let store = MarketStore::default();
        store.apply_snapshot(snapshot(100, 101));
        store.push_ticker(Ticker::default());
        store.append_executions(vec![Execution::default()]);

        store.clear();
        assert!(store.book_view().is_err());
        assert!(store.latest_ticker().is_err());
        assert_eq!(store.execution_count(), 0);
    }

    #[test]
    fn test_concurrent_readers_never_see_partial_book() {
        let store = Arc::new(MarketStore::default());
        store.apply_snapshot(snapshot(0, 1));

        let writer = {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                for i in 1..500 {
                    store.apply_snapshot(snapshot(i * 10, i * 10 + 1));
                }
            })
        };

        for _ in 0..500 {
            let view = store.book_view().unwrap();
            // Each snapshot pairs bid N with ask N + 1
            assert_eq!(view.asks[0].price - view.bids[0].price, Decimal::ONE);
        }
        writer.join().unwrap();
    }
}
