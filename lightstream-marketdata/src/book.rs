//! Order book reconstruction.
//!
//! Each side is a map keyed by price. The sorted [`BookView`] handed to
//! readers is a projection rebuilt after every mutation, never patched in
//! place.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Price level in the order book.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceLevel {
    /// Level price.
    pub price: Decimal,
    /// Total size resting at this price.
    pub size: Decimal,
    /// Fields passed through from the feed.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl PriceLevel {
    /// Creates a level with no pass-through fields.
    #[must_use]
    pub fn new(price: Decimal, size: Decimal) -> Self {
        Self {
            price,
            size,
            extra: Map::new(),
        }
    }
}

/// Order book side (bid or ask).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    /// Bid (buy) side.
    Bid,
    /// Ask (sell) side.
    Ask,
}

/// One side of the order book.
#[derive(Debug)]
pub struct BookSide {
    levels: BTreeMap<Decimal, PriceLevel>,
    side: Side,
}

impl BookSide {
    /// Creates a new book side.
    #[must_use]
    pub fn new(side: Side) -> Self {
        Self {
            levels: BTreeMap::new(),
            side,
        }
    }

    /// Returns which side this is.
    #[must_use]
    pub fn side(&self) -> Side {
        self.side
    }

    /// Applies a level: zero size removes the price, anything else upserts it.
    #[inline]
    pub fn update(&mut self, level: PriceLevel) {
        if level.size.is_zero() {
            self.levels.remove(&level.price);
        } else {
            self.levels.insert(level.price, level);
        }
    }

    /// Returns the level at a specific price.
    #[must_use]
    pub fn get(&self, price: Decimal) -> Option<&PriceLevel> {
        self.levels.get(&price)
    }

    /// Clears all levels.
    pub fn clear(&mut self) {
        self.levels.clear();
    }

    /// Returns the number of price levels.
    #[must_use]
    pub fn len(&self) -> usize {
        self.levels.len()
    }

    /// Returns true if there are no levels.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Iterates over levels best price first.
    pub fn iter(&self) -> Box<dyn Iterator<Item = &PriceLevel> + '_> {
        match self.side {
            Side::Bid => Box::new(self.levels.values().rev()),
            Side::Ask => Box::new(self.levels.values()),
        }
    }

    fn sorted(&self) -> Vec<PriceLevel> {
        self.iter().cloned().collect()
    }
}

/// Board payload, shared by the snapshot and incremental channels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoardMessage {
    /// Reference mid price published with the update.
    #[serde(default)]
    pub mid_price: Option<Decimal>,
    /// Bid levels.
    pub bids: Vec<PriceLevel>,
    /// Ask levels.
    pub asks: Vec<PriceLevel>,
    /// Any other top-level fields.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Read-only projection of the book.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BookView {
    /// Bids, highest price first.
    pub bids: Vec<PriceLevel>,
    /// Asks, lowest price first.
    pub asks: Vec<PriceLevel>,
    /// Latest mid price seen on either channel.
    pub mid_price: Option<Decimal>,
    /// Pass-through fields of the latest snapshot.
    pub raw: Map<String, Value>,
}

/// Synchronization state of the book.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookStatus {
    /// No snapshot applied yet.
    Empty,
    /// Snapshot applied on the current connection.
    Synced,
    /// Snapshot came from an earlier connection; waiting for a fresh one.
    Stale,
}

/// Result of applying a delta.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeltaOutcome {
    /// Delta merged into the book.
    Applied,
    /// No snapshot yet, delta dropped.
    Discarded,
}

/// Book counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BookStats {
    /// Snapshots applied.
    pub snapshots: u64,
    /// Deltas merged.
    pub deltas_applied: u64,
    /// Deltas dropped because no snapshot was present.
    pub deltas_discarded: u64,
}

/// Order book for one symbol.
#[derive(Debug)]
pub struct OrderBook {
    /// Bid side.
    pub bids: BookSide,
    /// Ask side.
    pub asks: BookSide,
    mid_price: Option<Decimal>,
    raw: Map<String, Value>,
    status: BookStatus,
    view: Option<Arc<BookView>>,
    stats: BookStats,
}

impl OrderBook {
    /// Creates an empty order book.
    #[must_use]
    pub fn new() -> Self {
        Self {
            bids: BookSide::new(Side::Bid),
            asks: BookSide::new(Side::Ask),
            mid_price: None,
            raw: Map::new(),
            status: BookStatus::Empty,
            view: None,
            stats: BookStats::default(),
        }
    }

    /// Applies a snapshot (replaces the entire book).
    pub fn apply_snapshot(&mut self, snapshot: BoardMessage) {
        self.bids.clear();
        self.asks.clear();

        for level in snapshot.bids {
            self.bids.update(level);
        }
        for level in snapshot.asks {
            self.asks.update(level);
        }

        self.mid_price = snapshot.mid_price;
        self.raw = snapshot.extra;
        self.status = BookStatus::Synced;
        self.stats.snapshots += 1;
        self.rebuild_view();
    }

    /// Applies an incremental update.
    ///
    /// Dropped if no snapshot has been applied yet.
    pub fn apply_delta(&mut self, delta: BoardMessage) -> DeltaOutcome {
        if self.status == BookStatus::Empty {
            self.stats.deltas_discarded += 1;
            return DeltaOutcome::Discarded;
        }

        for level in delta.bids {
            self.bids.update(level);
        }
        for level in delta.asks {
            self.asks.update(level);
        }
        if delta.mid_price.is_some() {
            self.mid_price = delta.mid_price;
        }

        self.stats.deltas_applied += 1;
        self.rebuild_view();
        DeltaOutcome::Applied
    }

    /// Returns the current view, or `None` before the first snapshot.
    #[must_use]
    pub fn view(&self) -> Option<Arc<BookView>> {
        self.view.clone()
    }

    /// Returns the synchronization state.
    #[must_use]
    pub fn status(&self) -> BookStatus {
        self.status
    }

    /// Returns the book counters.
    #[must_use]
    pub fn stats(&self) -> BookStats {
        self.stats
    }

    /// Returns the latest mid price.
    #[must_use]
    pub fn mid_price(&self) -> Option<Decimal> {
        self.mid_price
    }

    /// Flags a synced book as stale until the next snapshot.
    pub fn mark_stale(&mut self) {
        if self.status == BookStatus::Synced {
            self.status = BookStatus::Stale;
        }
    }

    /// Clears the entire book.
    pub fn clear(&mut self) {
        self.bids.clear();
        self.asks.clear();
        self.mid_price = None;
        self.raw.clear();
        self.status = BookStatus::Empty;
        self.view = None;
    }

    fn rebuild_view(&mut self) {
        self.view = Some(Arc::new(BookView {
            bids: self.bids.sorted(),
            asks: self.asks.sorted(),
            mid_price: self.mid_price,
            raw: self.raw.clone(),
        }));
    }
}

impl Default for OrderBook {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;
    use std::collections::HashMap;

    fn d(v: i64) -> Decimal {
        Decimal::from(v)
    }

    fn level(price: i64, size: i64) -> PriceLevel {
        PriceLevel::new(d(price), d(size))
    }

    fn board(bids: Vec<PriceLevel>, asks: Vec<PriceLevel>, mid: Option<Decimal>) -> BoardMessage {
        BoardMessage {
            mid_price: mid,
            bids,
            asks,
            extra: Map::new(),
        }
    }

    #[test]
    fn test_book_side_update() {
        let mut side = BookSide::new(Side::Bid);

        side.update(level(100, 50));
        assert_eq!(side.len(), 1);

        side.update(level(101, 30));
        assert_eq!(side.len(), 2);
        assert_eq!(side.iter().next().unwrap().price, d(101)); // Best bid is highest

        // Delete level
        side.update(level(101, 0));
        assert_eq!(side.len(), 1);
        assert_eq!(side.iter().next().unwrap().price, d(100));

        // Deleting an absent price is a no-op
        side.update(level(99, 0));
        assert_eq!(side.len(), 1);
    }

    #[test]
    fn test_book_side_update_existing_level() {
        let mut side = BookSide::new(Side::Ask);
        side.update(level(100, 50));
        side.update(level(100, 75));
        assert_eq!(side.len(), 1);
        assert_eq!(side.get(d(100)).unwrap().size, d(75));
    }

    #[test]
    fn test_decimal_scale_shares_key() {
        let mut side = BookSide::new(Side::Bid);
        side.update(level(100, 1));
        side.update(PriceLevel::new(Decimal::new(1000, 1), d(0)));
        assert!(side.is_empty());
    }

    #[test]
    fn test_snapshot_then_view() {
        let mut book = OrderBook::new();
        assert!(book.view().is_none());

        book.apply_snapshot(board(vec![level(100, 1)], vec![level(101, 2)], None));

        let view = book.view().unwrap();
        assert_eq!(view.bids, vec![level(100, 1)]);
        assert_eq!(view.asks, vec![level(101, 2)]);
        assert_eq!(book.status(), BookStatus::Synced);
    }

    #[test]
    fn test_delta_removes_and_sets_mid() {
        let mut book = OrderBook::new();
        book.apply_snapshot(board(vec![level(100, 1)], vec![level(101, 2)], None));

        let outcome = book.apply_delta(board(
            vec![level(100, 0)],
            vec![],
            Some(Decimal::new(1005, 1)),
        ));

        assert_eq!(outcome, DeltaOutcome::Applied);
        let view = book.view().unwrap();
        assert!(view.bids.is_empty());
        assert_eq!(view.asks, vec![level(101, 2)]);
        assert_eq!(view.mid_price, Some(Decimal::new(1005, 1)));
    }

    #[test]
    fn test_delta_before_snapshot_discarded() {
        let mut book = OrderBook::new();
        let outcome = book.apply_delta(board(vec![level(100, 1)], vec![], Some(d(100))));

        assert_eq!(outcome, DeltaOutcome::Discarded);
        assert!(book.view().is_none());
        assert!(book.bids.is_empty());
        assert_eq!(book.mid_price(), None);
        assert_eq!(book.stats().deltas_discarded, 1);
    }

    #[test]
    fn test_snapshot_idempotent() {
        let snapshot = board(
            vec![level(99, 3), level(100, 1)],
            vec![level(101, 2), level(102, 5)],
            Some(d(100)),
        );
        let mut book = OrderBook::new();
        book.apply_snapshot(snapshot.clone());
        let first = book.view().unwrap();
        book.apply_snapshot(snapshot);
        assert_eq!(*first, *book.view().unwrap());
    }

    #[test]
    fn test_snapshot_replaces_previous_levels() {
        let mut book = OrderBook::new();
        book.apply_snapshot(board(vec![level(100, 1)], vec![level(105, 1)], None));
        book.apply_snapshot(board(vec![level(90, 4)], vec![level(95, 4)], None));

        assert!(book.bids.get(d(100)).is_none());
        assert!(book.asks.get(d(105)).is_none());
        assert_eq!(book.view().unwrap().bids, vec![level(90, 4)]);
    }

    #[test]
    fn test_snapshot_without_mid_clears_previous_mid() {
        let mut book = OrderBook::new();
        book.apply_snapshot(board(vec![level(100, 1)], vec![level(101, 1)], Some(d(100))));
        book.apply_delta(board(vec![], vec![], Some(d(101))));
        assert_eq!(book.mid_price(), Some(d(101)));

        book.mark_stale();
        book.apply_snapshot(board(vec![level(90, 1)], vec![level(91, 1)], None));

        assert_eq!(book.mid_price(), None);
        assert_eq!(book.view().unwrap().mid_price, None);
    }

    #[test]
    fn test_snapshot_duplicate_prices_last_write_wins() {
        let mut book = OrderBook::new();
        book.apply_snapshot(board(vec![level(100, 1), level(100, 7)], vec![], None));
        assert_eq!(book.view().unwrap().bids, vec![level(100, 7)]);
    }

    #[test]
    fn test_snapshot_raw_fields_pass_through() {
        let msg: BoardMessage = serde_json::from_value(json!({
            "mid_price": 100.5,
            "bids": [{"price": 100, "size": 1.5}],
            "asks": [{"price": 101, "size": 0.25, "venue": "main"}],
            "sequence": 42,
        }))
        .unwrap();

        let mut book = OrderBook::new();
        book.apply_snapshot(msg);

        let view = book.view().unwrap();
        assert_eq!(view.raw.get("sequence"), Some(&json!(42)));
        assert_eq!(view.asks[0].extra.get("venue"), Some(&json!("main")));
        assert_eq!(view.bids[0].size, Decimal::new(15, 1));
        assert_eq!(view.mid_price, Some(Decimal::new(1005, 1)));

        // Deltas never replace snapshot pass-through fields
        book.apply_delta(board(vec![], vec![], None));
        assert_eq!(book.view().unwrap().raw.get("sequence"), Some(&json!(42)));
    }

    #[test]
    fn test_board_message_requires_sides() {
        let result = serde_json::from_value::<BoardMessage>(json!({"mid_price": 1, "bids": []}));
        assert!(result.is_err());
    }

    #[test]
    fn test_mark_stale_and_resync() {
        let mut book = OrderBook::new();
        book.mark_stale();
        assert_eq!(book.status(), BookStatus::Empty);

        book.apply_snapshot(board(vec![level(100, 1)], vec![], None));
        book.mark_stale();
        assert_eq!(book.status(), BookStatus::Stale);

        // Stale books still merge deltas
        assert_eq!(
            book.apply_delta(board(vec![level(99, 1)], vec![], None)),
            DeltaOutcome::Applied
        );

        book.apply_snapshot(board(vec![level(100, 1)], vec![], None));
        assert_eq!(book.status(), BookStatus::Synced);
    }

    #[test]
    fn test_order_book_clear() {
        let mut book = OrderBook::new();
        book.apply_snapshot(board(vec![level(100, 1)], vec![level(101, 1)], Some(d(100))));

        book.clear();
        assert!(book.view().is_none());
        assert!(book.bids.is_empty());
        assert!(book.asks.is_empty());
        assert_eq!(book.status(), BookStatus::Empty);
        assert_eq!(
            book.apply_delta(board(vec![level(100, 1)], vec![], None)),
            DeltaOutcome::Discarded
        );
    }

    fn levels_strategy() -> impl Strategy<Value = Vec<(i64, i64)>> {
        prop::collection::vec((1i64..50, 0i64..4), 0..20)
    }

    proptest! {
        #[test]
        fn prop_delta_sequences_track_latest_sizes(
            snapshot_bids in levels_strategy(),
            snapshot_asks in levels_strategy(),
            deltas in prop::collection::vec((levels_strategy(), levels_strategy()), 1..10),
        ) {
            let mut book = OrderBook::new();
            let mut expected_bids: HashMap<i64, i64> = HashMap::new();
            let mut expected_asks: HashMap<i64, i64> = HashMap::new();

            let apply = |expected: &mut HashMap<i64, i64>, levels: &[(i64, i64)]| {
                for &(price, size) in levels {
                    if size == 0 {
                        expected.remove(&price);
                    } else {
                        expected.insert(price, size);
                    }
                }
            };

            apply(&mut expected_bids, &snapshot_bids);
            apply(&mut expected_asks, &snapshot_asks);
            book.apply_snapshot(board(
                snapshot_bids.iter().map(|&(p, s)| level(p, s)).collect(),
                snapshot_asks.iter().map(|&(p, s)| level(p, s)).collect(),
                None,
            ));

            for (bids, asks) in deltas {
                apply(&mut expected_bids, &bids);
                apply(&mut expected_asks, &asks);
                book.apply_delta(board(
                    bids.iter().map(|&(p, s)| level(p, s)).collect(),
                    asks.iter().map(|&(p, s)| level(p, s)).collect(),
                    None,
                ));

                let view = book.view().unwrap();
                prop_assert_eq!(view.bids.len(), expected_bids.len());
                prop_assert_eq!(view.asks.len(), expected_asks.len());
                for l in &view.bids {
                    prop_assert!(!l.size.is_zero());
                }
                for (price, size) in &expected_bids {
                    prop_assert_eq!(book.bids.get(d(*price)).map(|l| l.size), Some(d(*size)));
                }
                for (price, size) in &expected_asks {
                    prop_assert_eq!(book.asks.get(d(*price)).map(|l| l.size), Some(d(*size)));
                }
                prop_assert!(view.bids.windows(2).all(|w| w[0].price > w[1].price));
                prop_assert!(view.asks.windows(2).all(|w| w[0].price < w[1].price));
            }
        }

        #[test]
        fn prop_deltas_without_snapshot_never_materialize(
            deltas in prop::collection::vec((levels_strategy(), levels_strategy()), 1..10),
        ) {
            let mut book = OrderBook::new();
            for (bids, asks) in deltas {
                let outcome = book.apply_delta(board(
                    bids.iter().map(|&(p, s)| level(p, s)).collect(),
                    asks.iter().map(|&(p, s)| level(p, s)).collect(),
                    Some(d(1)),
                ));
                prop_assert_eq!(outcome, DeltaOutcome::Discarded);
            }
            prop_assert!(book.view().is_none());
            prop_assert!(book.bids.is_empty() && book.asks.is_empty());
        }
    }
}
