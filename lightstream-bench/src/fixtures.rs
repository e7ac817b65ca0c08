//! Synthetic feed frames for benchmarks.
//!
//! Prices are integers around a fixed mid so generated books stay sorted
//! and deltas hit existing levels.

use bytes::Bytes;
use lightstream_core::{ChannelGroup, ChannelKind, ConfigError, Subscription};
use serde_json::{Value, json};

/// Symbol used by every fixture.
pub const SYMBOL: &str = "BTC_JPY";

/// Mid price the generated books are centred on.
pub const MID: u64 = 5_000_000;

/// Returns a subscription for every group on [`SYMBOL`].
///
/// # Errors
/// Returns `ConfigError` if [`SYMBOL`] is rejected by `Subscription::new`.
pub fn subscription() -> Result<Subscription, ConfigError> {
    Subscription::new(SYMBOL, ChannelGroup::ALL)
}

fn channel(kind: ChannelKind) -> String {
    lightstream_core::channel_name(Some(lightstream_core::DEFAULT_NAMESPACE), kind, SYMBOL)
}

fn frame(kind: ChannelKind, message: Value) -> Bytes {
    Bytes::from(
        json!({
            "jsonrpc": "2.0",
            "method": "channelMessage",
            "params": {"channel": channel(kind), "message": message}
        })
        .to_string(),
    )
}

fn levels(depth: u64, side: i64) -> Vec<Value> {
    (1..=depth)
        .map(|i| {
            let price = MID as i64 + side * i as i64;
            json!({"price": price, "size": 0.01 * i as f64})
        })
        .collect()
}

/// Snapshot message body with `depth` levels per side.
#[must_use]
pub fn snapshot_message(depth: u64) -> Value {
    json!({
        "mid_price": MID,
        "bids": levels(depth, -1),
        "asks": levels(depth, 1),
    })
}

/// Snapshot frame with `depth` levels per side.
#[must_use]
pub fn snapshot_frame(depth: u64) -> Bytes {
    frame(ChannelKind::BoardSnapshot, snapshot_message(depth))
}

/// Delta message touching one bid and one ask level; every third delta removes them.
#[must_use]
pub fn delta_message(n: u64, depth: u64) -> Value {
    let offset = (n % depth.max(1)) as i64 + 1;
    let size = if n % 3 == 0 { 0.0 } else { 0.5 };
    json!({
        "mid_price": MID,
        "bids": [{"price": MID as i64 - offset, "size": size}],
        "asks": [{"price": MID as i64 + offset, "size": size}],
    })
}

/// Board delta frame.
#[must_use]
pub fn delta_frame(n: u64, depth: u64) -> Bytes {
    frame(ChannelKind::Board, delta_message(n, depth))
}

/// Ticker message body.
#[must_use]
pub fn ticker_message(n: u64) -> Value {
    json!({
        "product_code": SYMBOL,
        "state": "RUNNING",
        "timestamp": "2024-01-01T00:00:00.000Z",
        "tick_id": n,
        "best_bid": MID - 1,
        "best_ask": MID + 1,
        "best_bid_size": 0.1,
        "best_ask_size": 0.2,
        "ltp": MID,
        "volume": 1234.5,
        "volume_by_product": 1234.5,
    })
}

/// Ticker frame.
#[must_use]
pub fn ticker_frame(n: u64) -> Bytes {
    frame(ChannelKind::Ticker, ticker_message(n))
}

/// Execution batch body; acceptance ids repeat every `distinct_ids` executions.
#[must_use]
pub fn executions_message(start: u64, count: u64, distinct_ids: u64) -> Value {
    let distinct = distinct_ids.max(1);
    let batch: Vec<Value> = (start..start + count)
        .map(|id| {
            json!({
                "id": id,
                "side": if id % 2 == 0 { "BUY" } else { "SELL" },
                "price": MID,
                "size": 0.01,
                "exec_date": "2024-01-01T00:00:00.000Z",
                "buy_child_order_acceptance_id": format!("JRF-B-{}", id % distinct),
                "sell_child_order_acceptance_id": format!("JRF-S-{}", id % distinct),
            })
        })
        .collect();
    Value::Array(batch)
}

/// Execution batch frame.
#[must_use]
pub fn executions_frame(start: u64, count: u64, distinct_ids: u64) -> Bytes {
    frame(
        ChannelKind::Executions,
        executions_message(start, count, distinct_ids),
    )
}

/// Mixed feed: a snapshot followed by interleaved deltas, tickers and executions.
#[must_use]
pub fn mixed_feed(messages: u64, depth: u64) -> Vec<Bytes> {
    let mut frames = Vec::with_capacity(messages as usize + 1);
    frames.push(snapshot_frame(depth));
    for n in 0..messages {
        frames.push(match n % 4 {
            0 | 1 => delta_frame(n, depth),
            2 => ticker_frame(n),
            _ => executions_frame(n * 4, 4, 64),
        });
    }
    frames
}
