//! Offline demo driving the client through the in-memory transport.
//!
//! Run with: `cargo run -p lightstream --example replay`

use lightstream::prelude::*;
use serde_json::{Value, json};
use std::time::Duration;

fn frame(channel: &str, message: Value) -> String {
    json!({
        "jsonrpc": "2.0",
        "method": "channelMessage",
        "params": {"channel": channel, "message": message}
    })
    .to_string()
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let connector = MemoryConnector::new();
    let mut peer = connector.accept();

    let pending = tokio::spawn(
        ClientBuilder::new("BTC_JPY")
            .endpoint("mem://replay")
            .ready_timeout(Duration::from_secs(5))
            .connect_with(connector),
    );

    while let Some(request) = peer.next_sent().await {
        println!("-> {}", request);
        if request.contains("executions") {
            break;
        }
    }

    peer.push(frame(
        "lightning_board_snapshot_BTC_JPY",
        json!({
            "mid_price": 100.5,
            "bids": [{"price": 100, "size": 1}, {"price": 99, "size": 3}],
            "asks": [{"price": 101, "size": 2}]
        }),
    ));
    peer.push(frame(
        "lightning_board_BTC_JPY",
        json!({
            "mid_price": 100.0,
            "bids": [{"price": 100, "size": 0}],
            "asks": [{"price": 100.5, "size": 1}]
        }),
    ));
    peer.push(frame(
        "lightning_ticker_BTC_JPY",
        json!({"product_code": "BTC_JPY", "tick_id": 1, "ltp": 100.25}),
    ));
    peer.push(frame(
        "lightning_executions_BTC_JPY",
        json!([
            {"id": 1, "side": "BUY", "price": 100.5, "size": 0.1,
             "buy_child_order_acceptance_id": "JRF-A", "sell_child_order_acceptance_id": "JRF-B"},
            {"id": 2, "side": "BUY", "price": 100.5, "size": 0.2,
             "buy_child_order_acceptance_id": "JRF-A", "sell_child_order_acceptance_id": "JRF-C"}
        ]),
    ));

    let client = pending.await??;

    // Readiness only guarantees one record per group; let the delta land too
    let mut events = client.events();
    while client.stats().routed < 4 {
        let _ = tokio::time::timeout(Duration::from_millis(50), events.recv()).await;
    }

    let book = client.get_board_snapshot()?;
    println!("bids: {:?}", book.bids.iter().map(|l| (l.price, l.size)).collect::<Vec<_>>());
    println!("asks: {:?}", book.asks.iter().map(|l| (l.price, l.size)).collect::<Vec<_>>());
    println!("mid:  {:?}", book.mid_price);
    println!("ltp:  {:?}", client.get_ticker()?.ltp);
    println!("JRF-A executions: {}", client.get_execution(Some("JRF-A"))?.len());

    client.shutdown().await?;
    Ok(())
}
