//! Live feed demo printing the top of book, last ticker and recent executions.
//!
//! Run with: `cargo run -p lightstream --example stream -- --symbol BTC_JPY`
//!
//! Set `RUST_LOG=lightstream_client=debug` to see the connection lifecycle.

use clap::Parser;
use lightstream::prelude::*;
use std::time::Duration;

#[derive(Debug, Parser)]
#[command(name = "stream", about = "Stream market data for one symbol")]
struct Args {
    /// Product code to subscribe to.
    #[arg(short, long, default_value = "BTC_JPY")]
    symbol: String,

    /// Channel groups: board_snapshot, tickers, executions.
    #[arg(short, long, value_delimiter = ',', default_value = "board_snapshot,tickers,executions")]
    channels: Vec<String>,

    /// JSON-RPC endpoint.
    #[arg(long, default_value = lightstream::client::DEFAULT_ENDPOINT)]
    endpoint: String,

    /// Reconnect automatically after a transport error.
    #[arg(long)]
    reconnect: bool,

    /// Seconds to wait for every requested channel to deliver data.
    #[arg(long, default_value_t = 30)]
    ready_timeout: u64,

    /// Seconds between printed summaries.
    #[arg(long, default_value_t = 2)]
    interval: u64,

    /// Order acceptance id to look up in the execution ledger.
    #[arg(long)]
    acceptance_id: Option<String>,
}

fn print_summary(client: &FeedClient, acceptance_id: Option<&str>) {
    if let Ok(book) = client.get_board_snapshot() {
        let bid = book.bids.first().map(|l| (l.price, l.size));
        let ask = book.asks.first().map(|l| (l.price, l.size));
        println!(
            "[book]  {:?} bid={:?} ask={:?} mid={:?} depth={}/{}",
            client.book_status(),
            bid,
            ask,
            book.mid_price,
            book.bids.len(),
            book.asks.len()
        );
    }

    if let Ok(ticker) = client.get_ticker() {
        println!(
            "[tick]  ltp={:?} bid={:?} ask={:?} volume={:?}",
            ticker.ltp, ticker.best_bid, ticker.best_ask, ticker.volume
        );
    }

    if let Ok(executions) = client.get_execution(acceptance_id) {
        let last = executions.last();
        println!(
            "[exec]  matched={} last_price={:?} last_side={:?}",
            executions.len(),
            last.and_then(|e| e.price),
            last.and_then(|e| e.side.clone())
        );
    }

    let stats = client.stats();
    println!(
        "[stats] state={} routed={} malformed={} unknown={}",
        client.state(),
        stats.routed,
        stats.malformed,
        stats.unknown
    );
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    println!("Connecting to {} for {}", args.endpoint, args.symbol);

    let mut client = ClientBuilder::new(&args.symbol)
        .endpoint(&args.endpoint)
        .channel_names(&args.channels)
        .reconnect(args.reconnect)
        .ready_timeout(Duration::from_secs(args.ready_timeout))
        .connect()
        .await?;

    println!("Subscribed: {:?}", client.subscription().groups());

    let mut events = client.events();
    let mut ticker = tokio::time::interval(Duration::from_secs(args.interval.max(1)));

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                println!("\nShutting down...");
                break;
            }
            _ = ticker.tick() => print_summary(&client, args.acceptance_id.as_deref()),
            event = events.recv() => match event {
                Ok(ClientEvent::StateChanged(state)) => {
                    println!("[state] {}", state);
                    if state.is_terminal() {
                        break;
                    }
                }
                Ok(ClientEvent::Error(e)) => eprintln!("[error] {}", e),
                Ok(ClientEvent::Updated(_)) => {}
                Err(e) => tracing::debug!(error = %e, "event stream lagged"),
            },
        }
    }

    client.exit();
    client.closed().await?;
    println!("Client stopped");
    Ok(())
}
