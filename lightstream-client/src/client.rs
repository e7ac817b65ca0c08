//! Public client handle.

use crate::builder::ClientConfig;
use crate::error::ClientError;
use crate::reconnect::ReconnectState;
use crate::state::{ClientEvent, ClientStatus, ConnectionState};
use crate::supervisor::Supervisor;
use lightstream_core::{ChannelGroup, Subscription};
use lightstream_marketdata::{
    BookStatus, BookView, DispatchStats, Execution, FeedDispatcher, MarketStore, Ticker,
};
use lightstream_transport::Connector;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Streaming market data client for one symbol.
///
/// A background task owns the connection and keeps the stores current;
/// the accessors read the latest state without blocking the feed.
/// Dropping the client closes the connection.
pub struct FeedClient {
    subscription: Subscription,
    dispatcher: Arc<FeedDispatcher>,
    status: watch::Receiver<ClientStatus>,
    events: broadcast::Sender<ClientEvent>,
    shutdown: CancellationToken,
    task: Option<JoinHandle<Result<(), ClientError>>>,
}

impl FeedClient {
    /// Spawns the supervisor task for `config` on the current runtime.
    pub(crate) fn start<C>(config: ClientConfig, connector: C) -> Self
    where
        C: Connector + 'static,
    {
        let store = Arc::new(MarketStore::new(config.store));
        let dispatcher = Arc::new(FeedDispatcher::new(config.subscription.clone(), store));
        let (status_tx, status_rx) = watch::channel(ClientStatus::default());
        let (events, _) = broadcast::channel(config.event_capacity);
        let shutdown = CancellationToken::new();

        let supervisor = Supervisor {
            url: config.endpoint,
            connector: Arc::new(connector),
            connect_timeout: config.connect_timeout,
            reconnect: ReconnectState::new(config.reconnect),
            dispatcher: Arc::clone(&dispatcher),
            status: status_tx,
            events: events.clone(),
            shutdown: shutdown.clone(),
        };
        let task = tokio::spawn(supervisor.run());

        Self {
            subscription: config.subscription,
            dispatcher,
            status: status_rx,
            events,
            shutdown,
            task: Some(task),
        }
    }

    /// Returns the current order book.
    ///
    /// # Errors
    /// Returns `NotSubscribed` if the board group was not requested and
    /// `NotReady` before the first snapshot.
    pub fn get_board_snapshot(&self) -> Result<Arc<BookView>, ClientError> {
        self.require(ChannelGroup::BoardSnapshot)?;
        Ok(self.store().book_view()?)
    }

    /// Returns the most recent ticker.
    ///
    /// # Errors
    /// Returns `NotSubscribed` if tickers were not requested and `NotReady`
    /// before the first ticker.
    pub fn get_ticker(&self) -> Result<Arc<Ticker>, ClientError> {
        self.require(ChannelGroup::Tickers)?;
        Ok(self.store().latest_ticker()?)
    }

    /// Returns the retained tickers, oldest first.
    ///
    /// # Errors
    /// Returns `NotSubscribed` if tickers were not requested.
    pub fn ticker_history(&self) -> Result<Vec<Arc<Ticker>>, ClientError> {
        self.require(ChannelGroup::Tickers)?;
        Ok(self.store().ticker_history())
    }

    /// Returns executions for an order acceptance id.
    ///
    /// With `None` (or an empty id) every retained execution is returned.
    /// Otherwise the buy-side matches are returned if there are any, else
    /// the sell-side matches, in arrival order.
    ///
    /// # Errors
    /// Returns `NotSubscribed` if executions were not requested.
    pub fn get_execution(
        &self,
        acceptance_id: Option<&str>,
    ) -> Result<Vec<Arc<Execution>>, ClientError> {
        self.require(ChannelGroup::Executions)?;
        Ok(self.store().executions_for(acceptance_id))
    }

    /// Returns the book synchronization state.
    #[must_use]
    pub fn book_status(&self) -> BookStatus {
        self.store().book_status()
    }

    /// Returns the connection state.
    #[must_use]
    pub fn state(&self) -> ConnectionState {
        self.status.borrow().state
    }

    /// Returns the latest supervisor status.
    #[must_use]
    pub fn status(&self) -> ClientStatus {
        self.status.borrow().clone()
    }

    /// Returns the subscription.
    #[must_use]
    pub fn subscription(&self) -> &Subscription {
        &self.subscription
    }

    /// Returns the dispatcher counters.
    #[must_use]
    pub fn stats(&self) -> DispatchStats {
        self.dispatcher.stats()
    }

    /// Subscribes to client events.
    #[must_use]
    pub fn events(&self) -> broadcast::Receiver<ClientEvent> {
        self.events.subscribe()
    }

    /// Waits until every requested group produced at least one record.
    ///
    /// Returns immediately when no group was requested.
    ///
    /// # Errors
    /// Returns `ReadyTimeout` if `timeout` elapses first, or the terminal
    /// error if the client stops while waiting.
    pub async fn wait_ready(&mut self, timeout: Option<Duration>) -> Result<(), ClientError> {
        let wanted = self.subscription.groups().clone();
        let mut status = self.status.clone();

        let wait = async move {
            status
                .wait_for(|s| s.state.is_terminal() || wanted.is_subset(&s.ready))
                .await
                .map(|s| wanted.is_subset(&s.ready))
                .unwrap_or(false)
        };

        let ready = match timeout {
            Some(limit) => tokio::time::timeout(limit, wait)
                .await
                .map_err(|_| ClientError::ReadyTimeout)?,
            None => wait.await,
        };

        if ready {
            return Ok(());
        }
        match self.closed().await {
            Ok(()) => Err(ClientError::Closed),
            Err(e) => Err(e),
        }
    }

    /// Requests shutdown. Safe to call repeatedly.
    pub fn exit(&self) {
        if !self.shutdown.is_cancelled() {
            tracing::info!(symbol = %self.subscription.symbol(), "closing feed client");
        }
        self.shutdown.cancel();
    }

    /// Waits for the supervisor to stop and returns its outcome.
    ///
    /// The terminal error is returned once; later calls return `Ok`.
    ///
    /// # Errors
    /// Returns the error that stopped the client.
    pub async fn closed(&mut self) -> Result<(), ClientError> {
        let Some(task) = self.task.take() else {
            return Ok(());
        };

        match task.await {
            Ok(result) => result,
            Err(e) => {
                tracing::error!(error = %e, "supervisor task aborted");
                Err(ClientError::Closed)
            }
        }
    }

    /// Requests shutdown and waits for it to complete.
    ///
    /// # Errors
    /// Returns the terminal error if the client had already failed.
    pub async fn shutdown(mut self) -> Result<(), ClientError> {
        self.exit();
        self.closed().await
    }

    fn store(&self) -> &MarketStore {
        self.dispatcher.store()
    }

    fn require(&self, group: ChannelGroup) -> Result<(), ClientError> {
        if self.subscription.contains(group) {
            Ok(())
        } else {
            Err(ClientError::NotSubscribed(group))
        }
    }
}

impl Drop for FeedClient {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}
