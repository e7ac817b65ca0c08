//! Connection supervisor.
//!
//! Owns the transport and the connection state. It is the only task that
//! writes to the stores: every frame is handed to the dispatcher on the
//! receive loop, and the outcome is published on the status watch and the
//! event broadcast.

use crate::error::ClientError;
use crate::reconnect::ReconnectState;
use crate::state::{ClientEvent, ClientStatus, ConnectionState};
use lightstream_core::subscribe_request;
use lightstream_marketdata::FeedDispatcher;
use lightstream_transport::{Connection, Connector, TransportError};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, watch};
use tokio_util::sync::CancellationToken;

type BoxConnection = Box<dyn Connection>;

pub(crate) struct Supervisor {
    pub(crate) url: String,
    pub(crate) connector: Arc<dyn Connector>,
    pub(crate) connect_timeout: Duration,
    pub(crate) reconnect: ReconnectState,
    pub(crate) dispatcher: Arc<FeedDispatcher>,
    pub(crate) status: watch::Sender<ClientStatus>,
    pub(crate) events: broadcast::Sender<ClientEvent>,
    pub(crate) shutdown: CancellationToken,
}

impl Supervisor {
    /// Runs until closed or failed, returning the terminal error if any.
    pub(crate) async fn run(mut self) -> Result<(), ClientError> {
        let result = self.drive().await;

        match &result {
            Ok(()) => {
                self.dispatcher.store().clear();
                self.set_state(ConnectionState::Closed);
            }
            Err(e) => {
                tracing::error!(error = %e, url = %self.url, "feed client failed");
                self.emit(ClientEvent::Error(e.to_string()));
                self.set_state(ConnectionState::Failed);
            }
        }

        result
    }

    async fn drive(&mut self) -> Result<(), ClientError> {
        let Some(mut conn) = self.open().await? else {
            return Ok(());
        };

        loop {
            let lost = self.receive(&mut conn).await;

            if let Err(e) = conn.close().await {
                tracing::debug!(error = %e, "error closing connection");
            }

            let Some(error) = lost else {
                return Ok(());
            };

            if !self.reconnect.enabled() {
                return Err(error);
            }

            tracing::warn!(error = %error, "connection lost");
            self.emit(ClientEvent::Error(error.to_string()));
            self.dispatcher.store().mark_book_stale();

            conn = match self.reopen().await? {
                Some(conn) => conn,
                None => return Ok(()),
            };

            self.reconnect.on_success();
            self.status.send_modify(|s| s.reconnects += 1);
        }
    }

    /// Retries with backoff until a connection opens, the attempts for this
    /// outage run out, or shutdown is requested.
    async fn reopen(&mut self) -> Result<Option<BoxConnection>, ClientError> {
        loop {
            let Some(delay) = self.reconnect.next_attempt() else {
                return Err(ClientError::MaxReconnectAttempts);
            };

            self.set_state(ConnectionState::Reconnecting);
            tracing::info!(
                ?delay,
                attempt = self.reconnect.attempts(),
                "reconnecting"
            );

            tokio::select! {
                _ = self.shutdown.cancelled() => return Ok(None),
                _ = tokio::time::sleep(delay) => {}
            }

            match self.open().await {
                Ok(conn) => return Ok(conn),
                Err(e) => {
                    tracing::warn!(error = %e, "reconnect attempt failed");
                    self.emit(ClientEvent::Error(e.to_string()));
                }
            }
        }
    }

    /// Opens the transport within the connect timeout and sends one
    /// subscribe request per channel, in order.
    ///
    /// Returns `None` if shutdown was requested while connecting.
    async fn open(&self) -> Result<Option<BoxConnection>, ClientError> {
        self.set_state(ConnectionState::Connecting);
        tracing::info!(url = %self.url, "connecting");

        let connect = tokio::time::timeout(self.connect_timeout, self.connector.connect(&self.url));
        let mut conn = tokio::select! {
            _ = self.shutdown.cancelled() => return Ok(None),
            result = connect => result.map_err(|_| ClientError::ConnectTimeout)??,
        };

        if let Err(e) = self.subscribe(conn.as_mut()).await {
            if let Err(close_err) = conn.close().await {
                tracing::debug!(error = %close_err, "error closing connection");
            }
            return Err(e.into());
        }

        self.set_state(ConnectionState::Connected);
        Ok(Some(conn))
    }

    async fn subscribe(&self, conn: &mut dyn Connection) -> Result<(), TransportError> {
        for channel in self.dispatcher.subscription().channel_ids() {
            tracing::debug!(%channel, "subscribing");
            conn.send(subscribe_request(channel)).await?;
        }
        Ok(())
    }

    /// Feeds frames to the dispatcher until the connection is lost or
    /// shutdown is requested. Returns the error that ended the connection.
    async fn receive(&self, conn: &mut BoxConnection) -> Option<ClientError> {
        loop {
            tokio::select! {
                biased;
                _ = self.shutdown.cancelled() => return None,
                frame = conn.recv() => match frame {
                    Some(Ok(bytes)) => self.on_frame(&bytes),
                    Some(Err(e)) => return Some(e.into()),
                    None => {
                        tracing::info!(url = %self.url, "connection closed by peer");
                        return Some(TransportError::ConnectionClosed.into());
                    }
                },
            }
        }
    }

    fn on_frame(&self, frame: &[u8]) {
        let Some(group) = self
            .dispatcher
            .on_frame(frame)
            .and_then(|routed| routed.ready_group())
        else {
            return;
        };

        let first = self.status.send_if_modified(|s| s.ready.insert(group));
        if first {
            tracing::info!(%group, "channel group ready");
        }
        self.emit(ClientEvent::Updated(group));
    }

    fn set_state(&self, state: ConnectionState) {
        let changed = self.status.send_if_modified(|s| {
            if s.state == state {
                return false;
            }
            s.state = state;
            true
        });

        if changed {
            tracing::info!(%state, "connection state changed");
            self.emit(ClientEvent::StateChanged(state));
        }
    }

    fn emit(&self, event: ClientEvent) {
        // No subscribers is fine
        let _ = self.events.send(event);
    }
}
