//! Feed dispatcher routing inbound frames to the market data stores.

use crate::book::{BoardMessage, DeltaOutcome};
use crate::error::DispatchError;
use crate::executions::Execution;
use crate::store::MarketStore;
use crate::ticker::Ticker;
use lightstream_core::{ChannelGroup, ChannelKind, ChannelMessage, Inbound, Subscription, decode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// What a successfully routed channel message did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Routed {
    /// Book replaced by a snapshot.
    Snapshot,
    /// Incremental board update.
    Delta(DeltaOutcome),
    /// Ticker appended.
    Ticker,
    /// Execution batch appended.
    Executions {
        /// Executions appended.
        appended: usize,
        /// Executions evicted to stay within capacity.
        evicted: usize,
    },
}

impl Routed {
    /// Returns the group this message made readable, if any.
    ///
    /// A discarded delta does not count: the board is readable only once a
    /// snapshot exists.
    #[must_use]
    pub fn ready_group(&self) -> Option<ChannelGroup> {
        match self {
            Self::Snapshot | Self::Delta(DeltaOutcome::Applied) => {
                Some(ChannelGroup::BoardSnapshot)
            }
            Self::Delta(DeltaOutcome::Discarded) => None,
            Self::Ticker => Some(ChannelGroup::Tickers),
            Self::Executions { .. } => Some(ChannelGroup::Executions),
        }
    }
}

/// Dispatcher counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchStats {
    /// Channel messages applied to a store.
    pub routed: u64,
    /// JSON-RPC replies and error replies.
    pub control: u64,
    /// Messages on channels outside the subscription.
    pub unknown: u64,
    /// Frames or payloads that failed to decode.
    pub malformed: u64,
}

#[derive(Debug, Default)]
struct Counters {
    routed: AtomicU64,
    control: AtomicU64,
    unknown: AtomicU64,
    malformed: AtomicU64,
}

/// Routes decoded channel messages to the stores by channel identifier.
pub struct FeedDispatcher {
    subscription: Subscription,
    store: Arc<MarketStore>,
    counters: Counters,
}

impl FeedDispatcher {
    /// Creates a dispatcher for `subscription` writing into `store`.
    #[must_use]
    pub fn new(subscription: Subscription, store: Arc<MarketStore>) -> Self {
        Self {
            subscription,
            store,
            counters: Counters::default(),
        }
    }

    /// Returns the subscription used for routing.
    #[must_use]
    pub fn subscription(&self) -> &Subscription {
        &self.subscription
    }

    /// Returns the stores written by this dispatcher.
    #[must_use]
    pub fn store(&self) -> &Arc<MarketStore> {
        &self.store
    }

    /// Decodes and routes one raw frame.
    ///
    /// Never fails: decode and routing errors are logged, counted, and the
    /// frame is dropped without touching any store.
    pub fn on_frame(&self, frame: &[u8]) -> Option<Routed> {
        let inbound = match decode(frame) {
            Ok(inbound) => inbound,
            Err(e) => {
                self.counters.malformed.fetch_add(1, Ordering::Relaxed);
                tracing::warn!(error = %e, len = frame.len(), "dropping undecodable frame");
                return None;
            }
        };

        match inbound {
            Inbound::Channel(message) => match self.dispatch(message) {
                Ok(routed) => Some(routed),
                Err(e) => {
                    self.record_failure(&e);
                    None
                }
            },
            Inbound::Reply { id, result } => {
                self.counters.control.fetch_add(1, Ordering::Relaxed);
                tracing::debug!(?id, %result, "request acknowledged");
                None
            }
            Inbound::Error { id, error } => {
                self.counters.control.fetch_add(1, Ordering::Relaxed);
                tracing::warn!(
                    ?id,
                    code = error.code,
                    message = %error.message,
                    "request rejected"
                );
                None
            }
        }
    }

    /// Routes one channel message.
    ///
    /// The payload is fully decoded before any store is touched.
    ///
    /// # Errors
    /// Returns `DispatchError::UnknownChannel` for channels outside the
    /// subscription and `DispatchError::Payload` for malformed payloads.
    pub fn dispatch(&self, message: ChannelMessage) -> Result<Routed, DispatchError> {
        let ChannelMessage { channel, payload } = message;
        let Some(kind) = self.subscription.kind_of(&channel) else {
            return Err(DispatchError::UnknownChannel { channel });
        };

        let routed = match kind {
            ChannelKind::BoardSnapshot => {
                let snapshot: BoardMessage = parse(&channel, payload)?;
                tracing::trace!(
                    %channel,
                    bids = snapshot.bids.len(),
                    asks = snapshot.asks.len(),
                    "board snapshot"
                );
                self.store.apply_snapshot(snapshot);
                Routed::Snapshot
            }
            ChannelKind::Board => {
                let delta: BoardMessage = parse(&channel, payload)?;
                let outcome = self.store.apply_delta(delta);
                if outcome == DeltaOutcome::Discarded {
                    tracing::debug!(%channel, "board delta before snapshot discarded");
                }
                Routed::Delta(outcome)
            }
            ChannelKind::Ticker => {
                let ticker: Ticker = parse(&channel, payload)?;
                self.store.push_ticker(ticker);
                Routed::Ticker
            }
            ChannelKind::Executions => {
                let batch: Vec<Execution> = parse(&channel, payload)?;
                let (appended, evicted) = self.store.append_executions(batch);
                tracing::trace!(%channel, appended, evicted, "executions");
                Routed::Executions { appended, evicted }
            }
        };

        self.counters.routed.fetch_add(1, Ordering::Relaxed);
        Ok(routed)
    }

    /// Returns a copy of the counters.
    #[must_use]
    pub fn stats(&self) -> DispatchStats {
        DispatchStats {
            routed: self.counters.routed.load(Ordering::Relaxed),
            control: self.counters.control.load(Ordering::Relaxed),
            unknown: self.counters.unknown.load(Ordering::Relaxed),
            malformed: self.counters.malformed.load(Ordering::Relaxed),
        }
    }

    fn record_failure(&self, error: &DispatchError) {
        match error {
            DispatchError::UnknownChannel { channel } => {
                self.counters.unknown.fetch_add(1, Ordering::Relaxed);
                tracing::warn!(%channel, "message on unknown channel dropped");
            }
            DispatchError::Payload { .. } | DispatchError::Decode(_) => {
                self.counters.malformed.fetch_add(1, Ordering::Relaxed);
                tracing::warn!(error = %error, "malformed message dropped");
            }
        }
    }
}

fn parse<T: DeserializeOwned>(channel: &str, payload: Value) -> Result<T, DispatchError> {
    serde_json::from_value(payload).map_err(|source| DispatchError::Payload {
        channel: channel.to_string(),
        source,
    })
}
