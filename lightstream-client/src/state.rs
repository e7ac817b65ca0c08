//! Connection lifecycle states and client events.

use lightstream_core::ChannelGroup;
use std::collections::BTreeSet;
use std::fmt;

/// Lifecycle state of the connection supervisor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ConnectionState {
    /// No connection attempt yet.
    #[default]
    Disconnected,
    /// Opening the transport.
    Connecting,
    /// Transport open and subscriptions sent.
    Connected,
    /// Connection lost, waiting before the next attempt.
    Reconnecting,
    /// Closed on request.
    Closed,
    /// Stopped after an unrecoverable error.
    Failed,
}

impl ConnectionState {
    /// Returns true once the supervisor has stopped.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Closed | Self::Failed)
    }

    /// Returns the state name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Disconnected => "disconnected",
            Self::Connecting => "connecting",
            Self::Connected => "connected",
            Self::Reconnecting => "reconnecting",
            Self::Closed => "closed",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Snapshot of the supervisor published to readers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientStatus {
    /// Current lifecycle state.
    pub state: ConnectionState,
    /// Groups that produced at least one record.
    pub ready: BTreeSet<ChannelGroup>,
    /// Successful reconnects so far.
    pub reconnects: usize,
}

/// Events emitted by the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientEvent {
    /// Lifecycle state changed.
    StateChanged(ConnectionState),
    /// A store was updated from the given group.
    Updated(ChannelGroup),
    /// A connection error occurred.
    Error(String),
}
