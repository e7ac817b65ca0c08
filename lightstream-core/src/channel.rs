//! Channel groups and concrete channel naming.
//!
//! A caller asks for coarse [`ChannelGroup`]s; the feed is addressed by
//! concrete channel identifiers of the form `<namespace>_<prefix>_<symbol>`.
//! [`Subscription`] performs that mapping once, validates it, and answers the
//! reverse lookup used when routing inbound messages.

use crate::error::{ConfigError, Result};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Namespace the production endpoint prefixes every channel with.
pub const DEFAULT_NAMESPACE: &str = "lightning";

/// Group of channels a caller can request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ChannelGroup {
    /// Order book snapshots plus incremental board updates.
    BoardSnapshot,
    /// Ticker stream.
    Tickers,
    /// Trade execution stream.
    Executions,
}

impl ChannelGroup {
    /// All groups, in subscription order.
    pub const ALL: [ChannelGroup; 3] = [
        ChannelGroup::BoardSnapshot,
        ChannelGroup::Tickers,
        ChannelGroup::Executions,
    ];

    /// Returns the configuration name of the group.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::BoardSnapshot => "board_snapshot",
            Self::Tickers => "tickers",
            Self::Executions => "executions",
        }
    }

    /// Returns the concrete channel kinds this group subscribes to.
    #[must_use]
    pub const fn kinds(self) -> &'static [ChannelKind] {
        match self {
            Self::BoardSnapshot => &[ChannelKind::BoardSnapshot, ChannelKind::Board],
            Self::Tickers => &[ChannelKind::Ticker],
            Self::Executions => &[ChannelKind::Executions],
        }
    }
}

impl fmt::Display for ChannelGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChannelGroup {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "board_snapshot" => Ok(Self::BoardSnapshot),
            "tickers" => Ok(Self::Tickers),
            "executions" => Ok(Self::Executions),
            other => Err(ConfigError::UnknownChannelGroup {
                name: other.to_string(),
            }),
        }
    }
}

/// Concrete channel on the feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ChannelKind {
    /// Full order book snapshot.
    BoardSnapshot,
    /// Incremental order book update.
    Board,
    /// Ticker record.
    Ticker,
    /// Batch of executions.
    Executions,
}

impl ChannelKind {
    /// Returns the channel name prefix, without namespace or symbol.
    #[must_use]
    pub const fn prefix(self) -> &'static str {
        match self {
            Self::BoardSnapshot => "board_snapshot",
            Self::Board => "board",
            Self::Ticker => "ticker",
            Self::Executions => "executions",
        }
    }

    /// Returns the group this channel belongs to.
    #[must_use]
    pub const fn group(self) -> ChannelGroup {
        match self {
            Self::BoardSnapshot | Self::Board => ChannelGroup::BoardSnapshot,
            Self::Ticker => ChannelGroup::Tickers,
            Self::Executions => ChannelGroup::Executions,
        }
    }
}

/// Builds the concrete channel identifier for `kind` and `symbol`.
#[must_use]
pub fn channel_name(namespace: Option<&str>, kind: ChannelKind, symbol: &str) -> String {
    match namespace {
        Some(ns) => format!("{}_{}_{}", ns, kind.prefix(), symbol),
        None => format!("{}_{}", kind.prefix(), symbol),
    }
}

/// Validated, immutable subscription for one symbol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subscription {
    symbol: String,
    namespace: Option<String>,
    groups: BTreeSet<ChannelGroup>,
    channels: Vec<(ChannelKind, String)>,
}

impl Subscription {
    /// Creates a subscription under [`DEFAULT_NAMESPACE`].
    ///
    /// # Errors
    /// Returns `ConfigError` if the symbol is empty or contains whitespace.
    pub fn new(
        symbol: impl Into<String>,
        groups: impl IntoIterator<Item = ChannelGroup>,
    ) -> Result<Self> {
        Self::with_namespace(symbol, Some(DEFAULT_NAMESPACE), groups)
    }

    /// Creates a subscription for every channel group.
    ///
    /// # Errors
    /// Returns `ConfigError` if the symbol is invalid.
    pub fn all(symbol: impl Into<String>) -> Result<Self> {
        Self::new(symbol, ChannelGroup::ALL)
    }

    /// Creates a subscription from group names such as `"tickers"`.
    ///
    /// # Errors
    /// Returns `ConfigError` if the symbol is invalid or a name is unknown.
    pub fn from_names<I, S>(symbol: impl Into<String>, names: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let groups = names
            .into_iter()
            .map(|name| name.as_ref().parse::<ChannelGroup>())
            .collect::<Result<Vec<_>>>()?;
        Self::new(symbol, groups)
    }

    /// Creates a subscription with an explicit namespace.
    ///
    /// `None` (or an empty namespace) yields bare `<prefix>_<symbol>` names.
    ///
    /// # Errors
    /// Returns `ConfigError` if the symbol is empty or contains whitespace.
    pub fn with_namespace(
        symbol: impl Into<String>,
        namespace: Option<&str>,
        groups: impl IntoIterator<Item = ChannelGroup>,
    ) -> Result<Self> {
        let symbol = symbol.into();
        if symbol.is_empty() {
            return Err(ConfigError::EmptySymbol);
        }
        if symbol.chars().any(char::is_whitespace) {
            return Err(ConfigError::InvalidSymbol { symbol });
        }

        let namespace = namespace.filter(|ns| !ns.is_empty()).map(str::to_string);
        let groups: BTreeSet<ChannelGroup> = groups.into_iter().collect();

        let channels = groups
            .iter()
            .flat_map(|group| group.kinds().iter().copied())
            .map(|kind| (kind, channel_name(namespace.as_deref(), kind, &symbol)))
            .collect();

        Ok(Self {
            symbol,
            namespace,
            groups,
            channels,
        })
    }

    /// Returns the subscribed symbol.
    #[must_use]
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Returns the channel namespace, if any.
    #[must_use]
    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    /// Returns the requested groups.
    #[must_use]
    pub fn groups(&self) -> &BTreeSet<ChannelGroup> {
        &self.groups
    }

    /// Returns true if `group` was requested.
    #[must_use]
    pub fn contains(&self, group: ChannelGroup) -> bool {
        self.groups.contains(&group)
    }

    /// Returns the concrete channel identifiers, in subscription order.
    pub fn channel_ids(&self) -> impl Iterator<Item = &str> {
        self.channels.iter().map(|(_, id)| id.as_str())
    }

    /// Returns the identifier subscribed for `kind`, if its group was requested.
    #[must_use]
    pub fn channel_id(&self, kind: ChannelKind) -> Option<&str> {
        self.channels
            .iter()
            .find(|(k, _)| *k == kind)
            .map(|(_, id)| id.as_str())
    }

    /// Maps an inbound channel identifier back to its kind.
    #[must_use]
    pub fn kind_of(&self, channel_id: &str) -> Option<ChannelKind> {
        self.channels
            .iter()
            .find(|(_, id)| id == channel_id)
            .map(|(kind, _)| *kind)
    }
}
