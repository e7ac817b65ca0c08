//! Client builder and validated configuration.

use crate::client::FeedClient;
use crate::error::ClientError;
use crate::reconnect::ReconnectConfig;
use lightstream_core::{ChannelGroup, DEFAULT_NAMESPACE, Subscription};
use lightstream_marketdata::StoreConfig;
use lightstream_transport::Connector;
use std::time::Duration;

/// Default JSON-RPC endpoint.
pub const DEFAULT_ENDPOINT: &str = "wss://ws.lightstream.bitflyer.com/json-rpc";

#[derive(Debug, Clone)]
enum Groups {
    Typed(Vec<ChannelGroup>),
    Named(Vec<String>),
}

/// Builder for configuring and creating a client.
#[derive(Debug, Clone)]
pub struct ClientBuilder {
    symbol: String,
    endpoint: String,
    groups: Groups,
    namespace: Option<String>,
    connect_timeout: Duration,
    ready_timeout: Option<Duration>,
    reconnect_config: ReconnectConfig,
    store_config: StoreConfig,
    event_capacity: usize,
}

impl ClientBuilder {
    /// Creates a builder for `symbol` subscribing to every channel group.
    #[must_use]
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            groups: Groups::Typed(ChannelGroup::ALL.to_vec()),
            namespace: Some(DEFAULT_NAMESPACE.to_string()),
            connect_timeout: Duration::from_secs(5),
            ready_timeout: None,
            reconnect_config: ReconnectConfig::default(),
            store_config: StoreConfig::default(),
            event_capacity: 1024,
        }
    }

    /// Sets the endpoint URL.
    #[must_use]
    pub fn endpoint(mut self, url: impl Into<String>) -> Self {
        self.endpoint = url.into();
        self
    }

    /// Sets the channel groups to subscribe to.
    #[must_use]
    pub fn channels(mut self, groups: impl IntoIterator<Item = ChannelGroup>) -> Self {
        self.groups = Groups::Typed(groups.into_iter().collect());
        self
    }

    /// Sets the channel groups by name (`board_snapshot`, `tickers`, `executions`).
    ///
    /// Names are validated by [`build`](Self::build).
    #[must_use]
    pub fn channel_names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.groups = Groups::Named(names.into_iter().map(Into::into).collect());
        self
    }

    /// Sets the channel namespace; `None` yields bare channel names.
    #[must_use]
    pub fn namespace(mut self, namespace: Option<&str>) -> Self {
        self.namespace = namespace.map(str::to_string);
        self
    }

    /// Sets the connection timeout.
    #[must_use]
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Bounds the readiness wait performed by `connect`.
    #[must_use]
    pub fn ready_timeout(mut self, timeout: Duration) -> Self {
        self.ready_timeout = Some(timeout);
        self
    }

    /// Enables or disables automatic reconnection.
    #[must_use]
    pub fn reconnect(mut self, enabled: bool) -> Self {
        self.reconnect_config.enabled = enabled;
        self
    }

    /// Sets the initial reconnection delay.
    #[must_use]
    pub fn reconnect_delay(mut self, delay: Duration) -> Self {
        self.reconnect_config.initial_delay = delay;
        self
    }

    /// Sets the maximum reconnection delay.
    #[must_use]
    pub fn max_reconnect_delay(mut self, delay: Duration) -> Self {
        self.reconnect_config.max_delay = delay;
        self
    }

    /// Sets the backoff multiplier. Must be finite and at least 1.0.
    #[must_use]
    pub fn backoff_multiplier(mut self, multiplier: f64) -> Self {
        self.reconnect_config.backoff_multiplier = multiplier;
        self
    }

    /// Sets the reopen attempts allowed per lost connection (0 = unlimited).
    #[must_use]
    pub fn max_reconnect_attempts(mut self, max: usize) -> Self {
        self.reconnect_config.max_attempts = max;
        self
    }

    /// Sets the number of tickers retained.
    #[must_use]
    pub fn ticker_capacity(mut self, capacity: usize) -> Self {
        self.store_config.ticker_capacity = capacity;
        self
    }

    /// Sets the number of executions retained.
    #[must_use]
    pub fn execution_capacity(mut self, capacity: usize) -> Self {
        self.store_config.execution_capacity = capacity;
        self
    }

    /// Sets the event channel capacity.
    #[must_use]
    pub fn event_capacity(mut self, capacity: usize) -> Self {
        self.event_capacity = capacity;
        self
    }

    /// Validates the configuration.
    ///
    /// # Errors
    /// Returns `ClientError::Config` for an invalid symbol, channel group
    /// name or backoff multiplier.
    pub fn build(self) -> Result<ClientConfig, ClientError> {
        self.reconnect_config.validate()?;

        let namespace = self.namespace.as_deref();
        let subscription = match self.groups {
            Groups::Typed(groups) => Subscription::with_namespace(self.symbol, namespace, groups)?,
            Groups::Named(names) => {
                let groups = names
                    .iter()
                    .map(|name| name.parse::<ChannelGroup>())
                    .collect::<Result<Vec<_>, _>>()?;
                Subscription::with_namespace(self.symbol, namespace, groups)?
            }
        };

        Ok(ClientConfig {
            endpoint: self.endpoint,
            subscription,
            connect_timeout: self.connect_timeout,
            ready_timeout: self.ready_timeout,
            reconnect: self.reconnect_config,
            store: self.store_config,
            event_capacity: self.event_capacity.max(1),
        })
    }

    /// Connects over WebSocket and waits until every requested group is ready.
    ///
    /// # Errors
    /// Returns `ClientError` if the configuration is invalid, the connection
    /// cannot be opened, or readiness is not reached.
    #[cfg(feature = "ws")]
    pub async fn connect(self) -> Result<FeedClient, ClientError> {
        self.connect_with(lightstream_transport::WsConnector::new())
            .await
    }

    /// Connects through `connector` and waits until every requested group is ready.
    ///
    /// # Errors
    /// Returns `ClientError` if the configuration is invalid, the connection
    /// cannot be opened, or readiness is not reached.
    pub async fn connect_with<C>(self, connector: C) -> Result<FeedClient, ClientError>
    where
        C: Connector + 'static,
    {
        let config = self.build()?;
        let ready_timeout = config.ready_timeout;
        let mut client = FeedClient::start(config, connector);
        client.wait_ready(ready_timeout).await?;
        Ok(client)
    }

    /// Starts the client through `connector` without waiting for readiness.
    ///
    /// # Errors
    /// Returns `ClientError::Config` if the configuration is invalid.
    pub async fn spawn_with<C>(self, connector: C) -> Result<FeedClient, ClientError>
    where
        C: Connector + 'static,
    {
        let config = self.build()?;
        Ok(FeedClient::start(config, connector))
    }
}

/// Validated client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Endpoint URL.
    pub endpoint: String,
    /// Subscription for the symbol.
    pub subscription: Subscription,
    /// Connection timeout.
    pub connect_timeout: Duration,
    /// Readiness wait bound used by `connect`.
    pub ready_timeout: Option<Duration>,
    /// Reconnection policy.
    pub reconnect: ReconnectConfig,
    /// Retention limits.
    pub store: StoreConfig,
    /// Event channel capacity.
    pub event_capacity: usize,
}
