//! WebSocket transport.
//!
//! Connections use `TCP_NODELAY` and rustls for `wss://` endpoints.

use crate::connector::{Connection, Connector};
use crate::error::TransportError;
use async_trait::async_trait;
use bytes::Bytes;
use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::error::Error as WsError;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async_tls_with_config};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Connector for `ws://` and `wss://` endpoints.
#[derive(Debug, Clone)]
pub struct WsConnector {
    nodelay: bool,
}

impl WsConnector {
    /// Creates a connector with `TCP_NODELAY` enabled.
    #[must_use]
    pub fn new() -> Self {
        Self { nodelay: true }
    }

    /// Sets the `TCP_NODELAY` option.
    #[must_use]
    pub fn nodelay(mut self, enabled: bool) -> Self {
        self.nodelay = enabled;
        self
    }
}

impl Default for WsConnector {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Connector for WsConnector {
    async fn connect(&self, url: &str) -> Result<Box<dyn Connection>, TransportError> {
        if !(url.starts_with("ws://") || url.starts_with("wss://")) {
            return Err(TransportError::invalid_url(url));
        }

        let (stream, response) =
            connect_async_tls_with_config(url, None, self.nodelay, None).await?;
        tracing::debug!(url, status = %response.status(), "websocket handshake complete");

        Ok(Box::new(WsConnection { stream }))
    }
}

/// Open WebSocket connection.
pub struct WsConnection {
    stream: WsStream,
}

#[async_trait]
impl Connection for WsConnection {
    async fn send(&mut self, text: String) -> Result<(), TransportError> {
        self.stream.send(Message::Text(text)).await?;
        Ok(())
    }

    async fn recv(&mut self) -> Option<Result<Bytes, TransportError>> {
        loop {
            let message = match self.stream.next().await? {
                Ok(message) => message,
                Err(WsError::ConnectionClosed | WsError::AlreadyClosed) => return None,
                Err(e) => return Some(Err(e.into())),
            };

            match message {
                Message::Text(text) => return Some(Ok(Bytes::from(text))),
                Message::Binary(data) => return Some(Ok(Bytes::from(data))),
                // tungstenite queues the pong reply itself
                Message::Ping(_) | Message::Pong(_) | Message::Frame(_) => {}
                Message::Close(frame) => {
                    tracing::info!(?frame, "websocket closed by peer");
                    return None;
                }
            }
        }
    }

    async fn close(&mut self) -> Result<(), TransportError> {
        match self.stream.close(None).await {
            Ok(()) | Err(WsError::ConnectionClosed | WsError::AlreadyClosed) => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
