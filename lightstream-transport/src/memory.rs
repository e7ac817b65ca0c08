//! In-process transport with a scriptable peer.
//!
//! Each call to [`MemoryConnector::connect`] consumes the next scripted
//! outcome: an accepted session (driven through the returned
//! [`MemoryPeer`]), a refusal, or a connect that never completes.

use crate::connector::{Connection, Connector};
use crate::error::TransportError;
use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::mpsc;

type Frame = Result<Bytes, TransportError>;

enum Script {
    Accept(MemoryConnection),
    Refuse(String),
    Hang,
}

#[derive(Default)]
struct ConnectorState {
    scripts: VecDeque<Script>,
    urls: Vec<String>,
}

/// Connector handing out scripted in-memory sessions.
#[derive(Clone, Default)]
pub struct MemoryConnector {
    state: Arc<Mutex<ConnectorState>>,
}

impl MemoryConnector {
    /// Creates a connector with no scripted sessions.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a session that the next connect accepts.
    #[must_use]
    pub fn accept(&self) -> MemoryPeer {
        let (inbound_tx, inbound_rx) = mpsc::unbounded_channel();
        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
        let closed = Arc::new(AtomicBool::new(false));

        self.state
            .lock()
            .scripts
            .push_back(Script::Accept(MemoryConnection {
                inbound: inbound_rx,
                outbound: outbound_tx,
                closed: Arc::clone(&closed),
            }));

        MemoryPeer {
            inbound: inbound_tx,
            outbound: outbound_rx,
            closed,
        }
    }

    /// Queues a connect that fails with `message`.
    pub fn refuse(&self, message: impl Into<String>) {
        self.state
            .lock()
            .scripts
            .push_back(Script::Refuse(message.into()));
    }

    /// Queues a connect that never completes.
    pub fn hang(&self) {
        self.state.lock().scripts.push_back(Script::Hang);
    }

    /// Returns the URLs of every connect attempt so far.
    #[must_use]
    pub fn attempts(&self) -> Vec<String> {
        self.state.lock().urls.clone()
    }
}

#[async_trait]
impl Connector for MemoryConnector {
    async fn connect(&self, url: &str) -> Result<Box<dyn Connection>, TransportError> {
        let script = {
            let mut state = self.state.lock();
            state.urls.push(url.to_string());
            state.scripts.pop_front()
        };

        match script {
            Some(Script::Accept(conn)) => Ok(Box::new(conn)),
            Some(Script::Refuse(message)) => Err(TransportError::channel(message)),
            Some(Script::Hang) => std::future::pending().await,
            None => Err(TransportError::channel("no scripted session")),
        }
    }
}

/// Client side of an in-memory session.
pub struct MemoryConnection {
    inbound: mpsc::UnboundedReceiver<Frame>,
    outbound: mpsc::UnboundedSender<String>,
    closed: Arc<AtomicBool>,
}

#[async_trait]
impl Connection for MemoryConnection {
    async fn send(&mut self, text: String) -> Result<(), TransportError> {
        if self.closed.load(Ordering::Acquire) {
            return Err(TransportError::ConnectionClosed);
        }
        self.outbound
            .send(text)
            .map_err(|_| TransportError::ConnectionClosed)
    }

    async fn recv(&mut self) -> Option<Frame> {
        self.inbound.recv().await
    }

    async fn close(&mut self) -> Result<(), TransportError> {
        self.closed.store(true, Ordering::Release);
        self.inbound.close();
        Ok(())
    }
}

/// Test-side handle of an in-memory session.
pub struct MemoryPeer {
    inbound: mpsc::UnboundedSender<Frame>,
    outbound: mpsc::UnboundedReceiver<String>,
    closed: Arc<AtomicBool>,
}

impl MemoryPeer {
    /// Delivers a frame to the client. Returns false once the client closed.
    pub fn push(&self, frame: impl Into<Bytes>) -> bool {
        self.inbound.send(Ok(frame.into())).is_ok()
    }

    /// Delivers a transport error to the client.
    pub fn fail(&self, message: impl Into<String>) -> bool {
        self.inbound
            .send(Err(TransportError::channel(message)))
            .is_ok()
    }

    /// Closes the session from the peer side.
    pub fn hang_up(self) {
        drop(self);
    }

    /// Waits for the next frame the client sent.
    pub async fn next_sent(&mut self) -> Option<String> {
        self.outbound.recv().await
    }

    /// Drains the frames the client sent so far.
    pub fn drain_sent(&mut self) -> Vec<String> {
        let mut sent = Vec::new();
        while let Ok(text) = self.outbound.try_recv() {
            sent.push(text);
        }
        sent
    }

    /// Returns true once the client closed its side.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }
}
