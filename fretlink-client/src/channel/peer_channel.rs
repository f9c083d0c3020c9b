use crate::channel::DataSink;
use crate::error::SendError;
use bytes::Bytes;
use fretlink_core::PeerMessage;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::{RwLock, mpsc};
use tracing::{debug, warn};

pub type MessageHandler = Arc<dyn Fn(PeerMessage) + Send + Sync>;

struct ChannelInner {
    sink: Arc<dyn DataSink>,
    writer_tx: mpsc::UnboundedSender<Bytes>,
    handler: RwLock<Option<MessageHandler>>,
    closed: AtomicBool,
}

/// Point-to-point message path over an open data channel.
///
/// Sends are fire-and-forget and leave in call order through a single writer
/// task; nothing is acknowledged or retried. Exactly one message handler is
/// installed at a time.
#[derive(Clone)]
pub struct PeerChannel {
    inner: Arc<ChannelInner>,
}

impl PeerChannel {
    pub fn new(sink: Arc<dyn DataSink>) -> Self {
        let (writer_tx, mut writer_rx) = mpsc::unbounded_channel::<Bytes>();

        let writer_sink = sink.clone();
        tokio::spawn(async move {
            while let Some(data) = writer_rx.recv().await {
                if let Err(e) = writer_sink.send(data).await {
                    warn!("Peer channel write failed: {:#}", e);
                }
            }
            debug!("Peer channel writer finished");
        });

        Self {
            inner: Arc::new(ChannelInner {
                sink,
                writer_tx,
                handler: RwLock::new(None),
                closed: AtomicBool::new(false),
            }),
        }
    }

    pub fn send(&self, message: &PeerMessage) -> Result<(), SendError> {
        if self.is_closed() {
            return Err(SendError::Closed);
        }
        let data = message
            .encode()
            .map_err(|e| SendError::Encode(e.to_string()))?;
        self.inner
            .writer_tx
            .send(Bytes::from(data))
            .map_err(|_| SendError::Closed)
    }

    /// Installs `handler`, replacing the previous one.
    pub async fn on_message(&self, handler: MessageHandler) {
        *self.inner.handler.write().await = Some(handler);
    }

    /// Hands one inbound frame to the handler. Undecodable frames and frames
    /// after close are dropped.
    pub async fn deliver(&self, data: &[u8]) {
        if self.is_closed() {
            return;
        }
        let message = match PeerMessage::decode(data) {
            Ok(message) => message,
            Err(e) => {
                warn!("Dropping malformed peer message: {}", e);
                return;
            }
        };
        if let Some(handler) = self.inner.handler.read().await.as_ref() {
            handler(message);
        }
    }

    pub async fn close(&self) {
        if self.inner.closed.swap(true, Ordering::SeqCst) {
            return;
        }
        self.inner.handler.write().await.take();
        if let Err(e) = self.inner.sink.close().await {
            debug!("Closing data channel: {:#}", e);
        }
    }

    pub fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::SeqCst)
    }
}
