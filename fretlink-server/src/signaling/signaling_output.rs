use async_trait::async_trait;
use axum::extract::ws::Message;
use fretlink_core::SignalMessage;
use tokio::sync::mpsc;
use tracing::{error, warn};

/// Write side of one member's control connection, as seen by its room.
#[async_trait]
pub trait SignalingOutput: Send + Sync {
    async fn send(&self, message: SignalMessage);

    /// Sends a close frame after everything queued so far.
    async fn close(&self);
}

/// [`SignalingOutput`] feeding the writer task of a WebSocket.
#[derive(Clone)]
pub struct WsOutput {
    tx: mpsc::UnboundedSender<Message>,
}

impl WsOutput {
    pub fn new(tx: mpsc::UnboundedSender<Message>) -> Self {
        Self { tx }
    }
}

#[async_trait]
impl SignalingOutput for WsOutput {
    async fn send(&self, message: SignalMessage) {
        match message.encode() {
            Ok(json) => {
                if self.tx.send(Message::Text(json.into())).is_err() {
                    warn!("Dropping {}: socket already closed", message.kind());
                }
            }
            Err(e) => error!("Failed to serialize signal message: {}", e),
        }
    }

    async fn close(&self) {
        let _ = self.tx.send(Message::Close(None));
    }
}
