use async_trait::async_trait;
use fretlink_core::SignalMessage;
use fretlink_server::SignalingOutput;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::{Mutex, mpsc};

/// Mock SignalingOutput that captures everything a room sends to one member.
#[derive(Clone)]
pub struct MockSignalingOutput {
    tx: mpsc::UnboundedSender<SignalMessage>,
    signals: Arc<Mutex<Vec<SignalMessage>>>,
    closed: Arc<AtomicBool>,
}

impl MockSignalingOutput {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<SignalMessage>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let signaling = Self {
            tx,
            signals: Arc::new(Mutex::new(Vec::new())),
            closed: Arc::new(AtomicBool::new(false)),
        };
        (signaling, rx)
    }

    pub async fn get_signals(&self) -> Vec<SignalMessage> {
        self.signals.lock().await.clone()
    }

    pub async fn kinds(&self) -> Vec<&'static str> {
        self.signals.lock().await.iter().map(|s| s.kind()).collect()
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SignalingOutput for MockSignalingOutput {
    async fn send(&self, message: SignalMessage) {
        tracing::debug!("[MockSignaling] send {}", message.kind());
        self.signals.lock().await.push(message.clone());
        let _ = self.tx.send(message);
    }

    async fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}
