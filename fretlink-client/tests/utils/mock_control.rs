use async_trait::async_trait;
use fretlink_client::{ClientError, ControlConnector, ControlEvent, ControlLink, EventSink};
use fretlink_core::SignalMessage;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::{Mutex, mpsc};

/// In-process stand-in for the rendezvous server.
///
/// Frames the session sends are decoded and recorded; the test plays the
/// server by pushing frames back through [`MockControl::push`].
#[derive(Clone, Default)]
pub struct MockControl {
    events: Arc<Mutex<Option<EventSink<ControlEvent>>>>,
    sent: Arc<Mutex<Vec<SignalMessage>>>,
    connects: Arc<AtomicUsize>,
    refuse: Arc<AtomicBool>,
}

impl MockControl {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every following connection attempt fail.
    pub fn refuse_connections(&self, refuse: bool) {
        self.refuse.store(refuse, Ordering::SeqCst);
    }

    pub fn connect_count(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }

    pub async fn sent(&self) -> Vec<SignalMessage> {
        self.sent.lock().await.clone()
    }

    pub async fn count_sent(&self, kind: &str) -> usize {
        self.sent
            .lock()
            .await
            .iter()
            .filter(|m| m.kind() == kind)
            .count()
    }

    /// Waits until at least `n` frames of `kind` were sent and returns the nth.
    pub async fn wait_for_sent(&self, kind: &str, n: usize, timeout_ms: u64) -> Option<SignalMessage> {
        let start = std::time::Instant::now();
        let timeout = std::time::Duration::from_millis(timeout_ms);

        loop {
            let found = self
                .sent
                .lock()
                .await
                .iter()
                .filter(|m| m.kind() == kind)
                .nth(n.saturating_sub(1))
                .cloned();
            if found.is_some() {
                return found;
            }
            if start.elapsed() > timeout {
                return None;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
    }

    /// Delivers a server frame to the session.
    pub async fn push(&self, message: SignalMessage) {
        let text = message.encode().expect("Failed to encode signal");
        self.push_raw(text).await;
    }

    pub async fn push_raw(&self, text: String) {
        tracing::debug!("[MockControl] push {}", text);
        match self.events.lock().await.as_ref() {
            Some(events) => events.emit(ControlEvent::Text(text)).await,
            None => panic!("No signaling link is connected"),
        }
    }

    /// Simulates the server closing the socket.
    pub async fn drop_link(&self) {
        if let Some(events) = self.events.lock().await.take() {
            events.emit(ControlEvent::Closed).await;
        }
    }
}

#[async_trait]
impl ControlConnector for MockControl {
    async fn connect(&self, events: EventSink<ControlEvent>) -> fretlink_client::Result<ControlLink> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        if self.refuse.load(Ordering::SeqCst) {
            return Err(ClientError::Signaling("connection refused".to_string()));
        }

        *self.events.lock().await = Some(events);

        let (tx, mut rx) = mpsc::unbounded_channel::<String>();
        let sent = self.sent.clone();
        tokio::spawn(async move {
            while let Some(text) = rx.recv().await {
                let message = SignalMessage::decode(&text).expect("Session sent an invalid frame");
                tracing::debug!("[MockControl] received {}", message.kind());
                sent.lock().await.push(message);
            }
        });

        Ok(ControlLink::new(tx))
    }
}
