use async_trait::async_trait;
use bytes::Bytes;
use fretlink_client::{DataSink, EventSink, PeerTransport, TransportEvent, TransportFactory};
use fretlink_core::{IceCandidate, PeerMessage, Role};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Mutex;

#[derive(Debug, Clone, PartialEq)]
pub enum TransportCall {
    Create(Role),
    CreateOffer,
    AcceptOffer(String),
    ApplyAnswer(String),
    AddIceCandidate(IceCandidate),
    Close,
}

pub const MOCK_OFFER: &str = "v=0 mock-offer";
pub const MOCK_ANSWER: &str = "v=0 mock-answer";

/// Data channel that records every frame written to it.
#[derive(Default)]
pub struct MockDataSink {
    sent: Mutex<Vec<Bytes>>,
    closed: AtomicBool,
}

impl MockDataSink {
    pub async fn sent_messages(&self) -> Vec<PeerMessage> {
        self.sent
            .lock()
            .await
            .iter()
            .map(|data| PeerMessage::decode(data).expect("Invalid frame on data channel"))
            .collect()
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DataSink for MockDataSink {
    async fn send(&self, data: Bytes) -> anyhow::Result<()> {
        self.sent.lock().await.push(data);
        Ok(())
    }

    async fn close(&self) -> anyhow::Result<()> {
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}

struct MockTransport {
    calls: Arc<Mutex<Vec<TransportCall>>>,
}

#[async_trait]
impl PeerTransport for MockTransport {
    async fn create_offer(&self) -> anyhow::Result<String> {
        self.calls.lock().await.push(TransportCall::CreateOffer);
        Ok(MOCK_OFFER.to_string())
    }

    async fn accept_offer(&self, sdp: String) -> anyhow::Result<String> {
        self.calls.lock().await.push(TransportCall::AcceptOffer(sdp));
        Ok(MOCK_ANSWER.to_string())
    }

    async fn apply_answer(&self, sdp: String) -> anyhow::Result<()> {
        self.calls.lock().await.push(TransportCall::ApplyAnswer(sdp));
        Ok(())
    }

    async fn add_ice_candidate(&self, candidate: IceCandidate) -> anyhow::Result<()> {
        self.calls
            .lock()
            .await
            .push(TransportCall::AddIceCandidate(candidate));
        Ok(())
    }

    async fn close(&self) -> anyhow::Result<()> {
        self.calls.lock().await.push(TransportCall::Close);
        Ok(())
    }
}

/// Transport factory whose connections are driven by the test.
#[derive(Clone, Default)]
pub struct MockTransportFactory {
    calls: Arc<Mutex<Vec<TransportCall>>>,
    events: Arc<Mutex<Option<EventSink<TransportEvent>>>>,
    pub sink: Arc<MockDataSink>,
}

impl MockTransportFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn calls(&self) -> Vec<TransportCall> {
        self.calls.lock().await.clone()
    }

    pub async fn count(&self, pred: impl Fn(&TransportCall) -> bool) -> usize {
        self.calls.lock().await.iter().filter(|c| pred(c)).count()
    }

    /// Waits until `pred` matched at least `n` recorded calls.
    pub async fn wait_for_calls(
        &self,
        pred: impl Fn(&TransportCall) -> bool,
        n: usize,
        timeout_ms: u64,
    ) -> bool {
        let start = std::time::Instant::now();
        let timeout = std::time::Duration::from_millis(timeout_ms);

        loop {
            if self.count(&pred).await >= n {
                return true;
            }
            if start.elapsed() > timeout {
                return false;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
    }

    /// Emits a callback from the most recently created transport.
    pub async fn emit(&self, event: TransportEvent) {
        match self.events.lock().await.as_ref() {
            Some(events) => events.emit(event).await,
            None => panic!("No transport was created"),
        }
    }

    /// ICE connects and the data channel opens.
    pub async fn open_channel(&self) {
        self.emit(TransportEvent::Connected).await;
        self.emit(TransportEvent::ChannelOpen(self.sink.clone())).await;
    }

    /// A frame arrives from the peer.
    pub async fn deliver(&self, message: &PeerMessage) {
        let data = message.encode().expect("Failed to encode peer message");
        self.emit(TransportEvent::Message(Bytes::from(data))).await;
    }
}

#[async_trait]
impl TransportFactory for MockTransportFactory {
    async fn create(
        &self,
        role: Role,
        events: EventSink<TransportEvent>,
    ) -> anyhow::Result<Box<dyn PeerTransport>> {
        tracing::debug!("[MockTransport] create for {}", role);
        self.calls.lock().await.push(TransportCall::Create(role));
        *self.events.lock().await = Some(events);
        Ok(Box::new(MockTransport {
            calls: self.calls.clone(),
        }))
    }
}
