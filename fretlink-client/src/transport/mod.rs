mod rtc_transport;

pub use rtc_transport::{RtcDataSink, RtcTransport, RtcTransportFactory};

use crate::channel::DataSink;
use async_trait::async_trait;
use bytes::Bytes;
use fretlink_core::{IceCandidate, Role};
use std::sync::Arc;
use tokio::sync::mpsc;

/// Callbacks of a peer transport, reified as events for the session driver.
pub enum TransportEvent {
    LocalCandidate(IceCandidate),
    Connected,
    Disconnected,
    Failed,
    /// The data channel is open and can carry traffic.
    ChannelOpen(Arc<dyn DataSink>),
    Message(Bytes),
}

impl std::fmt::Debug for TransportEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransportEvent::LocalCandidate(c) => f.debug_tuple("LocalCandidate").field(c).finish(),
            TransportEvent::Connected => f.write_str("Connected"),
            TransportEvent::Disconnected => f.write_str("Disconnected"),
            TransportEvent::Failed => f.write_str("Failed"),
            TransportEvent::ChannelOpen(_) => f.write_str("ChannelOpen"),
            TransportEvent::Message(data) => write!(f, "Message({} bytes)", data.len()),
        }
    }
}

/// Sender half handed to a link or transport. Every event is stamped with the
/// generation it was created for, so the driver can drop stragglers from a
/// link it already replaced.
pub struct EventSink<T> {
    generation: u64,
    tx: mpsc::Sender<(u64, T)>,
}

impl<T> Clone for EventSink<T> {
    fn clone(&self) -> Self {
        Self {
            generation: self.generation,
            tx: self.tx.clone(),
        }
    }
}

impl<T> EventSink<T> {
    pub fn new(generation: u64, tx: mpsc::Sender<(u64, T)>) -> Self {
        Self { generation, tx }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub async fn emit(&self, event: T) {
        let _ = self.tx.send((self.generation, event)).await;
    }
}

/// One negotiated peer connection. The performer side owns the data channel.
#[async_trait]
pub trait PeerTransport: Send + Sync {
    /// Creates and applies the local offer.
    async fn create_offer(&self) -> anyhow::Result<String>;

    /// Applies a remote offer, then creates and applies the answer.
    async fn accept_offer(&self, sdp: String) -> anyhow::Result<String>;

    async fn apply_answer(&self, sdp: String) -> anyhow::Result<()>;

    async fn add_ice_candidate(&self, candidate: IceCandidate) -> anyhow::Result<()>;

    async fn close(&self) -> anyhow::Result<()>;
}

#[async_trait]
pub trait TransportFactory: Send + Sync {
    async fn create(
        &self,
        role: Role,
        events: EventSink<TransportEvent>,
    ) -> anyhow::Result<Box<dyn PeerTransport>>;
}
