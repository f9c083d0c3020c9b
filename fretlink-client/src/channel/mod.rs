mod peer_channel;

pub use peer_channel::{MessageHandler, PeerChannel};

use async_trait::async_trait;
use bytes::Bytes;

/// Raw write side of a negotiated data path.
#[async_trait]
pub trait DataSink: Send + Sync {
    async fn send(&self, data: Bytes) -> anyhow::Result<()>;

    async fn close(&self) -> anyhow::Result<()>;
}
