mod ws_connector;

pub use ws_connector::WsConnector;

use crate::error::{ClientError, Result};
use crate::transport::EventSink;
use async_trait::async_trait;
use fretlink_core::SignalMessage;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

#[derive(Debug, Clone, PartialEq)]
pub enum ControlEvent {
    Text(String),
    Closed,
}

/// Outbound half of a live signaling connection.
///
/// Dropping the outbound sender lets the writer flush and close the socket;
/// reader tasks registered with [`ControlLink::with_task`] are aborted.
pub struct ControlLink {
    outbound: mpsc::UnboundedSender<String>,
    tasks: Vec<JoinHandle<()>>,
}

impl ControlLink {
    pub fn new(outbound: mpsc::UnboundedSender<String>) -> Self {
        Self {
            outbound,
            tasks: Vec::new(),
        }
    }

    pub fn with_task(mut self, task: JoinHandle<()>) -> Self {
        self.tasks.push(task);
        self
    }

    pub fn send(&self, message: &SignalMessage) -> Result<()> {
        let text = message.encode()?;
        debug!("-> {}", message.kind());
        self.outbound
            .send(text)
            .map_err(|_| ClientError::ControlClosed)
    }

    pub fn close(self) {
        for task in &self.tasks {
            task.abort();
        }
        drop(self.outbound);
    }
}

#[async_trait]
pub trait ControlConnector: Send + Sync {
    /// Opens a signaling connection whose inbound frames go to `events`.
    async fn connect(&self, events: EventSink<ControlEvent>) -> Result<ControlLink>;
}
