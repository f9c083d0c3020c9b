use crate::control::{ControlConnector, ControlEvent, ControlLink};
use crate::error::{ClientError, Result};
use crate::transport::EventSink;
use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, error, info};

/// Signaling over a WebSocket carrying JSON text frames.
#[derive(Debug, Clone)]
pub struct WsConnector {
    url: String,
}

impl WsConnector {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl ControlConnector for WsConnector {
    async fn connect(&self, events: EventSink<ControlEvent>) -> Result<ControlLink> {
        info!("Connecting to signaling server: {}", self.url);

        let (ws_stream, _) = connect_async(self.url.as_str())
            .await
            .map_err(|e| ClientError::Signaling(format!("Failed to connect: {}", e)))?;

        info!("Connected to signaling server");

        let (mut write, mut read) = ws_stream.split();
        let (tx, mut rx) = mpsc::unbounded_channel::<String>();

        tokio::spawn(async move {
            while let Some(text) = rx.recv().await {
                if let Err(e) = write.send(Message::Text(text)).await {
                    error!("Failed to send WebSocket message: {}", e);
                    break;
                }
            }
            let _ = write.close().await;
            debug!("Signaling sender finished");
        });

        let receiver = tokio::spawn(async move {
            while let Some(frame) = read.next().await {
                match frame {
                    Ok(Message::Text(text)) => events.emit(ControlEvent::Text(text)).await,
                    Ok(Message::Close(_)) => {
                        info!("Signaling connection closed by server");
                        break;
                    }
                    Err(e) => {
                        error!("WebSocket error: {}", e);
                        break;
                    }
                    _ => {}
                }
            }
            events.emit(ControlEvent::Closed).await;
            debug!("Signaling receiver finished");
        });

        Ok(ControlLink::new(tx).with_task(receiver))
    }
}
