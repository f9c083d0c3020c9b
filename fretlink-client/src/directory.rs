use crate::error::{ClientError, Result};
use fretlink_core::RoomTicket;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

#[derive(Debug, Serialize)]
struct CreateRoomRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    preferred_room_id: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

/// HTTP client for the room API: hands out room ids and access tokens.
#[derive(Debug, Clone)]
pub struct RoomDirectory {
    base_url: String,
    client: reqwest::Client,
}

impl RoomDirectory {
    pub fn new(base_url: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Requests a token for `preferred`, or for a fresh room when `None`.
    pub async fn create_room(&self, preferred: Option<&str>) -> Result<RoomTicket> {
        let url = format!("{}/api/rooms", self.base_url);
        debug!("POST {} (preferred room {:?})", url, preferred);

        let resp = self
            .client
            .post(&url)
            .json(&CreateRoomRequest {
                preferred_room_id: preferred,
            })
            .send()
            .await?;

        let status = resp.status();
        if status.is_success() {
            let ticket: RoomTicket = resp.json().await?;
            info!("Got access token for room {}", ticket.room_id);
            return Ok(ticket);
        }

        let text = resp.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&text)
            .map(|body| body.error)
            .unwrap_or(text);

        Err(map_status(status, preferred, message))
    }
}

fn map_status(status: StatusCode, preferred: Option<&str>, message: String) -> ClientError {
    if status == StatusCode::CONFLICT {
        ClientError::RoomConflict(preferred.unwrap_or_default().to_string())
    } else {
        ClientError::RoomRejected {
            status: status.as_u16(),
            message,
        }
    }
}
