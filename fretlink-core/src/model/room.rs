use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Short alphanumeric code that pairs a performer with a controller.
#[derive(Debug, Clone, Hash, Eq, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomId(String);

impl RoomId {
    pub const MIN_LEN: usize = 4;
    pub const MAX_LEN: usize = 8;

    pub fn generate() -> Self {
        let raw = Uuid::new_v4().simple().to_string().to_ascii_uppercase();
        Self(raw[..Self::MAX_LEN].to_owned())
    }

    /// Uppercases, strips everything but ASCII alphanumerics and truncates to
    /// [`RoomId::MAX_LEN`]. The result may be empty.
    pub fn sanitize(raw: &str) -> String {
        raw.chars()
            .filter(char::is_ascii_alphanumeric)
            .map(|c| c.to_ascii_uppercase())
            .take(Self::MAX_LEN)
            .collect()
    }

    pub fn parse(raw: &str) -> Result<Self, CoreError> {
        let sanitized = Self::sanitize(raw);
        if sanitized.len() < Self::MIN_LEN {
            return Err(CoreError::InvalidRoomId(raw.to_owned()));
        }
        Ok(Self(sanitized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for RoomId {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Response body of `POST /api/rooms`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomTicket {
    pub room_id: String,
    pub access_token: String,
    pub expires_in: u64,
}
