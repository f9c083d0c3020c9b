use fretlink_core::IceServerConfig;
use fretlink_core::utils::{DEFAULT_MAX_FRET, DEFAULT_STUN_ADDR, DEFAULT_STUN_ADDR_2};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// WebSocket endpoint of the rendezvous server (`ws://host:port/ws`).
    pub signaling_url: String,
    /// HTTP base of the room API (`http://host:port`).
    pub api_url: String,
    pub ice_servers: Vec<IceServerConfig>,
    pub channel_mode: ChannelMode,
    pub reconnect: ReconnectPolicy,
    /// Capacity of the session event fan-out.
    pub event_capacity: usize,
    /// Fret updates above this are dropped as malformed.
    pub max_fret: u8,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            signaling_url: "ws://localhost:8000/ws".to_string(),
            api_url: "http://localhost:8000".to_string(),
            ice_servers: vec![IceServerConfig {
                urls: vec![DEFAULT_STUN_ADDR.to_string(), DEFAULT_STUN_ADDR_2.to_string()],
                username: None,
                credential: None,
            }],
            channel_mode: ChannelMode::default(),
            reconnect: ReconnectPolicy::default(),
            event_capacity: 64,
            max_fret: DEFAULT_MAX_FRET,
        }
    }
}

impl ClientConfig {
    /// Points both endpoints at one server, e.g. `localhost:8000`.
    pub fn for_server(host: &str) -> Self {
        Self {
            signaling_url: format!("ws://{host}/ws"),
            api_url: format!("http://{host}"),
            ..Self::default()
        }
    }

    /// No STUN servers: host candidates only, for same-machine sessions.
    pub fn local_only(mut self) -> Self {
        self.ice_servers.clear();
        self
    }
}

/// Delivery mode of the data channel the performer opens.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelMode {
    /// Ordered, never retransmitted. Late fret states are worthless.
    #[default]
    LatestValue,
    /// Ordered with unlimited retransmits.
    Reliable,
}

impl ChannelMode {
    pub fn max_retransmits(&self) -> Option<u16> {
        match self {
            ChannelMode::LatestValue => Some(0),
            ChannelMode::Reliable => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconnectPolicy {
    /// Retry automatically after a transient failure.
    pub auto: bool,
    pub max_attempts: u32,
    pub initial_backoff_ms: u64,
    pub max_backoff_ms: u64,
    pub multiplier: f64,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            auto: true,
            max_attempts: 5,
            initial_backoff_ms: 500,
            max_backoff_ms: 10_000,
            multiplier: 2.0,
        }
    }
}

impl ReconnectPolicy {
    pub fn disabled() -> Self {
        Self {
            auto: false,
            ..Self::default()
        }
    }

    /// Delay before attempt number `attempt` (0-indexed).
    pub fn backoff(&self, attempt: u32) -> Duration {
        let exponent = i32::try_from(attempt).unwrap_or(i32::MAX);
        let ms = (self.initial_backoff_ms as f64) * self.multiplier.powi(exponent);
        Duration::from_millis(ms.min(self.max_backoff_ms as f64) as u64)
    }

    pub fn should_retry(&self, attempt: u32) -> bool {
        self.auto && attempt < self.max_attempts
    }
}
