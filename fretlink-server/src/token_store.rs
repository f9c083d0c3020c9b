use dashmap::DashMap;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;
use uuid::Uuid;

/// Short-lived room access tokens, kept in memory.
#[derive(Clone)]
pub struct TokenStore {
    tokens: Arc<DashMap<String, HashMap<String, Instant>>>,
    ttl: Duration,
}

impl TokenStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            tokens: Arc::new(DashMap::new()),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Issues a fresh opaque token (64 hex chars) for `room_id`.
    pub fn issue(&self, room_id: &str) -> String {
        let token = format!(
            "{}{}",
            Uuid::new_v4().simple(),
            Uuid::new_v4().simple()
        );
        self.prune();
        self.tokens
            .entry(room_id.to_string())
            .or_default()
            .insert(token.clone(), Instant::now());
        token
    }

    pub fn validate(&self, room_id: &str, token: &str) -> bool {
        self.tokens
            .get(room_id)
            .and_then(|tokens| tokens.get(token).copied())
            .is_some_and(|issued| issued.elapsed() < self.ttl)
    }

    /// Drops expired tokens, and rooms left without any. Tokens outlive the
    /// room actor so a member that lost its socket can rejoin.
    pub fn prune(&self) {
        let ttl = self.ttl;
        self.tokens.retain(|room_id, tokens| {
            tokens.retain(|_, issued| issued.elapsed() < ttl);
            if tokens.is_empty() {
                debug!("Dropped expired tokens of room {}", room_id);
            }
            !tokens.is_empty()
        });
    }

    pub fn room_count(&self) -> usize {
        self.tokens.len()
    }
}
