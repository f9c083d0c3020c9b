use crate::room::{JoinOutcome, Room, RoomCommand};
use crate::signaling::SignalingOutput;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use fretlink_core::Role;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tracing::{info, warn};
use uuid::Uuid;

/// A connection's place in a room after a successful JOIN.
pub struct Membership {
    pub room_tx: mpsc::Sender<RoomCommand>,
    pub outcome: JoinOutcome,
}

/// Spawns one room actor per room id on first JOIN and forgets it when the
/// actor stops.
#[derive(Clone, Default)]
pub struct RoomManager {
    rooms: Arc<DashMap<String, mpsc::Sender<RoomCommand>>>,
}

impl RoomManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    pub fn get_room_sender(&self, room_id: &str) -> mpsc::Sender<RoomCommand> {
        match self.rooms.entry(room_id.to_string()) {
            Entry::Occupied(entry) => entry.get().clone(),
            Entry::Vacant(entry) => {
                info!("Creating new room: {}", room_id);
                let (tx, rx) = mpsc::channel(100);
                let room = Room::new(room_id, rx);

                let rooms = self.rooms.clone();
                let id = room_id.to_string();
                let own = tx.downgrade();
                tokio::spawn(async move {
                    room.run().await;
                    rooms.remove_if(&id, |_, sender| {
                        own.upgrade().is_some_and(|own| own.same_channel(sender))
                    });
                    info!("Room {} destroyed", id);
                });

                entry.insert(tx.clone());
                tx
            }
        }
    }

    /// Hands a validated JOIN to the room, starting it if needed. A room that
    /// shut down in the meantime is replaced once.
    pub async fn join(
        &self,
        room_id: &str,
        role: Role,
        connection_id: Uuid,
        output: Arc<dyn SignalingOutput>,
    ) -> Option<Membership> {
        for _ in 0..2 {
            let room_tx = self.get_room_sender(room_id);
            let (reply, reply_rx) = oneshot::channel();
            let cmd = RoomCommand::Join {
                role,
                connection_id,
                output: output.clone(),
                reply,
            };

            if room_tx.send(cmd).await.is_ok() {
                if let Ok(outcome) = reply_rx.await {
                    return Some(Membership { room_tx, outcome });
                }
            }
            self.forget(room_id, &room_tx);
        }

        warn!("Room {} unavailable", room_id);
        None
    }

    /// Roles present in `room_id`; empty when the room does not exist.
    pub async fn occupancy(&self, room_id: &str) -> Vec<Role> {
        let Some(room_tx) = self.rooms.get(room_id).map(|tx| tx.clone()) else {
            return Vec::new();
        };
        let (reply, reply_rx) = oneshot::channel();
        if room_tx.send(RoomCommand::Occupancy { reply }).await.is_err() {
            return Vec::new();
        }
        reply_rx.await.unwrap_or_default()
    }

    fn forget(&self, room_id: &str, stale: &mpsc::Sender<RoomCommand>) {
        self.rooms
            .remove_if(room_id, |_, sender| sender.same_channel(stale));
    }
}
