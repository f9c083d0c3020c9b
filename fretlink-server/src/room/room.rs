use crate::room::room_command::{JoinOutcome, RoomCommand};
use crate::signaling::SignalingOutput;
use fretlink_core::{JoinedPayload, PeerDisconnectedPayload, ReadyPayload, Role, SignalMessage};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use uuid::Uuid;

pub const ROLE_TAKEN: &str = "Role already taken in this room";

struct Member {
    connection_id: Uuid,
    output: Arc<dyn SignalingOutput>,
}

/// One pairing: at most one performer and one controller. The room relays
/// negotiation frames between them and never looks at application data.
pub struct Room {
    room_id: String,
    members: HashMap<Role, Member>,
    command_rx: mpsc::Receiver<RoomCommand>,
}

impl Room {
    pub fn new(room_id: impl Into<String>, command_rx: mpsc::Receiver<RoomCommand>) -> Self {
        Self {
            room_id: room_id.into(),
            members: HashMap::new(),
            command_rx,
        }
    }

    /// Runs until the last member leaves or every sender is gone.
    pub async fn run(mut self) {
        info!("Room {} event loop started", self.room_id);

        while let Some(cmd) = self.command_rx.recv().await {
            if !self.handle_command(cmd).await {
                info!("Room {} is empty, shutting down", self.room_id);
                break;
            }
        }

        info!("Room {} event loop finished", self.room_id);
    }

    /// Returns `false` once the room should stop.
    async fn handle_command(&mut self, cmd: RoomCommand) -> bool {
        match cmd {
            RoomCommand::Join {
                role,
                connection_id,
                output,
                reply,
            } => {
                let outcome = self.join(role, connection_id, output).await;
                let _ = reply.send(outcome);
            }

            RoomCommand::Relay {
                from,
                connection_id,
                message,
            } => self.relay(from, connection_id, message).await,

            RoomCommand::Leave {
                role,
                connection_id,
            } => {
                self.leave(role, connection_id).await;
                return !self.members.is_empty();
            }

            RoomCommand::Occupancy { reply } => {
                let _ = reply.send(self.members.keys().copied().collect());
            }
        }
        true
    }

    async fn join(
        &mut self,
        role: Role,
        connection_id: Uuid,
        output: Arc<dyn SignalingOutput>,
    ) -> JoinOutcome {
        if self.members.contains_key(&role) {
            warn!("[{}] {} already present, refusing", self.room_id, role);
            output.send(SignalMessage::error(ROLE_TAKEN)).await;
            return JoinOutcome::RoleTaken;
        }

        info!("[{}] {} connected", self.room_id, role);
        output
            .send(SignalMessage::Joined {
                payload: JoinedPayload {
                    room_id: self.room_id.clone(),
                    role,
                },
            })
            .await;
        self.members.insert(
            role,
            Member {
                connection_id,
                output,
            },
        );

        if self.members.len() == 2 {
            info!("[{}] Both roles present", self.room_id);
            for member in self.members.values() {
                member
                    .output
                    .send(SignalMessage::Ready {
                        payload: Some(ReadyPayload {
                            room_id: self.room_id.clone(),
                        }),
                    })
                    .await;
            }
        }

        JoinOutcome::Joined
    }

    async fn relay(&self, from: Role, connection_id: Uuid, message: SignalMessage) {
        if !self.is_member(from, connection_id) {
            warn!("[{}] Frame from a connection that is not a member", self.room_id);
            return;
        }
        if !message.is_relayed() {
            warn!("[{}] {} sent {}, not relayed", self.room_id, from, message.kind());
            return;
        }

        match self.members.get(&from.counterpart()) {
            Some(peer) => {
                debug!("[{}] {} -> {}: {}", self.room_id, from, from.counterpart(), message.kind());
                peer.output.send(message).await;
            }
            None => debug!("[{}] No peer for {}, dropping", self.room_id, message.kind()),
        }
    }

    async fn leave(&mut self, role: Role, connection_id: Uuid) {
        if !self.is_member(role, connection_id) {
            return;
        }
        self.members.remove(&role);
        info!("[{}] {} disconnected", self.room_id, role);

        for member in self.members.values() {
            member
                .output
                .send(SignalMessage::PeerDisconnected {
                    payload: Some(PeerDisconnectedPayload { role }),
                })
                .await;
        }
    }

    fn is_member(&self, role: Role, connection_id: Uuid) -> bool {
        self.members
            .get(&role)
            .is_some_and(|m| m.connection_id == connection_id)
    }
}
