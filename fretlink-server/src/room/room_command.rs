use crate::signaling::SignalingOutput;
use fretlink_core::{Role, SignalMessage};
use std::sync::Arc;
use tokio::sync::oneshot;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinOutcome {
    Joined,
    /// Refused; the room has already told the connection why.
    RoleTaken,
}

/// Commands sent to a room by the signaling endpoint.
pub enum RoomCommand {
    /// A validated JOIN. The room answers on `output` and through `reply`.
    Join {
        role: Role,
        connection_id: Uuid,
        output: Arc<dyn SignalingOutput>,
        reply: oneshot::Sender<JoinOutcome>,
    },

    /// A frame from a member, forwarded to the other role when allowed.
    Relay {
        from: Role,
        connection_id: Uuid,
        message: SignalMessage,
    },

    /// The member's socket closed.
    Leave { role: Role, connection_id: Uuid },

    /// Roles currently present.
    Occupancy { reply: oneshot::Sender<Vec<Role>> },
}
