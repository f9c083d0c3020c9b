pub mod room_tests;

use fretlink_server::{JoinOutcome, Room, RoomCommand};
use fretlink_core::{Role, SignalMessage};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::Level;
use uuid::Uuid;

use crate::utils::MockSignalingOutput;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(Level::DEBUG)
        .with_test_writer()
        .try_init();
}

pub fn create_test_room(room_id: &str) -> (mpsc::Sender<RoomCommand>, JoinHandle<()>) {
    let (cmd_tx, cmd_rx) = mpsc::channel::<RoomCommand>(100);
    let room = Room::new(room_id, cmd_rx);
    let handle = tokio::spawn(async move {
        room.run().await;
    });
    (cmd_tx, handle)
}

/// A member attached to a test room through a mock output.
pub struct TestMember {
    pub role: Role,
    pub connection_id: Uuid,
    pub output: MockSignalingOutput,
    pub rx: mpsc::UnboundedReceiver<SignalMessage>,
}

pub async fn join_room(
    cmd_tx: &mpsc::Sender<RoomCommand>,
    role: Role,
) -> (TestMember, JoinOutcome) {
    let (output, rx) = MockSignalingOutput::new();
    let connection_id = Uuid::new_v4();
    let (reply, reply_rx) = oneshot::channel();

    cmd_tx
        .send(RoomCommand::Join {
            role,
            connection_id,
            output: Arc::new(output.clone()),
            reply,
        })
        .await
        .expect("Room is gone");
    let outcome = reply_rx.await.expect("Room dropped the reply");

    (
        TestMember {
            role,
            connection_id,
            output,
            rx,
        },
        outcome,
    )
}
