use fretlink_core::{IceCandidate, Role, SignalMessage};
use fretlink_server::RoomCommand;
use std::time::Duration;

use crate::integration::{create_test_room, init_tracing, join_room};

#[tokio::test]
async fn test_only_negotiation_is_relayed() {
    init_tracing();

    let (cmd_tx, _room) = create_test_room("ABCD");
    let (performer, _) = join_room(&cmd_tx, Role::Performer).await;
    let (controller, _) = join_room(&cmd_tx, Role::Controller).await;

    let candidate = IceCandidate {
        candidate: "candidate:1 1 udp 2130706431 10.0.0.1 5000 typ host".to_string(),
        sdp_mid: Some("0".to_string()),
        sdp_mline_index: Some(0),
        username_fragment: None,
    };

    let relay = |from: Role, connection_id, message| RoomCommand::Relay {
        from,
        connection_id,
        message,
    };

    cmd_tx
        .send(relay(Role::Performer, performer.connection_id, SignalMessage::offer("v=0 offer")))
        .await
        .unwrap();
    cmd_tx
        .send(relay(Role::Controller, controller.connection_id, SignalMessage::answer("v=0 answer")))
        .await
        .unwrap();
    cmd_tx
        .send(relay(Role::Controller, controller.connection_id, SignalMessage::ice(candidate.clone())))
        .await
        .unwrap();

    // Not negotiation: dropped
    cmd_tx
        .send(relay(Role::Performer, performer.connection_id, SignalMessage::error("spoofed")))
        .await
        .unwrap();
    // Not a member connection: dropped
    cmd_tx
        .send(relay(Role::Performer, uuid::Uuid::new_v4(), SignalMessage::offer("v=0 forged")))
        .await
        .unwrap();

    tokio::time::sleep(Duration::from_millis(50)).await;

    let to_controller = controller.output.get_signals().await;
    assert_eq!(
        to_controller[2..],
        [SignalMessage::offer("v=0 offer")],
        "controller saw {to_controller:?}"
    );

    let to_performer = performer.output.get_signals().await;
    assert_eq!(
        to_performer[2..],
        [SignalMessage::answer("v=0 answer"), SignalMessage::ice(candidate)]
    );
}
