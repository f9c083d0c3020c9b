use fretlink_core::{PeerDisconnectedPayload, Role, SignalMessage};
use fretlink_server::ServerConfig;
use std::time::Duration;

use crate::integration::init_tracing;
use crate::utils::{SIGNAL_TIMEOUT_MS, join_as, pair, start_server};

#[tokio::test]
async fn test_disconnect_destroys_room() {
    init_tracing();

    let (addr, state) = start_server(ServerConfig::default()).await;
    let token = state.tokens.issue("DUET");
    let (mut performer, controller) = pair(&addr, "DUET").await;
    assert_eq!(state.rooms.room_count(), 1);

    controller.close().await;
    assert_eq!(
        performer.recv(SIGNAL_TIMEOUT_MS).await,
        Some(SignalMessage::PeerDisconnected {
            payload: Some(PeerDisconnectedPayload {
                role: Role::Controller,
            }),
        })
    );

    // The controller can come back and both get READY again
    let mut controller = join_as(&addr, "DUET", Role::Controller, "").await;
    assert_eq!(
        performer.recv(SIGNAL_TIMEOUT_MS).await.map(|m| m.kind()),
        Some("READY")
    );
    assert_eq!(
        controller.recv(SIGNAL_TIMEOUT_MS).await.map(|m| m.kind()),
        Some("READY")
    );

    performer.close().await;
    controller.close().await;

    let start = std::time::Instant::now();
    while state.rooms.room_count() > 0 && start.elapsed() < Duration::from_secs(5) {
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert_eq!(state.rooms.room_count(), 0);

    // Tokens outlive the room until they expire
    assert!(state.tokens.validate("DUET", &token));
}
