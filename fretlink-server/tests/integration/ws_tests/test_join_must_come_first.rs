use fretlink_core::SignalMessage;
use fretlink_server::{INVALID_ROOM_OR_ROLE, ServerConfig};

use crate::integration::init_tracing;
use crate::utils::{SIGNAL_TIMEOUT_MS, TestClient, start_server};

#[tokio::test]
async fn test_join_must_come_first() {
    init_tracing();

    let (addr, state) = start_server(ServerConfig::default()).await;

    // Anything but JOIN first: closed without a reply
    let mut client = TestClient::connect(&addr).await.unwrap();
    client.send(&SignalMessage::offer("v=0")).await.unwrap();
    assert!(client.closed(SIGNAL_TIMEOUT_MS).await);

    // Unknown role
    let mut client = TestClient::connect(&addr).await.unwrap();
    client
        .send_raw(r#"{"type":"JOIN","roomId":"ABCD","role":"DRUMMER","token":""}"#)
        .await
        .unwrap();
    assert_eq!(
        client.recv(SIGNAL_TIMEOUT_MS).await,
        Some(SignalMessage::error(INVALID_ROOM_OR_ROLE))
    );

    // Room id that sanitizes to nothing
    let mut client = TestClient::connect(&addr).await.unwrap();
    client
        .send_raw(r#"{"type":"JOIN","roomId":"--","role":"PERFORMER","token":""}"#)
        .await
        .unwrap();
    assert_eq!(
        client.recv(SIGNAL_TIMEOUT_MS).await,
        Some(SignalMessage::error(INVALID_ROOM_OR_ROLE))
    );

    assert_eq!(state.rooms.room_count(), 0);
}
