use crate::utils::TestClient;
use fretlink_core::{Role, SignalMessage};
use fretlink_server::{AppState, ServerConfig, router};
use tokio::net::TcpListener;

/// Timeout for a single signaling step.
pub const SIGNAL_TIMEOUT_MS: u64 = 5000;

/// How long to wait before concluding nothing arrives.
pub const QUIET_MS: u64 = 200;

/// Serves the full router on an ephemeral local port.
pub async fn start_server(config: ServerConfig) -> (String, AppState) {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test listener");
    let addr = listener.local_addr().expect("No local address").to_string();

    let state = AppState::new(config);
    let app = router(state.clone()).expect("Failed to build router");
    tokio::spawn(async move { axum::serve(listener, app).await });

    (addr, state)
}

/// Opens a socket and completes JOIN/JOINED.
pub async fn join_as(addr: &str, room_id: &str, role: Role, token: &str) -> TestClient {
    let mut client = TestClient::connect(addr)
        .await
        .expect("Failed to connect");
    client
        .join(room_id, role, token)
        .await
        .expect("Failed to send JOIN");

    match client.recv(SIGNAL_TIMEOUT_MS).await {
        Some(SignalMessage::Joined { payload }) => {
            assert_eq!(payload.role, role);
            assert_eq!(payload.room_id, room_id);
        }
        other => panic!("expected JOINED, got {other:?}"),
    }
    client
}

/// Joins both roles and consumes the READY each of them gets.
pub async fn pair(addr: &str, room_id: &str) -> (TestClient, TestClient) {
    let mut performer = join_as(addr, room_id, Role::Performer, "").await;
    let mut controller = join_as(addr, room_id, Role::Controller, "").await;

    for client in [&mut performer, &mut controller] {
        match client.recv(SIGNAL_TIMEOUT_MS).await {
            Some(SignalMessage::Ready { payload }) => {
                assert_eq!(payload.map(|p| p.room_id).as_deref(), Some(room_id));
            }
            other => panic!("expected READY, got {other:?}"),
        }
    }
    (performer, controller)
}
