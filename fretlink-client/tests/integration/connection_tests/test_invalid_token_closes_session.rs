use fretlink_client::{ClientError, ConnectionState, ReconnectPolicy};
use fretlink_core::{Role, SignalMessage};
use std::time::Duration;

use crate::integration::{create_test_session, init_tracing};
use crate::utils::{SIGNAL_TIMEOUT_MS, collect_states};

#[tokio::test]
async fn test_invalid_token_closes_session() {
    init_tracing();

    // Auto-retry on: a refusal must still never be retried
    let (handle, control, transports) =
        create_test_session(Role::Performer, ReconnectPolicy::default());
    let mut events = handle.subscribe();

    handle.connect().await.expect("Failed to connect");
    control
        .wait_for_sent("JOIN", 1, SIGNAL_TIMEOUT_MS)
        .await
        .expect("JOIN not sent");

    control
        .push(SignalMessage::error("Unauthorized: Invalid token"))
        .await;

    let result = handle.connected(Duration::from_millis(SIGNAL_TIMEOUT_MS)).await;
    match result {
        Err(ClientError::Rejected(message)) => {
            assert_eq!(message, "Unauthorized: Invalid token")
        }
        other => panic!("expected a rejection, got {other:?}"),
    }

    let states = collect_states(&mut events, ConnectionState::Closed, SIGNAL_TIMEOUT_MS).await;
    assert_eq!(
        states,
        vec![ConnectionState::SignalingConnected, ConnectionState::Closed]
    );
    assert!(!states.contains(&ConnectionState::Negotiating));

    // No transport, no reconnect
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(transports.calls().await.is_empty());
    assert_eq!(control.connect_count(), 1);

    let fatal = handle.close_reason();
    assert_eq!(fatal.as_deref(), Some("Unauthorized: Invalid token"));
    assert!(matches!(
        handle.retry().await,
        Err(ClientError::Rejected(_))
    ));
}
