use fretlink_client::{ConnectionState, ReconnectPolicy, SessionEvent};
use fretlink_core::{Role, SignalMessage};
use std::time::Duration;

use crate::integration::{create_test_session, init_tracing};
use crate::utils::{
    CONNECTION_TIMEOUT_MS, MOCK_ANSWER, SIGNAL_TIMEOUT_MS, TEST_ROOM, TransportCall,
    collect_states, joined, ready,
};

#[tokio::test]
async fn test_controller_reaches_channel_open() {
    init_tracing();

    let (handle, control, transports) =
        create_test_session(Role::Controller, ReconnectPolicy::disabled());
    let mut events = handle.subscribe();

    handle.connect().await.expect("Failed to connect");

    // JOIN carries the room, role and token
    let join = control
        .wait_for_sent("JOIN", 1, SIGNAL_TIMEOUT_MS)
        .await
        .expect("JOIN not sent");
    assert_eq!(
        join,
        SignalMessage::Join {
            room_id: TEST_ROOM.to_string(),
            role: Role::Controller,
            token: "test-token".to_string(),
        }
    );

    control.push(joined(Role::Controller)).await;
    control.push(ready()).await;
    control.push(SignalMessage::offer("v=0 remote-offer")).await;

    let answer = control
        .wait_for_sent("ANSWER", 1, SIGNAL_TIMEOUT_MS)
        .await
        .expect("ANSWER not sent");
    assert_eq!(answer, SignalMessage::answer(MOCK_ANSWER));

    transports.open_channel().await;
    handle
        .connected(Duration::from_millis(CONNECTION_TIMEOUT_MS))
        .await
        .expect("Channel did not open");

    let states = collect_states(&mut events, ConnectionState::ChannelOpen, SIGNAL_TIMEOUT_MS).await;
    assert_eq!(
        states,
        vec![
            ConnectionState::SignalingConnected,
            ConnectionState::Joined,
            ConnectionState::Negotiating,
            ConnectionState::ChannelOpen,
        ]
    );

    let calls = transports.calls().await;
    assert_eq!(calls[0], TransportCall::Create(Role::Controller));
    assert_eq!(calls[1], TransportCall::AcceptOffer("v=0 remote-offer".to_string()));

    // Disconnect tears the transport down and closes the session
    handle.disconnect().await;
    assert_eq!(handle.state(), ConnectionState::Closed);
    assert!(transports.calls().await.contains(&TransportCall::Close));
    assert!(transports.sink.is_closed());

    let mut last = None;
    while let Ok(event) = events.try_recv() {
        if let SessionEvent::StateChanged(state) = event {
            last = Some(state);
        }
    }
    assert_eq!(last, Some(ConnectionState::Closed));
}
