use fretlink_client::{ConnectionState, ReconnectPolicy, TransportEvent};
use fretlink_core::{Role, SignalMessage};

use crate::integration::{create_test_session, init_tracing};
use crate::utils::{
    MOCK_OFFER, SIGNAL_TIMEOUT_MS, TransportCall, candidate, join_room, ready, wait_for_state,
};

#[tokio::test]
async fn test_performer_buffers_early_candidates() {
    init_tracing();

    let (handle, control, transports) =
        create_test_session(Role::Performer, ReconnectPolicy::disabled());

    join_room(&handle, &control).await.expect("Join failed");
    control.push(ready()).await;

    let offer = control
        .wait_for_sent("OFFER", 1, SIGNAL_TIMEOUT_MS)
        .await
        .expect("OFFER not sent");
    assert_eq!(offer, SignalMessage::offer(MOCK_OFFER));
    assert_eq!(handle.state(), ConnectionState::Negotiating);

    // Candidates racing ahead of the answer are held back
    control.push(SignalMessage::ice(candidate(1))).await;
    control.push(SignalMessage::ice(candidate(2))).await;
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    assert_eq!(
        transports
            .count(|c| matches!(c, TransportCall::AddIceCandidate(_)))
            .await,
        0
    );

    control.push(SignalMessage::answer("v=0 remote-answer")).await;
    assert!(
        transports
            .wait_for_calls(
                |c| matches!(c, TransportCall::AddIceCandidate(_)),
                2,
                SIGNAL_TIMEOUT_MS
            )
            .await
    );

    let calls = transports.calls().await;
    let tail: Vec<_> = calls.iter().rev().take(3).rev().cloned().collect();
    assert_eq!(
        tail,
        vec![
            TransportCall::ApplyAnswer("v=0 remote-answer".to_string()),
            TransportCall::AddIceCandidate(candidate(1)),
            TransportCall::AddIceCandidate(candidate(2)),
        ]
    );

    // Local candidates are trickled to the server
    transports
        .emit(TransportEvent::LocalCandidate(candidate(9)))
        .await;
    let ice = control
        .wait_for_sent("ICE_CANDIDATE", 1, SIGNAL_TIMEOUT_MS)
        .await
        .expect("ICE_CANDIDATE not sent");
    assert_eq!(ice, SignalMessage::ice(candidate(9)));

    // SDP done but the channel is not open yet
    assert_eq!(handle.state(), ConnectionState::Negotiating);
    transports.open_channel().await;
    assert!(wait_for_state(&handle, ConnectionState::ChannelOpen, SIGNAL_TIMEOUT_MS).await);
}
