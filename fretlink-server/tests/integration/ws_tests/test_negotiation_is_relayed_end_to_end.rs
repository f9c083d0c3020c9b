use fretlink_core::{IceCandidate, Role, SignalMessage};
use fretlink_server::ServerConfig;

use crate::integration::init_tracing;
use crate::utils::{QUIET_MS, SIGNAL_TIMEOUT_MS, TestClient, join_as, pair, start_server};

#[tokio::test]
async fn test_negotiation_is_relayed_end_to_end() {
    init_tracing();

    let (addr, _state) = start_server(ServerConfig::default()).await;
    let (mut performer, mut controller) = pair(&addr, "JAMROOM").await;

    performer
        .send(&SignalMessage::offer("v=0 offer"))
        .await
        .unwrap();
    assert_eq!(
        controller.recv(SIGNAL_TIMEOUT_MS).await,
        Some(SignalMessage::offer("v=0 offer"))
    );

    controller
        .send(&SignalMessage::answer("v=0 answer"))
        .await
        .unwrap();
    assert_eq!(
        performer.recv(SIGNAL_TIMEOUT_MS).await,
        Some(SignalMessage::answer("v=0 answer"))
    );

    let candidate = IceCandidate {
        candidate: "candidate:1 1 udp 2130706431 10.0.0.1 5000 typ host".to_string(),
        sdp_mid: Some("0".to_string()),
        sdp_mline_index: Some(0),
        username_fragment: None,
    };
    controller
        .send(&SignalMessage::ice(candidate.clone()))
        .await
        .unwrap();
    assert_eq!(
        performer.recv(SIGNAL_TIMEOUT_MS).await,
        Some(SignalMessage::ice(candidate))
    );

    // Application payloads never ride the control channel
    controller
        .send_raw(r#"{"type":"FRET_UPDATE","payload":[0,1,0,2,3,0]}"#)
        .await
        .unwrap();
    assert_eq!(performer.recv(QUIET_MS).await, None);

    // A third device cannot take an occupied role
    let mut intruder = TestClient::connect(&addr).await.unwrap();
    intruder.join("JAMROOM", Role::Performer, "").await.unwrap();
    assert_eq!(
        intruder.recv(SIGNAL_TIMEOUT_MS).await,
        Some(SignalMessage::error("Role already taken in this room"))
    );
    assert!(intruder.closed(SIGNAL_TIMEOUT_MS).await);

    // Other rooms are independent
    let _other = join_as(&addr, "SOLO", Role::Controller, "").await;
    assert_eq!(performer.recv(QUIET_MS).await, None);
}
