use fretlink_client::{ReconnectPolicy, SessionEvent};
use fretlink_core::{FretState, PeerMessage, Role};
use serde_json::json;
use std::time::Duration;

use crate::integration::{create_test_session, init_tracing};
use crate::utils::{SIGNAL_TIMEOUT_MS, open_performer};

#[tokio::test]
async fn test_fret_updates_reach_latest_slot() {
    init_tracing();

    let (handle, control, transports) =
        create_test_session(Role::Performer, ReconnectPolicy::disabled());
    let mut events = handle.subscribe();
    let mut frets = handle.frets();
    assert_eq!(handle.latest_frets(), None);

    open_performer(&handle, &control, &transports)
        .await
        .expect("Channel did not open");

    let c_major = FretState::new([0, 1, 0, 2, 3, 0]);
    transports.deliver(&PeerMessage::FretUpdate(c_major)).await;

    let seen = tokio::time::timeout(
        Duration::from_millis(SIGNAL_TIMEOUT_MS),
        frets.wait_for(|f| f.is_some()),
    )
    .await
    .expect("No fret update")
    .map(|f| *f)
    .expect("Session dropped");
    assert_eq!(seen, Some(c_major));

    // Out of range updates are dropped, the slot keeps the last good value
    transports
        .deliver(&PeerMessage::FretUpdate(FretState::new([0, 0, 0, 0, 0, 13])))
        .await;
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(handle.latest_frets(), Some(c_major));

    // Other message types reach subscribers untouched
    transports
        .deliver(&PeerMessage::Other {
            kind: "PAUSE".to_string(),
            payload: json!({ "at": 1200 }),
        })
        .await;
    let message = tokio::time::timeout(Duration::from_millis(SIGNAL_TIMEOUT_MS), async {
        loop {
            match events.recv().await {
                Ok(SessionEvent::Message(message)) => return message,
                Ok(_) => continue,
                Err(e) => panic!("event stream ended: {e}"),
            }
        }
    })
    .await
    .expect("No message event");
    assert_eq!(message.kind(), "PAUSE");

    handle.disconnect().await;
    assert_eq!(handle.latest_frets(), None);
}
