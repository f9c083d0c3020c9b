use fretlink_core::{Role, SignalMessage};
use fretlink_server::{ServerConfig, UNAUTHORIZED};

use crate::integration::init_tracing;
use crate::utils::{SIGNAL_TIMEOUT_MS, TestClient, join_as, start_server};

#[tokio::test]
async fn test_invalid_token_is_rejected() {
    init_tracing();

    let config = ServerConfig::default().with_environment("production");
    let (addr, state) = start_server(config).await;

    let mut client = TestClient::connect(&addr).await.unwrap();
    client.join("ABCD", Role::Performer, "forged").await.unwrap();
    assert_eq!(
        client.recv(SIGNAL_TIMEOUT_MS).await,
        Some(SignalMessage::error(UNAUTHORIZED))
    );
    assert!(client.closed(SIGNAL_TIMEOUT_MS).await);

    // A token issued for another room does not open this one
    let token = state.tokens.issue("WXYZ");
    let mut client = TestClient::connect(&addr).await.unwrap();
    client.join("ABCD", Role::Performer, &token).await.unwrap();
    assert_eq!(
        client.recv(SIGNAL_TIMEOUT_MS).await,
        Some(SignalMessage::error(UNAUTHORIZED))
    );

    let token = state.tokens.issue("ABCD");
    let _performer = join_as(&addr, "ABCD", Role::Performer, &token).await;
}
