pub mod channel_tests;
pub mod connection_tests;

use fretlink_client::{ClientConfig, ReconnectPolicy, SessionHandle, SignalingClient};
use fretlink_core::Role;
use std::sync::Arc;
use tracing::Level;

use crate::utils::{MockControl, MockTransportFactory, TEST_ROOM};

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(Level::DEBUG)
        .with_test_writer()
        .try_init();
}

pub fn test_config(reconnect: ReconnectPolicy) -> ClientConfig {
    ClientConfig {
        reconnect,
        ..ClientConfig::default().local_only()
    }
}

pub fn create_test_session(
    role: Role,
    reconnect: ReconnectPolicy,
) -> (SessionHandle, MockControl, MockTransportFactory) {
    let control = MockControl::new();
    let transports = MockTransportFactory::new();
    let client = SignalingClient::with_parts(
        test_config(reconnect),
        Arc::new(control.clone()),
        Arc::new(transports.clone()),
    );

    let handle = client.session(TEST_ROOM, role, "test-token");
    (handle, control, transports)
}
