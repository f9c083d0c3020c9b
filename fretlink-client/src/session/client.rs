use crate::channel::PeerChannel;
use crate::config::ClientConfig;
use crate::control::{ControlConnector, WsConnector};
use crate::error::{ClientError, Result, SendError};
use crate::session::driver::{SessionCommand, SessionDriver, SessionOutputs};
use crate::session::machine::SessionMachine;
use crate::session::state::{ConnectionState, SessionEvent};
use crate::transport::{RtcTransportFactory, TransportFactory};
use fretlink_core::{FretState, PeerMessage, Role};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc, watch};
use tokio::task::JoinHandle;
use tracing::debug;

/// Entry point for joining rooms. Holds the pieces every session shares.
#[derive(Clone)]
pub struct SignalingClient {
    config: ClientConfig,
    connector: Arc<dyn ControlConnector>,
    transports: Arc<dyn TransportFactory>,
}

impl SignalingClient {
    /// WebSocket signaling and WebRTC transport as configured.
    pub fn new(config: ClientConfig) -> Self {
        let connector = Arc::new(WsConnector::new(config.signaling_url.clone()));
        let transports = Arc::new(RtcTransportFactory::new(
            config.ice_servers.clone(),
            config.channel_mode,
        ));
        Self::with_parts(config, connector, transports)
    }

    pub fn with_parts(
        config: ClientConfig,
        connector: Arc<dyn ControlConnector>,
        transports: Arc<dyn TransportFactory>,
    ) -> Self {
        Self {
            config,
            connector,
            transports,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Creates an idle session for `role` in `room_id`. Nothing touches the
    /// network until [`SessionHandle::connect`].
    pub fn session(&self, room_id: &str, role: Role, token: &str) -> SessionHandle {
        let (command_tx, command_rx) = mpsc::channel(16);
        let (events, _) = broadcast::channel(self.config.event_capacity.max(1));
        let (state_tx, state_rx) = watch::channel(ConnectionState::Disconnected);
        let (frets_tx, frets_rx) = watch::channel(None);
        let (channel_tx, channel_rx) = watch::channel(None);
        let (reason_tx, reason_rx) = watch::channel(None);

        let outputs = SessionOutputs {
            events: events.clone(),
            state: state_tx,
            frets: Arc::new(frets_tx),
            channel: channel_tx,
            close_reason: reason_tx,
        };

        let driver = SessionDriver::new(
            SessionMachine::new(room_id, role, token),
            self.config.clone(),
            self.connector.clone(),
            self.transports.clone(),
            command_rx,
            outputs,
        );
        let task = tokio::spawn(driver.run());

        SessionHandle {
            room_id: room_id.to_string(),
            role,
            commands: command_tx,
            events,
            state: state_rx,
            frets: frets_rx,
            channel: channel_rx,
            close_reason: reason_rx,
            task,
        }
    }

    /// Starts a session and waits until its peer channel is open.
    pub async fn join(
        &self,
        room_id: &str,
        role: Role,
        token: &str,
        timeout: Duration,
    ) -> Result<SessionHandle> {
        let handle = self.session(room_id, role, token);
        handle.connect().await?;
        handle.connected(timeout).await?;
        Ok(handle)
    }
}

/// Owner's view of one running session.
///
/// Dropping the handle disconnects: the driver closes the peer transport and
/// the signaling link before it exits.
pub struct SessionHandle {
    room_id: String,
    role: Role,
    commands: mpsc::Sender<SessionCommand>,
    events: broadcast::Sender<SessionEvent>,
    state: watch::Receiver<ConnectionState>,
    frets: watch::Receiver<Option<FretState>>,
    channel: watch::Receiver<Option<PeerChannel>>,
    close_reason: watch::Receiver<Option<String>>,
    task: JoinHandle<()>,
}

impl SessionHandle {
    pub fn room_id(&self) -> &str {
        &self.room_id
    }

    pub fn role(&self) -> Role {
        self.role
    }

    /// Events from now on. Subscribe before `connect` to see every one.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    pub fn state(&self) -> ConnectionState {
        *self.state.borrow()
    }

    pub fn watch_state(&self) -> watch::Receiver<ConnectionState> {
        self.state.clone()
    }

    /// Latest fret state received from the peer, `None` while no channel is
    /// open. Intermediate values may be skipped.
    pub fn frets(&self) -> watch::Receiver<Option<FretState>> {
        self.frets.clone()
    }

    pub fn latest_frets(&self) -> Option<FretState> {
        *self.frets.borrow()
    }

    /// Why the server refused the session, once it has.
    pub fn close_reason(&self) -> Option<String> {
        self.close_reason.borrow().clone()
    }

    pub async fn connect(&self) -> Result<()> {
        self.command(SessionCommand::Connect).await
    }

    /// Manual retry after a lost peer or signaling link.
    pub async fn retry(&self) -> Result<()> {
        self.command(SessionCommand::Retry).await
    }

    /// Closes the session and waits for the driver to finish tearing down.
    pub async fn disconnect(&self) {
        if self.command(SessionCommand::Disconnect).await.is_err() {
            return;
        }
        let mut state = self.state.clone();
        let _ = state.wait_for(|s| s.is_terminal()).await;
    }

    /// Waits for `CHANNEL_OPEN`. Fails once the session closes or `timeout`
    /// elapses.
    pub async fn connected(&self, timeout: Duration) -> Result<()> {
        let mut state = self.state.clone();
        let reached = tokio::time::timeout(
            timeout,
            state.wait_for(|s| matches!(s, ConnectionState::ChannelOpen | ConnectionState::Closed)),
        )
        .await
        .map_err(|_| ClientError::Timeout("peer channel"))?
        .map(|s| *s);

        match reached {
            Ok(ConnectionState::ChannelOpen) => Ok(()),
            _ => Err(self.closed_error()),
        }
    }

    /// Fire-and-forget send to the peer.
    pub fn send(&self, message: &PeerMessage) -> std::result::Result<(), SendError> {
        if self.state().is_terminal() {
            return Err(SendError::Closed);
        }
        match self.channel.borrow().as_ref() {
            Some(channel) => channel.send(message),
            None => Err(SendError::NotOpen),
        }
    }

    pub fn send_frets(&self, frets: FretState) -> std::result::Result<(), SendError> {
        self.send(&PeerMessage::FretUpdate(frets))
    }

    async fn command(&self, command: SessionCommand) -> Result<()> {
        self.commands
            .send(command)
            .await
            .map_err(|_| self.closed_error())
    }

    fn closed_error(&self) -> ClientError {
        match self.close_reason() {
            Some(reason) => ClientError::Rejected(reason),
            None => ClientError::SessionClosed,
        }
    }
}

impl Drop for SessionHandle {
    fn drop(&mut self) {
        if self.task.is_finished() {
            return;
        }
        if self.commands.try_send(SessionCommand::Disconnect).is_err() {
            debug!("Session command queue full, aborting driver");
            self.task.abort();
        }
    }
}
