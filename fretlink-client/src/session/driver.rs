use crate::channel::{DataSink, MessageHandler, PeerChannel};
use crate::config::ClientConfig;
use crate::control::{ControlConnector, ControlEvent, ControlLink};
use crate::session::machine::{SessionEffect, SessionInput, SessionMachine};
use crate::session::state::{ConnectionState, SessionEvent};
use crate::transport::{EventSink, PeerTransport, TransportEvent, TransportFactory};
use fretlink_core::{FretState, PeerMessage, SignalMessage};
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc, watch};
use tokio::time::Instant;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SessionCommand {
    Connect,
    Retry,
    Disconnect,
}

/// Publishing side of everything a `SessionHandle` observes.
pub(crate) struct SessionOutputs {
    pub events: broadcast::Sender<SessionEvent>,
    pub state: watch::Sender<ConnectionState>,
    pub frets: Arc<watch::Sender<Option<FretState>>>,
    pub channel: watch::Sender<Option<PeerChannel>>,
    pub close_reason: watch::Sender<Option<String>>,
}

/// Signaling/network context of one session: runs the state machine and
/// carries out its effects. Every transition happens on this task.
pub(crate) struct SessionDriver {
    machine: SessionMachine,
    config: ClientConfig,
    connector: Arc<dyn ControlConnector>,
    transports: Arc<dyn TransportFactory>,
    commands: mpsc::Receiver<SessionCommand>,

    control: Option<ControlLink>,
    control_generation: u64,
    control_tx: mpsc::Sender<(u64, ControlEvent)>,
    control_rx: mpsc::Receiver<(u64, ControlEvent)>,

    transport: Option<Box<dyn PeerTransport>>,
    transport_generation: u64,
    transport_tx: mpsc::Sender<(u64, TransportEvent)>,
    transport_rx: mpsc::Receiver<(u64, TransportEvent)>,
    opened_sink: Option<Arc<dyn DataSink>>,
    channel: Option<PeerChannel>,

    outputs: SessionOutputs,
    started: bool,
    retry_attempt: u32,
    retry_at: Option<Instant>,
}

impl SessionDriver {
    pub(crate) fn new(
        machine: SessionMachine,
        config: ClientConfig,
        connector: Arc<dyn ControlConnector>,
        transports: Arc<dyn TransportFactory>,
        commands: mpsc::Receiver<SessionCommand>,
        outputs: SessionOutputs,
    ) -> Self {
        let (control_tx, control_rx) = mpsc::channel(256);
        let (transport_tx, transport_rx) = mpsc::channel(256);

        Self {
            machine,
            config,
            connector,
            transports,
            commands,
            control: None,
            control_generation: 0,
            control_tx,
            control_rx,
            transport: None,
            transport_generation: 0,
            transport_tx,
            transport_rx,
            opened_sink: None,
            channel: None,
            outputs,
            started: false,
            retry_attempt: 0,
            retry_at: None,
        }
    }

    pub(crate) async fn run(mut self) {
        info!("Session driver started for room {}", self.machine.room_id());

        while !self.machine.state().is_terminal() {
            let retry_at = self.retry_at;

            tokio::select! {
                cmd = self.commands.recv() => {
                    match cmd {
                        Some(SessionCommand::Connect) => {
                            self.started = true;
                            self.apply(SessionInput::Connect).await;
                        }
                        Some(SessionCommand::Retry) => {
                            self.retry_at = None;
                            self.apply(SessionInput::Retry).await;
                        }
                        Some(SessionCommand::Disconnect) | None => {
                            self.apply(SessionInput::Disconnect).await;
                        }
                    }
                }

                Some((generation, event)) = self.control_rx.recv() => {
                    if generation == self.control_generation {
                        self.handle_control_event(event).await;
                    } else {
                        debug!("Dropping event from replaced signaling link");
                    }
                }

                Some((generation, event)) = self.transport_rx.recv() => {
                    if generation == self.transport_generation {
                        self.handle_transport_event(event).await;
                    } else {
                        debug!("Dropping {:?} from replaced transport", event);
                    }
                }

                _ = sleep_until(retry_at) => {
                    self.retry_at = None;
                    self.retry_attempt += 1;
                    info!("Automatic retry #{}", self.retry_attempt);
                    self.apply(SessionInput::Retry).await;
                }
            }
        }

        info!("Session driver finished for room {}", self.machine.room_id());
    }

    async fn handle_control_event(&mut self, event: ControlEvent) {
        match event {
            ControlEvent::Text(text) => match SignalMessage::decode(&text) {
                Ok(message) => self.apply(SessionInput::Signal(message)).await,
                Err(e) => warn!("Ignoring malformed signaling message: {} ({})", e, text),
            },
            ControlEvent::Closed => {
                self.close_control();
                self.apply(SessionInput::ControlLost).await;
            }
        }
    }

    async fn handle_transport_event(&mut self, event: TransportEvent) {
        match event {
            TransportEvent::LocalCandidate(candidate) => {
                self.apply(SessionInput::LocalCandidate(candidate)).await
            }
            TransportEvent::Connected => self.apply(SessionInput::TransportConnected).await,
            TransportEvent::Disconnected => self.apply(SessionInput::TransportDisconnected).await,
            TransportEvent::Failed => self.apply(SessionInput::TransportFailed).await,
            TransportEvent::ChannelOpen(sink) => {
                self.opened_sink = Some(sink);
                self.apply(SessionInput::ChannelReady).await;
            }
            TransportEvent::Message(data) => match &self.channel {
                Some(channel) => channel.deliver(&data).await,
                None => debug!("Peer message before the channel opened, dropping"),
            },
        }
    }

    async fn apply(&mut self, input: SessionInput) {
        let mut queue = VecDeque::from([input]);
        while let Some(input) = queue.pop_front() {
            for effect in self.machine.handle(input) {
                if let Some(next) = self.execute(effect).await {
                    queue.push_back(next);
                }
            }
        }
        self.schedule_retry();
    }

    async fn execute(&mut self, effect: SessionEffect) -> Option<SessionInput> {
        match effect {
            SessionEffect::ConnectControl => {
                self.close_control();
                self.control_generation += 1;
                let sink = EventSink::new(self.control_generation, self.control_tx.clone());
                match self.connector.connect(sink).await {
                    Ok(link) => {
                        self.control = Some(link);
                        Some(SessionInput::ControlConnected)
                    }
                    Err(e) => Some(SessionInput::ControlFailed(e.to_string())),
                }
            }

            SessionEffect::CloseControl => {
                self.close_control();
                None
            }

            SessionEffect::SendSignal(message) => {
                match &self.control {
                    Some(link) => {
                        if let Err(e) = link.send(&message) {
                            warn!("Failed to send {}: {}", message.kind(), e);
                        }
                    }
                    None => warn!("No signaling link to send {}", message.kind()),
                }
                None
            }

            SessionEffect::PrepareTransport => {
                self.close_transport().await;
                self.transport_generation += 1;
                let sink = EventSink::new(self.transport_generation, self.transport_tx.clone());
                match self.transports.create(self.machine.role(), sink).await {
                    Ok(transport) => {
                        self.transport = Some(transport);
                        None
                    }
                    Err(e) => Some(SessionInput::NegotiationFailed(format!(
                        "Failed to create transport: {:#}",
                        e
                    ))),
                }
            }

            SessionEffect::CreateOffer => {
                let Some(transport) = &self.transport else {
                    return Some(no_transport());
                };
                match transport.create_offer().await {
                    Ok(sdp) => Some(SessionInput::LocalOffer(sdp)),
                    Err(e) => Some(SessionInput::NegotiationFailed(format!("{:#}", e))),
                }
            }

            SessionEffect::AcceptOffer(sdp) => {
                let Some(transport) = &self.transport else {
                    return Some(no_transport());
                };
                match transport.accept_offer(sdp).await {
                    Ok(answer) => Some(SessionInput::LocalAnswer(answer)),
                    Err(e) => Some(SessionInput::NegotiationFailed(format!("{:#}", e))),
                }
            }

            SessionEffect::ApplyAnswer(sdp) => {
                let Some(transport) = &self.transport else {
                    return Some(no_transport());
                };
                match transport.apply_answer(sdp).await {
                    Ok(()) => Some(SessionInput::RemoteDescriptionApplied),
                    Err(e) => Some(SessionInput::NegotiationFailed(format!("{:#}", e))),
                }
            }

            SessionEffect::AddIceCandidate(candidate) => {
                if let Some(transport) = &self.transport {
                    if let Err(e) = transport.add_ice_candidate(candidate).await {
                        warn!("Failed to add ICE candidate: {:#}", e);
                    }
                }
                None
            }

            SessionEffect::ActivateChannel => {
                let Some(sink) = self.opened_sink.take() else {
                    warn!("Channel marked ready without an open data channel");
                    return None;
                };
                let channel = PeerChannel::new(sink);
                channel.on_message(self.inbound_handler()).await;
                self.outputs.channel.send_replace(Some(channel.clone()));
                self.channel = Some(channel);
                None
            }

            SessionEffect::CloseTransport => {
                self.close_transport().await;
                None
            }

            SessionEffect::Notify(event) => {
                match &event {
                    SessionEvent::StateChanged(state) => {
                        self.outputs.state.send_replace(*state);
                    }
                    SessionEvent::Error {
                        message,
                        fatal: true,
                    } => {
                        self.outputs.close_reason.send_replace(Some(message.clone()));
                    }
                    _ => {}
                }
                let _ = self.outputs.events.send(event);
                None
            }
        }
    }

    /// Fret updates go to the latest-value slot, everything else to subscribers.
    fn inbound_handler(&self) -> MessageHandler {
        let frets = self.outputs.frets.clone();
        let events = self.outputs.events.clone();
        let max_fret = self.config.max_fret;

        Arc::new(move |message: PeerMessage| match message {
            PeerMessage::FretUpdate(state) => match state.validate(max_fret) {
                Ok(state) => {
                    frets.send_replace(Some(state));
                }
                Err(e) => warn!("Dropping fret update: {}", e),
            },
            other => {
                let _ = events.send(SessionEvent::Message(other));
            }
        })
    }

    fn close_control(&mut self) {
        if let Some(link) = self.control.take() {
            link.close();
        }
    }

    async fn close_transport(&mut self) {
        // Invalidate callbacks still in flight from the old transport.
        self.transport_generation += 1;
        self.opened_sink = None;
        if let Some(channel) = self.channel.take() {
            channel.close().await;
        }
        self.outputs.channel.send_replace(None);
        self.outputs.frets.send_replace(None);
        if let Some(transport) = self.transport.take() {
            if let Err(e) = transport.close().await {
                debug!("Closing peer transport: {:#}", e);
            }
        }
    }

    fn schedule_retry(&mut self) {
        match self.machine.state() {
            ConnectionState::ChannelOpen => {
                self.retry_attempt = 0;
                self.retry_at = None;
            }
            ConnectionState::PeerLost | ConnectionState::Disconnected if self.started => {
                if self.retry_at.is_some() {
                    return;
                }
                let policy = &self.config.reconnect;
                if policy.should_retry(self.retry_attempt) {
                    let delay = policy.backoff(self.retry_attempt);
                    info!("Retrying in {:?}", delay);
                    self.retry_at = Some(Instant::now() + delay);
                } else if policy.auto {
                    warn!(
                        "Giving up automatic retries after {} attempts",
                        self.retry_attempt
                    );
                }
            }
            _ => self.retry_at = None,
        }
    }
}

fn no_transport() -> SessionInput {
    SessionInput::NegotiationFailed("no peer transport".to_string())
}

async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}
