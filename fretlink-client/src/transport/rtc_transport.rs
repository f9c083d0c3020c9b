use crate::channel::DataSink;
use crate::config::ChannelMode;
use crate::transport::{EventSink, PeerTransport, TransportEvent, TransportFactory};
use anyhow::{Context, Result};
use async_trait::async_trait;
use bytes::Bytes;
use fretlink_core::{IceCandidate, IceServerConfig, Role};
use std::sync::Arc;
use tracing::{debug, info};
use webrtc::api::APIBuilder;
use webrtc::api::interceptor_registry::register_default_interceptors;
use webrtc::api::media_engine::MediaEngine;
use webrtc::data_channel::RTCDataChannel;
use webrtc::data_channel::data_channel_init::RTCDataChannelInit;
use webrtc::data_channel::data_channel_message::DataChannelMessage;
use webrtc::ice_transport::ice_candidate::{RTCIceCandidate, RTCIceCandidateInit};
use webrtc::ice_transport::ice_server::RTCIceServer;
use webrtc::interceptor::registry::Registry;
use webrtc::peer_connection::RTCPeerConnection;
use webrtc::peer_connection::configuration::RTCConfiguration;
use webrtc::peer_connection::peer_connection_state::RTCPeerConnectionState;
use webrtc::peer_connection::sdp::session_description::RTCSessionDescription;

const CHANNEL_LABEL: &str = "frets";

/// Every mode is ordered; they differ only in retransmits.
fn channel_init(mode: ChannelMode) -> RTCDataChannelInit {
    RTCDataChannelInit {
        ordered: Some(true),
        max_retransmits: mode.max_retransmits(),
        ..Default::default()
    }
}

/// Builds [`RtcTransport`]s with a fixed ICE configuration.
#[derive(Debug, Clone)]
pub struct RtcTransportFactory {
    ice_servers: Vec<IceServerConfig>,
    channel_mode: ChannelMode,
}

impl RtcTransportFactory {
    pub fn new(ice_servers: Vec<IceServerConfig>, channel_mode: ChannelMode) -> Self {
        Self {
            ice_servers,
            channel_mode,
        }
    }
}

#[async_trait]
impl TransportFactory for RtcTransportFactory {
    async fn create(
        &self,
        role: Role,
        events: EventSink<TransportEvent>,
    ) -> Result<Box<dyn PeerTransport>> {
        let transport = RtcTransport::new(role, &self.ice_servers, self.channel_mode, events).await?;
        Ok(Box::new(transport))
    }
}

/// webrtc-rs peer connection whose callbacks feed an [`EventSink`].
pub struct RtcTransport {
    role: Role,
    peer_connection: Arc<RTCPeerConnection>,
}

impl RtcTransport {
    pub async fn new(
        role: Role,
        ice_servers: &[IceServerConfig],
        channel_mode: ChannelMode,
        events: EventSink<TransportEvent>,
    ) -> Result<Self> {
        let mut m = MediaEngine::default();
        m.register_default_codecs()?;
        let registry = register_default_interceptors(Registry::new(), &mut m)?;

        let api = APIBuilder::new()
            .with_media_engine(m)
            .with_interceptor_registry(registry)
            .build();

        let rtc_config = RTCConfiguration {
            ice_servers: ice_servers
                .iter()
                .map(|server| RTCIceServer {
                    urls: server.urls.clone(),
                    username: server.username.clone().unwrap_or_default(),
                    credential: server.credential.clone().unwrap_or_default(),
                    ..Default::default()
                })
                .collect(),
            ..Default::default()
        };

        let peer_connection = Arc::new(
            api.new_peer_connection(rtc_config)
                .await
                .context("Failed to create peer connection")?,
        );

        let state_events = events.clone();
        peer_connection.on_peer_connection_state_change(Box::new(
            move |s: RTCPeerConnectionState| {
                let events = state_events.clone();
                Box::pin(async move {
                    info!("Peer connection state changed: {:?}", s);
                    let event = match s {
                        RTCPeerConnectionState::Connected => TransportEvent::Connected,
                        RTCPeerConnectionState::Disconnected | RTCPeerConnectionState::Closed => {
                            TransportEvent::Disconnected
                        }
                        RTCPeerConnectionState::Failed => TransportEvent::Failed,
                        _ => return,
                    };
                    events.emit(event).await;
                })
            },
        ));

        let ice_events = events.clone();
        peer_connection.on_ice_candidate(Box::new(move |c: Option<RTCIceCandidate>| {
            let events = ice_events.clone();
            Box::pin(async move {
                let Some(candidate) = c else { return };
                let Ok(init) = candidate.to_json() else {
                    return;
                };
                events
                    .emit(TransportEvent::LocalCandidate(IceCandidate {
                        candidate: init.candidate,
                        sdp_mid: init.sdp_mid,
                        sdp_mline_index: init.sdp_mline_index,
                        username_fragment: init.username_fragment,
                    }))
                    .await;
            })
        }));

        match role {
            Role::Performer => {
                let channel = peer_connection
                    .create_data_channel(CHANNEL_LABEL, Some(channel_init(channel_mode)))
                    .await
                    .context("Failed to create data channel")?;
                wire_data_channel(channel, events);
            }
            Role::Controller => {
                let dc_events = events.clone();
                peer_connection.on_data_channel(Box::new(move |dc: Arc<RTCDataChannel>| {
                    let events = dc_events.clone();
                    Box::pin(async move {
                        debug!("Remote data channel '{}' announced", dc.label());
                        wire_data_channel(dc, events);
                    })
                }));
            }
        }

        Ok(Self {
            role,
            peer_connection,
        })
    }

    pub fn role(&self) -> Role {
        self.role
    }
}

fn wire_data_channel(channel: Arc<RTCDataChannel>, events: EventSink<TransportEvent>) {
    let open_events = events.clone();
    let open_channel = channel.clone();
    channel.on_open(Box::new(move || {
        let events = open_events.clone();
        let sink: Arc<dyn DataSink> = Arc::new(RtcDataSink::new(open_channel.clone()));
        Box::pin(async move {
            info!("Data channel open");
            events.emit(TransportEvent::ChannelOpen(sink)).await;
        })
    }));

    channel.on_message(Box::new(move |msg: DataChannelMessage| {
        let events = events.clone();
        Box::pin(async move {
            events.emit(TransportEvent::Message(msg.data)).await;
        })
    }));
}

#[async_trait]
impl PeerTransport for RtcTransport {
    async fn create_offer(&self) -> Result<String> {
        let offer = self
            .peer_connection
            .create_offer(None)
            .await
            .context("Failed to create offer")?;
        self.peer_connection
            .set_local_description(offer.clone())
            .await
            .context("Failed to set local description")?;
        Ok(offer.sdp)
    }

    async fn accept_offer(&self, sdp: String) -> Result<String> {
        let desc = RTCSessionDescription::offer(sdp)?;
        self.peer_connection
            .set_remote_description(desc)
            .await
            .context("Failed to apply remote offer")?;

        let answer = self.peer_connection.create_answer(None).await?;
        self.peer_connection
            .set_local_description(answer.clone())
            .await
            .context("Failed to set local description")?;
        Ok(answer.sdp)
    }

    async fn apply_answer(&self, sdp: String) -> Result<()> {
        let desc = RTCSessionDescription::answer(sdp)?;
        self.peer_connection
            .set_remote_description(desc)
            .await
            .context("Failed to apply remote answer")?;
        Ok(())
    }

    async fn add_ice_candidate(&self, candidate: IceCandidate) -> Result<()> {
        let init = RTCIceCandidateInit {
            candidate: candidate.candidate,
            sdp_mid: candidate.sdp_mid,
            sdp_mline_index: candidate.sdp_mline_index,
            username_fragment: candidate.username_fragment,
        };
        self.peer_connection
            .add_ice_candidate(init)
            .await
            .context("Failed to add ICE candidate")?;
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        self.peer_connection.close().await?;
        Ok(())
    }
}

/// Write half of an open webrtc-rs data channel.
pub struct RtcDataSink {
    channel: Arc<RTCDataChannel>,
}

impl RtcDataSink {
    pub fn new(channel: Arc<RTCDataChannel>) -> Self {
        Self { channel }
    }
}

#[async_trait]
impl DataSink for RtcDataSink {
    async fn send(&self, data: Bytes) -> Result<()> {
        self.channel.send(&data).await?;
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        self.channel.close().await?;
        Ok(())
    }
}
