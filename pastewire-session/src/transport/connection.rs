use crate::error::SessionError;
use crate::transport::{TransportConfig, TransportEvent};
use bytes::Bytes;
use pastewire_core::model::{CandidateInit, DescriptionInit, SdpKind, SessionId};
use std::sync::Arc;
use tokio::sync::{Mutex, mpsc};
use tracing::{debug, info};
use webrtc::api::APIBuilder;
use webrtc::api::interceptor_registry::register_default_interceptors;
use webrtc::api::media_engine::MediaEngine;
use webrtc::data_channel::RTCDataChannel;
use webrtc::data_channel::data_channel_message::DataChannelMessage;
use webrtc::ice_transport::ice_candidate::{RTCIceCandidate, RTCIceCandidateInit};
use webrtc::ice_transport::ice_server::RTCIceServer;
use webrtc::interceptor::registry::Registry;
use webrtc::peer_connection::RTCPeerConnection;
use webrtc::peer_connection::configuration::RTCConfiguration;
use webrtc::peer_connection::peer_connection_state::RTCPeerConnectionState;
use webrtc::peer_connection::sdp::sdp_type::RTCSdpType;
use webrtc::peer_connection::sdp::session_description::RTCSessionDescription;

/// The single underlying peer connection for one negotiation session.
///
/// Constructed once per session and reused across renegotiation rounds.
/// Callbacks are registered once, here; everything they observe is forwarded
/// into the [`TransportEvent`] stream, except discovered candidates, which
/// accumulate in a per-round buffer drained by [`crate::transport::gather`].
pub struct ConnectionHandle {
    session_id: SessionId,
    peer_connection: Arc<RTCPeerConnection>,
    channel_label: String,
    candidates: Arc<Mutex<Vec<CandidateInit>>>,
    event_tx: mpsc::Sender<TransportEvent>,
}

impl ConnectionHandle {
    pub async fn new(
        session_id: SessionId,
        config: &TransportConfig,
        event_tx: mpsc::Sender<TransportEvent>,
    ) -> Result<Self, SessionError> {
        let mut media_engine = MediaEngine::default();
        media_engine
            .register_default_codecs()
            .map_err(SessionError::Transport)?;

        let registry = register_default_interceptors(Registry::new(), &mut media_engine)
            .map_err(SessionError::Transport)?;

        let api = APIBuilder::new()
            .with_media_engine(media_engine)
            .with_interceptor_registry(registry)
            .build();

        let ice_servers = if config.ice_servers.is_empty() {
            vec![]
        } else {
            vec![RTCIceServer {
                urls: config.ice_servers.clone(),
                ..Default::default()
            }]
        };

        let rtc_config = RTCConfiguration {
            ice_servers,
            ..Default::default()
        };

        let peer_connection = Arc::new(
            api.new_peer_connection(rtc_config)
                .await
                .map_err(SessionError::Transport)?,
        );

        let candidates: Arc<Mutex<Vec<CandidateInit>>> = Arc::new(Mutex::new(Vec::new()));

        let state_tx = event_tx.clone();
        peer_connection.on_peer_connection_state_change(Box::new(
            move |state: RTCPeerConnectionState| {
                let tx = state_tx.clone();
                Box::pin(async move {
                    debug!(?state, "connection state changed");
                    let _ = tx.send(TransportEvent::StateChanged(state)).await;
                })
            },
        ));

        let gathered = Arc::clone(&candidates);
        peer_connection.on_ice_candidate(Box::new(move |candidate: Option<RTCIceCandidate>| {
            let gathered = Arc::clone(&gathered);
            Box::pin(async move {
                // `None` is the end-of-gathering marker; it never enters the set.
                let Some(candidate) = candidate else { return };
                let Ok(init) = candidate.to_json() else { return };
                if init.candidate.is_empty() {
                    return;
                }
                debug!("candidate discovered");
                gathered.lock().await.push(candidate_to_init(init));
            })
        }));

        let dc_tx = event_tx.clone();
        peer_connection.on_data_channel(Box::new(move |channel: Arc<RTCDataChannel>| {
            let tx = dc_tx.clone();
            Box::pin(async move {
                debug!(label = %channel.label(), "inbound data channel announced");
                wire_channel(&channel, tx);
            })
        }));

        info!(session = %session_id, "peer connection created");

        Ok(Self {
            session_id,
            peer_connection,
            channel_label: config.channel_label.clone(),
            candidates,
            event_tx,
        })
    }

    /// Create and set a local description, clearing the candidate buffer for
    /// the gathering round that follows.
    pub async fn create_local_description(
        &self,
        kind: SdpKind,
    ) -> Result<DescriptionInit, SessionError> {
        self.candidates.lock().await.clear();

        let description = match kind {
            SdpKind::Offer => self.peer_connection.create_offer(None).await,
            SdpKind::Answer => self.peer_connection.create_answer(None).await,
        }
        .map_err(|source| SessionError::Apply {
            operation: "create local description",
            source,
        })?;

        self.peer_connection
            .set_local_description(description)
            .await
            .map_err(|source| SessionError::Apply {
                operation: "set local description",
                source,
            })?;

        let local = self
            .peer_connection
            .local_description()
            .await
            .ok_or(SessionError::DescriptionUnavailable)?;

        from_rtc_description(&local).ok_or(SessionError::DescriptionUnavailable)
    }

    /// Apply the peer's description. Must precede every candidate that
    /// references it.
    pub async fn apply_remote_description(
        &self,
        init: &DescriptionInit,
    ) -> Result<(), SessionError> {
        let description = to_rtc_description(init).map_err(|source| SessionError::Apply {
            operation: "parse remote description",
            source,
        })?;

        self.peer_connection
            .set_remote_description(description)
            .await
            .map_err(|source| SessionError::Apply {
                operation: "apply remote description",
                source,
            })
    }

    pub async fn add_remote_candidate(&self, candidate: CandidateInit) -> Result<(), SessionError> {
        self.peer_connection
            .add_ice_candidate(candidate_from_init(candidate))
            .await
            .map_err(|source| SessionError::Apply {
                operation: "add remote candidate",
                source,
            })
    }

    /// Open the local data channel and wire its handlers into the event
    /// stream. The offering side calls this once, before describing itself.
    pub async fn open_channel(&self) -> Result<Arc<RTCDataChannel>, SessionError> {
        let channel = self
            .peer_connection
            .create_data_channel(&self.channel_label, None)
            .await
            .map_err(SessionError::Transport)?;

        wire_channel(&channel, self.event_tx.clone());
        info!(session = %self.session_id, label = %channel.label(), "local data channel created");
        Ok(channel)
    }

    pub fn connection_state(&self) -> RTCPeerConnectionState {
        self.peer_connection.connection_state()
    }

    pub async fn close(&self) -> Result<(), SessionError> {
        self.peer_connection
            .close()
            .await
            .map_err(SessionError::Transport)
    }

    pub(crate) async fn gathering_complete(&self) -> mpsc::Receiver<()> {
        self.peer_connection.gathering_complete_promise().await
    }

    pub(crate) async fn take_candidates(&self) -> Vec<CandidateInit> {
        std::mem::take(&mut *self.candidates.lock().await)
    }
}

/// Attach open/message handlers so the session loop hears about the channel.
/// Messages delivered before this runs are lost; that window exists on the
/// answering side, where the channel object only arrives with the
/// `on_data_channel` event.
fn wire_channel(channel: &Arc<RTCDataChannel>, event_tx: mpsc::Sender<TransportEvent>) {
    let open_tx = event_tx.clone();
    let opened = Arc::clone(channel);
    channel.on_open(Box::new(move || {
        let tx = open_tx.clone();
        let channel = Arc::clone(&opened);
        Box::pin(async move {
            debug!(label = %channel.label(), "data channel open");
            let _ = tx.send(TransportEvent::ChannelOpen(channel)).await;
        })
    }));

    let msg_tx = event_tx;
    channel.on_message(Box::new(move |msg: DataChannelMessage| {
        let tx = msg_tx.clone();
        Box::pin(async move {
            let data = Bytes::from(msg.data.to_vec());
            let _ = tx.send(TransportEvent::Message(data)).await;
        })
    }));
}

fn to_rtc_description(init: &DescriptionInit) -> Result<RTCSessionDescription, webrtc::Error> {
    match init.kind {
        SdpKind::Offer => RTCSessionDescription::offer(init.sdp.clone()),
        SdpKind::Answer => RTCSessionDescription::answer(init.sdp.clone()),
    }
}

fn from_rtc_description(description: &RTCSessionDescription) -> Option<DescriptionInit> {
    let kind = match description.sdp_type {
        RTCSdpType::Offer => SdpKind::Offer,
        RTCSdpType::Answer | RTCSdpType::Pranswer => SdpKind::Answer,
        _ => return None,
    };

    Some(DescriptionInit {
        kind,
        sdp: description.sdp.clone(),
    })
}

fn candidate_to_init(candidate: RTCIceCandidateInit) -> CandidateInit {
    CandidateInit {
        candidate: candidate.candidate,
        sdp_mid: candidate.sdp_mid,
        sdp_mline_index: candidate.sdp_mline_index,
        username_fragment: candidate.username_fragment,
    }
}

fn candidate_from_init(candidate: CandidateInit) -> RTCIceCandidateInit {
    RTCIceCandidateInit {
        candidate: candidate.candidate,
        sdp_mid: candidate.sdp_mid,
        sdp_mline_index: candidate.sdp_mline_index,
        username_fragment: candidate.username_fragment,
    }
}
