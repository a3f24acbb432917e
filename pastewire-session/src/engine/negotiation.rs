use crate::engine::NegotiationState;
use crate::error::SessionError;
use crate::telemetry::{TelemetryEvent, TelemetrySink};
use crate::transport::{ConnectionHandle, ConnectionStatus, gather};
use pastewire_core::codec;
use pastewire_core::model::{OfferPayload, SdpKind, SessionId};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::{Mutex, MutexGuard, watch};
use tracing::debug;
use webrtc::peer_connection::peer_connection_state::RTCPeerConnectionState;

/// The negotiation state machine. Owns the one [`ConnectionHandle`] for the
/// session's lifetime and drives description creation, candidate gathering
/// and remote payload application in the required order.
///
/// One round at a time: a second `initiate`/`accept_remote` while one is in
/// flight is rejected with [`SessionError::Busy`] before anything is mutated.
pub struct NegotiationEngine {
    session_id: SessionId,
    connection: ConnectionHandle,
    gather_deadline: Duration,
    state_tx: watch::Sender<NegotiationState>,
    local_payload: Mutex<Option<OfferPayload>>,
    remote_payload: Mutex<Option<OfferPayload>>,
    round_guard: Mutex<()>,
    channel_opened: AtomicBool,
    telemetry: Arc<dyn TelemetrySink>,
}

impl NegotiationEngine {
    pub fn new(
        session_id: SessionId,
        connection: ConnectionHandle,
        gather_deadline: Duration,
        telemetry: Arc<dyn TelemetrySink>,
    ) -> Self {
        let (state_tx, _) = watch::channel(NegotiationState::Idle);

        Self {
            session_id,
            connection,
            gather_deadline,
            state_tx,
            local_payload: Mutex::new(None),
            remote_payload: Mutex::new(None),
            round_guard: Mutex::new(()),
            channel_opened: AtomicBool::new(false),
            telemetry,
        }
    }

    pub fn session_id(&self) -> SessionId {
        self.session_id
    }

    pub fn watch_state(&self) -> watch::Receiver<NegotiationState> {
        self.state_tx.subscribe()
    }

    pub fn current_state(&self) -> NegotiationState {
        self.state_tx.borrow().clone()
    }

    /// The transport's aggregate status, surfaced read-only. Completion of a
    /// negotiation is ultimately confirmed by this reaching `Connected`.
    pub fn connection_status(&self) -> ConnectionStatus {
        ConnectionStatus::from(self.connection.connection_state())
    }

    /// Most recent payload produced by this side, for display/copy.
    pub async fn local_payload(&self) -> Option<OfferPayload> {
        self.local_payload.lock().await.clone()
    }

    /// Most recent peer payload that was applied successfully.
    pub async fn remote_payload(&self) -> Option<OfferPayload> {
        self.remote_payload.lock().await.clone()
    }

    /// Open the local channel, describe this side as the offerer, gather
    /// candidates and return the payload to hand to the peer. Called once, at
    /// session start, by the offering side.
    pub async fn initiate(&self) -> Result<OfferPayload, SessionError> {
        let round = self.begin_round()?;
        self.transition(NegotiationState::LocalDescribing);

        let result = async {
            if !self.channel_opened.load(Ordering::Acquire) {
                self.connection.open_channel().await?;
                self.channel_opened.store(true, Ordering::Release);
            }
            self.describe_round(SdpKind::Offer).await
        }
        .await;

        drop(round);

        match result {
            Ok(payload) => {
                self.transition(NegotiationState::AwaitingRemote);
                Ok(payload)
            }
            Err(err) => Err(self.fail(err)),
        }
    }

    /// The core transition: decode a pasted peer payload, apply it, and when
    /// it was an original offer, produce the matching answer payload.
    ///
    /// Returns `Ok(Some(_))` with the answer payload when this side ended up
    /// answering, `Ok(None)` when the remote description was an answer and
    /// nothing further is produced.
    pub async fn accept_remote(&self, text: &str) -> Result<Option<OfferPayload>, SessionError> {
        let round = self.begin_round()?;
        let result = self.apply_round(text).await;
        drop(round);

        match result {
            Ok(answer) => Ok(answer),
            Err(err @ (SessionError::Decode(_) | SessionError::IncompletePayload)) => {
                // Rejected before the connection was touched; prior state stands.
                self.report_failure(&err);
                Err(err)
            }
            Err(err) => Err(self.fail(err)),
        }
    }

    async fn apply_round(&self, text: &str) -> Result<Option<OfferPayload>, SessionError> {
        let payload = codec::decode(text)?;
        let description = payload
            .description
            .clone()
            .ok_or(SessionError::IncompletePayload)?;

        // Description strictly before any candidate that references it.
        self.connection.apply_remote_description(&description).await?;
        for candidate in payload.candidates.iter().cloned() {
            self.connection.add_remote_candidate(candidate).await?;
        }

        *self.remote_payload.lock().await = Some(payload);
        self.transition(NegotiationState::RemoteApplied);

        if description.kind == SdpKind::Offer {
            self.transition(NegotiationState::LocalDescribing);
            let answer = self.describe_round(SdpKind::Answer).await?;
            self.transition(NegotiationState::AwaitingRemote);
            Ok(Some(answer))
        } else {
            Ok(None)
        }
    }

    async fn describe_round(&self, kind: SdpKind) -> Result<OfferPayload, SessionError> {
        let description = self.connection.create_local_description(kind).await?;
        let candidates = gather(&self.connection, self.gather_deadline).await?;

        let payload = OfferPayload::new(description, candidates);
        *self.local_payload.lock().await = Some(payload.clone());
        Ok(payload)
    }

    /// Feed the transport's aggregate status back into the derived state.
    pub fn note_connection_state(&self, state: RTCPeerConnectionState) {
        match state {
            RTCPeerConnectionState::Connected => self.transition(NegotiationState::Connected),
            RTCPeerConnectionState::Failed => {
                self.transition(NegotiationState::Failed("transport reported failure".into()));
            }
            _ => {}
        }
    }

    pub async fn close(&self) -> Result<(), SessionError> {
        self.connection.close().await
    }

    fn begin_round(&self) -> Result<MutexGuard<'_, ()>, SessionError> {
        self.round_guard.try_lock().map_err(|_| {
            let err = SessionError::Busy;
            self.report_failure(&err);
            err
        })
    }

    fn transition(&self, state: NegotiationState) {
        debug!(session = %self.session_id, %state, "state");
        self.telemetry.record(TelemetryEvent::Transition {
            session: self.session_id,
            state: state.clone(),
        });
        self.state_tx.send_replace(state);
    }

    fn report_failure(&self, err: &SessionError) {
        self.telemetry.record(TelemetryEvent::Failure {
            session: self.session_id,
            operation: err.operation(),
            reason: err.to_string(),
        });
    }

    fn fail(&self, err: SessionError) -> SessionError {
        self.report_failure(&err);
        self.transition(NegotiationState::Failed(err.to_string()));
        err
    }
}
