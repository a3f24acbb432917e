use crate::channel::ChannelBridge;
use crate::engine::{NegotiationEngine, NegotiationState};
use crate::error::SessionError;
use crate::session::{Direction, PresentationOutput, SessionCommand};
use crate::telemetry::TelemetrySink;
use crate::transport::{ConnectionHandle, ConnectionStatus, TransportConfig, TransportEvent};
use pastewire_core::codec;
use pastewire_core::model::{OfferPayload, SessionId};
use std::ops::ControlFlow;
use std::sync::Arc;
use tokio::sync::{Mutex, mpsc, watch};
use tracing::{info, warn};

/// One entry of the in-memory chat log.
#[derive(Debug, Clone)]
pub struct LogEntry {
    pub direction: Direction,
    pub text: String,
}

/// Cheap clonable handle the presentation layer keeps while the session actor
/// runs. All mutation goes through the command channel; everything readable
/// here is a read-only view.
#[derive(Clone)]
pub struct SessionHandle {
    session_id: SessionId,
    command_tx: mpsc::Sender<SessionCommand>,
    state_rx: watch::Receiver<NegotiationState>,
    payload_rx: watch::Receiver<Option<String>>,
    status_rx: watch::Receiver<ConnectionStatus>,
    log: Arc<Mutex<Vec<LogEntry>>>,
}

impl SessionHandle {
    pub fn session_id(&self) -> SessionId {
        self.session_id
    }

    pub async fn initiate(&self) {
        let _ = self.command_tx.send(SessionCommand::Initiate).await;
    }

    pub async fn accept_remote(&self, payload: String) {
        let _ = self
            .command_tx
            .send(SessionCommand::AcceptRemote { payload })
            .await;
    }

    pub async fn send_message(&self, text: String) {
        let _ = self
            .command_tx
            .send(SessionCommand::SendMessage { text })
            .await;
    }

    pub async fn close(&self) {
        let _ = self.command_tx.send(SessionCommand::Close).await;
    }

    pub fn negotiation_state(&self) -> NegotiationState {
        self.state_rx.borrow().clone()
    }

    /// Current local payload text, ready to copy to the peer.
    pub fn local_payload(&self) -> Option<String> {
        self.payload_rx.borrow().clone()
    }

    pub fn connection_status(&self) -> ConnectionStatus {
        *self.status_rx.borrow()
    }

    pub async fn message_log(&self) -> Vec<LogEntry> {
        self.log.lock().await.clone()
    }
}

/// The per-session actor: owns the engine and the channel bridge, and
/// serializes presentation commands against transport events, so no two
/// negotiation operations ever interleave.
pub struct Session {
    engine: NegotiationEngine,
    bridge: Option<ChannelBridge>,
    command_rx: mpsc::Receiver<SessionCommand>,
    transport_rx: mpsc::Receiver<TransportEvent>,
    output: Arc<dyn PresentationOutput>,
    payload_tx: watch::Sender<Option<String>>,
    status_tx: watch::Sender<ConnectionStatus>,
    log: Arc<Mutex<Vec<LogEntry>>>,
}

impl Session {
    /// Build a session and its handle. Nothing happens until [`Session::run`]
    /// is polled; the offering side then sends [`SessionCommand::Initiate`].
    pub async fn connect(
        config: TransportConfig,
        output: Arc<dyn PresentationOutput>,
        telemetry: Arc<dyn TelemetrySink>,
    ) -> Result<(SessionHandle, Session), SessionError> {
        let session_id = SessionId::new();
        let (transport_tx, transport_rx) = mpsc::channel(256);

        let connection = ConnectionHandle::new(session_id, &config, transport_tx).await?;
        let engine =
            NegotiationEngine::new(session_id, connection, config.gather_timeout, telemetry);

        let (command_tx, command_rx) = mpsc::channel(64);
        let (payload_tx, payload_rx) = watch::channel(None);
        let (status_tx, status_rx) = watch::channel(ConnectionStatus::New);
        let log = Arc::new(Mutex::new(Vec::new()));

        let handle = SessionHandle {
            session_id,
            command_tx,
            state_rx: engine.watch_state(),
            payload_rx,
            status_rx,
            log: Arc::clone(&log),
        };

        let session = Session {
            engine,
            bridge: None,
            command_rx,
            transport_rx,
            output,
            payload_tx,
            status_tx,
            log,
        };

        Ok((handle, session))
    }

    /// Drive the session until `Close` or until both channels shut down.
    ///
    /// Commands and transport events are processed one at a time. While a
    /// command is in flight (a gather round can take up to the configured
    /// deadline), transport events queue and are delivered afterwards, so a
    /// status update shown late was delayed, not dropped.
    pub async fn run(mut self) {
        info!(session = %self.engine.session_id(), "session loop started");

        loop {
            tokio::select! {
                cmd = self.command_rx.recv() => {
                    match cmd {
                        Some(cmd) => {
                            if self.handle_command(cmd).await.is_break() {
                                break;
                            }
                        }
                        None => break,
                    }
                }

                evt = self.transport_rx.recv() => {
                    match evt {
                        Some(evt) => self.handle_transport_event(evt).await,
                        None => {
                            warn!("transport event channel closed unexpectedly");
                            break;
                        }
                    }
                }
            }
        }

        info!(session = %self.engine.session_id(), "session loop finished");
    }

    async fn handle_command(&mut self, cmd: SessionCommand) -> ControlFlow<()> {
        match cmd {
            SessionCommand::Initiate => match self.engine.initiate().await {
                Ok(payload) => self.publish(&payload).await,
                Err(err) => self.output.show_error(err.to_string()).await,
            },

            SessionCommand::AcceptRemote { payload } => {
                match self.engine.accept_remote(&payload).await {
                    Ok(Some(answer)) => self.publish(&answer).await,
                    Ok(None) => info!("remote answer applied; awaiting transport confirmation"),
                    Err(err) => self.output.show_error(err.to_string()).await,
                }
            }

            SessionCommand::SendMessage { text } => self.send_message(text).await,

            SessionCommand::Close => {
                let _ = self.engine.close().await;
                return ControlFlow::Break(());
            }
        }

        ControlFlow::Continue(())
    }

    async fn handle_transport_event(&mut self, event: TransportEvent) {
        match event {
            TransportEvent::StateChanged(state) => {
                self.engine.note_connection_state(state);
                let status = ConnectionStatus::from(state);
                self.status_tx.send_replace(status);
                self.output.show_status(status).await;
            }

            TransportEvent::ChannelOpen(channel) => {
                info!(label = %channel.label(), "data channel ready");
                self.bridge = Some(ChannelBridge::new(channel));
            }

            TransportEvent::Message(data) => {
                let text = String::from_utf8_lossy(&data).into_owned();
                self.log.lock().await.push(LogEntry {
                    direction: Direction::Inbound,
                    text: text.clone(),
                });
                self.output.show_message(Direction::Inbound, text).await;
            }
        }
    }

    async fn publish(&self, payload: &OfferPayload) {
        let text = codec::encode(payload);
        self.payload_tx.send_replace(Some(text.clone()));
        self.output.publish_local_payload(text).await;
    }

    async fn send_message(&mut self, text: String) {
        let Some(bridge) = &self.bridge else {
            self.output
                .show_error(SessionError::ChannelNotOpen.to_string())
                .await;
            return;
        };

        match bridge.send(&text).await {
            Ok(()) => {
                self.log.lock().await.push(LogEntry {
                    direction: Direction::Outbound,
                    text: text.clone(),
                });
                self.output.show_message(Direction::Outbound, text).await;
            }
            Err(err) => self.output.show_error(err.to_string()).await,
        }
    }
}
