use async_trait::async_trait;
use pastewire_session::{ConnectionStatus, Direction, PresentationOutput};
use std::sync::Arc;
use tokio::sync::{Mutex, mpsc};

/// Everything a session would have shown the human, captured for assertions.
#[derive(Debug, Clone)]
pub enum PresentationEvent {
    Payload(String),
    Status(ConnectionStatus),
    Message(Direction, String),
    Error(String),
}

/// Mock PresentationOutput that records every call and forwards it on a
/// channel so tests can await specific outputs.
#[derive(Clone)]
pub struct MockPresentation {
    tx: mpsc::UnboundedSender<PresentationEvent>,
    events: Arc<Mutex<Vec<PresentationEvent>>>,
}

impl MockPresentation {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<PresentationEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let mock = Self {
            tx,
            events: Arc::new(Mutex::new(Vec::new())),
        };
        (mock, rx)
    }

    pub async fn recorded(&self) -> Vec<PresentationEvent> {
        self.events.lock().await.clone()
    }

    async fn push(&self, event: PresentationEvent) {
        self.events.lock().await.push(event.clone());
        let _ = self.tx.send(event);
    }
}

#[async_trait]
impl PresentationOutput for MockPresentation {
    async fn publish_local_payload(&self, text: String) {
        self.push(PresentationEvent::Payload(text)).await;
    }

    async fn show_status(&self, status: ConnectionStatus) {
        self.push(PresentationEvent::Status(status)).await;
    }

    async fn show_message(&self, direction: Direction, text: String) {
        self.push(PresentationEvent::Message(direction, text)).await;
    }

    async fn show_error(&self, message: String) {
        self.push(PresentationEvent::Error(message)).await;
    }
}
