use crate::transport::ConnectionStatus;
use async_trait::async_trait;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Inbound,
    Outbound,
}

/// What the session shows the human. Implemented by the terminal front end
/// and by the test mocks; the session never cares who is listening.
#[async_trait]
pub trait PresentationOutput: Send + Sync {
    /// A fresh local payload is ready to be copied to the peer.
    async fn publish_local_payload(&self, text: String);

    /// Aggregate connection status changed.
    async fn show_status(&self, status: ConnectionStatus);

    /// A chat message crossed the channel.
    async fn show_message(&self, direction: Direction, text: String);

    /// A session-level failure to display. Never fatal.
    async fn show_error(&self, message: String);
}
