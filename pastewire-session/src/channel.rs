use crate::error::SessionError;
use std::sync::Arc;
use tracing::debug;
use webrtc::data_channel::RTCDataChannel;
use webrtc::data_channel::data_channel_state::RTCDataChannelState;

/// Wraps the one open message channel of a session.
///
/// Inbound traffic is delivered through the transport event stream. Handlers
/// are attached only once the channel object is known, so anything the peer
/// sends in the window before that is lost; accepted limitation of the
/// transport, not worked around here.
pub struct ChannelBridge {
    channel: Arc<RTCDataChannel>,
}

impl ChannelBridge {
    pub fn new(channel: Arc<RTCDataChannel>) -> Self {
        Self { channel }
    }

    pub fn label(&self) -> &str {
        self.channel.label()
    }

    pub fn is_open(&self) -> bool {
        self.channel.ready_state() == RTCDataChannelState::Open
    }

    /// Send a text message. Allowed only while the channel lifecycle state is
    /// `Open`; anything else is rejected without touching the transport.
    pub async fn send(&self, text: &str) -> Result<(), SessionError> {
        if !self.is_open() {
            return Err(SessionError::ChannelNotOpen);
        }

        self.channel
            .send_text(text)
            .await
            .map_err(SessionError::Transport)?;

        debug!(label = %self.channel.label(), bytes = text.len(), "message sent");
        Ok(())
    }
}
