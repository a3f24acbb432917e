use bytes::Bytes;
use std::fmt;
use std::sync::Arc;
use webrtc::data_channel::RTCDataChannel;
use webrtc::peer_connection::peer_connection_state::RTCPeerConnectionState;

/// Notifications the underlying connection pushes up to the session loop.
pub enum TransportEvent {
    /// Aggregate connection status changed.
    StateChanged(RTCPeerConnectionState),
    /// A data channel (locally opened or announced by the peer) became open.
    ChannelOpen(Arc<RTCDataChannel>),
    /// A message arrived on the channel.
    Message(Bytes),
}

/// The transport's aggregate lifecycle indicator, surfaced read-only to the
/// presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionStatus {
    New,
    Connecting,
    Connected,
    Disconnected,
    Failed,
    Closed,
}

impl From<RTCPeerConnectionState> for ConnectionStatus {
    fn from(state: RTCPeerConnectionState) -> Self {
        match state {
            RTCPeerConnectionState::Unspecified | RTCPeerConnectionState::New => {
                ConnectionStatus::New
            }
            RTCPeerConnectionState::Connecting => ConnectionStatus::Connecting,
            RTCPeerConnectionState::Connected => ConnectionStatus::Connected,
            RTCPeerConnectionState::Disconnected => ConnectionStatus::Disconnected,
            RTCPeerConnectionState::Failed => ConnectionStatus::Failed,
            RTCPeerConnectionState::Closed => ConnectionStatus::Closed,
        }
    }
}

impl fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ConnectionStatus::New => "new",
            ConnectionStatus::Connecting => "connecting",
            ConnectionStatus::Connected => "connected",
            ConnectionStatus::Disconnected => "disconnected",
            ConnectionStatus::Failed => "failed",
            ConnectionStatus::Closed => "closed",
        };
        write!(f, "{name}")
    }
}
