use pastewire_core::codec::DecodeError;
use std::time::Duration;
use thiserror::Error;

/// Everything that can go wrong inside one negotiation session. None of these
/// are fatal to the process; each round is recoverable by retrying or by a
/// fresh `initiate`.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error("payload carries no session description")]
    IncompletePayload,

    #[error("candidate gathering did not complete within {waited:?}")]
    GatherTimeout { waited: Duration },

    #[error("{operation} rejected by the transport: {source}")]
    Apply {
        operation: &'static str,
        source: webrtc::Error,
    },

    #[error("another negotiation round is already in flight")]
    Busy,

    #[error("local description missing after it was set")]
    DescriptionUnavailable,

    #[error("data channel is not open")]
    ChannelNotOpen,

    #[error("transport failure: {0}")]
    Transport(#[source] webrtc::Error),
}

impl SessionError {
    /// Short operation label for telemetry reports.
    pub fn operation(&self) -> &'static str {
        match self {
            SessionError::Decode(_) => "decode payload",
            SessionError::IncompletePayload => "validate payload",
            SessionError::GatherTimeout { .. } => "gather candidates",
            SessionError::Apply { operation, .. } => operation,
            SessionError::Busy => "begin round",
            SessionError::DescriptionUnavailable => "create local description",
            SessionError::ChannelNotOpen => "send message",
            SessionError::Transport(_) => "transport",
        }
    }
}
