use std::fmt;

/// Where one negotiation session currently stands. Derived purely from which
/// steps have completed; the transport's aggregate status is surfaced
/// separately and confirms completion.
#[derive(Debug, Clone, PartialEq)]
pub enum NegotiationState {
    Idle,
    LocalDescribing,
    AwaitingRemote,
    RemoteApplied,
    Connected,
    Failed(String),
}

impl NegotiationState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, NegotiationState::Connected | NegotiationState::Failed(_))
    }
}

impl fmt::Display for NegotiationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NegotiationState::Idle => write!(f, "idle"),
            NegotiationState::LocalDescribing => write!(f, "local-describing"),
            NegotiationState::AwaitingRemote => write!(f, "awaiting-remote"),
            NegotiationState::RemoteApplied => write!(f, "remote-applied"),
            NegotiationState::Connected => write!(f, "connected"),
            NegotiationState::Failed(reason) => write!(f, "failed: {reason}"),
        }
    }
}
