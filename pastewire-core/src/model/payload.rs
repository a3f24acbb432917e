use serde::{Deserialize, Serialize};
use std::fmt;

/// The transferable negotiation payload: one side's session description plus
/// every ICE candidate it gathered. This is the object a human copies from one
/// peer and pastes into the other.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OfferPayload {
    /// `None` means "not yet described"; it is encoded as an explicit `null`
    /// so the receiver can tell it apart from a malformed payload.
    pub description: Option<DescriptionInit>,
    pub candidates: Vec<CandidateInit>,
}

impl OfferPayload {
    pub fn new(description: DescriptionInit, candidates: Vec<CandidateInit>) -> Self {
        Self {
            description: Some(description),
            candidates,
        }
    }

    pub fn empty() -> Self {
        Self {
            description: None,
            candidates: Vec::new(),
        }
    }
}

/// A session description tagged as the opening offer or the reciprocal answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DescriptionInit {
    #[serde(rename = "type")]
    pub kind: SdpKind,
    pub sdp: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SdpKind {
    Offer,
    Answer,
}

impl fmt::Display for SdpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SdpKind::Offer => write!(f, "offer"),
            SdpKind::Answer => write!(f, "answer"),
        }
    }
}

/// One discovered network path. Field names match the browser
/// `RTCIceCandidateInit` JSON so payloads interoperate with web peers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateInit {
    pub candidate: String,
    #[serde(rename = "sdpMid", default)]
    pub sdp_mid: Option<String>,
    #[serde(rename = "sdpMLineIndex", default)]
    pub sdp_mline_index: Option<u16>,
    #[serde(rename = "usernameFragment", default)]
    pub username_fragment: Option<String>,
}
