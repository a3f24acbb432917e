mod payload;
mod session_id;

pub use payload::{CandidateInit, DescriptionInit, OfferPayload, SdpKind};
pub use session_id::SessionId;
