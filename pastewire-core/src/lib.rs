pub mod codec;
pub mod model;

pub use codec::{DecodeError, decode, encode};
pub use model::{CandidateInit, DescriptionInit, OfferPayload, SdpKind, SessionId};
