mod negotiation;
mod state;

pub use negotiation::NegotiationEngine;
pub use state::NegotiationState;
