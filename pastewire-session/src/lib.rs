pub mod channel;
pub mod engine;
pub mod error;
pub mod session;
pub mod telemetry;
pub mod transport;

pub use channel::ChannelBridge;
pub use engine::{NegotiationEngine, NegotiationState};
pub use error::SessionError;
pub use session::{Direction, LogEntry, PresentationOutput, Session, SessionCommand, SessionHandle};
pub use telemetry::{TelemetryEvent, TelemetrySink, TracingTelemetry};
pub use transport::{ConnectionHandle, ConnectionStatus, TransportConfig, TransportEvent, gather};
