use crate::engine::NegotiationState;
use pastewire_core::model::SessionId;
use tracing::{info, warn};

/// One structured observability event per named transition or failure.
#[derive(Debug, Clone)]
pub enum TelemetryEvent {
    Transition {
        session: SessionId,
        state: NegotiationState,
    },
    Failure {
        session: SessionId,
        operation: &'static str,
        reason: String,
    },
}

/// Side channel for out-of-band diagnostics. Consumers must not assume any
/// ordering relative to the operations that produced the events; the engine
/// never lets a sink affect control flow.
pub trait TelemetrySink: Send + Sync {
    fn record(&self, event: TelemetryEvent);
}

/// Default sink: forwards every event to `tracing`.
#[derive(Debug, Default, Clone)]
pub struct TracingTelemetry;

impl TelemetrySink for TracingTelemetry {
    fn record(&self, event: TelemetryEvent) {
        match event {
            TelemetryEvent::Transition { session, state } => {
                info!(%session, %state, "negotiation transition");
            }
            TelemetryEvent::Failure {
                session,
                operation,
                reason,
            } => {
                warn!(%session, operation, %reason, "negotiation failure");
            }
        }
    }
}
