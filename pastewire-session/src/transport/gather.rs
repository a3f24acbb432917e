//! Bounded candidate collection for one negotiation round.

use crate::error::SessionError;
use crate::transport::ConnectionHandle;
use pastewire_core::model::CandidateInit;
use std::time::Duration;
use tracing::debug;

/// Wait until the connection reports candidate gathering exhausted, then
/// return everything discovered this round, in receipt order.
///
/// Fails with [`SessionError::GatherTimeout`] if the completion signal does
/// not arrive within `deadline`; no partial candidate set is returned. The
/// completion subscription is a receiver dropped on every exit path. One call
/// per negotiation round; overlapping calls on the same connection are a
/// caller error.
pub async fn gather(
    connection: &ConnectionHandle,
    deadline: Duration,
) -> Result<Vec<CandidateInit>, SessionError> {
    let mut complete = connection.gathering_complete().await;

    match tokio::time::timeout(deadline, complete.recv()).await {
        Ok(_) => {
            let candidates = connection.take_candidates().await;
            debug!(count = candidates.len(), "candidate gathering complete");
            Ok(candidates)
        }
        Err(_) => Err(SessionError::GatherTimeout { waited: deadline }),
    }
}
