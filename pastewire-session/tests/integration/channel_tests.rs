use std::sync::Arc;
use std::time::{Duration, Instant};

use pastewire_core::model::SessionId;
use pastewire_session::{ChannelBridge, ConnectionHandle, SessionError, gather};
use tokio::sync::mpsc;

use crate::integration::{init_tracing, local_config};

#[tokio::test]
async fn send_before_open_is_rejected() {
    init_tracing();
    let (event_tx, _event_rx) = mpsc::channel(8);
    let connection = ConnectionHandle::new(SessionId::new(), &local_config(), event_tx)
        .await
        .expect("failed to create peer connection");

    // Freshly created channel on an unconnected session: not open yet.
    let channel = connection.open_channel().await.expect("open failed");
    let bridge = ChannelBridge::new(Arc::clone(&channel));

    assert!(!bridge.is_open());
    assert!(matches!(
        bridge.send("too early").await,
        Err(SessionError::ChannelNotOpen)
    ));

    let _ = connection.close().await;
}

#[tokio::test]
async fn gather_times_out_when_gathering_never_starts() {
    init_tracing();
    let (event_tx, _event_rx) = mpsc::channel(8);
    let connection = ConnectionHandle::new(SessionId::new(), &local_config(), event_tx)
        .await
        .expect("failed to create peer connection");

    // No local description was set, so gathering never begins and the
    // completion signal never fires.
    let started = Instant::now();
    let err = gather(&connection, Duration::from_millis(200))
        .await
        .unwrap_err();

    assert!(matches!(err, SessionError::GatherTimeout { .. }));
    assert!(
        started.elapsed() < Duration::from_secs(1),
        "timeout fired far later than the deadline"
    );

    let _ = connection.close().await;
}
