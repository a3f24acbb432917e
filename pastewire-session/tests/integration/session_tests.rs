use std::sync::Arc;
use std::time::Duration;

use pastewire_session::{ConnectionStatus, Direction, Session};
use tokio::sync::mpsc;

use crate::integration::{init_tracing, local_config};
use crate::utils::{MockPresentation, MockTelemetry, PresentationEvent};

async fn next_payload(
    events: &mut mpsc::UnboundedReceiver<PresentationEvent>,
    timeout_ms: u64,
) -> String {
    tokio::time::timeout(Duration::from_millis(timeout_ms), async {
        while let Some(event) = events.recv().await {
            if let PresentationEvent::Payload(text) = event {
                return text;
            }
        }
        panic!("presentation stream ended before a payload was published");
    })
    .await
    .expect("timed out waiting for a published payload")
}

async fn next_inbound(
    events: &mut mpsc::UnboundedReceiver<PresentationEvent>,
    timeout_ms: u64,
) -> String {
    tokio::time::timeout(Duration::from_millis(timeout_ms), async {
        while let Some(event) = events.recv().await {
            if let PresentationEvent::Message(Direction::Inbound, text) = event {
                return text;
            }
        }
        panic!("presentation stream ended before an inbound message arrived");
    })
    .await
    .expect("timed out waiting for an inbound message")
}

#[tokio::test]
async fn session_actor_drives_a_full_chat() {
    init_tracing();

    let (a_output, mut a_events) = MockPresentation::new();
    let (b_output, mut b_events) = MockPresentation::new();

    let (side_a, a_session) = Session::connect(
        local_config(),
        Arc::new(a_output),
        Arc::new(MockTelemetry::new()),
    )
    .await
    .expect("failed to build session a");
    let (side_b, b_session) = Session::connect(
        local_config(),
        Arc::new(b_output),
        Arc::new(MockTelemetry::new()),
    )
    .await
    .expect("failed to build session b");

    let a_task = tokio::spawn(a_session.run());
    let b_task = tokio::spawn(b_session.run());

    // A offers, the payload travels to B by "copy and paste".
    side_a.initiate().await;
    let offer_text = next_payload(&mut a_events, 10_000).await;
    assert_eq!(side_a.local_payload(), Some(offer_text.clone()));

    side_b.accept_remote(offer_text).await;
    let answer_text = next_payload(&mut b_events, 10_000).await;
    side_a.accept_remote(answer_text).await;

    // Completion is confirmed by the aggregate status both sides surface.
    let start = std::time::Instant::now();
    loop {
        if side_a.connection_status() == ConnectionStatus::Connected
            && side_b.connection_status() == ConnectionStatus::Connected
        {
            break;
        }
        assert!(
            start.elapsed() < Duration::from_secs(15),
            "sessions never reached connected"
        );
        tokio::time::sleep(Duration::from_millis(50)).await;
    }

    // The channel may open a moment after the connection; retry until the
    // first send lands in the outbound log.
    let mut sent = false;
    for _ in 0..50 {
        let log = side_a.message_log().await;
        if log.iter().any(|entry| entry.direction == Direction::Outbound) {
            sent = true;
            break;
        }
        side_a.send_message("ping".to_string()).await;
        tokio::time::sleep(Duration::from_millis(200)).await;
    }
    assert!(sent, "message never made it onto the channel");

    assert_eq!(next_inbound(&mut b_events, 10_000).await, "ping");

    // B answers over the same channel.
    side_b.send_message("pong".to_string()).await;
    assert_eq!(next_inbound(&mut a_events, 10_000).await, "pong");

    // Ordered logs on both ends.
    let a_log = side_a.message_log().await;
    assert_eq!(a_log.first().map(|e| e.direction), Some(Direction::Outbound));
    assert!(a_log.iter().any(|e| e.direction == Direction::Inbound && e.text == "pong"));

    let b_log = side_b.message_log().await;
    assert!(b_log.iter().any(|e| e.direction == Direction::Inbound && e.text == "ping"));
    assert!(b_log.iter().any(|e| e.direction == Direction::Outbound && e.text == "pong"));

    side_a.close().await;
    side_b.close().await;
    let _ = a_task.await;
    let _ = b_task.await;
}

#[tokio::test]
async fn send_without_a_channel_surfaces_an_error() {
    init_tracing();

    let (output, mut events) = MockPresentation::new();
    let (handle, session) = Session::connect(
        local_config(),
        Arc::new(output),
        Arc::new(MockTelemetry::new()),
    )
    .await
    .expect("failed to build session");

    let task = tokio::spawn(session.run());

    handle.send_message("into the void".to_string()).await;

    let error = tokio::time::timeout(Duration::from_secs(5), async {
        while let Some(event) = events.recv().await {
            if let PresentationEvent::Error(message) = event {
                return message;
            }
        }
        panic!("presentation stream ended without an error");
    })
    .await
    .expect("timed out waiting for the error");

    assert!(error.contains("not open"));
    assert!(handle.message_log().await.is_empty());

    handle.close().await;
    let _ = task.await;
}
