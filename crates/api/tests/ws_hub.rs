//! Tests for the connection hub's fan-out and eviction rules.

use agora_api::ws::{DeliveryReport, Hub, PushEvent};
use axum::extract::ws::Message;

fn text(n: u32) -> Message {
    Message::Text(format!("msg-{n}").into())
}

#[tokio::test]
async fn register_and_unregister() {
    let hub = Hub::new(4);
    let _rx = hub.register("a".into(), 1).await;
    let _rx2 = hub.register("b".into(), 1).await;
    let _rx3 = hub.register("c".into(), 2).await;

    assert_eq!(hub.connection_count().await, 3);
    assert_eq!(hub.user_connection_count(1).await, 2);

    assert!(hub.unregister("a").await);
    assert!(!hub.unregister("a").await);
    assert_eq!(hub.user_connection_count(1).await, 1);
}

#[tokio::test]
async fn broadcast_reaches_only_the_target_user() {
    let hub = Hub::new(4);
    let mut mine = hub.register("a".into(), 1).await;
    let mut theirs = hub.register("b".into(), 2).await;

    let report = hub.broadcast_to_user(1, text(1)).await;
    assert_eq!(
        report,
        DeliveryReport {
            delivered: 1,
            evicted: 0
        }
    );
    assert!(mine.try_recv().is_ok());
    assert!(theirs.try_recv().is_err());
}

#[tokio::test]
async fn full_buffer_evicts_only_that_connection() {
    let hub = Hub::new(1);
    let _stalled = hub.register("stalled".into(), 1).await;
    let mut healthy = hub.register("healthy".into(), 1).await;

    assert_eq!(hub.broadcast_to_user(1, text(1)).await.delivered, 2);
    healthy.try_recv().unwrap();

    let report = hub.broadcast_to_user(1, text(2)).await;
    assert_eq!(report.delivered, 1);
    assert_eq!(report.evicted, 1);
    assert_eq!(hub.user_connection_count(1).await, 1);
    assert_eq!(healthy.try_recv().unwrap(), text(2));
}

#[tokio::test]
async fn closed_receiver_is_dropped_on_next_send() {
    let hub = Hub::new(4);
    let rx = hub.register("gone".into(), 1).await;
    drop(rx);

    let report = hub.broadcast_to_user(1, text(1)).await;
    assert_eq!(report.evicted, 1);
    assert_eq!(hub.connection_count().await, 0);
}

#[tokio::test]
async fn eviction_closes_the_channel() {
    let hub = Hub::new(1);
    let mut stalled = hub.register("stalled".into(), 1).await;
    hub.broadcast_to_user(1, text(1)).await;
    hub.broadcast_to_user(1, text(2)).await;

    // The buffered frame still drains, then the channel reports closed.
    assert_eq!(stalled.recv().await, Some(text(1)));
    assert_eq!(stalled.recv().await, None);
}

#[tokio::test]
async fn push_serializes_tagged_event() {
    let hub = Hub::default();
    let mut rx = hub.register("a".into(), 7).await;

    hub.push(7, &PushEvent::UnreadCount { count: 3 }).await.unwrap();

    match rx.try_recv().unwrap() {
        Message::Text(body) => {
            let value: serde_json::Value = serde_json::from_str(body.as_str()).unwrap();
            assert_eq!(value, serde_json::json!({ "type": "unread_count", "count": 3 }));
        }
        other => panic!("expected text frame, got {other:?}"),
    }
}

#[tokio::test]
async fn ping_all_reaches_everyone() {
    let hub = Hub::new(4);
    let mut a = hub.register("a".into(), 1).await;
    let mut b = hub.register("b".into(), 2).await;

    assert_eq!(hub.ping_all().await.delivered, 2);
    assert!(matches!(a.try_recv().unwrap(), Message::Ping(_)));
    assert!(matches!(b.try_recv().unwrap(), Message::Ping(_)));
}

#[tokio::test]
async fn disconnect_user_and_shutdown() {
    let hub = Hub::new(4);
    let mut a = hub.register("a".into(), 1).await;
    let _b = hub.register("b".into(), 2).await;

    assert_eq!(hub.disconnect_user(1).await, 1);
    assert!(matches!(a.recv().await, Some(Message::Close(None))));
    assert_eq!(a.recv().await, None);

    hub.shutdown_all().await;
    assert_eq!(hub.connection_count().await, 0);
}
