//! Change feed integration tests
//!
//! Every committed insert or delete is published on the room's channel,
//! and the SSE endpoint streams it to subscribers.

use std::time::Duration;

use axum::http::StatusCode;
use futures_util::StreamExt;
use serde_json::json;
use tokio::sync::broadcast::error::TryRecvError;
use tokio::time::timeout;

use crate::common::TestApp;
use chatbloom::shared::message::{SendBatchResponse, SendMessageResponse};
use chatbloom::shared::{ChangeEvent, ChangeType};

#[tokio::test]
async fn test_send_and_delete_are_published() {
    let app = TestApp::new().await;
    let ada = app.user("ada");
    let room = app.create_room(&ada, json!({})).await;
    let mut rx = app.state.feed.subscribe(room.id);

    let sent = app.send_text(&ada, room.id, "ping").await.json::<SendMessageResponse>();
    let insert = assert_ok!(rx.try_recv());
    assert_eq!(insert.event_type, ChangeType::Insert);
    assert_eq!(insert.room_id, room.id);
    assert_eq!(insert.record_id, sent.message.id());
    assert_eq!(insert.actor_id, ada.id);

    app.server
        .delete(&format!("/api/messages/{}", sent.message.id()))
        .authorization_bearer(&ada.token)
        .await
        .assert_status_ok();
    let delete = assert_ok!(rx.try_recv());
    assert_eq!(delete.event_type, ChangeType::Delete);
    assert_eq!(delete.record_id, sent.message.id());
}

#[tokio::test]
async fn test_batch_publishes_in_order() {
    let app = TestApp::new().await;
    let ada = app.user("ada");
    let room = app.create_room(&ada, json!({})).await;
    let mut rx = app.state.feed.subscribe(room.id);

    let results = app
        .server
        .post("/api/messages/batch")
        .authorization_bearer(&ada.token)
        .json(&json!({
            "room_id": room.id,
            "items": [
                { "temp_id": uuid::Uuid::new_v4(), "content": "first" },
                { "temp_id": uuid::Uuid::new_v4(), "content": "second" },
            ],
        }))
        .await
        .json::<SendBatchResponse>()
        .results;

    for result in &results {
        assert_eq!(assert_ok!(rx.try_recv()).record_id, result.message.id());
    }
    assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));
}

#[tokio::test]
async fn test_rejected_writes_publish_nothing() {
    let app = TestApp::new().await;
    let ada = app.user("ada");
    let bob = app.user("bob");
    let room = app.create_room(&ada, json!({})).await;
    let sent = app.send_text(&ada, room.id, "keep").await.json::<SendMessageResponse>();
    let mut rx = app.state.feed.subscribe(room.id);

    app.send_text(&ada, room.id, " ")
        .await
        .assert_status(StatusCode::BAD_REQUEST);
    app.server
        .delete(&format!("/api/messages/{}", sent.message.id()))
        .authorization_bearer(&bob.token)
        .await
        .assert_status(StatusCode::FORBIDDEN);

    assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));
}

#[tokio::test]
async fn test_private_room_feed_requires_access() {
    let app = TestApp::new().await;
    let ada = app.user("ada");
    let bob = app.user("bob");
    let room = app.create_room(&ada, json!({ "is_private": true })).await;

    let response = app
        .server
        .get(&format!("/api/rooms/{}/changes", room.id))
        .authorization_bearer(&bob.token)
        .await;

    assert_api_error!(response, StatusCode::FORBIDDEN);
    assert_eq!(app.state.feed.subscriber_count(room.id), 0);
}

#[tokio::test]
async fn test_sse_stream_with_query_token() {
    let app = TestApp::new().await;
    let ada = app.user("ada");
    let room = app.create_room(&ada, json!({})).await;
    let (base_url, server) = app.spawn_live().await;

    let response = assert_ok!(
        reqwest::get(format!(
            "{}/api/rooms/{}/changes?access_token={}",
            base_url, room.id, ada.token
        ))
        .await
    );
    assert_eq!(response.status().as_u16(), 200);
    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert_contains!(content_type, "text/event-stream");
    assert_eq!(app.state.feed.subscriber_count(room.id), 1);

    let sent = app.send_text(&ada, room.id, "streamed").await.json::<SendMessageResponse>();

    let mut body = response.bytes_stream();
    let mut received = String::new();
    let read = timeout(Duration::from_secs(5), async {
        while let Some(chunk) = body.next().await {
            received.push_str(&String::from_utf8_lossy(&assert_ok!(chunk)));
            if received.contains("\n\n") && received.contains("data:") {
                break;
            }
        }
    })
    .await;
    assert!(read.is_ok(), "No event within 5s, got: {}", received);

    assert_contains!(received, "event: insert");
    assert_contains!(received, &format!("id: {}", sent.message.id()));
    let data = received
        .lines()
        .find_map(|line| line.strip_prefix("data:"))
        .map(str::trim)
        .unwrap_or_default();
    let event: ChangeEvent = assert_ok!(serde_json::from_str(data));
    assert_eq!(event.record_id, sent.message.id());

    server.abort();
}
