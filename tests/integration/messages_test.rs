//! Message API integration tests
//!
//! Single and batch send (plain and gzip), history paging, lookup and
//! author-only deletion.

use axum::http::{header, HeaderValue, StatusCode};
use pretty_assertions::assert_eq;
use serde_json::json;
use uuid::Uuid;

use crate::common::{TestApp, TestUser};
use chatbloom::backend::messaging::db::get_message;
use chatbloom::client::gzip_json;
use chatbloom::shared::message::{
    BatchItem, DeletedResponse, MessageWithAuthor, SendBatchRequest, SendBatchResponse, SendMessageResponse,
};

fn batch(room_id: Uuid, contents: &[&str]) -> SendBatchRequest {
    SendBatchRequest {
        room_id,
        items: contents
            .iter()
            .map(|content| BatchItem {
                temp_id: Uuid::new_v4(),
                content: content.to_string(),
                media_url: None,
                media_type: None,
            })
            .collect(),
    }
}

async fn history(app: &TestApp, user: &TestUser, room_id: Uuid, query: &str) -> Vec<MessageWithAuthor> {
    let response = app
        .server
        .get(&format!("/api/rooms/{}/messages{}", room_id, query))
        .authorization_bearer(&user.token)
        .await;
    response.assert_status_ok();
    response.json::<Vec<MessageWithAuthor>>()
}

#[tokio::test]
async fn test_send_message_echoes_temp_id() {
    let app = TestApp::new().await;
    let ada = app.user("ada");
    let room = app.create_room(&ada, json!({})).await;
    let temp_id = Uuid::new_v4();

    let response = app
        .server
        .post("/api/messages")
        .authorization_bearer(&ada.token)
        .json(&json!({
            "room_id": room.id,
            "content": "  hello garden  ",
            "temp_id": temp_id,
            "client_sent_at": "2026-01-01T00:00:00Z",
        }))
        .await;

    assert_eq!(response.status_code(), StatusCode::CREATED);
    let sent = response.json::<SendMessageResponse>();
    assert_eq!(sent.temp_id, Some(temp_id));
    assert!(sent.client_sent_at.is_some());
    assert_eq!(sent.message.message.content, "hello garden");
    assert_eq!(sent.message.message.author_id, ada.id);
    assert_eq!(sent.message.author_username, "ada");
    assert!(!sent.message.author_is_guest);
}

#[tokio::test]
async fn test_guest_can_send_text() {
    let app = TestApp::new().await;
    let ada = app.user("ada");
    let guest = app.guest();
    let room = app.create_room(&ada, json!({})).await;

    let response = app.send_text(&guest, room.id, "hi from a guest").await;

    assert_eq!(response.status_code(), StatusCode::CREATED);
    let sent = response.json::<SendMessageResponse>();
    assert!(sent.message.author_is_guest);
    assert!(sent.message.author_username.starts_with("guest"));
}

#[tokio::test]
async fn test_guest_cannot_send_media() {
    let app = TestApp::new().await;
    let ada = app.user("ada");
    let guest = app.guest();
    let room = app.create_room(&ada, json!({})).await;

    let response = app
        .server
        .post("/api/messages")
        .authorization_bearer(&guest.token)
        .json(&json!({
            "room_id": room.id,
            "media_url": "http://127.0.0.1:3000/media/x.png",
            "media_type": "image",
        }))
        .await;

    assert_api_error!(response, StatusCode::FORBIDDEN, "create an account");
    assert!(history(&app, &ada, room.id, "").await.is_empty());
}

#[tokio::test]
async fn test_send_rejects_empty_message() {
    let app = TestApp::new().await;
    let ada = app.user("ada");
    let room = app.create_room(&ada, json!({})).await;

    let response = app.send_text(&ada, room.id, "   ").await;

    assert_api_error!(response, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_send_to_unknown_room() {
    let app = TestApp::new().await;
    let ada = app.user("ada");

    let response = app.send_text(&ada, Uuid::new_v4(), "hello?").await;

    assert_api_error!(response, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_outsider_cannot_post_to_private_room() {
    let app = TestApp::new().await;
    let ada = app.user("ada");
    let bob = app.user("bob");
    let room = app.create_room(&ada, json!({ "is_private": true })).await;

    let response = app.send_text(&bob, room.id, "let me in").await;

    assert_api_error!(response, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_batch_preserves_order_and_temp_ids() {
    let app = TestApp::new().await;
    let ada = app.user("ada");
    let room = app.create_room(&ada, json!({})).await;
    let request = batch(room.id, &["one", "two", "three"]);

    let response = app
        .server
        .post("/api/messages/batch")
        .authorization_bearer(&ada.token)
        .json(&request)
        .await;

    assert_eq!(response.status_code(), StatusCode::CREATED);
    let results = response.json::<SendBatchResponse>().results;
    assert_eq!(results.len(), 3);
    for (item, result) in request.items.iter().zip(&results) {
        assert_eq!(result.temp_id, item.temp_id);
        assert_eq!(result.message.message.content, item.content);
    }

    let stored: Vec<String> = history(&app, &ada, room.id, "")
        .await
        .into_iter()
        .map(|m| m.message.content)
        .collect();
    assert_eq!(stored, vec!["one", "two", "three"]);
}

#[tokio::test]
async fn test_gzip_batch_is_accepted() {
    let app = TestApp::new().await;
    let ada = app.user("ada");
    let room = app.create_room(&ada, json!({})).await;
    let request = batch(room.id, &["compressed", "bloom"]);
    let body = assert_ok!(gzip_json(&request));

    let response = app
        .server
        .post("/api/messages/batch")
        .authorization_bearer(&ada.token)
        .add_header(header::CONTENT_TYPE, HeaderValue::from_static("application/json"))
        .add_header(header::CONTENT_ENCODING, HeaderValue::from_static("gzip"))
        .bytes(body.into())
        .await;

    assert_eq!(response.status_code(), StatusCode::CREATED);
    let results = response.json::<SendBatchResponse>().results;
    let temp_ids: Vec<Uuid> = results.iter().map(|r| r.temp_id).collect();
    let expected: Vec<Uuid> = request.items.iter().map(|i| i.temp_id).collect();
    assert_eq!(temp_ids, expected);
}

#[tokio::test]
async fn test_invalid_batch_stores_nothing() {
    let app = TestApp::new().await;
    let ada = app.user("ada");
    let room = app.create_room(&ada, json!({})).await;

    let with_blank = batch(room.id, &["fine", "  "]);
    let response = app
        .server
        .post("/api/messages/batch")
        .authorization_bearer(&ada.token)
        .json(&with_blank)
        .await;
    assert_api_error!(response, StatusCode::BAD_REQUEST);

    let contents: Vec<&str> = vec!["x"; 51];
    let oversized = batch(room.id, &contents);
    let response = app
        .server
        .post("/api/messages/batch")
        .authorization_bearer(&ada.token)
        .json(&oversized)
        .await;
    assert_api_error!(response, StatusCode::BAD_REQUEST, "at most 50");

    let mut duplicated = batch(room.id, &["a", "b"]);
    duplicated.items[1].temp_id = duplicated.items[0].temp_id;
    let response = app
        .server
        .post("/api/messages/batch")
        .authorization_bearer(&ada.token)
        .json(&duplicated)
        .await;
    assert_api_error!(response, StatusCode::BAD_REQUEST, "Duplicate");

    assert!(history(&app, &ada, room.id, "").await.is_empty());
}

#[tokio::test]
async fn test_history_pages_backwards() {
    let app = TestApp::new().await;
    let ada = app.user("ada");
    let room = app.create_room(&ada, json!({})).await;
    let mut ids = Vec::new();
    for n in 1..=5 {
        let sent = app.send_text(&ada, room.id, &format!("m{}", n)).await;
        ids.push(sent.json::<SendMessageResponse>().message.id());
    }

    let latest: Vec<Uuid> = history(&app, &ada, room.id, "?limit=2")
        .await
        .iter()
        .map(MessageWithAuthor::id)
        .collect();
    assert_eq!(latest, vec![ids[3], ids[4]]);

    let earlier: Vec<Uuid> = history(&app, &ada, room.id, &format!("?limit=2&before={}", ids[3]))
        .await
        .iter()
        .map(MessageWithAuthor::id)
        .collect();
    assert_eq!(earlier, vec![ids[1], ids[2]]);
}

#[tokio::test]
async fn test_get_message() {
    let app = TestApp::new().await;
    let ada = app.user("ada");
    let room = app.create_room(&ada, json!({})).await;
    let sent = app.send_text(&ada, room.id, "find me").await.json::<SendMessageResponse>();

    let found = app
        .server
        .get(&format!("/api/messages/{}", sent.message.id()))
        .authorization_bearer(&ada.token)
        .await
        .json::<MessageWithAuthor>();
    assert_eq!(found.id(), sent.message.id());
    assert_eq!(found.message.content, "find me");
    assert_eq!(found.author_username, "ada");

    let missing = app
        .server
        .get(&format!("/api/messages/{}", Uuid::new_v4()))
        .authorization_bearer(&ada.token)
        .await;
    assert_api_error!(missing, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_cannot_delete_someone_elses_message() {
    let app = TestApp::new().await;
    let ada = app.user("ada");
    let bob = app.user("bob");
    let room = app.create_room(&ada, json!({})).await;
    let sent = app.send_text(&ada, room.id, "mine").await.json::<SendMessageResponse>();

    let response = app
        .server
        .delete(&format!("/api/messages/{}", sent.message.id()))
        .authorization_bearer(&bob.token)
        .await;

    assert_api_error!(response, StatusCode::FORBIDDEN, "your own messages");
    let still_there = assert_ok!(get_message(app.pool(), sent.message.id()).await);
    assert!(still_there.is_some());
}

#[tokio::test]
async fn test_delete_own_message() {
    let app = TestApp::new().await;
    let ada = app.user("ada");
    let room = app.create_room(&ada, json!({})).await;
    let sent = app.send_text(&ada, room.id, "oops").await.json::<SendMessageResponse>();

    let response = app
        .server
        .delete(&format!("/api/messages/{}", sent.message.id()))
        .authorization_bearer(&ada.token)
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let deleted = response.json::<DeletedResponse>();
    assert_eq!(deleted.id, sent.message.id());
    assert!(deleted.deleted);
    assert!(assert_ok!(get_message(app.pool(), sent.message.id()).await).is_none());

    let again = app
        .server
        .delete(&format!("/api/messages/{}", sent.message.id()))
        .authorization_bearer(&ada.token)
        .await;
    assert_api_error!(again, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_missing_room_id_is_json_bad_request() {
    let app = TestApp::new().await;
    let ada = app.user("ada");

    let response = app
        .server
        .post("/api/messages")
        .authorization_bearer(&ada.token)
        .json(&json!({ "content": "hi" }))
        .await;

    assert_api_error!(response, StatusCode::BAD_REQUEST, "room_id");
    assert_api_error!(response, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_invalid_page_limit_is_json_bad_request() {
    let app = TestApp::new().await;
    let ada = app.user("ada");
    let room = app.create_room(&ada, json!({})).await;

    let response = app
        .server
        .get(&format!("/api/rooms/{}/messages?limit=abc", room.id))
        .authorization_bearer(&ada.token)
        .await;

    assert_api_error!(response, StatusCode::BAD_REQUEST, "query string");
}
