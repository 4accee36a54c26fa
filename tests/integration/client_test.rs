//! Client library against a live server
//!
//! Drives `RoomSession`, `ChangeFeed` and `ChatApi` over real HTTP, the
//! way a room view does.

use std::time::Duration;

use serde_json::json;
use tokio::time::timeout;
use uuid::Uuid;

use crate::common::{TestApp, TestUser};
use chatbloom::backend::rooms::db::is_member;
use chatbloom::client::session::{ACCOUNT_REQUIRED_NOTICE, SEND_FAILED_NOTICE};
use chatbloom::client::{ChangeFeed, ChatApi, ClientConfig, RoomSession, TranscriptEntry};
use chatbloom::shared::message::ListMessagesQuery;
use chatbloom::shared::ChangeType;

fn api(base_url: &str, user: &TestUser) -> ChatApi {
    ChatApi::new(ClientConfig::new(base_url), user.token.clone())
}

fn delivered_contents(entries: &[TranscriptEntry]) -> Vec<String> {
    entries
        .iter()
        .filter_map(|entry| match entry {
            TranscriptEntry::Delivered(message) => Some(message.message.content.clone()),
            _ => None,
        })
        .collect()
}

#[tokio::test]
async fn test_two_sessions_exchange_messages() {
    let app = TestApp::new().await;
    let ada = app.user("ada");
    let bob = app.user("bob");
    let room = app.create_room(&ada, json!({})).await;
    let (base_url, server) = app.spawn_live().await;

    let bob_api = api(&base_url, &bob);
    let mut bob_session = assert_ok!(RoomSession::open(bob_api.clone(), room.id, None).await);
    assert!(bob_session.joined().newly_joined);
    bob_session.history_loaded().await;
    let mut bob_feed = assert_ok!(ChangeFeed::connect(&bob_api, room.id).await);

    let mut ada_session = assert_ok!(RoomSession::open(api(&base_url, &ada), room.id, None).await);
    assert!(!ada_session.joined().newly_joined);
    ada_session.history_loaded().await;

    let temp_id = ada_session.send("hello bob").await;
    assert!(temp_id.is_some());
    let ada_view = ada_session.transcript().await;
    assert_eq!(ada_view.pending_count(), 0);
    assert_eq!(delivered_contents(ada_view.entries()), vec!["hello bob"]);

    let event = assert_ok!(timeout(Duration::from_secs(5), bob_feed.recv()).await).expect("feed closed");
    assert_eq!(event.event_type, ChangeType::Insert);
    assert!(assert_ok!(bob_session.handle_change(&event).await));
    // Redelivery of the same insert renders nothing new.
    assert!(!assert_ok!(bob_session.handle_change(&event).await));
    assert_eq!(delivered_contents(bob_session.transcript().await.entries()), vec!["hello bob"]);

    let message_id = event.record_id;
    assert_ok!(api(&base_url, &ada).delete_message(message_id).await);
    let delete = assert_ok!(timeout(Duration::from_secs(5), bob_feed.recv()).await).expect("feed closed");
    assert_eq!(delete.event_type, ChangeType::Delete);
    assert!(assert_ok!(bob_session.handle_change(&delete).await));
    assert!(bob_session.transcript().await.is_empty());

    assert_ok!(ada_session.close().await);
    assert_ok!(bob_session.close().await);
    assert!(!assert_ok!(is_member(app.pool(), room.id, bob.id).await));
    server.abort();
}

#[tokio::test]
async fn test_burst_goes_out_as_one_ordered_batch() {
    let app = TestApp::new().await;
    let ada = app.user("ada");
    let room = app.create_room(&ada, json!({})).await;
    let (base_url, server) = app.spawn_live().await;
    let ada_api = api(&base_url, &ada);
    let mut rx = app.state.feed.subscribe(room.id);

    let mut session = assert_ok!(RoomSession::open(ada_api.clone(), room.id, None).await);
    session.history_loaded().await;
    for content in ["one", "two", "three", "four"] {
        session.send(content).await;
    }
    session.flush().await;

    let view = session.transcript().await;
    assert_eq!(view.pending_count(), 0);
    assert_eq!(delivered_contents(view.entries()), vec!["one", "two", "three", "four"]);

    let stored = assert_ok!(ada_api.list_messages(room.id, &ListMessagesQuery::default()).await);
    let contents: Vec<&str> = stored.iter().map(|m| m.message.content.as_str()).collect();
    assert_eq!(contents, vec!["one", "two", "three", "four"]);

    let mut published = Vec::new();
    while let Ok(event) = rx.try_recv() {
        published.push(event.record_id);
    }
    let stored_ids: Vec<Uuid> = stored.iter().map(|m| m.id()).collect();
    assert_eq!(published, stored_ids);

    assert_ok!(session.close().await);
    server.abort();
}

#[tokio::test]
async fn test_history_loads_on_open() {
    let app = TestApp::new().await;
    let ada = app.user("ada");
    let bob = app.user("bob");
    let room = app.create_room(&ada, json!({})).await;
    for content in ["earlier", "later"] {
        app.send_text(&ada, room.id, content).await;
    }
    let (base_url, server) = app.spawn_live().await;

    let mut session = assert_ok!(RoomSession::open(api(&base_url, &bob), room.id, None).await);
    session.history_loaded().await;

    assert_eq!(
        delivered_contents(session.transcript().await.entries()),
        vec!["earlier", "later"]
    );
    server.abort();
}

#[tokio::test]
async fn test_private_room_join_through_invite() {
    let app = TestApp::new().await;
    let ada = app.user("ada");
    let bob = app.user("bob");
    let room = app.create_room(&ada, json!({ "is_private": true })).await;
    let invite = app
        .server
        .post(&format!("/api/rooms/{}/invites", room.id))
        .authorization_bearer(&ada.token)
        .json(&json!({ "max_uses": 1 }))
        .await
        .json::<chatbloom::shared::RoomInvite>();
    let (base_url, server) = app.spawn_live().await;

    let refused = RoomSession::open(api(&base_url, &bob), room.id, None).await;
    match refused {
        Err(e) => assert_eq!(e.status(), Some(403)),
        Ok(_) => panic!("Expected 403 without invite"),
    }

    let session = assert_ok!(RoomSession::open(api(&base_url, &bob), room.id, Some(&invite.token)).await);
    assert_eq!(session.joined().member_count, 2);

    // Unload path: the beacon removes the membership without awaiting a response body.
    assert_ok!(session.close_on_unload().await);
    assert!(!assert_ok!(is_member(app.pool(), room.id, bob.id).await));
    server.abort();
}

#[tokio::test]
async fn test_guest_media_refusal_surfaces_account_notice() {
    let app = TestApp::new().await;
    let ada = app.user("ada");
    let guest = app.guest();
    let room = app.create_room(&ada, json!({})).await;
    let (base_url, server) = app.spawn_live().await;
    let guest_api = api(&base_url, &guest);

    let request = chatbloom::shared::message::SendMessageRequest {
        room_id: room.id,
        media_url: Some(format!("{}/media/x.png", base_url)),
        media_type: Some(chatbloom::shared::MediaType::Image),
        ..Default::default()
    };
    match guest_api.send_message(&request).await {
        Err(e) => {
            assert_eq!(e.status(), Some(403));
            assert!(e.requires_account());
        }
        Ok(_) => panic!("Expected guest media to be refused"),
    }

    // Text from a guest session still goes through.
    let mut session = assert_ok!(RoomSession::open(guest_api, room.id, None).await);
    session.history_loaded().await;
    session.send("just text").await;
    let view = session.transcript().await;
    assert_eq!(delivered_contents(view.entries()), vec!["just text"]);
    assert!(!view.entries().iter().any(|entry| matches!(
        entry,
        TranscriptEntry::System { text, .. } if text == ACCOUNT_REQUIRED_NOTICE || text == SEND_FAILED_NOTICE
    )));
    server.abort();
}
