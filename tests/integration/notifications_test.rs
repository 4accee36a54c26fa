//! Bulk notification API integration tests

use axum::http::StatusCode;
use serde_json::json;
use uuid::Uuid;

use crate::common::TestApp;
use chatbloom::shared::notification::BulkNotificationResponse;

async fn stored_for(app: &TestApp, recipient: Uuid) -> i64 {
    assert_ok!(
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM notifications WHERE recipient_id = ?")
            .bind(recipient)
            .fetch_one(app.pool())
            .await
    )
}

#[tokio::test]
async fn test_bulk_dispatch_skips_sender_duplicates_and_unknown_users() {
    let app = TestApp::new().await;
    let ada = app.signed_in("ada").await;
    let bob = app.signed_in("bob").await;
    let carol = app.signed_in("carol").await;
    let room = app.create_room(&ada, json!({})).await;

    let response = app
        .server
        .post("/api/notifications/bulk")
        .authorization_bearer(&ada.token)
        .json(&json!({
            "recipient_ids": [bob.id, carol.id, bob.id, ada.id, Uuid::new_v4()],
            "kind": "mention",
            "room_id": room.id,
        }))
        .await;

    assert_eq!(response.status_code(), StatusCode::CREATED);
    assert_eq!(response.json::<BulkNotificationResponse>().created, 2);
    assert_eq!(stored_for(&app, bob.id).await, 1);
    assert_eq!(stored_for(&app, carol.id).await, 1);
    assert_eq!(stored_for(&app, ada.id).await, 0);
}

#[tokio::test]
async fn test_bulk_dispatch_validation() {
    let app = TestApp::new().await;
    let ada = app.signed_in("ada").await;
    let bob = app.signed_in("bob").await;

    let no_recipients = app
        .server
        .post("/api/notifications/bulk")
        .authorization_bearer(&ada.token)
        .json(&json!({ "recipient_ids": [], "kind": "mention" }))
        .await;
    assert_api_error!(no_recipients, StatusCode::BAD_REQUEST);

    let blank_kind = app
        .server
        .post("/api/notifications/bulk")
        .authorization_bearer(&ada.token)
        .json(&json!({ "recipient_ids": [bob.id], "kind": "  " }))
        .await;
    assert_api_error!(blank_kind, StatusCode::BAD_REQUEST);

    let unknown_room = app
        .server
        .post("/api/notifications/bulk")
        .authorization_bearer(&ada.token)
        .json(&json!({ "recipient_ids": [bob.id], "kind": "mention", "room_id": Uuid::new_v4() }))
        .await;
    assert_api_error!(unknown_room, StatusCode::NOT_FOUND);

    assert_eq!(stored_for(&app, bob.id).await, 0);
}
