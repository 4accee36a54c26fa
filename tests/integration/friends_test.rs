//! Friend request API integration tests

use axum::http::StatusCode;
use serde_json::json;
use uuid::Uuid;

use crate::common::{TestApp, TestUser};
use chatbloom::shared::friendship::{FriendList, Friendship, FriendshipStatus};
use chatbloom::shared::message::DeletedResponse;

async fn request_friend(app: &TestApp, from: &TestUser, to: Uuid) -> axum_test::TestResponse {
    app.server
        .post("/api/friends")
        .authorization_bearer(&from.token)
        .json(&json!({ "user_id": to }))
        .await
}

async fn friend_list(app: &TestApp, user: &TestUser) -> FriendList {
    app.server
        .get("/api/friends")
        .authorization_bearer(&user.token)
        .await
        .json::<FriendList>()
}

#[tokio::test]
async fn test_request_and_accept() {
    let app = TestApp::new().await;
    let ada = app.signed_in("ada").await;
    let bob = app.signed_in("bob").await;

    let response = request_friend(&app, &ada, bob.id).await;
    assert_eq!(response.status_code(), StatusCode::CREATED);
    let request = response.json::<Friendship>();
    assert_eq!(request.status, FriendshipStatus::Pending);
    assert_eq!(request.requester_id, ada.id);

    let ada_view = friend_list(&app, &ada).await;
    assert_eq!(ada_view.outgoing.len(), 1);
    assert_eq!(ada_view.outgoing[0].username, "bob");
    let bob_view = friend_list(&app, &bob).await;
    assert_eq!(bob_view.incoming.len(), 1);
    assert!(bob_view.friends.is_empty());

    let accepted = app
        .server
        .post(&format!("/api/friends/{}/accept", request.id))
        .authorization_bearer(&bob.token)
        .await;
    assert_eq!(accepted.status_code(), StatusCode::OK);
    let accepted = accepted.json::<Friendship>();
    assert_eq!(accepted.status, FriendshipStatus::Accepted);
    assert!(accepted.responded_at.is_some());

    let ada_view = friend_list(&app, &ada).await;
    assert_eq!(ada_view.friends.len(), 1);
    assert_eq!(ada_view.friends[0].user_id, bob.id);
    assert!(ada_view.outgoing.is_empty());
}

#[tokio::test]
async fn test_only_addressee_can_accept() {
    let app = TestApp::new().await;
    let ada = app.signed_in("ada").await;
    let bob = app.signed_in("bob").await;
    let request = request_friend(&app, &ada, bob.id).await.json::<Friendship>();

    let response = app
        .server
        .post(&format!("/api/friends/{}/accept", request.id))
        .authorization_bearer(&ada.token)
        .await;

    assert_api_error!(response, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_duplicate_requests_conflict_in_either_direction() {
    let app = TestApp::new().await;
    let ada = app.signed_in("ada").await;
    let bob = app.signed_in("bob").await;
    request_friend(&app, &ada, bob.id)
        .await
        .assert_status(StatusCode::CREATED);

    let again = request_friend(&app, &ada, bob.id).await;
    assert_api_error!(again, StatusCode::CONFLICT);

    let reverse = request_friend(&app, &bob, ada.id).await;
    assert_api_error!(reverse, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_request_validation() {
    let app = TestApp::new().await;
    let ada = app.signed_in("ada").await;
    let guest = app.guest();

    let to_self = request_friend(&app, &ada, ada.id).await;
    assert_api_error!(to_self, StatusCode::BAD_REQUEST, "yourself");

    let unknown = request_friend(&app, &ada, Uuid::new_v4()).await;
    assert_api_error!(unknown, StatusCode::NOT_FOUND);

    let from_guest = request_friend(&app, &guest, ada.id).await;
    assert_api_error!(from_guest, StatusCode::FORBIDDEN, "create an account");
}

#[tokio::test]
async fn test_decline_removes_request() {
    let app = TestApp::new().await;
    let ada = app.signed_in("ada").await;
    let bob = app.signed_in("bob").await;
    let request = request_friend(&app, &ada, bob.id).await.json::<Friendship>();

    let declined = app
        .server
        .post(&format!("/api/friends/{}/decline", request.id))
        .authorization_bearer(&bob.token)
        .await
        .json::<DeletedResponse>();
    assert!(declined.deleted);

    assert_eq!(friend_list(&app, &ada).await, FriendList::default());

    let accept_after = app
        .server
        .post(&format!("/api/friends/{}/accept", request.id))
        .authorization_bearer(&bob.token)
        .await;
    assert_api_error!(accept_after, StatusCode::NOT_FOUND);

    // A declined request can be sent again.
    request_friend(&app, &ada, bob.id)
        .await
        .assert_status(StatusCode::CREATED);
}

#[tokio::test]
async fn test_remove_friend() {
    let app = TestApp::new().await;
    let ada = app.signed_in("ada").await;
    let bob = app.signed_in("bob").await;
    let carol = app.signed_in("carol").await;
    let request = request_friend(&app, &ada, bob.id).await.json::<Friendship>();
    app.server
        .post(&format!("/api/friends/{}/accept", request.id))
        .authorization_bearer(&bob.token)
        .await
        .assert_status_ok();

    let outsider = app
        .server
        .delete(&format!("/api/friends/{}", request.id))
        .authorization_bearer(&carol.token)
        .await;
    assert_api_error!(outsider, StatusCode::FORBIDDEN);

    let removed = app
        .server
        .delete(&format!("/api/friends/{}", request.id))
        .authorization_bearer(&bob.token)
        .await
        .json::<DeletedResponse>();
    assert!(removed.deleted);
    assert!(friend_list(&app, &ada).await.friends.is_empty());
}
