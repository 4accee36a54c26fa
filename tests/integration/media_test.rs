//! Media upload integration tests

use axum::http::StatusCode;
use axum_test::multipart::{MultipartForm, Part};
use serde_json::json;

use crate::common::TestApp;
use chatbloom::shared::media::UploadResponse;
use chatbloom::shared::message::{MediaType, SendMessageResponse};

fn file_form(bytes: &[u8], file_name: &str, mime: &str) -> MultipartForm {
    MultipartForm::new().add_part(
        "file",
        Part::bytes(bytes.to_vec()).file_name(file_name).mime_type(mime),
    )
}

#[tokio::test]
async fn test_upload_then_share_in_message() {
    let app = TestApp::new().await;
    let ada = app.user("ada");
    let room = app.create_room(&ada, json!({})).await;

    let response = app
        .server
        .post("/api/media")
        .authorization_bearer(&ada.token)
        .multipart(file_form(b"\x89PNG fake image", "fern.png", "image/png"))
        .await;

    assert_eq!(response.status_code(), StatusCode::CREATED);
    let upload = response.json::<UploadResponse>();
    assert_eq!(upload.media_type, MediaType::Image);
    assert_eq!(upload.size, 15);
    let prefix = format!("http://127.0.0.1:3000/media/{}/", ada.id);
    assert_contains!(upload.url, &prefix);
    assert!(upload.url.ends_with(".png"));

    let served = app
        .server
        .get(upload.url.trim_start_matches("http://127.0.0.1:3000"))
        .await;
    assert_eq!(served.status_code(), StatusCode::OK);
    assert_eq!(served.as_bytes().as_ref(), b"\x89PNG fake image");

    let sent = app
        .server
        .post("/api/messages")
        .authorization_bearer(&ada.token)
        .json(&json!({
            "room_id": room.id,
            "media_url": upload.url,
            "media_type": "image",
        }))
        .await;
    assert_eq!(sent.status_code(), StatusCode::CREATED);
    let sent = sent.json::<SendMessageResponse>();
    assert_eq!(sent.message.message.media_type, Some(MediaType::Image));
    assert_eq!(sent.message.message.content, "");
}

#[tokio::test]
async fn test_guest_upload_is_forbidden() {
    let app = TestApp::new().await;
    let guest = app.guest();

    let response = app
        .server
        .post("/api/media")
        .authorization_bearer(&guest.token)
        .multipart(file_form(b"voice", "note.ogg", "audio/ogg"))
        .await;

    assert_api_error!(response, StatusCode::FORBIDDEN, "create an account");
}

#[tokio::test]
async fn test_upload_rejects_unsupported_types() {
    let app = TestApp::new().await;
    let ada = app.user("ada");

    for (name, mime) in [("x.svg", "image/svg+xml"), ("notes.txt", "text/plain")] {
        let response = app
            .server
            .post("/api/media")
            .authorization_bearer(&ada.token)
            .multipart(file_form(b"<svg/>", name, mime))
            .await;
        assert_api_error!(response, StatusCode::BAD_REQUEST, "image and audio");
    }
}

#[tokio::test]
async fn test_upload_rejects_oversize_and_missing_files() {
    let app = TestApp::with_config(|config| config.max_upload_bytes = 1024).await;
    let ada = app.user("ada");

    let oversize = app
        .server
        .post("/api/media")
        .authorization_bearer(&ada.token)
        .multipart(file_form(&[7u8; 4096], "big.png", "image/png"))
        .await;
    assert_api_error!(oversize, StatusCode::BAD_REQUEST);

    let no_file = app
        .server
        .post("/api/media")
        .authorization_bearer(&ada.token)
        .multipart(MultipartForm::new().add_text("caption", "hello"))
        .await;
    assert_api_error!(no_file, StatusCode::BAD_REQUEST, "Missing file");

    let empty = app
        .server
        .post("/api/media")
        .authorization_bearer(&ada.token)
        .multipart(file_form(b"", "empty.png", "image/png"))
        .await;
    assert_api_error!(empty, StatusCode::BAD_REQUEST, "empty");
}

#[tokio::test]
async fn test_non_multipart_upload_is_json_bad_request() {
    let app = TestApp::new().await;
    let ada = app.user("ada");

    let response = app
        .server
        .post("/api/media")
        .authorization_bearer(&ada.token)
        .json(&json!({ "file": "not a form" }))
        .await;

    assert_api_error!(response, StatusCode::BAD_REQUEST, "multipart/form-data");
}
