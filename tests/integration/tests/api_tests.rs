//! API Integration Tests
//!
//! Each test spawns its own server on the in-memory backends.
//!
//! Run with: cargo test -p integration-tests --test api_tests

use chrono::{TimeZone, Utc};
use integration_tests::{assert_error, assert_json, fixtures::*, TestServer};
use reqwest::{multipart, StatusCode};
use serde_json::json;

async fn create(server: &TestServer, body: &NewMessage) -> MessageBody {
    let response = server.post("/api/messages", body).await.unwrap();
    assert_json(response, StatusCode::CREATED).await.unwrap()
}

// ============================================================================
// Health Check Tests
// ============================================================================

#[tokio::test]
async fn test_health_check() {
    let server = TestServer::start().await.expect("Failed to start server");

    let response = server.get("/health").await.unwrap();
    assert!(response.headers().contains_key("x-request-id"));
    let body: serde_json::Value = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_health_ready() {
    let server = TestServer::start().await.expect("Failed to start server");

    let response = server.get("/health/ready").await.unwrap();
    let body: serde_json::Value = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(body["status"], "ready");
    assert_eq!(body["checks"]["store"], "healthy");
    assert_eq!(body["checks"]["viewer_storage"], "healthy");
}

// ============================================================================
// Store API Tests
// ============================================================================

#[tokio::test]
async fn test_create_and_read_message() {
    let server = TestServer::start().await.unwrap();

    let created = create(&server, &NewMessage::text("  Launch day  ")).await;
    assert_eq!(created.content.as_deref(), Some("Launch day"));
    assert_eq!(created.kind, "text");
    assert_eq!(created.views, 0);
    assert_eq!(created.reactions, Reactions::default());

    let response = server
        .get(&format!("/api/messages/{}", created.id))
        .await
        .unwrap();
    let fetched: MessageBody = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(fetched.id, created.id);
    assert_eq!(fetched.author, "Admin");

    let response = server
        .get(&format!("/api/messages?id={}", created.id))
        .await
        .unwrap();
    let by_query: MessageBody = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(by_query.id, created.id);
}

#[tokio::test]
async fn test_list_is_ascending_by_created_at() {
    let server = TestServer::start().await.unwrap();
    let later = Utc.with_ymd_and_hms(2024, 5, 2, 9, 0, 0).unwrap();
    let earlier = Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap();

    create(&server, &NewMessage::text("second").at(later)).await;
    create(&server, &NewMessage::text("first").at(earlier)).await;

    let response = server.get("/api/messages").await.unwrap();
    let messages: Vec<MessageBody> = assert_json(response, StatusCode::OK).await.unwrap();
    let contents: Vec<_> = messages.iter().filter_map(|m| m.content.as_deref()).collect();
    assert_eq!(contents, vec!["first", "second"]);
}

#[tokio::test]
async fn test_unknown_message_is_404() {
    let server = TestServer::start().await.unwrap();

    let response = server.get("/api/messages/999999").await.unwrap();
    let code = assert_error(response, StatusCode::NOT_FOUND).await.unwrap();
    assert_eq!(code, "UNKNOWN_MESSAGE");

    let response = server.get("/api/messages/not-a-number").await.unwrap();
    let code = assert_error(response, StatusCode::BAD_REQUEST).await.unwrap();
    assert_eq!(code, "INVALID_PATH_PARAMETER");
}

#[tokio::test]
async fn test_create_requires_content_or_media() {
    let server = TestServer::start().await.unwrap();

    let body = NewMessage {
        author: "Admin".to_string(),
        content: Some("   ".to_string()),
        ..NewMessage::default()
    };
    let response = server.post("/api/messages", &body).await.unwrap();
    assert_error(response, StatusCode::BAD_REQUEST).await.unwrap();

    let response = server
        .post("/api/messages", &json!({ "content": "no author" }))
        .await
        .unwrap();
    let code = assert_error(response, StatusCode::BAD_REQUEST).await.unwrap();
    assert_eq!(code, "INVALID_BODY");
}

#[tokio::test]
async fn test_patch_updates_fields_but_not_counters() {
    let server = TestServer::start().await.unwrap();
    let created = create(&server, &NewMessage::unique()).await;

    let response = server
        .patch(
            "/api/messages",
            &json!({ "id": created.id, "content": "edited", "views": 500 }),
        )
        .await
        .unwrap();
    let updated: MessageBody = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(updated.content.as_deref(), Some("edited"));
    assert_eq!(updated.views, 0);
    assert_eq!(updated.created_at, created.created_at);
}

#[tokio::test]
async fn test_patch_without_id_is_400() {
    let server = TestServer::start().await.unwrap();

    let response = server
        .patch("/api/messages", &json!({ "content": "orphan" }))
        .await
        .unwrap();
    let code = assert_error(response, StatusCode::BAD_REQUEST).await.unwrap();
    assert_eq!(code, "INVALID_ARGUMENT");
}

#[tokio::test]
async fn test_delete_by_query_and_body() {
    let server = TestServer::start().await.unwrap();
    let first = create(&server, &NewMessage::unique()).await;
    let second = create(&server, &NewMessage::unique()).await;

    let response = server
        .delete(&format!("/api/messages?id={}", first.id))
        .await
        .unwrap();
    let body: serde_json::Value = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(body["success"], true);

    let response = server
        .delete_json("/api/messages", &json!({ "id": second.id }))
        .await
        .unwrap();
    assert_json::<serde_json::Value>(response, StatusCode::OK)
        .await
        .unwrap();

    let response = server.get(&format!("/api/messages/{}", first.id)).await.unwrap();
    assert_error(response, StatusCode::NOT_FOUND).await.unwrap();

    let response = server.delete("/api/messages").await.unwrap();
    assert_error(response, StatusCode::BAD_REQUEST).await.unwrap();

    let response = server
        .delete(&format!("/api/messages?id={}", first.id))
        .await
        .unwrap();
    assert_error(response, StatusCode::NOT_FOUND).await.unwrap();
}

#[tokio::test]
async fn test_counter_deltas() {
    let server = TestServer::start().await.unwrap();
    let created = create(&server, &NewMessage::unique()).await;
    let path = format!("/api/messages/{}/counters", created.id);

    let response = server
        .post(&path, &json!({ "views": 1, "reactions": { "fire": 1 } }))
        .await
        .unwrap();
    let body: MessageBody = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(body.views, 1);
    assert_eq!(body.reactions.fire, 1);

    let response = server
        .post(&path, &json!({ "reactions": { "fire": -1, "heart": -1 } }))
        .await
        .unwrap();
    let body: MessageBody = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(body.reactions.fire, 0);
    assert_eq!(body.reactions.heart, 0);

    let response = server.post(&path, &json!({ "views": 2 })).await.unwrap();
    assert_error(response, StatusCode::BAD_REQUEST).await.unwrap();

    let response = server.post(&path, &json!({})).await.unwrap();
    assert_error(response, StatusCode::BAD_REQUEST).await.unwrap();

    let response = server
        .post("/api/messages/424242/counters", &json!({ "views": 1 }))
        .await
        .unwrap();
    assert_error(response, StatusCode::NOT_FOUND).await.unwrap();
}

// ============================================================================
// Viewer Tests
// ============================================================================

#[tokio::test]
async fn test_reaction_toggle_cycle() {
    let server = TestServer::start().await.unwrap();
    let created = create(&server, &NewMessage::unique()).await;
    let base = format!("/api/viewers/tab-1/messages/{}/reactions", created.id);

    let response = server.post_empty(&format!("{base}/fire")).await.unwrap();
    let toggle: ReactionToggle = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(toggle.message_id, created.id);
    assert_eq!(toggle.my_reaction.as_deref(), Some("fire"));
    assert_eq!(toggle.reactions.fire, 1);

    let response = server.post_empty(&format!("{base}/heart")).await.unwrap();
    let toggle: ReactionToggle = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(toggle.my_reaction.as_deref(), Some("heart"));
    assert_eq!(toggle.reactions.fire, 0);
    assert_eq!(toggle.reactions.heart, 1);

    server.settle().await;
    let response = server.get(&format!("/api/messages/{}", created.id)).await.unwrap();
    let stored: MessageBody = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(stored.reactions.fire, 0);
    assert_eq!(stored.reactions.heart, 1);

    let response = server.post_empty(&format!("{base}/heart")).await.unwrap();
    let toggle: ReactionToggle = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(toggle.my_reaction, None);
    assert_eq!(toggle.reactions, Reactions::default());
}

#[tokio::test]
async fn test_two_viewers_reactions_both_land() {
    let server = TestServer::start().await.unwrap();
    let created = create(&server, &NewMessage::unique()).await;

    for viewer in ["tab-1", "tab-2"] {
        let response = server
            .post_empty(&format!(
                "/api/viewers/{viewer}/messages/{}/reactions/fire",
                created.id
            ))
            .await
            .unwrap();
        assert_json::<ReactionToggle>(response, StatusCode::OK)
            .await
            .unwrap();
    }

    server.settle().await;
    let response = server.get(&format!("/api/messages/{}", created.id)).await.unwrap();
    let stored: MessageBody = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(stored.reactions.fire, 2);
}

#[tokio::test]
async fn test_reaction_rejects_bad_input() {
    let server = TestServer::start().await.unwrap();
    let created = create(&server, &NewMessage::unique()).await;

    let response = server
        .post_empty(&format!("/api/viewers/tab-1/messages/{}/reactions/shrug", created.id))
        .await
        .unwrap();
    let code = assert_error(response, StatusCode::BAD_REQUEST).await.unwrap();
    assert_eq!(code, "INVALID_PATH_PARAMETER");

    let response = server
        .post_empty("/api/viewers/tab-1/messages/777777/reactions/fire")
        .await
        .unwrap();
    assert_error(response, StatusCode::NOT_FOUND).await.unwrap();
}

#[tokio::test]
async fn test_views_count_once_per_viewer() {
    let server = TestServer::start().await.unwrap();
    let created = create(&server, &NewMessage::unique()).await;
    let view = |viewer: &str| format!("/api/viewers/{viewer}/messages/{}/view", created.id);

    let response = server.post_empty(&view("tab-1")).await.unwrap();
    let first: ViewResult = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(first.status, "registered");
    assert_eq!(first.views, Some(1));

    let response = server.post_empty(&view("tab-1")).await.unwrap();
    let again: ViewResult = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(again.status, "already_viewed");
    assert_eq!(again.views, None);

    let response = server.post_empty(&view("tab-2")).await.unwrap();
    let other: ViewResult = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(other.message_id, created.id);
    assert_eq!(other.views, Some(2));

    let response = server
        .post_empty("/api/viewers/tab-1/messages/888888/view")
        .await
        .unwrap();
    assert_error(response, StatusCode::NOT_FOUND).await.unwrap();
}

#[tokio::test]
async fn test_feed_groups_days_and_tokenizes_links() {
    let server = TestServer::start().await.unwrap();
    let day_one = Utc.with_ymd_and_hms(2024, 6, 1, 8, 0, 0).unwrap();
    let day_two = Utc.with_ymd_and_hms(2024, 6, 2, 8, 0, 0).unwrap();

    let linked = create(
        &server,
        &NewMessage::text("visit https://a.com today").at(day_one),
    )
    .await;
    let plain = create(&server, &NewMessage::text("no links").at(day_two)).await;

    server
        .post_empty(&format!("/api/viewers/tab-9/messages/{}/reactions/flex", linked.id))
        .await
        .unwrap();
    server
        .post_empty(&format!("/api/viewers/tab-9/messages/{}/view", plain.id))
        .await
        .unwrap();
    server.settle().await;

    let response = server.get("/api/viewers/tab-9/feed").await.unwrap();
    let feed: Feed = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(feed.days.len(), 2);
    assert_eq!(feed.days[0].date, "2024-06-01");
    assert_eq!(feed.days[1].date, "2024-06-02");

    let item = feed.find(&linked.id).unwrap();
    assert_eq!(
        item.segments,
        vec![
            Segment::Literal {
                text: "visit ".to_string()
            },
            Segment::Link {
                text: "https://a.com".to_string(),
                href: "https://a.com".to_string()
            },
            Segment::Literal {
                text: " today".to_string()
            },
        ]
    );
    assert_eq!(item.my_reaction.as_deref(), Some("flex"));
    assert_eq!(item.message.reactions.flex, 1);
    assert!(!item.viewed);

    let item = feed.find(&plain.id).unwrap();
    assert_eq!(item.segments.len(), 1);
    assert!(item.viewed);
    assert_eq!(item.my_reaction, None);

    let response = server.get("/api/viewers/other/feed").await.unwrap();
    let fresh: Feed = assert_json(response, StatusCode::OK).await.unwrap();
    assert!(fresh.items().all(|item| !item.viewed && item.my_reaction.is_none()));
}

#[tokio::test]
async fn test_invalid_viewer_id() {
    let server = TestServer::start().await.unwrap();

    let response = server.get("/api/viewers/no%20spaces/feed").await.unwrap();
    let code = assert_error(response, StatusCode::BAD_REQUEST).await.unwrap();
    assert_eq!(code, "INVALID_PATH_PARAMETER");
}

// ============================================================================
// Media Tests
// ============================================================================

fn png_part(bytes: Vec<u8>) -> multipart::Part {
    multipart::Part::bytes(bytes)
        .file_name("photo.PNG")
        .mime_str("image/png")
        .unwrap()
}

#[tokio::test]
async fn test_upload_and_serve() {
    let server = TestServer::start().await.unwrap();

    let form = multipart::Form::new().part("file", png_part(vec![137, 80, 78, 71]));
    let response = server.post_multipart("/api/upload", form).await.unwrap();
    let upload: Upload = assert_json(response, StatusCode::OK).await.unwrap();
    assert!(upload.url.starts_with("/media/"));
    assert!(upload.url.ends_with(".png"));

    let response = server.get(&upload.url).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.bytes().await.unwrap().to_vec(), vec![137, 80, 78, 71]);
}

#[tokio::test]
async fn test_upload_rejections() {
    let server = TestServer::start().await.unwrap();

    let form = multipart::Form::new().text("note", "no file here");
    let response = server.post_multipart("/api/upload", form).await.unwrap();
    assert_error(response, StatusCode::BAD_REQUEST).await.unwrap();

    let oversized = vec![0_u8; 1024 * 1024 + 1];
    let form = multipart::Form::new().part("file", png_part(oversized));
    let response = server.post_multipart("/api/upload", form).await.unwrap();
    let code = assert_error(response, StatusCode::BAD_REQUEST).await.unwrap();
    assert_eq!(code, "FILE_TOO_LARGE");
    assert!(!server.upload_dir().exists());
}

#[tokio::test]
async fn test_create_with_attached_file() {
    let server = TestServer::start().await.unwrap();

    let form = multipart::Form::new()
        .text("message", json!({ "author": "Admin" }).to_string())
        .part(
            "file",
            multipart::Part::bytes(vec![0, 0, 0, 24])
                .file_name("clip.mp4")
                .mime_str("video/mp4")
                .unwrap(),
        );
    let response = server.post_multipart("/api/messages", form).await.unwrap();
    let created: MessageBody = assert_json(response, StatusCode::CREATED).await.unwrap();
    assert_eq!(created.kind, "video");
    assert_eq!(created.content, None);

    let url = created.media_url.unwrap();
    assert!(url.starts_with("/media/") && url.ends_with(".mp4"));
}
