//! Tests for the typed client against a mocked dispatcher.

use std::sync::Arc;
use std::time::Duration;

use rstest::rstest;
use serde_json::json;
use url::Url;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::test_support::RecordingNotices;
use super::{ClientError, Notice, NoticeVariant, PilotClient};
use crate::github::AuthorizeTarget;
use crate::session::{Session, UserId};

fn authorize_target() -> AuthorizeTarget {
    AuthorizeTarget {
        oauth_base: "https://github.com".to_owned(),
        client_id: "Iv1.client".to_owned(),
        public_origin: "https://app.example".to_owned(),
    }
}

fn signed_in(server: &MockServer, notices: &Arc<RecordingNotices>) -> PilotClient {
    let session = Session::new(UserId::new("user-1").expect("user id should be valid"));
    PilotClient::new(&server.uri(), authorize_target(), Arc::clone(notices) as _)
        .expect("client should build")
        .with_session(session)
}

fn repositories_body() -> serde_json::Value {
    json!({ "success": true, "count": 2, "repositories": [] })
}

#[tokio::test]
async fn signed_out_calls_fail_before_any_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    let notices = Arc::new(RecordingNotices::default());
    let client = PilotClient::new(&server.uri(), authorize_target(), Arc::clone(&notices) as _)
        .expect("client should build");

    let error = client
        .sync_repositories("gho_token")
        .await
        .expect_err("signed-out call should fail");

    assert_eq!(error, ClientError::NotAuthenticated);
    assert_eq!(error.to_string(), "User not authenticated");
    assert!(notices.take().is_empty());
    assert!(!client.is_loading());
}

#[tokio::test]
async fn repository_sync_emits_success_notice() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/github-oauth"))
        .and(body_partial_json(json!({
            "action": "fetch_repositories",
            "userId": "user-1",
            "accessToken": "gho_token"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(repositories_body()))
        .expect(1)
        .mount(&server)
        .await;
    let notices = Arc::new(RecordingNotices::default());
    let client = signed_in(&server, &notices);

    let synced = client
        .sync_repositories("gho_token")
        .await
        .expect("sync should succeed");

    assert_eq!(synced.count, 2);
    assert_eq!(
        notices.take(),
        vec![Notice {
            title: "Repositories synced".to_owned(),
            description: "Successfully synced 2 repositories".to_owned(),
            variant: NoticeVariant::Default,
        }]
    );
}

#[tokio::test]
async fn service_error_emits_generic_failure_notice() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/github-oauth"))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(json!({ "error": "Repository not found" })),
        )
        .mount(&server)
        .await;
    let notices = Arc::new(RecordingNotices::default());
    let client = signed_in(&server, &notices);

    let error = client
        .sync_pull_requests("gho_token", "o/r")
        .await
        .expect_err("sync should fail");

    assert_eq!(
        error,
        ClientError::Service {
            status: 404,
            message: "Repository not found".to_owned(),
        }
    );
    assert_eq!(
        notices.take(),
        vec![Notice {
            title: "Sync failed".to_owned(),
            description: "Failed to sync pull requests. Please try again.".to_owned(),
            variant: NoticeVariant::Destructive,
        }]
    );
    assert!(!client.is_loading(), "loading must reset after failure");
}

#[tokio::test]
async fn exchange_names_the_connected_login() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/github-oauth"))
        .and(body_partial_json(json!({ "action": "exchange_code", "code": "abc" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "user": { "id": 1, "login": "octocat", "avatar_url": null, "name": null, "email": null },
            "access_token": "gho_fresh"
        })))
        .mount(&server)
        .await;
    let notices = Arc::new(RecordingNotices::default());
    let client = signed_in(&server, &notices);

    let account = client
        .complete_callback(
            &Url::parse("https://app.example/github-callback?code=abc").expect("url"),
        )
        .await
        .expect("exchange should succeed");

    assert_eq!(account.access_token, "gho_fresh");
    let recorded = notices.take();
    assert_eq!(
        recorded.first().map(|notice| notice.description.as_str()),
        Some("Successfully connected as octocat")
    );
}

#[rstest]
#[case(
    "https://app.example/github-callback?error=access_denied",
    "GitHub authorization was cancelled or failed"
)]
#[case(
    "https://app.example/github-callback",
    "No authorization code received from GitHub"
)]
#[tokio::test]
async fn unusable_callback_stops_before_exchange(#[case] raw: &str, #[case] message: &str) {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    let notices = Arc::new(RecordingNotices::default());
    let client = signed_in(&server, &notices);

    let error = client
        .complete_callback(&Url::parse(raw).expect("url should parse"))
        .await
        .expect_err("callback should fail");

    assert_eq!(error.to_string(), message);
}

#[tokio::test]
async fn comment_posts_all_fields() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/github-oauth"))
        .and(body_partial_json(json!({
            "action": "comment_on_pr",
            "repoFullName": "o/r",
            "prNumber": 5,
            "comment": "lgtm"
        })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "success": true, "comment": { "id": 9 } })),
        )
        .expect(1)
        .mount(&server)
        .await;
    let notices = Arc::new(RecordingNotices::default());
    let client = signed_in(&server, &notices);

    let posted = client
        .comment_on_pull_request("gho_token", "o/r", 5, "lgtm")
        .await
        .expect("comment should succeed");

    assert_eq!(posted.comment, json!({ "id": 9 }));
    assert_eq!(
        notices.take().first().map(|notice| notice.title.as_str()),
        Some("Comment posted")
    );
}

#[tokio::test]
async fn loading_is_set_while_in_flight() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(repositories_body())
                .set_delay(Duration::from_millis(300)),
        )
        .mount(&server)
        .await;
    let notices = Arc::new(RecordingNotices::default());
    let client = signed_in(&server, &notices);

    let (result, observed) = tokio::join!(client.sync_repositories("gho_token"), async {
        tokio::time::sleep(Duration::from_millis(100)).await;
        client.is_loading()
    });

    result.expect("sync should succeed");
    assert!(observed, "loading should be set mid-flight");
    assert!(!client.is_loading(), "loading should clear afterwards");
}

#[tokio::test]
async fn missing_profile_loads_as_none() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/profiles/user-1"))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(json!({ "error": "Profile not found" })),
        )
        .mount(&server)
        .await;
    let notices = Arc::new(RecordingNotices::default());
    let client = signed_in(&server, &notices);

    let profile = client.load_profile().await.expect("load should succeed");

    assert!(profile.is_none());
}

#[tokio::test]
async fn calls_keep_base_prefix_and_escape_user_id() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/profiles/team%2Falice%3Fadmin"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "team/alice?admin",
            "github_username": "alice",
            "github_avatar_url": null,
            "github_access_token": "gho_token",
            "connected": true,
            "created_at": "2026-01-01 00:00:00",
            "updated_at": "2026-01-01 00:00:00"
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/github-oauth"))
        .respond_with(ResponseTemplate::new(200).set_body_json(repositories_body()))
        .expect(1)
        .mount(&server)
        .await;
    let notices = Arc::new(RecordingNotices::default());
    let session = Session::new(UserId::new("team/alice?admin").expect("user id should be valid"));
    let client = PilotClient::new(
        &format!("{}/api/", server.uri()),
        authorize_target(),
        Arc::clone(&notices) as _,
    )
    .expect("client should build")
    .with_session(session);

    let profile = client
        .load_profile()
        .await
        .expect("load should succeed")
        .expect("profile should exist");
    client
        .sync_repositories("gho_token")
        .await
        .expect("sync should succeed");

    assert_eq!(profile.id, "team/alice?admin");
}

#[test]
fn authorize_url_targets_the_callback_page() {
    let notices: Arc<RecordingNotices> = Arc::default();
    let client = PilotClient::new("http://localhost:8080", authorize_target(), notices)
        .expect("client should build");

    let url = client.authorize_url().expect("url should build");

    assert!(
        url.query_pairs()
            .any(|(key, value)| key == "redirect_uri"
                && value == "https://app.example/github-callback")
    );
}
