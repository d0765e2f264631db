//! Then steps for the GitHub sync BDD tests.

use pr_pilot::persistence::MirrorStore;
use pr_pilot::session::UserId;
use rstest_bdd_macros::then;
use serde_json::Value;

use crate::github_sync_bdd_state::{SyncState, unquote};

fn user_id(value: &str) -> UserId {
    UserId::new(unquote(value)).unwrap_or_else(|| panic!("user id {value} should be valid"))
}

fn response_body(sync_state: &SyncState) -> Value {
    sync_state
        .body
        .get()
        .unwrap_or_else(|| panic!("no response recorded"))
}

#[then("the dispatcher responds with status {status:u16}")]
fn assert_status(sync_state: &SyncState, status: u16) {
    let actual = sync_state
        .status
        .get()
        .unwrap_or_else(|| panic!("no response recorded"));
    let body = sync_state.body.get();
    assert_eq!(actual, status, "unexpected status; body: {body:?}");
}

#[then("the error message is {message}")]
fn assert_error_message(sync_state: &SyncState, message: String) {
    let body = response_body(sync_state);
    assert_eq!(body["error"], Value::from(unquote(&message)));
}

#[then("the response reports a count of {count:u64}")]
fn assert_count(sync_state: &SyncState, count: u64) {
    let body = response_body(sync_state);
    assert_eq!(body["success"], Value::Bool(true));
    assert_eq!(body["count"], Value::from(count));
}

#[then("the first listed pull request is number {number:i64}")]
fn assert_first_pull_request(sync_state: &SyncState, number: i64) {
    let body = response_body(sync_state);
    assert_eq!(body["pull_requests"][0]["number"], Value::from(number));
}

#[then("the profile of {user} is connected to {login} with token {token}")]
fn assert_profile_connected(sync_state: &SyncState, user: String, login: String, token: String) {
    let profile = sync_state
        .mirror()
        .profile(&user_id(&user))
        .unwrap_or_else(|error| panic!("profile read should succeed: {error}"))
        .unwrap_or_else(|| panic!("profile should exist"));

    assert_eq!(profile.github_username, Some(unquote(&login)));
    assert_eq!(profile.github_access_token, Some(unquote(&token)));
}

#[then("no profile exists for {user}")]
fn assert_no_profile(sync_state: &SyncState, user: String) {
    let profile = sync_state
        .mirror()
        .profile(&user_id(&user))
        .unwrap_or_else(|error| panic!("profile read should succeed: {error}"));
    assert_eq!(profile, None);
}

#[then("user {user} has {count:usize} mirrored repositories")]
fn assert_mirrored_repositories(sync_state: &SyncState, user: String, count: usize) {
    let repositories = sync_state
        .mirror()
        .repositories(&user_id(&user))
        .unwrap_or_else(|error| panic!("repository read should succeed: {error}"));
    assert_eq!(repositories.len(), count);
    let stars: Vec<Option<i64>> = repositories.iter().map(|row| row.stars_count).collect();
    let mut sorted = stars.clone();
    sorted.sort_by(|left, right| right.cmp(left));
    assert_eq!(stars, sorted, "repositories should be most starred first");
}

#[then("the GitHub mocks are satisfied")]
fn verify_mocks(sync_state: &SyncState) {
    let runtime = sync_state.shared_runtime();
    sync_state
        .server
        .with_ref(|server| runtime.block_on(server.verify()))
        .unwrap_or_else(|| panic!("mock server not initialised"));
}
