//! When steps for the GitHub sync BDD tests.

use pr_pilot::sync::DispatchRequest;
use rstest_bdd_macros::when;

use crate::github_sync_bdd_state::{SyncState, unquote};

#[when("user {user} posts the exchange_code action with code {code}")]
fn post_exchange_code(sync_state: &SyncState, user: String, code: String) {
    sync_state.dispatch(&DispatchRequest {
        action: Some("exchange_code".to_owned()),
        code: Some(unquote(&code)),
        user_id: Some(unquote(&user)),
        ..DispatchRequest::default()
    });
}

#[when("user {user} posts the fetch_repositories action with token {token}")]
fn post_fetch_repositories(sync_state: &SyncState, user: String, token: String) {
    sync_state.dispatch(&DispatchRequest {
        action: Some("fetch_repositories".to_owned()),
        user_id: Some(unquote(&user)),
        access_token: Some(unquote(&token)),
        ..DispatchRequest::default()
    });
}

#[when("user {user} posts the fetch_pull_requests action for {repository} with token {token}")]
fn post_fetch_pull_requests(sync_state: &SyncState, user: String, repository: String, token: String) {
    sync_state.dispatch(&DispatchRequest {
        action: Some("fetch_pull_requests".to_owned()),
        user_id: Some(unquote(&user)),
        access_token: Some(unquote(&token)),
        repo_full_name: Some(unquote(&repository)),
        ..DispatchRequest::default()
    });
}

#[when("the client posts the action {action}")]
fn post_action(sync_state: &SyncState, action: String) {
    sync_state.dispatch(&DispatchRequest {
        action: Some(unquote(&action)),
        user_id: Some("user-1".to_owned()),
        ..DispatchRequest::default()
    });
}

#[when("the client comments {comment} on pull request {number:i64} of {repository} with token {token}")]
fn post_comment(
    sync_state: &SyncState,
    comment: String,
    number: i64,
    repository: String,
    token: String,
) {
    sync_state.dispatch(&DispatchRequest {
        action: Some("comment_on_pr".to_owned()),
        access_token: Some(unquote(&token)),
        repo_full_name: Some(unquote(&repository)),
        pr_number: Some(number),
        comment: Some(unquote(&comment)),
        ..DispatchRequest::default()
    });
}
