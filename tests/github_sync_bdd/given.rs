//! Given steps for the GitHub sync BDD tests.

use pr_pilot::persistence::{SqliteMirrorStore, TokenCipher, migrate_database};
use pr_pilot::telemetry::NoopTelemetrySink;
use rstest_bdd_macros::given;
use serde_json::{Value, json};
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, ResponseTemplate};

use crate::github_sync_bdd_state::{SyncState, unquote};
use crate::support::{create_temp_dir, database_url_in};

const TOKEN_PATH: &str = "/login/oauth/access_token";

#[given("a migrated mirror database")]
fn migrated_database(sync_state: &SyncState) {
    let temp_dir = create_temp_dir();
    let database_url = database_url_in(&temp_dir);

    migrate_database(&database_url, &NoopTelemetrySink)
        .unwrap_or_else(|error| panic!("migrations should run: {error}"));
    let store = SqliteMirrorStore::new(database_url, TokenCipher::generate())
        .unwrap_or_else(|error| panic!("store should open: {error}"));

    sync_state.temp_dir.set(temp_dir);
    sync_state.store.set(store);
}

#[given("GitHub exchanges code {code} for token {token} owned by {login}")]
fn github_exchanges_code(sync_state: &SyncState, code: String, token: String, login: String) {
    sync_state.mount(
        Mock::given(method("POST"))
            .and(path(TOKEN_PATH))
            .and(body_partial_json(json!({ "code": unquote(&code) })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": unquote(&token),
                "token_type": "bearer",
                "scope": "repo,user"
            })))
            .expect(1),
    );
    sync_state.mount(
        Mock::given(method("GET"))
            .and(path("/user"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": 583_231,
                "login": unquote(&login),
                "avatar_url": "https://avatars.example/octocat.png",
                "name": "The Octocat",
                "email": null
            }))),
    );
}

#[given("GitHub refuses authorization codes with {description}")]
fn github_refuses_codes(sync_state: &SyncState, description: String) {
    sync_state.mount(
        Mock::given(method("POST"))
            .and(path(TOKEN_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "error": "bad_verification_code",
                "error_description": unquote(&description)
            }))),
    );
    sync_state.mount(
        Mock::given(method("GET"))
            .and(path("/user"))
            .respond_with(ResponseTemplate::new(500))
            .expect(0),
    );
}

#[given("GitHub lists {count:u64} repositories")]
fn github_lists_repositories(sync_state: &SyncState, count: u64) {
    let repositories: Vec<Value> = (1..=count).map(repository_json).collect();
    sync_state.mount(
        Mock::given(method("GET"))
            .and(path("/user/repos"))
            .respond_with(ResponseTemplate::new(200).set_body_json(repositories)),
    );
}

#[given("GitHub lists {count:u64} open pull requests for {repository}")]
fn github_lists_pull_requests(sync_state: &SyncState, count: u64, repository: String) {
    let full_name = unquote(&repository);
    let pull_requests: Vec<Value> = (1..=count)
        .map(|number| pull_request_json(&full_name, number))
        .collect();
    sync_state.mount(
        Mock::given(method("GET"))
            .and(path(format!("/repos/{full_name}/pulls")))
            .respond_with(ResponseTemplate::new(200).set_body_json(pull_requests)),
    );
}

#[given("GitHub must not be asked for pull requests of {repository}")]
fn github_not_asked_for_pull_requests(sync_state: &SyncState, repository: String) {
    let full_name = unquote(&repository);
    sync_state.mount(
        Mock::given(method("GET"))
            .and(path(format!("/repos/{full_name}/pulls")))
            .respond_with(ResponseTemplate::new(200).set_body_json(Vec::<Value>::new()))
            .expect(0)
            .named("pull request listing for an unsynced repository"),
    );
}

#[given("GitHub accepts a comment on pull request {number:u64} of {repository}")]
fn github_accepts_comment(sync_state: &SyncState, number: u64, repository: String) {
    let full_name = unquote(&repository);
    sync_state.mount(
        Mock::given(method("POST"))
            .and(path(format!("/repos/{full_name}/issues/{number}/comments")))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "id": 1,
                "body": "Looks good",
                "html_url": format!("https://github.com/{full_name}/pull/{number}#issuecomment-1")
            })))
            .expect(1)
            .named("issue comment"),
    );
}

fn repository_json(index: u64) -> Value {
    let full_name = format!("octocat/repo-{index}");
    json!({
        "id": index,
        "name": format!("repo-{index}"),
        "full_name": full_name,
        "description": null,
        "html_url": format!("https://github.com/{full_name}"),
        "clone_url": format!("https://github.com/{full_name}.git"),
        "default_branch": "main",
        "private": false,
        "stargazers_count": index,
        "forks_count": 0,
        "language": "Rust"
    })
}

fn pull_request_json(full_name: &str, number: u64) -> Value {
    json!({
        "id": 1000 + number,
        "number": number,
        "title": format!("Change {number}"),
        "body": null,
        "state": "open",
        "html_url": format!("https://github.com/{full_name}/pull/{number}"),
        "head": { "ref": format!("topic-{number}") },
        "base": { "ref": "main" },
        "user": { "login": "octocat", "avatar_url": null }
    })
}
