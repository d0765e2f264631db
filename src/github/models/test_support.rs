//! Test helpers for constructing snapshot fixtures.
//!
//! # Examples
//!
//! ```
//! use pr_pilot::github::models::test_support::{pull_request_snapshot, repository_snapshot};
//!
//! let repository = repository_snapshot(1, "octocat/hello-world");
//! assert_eq!(repository.name, "hello-world");
//!
//! let pull_request = pull_request_snapshot(10, 3);
//! assert_eq!(pull_request.state, "open");
//! ```

use super::{PullRequestSnapshot, RepositorySnapshot};

/// Builds a public repository snapshot with plausible URLs.
#[must_use]
pub fn repository_snapshot(id: i64, full_name: &str) -> RepositorySnapshot {
    let name = full_name
        .rsplit_once('/')
        .map_or(full_name, |(_, name)| name)
        .to_owned();

    RepositorySnapshot {
        id,
        name,
        full_name: full_name.to_owned(),
        description: Some(format!("Repository {full_name}")),
        html_url: format!("https://github.com/{full_name}"),
        clone_url: format!("https://github.com/{full_name}.git"),
        default_branch: Some("main".to_owned()),
        is_private: false,
        stars_count: 0,
        forks_count: 0,
        language: Some("Rust".to_owned()),
    }
}

/// Builds an open pull request snapshot authored by `octocat`.
#[must_use]
pub fn pull_request_snapshot(id: i64, number: i64) -> PullRequestSnapshot {
    PullRequestSnapshot {
        id,
        number,
        title: format!("PR #{number}"),
        body: None,
        state: "open".to_owned(),
        html_url: format!("https://github.com/o/r/pull/{number}"),
        head_branch: format!("topic-{number}"),
        base_branch: "main".to_owned(),
        author_username: Some("octocat".to_owned()),
        author_avatar_url: None,
    }
}
