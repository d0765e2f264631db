//! Route handlers.

use axum::Json;
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use http::StatusCode;
use http::header::LOCATION;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::persistence::{ProfileRow, PullRequestRow, RepositoryRow};
use crate::session::UserId;
use crate::sync::{DispatchRequest, SyncError};

use super::AppState;

impl IntoResponse for SyncError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::warn!(error = %self, "request rejected");
        }
        (status, Json(json!({ "error": self.public_message() }))).into_response()
    }
}

/// Profile as returned by `GET /profiles/:user_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileView {
    /// Local user id.
    pub id: String,
    /// Connected GitHub login.
    pub github_username: Option<String>,
    /// Connected GitHub avatar.
    pub github_avatar_url: Option<String>,
    /// Decrypted bearer token, used by the client to drive syncs.
    pub github_access_token: Option<String>,
    /// Whether a GitHub account is connected.
    pub connected: bool,
    /// Row creation time.
    pub created_at: String,
    /// Last write time.
    pub updated_at: String,
}

impl From<ProfileRow> for ProfileView {
    fn from(row: ProfileRow) -> Self {
        Self {
            connected: row.github_username.is_some() && row.github_access_token.is_some(),
            id: row.id,
            github_username: row.github_username,
            github_avatar_url: row.github_avatar_url,
            github_access_token: row.github_access_token,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

fn not_found(message: &str) -> Response {
    (StatusCode::NOT_FOUND, Json(json!({ "error": message }))).into_response()
}

pub(super) async fn dispatch(State(state): State<AppState>, body: Bytes) -> Response {
    let request: DispatchRequest = match serde_json::from_slice(&body) {
        Ok(request) => request,
        Err(error) => {
            return SyncError::internal(format!("malformed request body: {error}"))
                .into_response();
        }
    };

    match state.service.dispatch(request).await {
        Ok(response) => Json(response).into_response(),
        Err(error) => error.into_response(),
    }
}

pub(super) async fn profile(
    State(state): State<AppState>,
    Path(raw_user_id): Path<String>,
) -> Result<Response, SyncError> {
    let Some(user_id) = UserId::new(raw_user_id) else {
        return Ok(not_found("Profile not found"));
    };
    let profile = state.service.profile(user_id).await?;
    Ok(profile.map_or_else(
        || not_found("Profile not found"),
        |row| Json(ProfileView::from(row)).into_response(),
    ))
}

pub(super) async fn repositories(
    State(state): State<AppState>,
    Path(raw_user_id): Path<String>,
) -> Result<Json<Vec<RepositoryRow>>, SyncError> {
    let Some(user_id) = UserId::new(raw_user_id) else {
        return Ok(Json(Vec::new()));
    };
    state.service.repositories(user_id).await.map(Json)
}

pub(super) async fn pull_requests(
    State(state): State<AppState>,
    Path(repository_id): Path<i64>,
) -> Result<Json<Vec<PullRequestRow>>, SyncError> {
    state
        .service
        .open_pull_requests(repository_id)
        .await
        .map(Json)
}

pub(super) async fn authorize(State(state): State<AppState>) -> Result<Response, SyncError> {
    let url = state.authorize.url().map_err(SyncError::internal)?;
    Ok((StatusCode::FOUND, [(LOCATION, url.to_string())]).into_response())
}
