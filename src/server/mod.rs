//! HTTP surface: the action dispatcher, read endpoints, and the OAuth
//! redirect, served with axum.

mod cors;
mod handlers;

use std::sync::Arc;

use axum::Router;
use axum::middleware;
use axum::routing::{get, post};
use tokio::net::TcpListener;

use crate::github::AuthorizeTarget;
use crate::sync::SyncService;

pub use handlers::ProfileView;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    service: SyncService,
    authorize: Arc<AuthorizeTarget>,
}

impl AppState {
    /// Bundle the sync service with the authorize redirect target.
    #[must_use]
    pub fn new(service: SyncService, authorize: AuthorizeTarget) -> Self {
        Self {
            service,
            authorize: Arc::new(authorize),
        }
    }
}

/// Path of the action dispatcher.
pub const DISPATCH_PATH: &str = "/github-oauth";

/// Builds the application router with CORS applied to every route.
#[must_use]
pub fn router(state: AppState) -> Router {
    Router::new()
        .route(DISPATCH_PATH, post(handlers::dispatch))
        .route("/profiles/:user_id", get(handlers::profile))
        .route("/profiles/:user_id/repositories", get(handlers::repositories))
        .route(
            "/repositories/:repository_id/pull-requests",
            get(handlers::pull_requests),
        )
        .route("/github/authorize", get(handlers::authorize))
        .layer(middleware::from_fn(cors::cors))
        .with_state(state)
}

/// Serves `router` on `listener` until Ctrl-C.
///
/// # Errors
///
/// Returns the I/O error that stopped the server.
pub async fn serve(listener: TcpListener, router: Router) -> std::io::Result<()> {
    if let Ok(address) = listener.local_addr() {
        tracing::info!(%address, "listening");
    }
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %error, "failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown requested");
}
