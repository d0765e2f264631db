//! Scenario state and app wiring for the GitHub sync BDD tests.

use std::sync::Arc;

use axum::Router;
use axum::body::{Body, to_bytes};
use http::{Method, Request, header};
use pr_pilot::github::{
    AuthorizeTarget, OAuthCredentials, OAuthTokenExchange, OctocrabGitHubGateway,
};
use pr_pilot::persistence::{MirrorStore, SqliteMirrorStore};
use pr_pilot::server::{AppState, DISPATCH_PATH, router};
use pr_pilot::sync::{DispatchRequest, SyncService};
use pr_pilot::telemetry::NoopTelemetrySink;
use rstest_bdd::Slot;
use rstest_bdd_macros::ScenarioState;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;
use wiremock::{Mock, MockServer};

pub(crate) use crate::support::runtime::{SharedRuntime, ensure_runtime_and_server};

#[derive(ScenarioState, Default)]
pub(crate) struct SyncState {
    pub(crate) runtime: Slot<SharedRuntime>,
    pub(crate) server: Slot<MockServer>,
    pub(crate) temp_dir: Slot<TempDir>,
    pub(crate) store: Slot<SqliteMirrorStore>,
    pub(crate) status: Slot<u16>,
    pub(crate) body: Slot<Value>,
}

impl SyncState {
    pub(crate) fn shared_runtime(&self) -> SharedRuntime {
        ensure_runtime_and_server(&self.runtime, &self.server)
            .unwrap_or_else(|error| panic!("failed to create Tokio runtime: {error}"))
    }

    pub(crate) fn mount(&self, mock: Mock) {
        let runtime = self.shared_runtime();
        self.server
            .with_ref(|server| runtime.block_on(mock.mount(server)))
            .unwrap_or_else(|| panic!("mock server not initialised"));
    }

    pub(crate) fn mirror(&self) -> SqliteMirrorStore {
        self.store
            .get()
            .unwrap_or_else(|| panic!("mirror database not initialised"))
    }

    /// Posts `request` to the dispatcher and records status and body.
    pub(crate) fn dispatch(&self, request: &DispatchRequest) {
        let runtime = self.shared_runtime();
        let server_uri = self
            .server
            .with_ref(MockServer::uri)
            .unwrap_or_else(|| panic!("mock server not initialised"));
        let app = self.app(&server_uri);

        let payload = serde_json::to_vec(request)
            .unwrap_or_else(|error| panic!("request should serialise: {error}"));
        let http_request = Request::builder()
            .method(Method::POST)
            .uri(DISPATCH_PATH)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(payload))
            .unwrap_or_else(|error| panic!("request should build: {error}"));

        let (status, body) = runtime.block_on(async {
            let response = app
                .oneshot(http_request)
                .await
                .unwrap_or_else(|error| panic!("router should respond: {error}"));
            let status = response.status().as_u16();
            let bytes = to_bytes(response.into_body(), usize::MAX)
                .await
                .unwrap_or_else(|error| panic!("body should read: {error}"));
            let body: Value = serde_json::from_slice(&bytes)
                .unwrap_or_else(|error| panic!("body should be JSON: {error}"));
            (status, body)
        });

        self.status.set(status);
        self.body.set(body);
    }

    fn app(&self, server_uri: &str) -> Router {
        let gateway = OctocrabGitHubGateway::new(server_uri)
            .unwrap_or_else(|error| panic!("gateway should build: {error}"));
        let exchange = OAuthTokenExchange::new(
            server_uri,
            OAuthCredentials::new("Iv1.bdd", "bdd-secret"),
        )
        .unwrap_or_else(|error| panic!("token exchange should build: {error}"));
        let store: Arc<dyn MirrorStore> = Arc::new(self.mirror());

        let service = SyncService::new(
            Arc::new(gateway),
            Arc::new(exchange),
            store,
            Arc::new(NoopTelemetrySink),
        );
        router(AppState::new(
            service,
            AuthorizeTarget {
                oauth_base: server_uri.to_owned(),
                client_id: "Iv1.bdd".to_owned(),
                public_origin: "http://localhost:8080".to_owned(),
            },
        ))
    }
}

/// Strips the quotes Gherkin placeholders keep around string values.
pub(crate) fn unquote(value: &str) -> String {
    value.trim_matches('"').to_owned()
}
