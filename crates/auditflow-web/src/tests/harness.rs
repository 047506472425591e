use std::sync::Arc;

use axum::{
    Router,
    body::{Body, to_bytes},
    response::Response,
};
use tower::util::ServiceExt;

use auditflow_core::advisor::AuditAdvisor;
use auditflow_core::state::SqliteStateStore;
use auditflow_core::{AppConfig, AuditService};

use crate::{WebState, app_router};

pub(super) struct TestHarness {
    _temp: tempfile::TempDir,
    pub(super) state: WebState,
    pub(super) router: Router,
}

impl TestHarness {
    pub(super) fn setup() -> Self {
        Self::with_config(AppConfig::default())
    }

    pub(super) fn with_config(config: AppConfig) -> Self {
        let temp = tempfile::tempdir().expect("tempdir");
        let service =
            AuditService::open(config, temp.path().join("state.db")).expect("audit service");
        Self::from_service(temp, service)
    }

    pub(super) fn with_advisor(advisor: Arc<dyn AuditAdvisor>) -> Self {
        let temp = tempfile::tempdir().expect("tempdir");
        let store = SqliteStateStore::open(temp.path().join("state.db")).expect("store");
        let service =
            AuditService::with_advisor(AppConfig::default(), store, advisor).expect("service");
        Self::from_service(temp, service)
    }

    fn from_service(temp: tempfile::TempDir, service: AuditService) -> Self {
        let state = WebState::new(service);
        let router = app_router(state.clone());
        Self {
            _temp: temp,
            state,
            router,
        }
    }

    pub(super) async fn send(&self, request: axum::http::Request<Body>) -> Response {
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("response")
    }

    /// Start a session through the API and return its id.
    pub(super) async fn start_session(&self) -> String {
        let response = self
            .send(json_request("/api/audit/session", serde_json::json!({})))
            .await;
        let body: serde_json::Value = decode_json(response).await;
        body["sessionId"].as_str().expect("session id").to_string()
    }
}

pub(super) async fn decode_json<T: serde::de::DeserializeOwned>(response: Response) -> T {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body bytes");
    serde_json::from_slice(&bytes).expect("decode json")
}

pub(super) fn header_value<'a>(headers: &'a axum::http::HeaderMap, key: &str) -> Option<&'a str> {
    headers.get(key).and_then(|value| value.to_str().ok())
}

#[expect(
    clippy::needless_pass_by_value,
    reason = "tests usually pass temporary `json!` values directly"
)]
pub(super) fn json_request(path: &str, body: serde_json::Value) -> axum::http::Request<Body> {
    axum::http::Request::builder()
        .method("POST")
        .uri(path)
        .header("content-type", "application/json")
        .body(Body::from(
            serde_json::to_vec(&body).expect("json request body"),
        ))
        .expect("json request")
}

pub(super) fn get_request(path: &str) -> axum::http::Request<Body> {
    axum::http::Request::builder()
        .uri(path)
        .body(Body::empty())
        .expect("get request")
}
