use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::Router;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use reqwest::Url;
use serde_json::Value;

use crate::config::API_KEY_HEADER;

#[derive(Debug, Clone)]
pub(crate) struct CapturedRequest {
    pub api_key: Option<String>,
    pub body: Value,
}

#[derive(Clone)]
struct HookState {
    status: StatusCode,
    reply: Value,
    captured: Arc<Mutex<Vec<CapturedRequest>>>,
}

/// Local webhook endpoint that records every JSON body it receives.
pub(crate) struct HookServer {
    pub url: Url,
    captured: Arc<Mutex<Vec<CapturedRequest>>>,
}

impl HookServer {
    pub async fn spawn(status: StatusCode, reply: Value) -> Self {
        let captured = Arc::new(Mutex::new(Vec::new()));
        let state = HookState {
            status,
            reply,
            captured: Arc::clone(&captured),
        };
        let app = Router::new().route("/hook", post(record)).with_state(state);
        let listener = tokio::net::TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0)))
            .await
            .expect("bind hook server");
        let addr = listener.local_addr().expect("hook addr");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("hook server");
        });
        Self {
            url: Url::parse(&format!("http://{addr}/hook")).expect("hook url"),
            captured,
        }
    }

    pub fn requests(&self) -> Vec<CapturedRequest> {
        self.captured.lock().expect("captured lock").clone()
    }
}

async fn record(
    State(state): State<HookState>,
    headers: HeaderMap,
    axum::Json(body): axum::Json<Value>,
) -> (StatusCode, axum::Json<Value>) {
    state
        .captured
        .lock()
        .expect("captured lock")
        .push(CapturedRequest {
            api_key: headers
                .get(API_KEY_HEADER)
                .and_then(|value| value.to_str().ok())
                .map(ToString::to_string),
            body,
        });
    (state.status, axum::Json(state.reply))
}
