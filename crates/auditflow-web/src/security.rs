use axum::{
    Json,
    extract::{Request, State},
    http::{
        HeaderMap, HeaderValue, Method, StatusCode,
        header::{self, HeaderName},
    },
    middleware::Next,
    response::{IntoResponse, Response},
};
use uuid::Uuid;

use auditflow_core::ErrorPayload;

use crate::WebState;

pub async fn security_headers_middleware(request: Request, next: Next) -> Response {
    let mut response = next.run(request).await;
    apply_security_headers(response.headers_mut());
    response
}

/// Reject cross-site POSTs when an origin allow-list is configured. Requests
/// without an `Origin` header pass; they cannot come from a browser form on
/// another site.
pub async fn origin_guard_middleware(
    State(state): State<WebState>,
    request: Request,
    next: Next,
) -> Response {
    if request.method() == Method::POST
        && let Some(origin) = request
            .headers()
            .get(header::ORIGIN)
            .and_then(|value| value.to_str().ok())
        && !state.service.config().web.allows_origin(origin)
    {
        tracing::warn!(origin, path = request.uri().path(), "rejected cross-origin request");
        return forbidden_origin_response(request.uri().path());
    }
    next.run(request).await
}

fn forbidden_origin_response(path: &str) -> Response {
    let payload = ErrorPayload {
        code: "FORBIDDEN_ORIGIN".to_string(),
        message: "Request origin is not allowed".to_string(),
        operation: path.to_string(),
        trace_id: Uuid::new_v4().to_string(),
        session_id: None,
        details: None,
    };
    (StatusCode::FORBIDDEN, Json(payload)).into_response()
}

fn apply_security_headers(headers: &mut HeaderMap) {
    headers.insert(
        header::X_CONTENT_TYPE_OPTIONS,
        HeaderValue::from_static("nosniff"),
    );
    headers.insert(
        HeaderName::from_static("x-frame-options"),
        HeaderValue::from_static("DENY"),
    );
    headers.insert(
        HeaderName::from_static("referrer-policy"),
        HeaderValue::from_static("no-referrer"),
    );
    headers.insert(
        header::CACHE_CONTROL,
        HeaderValue::from_static("no-store"),
    );
    headers.insert(
        HeaderName::from_static("content-security-policy"),
        HeaderValue::from_static("default-src 'none'; frame-ancestors 'none'"),
    );
}
