use async_trait::async_trait;
use reqwest::Url;
use serde::Serialize;

use crate::error::Result;
use crate::models::AuditSession;
use crate::webhook::{WebhookClient, decode_reply};

use super::{Advice, AuditAdvisor, Conclusion};

#[derive(Debug, Serialize)]
struct AdvisorRequest<'a> {
    action: &'static str,
    session: &'a AuditSession,
}

/// Delegates scoring and question generation to an external automation
/// workflow.
#[derive(Debug, Clone)]
pub struct WebhookAdvisor {
    url: Url,
    client: WebhookClient,
}

impl WebhookAdvisor {
    #[must_use]
    pub const fn new(url: Url, client: WebhookClient) -> Self {
        Self { url, client }
    }

    async fn call<T: serde::de::DeserializeOwned>(
        &self,
        action: &'static str,
        session: &AuditSession,
    ) -> Result<T> {
        let body = self
            .client
            .post_json(&self.url, "advisor", &AdvisorRequest { action, session })
            .await?;
        decode_reply(&body, "advisor")
    }
}

#[async_trait]
impl AuditAdvisor for WebhookAdvisor {
    fn name(&self) -> &'static str {
        "webhook"
    }

    async fn advise(&self, session: &AuditSession) -> Result<Advice> {
        self.call("advise", session).await
    }

    async fn conclude(&self, session: &AuditSession) -> Result<Conclusion> {
        self.call("conclude", session).await
    }
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use chrono::{Duration, Utc};
    use serde_json::json;

    use super::*;
    use crate::config::WebhookConfig;
    use crate::error::AuditError;
    use crate::test_support::HookServer;

    fn session() -> AuditSession {
        let now = Utc::now();
        AuditSession::start(None, "q1", now, now + Duration::hours(1))
    }

    fn advisor(hook: &HookServer) -> WebhookAdvisor {
        WebhookAdvisor::new(
            hook.url.clone(),
            WebhookClient::new(&WebhookConfig::default()).expect("client"),
        )
    }

    #[tokio::test]
    async fn advise_posts_action_and_decodes_wrapped_reply() {
        let hook = HookServer::spawn(
            StatusCode::OK,
            json!([{
                "question": "How do you invoice today?",
                "confidence": {
                    "I": 0.5, "R": 0.2, "P": 0.4, "M": 0.1, "K": 0.3, "overall": 0.99
                },
                "painPoints": [
                    {"category": "invoicing", "description": "manual", "severity": "high"}
                ],
                "escalate": "asked for a call"
            }]),
        )
        .await;

        let advice = advisor(&hook).advise(&session()).await.expect("advise");
        assert_eq!(advice.question.as_deref(), Some("How do you invoice today?"));
        assert_eq!(advice.pain_points.len(), 1);
        assert_eq!(advice.escalation_reason.as_deref(), Some("asked for a call"));
        let confidence = advice.confidence.expect("confidence");
        assert!((confidence.i - 0.5).abs() < 1e-9);

        let requests = hook.requests();
        assert_eq!(requests[0].body["action"], "advise");
        assert_eq!(requests[0].body["session"]["questionCount"], 1);
    }

    #[tokio::test]
    async fn conclude_tolerates_missing_fields() {
        let hook = HookServer::spawn(StatusCode::OK, json!({"summary": "done"})).await;
        let conclusion = advisor(&hook).conclude(&session()).await.expect("conclude");
        assert!(conclusion.recommendations.is_empty());
        assert_eq!(conclusion.summary.as_deref(), Some("done"));
        assert_eq!(hook.requests()[0].body["action"], "conclude");
    }

    #[tokio::test]
    async fn upstream_failure_is_reported() {
        let hook = HookServer::spawn(StatusCode::SERVICE_UNAVAILABLE, json!({})).await;
        let err = advisor(&hook).advise(&session()).await.expect_err("503");
        assert!(matches!(err, AuditError::Upstream(_)));
    }
}
