use reqwest::Url;
use serde::Serialize;

use crate::error::{AuditError, Result};
use crate::models::{
    AuditSession, AuditState, ConfidenceVector, ContactInfo, PainPoint, Recommendation,
};
use crate::webhook::WebhookClient;

/// Body forwarded to the email automation. `recommendations` is always an
/// array, empty when the session never produced any.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ResultsPayload {
    pub session_id: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub pain_points: Vec<PainPoint>,
    pub recommendations: Vec<Recommendation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_steps: Option<String>,
    pub confidence: ConfidenceVector,
}

impl ResultsPayload {
    pub fn from_session(session: &AuditSession) -> Result<Self> {
        let email = session
            .contact_email()
            .ok_or_else(|| AuditError::Validation("No email on file".to_string()))?;
        Ok(Self {
            session_id: session.session_id.clone(),
            email: email.to_string(),
            name: session
                .contact_info
                .as_ref()
                .and_then(|info| info.name.clone()),
            pain_points: session.pain_points.clone(),
            recommendations: session.recommendations.clone().unwrap_or_default(),
            next_steps: session.next_steps.clone(),
            confidence: session.confidence,
        })
    }
}

#[derive(Debug, Clone)]
pub struct ResultsMailer {
    url: Option<Url>,
    client: WebhookClient,
}

impl ResultsMailer {
    #[must_use]
    pub const fn new(url: Option<Url>, client: WebhookClient) -> Self {
        Self { url, client }
    }

    pub async fn send(&self, session: &AuditSession) -> Result<()> {
        let url = self
            .url
            .as_ref()
            .ok_or_else(|| AuditError::Configuration("email webhook URL is not set".to_string()))?;
        let payload = ResultsPayload::from_session(session)?;
        self.client.post_json(url, "email", &payload).await?;
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LeadNotification {
    pub event: &'static str,
    pub session_id: String,
    pub state: AuditState,
    pub question_count: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_info: Option<ContactInfo>,
    pub pain_points: Vec<PainPoint>,
    pub recommendations: Vec<Recommendation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_steps: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub escalation_reason: Option<String>,
    pub confidence: ConfidenceVector,
}

impl LeadNotification {
    #[must_use]
    pub fn from_session(session: &AuditSession) -> Self {
        let event = match session.state {
            AuditState::Escalated => "audit.escalated",
            AuditState::Complete => "audit.completed",
            AuditState::Discovery | AuditState::Followup => "audit.updated",
        };
        Self {
            event,
            session_id: session.session_id.clone(),
            state: session.state,
            question_count: session.question_count,
            contact_info: session.contact_info.clone(),
            pain_points: session.pain_points.clone(),
            recommendations: session.recommendations.clone().unwrap_or_default(),
            next_steps: session.next_steps.clone(),
            escalation_reason: session.escalation_reason.clone(),
            confidence: session.confidence,
        }
    }
}

/// Tells the sales automation about finished or escalated audits.
#[derive(Debug, Clone)]
pub struct LeadNotifier {
    url: Option<Url>,
    client: WebhookClient,
}

impl LeadNotifier {
    #[must_use]
    pub const fn new(url: Option<Url>, client: WebhookClient) -> Self {
        Self { url, client }
    }

    /// Returns `false` when no notification endpoint is configured.
    pub async fn notify(&self, session: &AuditSession) -> Result<bool> {
        let Some(url) = &self.url else {
            return Ok(false);
        };
        self.client
            .post_json(url, "notify", &LeadNotification::from_session(session))
            .await?;
        Ok(true)
    }
}
