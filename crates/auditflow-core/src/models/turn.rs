use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{
    AuditMessage, AuditSession, AuditState, ConfidenceVector, ContactInfo, PainPoint,
    Recommendation, SessionStatus,
};

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StartSessionRequest {
    #[serde(default)]
    pub resume_session_id: Option<String>,
    #[serde(default)]
    pub contact_info: Option<ContactInfo>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SessionTurn {
    pub session_id: String,
    pub question: String,
    pub question_number: u32,
    pub total_questions: u32,
    pub is_fixed_question: bool,
    pub state: AuditState,
    pub resumed: bool,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SubmitMessageRequest {
    pub session_id: String,
    pub message: String,
    #[serde(default)]
    pub contact_info: Option<ContactInfo>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MessageTurn {
    pub session_id: String,
    pub question_number: u32,
    pub total_questions: u32,
    pub state: AuditState,
    pub question: String,
    pub is_fixed_question: bool,
    pub confidence: ConfidenceVector,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub escalation_reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommendations: Option<Vec<Recommendation>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_steps: Option<String>,
}

/// Read model for `GET /api/audit/session/{id}`. Contact details stay private.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub session_id: String,
    pub state: AuditState,
    pub status: SessionStatus,
    pub question_number: u32,
    pub total_questions: u32,
    pub messages: Vec<AuditMessage>,
    pub confidence: ConfidenceVector,
    pub pain_points: Vec<PainPoint>,
    #[serde(default)]
    pub recommendations: Vec<Recommendation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_steps: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub escalation_reason: Option<String>,
    pub has_email: bool,
    pub updated_at: DateTime<Utc>,
}

impl SessionView {
    #[must_use]
    pub fn from_session(session: &AuditSession, total_questions: u32) -> Self {
        Self {
            session_id: session.session_id.clone(),
            state: session.state,
            status: session.status(),
            question_number: session.question_count,
            total_questions,
            messages: session.messages.clone(),
            confidence: session.confidence,
            pain_points: session.pain_points.clone(),
            recommendations: session.recommendations.clone().unwrap_or_default(),
            next_steps: session.next_steps.clone(),
            escalation_reason: session.escalation_reason.clone(),
            has_email: session.contact_email().is_some(),
            updated_at: session.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    pub session_id: String,
    pub state: AuditState,
    pub question_count: u32,
    pub updated_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}
