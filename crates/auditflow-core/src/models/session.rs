use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::ConfidenceVector;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditState {
    Discovery,
    Followup,
    Complete,
    Escalated,
}

impl AuditState {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Discovery => "DISCOVERY",
            Self::Followup => "FOLLOWUP",
            Self::Complete => "COMPLETE",
            Self::Escalated => "ESCALATED",
        }
    }

    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Complete | Self::Escalated)
    }

    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "DISCOVERY" => Some(Self::Discovery),
            "FOLLOWUP" => Some(Self::Followup),
            "COMPLETE" => Some(Self::Complete),
            "ESCALATED" => Some(Self::Escalated),
            _ => None,
        }
    }
}

impl std::fmt::Display for AuditState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Coarse lifecycle flag. Always derived from [`AuditState`], never stored.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Active,
    Complete,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuditMessage {
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl AuditMessage {
    pub fn user(content: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            timestamp,
        }
    }

    pub fn assistant(content: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            timestamp,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ContactInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

impl ContactInfo {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.email.is_none() && self.phone.is_none()
    }

    /// Fields present in `update` win; absent fields keep their current value.
    pub fn merge(&mut self, update: Self) {
        if update.name.is_some() {
            self.name = update.name;
        }
        if update.email.is_some() {
            self.email = update.email;
        }
        if update.phone.is_some() {
            self.phone = update.phone;
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PainPoint {
    pub category: String,
    pub description: String,
    pub severity: Level,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Recommendation {
    pub title: String,
    pub description: String,
    pub complexity: Level,
    pub priority: Level,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AuditSession {
    pub session_id: String,
    pub state: AuditState,
    pub question_count: u32,
    #[serde(default)]
    pub messages: Vec<AuditMessage>,
    #[serde(default)]
    pub confidence: ConfidenceVector,
    #[serde(default)]
    pub pain_points: Vec<PainPoint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommendations: Option<Vec<Recommendation>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_info: Option<ContactInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_steps: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub escalation_reason: Option<String>,
    pub version: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl AuditSession {
    /// Fresh session at question 1 with the opening question already asked.
    pub fn start(
        contact_info: Option<ContactInfo>,
        first_question: &str,
        now: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> Self {
        Self {
            session_id: Uuid::new_v4().to_string(),
            state: AuditState::Discovery,
            question_count: 1,
            messages: vec![AuditMessage::assistant(first_question, now)],
            confidence: ConfidenceVector::default(),
            pain_points: Vec::new(),
            recommendations: None,
            contact_info: contact_info.filter(|info| !info.is_empty()),
            next_steps: None,
            escalation_reason: None,
            version: 0,
            created_at: now,
            updated_at: now,
            expires_at,
        }
    }

    #[must_use]
    pub const fn status(&self) -> SessionStatus {
        if self.state.is_terminal() {
            SessionStatus::Complete
        } else {
            SessionStatus::Active
        }
    }

    #[must_use]
    pub fn last_assistant_message(&self) -> Option<&AuditMessage> {
        self.messages
            .iter()
            .rev()
            .find(|message| message.role == Role::Assistant)
    }

    pub fn user_answers(&self) -> impl Iterator<Item = &AuditMessage> {
        self.messages
            .iter()
            .filter(|message| message.role == Role::User)
    }

    #[must_use]
    pub fn contact_email(&self) -> Option<&str> {
        self.contact_info
            .as_ref()
            .and_then(|info| info.email.as_deref())
            .filter(|email| !email.trim().is_empty())
    }
}

/// Partial update applied by the store inside one conditional write.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionPatch {
    pub state: Option<AuditState>,
    pub question_count: Option<u32>,
    pub append_messages: Vec<AuditMessage>,
    pub confidence: Option<ConfidenceVector>,
    pub add_pain_points: Vec<PainPoint>,
    pub recommendations: Option<Vec<Recommendation>>,
    pub next_steps: Option<String>,
    pub contact_info: Option<ContactInfo>,
    pub escalation_reason: Option<String>,
}

impl SessionPatch {
    pub fn apply_to(self, session: &mut AuditSession, now: DateTime<Utc>) {
        if let Some(state) = self.state {
            session.state = state;
        }
        if let Some(count) = self.question_count {
            session.question_count = count;
        }
        session.messages.extend(self.append_messages);
        if let Some(confidence) = self.confidence {
            session.confidence = confidence;
        }
        for point in self.add_pain_points {
            let duplicate = session.pain_points.iter().any(|existing| {
                existing.category == point.category && existing.description == point.description
            });
            if !duplicate {
                session.pain_points.push(point);
            }
        }
        if let Some(recommendations) = self.recommendations {
            session.recommendations = Some(recommendations);
        }
        if let Some(next_steps) = self.next_steps {
            session.next_steps = Some(next_steps);
        }
        if let Some(update) = self.contact_info {
            session
                .contact_info
                .get_or_insert_with(ContactInfo::default)
                .merge(update);
        }
        if let Some(reason) = self.escalation_reason {
            session.escalation_reason = Some(reason);
        }
        session.version += 1;
        session.updated_at = now;
    }
}
