use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::models::{AuditSession, ConfidenceVector, ContactInfo, PainPoint, Recommendation};

mod rules;
mod webhook;

pub use rules::{RuleBasedAdvisor, recommendations_for};
pub use webhook::WebhookAdvisor;

/// What the advisor learned from the latest answer.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Advice {
    /// Next question. Ignored while the scripted discovery questions last.
    #[serde(default)]
    pub question: Option<String>,
    #[serde(default)]
    pub confidence: Option<ConfidenceVector>,
    #[serde(default)]
    pub pain_points: Vec<PainPoint>,
    /// Present when the conversation should be handed to a human.
    #[serde(default, alias = "escalate")]
    pub escalation_reason: Option<String>,
    #[serde(default)]
    pub contact_info: Option<ContactInfo>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Conclusion {
    #[serde(default)]
    pub recommendations: Vec<Recommendation>,
    #[serde(default)]
    pub next_steps: Option<String>,
    /// Closing message shown to the visitor.
    #[serde(default)]
    pub summary: Option<String>,
}

/// Strategy that scores answers, proposes follow-up questions and writes the
/// final recommendations. Called with a provisional session that already
/// contains the newest answer.
#[async_trait]
pub trait AuditAdvisor: Send + Sync {
    fn name(&self) -> &'static str;

    async fn advise(&self, session: &AuditSession) -> Result<Advice>;

    async fn conclude(&self, session: &AuditSession) -> Result<Conclusion>;
}
