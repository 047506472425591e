use std::path::Path;
use std::sync::Arc;

use chrono::{Duration, Utc};

use crate::advisor::{AuditAdvisor, RuleBasedAdvisor, WebhookAdvisor, recommendations_for};
use crate::config::AppConfig;
use crate::confidence::{ConfidenceScorer, WeightedMeanScorer, normalize};
use crate::delivery::{LeadNotifier, ResultsMailer};
use crate::error::{AuditError, Result};
use crate::models::{
    AuditMessage, AuditSession, AuditState, ContactInfo, MessageTurn, SessionPatch,
    SessionSummary, SessionTurn, SessionView, StartSessionRequest, SubmitMessageRequest,
};
use crate::questions::{fixed_question, followup_question, is_fixed_question, opening_question};
use crate::rate_limit::RateLimiter;
use crate::sanitize;
use crate::state::SqliteStateStore;
use crate::transition::{
    MAX_QUESTIONS, Transition, decide, ensure_accepts_messages, next_question_count,
};
use crate::webhook::WebhookClient;

const MAX_SESSION_TTL_SECS: i64 = 366 * 24 * 60 * 60;
const RATE_LIMITED_MESSAGE: &str = "Too many messages. Please wait a moment and try again.";
const SESSION_NOT_FOUND: &str = "Session not found";
const COMPLETION_FALLBACK: &str =
    "Thanks, that gives me a clear picture. Your automation recommendations are ready below.";
const ESCALATION_MESSAGE: &str = concat!(
    "Thanks for your patience. A consultant will review our conversation ",
    "and reach out to you directly."
);

/// Entry point for the audit conversation. Cheap to clone; every clone shares
/// the same store and adapters.
#[derive(Clone)]
pub struct AuditService {
    store: SqliteStateStore,
    advisor: Arc<dyn AuditAdvisor>,
    scorer: Arc<dyn ConfidenceScorer>,
    limiter: RateLimiter,
    mailer: ResultsMailer,
    notifier: LeadNotifier,
    config: AppConfig,
}

impl std::fmt::Debug for AuditService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuditService")
            .field("advisor", &self.advisor.name())
            .finish_non_exhaustive()
    }
}

impl AuditService {
    /// Builds the service, using the advisor webhook when one is configured and
    /// the local rule-based advisor otherwise.
    pub fn new(config: AppConfig, store: SqliteStateStore) -> Result<Self> {
        let client = WebhookClient::new(&config.webhooks)?;
        let advisor: Arc<dyn AuditAdvisor> = match &config.webhooks.advisor_url {
            Some(url) => Arc::new(WebhookAdvisor::new(url.clone(), client.clone())),
            None => Arc::new(RuleBasedAdvisor),
        };
        Ok(Self::assemble(config, store, advisor, client))
    }

    pub fn open(config: AppConfig, db_path: impl AsRef<Path>) -> Result<Self> {
        let store = SqliteStateStore::open(db_path)?;
        Self::new(config, store)
    }

    pub fn with_advisor(
        config: AppConfig,
        store: SqliteStateStore,
        advisor: Arc<dyn AuditAdvisor>,
    ) -> Result<Self> {
        let client = WebhookClient::new(&config.webhooks)?;
        Ok(Self::assemble(config, store, advisor, client))
    }

    #[must_use]
    pub fn with_scorer(mut self, scorer: Arc<dyn ConfidenceScorer>) -> Self {
        self.scorer = scorer;
        self
    }

    fn assemble(
        config: AppConfig,
        store: SqliteStateStore,
        advisor: Arc<dyn AuditAdvisor>,
        client: WebhookClient,
    ) -> Self {
        Self {
            limiter: RateLimiter::new(store.clone(), config.rate_limit),
            mailer: ResultsMailer::new(config.webhooks.email_url.clone(), client.clone()),
            notifier: LeadNotifier::new(config.webhooks.notify_url.clone(), client),
            scorer: Arc::new(WeightedMeanScorer::default()),
            store,
            advisor,
            config,
        }
    }

    #[must_use]
    pub const fn config(&self) -> &AppConfig {
        &self.config
    }

    #[must_use]
    pub const fn store(&self) -> &SqliteStateStore {
        &self.store
    }

    #[must_use]
    pub fn advisor_name(&self) -> &'static str {
        self.advisor.name()
    }

    /// Resume an active session or open a new one. Unknown, expired and ended
    /// sessions are never resumed.
    pub fn start_session(&self, request: StartSessionRequest) -> Result<SessionTurn> {
        let contact_info = sanitize::contact_info(request.contact_info)?;

        if let Some(session) = self.resumable_session(request.resume_session_id.as_deref())? {
            let session = match contact_info {
                Some(update) => self.store.update_session(
                    &session.session_id,
                    session.version,
                    SessionPatch {
                        contact_info: Some(update),
                        ..SessionPatch::default()
                    },
                )?,
                None => session,
            };
            let question = session
                .last_assistant_message()
                .map_or_else(|| opening_question().to_string(), |m| m.content.clone());
            tracing::info!(
                operation = "audit.session",
                session_id = %session.session_id,
                question_count = session.question_count,
                "resumed audit session"
            );
            return Ok(SessionTurn {
                session_id: session.session_id,
                question,
                question_number: session.question_count,
                total_questions: MAX_QUESTIONS,
                is_fixed_question: is_fixed_question(session.question_count),
                state: session.state,
                resumed: true,
            });
        }

        let session = self
            .store
            .create_session(contact_info, opening_question(), self.session_ttl())?;
        tracing::info!(
            operation = "audit.session",
            session_id = %session.session_id,
            "started audit session"
        );
        Ok(SessionTurn {
            session_id: session.session_id,
            question: opening_question().to_string(),
            question_number: session.question_count,
            total_questions: MAX_QUESTIONS,
            is_fixed_question: true,
            state: session.state,
            resumed: false,
        })
    }

    fn resumable_session(&self, raw_id: Option<&str>) -> Result<Option<AuditSession>> {
        let Some(raw_id) = raw_id.filter(|raw| !raw.trim().is_empty()) else {
            return Ok(None);
        };
        let Ok(session_id) = sanitize::session_id(raw_id) else {
            return Ok(None);
        };
        Ok(self
            .store
            .get_session(&session_id)?
            .filter(|session| !session.state.is_terminal()))
    }

    /// Accept one answer and produce the next turn.
    pub async fn submit_message(
        &self,
        request: SubmitMessageRequest,
        client_ip: &str,
    ) -> Result<MessageTurn> {
        let session_id = sanitize::session_id(&request.session_id)?;
        let message = sanitize::message(&request.message)?;
        let contact_update = sanitize::contact_info(request.contact_info)?;

        if !self.limiter.check_rate_limit(&session_id, false)?
            || !self.limiter.check_rate_limit(client_ip, true)?
        {
            tracing::warn!(
                operation = "audit.message",
                session_id = %session_id,
                client_ip,
                "rate limit exceeded"
            );
            return Err(AuditError::RateLimited(RATE_LIMITED_MESSAGE.to_string()));
        }

        let session = self
            .store
            .get_session(&session_id)?
            .ok_or_else(|| AuditError::NotFound(SESSION_NOT_FOUND.to_string()))?;
        ensure_accepts_messages(&session)?;

        let now = Utc::now();
        let question_count = next_question_count(session.question_count);
        let user_message = AuditMessage::user(message, now);

        let mut provisional = session.clone();
        provisional.messages.push(user_message.clone());
        provisional.question_count = question_count;
        if let Some(update) = contact_update.clone() {
            provisional
                .contact_info
                .get_or_insert_with(ContactInfo::default)
                .merge(update);
        }

        let advice = self.advisor.advise(&provisional).await?;
        let confidence = normalize(
            advice.confidence.unwrap_or(provisional.confidence),
            self.scorer.as_ref(),
        );
        provisional.confidence = confidence;
        let contact_info = merge_contact(advisor_contact(advice.contact_info), contact_update);
        let mut patch = SessionPatch {
            question_count: Some(question_count),
            append_messages: vec![user_message],
            confidence: Some(confidence),
            add_pain_points: advice.pain_points.clone(),
            contact_info,
            ..SessionPatch::default()
        };

        let transition = decide(
            question_count,
            &confidence,
            advice
                .escalation_reason
                .as_deref()
                .map(str::trim)
                .filter(|reason| !reason.is_empty()),
        );
        let reply = match &transition {
            Transition::Complete => {
                SessionPatch {
                    add_pain_points: advice.pain_points,
                    ..SessionPatch::default()
                }
                .apply_to(&mut provisional, now);
                let conclusion = self.advisor.conclude(&provisional).await?;
                let recommendations = if conclusion.recommendations.is_empty() {
                    recommendations_for(&provisional.pain_points)
                } else {
                    conclusion.recommendations
                };
                patch.recommendations = Some(recommendations);
                patch.next_steps = conclusion.next_steps;
                conclusion
                    .summary
                    .filter(|summary| !summary.trim().is_empty())
                    .unwrap_or_else(|| COMPLETION_FALLBACK.to_string())
            }
            Transition::Escalate(reason) => {
                patch.escalation_reason = Some(reason.clone());
                ESCALATION_MESSAGE.to_string()
            }
            Transition::Continue(_) => fixed_question(question_count).map_or_else(
                || {
                    advice
                        .question
                        .filter(|question| !question.trim().is_empty())
                        .unwrap_or_else(|| {
                            followup_question(&provisional.messages, &confidence)
                                .1
                                .to_string()
                        })
                },
                ToString::to_string,
            ),
        };
        patch.state = Some(transition.target_state());
        patch.append_messages.push(AuditMessage::assistant(reply.clone(), now));

        let updated = self
            .store
            .update_session(&session_id, session.version, patch)?;
        tracing::info!(
            operation = "audit.message",
            session_id = %session_id,
            question_count = updated.question_count,
            state = %updated.state,
            overall = updated.confidence.overall,
            "accepted answer"
        );

        if updated.state.is_terminal() {
            self.notify_lead(&updated).await;
        }

        Ok(MessageTurn {
            session_id: updated.session_id,
            question_number: updated.question_count,
            total_questions: MAX_QUESTIONS,
            state: updated.state,
            question: reply,
            is_fixed_question: matches!(transition, Transition::Continue(_))
                && is_fixed_question(updated.question_count),
            confidence: updated.confidence,
            escalation_reason: updated.escalation_reason,
            recommendations: updated.recommendations,
            next_steps: updated.next_steps,
        })
    }

    async fn notify_lead(&self, session: &AuditSession) {
        match self.notifier.notify(session).await {
            Ok(true) => tracing::info!(
                operation = "audit.notify",
                session_id = %session.session_id,
                state = %session.state,
                "lead notification sent"
            ),
            Ok(false) => {}
            Err(err) => tracing::warn!(
                operation = "audit.notify",
                session_id = %session.session_id,
                code = err.code(),
                error = %err,
                "lead notification failed"
            ),
        }
    }

    /// Forward the results of a completed audit to the email automation.
    pub async fn email_results(&self, raw_session_id: &str) -> Result<()> {
        let session_id = sanitize::session_id(raw_session_id)?;
        let session = self
            .store
            .get_session(&session_id)?
            .ok_or_else(|| AuditError::NotFound(SESSION_NOT_FOUND.to_string()))?;
        if session.state != AuditState::Complete {
            return Err(AuditError::Validation("Audit not complete".to_string()));
        }
        if session.contact_email().is_none() {
            return Err(AuditError::Validation("No email on file".to_string()));
        }
        self.mailer.send(&session).await?;
        tracing::info!(
            operation = "audit.email_results",
            session_id = %session_id,
            "results forwarded"
        );
        Ok(())
    }

    pub fn get_session(&self, raw_session_id: &str) -> Result<AuditSession> {
        let session_id = sanitize::session_id(raw_session_id)?;
        self.store
            .get_session(&session_id)?
            .ok_or_else(|| AuditError::NotFound(SESSION_NOT_FOUND.to_string()))
    }

    pub fn get_session_view(&self, raw_session_id: &str) -> Result<SessionView> {
        let session = self.get_session(raw_session_id)?;
        Ok(SessionView::from_session(&session, MAX_QUESTIONS))
    }

    pub fn list_sessions(&self, limit: usize) -> Result<Vec<SessionSummary>> {
        self.store.list_sessions(limit)
    }

    pub fn purge_expired(&self) -> Result<usize> {
        let purged = self.store.purge_expired(Utc::now())?;
        if purged > 0 {
            tracing::info!(operation = "audit.purge", purged, "purged expired sessions");
        }
        Ok(purged)
    }

    fn session_ttl(&self) -> Duration {
        let secs = i64::try_from(self.config.session.ttl_secs)
            .unwrap_or(MAX_SESSION_TTL_SECS)
            .clamp(1, MAX_SESSION_TTL_SECS);
        Duration::seconds(secs)
    }
}

/// Advisor-extracted contact details go through the same sanitation as
/// client input; anything implausible is dropped.
fn advisor_contact(raw: Option<ContactInfo>) -> Option<ContactInfo> {
    sanitize::contact_info(raw).unwrap_or_else(|err| {
        tracing::debug!(error = %err, "ignoring advisor contact details");
        None
    })
}

fn merge_contact(base: Option<ContactInfo>, update: Option<ContactInfo>) -> Option<ContactInfo> {
    match (base, update) {
        (Some(mut base), Some(update)) => {
            base.merge(update);
            Some(base)
        }
        (base, update) => base.or(update),
    }
}
