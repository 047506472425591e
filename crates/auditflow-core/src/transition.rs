use crate::error::{AuditError, Result};
use crate::models::{AuditSession, AuditState, ConfidenceVector};
use crate::questions::is_fixed_question;

pub const MAX_QUESTIONS: u32 = 15;
pub const HIGH_CONFIDENCE_THRESHOLD: f64 = 0.8;

pub const SESSION_ENDED_MESSAGE: &str = "This audit has already ended";

/// Outcome of one accepted answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    Continue(AuditState),
    Complete,
    Escalate(String),
}

impl Transition {
    #[must_use]
    pub fn target_state(&self) -> AuditState {
        match self {
            Self::Continue(state) => *state,
            Self::Complete => AuditState::Complete,
            Self::Escalate(_) => AuditState::Escalated,
        }
    }
}

/// Terminal sessions reject further answers.
pub fn ensure_accepts_messages(session: &AuditSession) -> Result<()> {
    if session.state.is_terminal() {
        return Err(AuditError::SessionEnded(SESSION_ENDED_MESSAGE.to_string()));
    }
    Ok(())
}

/// Question number after one more accepted answer, capped at [`MAX_QUESTIONS`].
#[must_use]
pub fn next_question_count(current: u32) -> u32 {
    current.saturating_add(1).min(MAX_QUESTIONS)
}

#[must_use]
pub fn decide(
    question_count: u32,
    confidence: &ConfidenceVector,
    escalation_reason: Option<&str>,
) -> Transition {
    if let Some(reason) = escalation_reason {
        return Transition::Escalate(reason.to_string());
    }
    if question_count >= MAX_QUESTIONS || confidence.overall >= HIGH_CONFIDENCE_THRESHOLD {
        return Transition::Complete;
    }
    if is_fixed_question(question_count) {
        Transition::Continue(AuditState::Discovery)
    } else {
        Transition::Continue(AuditState::Followup)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};

    use super::*;

    fn confidence(overall: f64) -> ConfidenceVector {
        ConfidenceVector {
            overall,
            ..ConfidenceVector::default()
        }
    }

    #[test]
    fn discovery_until_fixed_questions_exhausted() {
        assert_eq!(
            decide(2, &confidence(0.1), None),
            Transition::Continue(AuditState::Discovery)
        );
        assert_eq!(
            decide(3, &confidence(0.1), None),
            Transition::Continue(AuditState::Discovery)
        );
        assert_eq!(
            decide(4, &confidence(0.1), None),
            Transition::Continue(AuditState::Followup)
        );
    }

    #[test]
    fn completes_on_question_cap_or_high_confidence() {
        assert_eq!(decide(MAX_QUESTIONS, &confidence(0.0), None), Transition::Complete);
        assert_eq!(
            decide(5, &confidence(HIGH_CONFIDENCE_THRESHOLD), None),
            Transition::Complete
        );
        assert_eq!(
            decide(5, &confidence(0.79), None),
            Transition::Continue(AuditState::Followup)
        );
    }

    #[test]
    fn escalation_wins_over_completion() {
        let transition = decide(MAX_QUESTIONS, &confidence(0.95), Some("wants a call"));
        assert_eq!(transition, Transition::Escalate("wants a call".to_string()));
        assert_eq!(transition.target_state(), AuditState::Escalated);
    }

    #[test]
    fn count_never_exceeds_cap() {
        assert_eq!(next_question_count(1), 2);
        assert_eq!(next_question_count(MAX_QUESTIONS - 1), MAX_QUESTIONS);
        assert_eq!(next_question_count(MAX_QUESTIONS), MAX_QUESTIONS);
        assert_eq!(next_question_count(u32::MAX), MAX_QUESTIONS);
    }

    #[test]
    fn terminal_sessions_reject_messages() {
        let now = Utc::now();
        let mut session = AuditSession::start(None, "q1", now, now + Duration::days(1));
        ensure_accepts_messages(&session).expect("fresh session accepts");

        for state in [AuditState::Complete, AuditState::Escalated] {
            session.state = state;
            let err = ensure_accepts_messages(&session).expect_err("terminal");
            assert!(matches!(err, AuditError::SessionEnded(_)));
        }
    }
}
