use async_trait::async_trait;

use crate::confidence::{clamp_unit, weakest_dimension};
use crate::error::Result;
use crate::models::{
    AuditSession, ConfidenceVector, Dimension, Level, PainPoint, Recommendation, Role,
};
use crate::questions::{followup_question, question_target};

use super::{Advice, AuditAdvisor, Conclusion};

const DETAILED_ANSWER_WORDS: usize = 12;
const DETAILED_ANSWER_GAIN: f64 = 0.4;
const SHORT_ANSWER_GAIN: f64 = 0.25;
const KEYWORD_HINT_GAIN: f64 = 0.15;

const ESCALATION_PHRASES: [&str; 7] = [
    "speak to a human",
    "talk to a human",
    "talk to a person",
    "speak to someone",
    "speak with someone",
    "real person",
    "call me",
];

const DIMENSION_HINTS: [(Dimension, &[&str]); 3] = [
    (
        Dimension::Money,
        &["$", "budget", "cost", "revenue", "per hour", "salary", "spend"],
    ),
    (
        Dimension::Resources,
        &["crm", "spreadsheet", "excel", "software", "quickbooks", "staff"],
    ),
    (
        Dimension::Knowledge,
        &["tried", "comfortable", "tech", "automat", "zapier", "integration"],
    ),
];

struct PainPattern {
    category: &'static str,
    keywords: &'static [&'static str],
    description: &'static str,
    severity: Level,
    recommendation: &'static str,
    detail: &'static str,
    complexity: Level,
}

const PAIN_PATTERNS: [PainPattern; 6] = [
    PainPattern {
        category: "lead_management",
        keywords: &["lead", "follow up", "follow-up", "enquir", "inquir"],
        description: "Leads are followed up by hand and some slip through",
        severity: Level::High,
        recommendation: "Automated lead capture and follow-up",
        detail: "Capture every enquiry in one place and send timed follow-ups automatically.",
        complexity: Level::Medium,
    },
    PainPattern {
        category: "scheduling",
        keywords: &["schedul", "booking", "appointment", "calendar"],
        description: "Appointments are booked and rescheduled manually",
        severity: Level::Medium,
        recommendation: "Self-service online booking",
        detail: "Let customers pick a slot themselves with reminders sent automatically.",
        complexity: Level::Low,
    },
    PainPattern {
        category: "data_entry",
        keywords: &["data entry", "spreadsheet", "copy", "paste", "excel", "re-enter"],
        description: "Information is re-keyed between spreadsheets and systems",
        severity: Level::High,
        recommendation: "Connect systems to remove double entry",
        detail: "Sync records between your tools so each fact is typed once.",
        complexity: Level::Medium,
    },
    PainPattern {
        category: "invoicing",
        keywords: &["invoice", "billing", "payment", "quote"],
        description: "Quotes and invoices are prepared by hand",
        severity: Level::Medium,
        recommendation: "Automated quoting and invoicing",
        detail: "Generate quotes and invoices from job data and chase late payments automatically.",
        complexity: Level::Medium,
    },
    PainPattern {
        category: "communication",
        keywords: &["email", "inbox", "phone call", "customer questions", "faq"],
        description: "Routine customer questions take up staff time",
        severity: Level::Medium,
        recommendation: "Assistant for routine customer questions",
        detail: "Answer common questions instantly and route the rest to the right person.",
        complexity: Level::Medium,
    },
    PainPattern {
        category: "reporting",
        keywords: &["report", "dashboard", "kpi", "numbers"],
        description: "Reports are assembled manually",
        severity: Level::Low,
        recommendation: "Automated weekly reporting",
        detail: "Send a weekly summary of the numbers that matter without manual work.",
        complexity: Level::Low,
    },
];

const DEFAULT_NEXT_STEPS: &str =
    "Book a free consultation to walk through these recommendations and plan a first project.";

/// Deterministic local advisor used when no advisor webhook is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleBasedAdvisor;

#[async_trait]
impl AuditAdvisor for RuleBasedAdvisor {
    fn name(&self) -> &'static str {
        "rules"
    }

    async fn advise(&self, session: &AuditSession) -> Result<Advice> {
        let Some((question, answer)) = latest_exchange(session) else {
            return Ok(Advice::default());
        };
        let lowered = answer.to_lowercase();

        let mut confidence = session.confidence;
        let target = question
            .and_then(question_target)
            .unwrap_or_else(|| weakest_dimension(&confidence));
        let gain = if answer.split_whitespace().count() >= DETAILED_ANSWER_WORDS {
            DETAILED_ANSWER_GAIN
        } else {
            SHORT_ANSWER_GAIN
        };
        raise(&mut confidence, target, gain);
        for (dimension, hints) in DIMENSION_HINTS {
            if dimension != target && hints.iter().any(|hint| lowered.contains(hint)) {
                raise(&mut confidence, dimension, KEYWORD_HINT_GAIN);
            }
        }

        let pain_points = detect_pain_points(&lowered);
        if !pain_points.is_empty() {
            raise(&mut confidence, Dimension::Pain, KEYWORD_HINT_GAIN);
        }

        let escalation_reason = ESCALATION_PHRASES
            .iter()
            .any(|phrase| lowered.contains(phrase))
            .then(|| "You asked to speak with a consultant directly.".to_string());

        let (_, next) = followup_question(&session.messages, &confidence);
        Ok(Advice {
            question: Some(next.to_string()),
            confidence: Some(confidence),
            pain_points,
            escalation_reason,
            contact_info: None,
        })
    }

    async fn conclude(&self, session: &AuditSession) -> Result<Conclusion> {
        let recommendations = recommendations_for(&session.pain_points);
        let areas = recommendations.len();
        let summary = format!(
            "Thanks, I have what I need. I found {areas} area{} where automation can save you \
             time; your recommendations are below.",
            if areas == 1 { "" } else { "s" }
        );
        Ok(Conclusion {
            recommendations,
            next_steps: Some(DEFAULT_NEXT_STEPS.to_string()),
            summary: Some(summary),
        })
    }
}

/// The newest user answer and the assistant question it replied to.
fn latest_exchange(session: &AuditSession) -> Option<(Option<&str>, &str)> {
    let answer_index = session
        .messages
        .iter()
        .rposition(|message| message.role == Role::User)?;
    let question = session.messages[..answer_index]
        .iter()
        .rev()
        .find(|message| message.role == Role::Assistant)
        .map(|message| message.content.as_str());
    Some((question, session.messages[answer_index].content.as_str()))
}

fn raise(confidence: &mut ConfidenceVector, dimension: Dimension, gain: f64) {
    let value = clamp_unit(confidence.get(dimension) + gain);
    confidence.set(dimension, value);
}

fn detect_pain_points(lowered: &str) -> Vec<PainPoint> {
    PAIN_PATTERNS
        .iter()
        .filter(|pattern| {
            pattern
                .keywords
                .iter()
                .any(|keyword| lowered.contains(keyword))
        })
        .map(|pattern| PainPoint {
            category: pattern.category.to_string(),
            description: pattern.description.to_string(),
            severity: pattern.severity,
        })
        .collect()
}

/// Map collected pain points to recommendations, highest severity first.
/// Always yields at least one entry.
#[must_use]
pub fn recommendations_for(pain_points: &[PainPoint]) -> Vec<Recommendation> {
    let mut ranked: Vec<(&PainPattern, Level)> = Vec::new();
    for point in pain_points {
        let Some(pattern) = PAIN_PATTERNS
            .iter()
            .find(|pattern| pattern.category == point.category)
        else {
            continue;
        };
        if ranked
            .iter()
            .any(|(seen, _)| seen.category == pattern.category)
        {
            continue;
        }
        ranked.push((pattern, point.severity));
    }
    ranked.sort_by(|a, b| b.1.cmp(&a.1));

    let mut recommendations: Vec<Recommendation> = ranked
        .into_iter()
        .map(|(pattern, severity)| Recommendation {
            title: pattern.recommendation.to_string(),
            description: pattern.detail.to_string(),
            complexity: pattern.complexity,
            priority: severity,
        })
        .collect();
    if recommendations.is_empty() {
        recommendations.push(Recommendation {
            title: "Automation roadmap session".to_string(),
            description: concat!(
                "Map your weekly processes with a consultant ",
                "and pick the first workflow to automate."
            )
            .to_string(),
            complexity: Level::Low,
            priority: Level::Medium,
        });
    }
    recommendations
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};

    use super::*;
    use crate::models::AuditMessage;
    use crate::questions::DISCOVERY_QUESTIONS;

    fn session_with_answer(question: &str, answer: &str) -> AuditSession {
        let now = Utc::now();
        let mut session = AuditSession::start(None, question, now, now + Duration::days(1));
        session.messages.push(AuditMessage::user(answer, now));
        session
    }

    #[tokio::test]
    async fn answer_raises_targeted_dimension() {
        let session = session_with_answer(DISCOVERY_QUESTIONS[0], "We run a small bakery.");
        let advice = RuleBasedAdvisor.advise(&session).await.expect("advise");
        let confidence = advice.confidence.expect("confidence");
        assert!((confidence.i - SHORT_ANSWER_GAIN).abs() < 1e-9);
        assert_eq!(confidence.p, 0.0);
        assert!(advice.escalation_reason.is_none());
        assert!(advice.question.is_some());
    }

    #[tokio::test]
    async fn pain_keywords_become_pain_points() {
        let session = session_with_answer(
            DISCOVERY_QUESTIONS[1],
            "Chasing leads and booking appointments by phone eats our whole morning every day",
        );
        let advice = RuleBasedAdvisor.advise(&session).await.expect("advise");
        let categories: Vec<&str> = advice
            .pain_points
            .iter()
            .map(|point| point.category.as_str())
            .collect();
        assert_eq!(categories, vec!["lead_management", "scheduling"]);
        let confidence = advice.confidence.expect("confidence");
        assert!((confidence.p - (DETAILED_ANSWER_GAIN + KEYWORD_HINT_GAIN)).abs() < 1e-9);
    }

    #[tokio::test]
    async fn asking_for_a_human_escalates() {
        let session = session_with_answer(DISCOVERY_QUESTIONS[0], "Can I just speak to a human?");
        let advice = RuleBasedAdvisor.advise(&session).await.expect("advise");
        assert!(advice.escalation_reason.is_some());
    }

    #[test]
    fn recommendations_are_ranked_and_never_empty() {
        assert_eq!(recommendations_for(&[]).len(), 1);

        let points = vec![
            PainPoint {
                category: "reporting".to_string(),
                description: "x".to_string(),
                severity: Level::Low,
            },
            PainPoint {
                category: "data_entry".to_string(),
                description: "y".to_string(),
                severity: Level::High,
            },
            PainPoint {
                category: "unknown".to_string(),
                description: "z".to_string(),
                severity: Level::High,
            },
        ];
        let recommendations = recommendations_for(&points);
        assert_eq!(recommendations.len(), 2);
        assert_eq!(recommendations[0].priority, Level::High);
        assert_eq!(
            recommendations[0].title,
            "Connect systems to remove double entry"
        );
    }
}
