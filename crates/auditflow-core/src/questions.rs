use crate::models::{AuditMessage, ConfidenceVector, Dimension, Role};

/// Number of discovery questions asked verbatim before the advisor takes over.
pub const FIXED_QUESTION_COUNT: u32 = 3;

pub const DISCOVERY_QUESTIONS: [&str; FIXED_QUESTION_COUNT as usize] = [
    "To get started, tell me about your business: what do you do and who are your customers?",
    "Which tasks or processes take up the most time for you or your team each week?",
    "What tools or software do you currently use to run those processes?",
];

const DISCOVERY_TARGETS: [Dimension; FIXED_QUESTION_COUNT as usize] = [
    Dimension::Information,
    Dimension::Pain,
    Dimension::Resources,
];

const FOLLOWUP_BANK: [(Dimension, &str); 10] = [
    (
        Dimension::Information,
        "How many people are involved in the day-to-day work, and how is it split between them?",
    ),
    (
        Dimension::Information,
        "Walk me through what happens from the moment a new customer reaches out to you.",
    ),
    (
        Dimension::Resources,
        "Who on your team would own a new system once it is in place?",
    ),
    (
        Dimension::Resources,
        "Where does your customer and job data live today: spreadsheets, a CRM, or somewhere else?",
    ),
    (
        Dimension::Pain,
        "What goes wrong most often in those processes, and what does it cost you when it does?",
    ),
    (
        Dimension::Pain,
        "If you could stop doing one task by hand tomorrow, which would it be?",
    ),
    (
        Dimension::Money,
        "Roughly how many hours a week does this cost, and what is an hour of that time worth to you?",
    ),
    (
        Dimension::Money,
        "Do you have a budget in mind for fixing this over the next few months?",
    ),
    (
        Dimension::Knowledge,
        "How comfortable is your team with adopting new software?",
    ),
    (
        Dimension::Knowledge,
        "Have you tried automating any of this before? How did it go?",
    ),
];

const CLOSING_FALLBACK_QUESTION: &str =
    "Is there anything else about how your business runs that you would like me to know?";

#[must_use]
pub const fn is_fixed_question(question_count: u32) -> bool {
    question_count <= FIXED_QUESTION_COUNT
}

/// The scripted question for `question_count` (1-based), if it falls in the
/// discovery phase.
#[must_use]
pub fn fixed_question(question_count: u32) -> Option<&'static str> {
    if question_count == 0 || !is_fixed_question(question_count) {
        return None;
    }
    DISCOVERY_QUESTIONS
        .get((question_count - 1) as usize)
        .copied()
}

#[must_use]
pub fn opening_question() -> &'static str {
    DISCOVERY_QUESTIONS[0]
}

/// Dimension a known question is meant to inform.
#[must_use]
pub fn question_target(question: &str) -> Option<Dimension> {
    DISCOVERY_QUESTIONS
        .iter()
        .zip(DISCOVERY_TARGETS)
        .find(|(text, _)| **text == question)
        .map(|(_, dimension)| dimension)
        .or_else(|| {
            FOLLOWUP_BANK
                .iter()
                .find(|(_, text)| *text == question)
                .map(|(dimension, _)| *dimension)
        })
}

/// Local follow-up selection: the weakest dimensions first, never repeating a
/// question already asked in this conversation.
#[must_use]
pub fn followup_question(
    messages: &[AuditMessage],
    confidence: &ConfidenceVector,
) -> (Option<Dimension>, &'static str) {
    let mut dimensions = Dimension::ALL;
    dimensions.sort_by(|a, b| confidence.get(*a).total_cmp(&confidence.get(*b)));

    let already_asked = |candidate: &str| {
        messages
            .iter()
            .any(|message| message.role == Role::Assistant && message.content == candidate)
    };

    for dimension in dimensions {
        if let Some((_, text)) = FOLLOWUP_BANK
            .iter()
            .find(|(target, text)| *target == dimension && !already_asked(*text))
        {
            return (Some(dimension), *text);
        }
    }
    (None, CLOSING_FALLBACK_QUESTION)
}
