mod confidence;
mod session;
mod turn;

pub use confidence::{ConfidenceVector, Dimension};
pub use session::{
    AuditMessage, AuditSession, AuditState, ContactInfo, Level, PainPoint, Recommendation, Role,
    SessionPatch, SessionStatus,
};
pub use turn::{
    MessageTurn, SessionSummary, SessionTurn, SessionView, StartSessionRequest,
    SubmitMessageRequest,
};
