use uuid::Uuid;

use crate::error::{AuditError, Result};
use crate::models::ContactInfo;

pub const MAX_MESSAGE_CHARS: usize = 2000;
const MAX_NAME_CHARS: usize = 120;
const MAX_EMAIL_CHARS: usize = 254;
const MAX_PHONE_CHARS: usize = 32;

/// Canonical (lowercase hyphenated) form of a client-supplied session id.
pub fn session_id(raw: &str) -> Result<String> {
    Uuid::parse_str(raw.trim())
        .map(|id| id.to_string())
        .map_err(|_| AuditError::Validation("Invalid session ID".to_string()))
}

/// Trim, drop control characters other than newline and tab, and bound length.
pub fn message(raw: &str) -> Result<String> {
    let cleaned: String = raw
        .trim()
        .chars()
        .filter(|c| !c.is_control() || matches!(c, '\n' | '\t'))
        .collect();
    if cleaned.is_empty() {
        return Err(AuditError::Validation("Message is required".to_string()));
    }
    if cleaned.chars().count() > MAX_MESSAGE_CHARS {
        return Err(AuditError::Validation(format!(
            "Message must be at most {MAX_MESSAGE_CHARS} characters"
        )));
    }
    Ok(cleaned)
}

/// Normalise contact fields. Blank fields become absent; a fully blank record
/// becomes `None`.
pub fn contact_info(raw: Option<ContactInfo>) -> Result<Option<ContactInfo>> {
    let Some(raw) = raw else {
        return Ok(None);
    };
    let name = bounded_field(raw.name.as_deref(), MAX_NAME_CHARS, "Name")?;
    let phone = bounded_field(raw.phone.as_deref(), MAX_PHONE_CHARS, "Phone")?;
    let email = bounded_field(raw.email.as_deref(), MAX_EMAIL_CHARS, "Email")?
        .map(|email| email.to_ascii_lowercase());
    if let Some(email) = email.as_deref()
        && !is_plausible_email(email)
    {
        return Err(AuditError::Validation("Invalid email address".to_string()));
    }
    let info = ContactInfo { name, email, phone };
    Ok((!info.is_empty()).then_some(info))
}

fn bounded_field(raw: Option<&str>, max_chars: usize, label: &str) -> Result<Option<String>> {
    let Some(value) = raw.map(str::trim).filter(|value| !value.is_empty()) else {
        return Ok(None);
    };
    if value.chars().any(char::is_control) {
        return Err(AuditError::Validation(format!(
            "{label} contains invalid characters"
        )));
    }
    if value.chars().count() > max_chars {
        return Err(AuditError::Validation(format!(
            "{label} must be at most {max_chars} characters"
        )));
    }
    Ok(Some(value.to_string()))
}

fn is_plausible_email(email: &str) -> bool {
    let mut parts = email.split('@');
    let (Some(local), Some(domain), None) = (parts.next(), parts.next(), parts.next()) else {
        return false;
    };
    !local.is_empty()
        && !email.chars().any(char::is_whitespace)
        && domain.split('.').count() >= 2
        && domain.split('.').all(|label| !label.is_empty())
}
