use anyhow::Result;
use auditflow_core::AuditService;
use auditflow_core::models::{ContactInfo, StartSessionRequest, SubmitMessageRequest};

use crate::cli::SessionCommand;

use super::support::{block_on, print_json};

/// Answers sent from the terminal share one rate-limit bucket.
const LOCAL_CLIENT: &str = "cli";

pub(super) fn handle_session(service: &AuditService, command: SessionCommand) -> Result<()> {
    match command {
        SessionCommand::Start {
            resume,
            name,
            email,
        } => {
            let contact_info = (name.is_some() || email.is_some()).then_some(ContactInfo {
                name,
                email,
                phone: None,
            });
            let turn = service.start_session(StartSessionRequest {
                resume_session_id: resume,
                contact_info,
            })?;
            print_json(&turn)?;
        }
        SessionCommand::Answer { id, message } => {
            let turn = block_on(service.submit_message(
                SubmitMessageRequest {
                    session_id: id,
                    message,
                    contact_info: None,
                },
                LOCAL_CLIENT,
            ))??;
            print_json(&turn)?;
        }
        SessionCommand::Show { id } => {
            print_json(&service.get_session_view(&id)?)?;
        }
        SessionCommand::List { limit } => {
            print_json(&service.list_sessions(limit)?)?;
        }
        SessionCommand::EmailResults { id } => {
            block_on(service.email_results(&id))??;
            print_json(&serde_json::json!({ "success": true }))?;
        }
        SessionCommand::Purge => {
            let purged = service.purge_expired()?;
            print_json(&serde_json::json!({ "purged": purged }))?;
        }
    }
    Ok(())
}
