use tempfile::tempdir;

use auditflow_core::models::AuditState;

use super::*;
use crate::cli::{SessionArgs, SessionCommand};

#[test]
fn session_commands_drive_a_conversation() {
    let temp = tempdir().expect("tempdir");
    let db = temp.path().join("nested").join("state.sqlite3");

    run(
        &db,
        Commands::Session(SessionArgs {
            command: SessionCommand::Start {
                resume: None,
                name: None,
                email: Some("owner@shop.example".to_string()),
            },
        }),
    )
    .expect("start");
    assert!(db.exists());

    let service = AuditService::open(AppConfig::default(), &db).expect("reopen");
    let sessions = service.list_sessions(10).expect("list");
    assert_eq!(sessions.len(), 1);
    let id = sessions[0].session_id.clone();

    run(
        &db,
        Commands::Session(SessionArgs {
            command: SessionCommand::Answer {
                id: id.clone(),
                message: "We install solar panels for homeowners.".to_string(),
            },
        }),
    )
    .expect("answer");

    let session = service.get_session(&id).expect("session");
    assert_eq!(session.question_count, 2);
    assert_eq!(session.state, AuditState::Discovery);
}

#[test]
fn email_results_for_open_session_fails() {
    let temp = tempdir().expect("tempdir");
    let db = temp.path().join("state.sqlite3");
    let service = AuditService::open(AppConfig::default(), &db).expect("open");
    let turn = service
        .start_session(auditflow_core::models::StartSessionRequest::default())
        .expect("start");

    let err = run(
        &db,
        Commands::Session(SessionArgs {
            command: SessionCommand::EmailResults {
                id: turn.session_id,
            },
        }),
    )
    .expect_err("not complete");
    assert!(err.to_string().contains("Audit not complete"));
}
