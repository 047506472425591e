use chrono::{Duration, Utc};
use tempfile::tempdir;

use crate::models::{AuditMessage, AuditState, ContactInfo, Level, PainPoint, SessionPatch};

use super::*;

fn open_store() -> (tempfile::TempDir, SqliteStateStore) {
    let temp = tempdir().expect("tempdir");
    let store = SqliteStateStore::open(temp.path().join("state.db")).expect("open failed");
    (temp, store)
}

#[test]
fn create_then_get_returns_fresh_session() {
    let (_temp, store) = open_store();
    let created = store
        .create_session(
            Some(ContactInfo {
                email: Some("owner@shop.example".to_string()),
                ..ContactInfo::default()
            }),
            "first question",
            Duration::hours(1),
        )
        .expect("create");

    let loaded = store
        .get_session(&created.session_id)
        .expect("get")
        .expect("present");
    assert_eq!(loaded, created);
    assert_eq!(loaded.state, AuditState::Discovery);
    assert_eq!(loaded.question_count, 1);
    assert_eq!(loaded.messages.len(), 1);
    assert_eq!(loaded.confidence.overall, 0.0);
    assert_eq!(loaded.contact_email(), Some("owner@shop.example"));
}

#[test]
fn missing_session_reads_as_none() {
    let (_temp, store) = open_store();
    assert!(
        store
            .get_session("7b0d8b1e-8a53-4a5c-9a5e-1a7b1f0c9d11")
            .expect("get")
            .is_none()
    );
}

#[test]
fn update_applies_patch_and_bumps_version() {
    let (_temp, store) = open_store();
    let created = store
        .create_session(None, "q1", Duration::hours(1))
        .expect("create");
    let now = Utc::now();
    let point = PainPoint {
        category: "scheduling".to_string(),
        description: "manual booking".to_string(),
        severity: Level::High,
    };

    let updated = store
        .update_session(
            &created.session_id,
            created.version,
            SessionPatch {
                question_count: Some(2),
                append_messages: vec![
                    AuditMessage::user("answer", now),
                    AuditMessage::assistant("q2", now),
                ],
                add_pain_points: vec![point.clone(), point.clone()],
                ..SessionPatch::default()
            },
        )
        .expect("update");
    assert_eq!(updated.version, created.version + 1);
    assert_eq!(updated.question_count, 2);
    assert_eq!(updated.messages.len(), 3);
    assert_eq!(updated.pain_points, vec![point]);

    let reloaded = store
        .get_session(&created.session_id)
        .expect("get")
        .expect("present");
    assert_eq!(reloaded, updated);
}

#[test]
fn stale_version_is_rejected_without_writing() {
    let (_temp, store) = open_store();
    let created = store
        .create_session(None, "q1", Duration::hours(1))
        .expect("create");
    store
        .update_session(
            &created.session_id,
            created.version,
            SessionPatch {
                question_count: Some(2),
                ..SessionPatch::default()
            },
        )
        .expect("first update");

    let err = store
        .update_session(
            &created.session_id,
            created.version,
            SessionPatch {
                question_count: Some(3),
                ..SessionPatch::default()
            },
        )
        .expect_err("stale version");
    assert!(matches!(err, AuditError::Conflict(_)));

    let reloaded = store
        .get_session(&created.session_id)
        .expect("get")
        .expect("present");
    assert_eq!(reloaded.question_count, 2);
}

#[test]
fn update_of_missing_session_is_not_found() {
    let (_temp, store) = open_store();
    let err = store
        .update_session("nope", 0, SessionPatch::default())
        .expect_err("missing");
    assert!(matches!(err, AuditError::NotFound(_)));
}

#[test]
fn expired_sessions_are_hidden_and_purged() {
    let (_temp, store) = open_store();
    let expired = store
        .create_session(None, "q1", Duration::seconds(-5))
        .expect("create expired");
    let live = store
        .create_session(None, "q1", Duration::hours(1))
        .expect("create live");

    assert!(store.get_session(&expired.session_id).expect("get").is_none());
    assert_eq!(store.list_sessions(10).expect("list").len(), 2);

    let purged = store.purge_expired(Utc::now()).expect("purge");
    assert_eq!(purged, 1);
    let remaining = store.list_sessions(10).expect("list");
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].session_id, live.session_id);
}

#[test]
fn rate_limit_window_counts_and_resets() {
    let (_temp, store) = open_store();
    for _ in 0..3 {
        assert!(
            store
                .record_rate_limit_hit("ip:10.0.0.1", 600, 60, 3)
                .expect("hit")
        );
    }
    assert!(
        !store
            .record_rate_limit_hit("ip:10.0.0.1", 600, 60, 3)
            .expect("over limit")
    );
    assert!(
        store
            .record_rate_limit_hit("ip:10.0.0.2", 600, 60, 3)
            .expect("other key")
    );
    assert!(
        store
            .record_rate_limit_hit("ip:10.0.0.1", 660, 60, 3)
            .expect("next window")
    );
}

#[test]
fn closed_rate_limit_windows_are_pruned_on_next_hit() {
    let (_temp, store) = open_store();
    for n in 0..50 {
        assert!(
            store
                .record_rate_limit_hit(&format!("ip:10.0.1.{n}"), 0, 60, 10)
                .expect("old hit")
        );
    }
    assert_eq!(store.rate_limit_rows().expect("rows"), 50);

    assert!(
        store
            .record_rate_limit_hit("ip:10.0.2.1", 7_200, 60, 10)
            .expect("current hit")
    );
    assert_eq!(store.rate_limit_rows().expect("rows"), 1);
}

#[cfg(unix)]
#[test]
fn open_hardens_state_db_permissions() {
    use std::os::unix::fs::PermissionsExt;

    let temp = tempdir().expect("tempdir");
    let db_path = temp.path().join("state.db");
    let store = SqliteStateStore::open(&db_path).expect("open failed");
    let _ = store
        .create_session(None, "q1", Duration::hours(1))
        .expect("create");

    let mode = std::fs::metadata(&db_path)
        .expect("metadata")
        .permissions()
        .mode()
        & 0o777;
    assert_eq!(mode, 0o600);
}
