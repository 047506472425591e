use std::path::Path;
#[cfg(unix)]
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, SecondsFormat, Utc};
use rusqlite::{Connection, OptionalExtension, params};

use crate::error::{AuditError, Result};
use crate::models::{AuditSession, AuditState, ContactInfo, SessionPatch, SessionSummary};

mod migration;
mod rate_limit;

#[derive(Clone)]
pub struct SqliteStateStore {
    conn: Arc<Mutex<Connection>>,
}

impl std::fmt::Debug for SqliteStateStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteStateStore").finish_non_exhaustive()
    }
}

impl SqliteStateStore {
    fn with_conn<T>(&self, f: impl FnOnce(&Connection) -> Result<T>) -> Result<T> {
        let conn = self
            .conn
            .lock()
            .map_err(|_| AuditError::mutex_poisoned("sqlite"))?;
        f(&conn)
    }

    fn with_tx<T>(&self, f: impl FnOnce(&rusqlite::Transaction<'_>) -> Result<T>) -> Result<T> {
        let mut conn = self
            .conn
            .lock()
            .map_err(|_| AuditError::mutex_poisoned("sqlite"))?;
        let tx = conn.transaction()?;
        let value = f(&tx)?;
        tx.commit()?;
        drop(conn);
        Ok(value)
    }

    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        let store = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        store.migrate()?;
        #[cfg(unix)]
        harden_sqlite_permissions(path)?;
        Ok(store)
    }

    /// Create and persist a fresh session whose opening question is already asked.
    pub fn create_session(
        &self,
        contact_info: Option<ContactInfo>,
        first_question: &str,
        ttl: Duration,
    ) -> Result<AuditSession> {
        let now = Utc::now();
        let session = AuditSession::start(contact_info, first_question, now, now + ttl);
        self.insert_session(&session)?;
        Ok(session)
    }

    pub fn insert_session(&self, session: &AuditSession) -> Result<()> {
        let record = serde_json::to_string(session)?;
        self.with_conn(|conn| {
            conn.execute(
                r"
                INSERT INTO audit_sessions(
                  session_id, state, question_count, version, record_json,
                  created_at, updated_at, expires_at
                )
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                ",
                params![
                    session.session_id,
                    session.state.as_str(),
                    session.question_count,
                    u64_to_i64_saturating(session.version),
                    record,
                    format_ts(session.created_at),
                    format_ts(session.updated_at),
                    format_ts(session.expires_at),
                ],
            )?;
            Ok(())
        })
    }

    /// Live session by id. Expired rows read as absent.
    pub fn get_session(&self, session_id: &str) -> Result<Option<AuditSession>> {
        let now = format_ts(Utc::now());
        self.with_conn(|conn| {
            let record = conn
                .query_row(
                    LIVE_SESSION_SQL,
                    params![session_id, now],
                    |row| row.get::<_, String>(0),
                )
                .optional()?;
            record
                .map(|raw| serde_json::from_str::<AuditSession>(&raw).map_err(AuditError::from))
                .transpose()
        })
    }

    /// Apply `patch` only if the stored version still equals `expected_version`.
    pub fn update_session(
        &self,
        session_id: &str,
        expected_version: u64,
        patch: SessionPatch,
    ) -> Result<AuditSession> {
        let now = Utc::now();
        self.with_tx(|tx| {
            let record = tx
                .query_row(
                    LIVE_SESSION_SQL,
                    params![session_id, format_ts(now)],
                    |row| row.get::<_, String>(0),
                )
                .optional()?
                .ok_or_else(|| AuditError::NotFound("Session not found".to_string()))?;
            let mut session = serde_json::from_str::<AuditSession>(&record)?;
            if session.version != expected_version {
                return Err(concurrent_update(session_id));
            }

            patch.apply_to(&mut session, now);
            let affected = tx.execute(
                r"
                UPDATE audit_sessions
                SET state = ?1,
                    question_count = ?2,
                    version = ?3,
                    record_json = ?4,
                    updated_at = ?5
                WHERE session_id = ?6 AND version = ?7
                ",
                params![
                    session.state.as_str(),
                    session.question_count,
                    u64_to_i64_saturating(session.version),
                    serde_json::to_string(&session)?,
                    format_ts(session.updated_at),
                    session_id,
                    u64_to_i64_saturating(expected_version),
                ],
            )?;
            if affected == 0 {
                return Err(concurrent_update(session_id));
            }
            Ok(session)
        })
    }

    pub fn list_sessions(&self, limit: usize) -> Result<Vec<SessionSummary>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                r"
                SELECT session_id, state, question_count, updated_at, expires_at
                FROM audit_sessions
                ORDER BY updated_at DESC, session_id ASC
                LIMIT ?1
                ",
            )?;
            let rows = stmt.query_map(params![usize_to_i64_saturating(limit)], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, u32>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, String>(4)?,
                ))
            })?;

            let mut out = Vec::new();
            for row in rows {
                let (session_id, state, question_count, updated_at, expires_at) = row?;
                let state = AuditState::parse(&state).ok_or_else(|| {
                    AuditError::Internal(format!("unknown session state in store: {state}"))
                })?;
                out.push(SessionSummary {
                    session_id,
                    state,
                    question_count,
                    updated_at: parse_ts(&updated_at)?,
                    expires_at: parse_ts(&expires_at)?,
                });
            }
            Ok(out)
        })
    }

    /// Delete sessions and rate-limit windows that are no longer live.
    pub fn purge_expired(&self, now: DateTime<Utc>) -> Result<usize> {
        let now_ts = format_ts(now);
        self.with_tx(|tx| {
            let sessions = tx.execute(
                "DELETE FROM audit_sessions WHERE expires_at <= ?1",
                params![now_ts],
            )?;
            tx.execute(
                "DELETE FROM rate_limits WHERE expires_at <= ?1",
                params![now.timestamp()],
            )?;
            Ok(sessions)
        })
    }
}

const LIVE_SESSION_SQL: &str =
    "SELECT record_json FROM audit_sessions WHERE session_id = ?1 AND expires_at > ?2";

fn concurrent_update(session_id: &str) -> AuditError {
    tracing::warn!(session_id, "rejected concurrent session update");
    AuditError::Conflict("Session was updated concurrently; please retry".to_string())
}

fn format_ts(value: DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_ts(raw: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|value| value.with_timezone(&Utc))
        .map_err(|err| AuditError::Internal(format!("invalid timestamp in store: {err}")))
}

fn u64_to_i64_saturating(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

fn usize_to_i64_saturating(value: usize) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

#[cfg(unix)]
fn harden_sqlite_permissions(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    for suffix in ["", "-wal", "-shm"] {
        let mut os = path.as_os_str().to_os_string();
        os.push(suffix);
        let candidate = PathBuf::from(os);
        if candidate.exists() {
            std::fs::set_permissions(candidate, std::fs::Permissions::from_mode(0o600))?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests;
