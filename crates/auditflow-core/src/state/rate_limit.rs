use rusqlite::{OptionalExtension, params};

use crate::error::Result;

use super::SqliteStateStore;

impl SqliteStateStore {
    /// Count one hit against `key` in the fixed window starting at
    /// `window_start` (unix seconds). Returns `false` without counting when the
    /// window already holds `limit` hits. Rows whose window closed before
    /// `window_start` are dropped in the same transaction.
    pub fn record_rate_limit_hit(
        &self,
        key: &str,
        window_start: i64,
        window_secs: i64,
        limit: u32,
    ) -> Result<bool> {
        self.with_tx(|tx| {
            tx.execute(
                "DELETE FROM rate_limits WHERE expires_at <= ?1",
                params![window_start],
            )?;
            let current = tx
                .query_row(
                    "SELECT window_start, count FROM rate_limits WHERE key = ?1",
                    params![key],
                    |row| Ok((row.get::<_, i64>(0)?, row.get::<_, u32>(1)?)),
                )
                .optional()?;
            let count = match current {
                Some((stored_window, count)) if stored_window == window_start => count,
                _ => 0,
            };
            if count >= limit {
                return Ok(false);
            }
            tx.execute(
                r"
                INSERT INTO rate_limits(key, window_start, count, expires_at)
                VALUES (?1, ?2, ?3, ?4)
                ON CONFLICT(key) DO UPDATE SET
                  window_start = excluded.window_start,
                  count = excluded.count,
                  expires_at = excluded.expires_at
                ",
                params![
                    key,
                    window_start,
                    count + 1,
                    window_start.saturating_add(window_secs)
                ],
            )?;
            Ok(true)
        })
    }

    #[cfg(test)]
    pub(crate) fn rate_limit_rows(&self) -> Result<i64> {
        self.with_conn(|conn| {
            Ok(conn.query_row("SELECT COUNT(*) FROM rate_limits", [], |row| row.get(0))?)
        })
    }
}
