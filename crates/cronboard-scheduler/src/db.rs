use rusqlite::Connection;

use crate::error::Result;

/// Initialise the schedule schema in `conn`.
///
/// Creates the `cron_schedule` table (idempotent) plus an index on
/// `(job_code, scheduled_at)` for per-job history lookups.
pub fn init_db(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS cron_schedule (
            schedule_id  INTEGER PRIMARY KEY AUTOINCREMENT,
            job_code     TEXT    NOT NULL,
            status       TEXT    NOT NULL DEFAULT 'pending',
            messages     TEXT,               -- failure text or handler output
            created_at   TEXT    NOT NULL,   -- RFC 3339
            scheduled_at TEXT    NOT NULL,   -- RFC 3339, minute aligned
            executed_at  TEXT                -- RFC 3339 or NULL
        );

        CREATE INDEX IF NOT EXISTS idx_cron_schedule_job
            ON cron_schedule (job_code, scheduled_at);
        ",
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        init_db(&conn).unwrap();
        init_db(&conn).unwrap();
        let n: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE name IN ('cron_schedule', 'idx_cron_schedule_job')",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(n, 2);
    }
}
