use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::Connection;
use tracing::{debug, instrument};

use crate::{
    db::init_db,
    error::{Result, StoreError},
    types::{ScheduleRecord, ScheduleStatus},
};

/// Persistence for schedule records.
///
/// Each `save` is expected to be atomic on its own; callers never batch.
pub trait ScheduleStore: Send + Sync {
    /// Insert `record` and return the assigned `schedule_id`.
    fn save(&self, record: &ScheduleRecord) -> Result<i64>;

    /// Most recent records first, optionally restricted to one job.
    fn recent(&self, job_code: Option<&str>, limit: usize) -> Result<Vec<ScheduleRecord>>;
}

/// SQLite-backed [`ScheduleStore`].
///
/// Wraps a single connection in a `Mutex`; the CLI is single-threaded so
/// there is no contention to speak of.
pub struct SqliteScheduleStore {
    db: Mutex<Connection>,
}

impl SqliteScheduleStore {
    /// Wrap `conn`, creating the schema if needed.
    pub fn new(conn: Connection) -> Result<Self> {
        init_db(&conn)?;
        Ok(Self {
            db: Mutex::new(conn),
        })
    }

    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        Self::new(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::new(Connection::open_in_memory()?)
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.db
            .lock()
            .map_err(|_| StoreError::Unavailable("connection lock poisoned".to_string()))
    }
}

impl ScheduleStore for SqliteScheduleStore {
    #[instrument(skip(self, record), fields(job_code = %record.job_code, status = %record.status))]
    fn save(&self, record: &ScheduleRecord) -> Result<i64> {
        let db = self.lock()?;
        db.execute(
            "INSERT INTO cron_schedule
             (job_code, status, messages, created_at, scheduled_at, executed_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            rusqlite::params![
                record.job_code,
                record.status.as_str(),
                record.messages,
                format_ts(&record.created_at),
                format_ts(&record.scheduled_at),
                record.executed_at.as_ref().map(format_ts),
            ],
        )?;
        let id = db.last_insert_rowid();
        debug!(schedule_id = id, "schedule record saved");
        Ok(id)
    }

    #[instrument(skip(self))]
    fn recent(&self, job_code: Option<&str>, limit: usize) -> Result<Vec<ScheduleRecord>> {
        let db = self.lock()?;
        let mut stmt = db.prepare(
            "SELECT schedule_id, job_code, status, messages, created_at, scheduled_at, executed_at
             FROM cron_schedule
             WHERE ?1 IS NULL OR job_code = ?1
             ORDER BY scheduled_at DESC, schedule_id DESC
             LIMIT ?2",
        )?;

        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let rows = stmt
            .query_map(rusqlite::params![job_code, limit], |row| {
                Ok(RawRecord {
                    schedule_id: row.get(0)?,
                    job_code: row.get(1)?,
                    status: row.get(2)?,
                    messages: row.get(3)?,
                    created_at: row.get(4)?,
                    scheduled_at: row.get(5)?,
                    executed_at: row.get(6)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        rows.into_iter().map(RawRecord::into_record).collect()
    }
}

/// Row as stored, before status and timestamp decoding.
struct RawRecord {
    schedule_id: i64,
    job_code: String,
    status: String,
    messages: Option<String>,
    created_at: String,
    scheduled_at: String,
    executed_at: Option<String>,
}

impl RawRecord {
    fn into_record(self) -> Result<ScheduleRecord> {
        let status = self
            .status
            .parse::<ScheduleStatus>()
            .map_err(|_| StoreError::Status(self.status.clone()))?;
        Ok(ScheduleRecord {
            schedule_id: Some(self.schedule_id),
            job_code: self.job_code,
            status,
            messages: self.messages,
            created_at: parse_ts("created_at", &self.created_at)?,
            scheduled_at: parse_ts("scheduled_at", &self.scheduled_at)?,
            executed_at: self
                .executed_at
                .as_deref()
                .map(|s| parse_ts("executed_at", s))
                .transpose()?,
        })
    }
}

fn format_ts(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn parse_ts(column: &'static str, value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| StoreError::Timestamp {
            column,
            value: value.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(h: u32, m: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, h, m, s).unwrap()
    }

    #[test]
    fn save_assigns_increasing_ids() {
        let store = SqliteScheduleStore::open_in_memory().unwrap();
        let a = store
            .save(&ScheduleRecord::new("a", ScheduleStatus::Pending, at(9, 0, 5)))
            .unwrap();
        let b = store
            .save(&ScheduleRecord::new("b", ScheduleStatus::Pending, at(9, 0, 6)))
            .unwrap();
        assert!(b > a);
    }

    #[test]
    fn recent_reads_back_all_columns() {
        let store = SqliteScheduleStore::open_in_memory().unwrap();
        let now = at(9, 15, 42);
        let mut record = ScheduleRecord::new("sitemap_generate", ScheduleStatus::Success, now);
        record.executed_at = Some(now);
        record.mark_failed("timeout talking to search backend");
        store.save(&record).unwrap();

        let rows = store.recent(None, 10).unwrap();
        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(row.job_code, "sitemap_generate");
        assert_eq!(row.status, ScheduleStatus::Error);
        assert_eq!(row.messages.as_deref(), Some("timeout talking to search backend"));
        assert_eq!(row.scheduled_at, at(9, 15, 0));
        assert_eq!(row.created_at, now);
        assert!(row.executed_at.is_none());
    }

    #[test]
    fn recent_filters_by_job_and_orders_newest_first() {
        let store = SqliteScheduleStore::open_in_memory().unwrap();
        store
            .save(&ScheduleRecord::new("a", ScheduleStatus::Pending, at(8, 0, 0)))
            .unwrap();
        store
            .save(&ScheduleRecord::new("b", ScheduleStatus::Pending, at(8, 1, 0)))
            .unwrap();
        store
            .save(&ScheduleRecord::new("a", ScheduleStatus::Pending, at(8, 2, 0)))
            .unwrap();

        let only_a = store.recent(Some("a"), 10).unwrap();
        assert_eq!(only_a.len(), 2);
        assert!(only_a.iter().all(|r| r.job_code == "a"));
        assert_eq!(only_a[0].scheduled_at, at(8, 2, 0));

        let limited = store.recent(None, 1).unwrap();
        assert_eq!(limited.len(), 1);
        assert_eq!(limited[0].scheduled_at, at(8, 2, 0));
    }

    #[test]
    fn unbounded_limit_returns_every_row() {
        let store = SqliteScheduleStore::open_in_memory().unwrap();
        for m in 0..3 {
            store
                .save(&ScheduleRecord::new("a", ScheduleStatus::Pending, at(7, m, 0)))
                .unwrap();
        }
        assert_eq!(store.recent(None, usize::MAX).unwrap().len(), 3);
    }

    #[test]
    fn bad_status_text_is_reported() {
        let store = SqliteScheduleStore::open_in_memory().unwrap();
        {
            let db = store.lock().unwrap();
            db.execute(
                "INSERT INTO cron_schedule (job_code, status, created_at, scheduled_at)
                 VALUES ('x', 'exploded', '2024-06-01T00:00:00Z', '2024-06-01T00:00:00Z')",
                [],
            )
            .unwrap();
        }
        let err = store.recent(None, 5).unwrap_err();
        assert!(matches!(err, StoreError::Status(ref s) if s == "exploded"));
    }
}
