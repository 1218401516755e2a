use super::{PageUsage, PrintStore, StoreResult};
use crate::quota::{PrintJob, Refund};
use rusqlite::{Connection, OptionalExtension, params};
use std::sync::Mutex;

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub struct SqlitePrintStore {
    connection: Mutex<Connection>,
}

impl SqlitePrintStore {
    pub fn new<P: AsRef<std::path::Path>>(path: P) -> StoreResult<Self> {
        let connection = Connection::open(path)?;
        Self::initialize_schema(&connection)?;
        Ok(Self {
            connection: Mutex::new(connection),
        })
    }

    fn initialize_schema(connection: &Connection) -> StoreResult<()> {
        let ddl = r#"
            CREATE TABLE IF NOT EXISTS printed (
                user TEXT PRIMARY KEY,
                today INTEGER NOT NULL DEFAULT 0,
                semester INTEGER NOT NULL DEFAULT 0
            );
            CREATE TABLE IF NOT EXISTS jobs (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user TEXT NOT NULL,
                time TEXT NOT NULL,
                pages INTEGER NOT NULL,
                queue TEXT NOT NULL,
                printer TEXT NOT NULL,
                doc_name TEXT NOT NULL,
                filesize INTEGER NOT NULL
            );
            CREATE TABLE IF NOT EXISTS refunds (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user TEXT NOT NULL,
                time TEXT NOT NULL,
                pages INTEGER NOT NULL,
                staffer TEXT NOT NULL,
                reason TEXT NOT NULL
            );
        "#;
        connection.execute_batch(ddl)?;
        tracing::debug!("print store schema initialized");
        Ok(())
    }

    /// Upsert the cumulative page counters for a user.
    ///
    /// Quota reads never write; the accounting side that tallies jobs and
    /// refunds maintains these counters.
    pub fn record_usage(&self, user: &str, today: u32, semester: u32) -> StoreResult<()> {
        let conn = self.connection.lock().expect("sqlite mutex poisoned");
        conn.execute(
            "INSERT INTO printed (user, today, semester) VALUES (?1, ?2, ?3)
             ON CONFLICT(user) DO UPDATE SET today = excluded.today, semester = excluded.semester",
            params![user, today, semester],
        )?;
        Ok(())
    }
}

impl PrintStore for SqlitePrintStore {
    fn pages_used(&self, user: &str) -> StoreResult<Option<PageUsage>> {
        let conn = self.connection.lock().expect("sqlite mutex poisoned");
        let mut stmt = conn.prepare("SELECT today, semester FROM printed WHERE user = ?1")?;
        let usage = stmt
            .query_row(params![user], |row| {
                Ok(PageUsage {
                    today: row.get(0)?,
                    semester: row.get(1)?,
                })
            })
            .optional()?;
        Ok(usage)
    }

    fn add_job(&self, job: &PrintJob) -> StoreResult<()> {
        let conn = self.connection.lock().expect("sqlite mutex poisoned");
        conn.execute(
            "INSERT INTO jobs (user, time, pages, queue, printer, doc_name, filesize)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                job.user,
                job.time.format(TIME_FORMAT).to_string(),
                job.pages,
                job.queue,
                job.printer,
                job.doc_name,
                job.filesize,
            ],
        )?;
        Ok(())
    }

    fn add_refund(&self, refund: &Refund) -> StoreResult<()> {
        let conn = self.connection.lock().expect("sqlite mutex poisoned");
        conn.execute(
            "INSERT INTO refunds (user, time, pages, staffer, reason)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                refund.user,
                refund.time.format(TIME_FORMAT).to_string(),
                refund.pages,
                refund.staffer,
                refund.reason,
            ],
        )?;
        Ok(())
    }
}
