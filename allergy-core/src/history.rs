//! Append-only query history.
//!
//! The SQLite table keeps the layout `id, city, symptoms, recommendations,
//! timestamp` with list columns flattened to comma-separated text and
//! timestamps written as local wall-clock time, matching existing databases.

use anyhow::{Context, Result, anyhow};
use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Utc};
use rusqlite::{Connection, params};
use std::{
    fmt::Debug,
    path::{Path, PathBuf},
    sync::Mutex,
};

use crate::{error::AdvisorError, model::HistoryRecord};

/// Text format of the `timestamp` column.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub trait HistoryStore: Send + Sync + Debug {
    /// Appends one record atomically.
    fn append(&self, record: &HistoryRecord) -> Result<()>;

    /// All records, newest first.
    fn list_all(&self) -> Result<Vec<HistoryRecord>>;
}

/// Reads every record, newest first, reporting storage faults as
/// [`AdvisorError::PersistenceFailure`].
pub fn read_history(store: &dyn HistoryStore) -> Result<Vec<HistoryRecord>, AdvisorError> {
    store.list_all().map_err(|err| {
        tracing::error!(error = %format!("{err:#}"), "failed to read query history");
        AdvisorError::PersistenceFailure(err)
    })
}

/// History store backed by a single SQLite file.
///
/// Writers are serialized through the connection mutex and each append is
/// one `INSERT`.
#[derive(Debug)]
pub struct SqliteHistoryStore {
    conn: Mutex<Connection>,
    db_path: PathBuf,
}

impl SqliteHistoryStore {
    /// Open or create the store at `path`.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open history database: {}", path.display()))?;

        Self::init(conn, path.to_path_buf())
    }

    /// In-memory store, discarded when dropped.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("Failed to open in-memory database")?;
        Self::init(conn, PathBuf::from(":memory:"))
    }

    fn init(conn: Connection, db_path: PathBuf) -> Result<Self> {
        conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS history (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                city TEXT NOT NULL,
                symptoms TEXT NOT NULL,
                recommendations TEXT NOT NULL,
                timestamp TEXT NOT NULL
            )
            "#,
            [],
        )
        .context("Failed to create history table")?;

        Ok(Self { conn: Mutex::new(conn), db_path })
    }

    pub fn path(&self) -> &Path {
        &self.db_path
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| anyhow!("History database lock poisoned"))
    }
}

impl HistoryStore for SqliteHistoryStore {
    fn append(&self, record: &HistoryRecord) -> Result<()> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO history (city, symptoms, recommendations, timestamp) \
             VALUES (?1, ?2, ?3, ?4)",
            params![
                record.city,
                record.symptoms,
                record.recommendations,
                format_timestamp(record.timestamp),
            ],
        )
        .context("Failed to insert history record")?;
        Ok(())
    }

    fn list_all(&self) -> Result<Vec<HistoryRecord>> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare(
                "SELECT city, symptoms, recommendations, timestamp FROM history \
                 ORDER BY timestamp DESC, id DESC",
            )
            .context("Failed to prepare history query")?;

        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
            ))
        })?;

        let mut records = Vec::new();
        for row in rows {
            let (city, symptoms, recommendations, timestamp) = row?;
            records.push(HistoryRecord {
                city,
                symptoms,
                recommendations,
                timestamp: parse_timestamp(&timestamp)?,
            });
        }
        Ok(records)
    }
}

fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.with_timezone(&Local).format(TIMESTAMP_FORMAT).to_string()
}

fn parse_timestamp(text: &str) -> Result<DateTime<Utc>> {
    let naive = NaiveDateTime::parse_from_str(text, TIMESTAMP_FORMAT)
        .with_context(|| format!("Invalid history timestamp: {text}"))?;
    let local = Local
        .from_local_datetime(&naive)
        .earliest()
        .ok_or_else(|| anyhow!("History timestamp does not exist in local time: {text}"))?;
    Ok(local.with_timezone(&Utc))
}
