use crate::model::{CycleSpan, FeatureMap, Reading, SpanBounds, StorageError};
use crate::storage::{CycleRepository, ReadingStore};
use chrono::{DateTime, FixedOffset, SecondsFormat};
use rusqlite::{Connection, Row, params};
use tracing::debug;

pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Opens the database (`:memory:` works too) and runs migrations.
    pub fn new(db_path: &str) -> Result<Self, StorageError> {
        let conn = Connection::open(db_path)?;

        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS readings (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id TEXT NOT NULL,
                timestamp TEXT NOT NULL,
                flow_ml REAL
            );

            CREATE INDEX IF NOT EXISTS idx_readings_user_ts ON readings (user_id, timestamp);

            CREATE TABLE IF NOT EXISTS cycles (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id TEXT NOT NULL,
                start_date TEXT NOT NULL,
                end_date TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_cycles_user ON cycles (user_id, start_date);
            "
        )?;

        // Databases created before biomarkers were stored lack this column.
        Self::migrate_add_column_if_missing(
            &conn,
            "readings",
            "biomarkers",
            "TEXT NOT NULL DEFAULT '{}'",
        )?;

        Ok(Self { conn })
    }

    fn migrate_add_column_if_missing(
        conn: &Connection,
        table: &str,
        column: &str,
        column_def: &str,
    ) -> Result<(), StorageError> {
        let mut stmt = conn.prepare(&format!("PRAGMA table_info({})", table))?;
        let existing_columns: Vec<String> = stmt
            .query_map([], |row| row.get::<_, String>(1))?
            .collect::<Result<_, _>>()?;

        if !existing_columns.iter().any(|c| c == column) {
            let alter_sql = format!("ALTER TABLE {} ADD COLUMN {} {}", table, column, column_def);
            conn.execute(&alter_sql, [])?;
        }

        Ok(())
    }

    /// Distinct users that have at least one reading.
    pub fn list_users(&self) -> Result<Vec<String>, StorageError> {
        let mut stmt = self.conn.prepare("SELECT DISTINCT user_id FROM readings ORDER BY user_id")?;
        let users = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<_, _>>()?;
        Ok(users)
    }

    fn map_reading(row: &Row) -> Result<(String, String, Option<f64>, String), rusqlite::Error> {
        Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
    }

    fn map_span(row: &Row) -> Result<CycleSpan, rusqlite::Error> {
        Ok(CycleSpan {
            id: row.get(0)?,
            user_id: row.get(1)?,
            start_date: row.get(2)?,
            end_date: row.get(3)?,
        })
    }
}

// Full precision and the recorded offset; ordering is done after loading.
fn timestamp_text(ts: &DateTime<FixedOffset>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::AutoSi, false)
}

impl ReadingStore for SqliteStorage {
    fn list_readings(&self, user_id: &str) -> Result<Vec<Reading>, StorageError> {
        let mut stmt = self.conn.prepare(
            "SELECT user_id, timestamp, flow_ml, biomarkers
             FROM readings WHERE user_id = ?1 ORDER BY id ASC",
        )?;

        let rows = stmt.query_map(params![user_id], Self::map_reading)?;
        let mut readings = Vec::new();
        for row in rows {
            let (user_id, timestamp, flow_ml, biomarkers) = row?;
            let biomarkers: FeatureMap = serde_json::from_str(&biomarkers)?;
            readings.push(Reading {
                user_id,
                timestamp: DateTime::parse_from_rfc3339(&timestamp)?,
                flow_ml,
                biomarkers,
            });
        }
        // Stable: equal instants keep insertion order.
        readings.sort_by_key(|r| r.timestamp);
        Ok(readings)
    }

    fn append_reading(&self, reading: &Reading) -> Result<(), StorageError> {
        self.conn.execute(
            "INSERT INTO readings (user_id, timestamp, flow_ml, biomarkers)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                &reading.user_id,
                timestamp_text(&reading.timestamp),
                reading.flow_ml,
                serde_json::to_string(&reading.biomarkers)?,
            ],
        )?;
        Ok(())
    }
}

impl CycleRepository for SqliteStorage {
    /// Delete-and-insert inside one transaction; other connections keep
    /// seeing the previous set until commit.
    fn replace_spans(
        &self,
        user_id: &str,
        spans: &[SpanBounds],
    ) -> Result<Vec<CycleSpan>, StorageError> {
        let tx = self.conn.unchecked_transaction()?;
        let removed = tx.execute("DELETE FROM cycles WHERE user_id = ?1", params![user_id])?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO cycles (user_id, start_date, end_date) VALUES (?1, ?2, ?3)",
            )?;
            for span in spans {
                stmt.execute(params![user_id, span.start, span.end])?;
            }
        }
        tx.commit()?;
        debug!("Replaced {} cycles with {} for {}", removed, spans.len(), user_id);

        self.list_spans(user_id)
    }

    fn list_spans(&self, user_id: &str) -> Result<Vec<CycleSpan>, StorageError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, user_id, start_date, end_date
             FROM cycles WHERE user_id = ?1 ORDER BY start_date ASC, id ASC",
        )?;
        let spans = stmt
            .query_map(params![user_id], Self::map_span)?
            .collect::<Result<_, _>>()?;
        Ok(spans)
    }

    fn get_span(&self, user_id: &str, id: i64) -> Result<Option<CycleSpan>, StorageError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, user_id, start_date, end_date FROM cycles WHERE user_id = ?1 AND id = ?2",
        )?;
        let mut rows = stmt.query(params![user_id, id])?;
        match rows.next()? {
            Some(row) => Ok(Some(Self::map_span(row)?)),
            None => Ok(None),
        }
    }
}
