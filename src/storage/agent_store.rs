// SQLite-backed audit log, strategy notes, state snapshots and error context
use rusqlite::{Connection, OptionalExtension};
use std::path::PathBuf;

use super::{Result, StorageError};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS immutable_log (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    ts TEXT NOT NULL,
    category TEXT NOT NULL,
    message TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS strategy_notes (
    id INTEGER PRIMARY KEY CHECK (id = 1),
    updated_ts TEXT NOT NULL,
    content TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS state_snapshot (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    ts TEXT NOT NULL,
    payload TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS error_context (
    id INTEGER PRIMARY KEY CHECK (id = 1),
    ts TEXT NOT NULL,
    intent_summary TEXT,
    error_message TEXT NOT NULL,
    details TEXT NOT NULL
);
";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub ts: String,
    pub category: String,
    pub message: String,
}

impl LogEntry {
    /// `"{ts} {category}: {message}"`, the form used in prompts.
    pub fn as_line(&self) -> String {
        format!("{} {}: {}", self.ts, self.category, self.message)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StrategyNotes {
    pub updated_ts: String,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorContext {
    pub ts: String,
    pub intent_summary: Option<String>,
    pub error_message: String,
    pub details: String,
}

/// Single exclusive connection, opened once and reused. Every mutating call
/// commits on its own; nothing spans calls.
pub struct AgentStore {
    db_path: PathBuf,
    conn: Option<Connection>,
}

impl AgentStore {
    pub fn new(db_path: impl Into<PathBuf>) -> Self {
        Self {
            db_path: db_path.into(),
            conn: None,
        }
    }

    pub fn is_connected(&self) -> bool {
        self.conn.is_some()
    }

    /// Opens (creating if needed) the database and ensures the schema. Calling
    /// it again on an open store is a no-op.
    pub fn connect(&mut self) -> Result<()> {
        if self.conn.is_some() {
            return Ok(());
        }
        if let Some(parent) = self.db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let conn = Connection::open(&self.db_path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        conn.execute_batch(SCHEMA)?;
        tracing::debug!("💾 Opened agent store at {}", self.db_path.display());
        self.conn = Some(conn);
        Ok(())
    }

    pub fn close(&mut self) {
        if let Some(conn) = self.conn.take() {
            if let Err((_, e)) = conn.close() {
                tracing::warn!("⚠️ Failed to close agent store cleanly: {}", e);
            }
        }
    }

    fn conn(&self) -> Result<&Connection> {
        self.conn.as_ref().ok_or(StorageError::NotConnected)
    }

    pub fn append_log(&self, ts: &str, category: &str, message: &str) -> Result<()> {
        self.conn()?.execute(
            "INSERT INTO immutable_log (ts, category, message) VALUES (?1, ?2, ?3)",
            rusqlite::params![ts, category, message],
        )?;
        Ok(())
    }

    /// Most recent entries first.
    pub fn fetch_logs(&self, limit: usize) -> Result<Vec<LogEntry>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT ts, category, message FROM immutable_log ORDER BY id DESC LIMIT ?1",
        )?;
        let rows = stmt.query_map([limit as i64], |row| {
            Ok(LogEntry {
                ts: row.get(0)?,
                category: row.get(1)?,
                message: row.get(2)?,
            })
        })?;
        let mut entries = Vec::new();
        for row in rows {
            entries.push(row?);
        }
        Ok(entries)
    }

    /// The last `limit` entries, oldest first, formatted for prompt inclusion.
    pub fn recent_log_lines(&self, limit: usize) -> Result<Vec<String>> {
        let mut entries = self.fetch_logs(limit)?;
        entries.reverse();
        Ok(entries.iter().map(LogEntry::as_line).collect())
    }

    pub fn save_strategy_notes(&self, ts: &str, content: &str) -> Result<()> {
        self.conn()?.execute(
            "REPLACE INTO strategy_notes (id, updated_ts, content) VALUES (1, ?1, ?2)",
            rusqlite::params![ts, content],
        )?;
        Ok(())
    }

    pub fn fetch_strategy_notes(&self) -> Result<Option<StrategyNotes>> {
        let notes = self
            .conn()?
            .query_row(
                "SELECT updated_ts, content FROM strategy_notes WHERE id = 1",
                [],
                |row| {
                    Ok(StrategyNotes {
                        updated_ts: row.get(0)?,
                        content: row.get(1)?,
                    })
                },
            )
            .optional()?;
        Ok(notes)
    }

    pub fn save_state_snapshot(&self, ts: &str, payload: &str) -> Result<()> {
        self.conn()?.execute(
            "INSERT INTO state_snapshot (ts, payload) VALUES (?1, ?2)",
            rusqlite::params![ts, payload],
        )?;
        Ok(())
    }

    pub fn count_state_snapshots(&self) -> Result<usize> {
        let count: i64 = self
            .conn()?
            .query_row("SELECT COUNT(*) FROM state_snapshot", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    /// Replaces any previous error context; only the latest failure is kept.
    pub fn save_error_context(
        &self,
        ts: &str,
        intent_summary: Option<&str>,
        error_message: &str,
        details: &str,
    ) -> Result<()> {
        self.conn()?.execute(
            "REPLACE INTO error_context (id, ts, intent_summary, error_message, details)
             VALUES (1, ?1, ?2, ?3, ?4)",
            rusqlite::params![ts, intent_summary, error_message, details],
        )?;
        Ok(())
    }

    pub fn fetch_error_context(&self) -> Result<Option<ErrorContext>> {
        let context = self
            .conn()?
            .query_row(
                "SELECT ts, intent_summary, error_message, details FROM error_context WHERE id = 1",
                [],
                |row| {
                    Ok(ErrorContext {
                        ts: row.get(0)?,
                        intent_summary: row.get(1)?,
                        error_message: row.get(2)?,
                        details: row.get(3)?,
                    })
                },
            )
            .optional()?;
        Ok(context)
    }

    pub fn clear_error_context(&self) -> Result<()> {
        self.conn()?
            .execute("DELETE FROM error_context WHERE id = 1", [])?;
        Ok(())
    }
}

impl Drop for AgentStore {
    fn drop(&mut self) {
        self.close();
    }
}
