//! Learning cache: a SQLite-backed mapping from exact task text to the
//! synthesized program and its reuse statistics. Program text is additionally
//! written to a timestamp-named file per save, so saved programs can be
//! inspected or re-run on their own.

use chrono::Utc;
use rusqlite::{Connection, params};
use std::fs;
use std::path::{Path, PathBuf};

use crate::types::{TaskRecord, WebbotError};

fn cache_err(e: impl std::fmt::Display) -> WebbotError {
    WebbotError::CacheError(e.to_string())
}

pub struct LearningCache {
    conn: Connection,
    programs_dir: PathBuf,
}

impl LearningCache {
    /// Opens (or creates) the cache database and the program file directory.
    pub fn open(db_path: &Path, programs_dir: &Path) -> Result<Self, WebbotError> {
        fs::create_dir_all(programs_dir).map_err(cache_err)?;
        let conn = Connection::open(db_path).map_err(cache_err)?;
        conn.execute(
            "CREATE TABLE IF NOT EXISTS tasks (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                task_text TEXT UNIQUE,
                program_location TEXT,
                program_text TEXT,
                last_used TEXT,
                success_count INTEGER DEFAULT 0,
                fail_count INTEGER DEFAULT 0
            )",
            [],
        )
        .map_err(cache_err)?;
        Ok(Self {
            conn,
            programs_dir: programs_dir.to_path_buf(),
        })
    }

    /// Exact-string lookup on the task text.
    pub fn lookup(&self, task_text: &str) -> Result<Option<TaskRecord>, WebbotError> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT id, task_text, program_location, program_text, last_used,
                        success_count, fail_count
                 FROM tasks WHERE task_text = ?1 LIMIT 1",
            )
            .map_err(cache_err)?;
        let row = stmt.query_row(params![task_text], |row| {
            Ok(TaskRecord {
                id: row.get(0)?,
                task_text: row.get(1)?,
                program_location: row.get(2)?,
                program_text: row.get(3)?,
                last_used: row.get(4)?,
                success_count: row.get(5)?,
                fail_count: row.get(6)?,
            })
        });
        match row {
            Ok(record) => Ok(Some(record)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(cache_err(e)),
        }
    }

    /// Writes the program text to a fresh timestamp-named file and
    /// creates-or-replaces the task record. Outcome counters carry forward on
    /// replacement; a brand-new record starts both at zero. Each save writes
    /// a new file rather than overwriting an earlier one.
    pub fn upsert(&self, task_text: &str, program_text: &str) -> Result<TaskRecord, WebbotError> {
        let file_name = format!("program_{}.json", Utc::now().timestamp_millis());
        let location = self.programs_dir.join(file_name);
        fs::write(&location, program_text).map_err(cache_err)?;

        let now = Utc::now().to_rfc3339();
        self.conn
            .execute(
                "INSERT INTO tasks (task_text, program_location, program_text, last_used)
                 VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT(task_text) DO UPDATE SET
                    program_location = excluded.program_location,
                    program_text = excluded.program_text,
                    last_used = excluded.last_used",
                params![
                    task_text,
                    location.to_string_lossy().into_owned(),
                    program_text,
                    now
                ],
            )
            .map_err(cache_err)?;

        self.lookup(task_text)?
            .ok_or_else(|| WebbotError::CacheError("record missing after upsert".to_string()))
    }

    /// Bumps the success or fail counter and refreshes `last_used` for the
    /// matching record. A no-op when no record exists; it never creates one.
    pub fn record_outcome(&self, task_text: &str, success: bool) -> Result<(), WebbotError> {
        let sql = if success {
            "UPDATE tasks SET success_count = success_count + 1, last_used = ?1
             WHERE task_text = ?2"
        } else {
            "UPDATE tasks SET fail_count = fail_count + 1, last_used = ?1
             WHERE task_text = ?2"
        };
        let now = Utc::now().to_rfc3339();
        self.conn
            .execute(sql, params![now, task_text])
            .map(|_| ())
            .map_err(cache_err)
    }
}
