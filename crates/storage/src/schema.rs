// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Contributors

//! Schema creation and `user_version`-gated migrations.

use crate::error::Result;
use rusqlite::Connection;
use std::path::Path;

/// Current schema version. Bump alongside adding a migration step below.
pub const SCHEMA_VERSION: i32 = 1;

/// Open a connection with the pragmas this crate relies on for concurrent
/// access: WAL so readers don't block the writer, and a busy timeout so a
/// momentary writer lock doesn't surface as an error.
pub fn connect(db_path: &Path) -> Result<Connection> {
    let conn = Connection::open(db_path)?;
    conn.execute_batch(
        r#"
        PRAGMA journal_mode = WAL;
        PRAGMA synchronous = NORMAL;
        PRAGMA foreign_keys = ON;
        PRAGMA busy_timeout = 5000;
        "#,
    )?;
    Ok(conn)
}

/// Create tables that don't exist yet and apply any pending migrations,
/// gated on `PRAGMA user_version` so repeated calls are cheap no-ops.
///
/// Four relations: `executions` (one row per run, denormalized with a
/// snapshot of the story at start time), `step_executions` (one row per
/// step attempt), `step_outputs` (line-numbered output, bounded per step),
/// and `step_averages` (the durable, arithmetic-mean counterpart to the
/// in-memory IIR estimate `Queue` keeps for ETA display).
pub fn migrate(conn: &Connection) -> Result<()> {
    let version: i32 = conn.query_row("PRAGMA user_version", [], |row| row.get(0))?;

    if version < 1 {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS executions (
                id TEXT PRIMARY KEY,
                story_key TEXT NOT NULL,
                story_epic INTEGER,
                story_status TEXT,
                story_title TEXT,
                status TEXT NOT NULL,
                current_step INTEGER NOT NULL,
                start_time INTEGER NOT NULL,
                end_time INTEGER,
                duration_ms INTEGER,
                error TEXT,
                created_at INTEGER NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_executions_story_key ON executions(story_key);
            CREATE INDEX IF NOT EXISTS idx_executions_status ON executions(status);
            CREATE INDEX IF NOT EXISTS idx_executions_start_time ON executions(start_time DESC);
            CREATE INDEX IF NOT EXISTS idx_executions_epic ON executions(story_epic);

            CREATE TABLE IF NOT EXISTS step_executions (
                id TEXT PRIMARY KEY,
                execution_id TEXT NOT NULL REFERENCES executions(id) ON DELETE CASCADE,
                step_index INTEGER NOT NULL,
                step_name TEXT NOT NULL,
                status TEXT NOT NULL,
                start_time INTEGER,
                end_time INTEGER,
                duration_ms INTEGER,
                attempt INTEGER NOT NULL,
                command TEXT,
                error TEXT,
                output_size INTEGER NOT NULL DEFAULT 0
            );

            CREATE INDEX IF NOT EXISTS idx_step_executions_execution_id ON step_executions(execution_id);
            CREATE INDEX IF NOT EXISTS idx_step_executions_step_name ON step_executions(step_name);

            CREATE TABLE IF NOT EXISTS step_outputs (
                step_execution_id TEXT NOT NULL REFERENCES step_executions(id) ON DELETE CASCADE,
                line_number INTEGER NOT NULL,
                content TEXT NOT NULL,
                is_stderr INTEGER NOT NULL DEFAULT 0,
                PRIMARY KEY (step_execution_id, line_number)
            );

            CREATE TABLE IF NOT EXISTS step_averages (
                step_name TEXT PRIMARY KEY,
                avg_duration_ms REAL NOT NULL,
                success_count INTEGER NOT NULL,
                failure_count INTEGER NOT NULL,
                total_count INTEGER NOT NULL,
                last_updated INTEGER NOT NULL
            );
            "#,
        )?;
        conn.pragma_update(None, "user_version", SCHEMA_VERSION)?;
        tracing::info!(version = SCHEMA_VERSION, "applied storage migration");
    }

    Ok(())
}

#[cfg(test)]
#[path = "schema_tests.rs"]
mod tests;
