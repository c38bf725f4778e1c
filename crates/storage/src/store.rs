// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Contributors

//! `Store`: the SQLite-backed handle used by the engine to persist
//! executions and query their history.
//!
//! Writes go through a single mutex-guarded connection so multi-statement
//! saves are transactional; reads open a short-lived connection of their
//! own so a slow list or stats query never blocks the writer (WAL mode
//! lets the two proceed concurrently).

use crate::error::{Result, StorageError};
use crate::schema;
use devflow_core::execution::{Execution, ExecutionId, ExecutionStatus};
use devflow_core::step_execution::{OutputBuffer, StepExecution, StepStatus};
use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension, ToSql};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Output lines are inserted in batches this small to stay well under
/// SQLite's per-statement bound parameter limit.
const OUTPUT_BATCH_SIZE: usize = 200;

/// A step's output is capped at this many lines once persisted, trimming
/// to the most recent lines if the in-memory buffer (itself capped lower,
/// at `MAX_OUTPUT_LINES`) ever grows past it.
const MAX_PERSISTED_OUTPUT_LINES: usize = 1000;

/// Default and maximum page size for [`Store::list_executions`].
const DEFAULT_LIST_LIMIT: u32 = 100;
const MAX_LIST_LIMIT: u32 = 200;

/// Number of trailing days covered by [`Stats::by_day`].
const STATS_WINDOW_DAYS: i64 = 30;

pub struct Store {
    db_path: PathBuf,
    writer: Mutex<Connection>,
}

impl Store {
    pub fn open(db_path: &Path) -> Result<Self> {
        let conn = schema::connect(db_path)?;
        schema::migrate(&conn)?;
        Ok(Self { db_path: db_path.to_path_buf(), writer: Mutex::new(conn) })
    }

    fn read_conn(&self) -> Result<Connection> {
        schema::connect(&self.db_path)
    }

    /// Insert or update an execution, every step attempt, and each step's
    /// output lines (capped and batched) in a single transaction.
    pub fn save_execution(&self, execution: &Execution) -> Result<()> {
        let mut writer = self.writer.lock();
        let tx = writer.transaction()?;

        tx.execute(
            r#"
            INSERT INTO executions
                (id, story_key, story_epic, story_status, story_title, status, current_step,
                 start_time, end_time, duration_ms, error, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
            ON CONFLICT(id) DO UPDATE SET
                story_status = excluded.story_status,
                story_title = excluded.story_title,
                status = excluded.status,
                current_step = excluded.current_step,
                end_time = excluded.end_time,
                duration_ms = excluded.duration_ms,
                error = excluded.error
            "#,
            params![
                execution.id.as_str(),
                execution.story_key,
                execution.story_epic,
                execution.story_status,
                execution.story_title,
                execution.status.to_string(),
                execution.current as i64,
                execution.started_at as i64,
                execution.ended_at.map(|v| v as i64),
                execution.ended_at.map(|end| end.saturating_sub(execution.started_at) as i64),
                execution.error,
                execution.started_at as i64,
            ],
        )?;

        for (index, step) in execution.steps.iter().enumerate() {
            let step_execution_id = format!("{}-{index}", execution.id.as_str());
            tx.execute(
                r#"
                INSERT INTO step_executions
                    (id, execution_id, step_index, step_name, status, start_time, end_time,
                     duration_ms, attempt, command, error, output_size)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
                ON CONFLICT(id) DO UPDATE SET
                    status = excluded.status,
                    start_time = excluded.start_time,
                    end_time = excluded.end_time,
                    duration_ms = excluded.duration_ms,
                    attempt = excluded.attempt,
                    command = excluded.command,
                    error = excluded.error,
                    output_size = excluded.output_size
                "#,
                params![
                    step_execution_id,
                    execution.id.as_str(),
                    index as i64,
                    step.step_name,
                    step.status.to_string(),
                    step.start_time.map(|v| v as i64),
                    step.end_time.map(|v| v as i64),
                    step.duration().map(|d| d.as_millis() as i64),
                    step.attempt as i64,
                    step.command,
                    step.error,
                    step.output.len() as i64,
                ],
            )?;

            tx.execute("DELETE FROM step_outputs WHERE step_execution_id = ?1", params![step_execution_id])?;
            let lines: Vec<&str> = step.output.lines().collect();
            insert_outputs(&tx, &step_execution_id, &lines)?;
        }

        tx.commit()?;
        Ok(())
    }

    /// Load an execution without its step output (cheap; used for lists
    /// and status lookups). Call [`Store::get_execution_with_output`] when
    /// the full captured output is actually needed.
    pub fn get_execution(&self, id: ExecutionId) -> Result<Option<Execution>> {
        let conn = self.read_conn()?;
        let Some(row) = conn.query_row("SELECT * FROM executions WHERE id = ?1", params![id.as_str()], read_execution_row).optional()?
        else {
            return Ok(None);
        };
        let steps = load_steps(&conn, std::slice::from_ref(&row.id))?;
        Ok(Some(assemble(row, steps)))
    }

    /// Load an execution with every step's output lines populated,
    /// lazily querying `step_outputs` only for this one execution.
    pub fn get_execution_with_output(&self, id: ExecutionId) -> Result<Option<Execution>> {
        let Some(mut execution) = self.get_execution(id)? else { return Ok(None) };
        let conn = self.read_conn()?;
        for (index, step) in execution.steps.iter_mut().enumerate() {
            let step_execution_id = format!("{}-{index}", execution.id.as_str());
            let mut stmt = conn.prepare("SELECT content FROM step_outputs WHERE step_execution_id = ?1 ORDER BY line_number")?;
            let lines = stmt.query_map(params![step_execution_id], |row| row.get::<_, String>(0))?;
            let mut output = OutputBuffer::new();
            for line in lines {
                output.push(line?);
            }
            step.output = output;
        }
        Ok(Some(execution))
    }

    /// List executions, most recently started first, matching every
    /// supplied filter. Steps for all matching executions are loaded in
    /// one secondary query rather than one per execution.
    pub fn list_executions(&self, filter: &ExecutionFilter) -> Result<Vec<Execution>> {
        let conn = self.read_conn()?;
        let mut sql = "SELECT * FROM executions WHERE 1=1".to_string();
        let mut args: Vec<Box<dyn ToSql>> = Vec::new();

        if let Some(key) = &filter.story_key {
            sql.push_str(" AND story_key LIKE ? ESCAPE '\\'");
            args.push(Box::new(format!("%{}%", escape_like(key))));
        }
        if let Some(epic) = filter.epic {
            sql.push_str(" AND story_epic = ?");
            args.push(Box::new(epic));
        }
        if let Some(status) = filter.status {
            sql.push_str(" AND status = ?");
            args.push(Box::new(status.to_string()));
        }
        if let Some(after) = filter.start_after {
            sql.push_str(" AND start_time >= ?");
            args.push(Box::new(after as i64));
        }
        if let Some(before) = filter.start_before {
            sql.push_str(" AND start_time <= ?");
            args.push(Box::new(before as i64));
        }

        let limit = filter.limit.unwrap_or(DEFAULT_LIST_LIMIT).min(MAX_LIST_LIMIT);
        sql.push_str(" ORDER BY start_time DESC LIMIT ? OFFSET ?");
        args.push(Box::new(limit));
        args.push(Box::new(filter.offset.unwrap_or(0)));

        let rows = {
            let mut stmt = conn.prepare(&sql)?;
            let param_refs: Vec<&dyn ToSql> = args.iter().map(|b| b.as_ref()).collect();
            let rows = stmt.query_map(param_refs.as_slice(), read_execution_row)?;
            rows.collect::<rusqlite::Result<Vec<_>>>().map_err(StorageError::from)?
        };

        let ids: Vec<String> = rows.iter().map(|r| r.id.clone()).collect();
        let mut steps_by_execution = group_steps(load_steps(&conn, &ids)?);
        Ok(rows.into_iter().map(|row| {
            let steps = steps_by_execution.remove(&row.id).unwrap_or_default();
            assemble(row, steps)
        }).collect())
    }

    /// Aggregate execution and per-step statistics: overall counts and
    /// success rate, average/total duration, per-step breakdowns, and
    /// executions grouped by day (last 30 days) and by epic.
    pub fn stats(&self, now_ms: u64) -> Result<Stats> {
        let conn = self.read_conn()?;

        let mut stats = Stats::default();
        {
            let mut stmt = conn.prepare("SELECT status, count(*) FROM executions GROUP BY status")?;
            let rows = stmt.query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?)))?;
            for row in rows {
                let (status, count) = row?;
                match status.as_str() {
                    "running" => stats.running = count as u64,
                    "succeeded" => stats.succeeded = count as u64,
                    "failed" => stats.failed = count as u64,
                    "cancelled" => stats.cancelled = count as u64,
                    _ => {}
                }
            }
        }
        let total = stats.total();
        stats.success_rate = if total > 0 { stats.succeeded as f64 / total as f64 * 100.0 } else { 0.0 };

        let (avg_duration_ms, total_duration_ms): (f64, i64) = conn.query_row(
            "SELECT COALESCE(AVG(duration_ms), 0), COALESCE(SUM(duration_ms), 0) FROM executions WHERE duration_ms IS NOT NULL",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;
        stats.avg_duration_ms = avg_duration_ms;
        stats.total_duration_ms = total_duration_ms as u64;

        stats.by_step = {
            let mut stmt = conn.prepare(
                r#"
                SELECT
                    step_name,
                    COUNT(*) AS total,
                    SUM(CASE WHEN status = 'succeeded' THEN 1 ELSE 0 END) AS success,
                    SUM(CASE WHEN status = 'skipped' THEN 1 ELSE 0 END) AS skipped,
                    SUM(CASE WHEN status NOT IN ('succeeded', 'skipped') THEN 1 ELSE 0 END) AS failure,
                    COALESCE(AVG(CASE WHEN status = 'succeeded' THEN duration_ms END), 0) AS avg_ms,
                    COALESCE(MIN(CASE WHEN status = 'succeeded' THEN duration_ms END), 0) AS min_ms,
                    COALESCE(MAX(CASE WHEN status = 'succeeded' THEN duration_ms END), 0) AS max_ms
                FROM step_executions
                GROUP BY step_name
                ORDER BY step_name
                "#,
            )?;
            let rows = stmt.query_map([], |row| {
                let total: i64 = row.get(1)?;
                let success: i64 = row.get(2)?;
                Ok(StepStats {
                    step_name: row.get(0)?,
                    total: total as u64,
                    success: success as u64,
                    skipped: row.get::<_, i64>(3)? as u64,
                    failure: row.get::<_, i64>(4)? as u64,
                    success_rate: if total > 0 { success as f64 / total as f64 * 100.0 } else { 0.0 },
                    avg_duration_ms: row.get(5)?,
                    min_duration_ms: row.get::<_, i64>(6)? as u64,
                    max_duration_ms: row.get::<_, i64>(7)? as u64,
                })
            })?;
            rows.collect::<rusqlite::Result<Vec<_>>>()?
        };

        let window_start = now_ms.saturating_sub((STATS_WINDOW_DAYS * 24 * 60 * 60 * 1000) as u64);
        stats.by_day = {
            let mut stmt = conn.prepare(
                r#"
                SELECT strftime('%Y-%m-%d', start_time / 1000, 'unixepoch') AS day, COUNT(*)
                FROM executions
                WHERE start_time >= ?1
                GROUP BY day
                ORDER BY day
                "#,
            )?;
            let rows = stmt.query_map(params![window_start as i64], |row| Ok(DayCount { day: row.get(0)?, count: row.get::<_, i64>(1)? as u64 }))?;
            rows.collect::<rusqlite::Result<Vec<_>>>()?
        };

        stats.by_epic = {
            let mut stmt = conn.prepare(
                "SELECT story_epic, COUNT(*) FROM executions WHERE story_epic IS NOT NULL GROUP BY story_epic ORDER BY story_epic",
            )?;
            let rows = stmt.query_map([], |row| Ok(EpicCount { epic: row.get::<_, i64>(0)? as u32, count: row.get::<_, i64>(1)? as u64 }))?;
            rows.collect::<rusqlite::Result<Vec<_>>>()?
        };

        Ok(stats)
    }

    /// Recompute every step's durable average from `step_executions`
    /// (arithmetic mean over `status = 'succeeded'` rows). Idempotent:
    /// running this twice without new data yields identical rows. This is
    /// the authoritative counterpart to `Queue`'s in-memory IIR estimate,
    /// which stays fast and biased by design and is never persisted here.
    pub fn update_step_averages(&self, now_ms: u64) -> Result<Vec<StepAverageRecord>> {
        let writer = self.writer.lock();
        let records = {
            let mut stmt = writer.prepare(
                r#"
                SELECT
                    step_name,
                    COALESCE(AVG(CASE WHEN status = 'succeeded' THEN duration_ms END), 0) AS avg_ms,
                    SUM(CASE WHEN status = 'succeeded' THEN 1 ELSE 0 END) AS success_count,
                    SUM(CASE WHEN status NOT IN ('succeeded', 'skipped') THEN 1 ELSE 0 END) AS failure_count,
                    COUNT(*) AS total_count
                FROM step_executions
                GROUP BY step_name
                "#,
            )?;
            let rows = stmt.query_map([], |row| {
                Ok(StepAverageRecord {
                    step_name: row.get(0)?,
                    avg_duration_ms: row.get(1)?,
                    success_count: row.get::<_, i64>(2)? as u64,
                    failure_count: row.get::<_, i64>(3)? as u64,
                    total_count: row.get::<_, i64>(4)? as u64,
                    last_updated: now_ms,
                })
            })?;
            rows.collect::<rusqlite::Result<Vec<_>>>()?
        };

        for record in &records {
            writer.execute(
                r#"
                INSERT INTO step_averages (step_name, avg_duration_ms, success_count, failure_count, total_count, last_updated)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                ON CONFLICT(step_name) DO UPDATE SET
                    avg_duration_ms = excluded.avg_duration_ms,
                    success_count = excluded.success_count,
                    failure_count = excluded.failure_count,
                    total_count = excluded.total_count,
                    last_updated = excluded.last_updated
                "#,
                params![
                    record.step_name,
                    record.avg_duration_ms,
                    record.success_count as i64,
                    record.failure_count as i64,
                    record.total_count as i64,
                    record.last_updated as i64,
                ],
            )?;
        }

        Ok(records)
    }

    pub fn get_step_average(&self, step_name: &str) -> Result<Option<StepAverageRecord>> {
        let conn = self.read_conn()?;
        conn.query_row(
            "SELECT step_name, avg_duration_ms, success_count, failure_count, total_count, last_updated FROM step_averages WHERE step_name = ?1",
            params![step_name],
            read_step_average_record,
        )
        .optional()
        .map_err(StorageError::from)
    }
}

/// Filters accepted by [`Store::list_executions`]. `limit` defaults to 100
/// and is capped at 200 regardless of what's requested.
#[derive(Debug, Clone, Default)]
pub struct ExecutionFilter {
    /// Partial, case-sensitive substring match against `story_key`.
    pub story_key: Option<String>,
    pub epic: Option<u32>,
    pub status: Option<ExecutionStatus>,
    pub start_after: Option<u64>,
    pub start_before: Option<u64>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Stats {
    pub running: u64,
    pub succeeded: u64,
    pub failed: u64,
    pub cancelled: u64,
    pub success_rate: f64,
    pub avg_duration_ms: f64,
    pub total_duration_ms: u64,
    #[serde(default)]
    pub by_step: Vec<StepStats>,
    #[serde(default)]
    pub by_day: Vec<DayCount>,
    #[serde(default)]
    pub by_epic: Vec<EpicCount>,
}

impl Stats {
    pub fn total(&self) -> u64 {
        self.running + self.succeeded + self.failed + self.cancelled
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StepStats {
    pub step_name: String,
    pub total: u64,
    pub success: u64,
    pub failure: u64,
    pub skipped: u64,
    pub success_rate: f64,
    pub avg_duration_ms: f64,
    pub min_duration_ms: u64,
    pub max_duration_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayCount {
    pub day: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpicCount {
    pub epic: u32,
    pub count: u64,
}

/// Durable, arithmetic-mean step duration record, recomputed wholesale by
/// [`Store::update_step_averages`]. Deliberately a distinct type from
/// `devflow_core::StepAverage`: that one is the in-memory IIR estimate
/// `Queue` keeps for a fast ETA display, and the two are expected to
/// diverge over time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StepAverageRecord {
    pub step_name: String,
    pub avg_duration_ms: f64,
    pub success_count: u64,
    pub failure_count: u64,
    pub total_count: u64,
    pub last_updated: u64,
}

/// Raw columns read off one `executions` row, before its steps are
/// attached.
struct ExecutionRow {
    id: String,
    story_key: String,
    story_epic: Option<i64>,
    story_status: Option<String>,
    story_title: Option<String>,
    status: String,
    current_step: i64,
    start_time: i64,
    end_time: Option<i64>,
    error: Option<String>,
}

fn read_execution_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<ExecutionRow> {
    Ok(ExecutionRow {
        id: row.get("id")?,
        story_key: row.get("story_key")?,
        story_epic: row.get("story_epic")?,
        story_status: row.get("story_status")?,
        story_title: row.get("story_title")?,
        status: row.get("status")?,
        current_step: row.get("current_step")?,
        start_time: row.get("start_time")?,
        end_time: row.get("end_time")?,
        error: row.get("error")?,
    })
}

fn read_step_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<(String, i64, StepExecution)> {
    let execution_id: String = row.get("execution_id")?;
    let step_index: i64 = row.get("step_index")?;
    let status: String = row.get("status")?;
    let step = StepExecution {
        step_name: row.get("step_name")?,
        status: parse_step_status(&status),
        attempt: row.get::<_, i64>("attempt")? as u32,
        command: row.get("command")?,
        start_time: row.get::<_, Option<i64>>("start_time")?.map(|v| v as u64),
        end_time: row.get::<_, Option<i64>>("end_time")?.map(|v| v as u64),
        output: OutputBuffer::new(),
        error: row.get("error")?,
    };
    Ok((execution_id, step_index, step))
}

fn read_step_average_record(row: &rusqlite::Row<'_>) -> rusqlite::Result<StepAverageRecord> {
    Ok(StepAverageRecord {
        step_name: row.get(0)?,
        avg_duration_ms: row.get(1)?,
        success_count: row.get::<_, i64>(2)? as u64,
        failure_count: row.get::<_, i64>(3)? as u64,
        total_count: row.get::<_, i64>(4)? as u64,
        last_updated: row.get::<_, i64>(5)? as u64,
    })
}

/// Load every `step_executions` row for the given execution ids in one
/// query, ordered so callers can assume each execution's steps arrive
/// already sorted by `step_index`.
fn load_steps(conn: &Connection, execution_ids: &[String]) -> Result<Vec<(String, i64, StepExecution)>> {
    if execution_ids.is_empty() {
        return Ok(Vec::new());
    }
    let placeholders = vec!["?"; execution_ids.len()].join(",");
    let sql = format!("SELECT * FROM step_executions WHERE execution_id IN ({placeholders}) ORDER BY execution_id, step_index");
    let mut stmt = conn.prepare(&sql)?;
    let param_refs: Vec<&dyn ToSql> = execution_ids.iter().map(|s| s as &dyn ToSql).collect();
    let rows = stmt.query_map(param_refs.as_slice(), read_step_row)?;
    rows.collect::<rusqlite::Result<Vec<_>>>().map_err(StorageError::from)
}

fn group_steps(steps: Vec<(String, i64, StepExecution)>) -> HashMap<String, Vec<(i64, StepExecution)>> {
    let mut grouped: HashMap<String, Vec<(i64, StepExecution)>> = HashMap::new();
    for (execution_id, index, step) in steps {
        grouped.entry(execution_id).or_default().push((index, step));
    }
    grouped
}

fn assemble(row: ExecutionRow, mut steps: Vec<(i64, StepExecution)>) -> Execution {
    steps.sort_by_key(|(index, _)| *index);
    Execution {
        id: ExecutionId::from_string(row.id),
        story_key: row.story_key,
        story_epic: row.story_epic.map(|v| v as u32),
        story_status: row.story_status,
        story_title: row.story_title,
        status: parse_execution_status(&row.status),
        steps: steps.into_iter().map(|(_, step)| step).collect(),
        current: row.current_step as usize,
        started_at: row.start_time as u64,
        ended_at: row.end_time.map(|v| v as u64),
        error: row.error,
    }
}

/// Insert `lines` into `step_outputs` for `step_execution_id`, trimming to
/// the most recent [`MAX_PERSISTED_OUTPUT_LINES`] and batching in chunks
/// of [`OUTPUT_BATCH_SIZE`] to stay under SQLite's bound-parameter limit.
///
/// Per-line stderr/stdout origin isn't tracked upstream of this layer yet
/// (the runner folds both streams into one buffer), so `is_stderr` is
/// always persisted as `false`.
fn insert_outputs(tx: &rusqlite::Transaction<'_>, step_execution_id: &str, lines: &[&str]) -> Result<()> {
    let capped: &[&str] =
        if lines.len() > MAX_PERSISTED_OUTPUT_LINES { &lines[lines.len() - MAX_PERSISTED_OUTPUT_LINES..] } else { lines };

    let numbered: Vec<(i64, &str)> = capped.iter().enumerate().map(|(i, line)| (i as i64 + 1, *line)).collect();

    for chunk in numbered.chunks(OUTPUT_BATCH_SIZE) {
        let mut sql = String::from("INSERT INTO step_outputs (step_execution_id, line_number, content, is_stderr) VALUES ");
        let mut values: Vec<Box<dyn ToSql>> = Vec::with_capacity(chunk.len() * 4);
        for (i, (line_number, content)) in chunk.iter().enumerate() {
            if i > 0 {
                sql.push(',');
            }
            sql.push_str("(?,?,?,0)");
            values.push(Box::new(step_execution_id.to_string()));
            values.push(Box::new(*line_number));
            values.push(Box::new((*content).to_string()));
        }
        let refs: Vec<&dyn ToSql> = values.iter().map(|v| v.as_ref()).collect();
        tx.execute(&sql, refs.as_slice())?;
    }
    Ok(())
}

/// Escape `%`, `_`, and the escape character itself so a free-text filter
/// can never widen a `LIKE` pattern it wasn't meant to.
fn escape_like(input: &str) -> String {
    input.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_")
}

fn parse_execution_status(s: &str) -> ExecutionStatus {
    match s {
        "succeeded" => ExecutionStatus::Succeeded,
        "failed" => ExecutionStatus::Failed,
        "cancelled" => ExecutionStatus::Cancelled,
        _ => ExecutionStatus::Running,
    }
}

fn parse_step_status(s: &str) -> StepStatus {
    match s {
        "running" => StepStatus::Running,
        "succeeded" => StepStatus::Succeeded,
        "failed" => StepStatus::Failed,
        "timed_out" => StepStatus::TimedOut,
        "cancelled" => StepStatus::Cancelled,
        "skipped" => StepStatus::Skipped,
        _ => StepStatus::Pending,
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
