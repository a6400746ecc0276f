//! Task / audio-note repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide day-scoped CRUD over the `tasks` and `audio_notes` tables.
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - Write paths call `Task::validate()` before SQL mutations.
//! - Reads return rows in insertion order (`seq ASC`).
//! - Every lookup is scoped by day; an ID under another day is not found.

use crate::db::DbError;
use crate::model::audio_note::{AudioNote, AudioNoteId};
use crate::model::schedule::{Category, Day, TaskTime, TaskValidationError};
use crate::model::task::{Task, TaskId};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use uuid::Uuid;

const TASK_SELECT_SQL: &str = "SELECT
    uuid,
    day,
    name,
    is_completed,
    time,
    category,
    linked_audio_uuid
FROM tasks";

const AUDIO_SELECT_SQL: &str = "SELECT
    uuid,
    day,
    resource_path,
    is_completed,
    time
FROM audio_notes";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for registry persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(TaskValidationError),
    Db(DbError),
    TaskNotFound(TaskId),
    AudioNoteNotFound(AudioNoteId),
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::TaskNotFound(id) => write!(f, "task not found: {id}"),
            Self::AudioNoteNotFound(id) => write!(f, "audio note not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid stored registry data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::TaskNotFound(_) | Self::AudioNoteNotFound(_) | Self::InvalidData(_) => None,
        }
    }
}

impl From<TaskValidationError> for RepoError {
    fn from(value: TaskValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Query options for listing one day's tasks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskListQuery {
    pub day: Day,
    /// `None` lists the unified view.
    pub category: Option<Category>,
}

impl TaskListQuery {
    pub fn all(day: Day) -> Self {
        Self {
            day,
            category: None,
        }
    }

    pub fn in_category(day: Day, category: Category) -> Self {
        Self {
            day,
            category: Some(category),
        }
    }
}

/// Repository interface for the day-indexed registry.
pub trait TaskRepository {
    fn insert_task(&self, task: &Task) -> RepoResult<TaskId>;
    fn insert_audio_note(&self, note: &AudioNote) -> RepoResult<AudioNoteId>;
    fn get_task(&self, day: Day, id: TaskId) -> RepoResult<Option<Task>>;
    fn get_audio_note(&self, day: Day, id: AudioNoteId) -> RepoResult<Option<AudioNote>>;
    fn list_tasks(&self, query: &TaskListQuery) -> RepoResult<Vec<Task>>;
    fn list_audio_notes(&self, day: Day) -> RepoResult<Vec<AudioNote>>;
    /// Audio notes whose linking task is in `category`; unlinked notes are
    /// excluded.
    fn list_audio_notes_in_category(
        &self,
        day: Day,
        category: Category,
    ) -> RepoResult<Vec<AudioNote>>;
    /// Flips completion and returns the new state.
    fn toggle_task(&self, day: Day, id: TaskId) -> RepoResult<bool>;
    /// Flips completion and returns the new state.
    fn toggle_audio_note(&self, day: Day, id: AudioNoteId) -> RepoResult<bool>;
    fn delete_task(&self, day: Day, id: TaskId) -> RepoResult<()>;
    /// Removes the note; a linking task keeps living with its link cleared.
    fn delete_audio_note(&self, day: Day, id: AudioNoteId) -> RepoResult<()>;
    /// Task count per non-empty day, optionally restricted to one category.
    fn count_tasks_by_day(&self, category: Option<Category>) -> RepoResult<BTreeMap<Day, usize>>;
}

/// SQLite-backed registry repository.
///
/// Accepts a plain connection or, through deref, an open transaction.
pub struct SqliteTaskRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteTaskRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl TaskRepository for SqliteTaskRepository<'_> {
    fn insert_task(&self, task: &Task) -> RepoResult<TaskId> {
        task.validate()?;

        self.conn.execute(
            "INSERT INTO tasks (
                uuid,
                day,
                name,
                is_completed,
                time,
                category,
                linked_audio_uuid
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7);",
            params![
                task.id.to_string(),
                task.day.get(),
                task.name.as_str(),
                bool_to_int(task.is_completed),
                task.time.map(|time| time.to_string()),
                task.category.as_str(),
                task.linked_audio_id.map(|id| id.to_string()),
            ],
        )?;

        Ok(task.id)
    }

    fn insert_audio_note(&self, note: &AudioNote) -> RepoResult<AudioNoteId> {
        let resource_path = note.resource_path.to_str().ok_or_else(|| {
            RepoError::InvalidData(format!(
                "audio resource path is not valid UTF-8: {}",
                note.resource_path.display()
            ))
        })?;

        self.conn.execute(
            "INSERT INTO audio_notes (
                uuid,
                day,
                resource_path,
                is_completed,
                time
            ) VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                note.id.to_string(),
                note.day.get(),
                resource_path,
                bool_to_int(note.is_completed),
                note.time.map(|time| time.to_string()),
            ],
        )?;

        Ok(note.id)
    }

    fn get_task(&self, day: Day, id: TaskId) -> RepoResult<Option<Task>> {
        let mut stmt = self.conn.prepare(&format!(
            "{TASK_SELECT_SQL}
             WHERE uuid = ?1
               AND day = ?2;"
        ))?;

        let mut rows = stmt.query(params![id.to_string(), day.get()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_task_row(row)?));
        }

        Ok(None)
    }

    fn get_audio_note(&self, day: Day, id: AudioNoteId) -> RepoResult<Option<AudioNote>> {
        let mut stmt = self.conn.prepare(&format!(
            "{AUDIO_SELECT_SQL}
             WHERE uuid = ?1
               AND day = ?2;"
        ))?;

        let mut rows = stmt.query(params![id.to_string(), day.get()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_audio_row(row)?));
        }

        Ok(None)
    }

    fn list_tasks(&self, query: &TaskListQuery) -> RepoResult<Vec<Task>> {
        let mut sql = format!("{TASK_SELECT_SQL} WHERE day = ?");
        let mut bind_values: Vec<Value> = vec![Value::Integer(i64::from(query.day.get()))];

        if let Some(category) = query.category {
            sql.push_str(" AND category = ?");
            bind_values.push(Value::Text(category.as_str().to_string()));
        }

        sql.push_str(" ORDER BY seq ASC");

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut tasks = Vec::new();

        while let Some(row) = rows.next()? {
            tasks.push(parse_task_row(row)?);
        }

        Ok(tasks)
    }

    fn list_audio_notes(&self, day: Day) -> RepoResult<Vec<AudioNote>> {
        let mut stmt = self.conn.prepare(&format!(
            "{AUDIO_SELECT_SQL}
             WHERE day = ?1
             ORDER BY seq ASC;"
        ))?;

        let mut rows = stmt.query([day.get()])?;
        let mut notes = Vec::new();
        while let Some(row) = rows.next()? {
            notes.push(parse_audio_row(row)?);
        }

        Ok(notes)
    }

    fn list_audio_notes_in_category(
        &self,
        day: Day,
        category: Category,
    ) -> RepoResult<Vec<AudioNote>> {
        let mut stmt = self.conn.prepare(
            "SELECT
                a.uuid AS uuid,
                a.day AS day,
                a.resource_path AS resource_path,
                a.is_completed AS is_completed,
                a.time AS time
             FROM audio_notes a
             JOIN tasks t ON t.linked_audio_uuid = a.uuid
             WHERE a.day = ?1
               AND t.category = ?2
             ORDER BY a.seq ASC;",
        )?;

        let mut rows = stmt.query(params![day.get(), category.as_str()])?;
        let mut notes = Vec::new();
        while let Some(row) = rows.next()? {
            notes.push(parse_audio_row(row)?);
        }

        Ok(notes)
    }

    fn toggle_task(&self, day: Day, id: TaskId) -> RepoResult<bool> {
        let state: Option<i64> = self
            .conn
            .query_row(
                "UPDATE tasks
                 SET is_completed = 1 - is_completed
                 WHERE uuid = ?1
                   AND day = ?2
                 RETURNING is_completed;",
                params![id.to_string(), day.get()],
                |row| row.get(0),
            )
            .optional()?;

        match state {
            Some(value) => int_to_bool(value, "tasks.is_completed"),
            None => Err(RepoError::TaskNotFound(id)),
        }
    }

    fn toggle_audio_note(&self, day: Day, id: AudioNoteId) -> RepoResult<bool> {
        let state: Option<i64> = self
            .conn
            .query_row(
                "UPDATE audio_notes
                 SET is_completed = 1 - is_completed
                 WHERE uuid = ?1
                   AND day = ?2
                 RETURNING is_completed;",
                params![id.to_string(), day.get()],
                |row| row.get(0),
            )
            .optional()?;

        match state {
            Some(value) => int_to_bool(value, "audio_notes.is_completed"),
            None => Err(RepoError::AudioNoteNotFound(id)),
        }
    }

    fn delete_task(&self, day: Day, id: TaskId) -> RepoResult<()> {
        let changed = self.conn.execute(
            "DELETE FROM tasks WHERE uuid = ?1 AND day = ?2;",
            params![id.to_string(), day.get()],
        )?;

        if changed == 0 {
            return Err(RepoError::TaskNotFound(id));
        }

        Ok(())
    }

    fn delete_audio_note(&self, day: Day, id: AudioNoteId) -> RepoResult<()> {
        let changed = self.conn.execute(
            "DELETE FROM audio_notes WHERE uuid = ?1 AND day = ?2;",
            params![id.to_string(), day.get()],
        )?;

        if changed == 0 {
            return Err(RepoError::AudioNoteNotFound(id));
        }

        Ok(())
    }

    fn count_tasks_by_day(&self, category: Option<Category>) -> RepoResult<BTreeMap<Day, usize>> {
        let mut stmt = self.conn.prepare(
            "SELECT day, COUNT(*)
             FROM tasks
             WHERE (?1 IS NULL OR category = ?1)
             GROUP BY day;",
        )?;

        let mut rows = stmt.query([category.map(Category::as_str)])?;
        let mut counts = BTreeMap::new();
        while let Some(row) = rows.next()? {
            let day = parse_day(row.get(0)?)?;
            let count: i64 = row.get(1)?;
            let count = usize::try_from(count).map_err(|_| {
                RepoError::InvalidData(format!("negative task count `{count}` for day {day}"))
            })?;
            counts.insert(day, count);
        }

        Ok(counts)
    }
}

fn parse_task_row(row: &Row<'_>) -> RepoResult<Task> {
    let category_text: String = row.get("category")?;
    let category = parse_category(&category_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid category `{category_text}` in tasks.category"
        ))
    })?;

    let linked_audio_id = match row.get::<_, Option<String>>("linked_audio_uuid")? {
        Some(value) => Some(parse_uuid(&value, "tasks.linked_audio_uuid")?),
        None => None,
    };

    let task = Task {
        id: parse_uuid(&row.get::<_, String>("uuid")?, "tasks.uuid")?,
        day: parse_day(row.get("day")?)?,
        name: row.get("name")?,
        is_completed: int_to_bool(row.get("is_completed")?, "tasks.is_completed")?,
        time: parse_time(row.get("time")?)?,
        category,
        linked_audio_id,
    };
    task.validate()?;
    Ok(task)
}

fn parse_audio_row(row: &Row<'_>) -> RepoResult<AudioNote> {
    Ok(AudioNote {
        id: parse_uuid(&row.get::<_, String>("uuid")?, "audio_notes.uuid")?,
        day: parse_day(row.get("day")?)?,
        resource_path: PathBuf::from(row.get::<_, String>("resource_path")?),
        is_completed: int_to_bool(row.get("is_completed")?, "audio_notes.is_completed")?,
        time: parse_time(row.get("time")?)?,
    })
}

fn parse_uuid(value: &str, column: &str) -> RepoResult<Uuid> {
    Uuid::parse_str(value)
        .map_err(|_| RepoError::InvalidData(format!("invalid uuid value `{value}` in {column}")))
}

fn parse_day(value: i64) -> RepoResult<Day> {
    u32::try_from(value)
        .ok()
        .and_then(|raw| Day::new(raw).ok())
        .ok_or_else(|| RepoError::InvalidData(format!("invalid day value `{value}`")))
}

fn parse_time(value: Option<String>) -> RepoResult<Option<TaskTime>> {
    value
        .map(|text| {
            TaskTime::parse(&text)
                .map_err(|_| RepoError::InvalidData(format!("invalid time value `{text}`")))
        })
        .transpose()
}

fn parse_category(value: &str) -> Option<Category> {
    match value {
        "quick" => Some(Category::Quick),
        "personal" => Some(Category::Personal),
        "hobby" => Some(Category::Hobby),
        "work" => Some(Category::Work),
        "other" => Some(Category::Other),
        _ => None,
    }
}

fn int_to_bool(value: i64, column: &str) -> RepoResult<bool> {
    match value {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(RepoError::InvalidData(format!(
            "invalid boolean value `{other}` in {column}"
        ))),
    }
}

fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}
