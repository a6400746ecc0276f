//! Day-indexed task / audio-note registry.
//!
//! # Responsibility
//! - Own the single store behind the unified and per-category day views.
//! - Link a task to the audio note saved with it by explicit ID.
//! - Remove audio files together with their registry entries.
//!
//! # Invariants
//! - One task record per `add_task`, whatever the category entry point.
//! - Category views are filters over the store, never separate copies.
//! - Each call takes the store lock once; multi-row writes use one transaction.
//! - File failures are returned as `RegistryWarning`s and never roll back
//!   the registry change.

use crate::audio::recording::TempAudioRef;
use crate::audio::store::AudioStore;
use crate::clock::{Clock, SystemClock};
use crate::db::{open_db_in_memory, DbError};
use crate::model::audio_note::{AudioNote, AudioNoteId};
use crate::model::schedule::{Category, Day, TaskTime, TaskValidationError};
use crate::model::task::{Task, TaskId};
use crate::repo::task_repo::{RepoError, SqliteTaskRepository, TaskListQuery, TaskRepository};
use crate::warning::RegistryWarning;
use log::{error, info};
use rusqlite::Connection;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};

/// Name given to a blank-named task saved with an audio note.
pub const AUDIO_TASK_PLACEHOLDER: &str = "Audio Task";

pub type RegistryResult<T> = Result<T, RegistryError>;

/// Errors from registry operations.
#[derive(Debug)]
pub enum RegistryError {
    /// Input rejected before touching the store.
    Validation(TaskValidationError),
    /// Target task does not exist under the given day.
    TaskNotFound(TaskId),
    /// Target audio note does not exist under the given day.
    AudioNoteNotFound(AudioNoteId),
    /// Store-level failure.
    Repo(RepoError),
    /// A previous caller panicked while holding the store lock.
    LockPoisoned,
}

impl Display for RegistryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::TaskNotFound(id) => write!(f, "task not found: {id}"),
            Self::AudioNoteNotFound(id) => write!(f, "audio note not found: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
            Self::LockPoisoned => write!(f, "task registry lock poisoned"),
        }
    }
}

impl Error for RegistryError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<TaskValidationError> for RegistryError {
    fn from(value: TaskValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<RepoError> for RegistryError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::TaskNotFound(id) => Self::TaskNotFound(id),
            RepoError::AudioNoteNotFound(id) => Self::AudioNoteNotFound(id),
            RepoError::Validation(err) => Self::Validation(err),
            other => Self::Repo(other),
        }
    }
}

impl From<DbError> for RegistryError {
    fn from(value: DbError) -> Self {
        Self::Repo(RepoError::Db(value))
    }
}

impl From<rusqlite::Error> for RegistryError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Repo(RepoError::from(value))
    }
}

/// Construction options for `TaskRegistry`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistryConfig {
    /// Directory saved clips are moved into; `None` keeps them beside the
    /// temporary capture.
    pub audio_dir: Option<PathBuf>,
}

/// Request model for `TaskRegistry::add_task`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    pub day: Day,
    pub name: String,
    pub time: Option<TaskTime>,
    pub category: Category,
    /// Finished capture to save and link with the task.
    pub audio: Option<TempAudioRef>,
}

impl NewTask {
    /// Unscheduled quick-add task without audio.
    pub fn new(day: Day, name: impl Into<String>) -> Self {
        Self {
            day,
            name: name.into(),
            time: None,
            category: Category::Quick,
            audio: None,
        }
    }

    pub fn at(mut self, time: TaskTime) -> Self {
        self.time = Some(time);
        self
    }

    pub fn in_category(mut self, category: Category) -> Self {
        self.category = category;
        self
    }

    pub fn with_audio(mut self, audio: TempAudioRef) -> Self {
        self.audio = Some(audio);
        self
    }
}

/// Result of `TaskRegistry::add_task`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddTaskOutcome {
    pub task_id: TaskId,
    pub audio_id: Option<AudioNoteId>,
    pub warnings: Vec<RegistryWarning>,
}

/// Tasks and audio notes of one day view, in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DayListing {
    pub tasks: Vec<Task>,
    pub audio: Vec<AudioNote>,
}

impl DayListing {
    /// `true` when the view would show "Nothing planned".
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty() && self.audio.is_empty()
    }
}

/// One non-empty category group of the unified day view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategorySection {
    pub category: Category,
    pub tasks: Vec<Task>,
}

/// Shared registry behind every task screen.
pub struct TaskRegistry {
    conn: Mutex<Connection>,
    store: AudioStore,
    clock: Arc<dyn Clock>,
}

impl TaskRegistry {
    /// Opens an empty registry using the local system clock.
    pub fn new(config: RegistryConfig) -> RegistryResult<Self> {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Opens an empty registry with an explicit clock for save timestamps.
    pub fn with_clock(config: RegistryConfig, clock: Arc<dyn Clock>) -> RegistryResult<Self> {
        let conn = open_db_in_memory()?;
        Ok(Self {
            conn: Mutex::new(conn),
            store: AudioStore::new(config.audio_dir),
            clock,
        })
    }

    /// Adds one task, saving and linking its audio note when present.
    ///
    /// # Contract
    /// - Blank name with audio becomes `AUDIO_TASK_PLACEHOLDER`.
    /// - Blank name without audio is rejected with `EmptyName`.
    /// - Task and audio note rows are written in one transaction.
    /// - A failed clip rename keeps the temp path and adds a warning.
    /// - When the rows cannot be written, a saved clip is moved back to its
    ///   temp path before the error is returned.
    pub fn add_task(&self, request: NewTask) -> RegistryResult<AddTaskOutcome> {
        let NewTask {
            day,
            name,
            time,
            category,
            audio,
        } = request;

        let name = if name.trim().is_empty() {
            if audio.is_none() {
                return Err(RegistryError::Validation(TaskValidationError::EmptyName));
            }
            AUDIO_TASK_PLACEHOLDER.to_string()
        } else {
            name
        };

        let mut task = Task::new(day, name, category);
        task.time = time;

        let mut conn = self.lock()?;
        let mut warnings = Vec::new();
        let saved = audio.map(|temp| {
            let persisted = self.store.persist(&temp, self.clock.now());
            warnings.extend(persisted.warning);
            let mut note = AudioNote::new(day, persisted.path);
            note.time = time;
            (temp, note)
        });
        task.linked_audio_id = saved.as_ref().map(|(_, note)| note.id);

        if let Err(err) = insert_rows(&mut conn, &task, saved.as_ref().map(|(_, note)| note)) {
            error!(
                "event=task_add module=registry status=error day={} error={}",
                day, err
            );
            if let Some((temp, note)) = &saved {
                let _ = self.store.restore(note.resource_path(), temp);
            }
            return Err(err);
        }
        let note = saved.map(|(_, note)| note);

        info!(
            "event=task_add module=registry status=ok day={} category={} with_audio={} warnings={}",
            day,
            category,
            note.is_some(),
            warnings.len()
        );

        Ok(AddTaskOutcome {
            task_id: task.id,
            audio_id: note.map(|note| note.id),
            warnings,
        })
    }

    /// Flips a task's completion and returns the new state.
    pub fn toggle_completion(&self, day: Day, task_id: TaskId) -> RegistryResult<bool> {
        let conn = self.lock()?;
        Ok(SqliteTaskRepository::new(&conn).toggle_task(day, task_id)?)
    }

    /// Flips an audio note's completion and returns the new state.
    pub fn toggle_audio_completion(&self, day: Day, audio_id: AudioNoteId) -> RegistryResult<bool> {
        let conn = self.lock()?;
        Ok(SqliteTaskRepository::new(&conn).toggle_audio_note(day, audio_id)?)
    }

    /// Deletes a task and, when linked, its audio note and clip file.
    pub fn delete_task(&self, day: Day, task_id: TaskId) -> RegistryResult<Vec<RegistryWarning>> {
        let mut conn = self.lock()?;

        let tx = conn.transaction()?;
        let removed_note = {
            let repo = SqliteTaskRepository::new(&tx);
            let task = repo
                .get_task(day, task_id)?
                .ok_or(RegistryError::TaskNotFound(task_id))?;
            let note = match task.linked_audio_id {
                Some(audio_id) => repo.get_audio_note(day, audio_id)?,
                None => None,
            };
            repo.delete_task(day, task_id)?;
            if let Some(note) = &note {
                repo.delete_audio_note(day, note.id)?;
            }
            note
        };
        tx.commit()?;

        let warnings = removed_note
            .map(|note| self.store.remove(note.resource_path()))
            .and_then(Result::err)
            .into_iter()
            .collect::<Vec<_>>();

        info!(
            "event=task_delete module=registry status=ok day={} warnings={}",
            day,
            warnings.len()
        );
        Ok(warnings)
    }

    /// Deletes an audio note and its clip file.
    ///
    /// The entry is removed even when the file cannot be; that failure is
    /// returned as `ResourceDeletionFailed`. A linking task stays, unlinked.
    pub fn delete_audio_note(
        &self,
        day: Day,
        audio_id: AudioNoteId,
    ) -> RegistryResult<Vec<RegistryWarning>> {
        let conn = self.lock()?;
        let repo = SqliteTaskRepository::new(&conn);
        let note = repo
            .get_audio_note(day, audio_id)?
            .ok_or(RegistryError::AudioNoteNotFound(audio_id))?;
        repo.delete_audio_note(day, audio_id)?;

        let warnings = self
            .store
            .remove(note.resource_path())
            .err()
            .into_iter()
            .collect::<Vec<_>>();

        info!(
            "event=audio_note_delete module=registry status=ok day={} warnings={}",
            day,
            warnings.len()
        );
        Ok(warnings)
    }

    /// Lists a day's tasks and audio notes in insertion order.
    pub fn list_by_day(&self, day: Day) -> RegistryResult<DayListing> {
        let conn = self.lock()?;
        let repo = SqliteTaskRepository::new(&conn);
        Ok(DayListing {
            tasks: repo.list_tasks(&TaskListQuery::all(day))?,
            audio: repo.list_audio_notes(day)?,
        })
    }

    /// Lists a day's tasks in one category, in insertion order.
    ///
    /// `Category::Quick` also covers tasks created without a category.
    pub fn filter_by_category(&self, day: Day, category: Category) -> RegistryResult<Vec<Task>> {
        let conn = self.lock()?;
        Ok(SqliteTaskRepository::new(&conn)
            .list_tasks(&TaskListQuery::in_category(day, category))?)
    }

    /// Lists what one category screen shows for a day: its tasks and the
    /// audio notes linked to them.
    pub fn list_category(&self, day: Day, category: Category) -> RegistryResult<DayListing> {
        let conn = self.lock()?;
        let repo = SqliteTaskRepository::new(&conn);
        Ok(DayListing {
            tasks: repo.list_tasks(&TaskListQuery::in_category(day, category))?,
            audio: repo.list_audio_notes_in_category(day, category)?,
        })
    }

    /// Groups a day's tasks by category in `Category::DISPLAY_ORDER`,
    /// omitting empty groups.
    pub fn day_sections(&self, day: Day) -> RegistryResult<Vec<CategorySection>> {
        let tasks = {
            let conn = self.lock()?;
            SqliteTaskRepository::new(&conn).list_tasks(&TaskListQuery::all(day))?
        };

        Ok(Category::DISPLAY_ORDER
            .iter()
            .filter_map(|&category| {
                let grouped = tasks
                    .iter()
                    .filter(|task| task.matches_category(category))
                    .cloned()
                    .collect::<Vec<_>>();
                (!grouped.is_empty()).then_some(CategorySection {
                    category,
                    tasks: grouped,
                })
            })
            .collect())
    }

    /// Returns whether a day has neither tasks nor audio notes.
    pub fn is_day_empty(&self, day: Day) -> RegistryResult<bool> {
        Ok(self.list_by_day(day)?.is_empty())
    }

    /// Task counts per non-empty day, for calendar-strip badges.
    ///
    /// `None` counts every task; `Some(category)` counts that category only.
    pub fn task_counts(&self, category: Option<Category>) -> RegistryResult<BTreeMap<Day, usize>> {
        let conn = self.lock()?;
        Ok(SqliteTaskRepository::new(&conn).count_tasks_by_day(category)?)
    }

    /// Returns the audio note linked to a task, if any.
    pub fn linked_audio(&self, day: Day, task_id: TaskId) -> RegistryResult<Option<AudioNote>> {
        let conn = self.lock()?;
        let repo = SqliteTaskRepository::new(&conn);
        let task = repo
            .get_task(day, task_id)?
            .ok_or(RegistryError::TaskNotFound(task_id))?;
        match task.linked_audio_id {
            Some(audio_id) => Ok(repo.get_audio_note(day, audio_id)?),
            None => Ok(None),
        }
    }

    fn lock(&self) -> RegistryResult<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| {
            error!("event=registry_lock module=registry status=error error_code=lock_poisoned");
            RegistryError::LockPoisoned
        })
    }
}

/// Writes a task and its audio note in one transaction.
fn insert_rows(conn: &mut Connection, task: &Task, note: Option<&AudioNote>) -> RegistryResult<()> {
    let tx = conn.transaction()?;
    {
        let repo = SqliteTaskRepository::new(&tx);
        if let Some(note) = note {
            repo.insert_audio_note(note)?;
        }
        repo.insert_task(task)?;
    }
    tx.commit()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{NewTask, RegistryConfig, RegistryError, TaskRegistry};
    use crate::audio::recording::TempAudioRef;
    use crate::clock::FixedClock;
    use crate::model::schedule::{Category, Day};
    use chrono::NaiveDate;
    use std::sync::Arc;

    fn day(value: u32) -> Day {
        Day::new(value).unwrap()
    }

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn registry_can_be_shared_across_threads() {
        assert_send_sync::<TaskRegistry>();
    }

    #[test]
    fn new_task_defaults_to_quick_without_time() {
        let request = NewTask::new(Day::new(1).unwrap(), "water plants");
        assert_eq!(request.category, Category::Quick);
        assert_eq!(request.time, None);
        assert_eq!(request.audio, None);
    }

    #[test]
    fn failed_insert_moves_saved_clip_back() {
        let dir = tempfile::tempdir().unwrap();
        let temp = dir.path().join("capture.m4a");
        std::fs::write(&temp, b"aac").unwrap();
        let saved_at = NaiveDate::from_ymd_opt(2026, 10, 19)
            .unwrap()
            .and_hms_opt(14, 30, 0)
            .unwrap();
        let registry =
            TaskRegistry::with_clock(RegistryConfig::default(), Arc::new(FixedClock(saved_at)))
                .unwrap();
        registry
            .conn
            .lock()
            .unwrap()
            .execute_batch("DROP TABLE tasks;")
            .unwrap();

        let err = registry
            .add_task(NewTask::new(day(3), "memo").with_audio(TempAudioRef::new(&temp)))
            .unwrap_err();

        assert!(matches!(err, RegistryError::Repo(_)));
        assert!(temp.is_file());
        assert!(!dir.path().join("2026-10-19_14-30-00.m4a").exists());
        assert!(registry.list_by_day(day(3)).is_err());
    }

    #[test]
    fn poisoned_lock_is_reported_instead_of_panicking() {
        let registry = TaskRegistry::new(RegistryConfig::default()).unwrap();

        let crashed = std::thread::scope(|scope| {
            scope
                .spawn(|| {
                    let _guard = registry.conn.lock().unwrap();
                    panic!("writer crashed while holding the store");
                })
                .join()
        });
        assert!(crashed.is_err());

        assert!(matches!(
            registry.list_by_day(day(1)),
            Err(RegistryError::LockPoisoned)
        ));
        assert!(matches!(
            registry.add_task(NewTask::new(day(1), "after crash")),
            Err(RegistryError::LockPoisoned)
        ));
    }
}
