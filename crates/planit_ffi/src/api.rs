//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose the task registry to the app's screens via FRB.
//! - Translate string inputs from Dart into validated core types.
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - Every screen talks to the same process-wide registry.
//! - Failures come back as `ok=false` envelopes, never as silent no-ops.

use once_cell::sync::OnceCell;
use planit_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, month_days,
    ping as ping_inner, AudioNote, Category, Day, NewTask, RegistryConfig, RegistryWarning, Task,
    TaskRegistry, TaskTime, TempAudioRef,
};
use uuid::Uuid;

static REGISTRY: OnceCell<TaskRegistry> = OnceCell::new();

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive); empty
///   selects the build default.
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir` (idempotent).
/// - Returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err.to_string(),
    }
}

/// Chooses where saved clips are moved to.
///
/// Must run before any other registry call; afterwards the registry is
/// fixed for the process lifetime and this returns an error message.
#[flutter_rust_bridge::frb(sync)]
pub fn configure_registry(audio_dir: Option<String>) -> String {
    let config = RegistryConfig {
        audio_dir: audio_dir
            .map(|dir| dir.trim().to_string())
            .filter(|dir| !dir.is_empty())
            .map(Into::into),
    };
    let mut created = false;
    let result = REGISTRY.get_or_try_init(|| {
        created = true;
        TaskRegistry::new(config)
    });
    match result {
        Ok(_) if created => String::new(),
        Ok(_) => "registry already configured".to_string(),
        Err(err) => format!("configure_registry failed: {err}"),
    }
}

/// Task row shown by list screens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskItem {
    pub task_id: String,
    pub name: String,
    pub is_completed: bool,
    /// `HH:MM` or `None` when unscheduled.
    pub time: Option<String>,
    /// `quick|personal|hobby|work|other`.
    pub category: String,
    /// Playable clip for this task, if one was saved with it.
    pub audio_path: Option<String>,
}

/// Audio note row shown by list screens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioItem {
    pub audio_id: String,
    pub label: String,
    pub path: String,
    pub is_completed: bool,
    pub time: Option<String>,
}

/// Day list envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayListResponse {
    pub ok: bool,
    pub tasks: Vec<TaskItem>,
    pub audio: Vec<AudioItem>,
    /// `true` when the listed view has neither tasks nor audio notes.
    pub is_empty: bool,
    pub message: String,
}

/// Generic action envelope for add/toggle/delete flows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskActionResponse {
    pub ok: bool,
    pub task_id: Option<String>,
    pub audio_id: Option<String>,
    /// New completion state for toggle actions.
    pub is_completed: Option<bool>,
    /// Non-fatal resource problems, one message each.
    pub warnings: Vec<String>,
    pub message: String,
}

impl TaskActionResponse {
    fn success(message: impl Into<String>) -> Self {
        Self {
            ok: true,
            task_id: None,
            audio_id: None,
            is_completed: None,
            warnings: Vec::new(),
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            ..Self::success(message)
        }
    }

    fn with_warnings(mut self, warnings: Vec<RegistryWarning>) -> Self {
        self.warnings = warnings.iter().map(ToString::to_string).collect();
        self
    }
}

/// One category group of the unified day screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionItem {
    pub category: String,
    /// Header text, e.g. `Hobby Tasks`.
    pub title: String,
    pub tasks: Vec<TaskItem>,
}

/// Calendar-strip badge count for one day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayCountItem {
    pub day: u32,
    pub count: u32,
}

/// Calendar-strip cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarDayItem {
    pub day: u32,
    pub weekday: String,
}

/// Saves a task from any add-task form.
///
/// Input semantics:
/// - `category`: `None`/blank/`quick` for quick-add, else a category label.
/// - `time`: optional `HH:MM`.
/// - `audio_path`: temporary clip captured by the form, if any.
#[flutter_rust_bridge::frb(sync)]
pub fn task_add(
    day: u32,
    name: String,
    time: Option<String>,
    category: Option<String>,
    audio_path: Option<String>,
) -> TaskActionResponse {
    let request = match parse_new_task(day, name, time, category, audio_path) {
        Ok(request) => request,
        Err(message) => return TaskActionResponse::failure(format!("task_add failed: {message}")),
    };

    match registry().and_then(|registry| registry.add_task(request).map_err(|err| err.to_string()))
    {
        Ok(outcome) => TaskActionResponse {
            task_id: Some(outcome.task_id.to_string()),
            audio_id: outcome.audio_id.map(|id| id.to_string()),
            ..TaskActionResponse::success("Task saved.")
        }
        .with_warnings(outcome.warnings),
        Err(message) => TaskActionResponse::failure(format!("task_add failed: {message}")),
    }
}

/// Toggles task completion.
#[flutter_rust_bridge::frb(sync)]
pub fn task_toggle(day: u32, task_id: String) -> TaskActionResponse {
    let result = parse_day_and_id(day, &task_id).and_then(|(day, id)| {
        registry()?
            .toggle_completion(day, id)
            .map_err(|err| err.to_string())
    });
    match result {
        Ok(state) => TaskActionResponse {
            task_id: Some(task_id),
            is_completed: Some(state),
            ..TaskActionResponse::success("Task updated.")
        },
        Err(message) => TaskActionResponse::failure(format!("task_toggle failed: {message}")),
    }
}

/// Deletes a task and its linked audio note.
#[flutter_rust_bridge::frb(sync)]
pub fn task_delete(day: u32, task_id: String) -> TaskActionResponse {
    let result = parse_day_and_id(day, &task_id).and_then(|(day, id)| {
        registry()?
            .delete_task(day, id)
            .map_err(|err| err.to_string())
    });
    match result {
        Ok(warnings) => TaskActionResponse {
            task_id: Some(task_id),
            ..TaskActionResponse::success("Task deleted.")
        }
        .with_warnings(warnings),
        Err(message) => TaskActionResponse::failure(format!("task_delete failed: {message}")),
    }
}

/// Toggles audio note completion.
#[flutter_rust_bridge::frb(sync)]
pub fn audio_note_toggle(day: u32, audio_id: String) -> TaskActionResponse {
    let result = parse_day_and_id(day, &audio_id).and_then(|(day, id)| {
        registry()?
            .toggle_audio_completion(day, id)
            .map_err(|err| err.to_string())
    });
    match result {
        Ok(state) => TaskActionResponse {
            audio_id: Some(audio_id),
            is_completed: Some(state),
            ..TaskActionResponse::success("Audio note updated.")
        },
        Err(message) => {
            TaskActionResponse::failure(format!("audio_note_toggle failed: {message}"))
        }
    }
}

/// Deletes an audio note and its clip file.
#[flutter_rust_bridge::frb(sync)]
pub fn audio_note_delete(day: u32, audio_id: String) -> TaskActionResponse {
    let result = parse_day_and_id(day, &audio_id).and_then(|(day, id)| {
        registry()?
            .delete_audio_note(day, id)
            .map_err(|err| err.to_string())
    });
    match result {
        Ok(warnings) => TaskActionResponse {
            audio_id: Some(audio_id),
            ..TaskActionResponse::success("Audio note deleted.")
        }
        .with_warnings(warnings),
        Err(message) => {
            TaskActionResponse::failure(format!("audio_note_delete failed: {message}"))
        }
    }
}

/// Lists one day for the unified screen, or one category screen.
///
/// `category = None` lists every task and audio note; a category lists its
/// tasks and the audio notes linked to them.
#[flutter_rust_bridge::frb(sync)]
pub fn day_list(day: u32, category: Option<String>) -> DayListResponse {
    match load_day(day, category) {
        Ok((tasks, audio)) => {
            let is_empty = tasks.is_empty() && audio.is_empty();
            let message = if is_empty {
                "Nothing planned for today!".to_string()
            } else {
                format!("{} task(s), {} audio note(s).", tasks.len(), audio.len())
            };
            DayListResponse {
                ok: true,
                tasks,
                audio,
                is_empty,
                message,
            }
        }
        Err(message) => DayListResponse {
            ok: false,
            tasks: Vec::new(),
            audio: Vec::new(),
            is_empty: true,
            message: format!("day_list failed: {message}"),
        },
    }
}

/// Category groups for the unified day screen, in display order.
///
/// Empty categories are omitted; an invalid day yields an empty list.
#[flutter_rust_bridge::frb(sync)]
pub fn day_sections(day: u32) -> Vec<SectionItem> {
    let sections = Day::new(day)
        .map_err(|err| err.to_string())
        .and_then(|day| {
            let registry = registry()?;
            let sections = registry.day_sections(day).map_err(|err| err.to_string())?;
            let audio = registry
                .list_by_day(day)
                .map_err(|err| err.to_string())?
                .audio;
            Ok((sections, audio))
        });
    match sections {
        Ok((sections, audio)) => sections
            .into_iter()
            .map(|section| SectionItem {
                category: section.category.as_str().to_string(),
                title: section.category.section_title().to_string(),
                tasks: section
                    .tasks
                    .into_iter()
                    .map(|task| to_task_item(task, &audio))
                    .collect(),
            })
            .collect(),
        Err(message) => {
            log::warn!("event=day_sections module=ffi status=error error={message}");
            Vec::new()
        }
    }
}

/// Badge counts for the calendar strip; `category = None` counts all.
///
/// Returns an empty list when the category label is unknown.
#[flutter_rust_bridge::frb(sync)]
pub fn task_counts(category: Option<String>) -> Vec<DayCountItem> {
    let filter = match category {
        Some(label) => Category::from_label(Some(&label))
            .map(Some)
            .map_err(|err| err.to_string()),
        None => Ok(None),
    };
    let counts = filter.and_then(|filter| {
        registry()?
            .task_counts(filter)
            .map_err(|err| err.to_string())
    });
    match counts {
        Ok(counts) => counts
            .into_iter()
            .map(|(day, count)| DayCountItem {
                day: day.get(),
                count: u32::try_from(count).unwrap_or(u32::MAX),
            })
            .collect(),
        Err(message) => {
            log::warn!("event=task_counts module=ffi status=error error={message}");
            Vec::new()
        }
    }
}

/// Calendar-strip cells for a month; empty for an invalid month.
#[flutter_rust_bridge::frb(sync)]
pub fn calendar_days(year: i32, month: u32) -> Vec<CalendarDayItem> {
    month_days(year, month)
        .unwrap_or_default()
        .into_iter()
        .map(|cell| CalendarDayItem {
            day: cell.day.get(),
            weekday: cell.weekday,
        })
        .collect()
}

fn registry() -> Result<&'static TaskRegistry, String> {
    REGISTRY
        .get_or_try_init(|| TaskRegistry::new(RegistryConfig::default()))
        .map_err(|err| format!("registry init failed: {err}"))
}

fn parse_new_task(
    day: u32,
    name: String,
    time: Option<String>,
    category: Option<String>,
    audio_path: Option<String>,
) -> Result<NewTask, String> {
    let day = Day::new(day).map_err(|err| err.to_string())?;
    let category = Category::from_label(category.as_deref()).map_err(|err| err.to_string())?;
    let mut request = NewTask::new(day, name).in_category(category);

    if let Some(raw) = time.filter(|raw| !raw.trim().is_empty()) {
        request = request.at(TaskTime::parse(&raw).map_err(|err| err.to_string())?);
    }
    if let Some(path) = audio_path.filter(|path| !path.trim().is_empty()) {
        request = request.with_audio(TempAudioRef::new(path.trim()));
    }
    Ok(request)
}

fn parse_day_and_id(day: u32, id: &str) -> Result<(Day, Uuid), String> {
    let day = Day::new(day).map_err(|err| err.to_string())?;
    let id = Uuid::parse_str(id.trim()).map_err(|_| format!("invalid id `{id}`"))?;
    Ok((day, id))
}

fn load_day(day: u32, category: Option<String>) -> Result<(Vec<TaskItem>, Vec<AudioItem>), String> {
    let day = Day::new(day).map_err(|err| err.to_string())?;
    let registry = registry()?;
    let listing = match category {
        Some(label) => {
            let category = Category::from_label(Some(&label)).map_err(|err| err.to_string())?;
            registry.list_category(day, category)
        }
        None => registry.list_by_day(day),
    }
    .map_err(|err| err.to_string())?;

    let audio_items = listing.audio.iter().map(to_audio_item).collect();
    let task_items = listing
        .tasks
        .into_iter()
        .map(|task| to_task_item(task, &listing.audio))
        .collect();
    Ok((task_items, audio_items))
}

fn to_task_item(task: Task, audio: &[AudioNote]) -> TaskItem {
    let audio_path = task.linked_audio_id.and_then(|audio_id| {
        audio
            .iter()
            .find(|note| note.id == audio_id)
            .map(|note| note.resource_path.display().to_string())
    });
    TaskItem {
        task_id: task.id.to_string(),
        name: task.name,
        is_completed: task.is_completed,
        time: task.time.map(|time| time.to_string()),
        category: task.category.as_str().to_string(),
        audio_path,
    }
}

fn to_audio_item(note: &AudioNote) -> AudioItem {
    AudioItem {
        audio_id: note.id.to_string(),
        label: note.label(),
        path: note.resource_path.display().to_string(),
        is_completed: note.is_completed,
        time: note.time.map(|time| time.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::{
        audio_note_delete, calendar_days, core_version, day_list, day_sections, init_logging,
        ping, task_add, task_counts, task_delete, task_toggle,
    };

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }

    #[test]
    fn init_logging_rejects_empty_log_dir() {
        let error = init_logging("info".to_string(), String::new());
        assert!(!error.is_empty());
    }

    #[test]
    fn init_logging_rejects_unsupported_level() {
        let error = init_logging("verbose".to_string(), "/tmp/logs".to_string());
        assert!(!error.is_empty());
    }

    #[test]
    fn task_add_then_category_list_shows_task_once() {
        let added = task_add(
            18,
            "Buy milk".to_string(),
            Some("09:00".to_string()),
            Some("Personal".to_string()),
            None,
        );
        assert!(added.ok, "{}", added.message);
        let task_id = added.task_id.expect("task_add should return task_id");

        let personal = day_list(18, Some("personal".to_string()));
        assert!(personal.ok, "{}", personal.message);
        let hits = personal
            .tasks
            .iter()
            .filter(|task| task.task_id == task_id)
            .collect::<Vec<_>>();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].time.as_deref(), Some("09:00"));
        assert_eq!(hits[0].category, "personal");

        let unified = day_list(18, None);
        assert_eq!(
            unified
                .tasks
                .iter()
                .filter(|task| task.task_id == task_id)
                .count(),
            1
        );
    }

    #[test]
    fn task_add_rejects_bad_input_with_messages() {
        let blank = task_add(3, " ".to_string(), None, None, None);
        assert!(!blank.ok);
        assert!(blank.message.contains("empty"));

        let bad_day = task_add(40, "x".to_string(), None, None, None);
        assert!(!bad_day.ok);

        let bad_time = task_add(3, "x".to_string(), Some("25:00".to_string()), None, None);
        assert!(!bad_time.ok);

        let bad_category = task_add(3, "x".to_string(), None, Some("misc".to_string()), None);
        assert!(!bad_category.ok);
    }

    #[test]
    fn audio_task_exposes_playable_path_and_cleans_up() {
        let dir = tempfile::tempdir().unwrap();
        let temp = dir.path().join("capture.m4a");
        std::fs::write(&temp, b"aac").unwrap();

        let added = task_add(
            25,
            String::new(),
            None,
            Some("hobby".to_string()),
            Some(temp.display().to_string()),
        );
        assert!(added.ok, "{}", added.message);
        let task_id = added.task_id.clone().unwrap();
        let audio_id = added.audio_id.clone().unwrap();

        let listing = day_list(25, Some("hobby".to_string()));
        let task = listing
            .tasks
            .iter()
            .find(|task| task.task_id == task_id)
            .unwrap();
        assert_eq!(task.name, "Audio Task");
        let path = task.audio_path.clone().expect("audio path should be exposed");
        assert!(std::path::Path::new(&path).is_file());

        let deleted = task_delete(25, task_id);
        assert!(deleted.ok, "{}", deleted.message);
        assert!(deleted.warnings.is_empty());
        assert!(!std::path::Path::new(&path).exists());

        let again = audio_note_delete(25, audio_id);
        assert!(!again.ok);
    }

    #[test]
    fn toggle_reports_new_state_and_unknown_ids() {
        let added = task_add(26, "stretch".to_string(), None, None, None);
        let task_id = added.task_id.unwrap();

        let toggled = task_toggle(26, task_id.clone());
        assert_eq!(toggled.is_completed, Some(true));
        let restored = task_toggle(26, task_id);
        assert_eq!(restored.is_completed, Some(false));

        let unknown = task_toggle(26, uuid::Uuid::new_v4().to_string());
        assert!(!unknown.ok);
        let malformed = task_toggle(26, "not-a-uuid".to_string());
        assert!(!malformed.ok);
    }

    #[test]
    fn task_counts_include_added_day() {
        let added = task_add(
            27,
            "count me".to_string(),
            None,
            Some("other".to_string()),
            None,
        );
        assert!(added.ok, "{}", added.message);

        let counts = task_counts(Some("other".to_string()));
        assert!(counts.iter().any(|item| item.day == 27 && item.count >= 1));
        assert!(task_counts(Some("unknown".to_string())).is_empty());
    }

    #[test]
    fn calendar_days_cover_month() {
        let days = calendar_days(2024, 2);
        assert_eq!(days.len(), 29);
        assert_eq!(days[0].day, 1);
        assert!(calendar_days(2024, 0).is_empty());
    }

    #[test]
    fn category_screen_hides_other_categories_audio() {
        let dir = tempfile::tempdir().unwrap();
        let clip = dir.path().join("guitar.m4a");
        std::fs::write(&clip, b"aac").unwrap();

        let added = task_add(
            19,
            "guitar".to_string(),
            None,
            Some("hobby".to_string()),
            Some(clip.display().to_string()),
        );
        assert!(added.ok, "{}", added.message);
        let audio_id = added.audio_id.unwrap();

        let hobby = day_list(19, Some("hobby".to_string()));
        assert!(hobby.audio.iter().any(|note| note.audio_id == audio_id));
        assert!(!hobby.is_empty);

        let personal = day_list(19, Some("personal".to_string()));
        assert!(personal.ok, "{}", personal.message);
        assert!(personal.audio.iter().all(|note| note.audio_id != audio_id));

        let unified = day_list(19, None);
        assert!(unified.audio.iter().any(|note| note.audio_id == audio_id));
    }

    #[test]
    fn day_sections_carry_titles_in_display_order() {
        for (name, category) in [("slides", "work"), ("sketch", "hobby")] {
            let added = task_add(
                29,
                name.to_string(),
                None,
                Some(category.to_string()),
                None,
            );
            assert!(added.ok, "{}", added.message);
        }

        let sections = day_sections(29);
        let hobby = sections
            .iter()
            .position(|section| section.category == "hobby")
            .unwrap();
        let work = sections
            .iter()
            .position(|section| section.category == "work")
            .unwrap();
        assert!(hobby < work);
        assert_eq!(sections[hobby].title, "Hobby Tasks");
        assert!(sections[work].tasks.iter().any(|task| task.name == "slides"));
        assert!(day_sections(0).is_empty());
    }
}
