use chrono::{Duration, NaiveDate, NaiveDateTime};
use planit_core::{
    Category, Clock, Day, FixedClock, NewTask, RegistryConfig, RegistryError, RegistryWarning,
    TaskRegistry, TaskTime, TempAudioRef, AUDIO_TASK_PLACEHOLDER,
};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

/// Advances one second per reading so saved clips get distinct names.
struct TickingClock {
    start: NaiveDateTime,
    ticks: AtomicI64,
}

impl TickingClock {
    fn new() -> Self {
        Self {
            start: NaiveDate::from_ymd_opt(2026, 10, 19)
                .unwrap()
                .and_hms_opt(14, 30, 0)
                .unwrap(),
            ticks: AtomicI64::new(0),
        }
    }
}

impl Clock for TickingClock {
    fn now(&self) -> NaiveDateTime {
        self.start + Duration::seconds(self.ticks.fetch_add(1, Ordering::SeqCst))
    }
}

fn day(value: u32) -> Day {
    Day::new(value).unwrap()
}

fn registry() -> TaskRegistry {
    TaskRegistry::with_clock(RegistryConfig::default(), Arc::new(TickingClock::new())).unwrap()
}

fn temp_clip(dir: &Path, name: &str) -> TempAudioRef {
    let path = dir.join(name);
    std::fs::write(&path, b"aac").unwrap();
    TempAudioRef::new(path)
}

#[test]
fn blank_hobby_task_with_audio_gets_placeholder_and_one_linked_note() {
    let dir = tempfile::tempdir().unwrap();
    let registry = registry();

    let outcome = registry
        .add_task(
            NewTask::new(day(5), "")
                .at(TaskTime::parse("14:30").unwrap())
                .in_category(Category::Hobby)
                .with_audio(temp_clip(dir.path(), "capture.m4a")),
        )
        .unwrap();
    assert!(outcome.warnings.is_empty());

    let listing = registry.list_by_day(day(5)).unwrap();
    assert_eq!(listing.tasks.len(), 1);
    assert_eq!(listing.audio.len(), 1);
    assert!(listing
        .tasks
        .iter()
        .all(|task| task.name != "Untitled Task"));

    let task = &listing.tasks[0];
    assert_eq!(task.name, AUDIO_TASK_PLACEHOLDER);
    assert_eq!(task.category, Category::Hobby);
    assert_eq!(task.linked_audio_id, outcome.audio_id);

    let note = &listing.audio[0];
    assert_eq!(Some(note.id), task.linked_audio_id);
    assert_eq!(note.resource_path, dir.path().join("2026-10-19_14-30-00.m4a"));
    assert_eq!(note.label(), "2026-10-19_14-30-00");
    assert_eq!(note.time, task.time);
    assert!(note.resource_path.is_file());
    assert!(!dir.path().join("capture.m4a").exists());

    let hobby = registry.filter_by_category(day(5), Category::Hobby).unwrap();
    assert_eq!(hobby.len(), 1);
}

#[test]
fn audio_link_does_not_depend_on_task_names() {
    let dir = tempfile::tempdir().unwrap();
    let registry = registry();

    let blank = registry
        .add_task(NewTask::new(day(6), "").with_audio(temp_clip(dir.path(), "a.m4a")))
        .unwrap();
    let first_dup = registry
        .add_task(NewTask::new(day(6), "practice").with_audio(temp_clip(dir.path(), "b.m4a")))
        .unwrap();
    let second_dup = registry
        .add_task(NewTask::new(day(6), "practice").with_audio(temp_clip(dir.path(), "c.m4a")))
        .unwrap();

    let listing = registry.list_by_day(day(6)).unwrap();
    assert_eq!(listing.audio.len(), 3);
    for outcome in [&blank, &first_dup, &second_dup] {
        let task = listing
            .tasks
            .iter()
            .find(|task| task.id == outcome.task_id)
            .unwrap();
        let matches = listing
            .audio
            .iter()
            .filter(|note| Some(note.id) == task.linked_audio_id)
            .count();
        assert_eq!(matches, 1);

        let linked = registry.linked_audio(day(6), task.id).unwrap().unwrap();
        assert_eq!(Some(linked.id), outcome.audio_id);
    }
}

#[test]
fn delete_task_removes_linked_note_and_clip() {
    let dir = tempfile::tempdir().unwrap();
    let registry = registry();
    let outcome = registry
        .add_task(
            NewTask::new(day(8), "voice memo")
                .in_category(Category::Work)
                .with_audio(temp_clip(dir.path(), "memo.m4a")),
        )
        .unwrap();
    let clip = registry.list_by_day(day(8)).unwrap().audio[0]
        .resource_path
        .clone();
    assert!(clip.is_file());

    let warnings = registry.delete_task(day(8), outcome.task_id).unwrap();
    assert!(warnings.is_empty());

    let listing = registry.list_by_day(day(8)).unwrap();
    assert!(listing.tasks.is_empty());
    assert!(listing.audio.is_empty());
    assert!(!clip.exists());
}

#[test]
fn delete_task_surfaces_clip_removal_failure() {
    let dir = tempfile::tempdir().unwrap();
    let registry = registry();
    let outcome = registry
        .add_task(NewTask::new(day(8), "memo").with_audio(temp_clip(dir.path(), "memo.m4a")))
        .unwrap();
    let clip = registry.list_by_day(day(8)).unwrap().audio[0]
        .resource_path
        .clone();
    std::fs::remove_file(&clip).unwrap();

    let warnings = registry.delete_task(day(8), outcome.task_id).unwrap();
    assert_eq!(warnings.len(), 1);
    assert!(matches!(
        &warnings[0],
        RegistryWarning::ResourceDeletionFailed { path, .. } if *path == clip
    ));
    assert!(registry.is_day_empty(day(8)).unwrap());
}

#[test]
fn delete_audio_note_with_missing_file_still_removes_entry() {
    let dir = tempfile::tempdir().unwrap();
    let registry = registry();
    let outcome = registry
        .add_task(NewTask::new(day(11), "song idea").with_audio(temp_clip(dir.path(), "x.m4a")))
        .unwrap();
    let audio_id = outcome.audio_id.unwrap();
    let clip = registry.list_by_day(day(11)).unwrap().audio[0]
        .resource_path
        .clone();
    std::fs::remove_file(&clip).unwrap();

    let warnings = registry.delete_audio_note(day(11), audio_id).unwrap();
    assert!(matches!(
        warnings.as_slice(),
        [RegistryWarning::ResourceDeletionFailed { .. }]
    ));

    let listing = registry.list_by_day(day(11)).unwrap();
    assert!(listing.audio.is_empty());
    assert_eq!(listing.tasks.len(), 1);
    assert_eq!(listing.tasks[0].linked_audio_id, None);
    assert_eq!(registry.linked_audio(day(11), outcome.task_id).unwrap(), None);
}

#[test]
fn delete_audio_note_rejects_unknown_id() {
    let registry = registry();
    let unknown = uuid::Uuid::new_v4();
    assert!(matches!(
        registry.delete_audio_note(day(11), unknown),
        Err(RegistryError::AudioNoteNotFound(id)) if id == unknown
    ));
}

#[test]
fn failed_rename_keeps_temp_path_and_warns() {
    let dir = tempfile::tempdir().unwrap();
    let registry = registry();
    let missing = TempAudioRef::new(dir.path().join("never-written.m4a"));

    let outcome = registry
        .add_task(NewTask::new(day(14), "lost clip").with_audio(missing))
        .unwrap();

    assert!(matches!(
        outcome.warnings.as_slice(),
        [RegistryWarning::ResourceMoveFailed { .. }]
    ));
    let listing = registry.list_by_day(day(14)).unwrap();
    assert_eq!(listing.tasks.len(), 1);
    assert_eq!(
        listing.audio[0].resource_path,
        dir.path().join("never-written.m4a")
    );
}

#[test]
fn configured_audio_dir_receives_saved_clips() {
    let temp_dir = tempfile::tempdir().unwrap();
    let saved_dir = tempfile::tempdir().unwrap();
    let config = RegistryConfig {
        audio_dir: Some(saved_dir.path().to_path_buf()),
    };
    let registry = TaskRegistry::with_clock(config, Arc::new(TickingClock::new())).unwrap();

    registry
        .add_task(NewTask::new(day(20), "dir").with_audio(temp_clip(temp_dir.path(), "t.m4a")))
        .unwrap();

    let path: PathBuf = registry.list_by_day(day(20)).unwrap().audio[0]
        .resource_path
        .clone();
    assert_eq!(path.parent(), Some(saved_dir.path()));
    assert!(path.is_file());
}

#[test]
fn audio_note_completion_toggles_independently_of_task() {
    let dir = tempfile::tempdir().unwrap();
    let registry = registry();
    let outcome = registry
        .add_task(NewTask::new(day(22), "listen").with_audio(temp_clip(dir.path(), "l.m4a")))
        .unwrap();
    let audio_id = outcome.audio_id.unwrap();

    assert!(registry.toggle_audio_completion(day(22), audio_id).unwrap());
    let listing = registry.list_by_day(day(22)).unwrap();
    assert!(listing.audio[0].is_completed);
    assert!(!listing.tasks[0].is_completed);

    assert!(!registry.toggle_audio_completion(day(22), audio_id).unwrap());
}

#[test]
fn category_screen_lists_only_its_own_audio_notes() {
    let dir = tempfile::tempdir().unwrap();
    let registry = registry();
    let guitar = registry
        .add_task(
            NewTask::new(day(24), "guitar")
                .in_category(Category::Hobby)
                .with_audio(temp_clip(dir.path(), "g.m4a")),
        )
        .unwrap();
    registry
        .add_task(NewTask::new(day(24), "call mum").in_category(Category::Personal))
        .unwrap();

    let hobby = registry.list_category(day(24), Category::Hobby).unwrap();
    assert_eq!(hobby.tasks.len(), 1);
    assert_eq!(
        hobby.audio.iter().map(|note| note.id).collect::<Vec<_>>(),
        vec![guitar.audio_id.unwrap()]
    );

    let personal = registry.list_category(day(24), Category::Personal).unwrap();
    assert_eq!(personal.tasks.len(), 1);
    assert!(personal.audio.is_empty());

    let work = registry.list_category(day(24), Category::Work).unwrap();
    assert!(work.is_empty());
    assert!(!registry.list_by_day(day(24)).unwrap().is_empty());
}

#[test]
fn deleting_task_clears_its_category_screen() {
    let dir = tempfile::tempdir().unwrap();
    let registry = registry();
    let outcome = registry
        .add_task(
            NewTask::new(day(26), "sketch")
                .in_category(Category::Hobby)
                .with_audio(temp_clip(dir.path(), "s.m4a")),
        )
        .unwrap();
    registry.delete_task(day(26), outcome.task_id).unwrap();

    assert!(registry
        .list_category(day(26), Category::Hobby)
        .unwrap()
        .is_empty());
    assert!(registry.is_day_empty(day(26)).unwrap());
}

#[test]
fn clips_saved_in_the_same_second_keep_timestamp_labels() {
    let dir = tempfile::tempdir().unwrap();
    let saved_at = NaiveDate::from_ymd_opt(2026, 10, 19)
        .unwrap()
        .and_hms_opt(9, 15, 0)
        .unwrap();
    let registry =
        TaskRegistry::with_clock(RegistryConfig::default(), Arc::new(FixedClock(saved_at)))
            .unwrap();

    for name in ["one.m4a", "two.m4a"] {
        let outcome = registry
            .add_task(NewTask::new(day(27), "").with_audio(temp_clip(dir.path(), name)))
            .unwrap();
        assert!(outcome.warnings.is_empty());
    }

    let labels = registry
        .list_by_day(day(27))
        .unwrap()
        .audio
        .iter()
        .map(|note| note.label())
        .collect::<Vec<_>>();
    assert_eq!(labels, vec!["2026-10-19_09-15-00", "2026-10-19_09-15-00_2"]);
    assert!(!dir.path().join("one.m4a").exists());
    assert!(!dir.path().join("two.m4a").exists());
}
