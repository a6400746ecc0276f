//! Core domain logic for PlanIt.
//! This crate owns the day-indexed task registry and its audio-note rules.

pub mod audio;
pub mod calendar;
pub mod clock;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod warning;

pub use audio::playback::{AudioPlayer, PlaybackController};
pub use audio::recording::{
    AudioRecorder, RecordingFormat, RecordingHandle, RecordingSession, TempAudioRef,
};
pub use audio::store::{AudioStore, PersistedAudio};
pub use audio::{AudioSessionError, PlaybackError};
pub use calendar::{current_month_days, month_days, month_length, today, CalendarDay};
pub use clock::{Clock, FixedClock, SystemClock};
pub use logging::{default_log_level, init_logging, logging_status, LogLevel, LoggingError};
pub use model::audio_note::{AudioNote, AudioNoteId};
pub use model::schedule::{Category, Day, TaskTime, TaskValidationError};
pub use model::task::{Task, TaskId};
pub use repo::task_repo::{
    RepoError, RepoResult, SqliteTaskRepository, TaskListQuery, TaskRepository,
};
pub use service::registry::{
    AddTaskOutcome, CategorySection, DayListing, NewTask, RegistryConfig, RegistryError,
    RegistryResult, TaskRegistry, AUDIO_TASK_PLACEHOLDER,
};
pub use warning::RegistryWarning;

/// Minimal health-check API for host integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
