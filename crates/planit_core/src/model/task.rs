//! Task domain model.
//!
//! # Responsibility
//! - Define the single task record shared by the unified and category views.
//! - Hold the explicit link to an audio note created alongside the task.
//!
//! # Invariants
//! - `id` is stable and never reused for another task.
//! - `name` is never blank once a task is stored.
//! - `linked_audio_id`, when set, points at an audio note of the same day.

use crate::model::audio_note::AudioNoteId;
use crate::model::schedule::{Category, Day, TaskTime, TaskValidationError};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier for a task.
pub type TaskId = Uuid;

/// Canonical task record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub day: Day,
    pub name: String,
    pub is_completed: bool,
    /// `None` means unscheduled within the day.
    pub time: Option<TaskTime>,
    pub category: Category,
    pub linked_audio_id: Option<AudioNoteId>,
}

impl Task {
    /// Creates an open, unlinked task with a generated ID.
    pub fn new(day: Day, name: impl Into<String>, category: Category) -> Self {
        Self::with_id(Uuid::new_v4(), day, name, category)
    }

    /// Creates a task with a caller-provided stable ID.
    pub fn with_id(id: TaskId, day: Day, name: impl Into<String>, category: Category) -> Self {
        Self {
            id,
            day,
            name: name.into(),
            is_completed: false,
            time: None,
            category,
            linked_audio_id: None,
        }
    }

    /// Checks the stored-state invariants.
    pub fn validate(&self) -> Result<(), TaskValidationError> {
        if self.name.trim().is_empty() {
            return Err(TaskValidationError::EmptyName);
        }
        Ok(())
    }

    /// Returns whether this task is shown by the `category` filter.
    pub fn matches_category(&self, category: Category) -> bool {
        self.category == category
    }
}
