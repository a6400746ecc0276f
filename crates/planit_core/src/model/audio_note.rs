//! Audio note domain model.
//!
//! # Invariants
//! - `resource_path` names the backing clip; the registry entry and the file
//!   are removed together.

use crate::model::schedule::{Day, TaskTime};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Stable identifier for an audio note.
pub type AudioNoteId = Uuid;

/// Recorded clip attached to a day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioNote {
    pub id: AudioNoteId,
    pub day: Day,
    pub resource_path: PathBuf,
    pub is_completed: bool,
    pub time: Option<TaskTime>,
}

impl AudioNote {
    pub fn new(day: Day, resource_path: impl Into<PathBuf>) -> Self {
        Self {
            id: Uuid::new_v4(),
            day,
            resource_path: resource_path.into(),
            is_completed: false,
            time: None,
        }
    }

    pub fn resource_path(&self) -> &Path {
        &self.resource_path
    }

    /// Row title: the clip's file name without extension.
    pub fn label(&self) -> String {
        self.resource_path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::AudioNote;
    use crate::model::schedule::Day;

    #[test]
    fn label_drops_directory_and_extension() {
        let note = AudioNote::new(
            Day::new(3).unwrap(),
            "/tmp/audio/2026-10-19_08-15-00.m4a",
        );
        assert_eq!(note.label(), "2026-10-19_08-15-00");
        assert!(!note.is_completed);
    }
}
