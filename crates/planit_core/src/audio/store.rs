//! Saved-clip storage: timestamp rename on save, removal on delete.
//!
//! # Invariants
//! - Saved clips are named `yyyy-MM-dd_HH-mm-ss.m4a` from the save time;
//!   clips saved within the same second get a `_2`, `_3`, ... suffix.
//! - An existing clip is never overwritten by a rename.
//! - Failures become `RegistryWarning`s; the caller's operation proceeds.

use crate::audio::recording::{RecordingFormat, TempAudioRef};
use crate::warning::RegistryWarning;
use chrono::NaiveDateTime;
use log::{info, warn};
use std::path::{Path, PathBuf};

/// `chrono` pattern for saved clip file stems.
pub const SAVED_CLIP_TIMESTAMP_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";

const MAX_NAME_SUFFIX: u32 = 99;

/// Result of persisting a temporary clip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedAudio {
    /// Path the registry should reference.
    pub path: PathBuf,
    pub warning: Option<RegistryWarning>,
}

/// File operations for audio note resources.
#[derive(Debug, Clone, Default)]
pub struct AudioStore {
    /// `None` keeps saved clips next to their temporary capture.
    target_dir: Option<PathBuf>,
}

impl AudioStore {
    pub fn new(target_dir: Option<PathBuf>) -> Self {
        Self { target_dir }
    }

    /// File name a clip saved at `saved_at` receives.
    pub fn saved_file_name(saved_at: NaiveDateTime) -> String {
        Self::numbered_file_name(saved_at, 1)
    }

    fn numbered_file_name(saved_at: NaiveDateTime, number: u32) -> String {
        let stem = saved_at.format(SAVED_CLIP_TIMESTAMP_FORMAT);
        let extension = RecordingFormat::STANDARD.extension;
        if number == 1 {
            format!("{stem}.{extension}")
        } else {
            format!("{stem}_{number}.{extension}")
        }
    }

    /// Renames a temporary capture to its permanent timestamp name.
    ///
    /// On failure the temporary path is kept and returned with a warning.
    pub fn persist(&self, temp: &TempAudioRef, saved_at: NaiveDateTime) -> PersistedAudio {
        let from = temp.path().to_path_buf();
        let dir = match &self.target_dir {
            Some(dir) => dir.clone(),
            None => from
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_default(),
        };

        let first = dir.join(Self::saved_file_name(saved_at));
        if first == from {
            return PersistedAudio {
                path: from,
                warning: None,
            };
        }

        let result = free_destination(&dir, saved_at)
            .ok_or_else(|| "no free clip name for this second".to_string())
            .and_then(|to| move_clip(&from, &dir, &to).map(|()| to));

        match result {
            Ok(to) => {
                info!(
                    "event=audio_persist module=audio status=ok path={}",
                    to.display()
                );
                PersistedAudio {
                    path: to,
                    warning: None,
                }
            }
            Err(reason) => {
                warn!(
                    "event=audio_persist module=audio status=warn from={} to={} reason={}",
                    from.display(),
                    first.display(),
                    reason
                );
                PersistedAudio {
                    path: from.clone(),
                    warning: Some(RegistryWarning::ResourceMoveFailed {
                        from,
                        to: first,
                        reason,
                    }),
                }
            }
        }
    }

    /// Moves a persisted clip back to its temporary location.
    ///
    /// Used when the registry rejects the note after `persist` succeeded.
    pub fn restore(&self, saved: &Path, temp: &TempAudioRef) -> Result<(), RegistryWarning> {
        if saved == temp.path() {
            return Ok(());
        }
        let dir = temp.path().parent().unwrap_or_else(|| Path::new(""));
        match move_clip(saved, dir, temp.path()) {
            Ok(()) => {
                info!(
                    "event=audio_restore module=audio status=ok path={}",
                    temp.path().display()
                );
                Ok(())
            }
            Err(reason) => {
                warn!(
                    "event=audio_restore module=audio status=warn from={} to={} reason={}",
                    saved.display(),
                    temp.path().display(),
                    reason
                );
                Err(RegistryWarning::ResourceMoveFailed {
                    from: saved.to_path_buf(),
                    to: temp.path().to_path_buf(),
                    reason,
                })
            }
        }
    }

    /// Removes a clip file.
    pub fn remove(&self, path: &Path) -> Result<(), RegistryWarning> {
        match std::fs::remove_file(path) {
            Ok(()) => {
                info!(
                    "event=audio_remove module=audio status=ok path={}",
                    path.display()
                );
                Ok(())
            }
            Err(err) => {
                warn!(
                    "event=audio_remove module=audio status=warn path={} reason={}",
                    path.display(),
                    err
                );
                Err(RegistryWarning::ResourceDeletionFailed {
                    path: path.to_path_buf(),
                    reason: err.to_string(),
                })
            }
        }
    }
}

fn free_destination(dir: &Path, saved_at: NaiveDateTime) -> Option<PathBuf> {
    (1..=MAX_NAME_SUFFIX)
        .map(|number| dir.join(AudioStore::numbered_file_name(saved_at, number)))
        .find(|candidate| !candidate.exists())
}

fn move_clip(from: &Path, dir: &Path, to: &Path) -> Result<(), String> {
    if !from.is_file() {
        return Err("temporary clip does not exist".to_string());
    }
    if to.exists() {
        return Err("destination already exists".to_string());
    }
    if !dir.as_os_str().is_empty() {
        std::fs::create_dir_all(dir).map_err(|err| err.to_string())?;
    }
    std::fs::rename(from, to).map_err(|err| err.to_string())
}
