//! Audio note collaborators: capture, saved-clip storage and playback.
//!
//! # Responsibility
//! - Define the platform-facing recorder/player traits.
//! - Enforce one active recording and one active playback per controller.
//! - Own the temp-to-permanent rename and removal of clip files.
//!
//! # Invariants
//! - Clip format is fixed (`RecordingFormat::STANDARD`), never user-chosen.
//! - Audio failures are reported to callers, never panics.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub mod playback;
pub mod recording;
pub mod store;

/// Microphone/session configuration failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AudioSessionError {
    /// A capture is already running for this session.
    AlreadyRecording,
    /// `stop` was called without a matching active capture.
    NoActiveRecording,
    /// Platform recorder reported a failure.
    Backend(String),
}

impl Display for AudioSessionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AlreadyRecording => write!(f, "a recording is already in progress"),
            Self::NoActiveRecording => write!(f, "no matching recording is in progress"),
            Self::Backend(message) => write!(f, "audio session failure: {message}"),
        }
    }
}

impl Error for AudioSessionError {}

/// Playback decode/session failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaybackError {
    /// The referenced clip does not exist on disk.
    MissingResource(PathBuf),
    /// Platform player reported a failure.
    Backend(String),
}

impl Display for PlaybackError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingResource(path) => {
                write!(f, "audio resource not found: {}", path.display())
            }
            Self::Backend(message) => write!(f, "playback failure: {message}"),
        }
    }
}

impl Error for PlaybackError {}
