//! Exclusive microphone capture into temporary clips.
//!
//! # Invariants
//! - At most one capture is active per `RecordingSession`.
//! - Captures are written to `<temp_dir>/<uuid>.m4a` until saved.

use crate::audio::AudioSessionError;
use log::{error, info};
use std::path::{Path, PathBuf};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioCodec {
    Aac,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncoderQuality {
    Low,
    Medium,
    High,
}

/// Encoder settings handed to the platform recorder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordingFormat {
    pub extension: &'static str,
    pub codec: AudioCodec,
    pub sample_rate_hz: u32,
    pub channels: u16,
    pub quality: EncoderQuality,
}

impl RecordingFormat {
    /// AAC in an `.m4a` container, 44.1 kHz mono, high quality.
    pub const STANDARD: Self = Self {
        extension: "m4a",
        codec: AudioCodec::Aac,
        sample_rate_hz: 44_100,
        channels: 1,
        quality: EncoderQuality::High,
    };
}

/// Platform capture backend.
pub trait AudioRecorder {
    /// Acquires the microphone and starts writing to `target`.
    fn begin(&mut self, target: &Path, format: &RecordingFormat) -> Result<(), AudioSessionError>;
    /// Finalizes the file started by the last `begin`.
    fn finish(&mut self) -> Result<(), AudioSessionError>;
}

/// Opaque token for the capture returned by `RecordingSession::start`.
#[derive(Debug, PartialEq, Eq)]
pub struct RecordingHandle {
    id: Uuid,
}

/// Finished capture still living at its temporary location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TempAudioRef {
    path: PathBuf,
}

impl TempAudioRef {
    /// Wraps a clip captured outside this session (e.g. by the host UI).
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

struct ActiveRecording {
    handle_id: Uuid,
    target: PathBuf,
}

/// Per-form recording state machine over an `AudioRecorder`.
pub struct RecordingSession<R: AudioRecorder> {
    recorder: R,
    temp_dir: PathBuf,
    active: Option<ActiveRecording>,
}

impl<R: AudioRecorder> RecordingSession<R> {
    pub fn new(recorder: R, temp_dir: impl Into<PathBuf>) -> Self {
        Self {
            recorder,
            temp_dir: temp_dir.into(),
            active: None,
        }
    }

    pub fn is_recording(&self) -> bool {
        self.active.is_some()
    }

    /// Starts a capture into a fresh temporary file.
    ///
    /// # Errors
    /// - `AlreadyRecording` when a capture is running.
    /// - `Backend` when the recorder cannot start; no capture is active then.
    pub fn start(&mut self) -> Result<RecordingHandle, AudioSessionError> {
        if self.active.is_some() {
            return Err(AudioSessionError::AlreadyRecording);
        }

        let format = RecordingFormat::STANDARD;
        let handle_id = Uuid::new_v4();
        let target = self
            .temp_dir
            .join(format!("{handle_id}.{}", format.extension));

        if let Err(err) = self.recorder.begin(&target, &format) {
            error!("event=recording_start module=audio status=error error={err}");
            return Err(err);
        }

        info!(
            "event=recording_start module=audio status=ok target={}",
            target.display()
        );
        self.active = Some(ActiveRecording { handle_id, target });
        Ok(RecordingHandle { id: handle_id })
    }

    /// Stops the capture identified by `handle` and returns its temp clip.
    ///
    /// The session is idle afterwards even when the recorder fails to finalize.
    pub fn stop(&mut self, handle: RecordingHandle) -> Result<TempAudioRef, AudioSessionError> {
        let active = match self.active.take() {
            Some(active) if active.handle_id == handle.id => active,
            other => {
                self.active = other;
                return Err(AudioSessionError::NoActiveRecording);
            }
        };

        if let Err(err) = self.recorder.finish() {
            error!("event=recording_stop module=audio status=error error={err}");
            return Err(err);
        }

        info!(
            "event=recording_stop module=audio status=ok target={}",
            active.target.display()
        );
        Ok(TempAudioRef::new(active.target))
    }
}
