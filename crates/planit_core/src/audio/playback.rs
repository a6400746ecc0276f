//! Single-stream playback of saved clips.
//!
//! # Invariants
//! - At most one clip plays per controller; a new `play` stops the previous.

use crate::audio::PlaybackError;
use log::{error, info};
use std::path::{Path, PathBuf};

/// Platform playback backend.
pub trait AudioPlayer {
    /// Acquires the playback session and starts `resource`.
    fn play(&mut self, resource: &Path) -> Result<(), PlaybackError>;
    fn stop(&mut self);
}

/// Playback state over an `AudioPlayer`.
pub struct PlaybackController<P: AudioPlayer> {
    player: P,
    current: Option<PathBuf>,
}

impl<P: AudioPlayer> PlaybackController<P> {
    pub fn new(player: P) -> Self {
        Self {
            player,
            current: None,
        }
    }

    pub fn now_playing(&self) -> Option<&Path> {
        self.current.as_deref()
    }

    /// Plays `resource`, interrupting any clip already playing.
    ///
    /// # Errors
    /// - `MissingResource` when the clip file does not exist.
    /// - `Backend` when the player fails to start.
    pub fn play(&mut self, resource: &Path) -> Result<(), PlaybackError> {
        if !resource.is_file() {
            error!(
                "event=playback_start module=audio status=error error_code=missing_resource path={}",
                resource.display()
            );
            return Err(PlaybackError::MissingResource(resource.to_path_buf()));
        }

        self.stop();
        if let Err(err) = self.player.play(resource) {
            error!("event=playback_start module=audio status=error error={err}");
            return Err(err);
        }

        info!(
            "event=playback_start module=audio status=ok path={}",
            resource.display()
        );
        self.current = Some(resource.to_path_buf());
        Ok(())
    }

    pub fn stop(&mut self) {
        if self.current.take().is_some() {
            self.player.stop();
        }
    }
}
