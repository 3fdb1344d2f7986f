//! Media Backend
//!
//! The seam between the player and the media-playback library. The controller,
//! the lifecycle worker and the UI only ever talk to `MediaBackend`; the libVLC
//! implementation lives in `vlc`.

use std::path::Path;
use thiserror::Error;

use crate::subtitles::SubtitleTrack;

#[derive(Debug, Error)]
pub enum MediaError {
    #[error("Media library not found (searched: {0:?})")]
    LibraryNotFound(Vec<String>),
    #[error("Media library symbol missing: {name} ({reason})")]
    MissingSymbol { name: &'static str, reason: String },
    #[error("Media library failed to initialise")]
    InitFailed,
    #[error("Failed to open media: {0}")]
    OpenFailed(String),
    #[error("Path contains an interior NUL byte: {0}")]
    InvalidPath(String),
    #[error("Media library call failed: {0}")]
    CallFailed(&'static str),
}

/// Player state as reported by the media library
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaState {
    Idle,
    Opening,
    Buffering,
    Playing,
    Paused,
    Stopped,
    Ended,
    Error,
}

impl MediaState {
    /// Map libVLC's `libvlc_state_t`
    pub fn from_raw(raw: i32) -> Self {
        match raw {
            1 => MediaState::Opening,
            2 => MediaState::Buffering,
            3 => MediaState::Playing,
            4 => MediaState::Paused,
            5 => MediaState::Stopped,
            6 => MediaState::Ended,
            7 => MediaState::Error,
            _ => MediaState::Idle,
        }
    }
}

/// Operations the player needs from a media-playback library.
///
/// Methods take `&self`: the handle is shared between the UI thread and the
/// lifecycle worker, and the library does its own locking.
pub trait MediaBackend: Send + Sync {
    fn play(&self) -> Result<(), MediaError>;
    fn pause(&self);
    fn stop(&self);

    fn state(&self) -> MediaState;

    /// Current position, `None` while the library has no time yet
    fn time_ms(&self) -> Option<u64>;
    fn set_time_ms(&self, ms: u64);

    /// Media duration, 0 while unknown
    fn duration_ms(&self) -> u64;

    fn set_volume(&self, volume: u8) -> Result<(), MediaError>;

    /// Subtitle (SPU) tracks reported by the library, including the -1 "disable" entry
    fn subtitle_tracks(&self) -> Vec<SubtitleTrack>;
    /// Selected SPU id, -1 when none
    fn current_subtitle(&self) -> i32;
    fn set_subtitle(&self, id: i32) -> Result<(), MediaError>;
    /// Load a sidecar subtitle file and show it
    fn load_subtitle_file(&self, path: &Path) -> Result<(), MediaError>;

    /// Drop any forced scaling / aspect so the video keeps its native ratio
    fn use_native_aspect(&self);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_mapping() {
        assert_eq!(MediaState::from_raw(0), MediaState::Idle);
        assert_eq!(MediaState::from_raw(3), MediaState::Playing);
        assert_eq!(MediaState::from_raw(4), MediaState::Paused);
        assert_eq!(MediaState::from_raw(6), MediaState::Ended);
        assert_eq!(MediaState::from_raw(42), MediaState::Idle);
    }
}
