//! In-memory `MediaBackend` for unit tests

use parking_lot::Mutex;
use std::path::{Path, PathBuf};

use crate::media::{MediaBackend, MediaError, MediaState};
use crate::subtitles::{SubtitleTrack, SPU_DISABLED};

#[derive(Debug)]
pub(crate) struct MockState {
    pub state: MediaState,
    pub time_ms: Option<u64>,
    pub duration_ms: u64,
    pub volume: u8,
    pub tracks: Vec<SubtitleTrack>,
    pub spu: i32,
    pub subtitle_file_fails: bool,
    pub loaded_files: Vec<PathBuf>,
    pub native_aspect: bool,
    pub play_calls: usize,
    pub play_fails: bool,
}

impl Default for MockState {
    fn default() -> Self {
        Self {
            state: MediaState::Idle,
            time_ms: None,
            duration_ms: 0,
            volume: 100,
            tracks: Vec::new(),
            spu: SPU_DISABLED,
            subtitle_file_fails: false,
            loaded_files: Vec::new(),
            native_aspect: false,
            play_calls: 0,
            play_fails: false,
        }
    }
}

#[derive(Debug, Default)]
pub(crate) struct MockBackend {
    pub inner: Mutex<MockState>,
}

impl MockBackend {
    pub fn with_media(duration_ms: u64, tracks: Vec<SubtitleTrack>) -> Self {
        let backend = Self::default();
        {
            let mut s = backend.inner.lock();
            s.duration_ms = duration_ms;
            s.tracks = tracks;
        }
        backend
    }
}

impl MediaBackend for MockBackend {
    fn play(&self) -> Result<(), MediaError> {
        let mut s = self.inner.lock();
        s.play_calls += 1;
        if s.play_fails {
            return Err(MediaError::CallFailed("play"));
        }
        s.state = MediaState::Playing;
        s.time_ms.get_or_insert(0);
        Ok(())
    }

    fn pause(&self) {
        self.inner.lock().state = MediaState::Paused;
    }

    fn stop(&self) {
        let mut s = self.inner.lock();
        s.state = MediaState::Stopped;
        s.time_ms = None;
    }

    fn state(&self) -> MediaState {
        self.inner.lock().state
    }

    fn time_ms(&self) -> Option<u64> {
        self.inner.lock().time_ms
    }

    fn set_time_ms(&self, ms: u64) {
        self.inner.lock().time_ms = Some(ms);
    }

    fn duration_ms(&self) -> u64 {
        self.inner.lock().duration_ms
    }

    fn set_volume(&self, volume: u8) -> Result<(), MediaError> {
        self.inner.lock().volume = volume;
        Ok(())
    }

    fn subtitle_tracks(&self) -> Vec<SubtitleTrack> {
        let s = self.inner.lock();
        if s.tracks.is_empty() {
            return Vec::new();
        }
        let mut reported = vec![SubtitleTrack::new(SPU_DISABLED, "Disable")];
        reported.extend(s.tracks.iter().cloned());
        reported
    }

    fn current_subtitle(&self) -> i32 {
        self.inner.lock().spu
    }

    fn set_subtitle(&self, id: i32) -> Result<(), MediaError> {
        let mut s = self.inner.lock();
        if id != SPU_DISABLED && !s.tracks.iter().any(|t| t.id == id) {
            return Err(MediaError::CallFailed("set_subtitle"));
        }
        s.spu = id;
        Ok(())
    }

    fn load_subtitle_file(&self, path: &Path) -> Result<(), MediaError> {
        let mut s = self.inner.lock();
        if s.subtitle_file_fails {
            return Err(MediaError::CallFailed("load_subtitle_file"));
        }
        s.loaded_files.push(path.to_path_buf());
        Ok(())
    }

    fn use_native_aspect(&self) {
        self.inner.lock().native_aspect = true;
    }
}
