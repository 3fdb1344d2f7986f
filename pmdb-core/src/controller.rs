//! Playback Controller
//!
//! Owns the transient player state (play flag, volume, subtitle selection,
//! fullscreen) and is the only place that drives the media backend and the
//! position store. Runs on the UI thread; workers reach it through
//! `PlayerEvent`s.
//!
//! Library failures never propagate out of here: they are logged, and where
//! the user should know, surfaced as a [`Notice`].

use std::collections::VecDeque;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::config::PlayerConfig;
use crate::fullscreen::FullscreenState;
use crate::history::{media_key, PositionStore};
use crate::media::MediaBackend;
use crate::notice::Notice;
use crate::progress::seek_target;
use crate::subtitles::{
    embedded_tracks, find_external_subtitle, SubtitleBadge, SubtitleSelection, SubtitleSelector,
    SubtitleTrack, SPU_DISABLED,
};
use crate::volume::VolumeState;

// ============================================================================
// Settings
// ============================================================================

#[derive(Debug, Clone, Copy)]
pub struct ControllerSettings {
    pub initial_volume: u8,
    pub volume_step: u8,
    pub seek_step_ms: u64,
    pub save_delay: Duration,
    pub controls_hide_after: Duration,
}

impl Default for ControllerSettings {
    fn default() -> Self {
        Self::from(&PlayerConfig::default())
    }
}

impl From<&PlayerConfig> for ControllerSettings {
    fn from(config: &PlayerConfig) -> Self {
        Self {
            initial_volume: config.initial_volume,
            volume_step: config.volume_step,
            seek_step_ms: config.seek_step_ms,
            save_delay: config.save_delay(),
            controls_hide_after: config.controls_hide_after(),
        }
    }
}

// ============================================================================
// Controller
// ============================================================================

pub struct PlaybackController<B: MediaBackend> {
    backend: Arc<B>,
    store: PositionStore,
    media_key: String,
    settings: ControllerSettings,

    subtitles: SubtitleSelector,
    volume: VolumeState,
    fullscreen: FullscreenState,

    playing: bool,
    ended: bool,
    duration_ms: u64,
    position_ms: u64,
    pending_save: Option<Instant>,

    running: Arc<AtomicBool>,
    notices: VecDeque<Notice>,
}

impl<B: MediaBackend> PlaybackController<B> {
    pub fn new(
        backend: Arc<B>,
        store: PositionStore,
        media_path: &Path,
        settings: ControllerSettings,
        now: Instant,
    ) -> Self {
        let external = find_external_subtitle(media_path).map(|(path, format)| {
            tracing::info!("External subtitle found: {} ({:?})", path.display(), format);
            path
        });

        let volume = VolumeState::new(settings.initial_volume);
        if let Err(e) = backend.set_volume(volume.level()) {
            tracing::warn!("Failed to set initial volume: {}", e);
        }

        Self {
            backend,
            store,
            media_key: media_key(media_path),
            settings,
            subtitles: SubtitleSelector::new(external),
            volume,
            fullscreen: FullscreenState::new(settings.controls_hide_after, now),
            playing: false,
            ended: false,
            duration_ms: 0,
            position_ms: 0,
            pending_save: None,
            running: Arc::new(AtomicBool::new(true)),
            notices: VecDeque::new(),
        }
    }

    /// Flag shared with the worker threads; cleared by `close`
    pub fn running(&self) -> Arc<AtomicBool> {
        self.running.clone()
    }

    pub fn backend(&self) -> &Arc<B> {
        &self.backend
    }

    // ------------------------------------------------------------------------
    // Lifecycle events
    // ------------------------------------------------------------------------

    pub fn on_started(&mut self) {
        self.playing = true;
        self.ended = false;
    }

    pub fn on_media_ready(&mut self, duration_ms: u64) {
        self.duration_ms = duration_ms;
        tracing::info!("Media ready, duration {}ms", duration_ms);

        // The library may auto-select a track; keep the "off" state honest
        if self.subtitles.selection() == SubtitleSelection::Disabled
            && self.backend.current_subtitle() != SPU_DISABLED
        {
            if let Err(e) = self.backend.set_subtitle(SPU_DISABLED) {
                tracing::warn!("Failed to disable auto-selected subtitle: {}", e);
            }
        }

        let saved = self.store.get(&self.media_key);
        if saved > 0 && (duration_ms == 0 || saved < duration_ms) {
            tracing::info!("Resuming {:?} at {}ms", self.media_key, saved);
            self.backend.set_time_ms(saved);
            self.position_ms = saved;
        }
    }

    pub fn on_subtitles_detected(&mut self, reported: Vec<SubtitleTrack>) {
        let tracks = embedded_tracks(reported);
        tracing::info!("{} embedded subtitle track(s)", tracks.len());
        self.subtitles.set_tracks(tracks);
    }

    /// Natural end: the next run starts from the beginning
    pub fn on_media_ended(&mut self) {
        tracing::info!("Playback of {:?} ended", self.media_key);
        self.ended = true;
        self.playing = false;
        self.pending_save = None;
        self.store.remove(&self.media_key);
    }

    /// The library gave up on the media; nothing will advance from here
    pub fn on_media_failed(&mut self) {
        tracing::error!("Playback of {:?} failed", self.media_key);
        self.pending_save = None;
        if self.playing {
            self.save_position();
        }
        self.playing = false;
        self.notify(Notice::PlaybackFailed);
    }

    // ------------------------------------------------------------------------
    // Transport
    // ------------------------------------------------------------------------

    /// Returns whether the media is now playing
    pub fn toggle_play_pause(&mut self, now: Instant) -> bool {
        if self.playing {
            self.pause();
        } else {
            self.play(now);
        }
        self.playing
    }

    pub fn play(&mut self, now: Instant) {
        if let Err(e) = self.backend.play() {
            tracing::warn!("Play failed: {}", e);
            return;
        }
        self.playing = true;
        self.schedule_save(now);
    }

    pub fn pause(&mut self) {
        self.backend.pause();
        self.playing = false;
        self.save_position();
    }

    /// Seek to a fraction of the duration. Returns the target, or `None`
    /// when the duration is still unknown.
    pub fn seek_fraction(&mut self, fraction: f64, now: Instant) -> Option<u64> {
        let target = seek_target(fraction, self.known_duration())?;
        self.seek_to(target, now);
        Some(target)
    }

    pub fn rewind(&mut self, now: Instant) -> Option<u64> {
        let mut target = self.current_time().saturating_sub(self.settings.seek_step_ms);
        if self.duration_ms > 0 {
            target = target.min(self.duration_ms);
        }
        self.seek_to(target, now);
        Some(target)
    }

    /// Jump ahead; requires a known duration
    pub fn forward(&mut self, now: Instant) -> Option<u64> {
        let duration = self.known_duration();
        if duration == 0 {
            return None;
        }
        let target = (self.current_time() + self.settings.seek_step_ms).min(duration);
        self.seek_to(target, now);
        Some(target)
    }

    fn seek_to(&mut self, target: u64, now: Instant) {
        self.backend.set_time_ms(target);
        self.position_ms = target;
        self.schedule_save(now);
    }

    fn current_time(&self) -> u64 {
        self.backend.time_ms().unwrap_or(self.position_ms)
    }

    /// Cached duration, re-queried while unknown
    fn known_duration(&mut self) -> u64 {
        if self.duration_ms == 0 {
            self.duration_ms = self.backend.duration_ms();
        }
        self.duration_ms
    }

    // ------------------------------------------------------------------------
    // Volume
    // ------------------------------------------------------------------------

    pub fn set_volume(&mut self, level: u8) -> u8 {
        let applied = self.volume.set(level);
        self.apply_volume();
        applied
    }

    pub fn step_volume(&mut self, up: bool) -> u8 {
        let step = self.settings.volume_step as i16;
        let applied = self.volume.step(if up { step } else { -step });
        self.apply_volume();
        applied
    }

    pub fn toggle_mute(&mut self) -> u8 {
        let applied = self.volume.toggle_mute();
        self.apply_volume();
        applied
    }

    fn apply_volume(&self) {
        if let Err(e) = self.backend.set_volume(self.volume.level()) {
            tracing::warn!("Failed to set volume: {}", e);
        }
    }

    // ------------------------------------------------------------------------
    // Subtitles
    // ------------------------------------------------------------------------

    /// Control-bar on/off button
    pub fn toggle_subtitles(&mut self) -> bool {
        match self.subtitles.toggle_target() {
            Some(target) => self.apply_subtitle(target),
            None => {
                self.notify(Notice::SubtitlesUnavailable);
                false
            }
        }
    }

    /// Step through disabled, external, then each embedded track
    pub fn cycle_subtitles(&mut self) -> bool {
        match self.subtitles.next_in_cycle() {
            Some(target) => self.apply_subtitle(target),
            None => {
                self.notify(Notice::SubtitlesUnavailable);
                false
            }
        }
    }

    /// Popup pick by SPU id, -1 disables
    pub fn select_subtitle(&mut self, id: i32) -> bool {
        match self.subtitles.selection_for_id(id) {
            Some(target) => self.apply_subtitle(target),
            None => {
                tracing::warn!("Unknown subtitle track {}", id);
                false
            }
        }
    }

    fn apply_subtitle(&mut self, target: SubtitleSelection) -> bool {
        match target {
            SubtitleSelection::Disabled => match self.backend.set_subtitle(SPU_DISABLED) {
                Ok(()) => {
                    self.subtitles.set_selection(SubtitleSelection::Disabled);
                    self.notify(Notice::SubtitlesOff);
                    true
                }
                Err(e) => {
                    tracing::warn!("Failed to disable subtitles: {}", e);
                    false
                }
            },
            SubtitleSelection::External => {
                let Some(path) = self.subtitles.external().map(Path::to_path_buf) else {
                    return false;
                };
                match self.backend.load_subtitle_file(&path) {
                    Ok(()) => {
                        tracing::info!("External subtitles on: {}", path.display());
                        self.subtitles.set_selection(SubtitleSelection::External);
                        self.notify(Notice::SubtitlesExternal);
                        true
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load {}: {}", path.display(), e);
                        match self.subtitles.remembered_embedded_index() {
                            Some(index) => self.apply_subtitle(SubtitleSelection::Embedded(index)),
                            None => {
                                self.notify(Notice::SubtitleLoadFailed);
                                false
                            }
                        }
                    }
                }
            }
            SubtitleSelection::Embedded(index) => {
                let Some(track) = self.subtitles.track(index).cloned() else {
                    return false;
                };
                match self.backend.set_subtitle(track.id) {
                    Ok(()) => {
                        tracing::info!("Subtitle track {} ({}) on", track.id, track.label);
                        self.subtitles.set_selection(target);
                        self.notify(Notice::SubtitlesEmbedded(track));
                        true
                    }
                    Err(e) => {
                        tracing::warn!("Failed to select subtitle track {}: {}", track.id, e);
                        false
                    }
                }
            }
        }
    }

    pub fn subtitle_badge(&self) -> SubtitleBadge {
        self.subtitles.badge()
    }

    pub fn subtitle_selection(&self) -> SubtitleSelection {
        self.subtitles.selection()
    }

    pub fn subtitle_tracks(&self) -> &[SubtitleTrack] {
        self.subtitles.tracks()
    }

    /// SPU id of the active embedded track, -1 otherwise
    pub fn current_embedded_id(&self) -> i32 {
        match self.subtitles.selection() {
            SubtitleSelection::Embedded(index) => {
                self.subtitles.track(index).map(|t| t.id).unwrap_or(SPU_DISABLED)
            }
            _ => SPU_DISABLED,
        }
    }

    // ------------------------------------------------------------------------
    // Fullscreen
    // ------------------------------------------------------------------------

    pub fn toggle_fullscreen(&mut self, now: Instant) -> bool {
        let active = self.fullscreen.toggle(now);
        tracing::debug!("Fullscreen: {}", active);
        active
    }

    pub fn is_fullscreen(&self) -> bool {
        self.fullscreen.is_active()
    }

    pub fn pointer_moved(&mut self, now: Instant) {
        self.fullscreen.pointer_moved(now);
    }

    pub fn controls_visible(&mut self, now: Instant) -> bool {
        self.fullscreen.tick(now)
    }

    // ------------------------------------------------------------------------
    // Housekeeping
    // ------------------------------------------------------------------------

    /// Refresh cached position and duration from the backend
    pub fn refresh(&mut self) {
        if self.ended {
            return;
        }
        if let Some(t) = self.backend.time_ms() {
            self.position_ms = t;
        }
        self.known_duration();
    }

    /// Run due work (delayed position save)
    pub fn tick(&mut self, now: Instant) {
        if let Some(due) = self.pending_save {
            if now >= due {
                self.pending_save = None;
                self.save_position();
            }
        }
    }

    fn schedule_save(&mut self, now: Instant) {
        self.pending_save = Some(now + self.settings.save_delay);
    }

    /// Persist the current position. Returns false when nothing was saved.
    pub fn save_position(&mut self) -> bool {
        if self.ended {
            return false;
        }
        let position = self.current_time();
        if position == 0 {
            return false;
        }
        self.position_ms = position;
        self.store.set(&self.media_key, position)
    }

    /// Save (unless ended), stop the backend and stop the workers
    pub fn close(&mut self) {
        self.pending_save = None;
        if !self.ended {
            self.save_position();
        }
        self.backend.stop();
        self.playing = false;
        self.running.store(false, Ordering::Release);
        tracing::info!("Player closed");
    }

    pub fn notify(&mut self, notice: Notice) {
        self.notices.push_back(notice);
    }

    pub fn take_notices(&mut self) -> Vec<Notice> {
        self.notices.drain(..).collect()
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn is_ended(&self) -> bool {
        self.ended
    }

    pub fn position_ms(&self) -> u64 {
        self.position_ms
    }

    pub fn duration_ms(&self) -> u64 {
        self.duration_ms
    }

    pub fn volume(&self) -> u8 {
        self.volume.level()
    }

    pub fn is_muted(&self) -> bool {
        self.volume.is_muted()
    }

    pub fn media_key(&self) -> &str {
        &self.media_key
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockBackend;

    struct Fixture {
        dir: tempfile::TempDir,
        backend: Arc<MockBackend>,
        store: PositionStore,
    }

    fn fixture(duration_ms: u64, tracks: Vec<SubtitleTrack>) -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("movie.mkv"), b"").unwrap();
        let store = PositionStore::open(dir.path().join("database.json"));
        Fixture {
            dir,
            backend: Arc::new(MockBackend::with_media(duration_ms, tracks)),
            store,
        }
    }

    fn controller(f: &Fixture) -> PlaybackController<MockBackend> {
        PlaybackController::new(
            f.backend.clone(),
            f.store.clone(),
            &f.dir.path().join("movie.mkv"),
            ControllerSettings::default(),
            Instant::now(),
        )
    }

    fn tracks() -> Vec<SubtitleTrack> {
        vec![
            SubtitleTrack::new(SPU_DISABLED, "Disable"),
            SubtitleTrack::new(2, "English"),
            SubtitleTrack::new(3, "Español"),
        ]
    }

    #[test]
    fn test_seek_half_of_duration() {
        let f = fixture(100_000, Vec::new());
        let mut c = controller(&f);
        c.on_started();
        c.on_media_ready(100_000);

        assert_eq!(c.seek_fraction(0.5, Instant::now()), Some(50_000));
        assert_eq!(f.backend.time_ms(), Some(50_000));
        assert_eq!(c.position_ms(), 50_000);
    }

    #[test]
    fn test_seek_without_duration_is_noop() {
        let f = fixture(0, Vec::new());
        let mut c = controller(&f);
        assert_eq!(c.seek_fraction(0.5, Instant::now()), None);
        assert_eq!(c.forward(Instant::now()), None);
        assert_eq!(f.backend.time_ms(), None);
    }

    #[test]
    fn test_rewind_and_forward_clamp() {
        let f = fixture(30_000, Vec::new());
        let mut c = controller(&f);
        c.on_media_ready(30_000);
        f.backend.set_time_ms(4_000);

        assert_eq!(c.rewind(Instant::now()), Some(0));
        f.backend.set_time_ms(25_000);
        assert_eq!(c.forward(Instant::now()), Some(30_000));
    }

    #[test]
    fn test_cycle_without_sources() {
        let f = fixture(100_000, Vec::new());
        let mut c = controller(&f);
        c.on_subtitles_detected(Vec::new());

        assert!(!c.cycle_subtitles());
        assert_eq!(c.subtitle_selection(), SubtitleSelection::Disabled);
        assert_eq!(c.take_notices(), vec![Notice::SubtitlesUnavailable]);
    }

    #[test]
    fn test_cycle_through_embedded() {
        let f = fixture(100_000, tracks());
        let mut c = controller(&f);
        c.on_subtitles_detected(f.backend.subtitle_tracks());

        assert!(c.cycle_subtitles());
        assert_eq!(f.backend.current_subtitle(), 2);
        assert!(c.cycle_subtitles());
        assert_eq!(c.current_embedded_id(), 3);
        assert!(c.cycle_subtitles());
        assert_eq!(c.subtitle_selection(), SubtitleSelection::Disabled);
        assert_eq!(f.backend.current_subtitle(), SPU_DISABLED);
    }

    #[test]
    fn test_external_failure_falls_back_to_remembered_track() {
        let f = fixture(100_000, tracks());
        std::fs::write(f.dir.path().join("movie.srt"), b"1").unwrap();
        let mut c = controller(&f);
        c.on_subtitles_detected(f.backend.subtitle_tracks());

        // Remember track 3, then turn off
        assert!(c.select_subtitle(3));
        assert!(c.toggle_subtitles());
        c.take_notices();

        f.backend.inner.lock().subtitle_file_fails = true;
        assert!(c.toggle_subtitles());
        assert_eq!(c.current_embedded_id(), 3);
        assert_eq!(
            c.take_notices(),
            vec![Notice::SubtitlesEmbedded(SubtitleTrack::new(3, "Español"))]
        );
    }

    #[test]
    fn test_external_failure_without_memory_reports() {
        let f = fixture(100_000, Vec::new());
        std::fs::write(f.dir.path().join("movie.srt"), b"1").unwrap();
        let mut c = controller(&f);
        f.backend.inner.lock().subtitle_file_fails = true;

        assert!(!c.toggle_subtitles());
        assert_eq!(c.subtitle_selection(), SubtitleSelection::Disabled);
        assert_eq!(c.take_notices(), vec![Notice::SubtitleLoadFailed]);
    }

    #[test]
    fn test_external_loads_sidecar() {
        let f = fixture(100_000, Vec::new());
        std::fs::write(f.dir.path().join("movie.srt"), b"1").unwrap();
        let mut c = controller(&f);

        assert!(c.toggle_subtitles());
        assert_eq!(c.subtitle_selection(), SubtitleSelection::External);
        assert_eq!(f.backend.inner.lock().loaded_files, vec![f.dir.path().join("movie.srt")]);
        assert!(c.subtitle_badge().enabled);
    }

    #[test]
    fn test_ready_disables_auto_selected_track() {
        let f = fixture(100_000, tracks());
        f.backend.inner.lock().spu = 2;
        let mut c = controller(&f);
        c.on_media_ready(100_000);
        assert_eq!(f.backend.current_subtitle(), SPU_DISABLED);
    }

    #[test]
    fn test_mute_unmute_restores_volume() {
        let f = fixture(100_000, Vec::new());
        let mut c = controller(&f);
        c.set_volume(64);
        assert_eq!(c.toggle_mute(), 0);
        assert!(c.is_muted());
        assert_eq!(f.backend.inner.lock().volume, 0);
        assert_eq!(c.toggle_mute(), 64);
        assert_eq!(f.backend.inner.lock().volume, 64);
        assert_eq!(c.step_volume(true), 69);
    }

    #[test]
    fn test_pause_saves_immediately_play_saves_later() {
        let f = fixture(100_000, Vec::new());
        let mut c = controller(&f);
        let start = Instant::now();

        c.on_started();
        f.backend.set_time_ms(12_000);
        assert!(!c.toggle_play_pause(start));
        assert_eq!(f.store.get("movie"), 12_000);

        assert!(c.toggle_play_pause(start));
        f.backend.set_time_ms(15_000);
        c.tick(start + Duration::from_millis(100));
        assert_eq!(f.store.get("movie"), 12_000);
        c.tick(start + Duration::from_millis(600));
        assert_eq!(f.store.get("movie"), 15_000);
    }

    #[test]
    fn test_failure_stops_and_reports() {
        let f = fixture(100_000, Vec::new());
        let mut c = controller(&f);
        let start = Instant::now();
        c.on_started();
        c.on_media_ready(100_000);
        f.backend.set_time_ms(20_000);
        c.seek_fraction(0.3, start);

        c.on_media_failed();
        assert!(!c.is_playing());
        assert_eq!(f.store.get("movie"), 30_000);
        assert_eq!(c.take_notices(), vec![Notice::PlaybackFailed]);

        // The pending save from the seek was dropped
        f.backend.set_time_ms(45_000);
        c.tick(start + Duration::from_secs(5));
        assert_eq!(f.store.get("movie"), 30_000);
    }

    #[test]
    fn test_resume_saved_position() {
        let f = fixture(100_000, Vec::new());
        f.store.set("movie", 42_000);
        let mut c = controller(&f);
        c.on_started();
        c.on_media_ready(100_000);
        assert_eq!(f.backend.time_ms(), Some(42_000));
        assert_eq!(c.position_ms(), 42_000);
    }

    #[test]
    fn test_end_removes_position_and_close_keeps_it_removed() {
        let f = fixture(100_000, Vec::new());
        f.store.set("movie", 42_000);
        let mut c = controller(&f);
        let running = c.running();

        c.on_started();
        f.backend.set_time_ms(99_000);
        c.on_media_ended();
        assert_eq!(f.store.get("movie"), 0);

        c.close();
        assert_eq!(f.store.get("movie"), 0);
        assert!(!running.load(Ordering::Acquire));
    }

    #[test]
    fn test_close_saves_position() {
        let f = fixture(100_000, Vec::new());
        let mut c = controller(&f);
        c.on_started();
        f.backend.set_time_ms(7_500);
        c.close();
        assert_eq!(f.store.get("movie"), 7_500);
    }
}
