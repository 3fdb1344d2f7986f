//! Subtitle Support
//!
//! Sources:
//! - External sidecar file next to the video (SRT, SUB, ASS, WebVTT)
//! - Embedded tracks reported by the media library
//!
//! Selection is a small state machine over
//! `Disabled -> External -> Embedded(0) -> ... -> Embedded(n-1) -> Disabled`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// SPU id the media library uses for "no subtitle"
pub const SPU_DISABLED: i32 = -1;

/// Longest popup label before truncation
const MENU_LABEL_MAX_CHARS: usize = 30;

// ============================================================================
// Subtitle Types
// ============================================================================

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum SubtitleFormat {
    Srt,
    Sub,
    Ass,
    WebVtt,
}

impl SubtitleFormat {
    /// Sidecar formats in lookup preference order
    pub const SEARCH_ORDER: [SubtitleFormat; 4] = [
        SubtitleFormat::Srt,
        SubtitleFormat::Sub,
        SubtitleFormat::Ass,
        SubtitleFormat::WebVtt,
    ];

    pub fn extension(self) -> &'static str {
        match self {
            SubtitleFormat::Srt => "srt",
            SubtitleFormat::Sub => "sub",
            SubtitleFormat::Ass => "ass",
            SubtitleFormat::WebVtt => "vtt",
        }
    }
}

/// An embedded subtitle track as reported by the media library
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SubtitleTrack {
    pub id: i32,
    pub label: String,
}

impl SubtitleTrack {
    pub fn new(id: i32, label: impl Into<String>) -> Self {
        Self {
            id,
            label: label.into(),
        }
    }

    /// Text shown in the selection popup
    pub fn menu_label(&self) -> String {
        let text = format!("Track {}: {}", self.id, self.label);
        if text.chars().count() > MENU_LABEL_MAX_CHARS {
            let head: String = text.chars().take(MENU_LABEL_MAX_CHARS - 3).collect();
            format!("{}...", head)
        } else {
            text
        }
    }
}

/// Keep only real tracks (drops the library's "Disable" entry)
pub fn embedded_tracks(reported: Vec<SubtitleTrack>) -> Vec<SubtitleTrack> {
    reported
        .into_iter()
        .filter(|t| t.id != SPU_DISABLED)
        .collect()
}

// ============================================================================
// External file discovery
// ============================================================================

/// Find a sidecar subtitle with the same base name as the video
pub fn find_external_subtitle(video_path: &Path) -> Option<(PathBuf, SubtitleFormat)> {
    SubtitleFormat::SEARCH_ORDER.iter().find_map(|format| {
        let candidate = video_path.with_extension(format.extension());
        candidate.is_file().then_some((candidate, *format))
    })
}

// ============================================================================
// Selection state machine
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubtitleSelection {
    Disabled,
    External,
    /// Index into the detected embedded tracks
    Embedded(usize),
}

/// What the subtitle button should show
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubtitleBadge {
    pub available: bool,
    pub enabled: bool,
}

#[derive(Debug, Clone)]
pub struct SubtitleSelector {
    external: Option<PathBuf>,
    tracks: Vec<SubtitleTrack>,
    selection: SubtitleSelection,
    /// Last embedded track the user had on, by SPU id
    remembered_embedded: Option<i32>,
}

impl SubtitleSelector {
    pub fn new(external: Option<PathBuf>) -> Self {
        Self {
            external,
            tracks: Vec::new(),
            selection: SubtitleSelection::Disabled,
            remembered_embedded: None,
        }
    }

    pub fn external(&self) -> Option<&Path> {
        self.external.as_deref()
    }

    pub fn tracks(&self) -> &[SubtitleTrack] {
        &self.tracks
    }

    pub fn selection(&self) -> SubtitleSelection {
        self.selection
    }

    /// Replace the embedded track list (one snapshot per media open)
    pub fn set_tracks(&mut self, tracks: Vec<SubtitleTrack>) {
        self.tracks = tracks;
        if let SubtitleSelection::Embedded(index) = self.selection {
            if index >= self.tracks.len() {
                self.selection = SubtitleSelection::Disabled;
            }
        }
        if let Some(id) = self.remembered_embedded {
            if self.index_of(id).is_none() {
                self.remembered_embedded = None;
            }
        }
    }

    pub fn has_any_source(&self) -> bool {
        self.external.is_some() || !self.tracks.is_empty()
    }

    pub fn badge(&self) -> SubtitleBadge {
        SubtitleBadge {
            available: self.has_any_source(),
            enabled: self.selection != SubtitleSelection::Disabled,
        }
    }

    pub fn index_of(&self, id: i32) -> Option<usize> {
        self.tracks.iter().position(|t| t.id == id)
    }

    pub fn track(&self, index: usize) -> Option<&SubtitleTrack> {
        self.tracks.get(index)
    }

    pub fn remembered_embedded_index(&self) -> Option<usize> {
        self.remembered_embedded.and_then(|id| self.index_of(id))
    }

    /// Next state for the cycle action, `None` when no subtitle source exists
    pub fn next_in_cycle(&self) -> Option<SubtitleSelection> {
        if !self.has_any_source() {
            return None;
        }
        let has_embedded = !self.tracks.is_empty();
        let next = match self.selection {
            SubtitleSelection::Disabled => {
                if self.external.is_some() {
                    SubtitleSelection::External
                } else {
                    SubtitleSelection::Embedded(0)
                }
            }
            SubtitleSelection::External => {
                if has_embedded {
                    SubtitleSelection::Embedded(0)
                } else {
                    SubtitleSelection::Disabled
                }
            }
            SubtitleSelection::Embedded(index) => {
                if index + 1 < self.tracks.len() {
                    SubtitleSelection::Embedded(index + 1)
                } else {
                    SubtitleSelection::Disabled
                }
            }
        };
        Some(next)
    }

    /// Next state for the on/off button, `None` when nothing can be turned on.
    ///
    /// Turning on prefers the external file, then the remembered embedded
    /// track, then the first embedded track.
    pub fn toggle_target(&self) -> Option<SubtitleSelection> {
        if self.selection != SubtitleSelection::Disabled {
            return Some(SubtitleSelection::Disabled);
        }
        if self.external.is_some() {
            return Some(SubtitleSelection::External);
        }
        if let Some(index) = self.remembered_embedded_index() {
            return Some(SubtitleSelection::Embedded(index));
        }
        (!self.tracks.is_empty()).then_some(SubtitleSelection::Embedded(0))
    }

    /// State for a popup pick by SPU id
    pub fn selection_for_id(&self, id: i32) -> Option<SubtitleSelection> {
        if id == SPU_DISABLED {
            return Some(SubtitleSelection::Disabled);
        }
        self.index_of(id).map(SubtitleSelection::Embedded)
    }

    /// Record a selection the media library accepted
    pub fn set_selection(&mut self, selection: SubtitleSelection) {
        if let SubtitleSelection::Embedded(index) = selection {
            if let Some(track) = self.tracks.get(index) {
                self.remembered_embedded = Some(track.id);
            }
        }
        self.selection = selection;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tracks() -> Vec<SubtitleTrack> {
        vec![
            SubtitleTrack::new(2, "English"),
            SubtitleTrack::new(3, "Español"),
            SubtitleTrack::new(5, "Français"),
        ]
    }

    #[test]
    fn test_cycle_without_sources_is_unavailable() {
        let selector = SubtitleSelector::new(None);
        assert_eq!(selector.next_in_cycle(), None);
        assert_eq!(selector.toggle_target(), None);
        assert_eq!(selector.selection(), SubtitleSelection::Disabled);
        assert!(!selector.badge().available);
    }

    #[test]
    fn test_cycle_walks_embedded_then_wraps() {
        let mut selector = SubtitleSelector::new(None);
        selector.set_tracks(tracks());

        let mut visited = Vec::new();
        for _ in 0..4 {
            let next = selector.next_in_cycle().unwrap();
            selector.set_selection(next);
            visited.push(next);
        }
        assert_eq!(
            visited,
            vec![
                SubtitleSelection::Embedded(0),
                SubtitleSelection::Embedded(1),
                SubtitleSelection::Embedded(2),
                SubtitleSelection::Disabled,
            ]
        );
    }

    #[test]
    fn test_cycle_external_first() {
        let mut selector = SubtitleSelector::new(Some(PathBuf::from("/m/movie.srt")));
        assert_eq!(selector.next_in_cycle(), Some(SubtitleSelection::External));
        selector.set_selection(SubtitleSelection::External);
        // No embedded tracks: back to disabled
        assert_eq!(selector.next_in_cycle(), Some(SubtitleSelection::Disabled));

        selector.set_tracks(tracks());
        assert_eq!(selector.next_in_cycle(), Some(SubtitleSelection::Embedded(0)));
    }

    #[test]
    fn test_toggle_prefers_remembered_track() {
        let mut selector = SubtitleSelector::new(None);
        selector.set_tracks(tracks());
        assert_eq!(selector.toggle_target(), Some(SubtitleSelection::Embedded(0)));

        selector.set_selection(SubtitleSelection::Embedded(2));
        assert_eq!(selector.toggle_target(), Some(SubtitleSelection::Disabled));
        selector.set_selection(SubtitleSelection::Disabled);

        assert_eq!(selector.toggle_target(), Some(SubtitleSelection::Embedded(2)));
        assert!(selector.badge().available);
        assert!(!selector.badge().enabled);
    }

    #[test]
    fn test_selection_for_id() {
        let mut selector = SubtitleSelector::new(None);
        selector.set_tracks(tracks());
        assert_eq!(selector.selection_for_id(SPU_DISABLED), Some(SubtitleSelection::Disabled));
        assert_eq!(selector.selection_for_id(3), Some(SubtitleSelection::Embedded(1)));
        assert_eq!(selector.selection_for_id(99), None);
    }

    #[test]
    fn test_new_track_list_drops_stale_selection() {
        let mut selector = SubtitleSelector::new(None);
        selector.set_tracks(tracks());
        selector.set_selection(SubtitleSelection::Embedded(2));
        selector.set_tracks(vec![SubtitleTrack::new(7, "Deutsch")]);
        assert_eq!(selector.selection(), SubtitleSelection::Disabled);
        assert_eq!(selector.remembered_embedded_index(), None);
    }

    #[test]
    fn test_embedded_tracks_filters_disable_entry() {
        let reported = vec![SubtitleTrack::new(SPU_DISABLED, "Disable"), SubtitleTrack::new(2, "Track 1")];
        let filtered = embedded_tracks(reported);
        assert_eq!(filtered, vec![SubtitleTrack::new(2, "Track 1")]);
    }

    #[test]
    fn test_menu_label_truncation() {
        assert_eq!(SubtitleTrack::new(2, "English").menu_label(), "Track 2: English");

        let long = SubtitleTrack::new(12, "English (SDH) - Commentary by the director");
        let label = long.menu_label();
        assert_eq!(label.chars().count(), 30);
        assert!(label.ends_with("..."));
        assert!(label.starts_with("Track 12: English (SDH)"));
    }

    #[test]
    fn test_find_external_subtitle_order() {
        let dir = tempfile::tempdir().unwrap();
        let video = dir.path().join("movie.mkv");
        std::fs::write(&video, b"").unwrap();
        assert!(find_external_subtitle(&video).is_none());

        std::fs::write(dir.path().join("movie.vtt"), b"WEBVTT").unwrap();
        std::fs::write(dir.path().join("movie.ass"), b"").unwrap();
        let (path, format) = find_external_subtitle(&video).unwrap();
        assert_eq!(format, SubtitleFormat::Ass);
        assert_eq!(path, dir.path().join("movie.ass"));

        std::fs::write(dir.path().join("movie.srt"), b"1").unwrap();
        let (_, format) = find_external_subtitle(&video).unwrap();
        assert_eq!(format, SubtitleFormat::Srt);
    }
}
