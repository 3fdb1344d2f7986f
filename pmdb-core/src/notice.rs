//! Transient on-screen notices

use crate::locale::{Language, Text};
use crate::progress::format_clock;
use crate::subtitles::SubtitleTrack;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Playback { playing: bool },
    WindowMode { fullscreen: bool },
    Volume(u8),
    Seeked { forward: bool, position_ms: u64 },
    SubtitlesOff,
    SubtitlesExternal,
    SubtitlesEmbedded(SubtitleTrack),
    SubtitlesUnavailable,
    SubtitleLoadFailed,
    GamepadConnected(String),
    GamepadDisconnected,
    PlaybackFailed,
}

impl Notice {
    /// Success notices are drawn green, the rest red
    pub fn is_success(&self) -> bool {
        !matches!(
            self,
            Notice::SubtitlesOff
                | Notice::SubtitlesUnavailable
                | Notice::SubtitleLoadFailed
                | Notice::GamepadDisconnected
                | Notice::PlaybackFailed
        )
    }

    pub fn render(&self, lang: Language) -> String {
        let t = |key| lang.text(key);
        match self {
            Notice::Playback { playing } => {
                let state = if *playing { Text::Playing } else { Text::Paused };
                format!("{}: {}", t(Text::PlaybackLabel), t(state))
            }
            Notice::WindowMode { fullscreen } => {
                let mode = if *fullscreen { Text::FullscreenMode } else { Text::WindowedMode };
                format!("{}: {}", t(Text::ModeLabel), t(mode))
            }
            Notice::Volume(level) => format!("{}: {}%", t(Text::VolumeLabel), level),
            Notice::Seeked { forward, position_ms } => {
                let verb = if *forward { Text::ForwardedTo } else { Text::RewoundTo };
                format!("{} {}", t(verb), format_clock(*position_ms))
            }
            Notice::SubtitlesOff => t(Text::SubtitlesDisabled).to_string(),
            Notice::SubtitlesExternal => t(Text::SubtitlesExternalOn).to_string(),
            Notice::SubtitlesEmbedded(track) => {
                let name = if track.label.trim().is_empty() {
                    format!("{} {}", t(Text::TrackLabel), track.id)
                } else {
                    track.label.clone()
                };
                format!("{}: {}", t(Text::SubtitlesLabel), name)
            }
            Notice::SubtitlesUnavailable => t(Text::NoSubtitles).to_string(),
            Notice::SubtitleLoadFailed => t(Text::SubtitleLoadFailed).to_string(),
            Notice::GamepadConnected(name) => format!("{}: {}", t(Text::GamepadConnected), name),
            Notice::GamepadDisconnected => t(Text::GamepadDisconnected).to_string(),
            Notice::PlaybackFailed => t(Text::PlaybackFailed).to_string(),
        }
    }
}
