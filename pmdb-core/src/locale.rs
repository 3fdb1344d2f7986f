//! UI strings
//!
//! Enum-keyed tables for the two interface languages. Spanish is the default,
//! matching the launcher theme.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    Es,
    En,
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "es" => Ok(Language::Es),
            "en" => Ok(Language::En),
            other => Err(format!("unsupported language '{}' (expected 'es' or 'en')", other)),
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Language::Es => "es",
            Language::En => "en",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Text {
    ConfirmExitTitle,
    ConfirmExitMessage,
    Cancel,
    Exit,
    Loading,
    SelectSubtitle,
    DisableSubtitles,
    Play,
    Pause,
    Close,
    Rewind,
    Forward,
    Volume,
    Mute,
    Fullscreen,
    NoFullscreen,
    SubtitleOn,
    SubtitleOff,
    EmbeddedSub,
    // Notices
    PlaybackLabel,
    Playing,
    Paused,
    ModeLabel,
    FullscreenMode,
    WindowedMode,
    VolumeLabel,
    ForwardedTo,
    RewoundTo,
    SubtitlesLabel,
    SubtitlesDisabled,
    SubtitlesExternalOn,
    TrackLabel,
    NoSubtitles,
    SubtitleLoadFailed,
    GamepadConnected,
    GamepadDisconnected,
    PlaybackFailed,
}

impl Language {
    pub fn text(self, key: Text) -> &'static str {
        match self {
            Language::Es => spanish(key),
            Language::En => english(key),
        }
    }

    pub fn window_title(self, media_name: &str) -> String {
        format!("PMDB Media Player - {}", media_name)
    }
}

fn spanish(key: Text) -> &'static str {
    match key {
        Text::ConfirmExitTitle => "Confirmar salida",
        Text::ConfirmExitMessage => {
            "¿Estás seguro que quieres salir del reproductor?\nSe guardará la posición actual."
        }
        Text::Cancel => "Cancelar",
        Text::Exit => "Salir",
        Text::Loading => "Cargando...",
        Text::SelectSubtitle => "Seleccionar subtítulo",
        Text::DisableSubtitles => "Desactivar subtítulos",
        Text::Play => "Reproducir",
        Text::Pause => "Pausar",
        Text::Close => "Cerrar",
        Text::Rewind => "⏪ -10s",
        Text::Forward => "+10s ⏩",
        Text::Volume => "🔊",
        Text::Mute => "🔇",
        Text::Fullscreen => "⛶",
        Text::NoFullscreen => "🔍",
        Text::SubtitleOn => "Subtítulos: ON",
        Text::SubtitleOff => "Subtítulos: OFF",
        Text::EmbeddedSub => "Subtítulos embebidos",
        Text::PlaybackLabel => "Reproducción",
        Text::Playing => "REPRODUCIENDO",
        Text::Paused => "PAUSADO",
        Text::ModeLabel => "Modo",
        Text::FullscreenMode => "Pantalla Completa",
        Text::WindowedMode => "Ventana",
        Text::VolumeLabel => "Volumen",
        Text::ForwardedTo => "Adelantado a",
        Text::RewoundTo => "Retrocedido a",
        Text::SubtitlesLabel => "Subtítulos",
        Text::SubtitlesDisabled => "Subtítulos: DESACTIVADOS",
        Text::SubtitlesExternalOn => "Subtítulos: Externos ACTIVADOS",
        Text::TrackLabel => "Pista",
        Text::NoSubtitles => "No hay subtítulos disponibles",
        Text::SubtitleLoadFailed => "Subtítulos: Error activando externos",
        Text::GamepadConnected => "Gamepad conectado",
        Text::GamepadDisconnected => "Gamepad desconectado",
        Text::PlaybackFailed => "Error de reproducción",
    }
}

fn english(key: Text) -> &'static str {
    match key {
        Text::ConfirmExitTitle => "Confirm exit",
        Text::ConfirmExitMessage => {
            "Are you sure you want to exit the player?\nCurrent position will be saved."
        }
        Text::Cancel => "Cancel",
        Text::Exit => "Exit",
        Text::Loading => "Loading...",
        Text::SelectSubtitle => "Select subtitle",
        Text::DisableSubtitles => "Disable subtitles",
        Text::Play => "Play",
        Text::Pause => "Pause",
        Text::Close => "Close",
        Text::Rewind => "⏪ -10s",
        Text::Forward => "+10s ⏩",
        Text::Volume => "🔊",
        Text::Mute => "🔇",
        Text::Fullscreen => "⛶",
        Text::NoFullscreen => "🔍",
        Text::SubtitleOn => "Subtitles: ON",
        Text::SubtitleOff => "Subtitles: OFF",
        Text::EmbeddedSub => "Embedded subtitles",
        Text::PlaybackLabel => "Playback",
        Text::Playing => "PLAYING",
        Text::Paused => "PAUSED",
        Text::ModeLabel => "Mode",
        Text::FullscreenMode => "Fullscreen",
        Text::WindowedMode => "Windowed",
        Text::VolumeLabel => "Volume",
        Text::ForwardedTo => "Forwarded to",
        Text::RewoundTo => "Rewound to",
        Text::SubtitlesLabel => "Subtitles",
        Text::SubtitlesDisabled => "Subtitles: OFF",
        Text::SubtitlesExternalOn => "Subtitles: External ON",
        Text::TrackLabel => "Track",
        Text::NoSubtitles => "No subtitles available",
        Text::SubtitleLoadFailed => "Subtitles: could not load external file",
        Text::GamepadConnected => "Gamepad connected",
        Text::GamepadDisconnected => "Gamepad disconnected",
        Text::PlaybackFailed => "Playback error",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_language() {
        assert_eq!("es".parse::<Language>(), Ok(Language::Es));
        assert_eq!(" EN ".parse::<Language>(), Ok(Language::En));
        assert!("fr".parse::<Language>().is_err());
        assert_eq!(Language::default(), Language::Es);
    }

    #[test]
    fn test_tables_differ_where_translated() {
        assert_eq!(Language::Es.text(Text::Cancel), "Cancelar");
        assert_eq!(Language::En.text(Text::Cancel), "Cancel");
        assert_eq!(Language::Es.text(Text::Rewind), Language::En.text(Text::Rewind));
        assert_eq!(Language::En.window_title("movie.mkv"), "PMDB Media Player - movie.mkv");
    }
}
