//! Player commands
//!
//! One command set shared by keyboard shortcuts, control-bar clicks and the
//! gamepad, so every input source drives the same code path.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    PlayPause,
    Rewind,
    Forward,
    VolumeUp,
    VolumeDown,
    ToggleMute,
    ToggleFullscreen,
    /// Escape: leave fullscreen, or ask to exit
    ExitFullscreenOrClose,
    ToggleSubtitles,
    CycleSubtitles,
    ShowSubtitleMenu,
    Close,
}

/// Where a command came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandSource {
    Keyboard,
    Pointer,
    Gamepad,
}
