//! # PMDB Core
//!
//! Toolkit-independent half of the PMDB media player: playback control,
//! position persistence for the Pegasus launcher theme, subtitle selection,
//! gamepad input and the libVLC backend.

// ============================================================================
// Media backend
// ============================================================================
pub mod media;
pub mod vlc;
pub mod frame;

// ============================================================================
// Player state
// ============================================================================
pub mod controller;
pub mod subtitles;
pub mod volume;
pub mod fullscreen;
pub mod progress;

// ============================================================================
// Persistence / Configuration
// ============================================================================
pub mod history;
pub mod config;

// ============================================================================
// Input / Threads
// ============================================================================
pub mod command;
pub mod events;
pub mod session;
pub mod gamepad;

// ============================================================================
// UI text
// ============================================================================
pub mod locale;
pub mod notice;

#[cfg(test)]
mod testing;

pub use command::{Command, CommandSource};
pub use config::PlayerConfig;
pub use controller::{ControllerSettings, PlaybackController};
pub use events::{event_queue, EventSender, PlayerEvent};
pub use locale::{Language, Text};
pub use media::{MediaBackend, MediaError};
pub use notice::Notice;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
