//! Player configuration
//!
//! Optional JSON file; every field has a default so a partial file only
//! overrides what it names. CLI flags are applied on top by the binary.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::locale::Language;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GamepadConfig {
    pub enabled: bool,
    pub poll_interval_ms: u64,
    pub reconnect_interval_ms: u64,
    pub debounce_ms: u64,
}

impl Default for GamepadConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            poll_interval_ms: 10,
            reconnect_interval_ms: 2000,
            debounce_ms: 200,
        }
    }
}

impl GamepadConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }

    pub fn reconnect_interval(&self) -> Duration {
        Duration::from_millis(self.reconnect_interval_ms.max(1))
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkerConfig {
    pub poll_interval_ms: u64,
    pub ready_timeout_ms: u64,
    pub start_delay_ms: u64,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 100,
            ready_timeout_ms: 5000,
            start_delay_ms: 500,
        }
    }
}

impl WorkerConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }

    pub fn ready_timeout(&self) -> Duration {
        Duration::from_millis(self.ready_timeout_ms)
    }

    pub fn start_delay(&self) -> Duration {
        Duration::from_millis(self.start_delay_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    pub language: Language,
    pub start_fullscreen: bool,
    pub initial_volume: u8,
    pub volume_step: u8,
    pub seek_step_ms: u64,
    pub save_delay_ms: u64,
    pub ui_refresh_ms: u64,
    pub controls_hide_after_ms: u64,
    pub notification_ms: u64,
    /// Overrides the discovered launcher database
    pub database_path: Option<PathBuf>,
    /// Overrides the platform libVLC search
    pub libvlc_path: Option<PathBuf>,
    pub gamepad: GamepadConfig,
    pub worker: WorkerConfig,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            language: Language::Es,
            start_fullscreen: false,
            initial_volume: 50,
            volume_step: 5,
            seek_step_ms: 10_000,
            save_delay_ms: 500,
            ui_refresh_ms: 100,
            controls_hide_after_ms: 3000,
            notification_ms: 3000,
            database_path: None,
            libvlc_path: None,
            gamepad: GamepadConfig::default(),
            worker: WorkerConfig::default(),
        }
    }
}

impl PlayerConfig {
    /// `<config dir>/pmdb-player/config.json`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("pmdb-player").join("config.json"))
    }

    /// Strict load: missing and malformed files are errors
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load `path`, or the default location. Missing file gives defaults,
    /// a malformed one is logged and gives defaults.
    pub fn load(path: Option<&Path>) -> Self {
        let path = match path.map(Path::to_path_buf).or_else(Self::default_path) {
            Some(p) => p,
            None => return Self::default(),
        };
        if !path.exists() {
            tracing::debug!("No config at {}, using defaults", path.display());
            return Self::default();
        }
        match Self::from_file(&path) {
            Ok(config) => {
                tracing::info!("Loaded config from {}", path.display());
                config.sanitized()
            }
            Err(e) => {
                tracing::warn!("{}; using defaults", e);
                Self::default()
            }
        }
    }

    fn sanitized(mut self) -> Self {
        self.initial_volume = self.initial_volume.min(crate::volume::MAX_VOLUME);
        self.volume_step = self.volume_step.clamp(1, crate::volume::MAX_VOLUME);
        self
    }

    pub fn save_delay(&self) -> Duration {
        Duration::from_millis(self.save_delay_ms)
    }

    pub fn ui_refresh(&self) -> Duration {
        Duration::from_millis(self.ui_refresh_ms.max(1))
    }

    pub fn controls_hide_after(&self) -> Duration {
        Duration::from_millis(self.controls_hide_after_ms)
    }

    pub fn notification_duration(&self) -> Duration {
        Duration::from_millis(self.notification_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PlayerConfig::default();
        assert_eq!(config.language, Language::Es);
        assert_eq!(config.initial_volume, 50);
        assert_eq!(config.seek_step_ms, 10_000);
        assert_eq!(config.gamepad.debounce(), Duration::from_millis(200));
        assert_eq!(config.worker.ready_timeout(), Duration::from_secs(5));
    }

    #[test]
    fn test_partial_override() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(
            &path,
            r#"{"language": "en", "initial_volume": 180, "gamepad": {"enabled": false}}"#,
        )
        .unwrap();

        let config = PlayerConfig::load(Some(&path));
        assert_eq!(config.language, Language::En);
        assert_eq!(config.initial_volume, 100);
        assert!(!config.gamepad.enabled);
        assert_eq!(config.gamepad.debounce_ms, 200);
        assert_eq!(config.save_delay_ms, 500);
    }

    #[test]
    fn test_missing_and_malformed_fall_back() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.json");
        assert_eq!(PlayerConfig::load(Some(&missing)), PlayerConfig::default());

        let broken = dir.path().join("broken.json");
        std::fs::write(&broken, "{ language: ").unwrap();
        assert!(matches!(
            PlayerConfig::from_file(&broken),
            Err(ConfigError::Parse { .. })
        ));
        assert_eq!(PlayerConfig::load(Some(&broken)), PlayerConfig::default());
    }
}
