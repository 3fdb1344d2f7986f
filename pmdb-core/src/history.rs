//! Resume Positions
//!
//! Playback positions live in the Pegasus Frontend theme database so the
//! launcher can show "continue watching" progress:
//!
//! ```json
//! { "<media name>": { "x-lastPosition": 42000 } }
//! ```
//!
//! The file is shared with the theme, so unknown entries and fields are kept
//! when writing. Every failure is logged and treated as "no saved position".

use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Field holding the position in milliseconds
pub const POSITION_FIELD: &str = "x-lastPosition";

const THEME_NAME: &str = "PMDB-Theme";
const DATABASE_FILE: &str = "database.json";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database I/O failed for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Database is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Database root is not a JSON object")]
    NotAnObject,
}

// ============================================================================
// Launcher directory discovery
// ============================================================================

/// Candidate Pegasus config directories, in priority order
fn config_dir_candidates() -> Vec<PathBuf> {
    let mut candidates = Vec::new();
    let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));

    if cfg!(target_os = "linux") {
        candidates.push(home.join(".config").join("pegasus-frontend"));
        candidates.push(home.join(".local").join("share").join("pegasus-frontend"));
        candidates.push(PathBuf::from("/etc/xdg/pegasus-frontend"));
        candidates.push(PathBuf::from("/usr/local/share/pegasus-frontend"));
        candidates.push(PathBuf::from("/usr/share/pegasus-frontend"));
        candidates.push(
            home.join(".var")
                .join("app")
                .join("org.pegasus_frontend.Pegasus")
                .join("config")
                .join("pegasus-frontend"),
        );
    } else if cfg!(target_os = "windows") {
        let local = dirs::data_local_dir().unwrap_or_else(|| home.join("AppData").join("Local"));
        candidates.push(local.join("pegasus-frontend"));
        candidates.push(PathBuf::from("C:\\ProgramData\\pegasus-frontend"));
        candidates.push(home.join("scoop").join("apps").join("pegasus").join("current").join("config"));
    } else if cfg!(target_os = "macos") {
        candidates.push(home.join("Library").join("Preferences").join("pegasus-frontend"));
        candidates.push(home.join("Library").join("Application Support").join("pegasus-frontend"));
        candidates.push(PathBuf::from("/Library/Application Support/pegasus-frontend"));
    }

    // Portable installs keep the config next to the executable
    if let Some(exe_dir) = std::env::current_exe().ok().and_then(|p| p.parent().map(Path::to_path_buf)) {
        candidates.push(exe_dir.join("config"));
        candidates.push(exe_dir);
    }

    candidates
}

fn default_config_dir() -> PathBuf {
    let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
    if cfg!(target_os = "windows") {
        dirs::data_local_dir()
            .unwrap_or_else(|| home.join("AppData").join("Local"))
            .join("pegasus-frontend")
    } else if cfg!(target_os = "macos") {
        home.join("Library").join("Preferences").join("pegasus-frontend")
    } else {
        home.join(".config").join("pegasus-frontend")
    }
}

/// First existing Pegasus config directory, or the platform default
pub fn find_pegasus_config_dir() -> PathBuf {
    config_dir_candidates()
        .into_iter()
        .find(|p| p.is_dir())
        .unwrap_or_else(default_config_dir)
}

/// Locate the PMDB theme directory under a Pegasus config directory
pub fn find_theme_dir(config_dir: &Path) -> PathBuf {
    let mut locations = vec![config_dir.join("themes")];
    if let Some(parent) = config_dir.parent() {
        locations.push(parent.join("themes"));
    }
    locations.push(PathBuf::from("/usr/share/pegasus-frontend/themes"));
    locations.push(PathBuf::from("/usr/local/share/pegasus-frontend/themes"));

    locations
        .into_iter()
        .map(|l| l.join(THEME_NAME))
        .find(|p| p.is_dir())
        .unwrap_or_else(|| config_dir.join("themes").join(THEME_NAME))
}

/// Default database location
pub fn default_database_path() -> PathBuf {
    find_theme_dir(&find_pegasus_config_dir()).join(DATABASE_FILE)
}

/// Lookup key for a media file: its file name without extension
pub fn media_key(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

// ============================================================================
// Position store
// ============================================================================

#[derive(Debug, Clone)]
pub struct PositionStore {
    path: PathBuf,
}

impl PositionStore {
    /// Store at the discovered launcher location, creating the file if needed
    pub fn open_default() -> Self {
        Self::open(default_database_path())
    }

    /// Store at an explicit path, creating the file if needed
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let store = Self { path: path.into() };
        if let Err(e) = store.ensure_exists() {
            tracing::warn!("Could not prepare position database: {}", e);
        }
        tracing::info!("Position database: {}", store.path.display());
        store
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn ensure_exists(&self) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| StoreError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        if !self.path.exists() {
            self.write(&Map::new())?;
        }
        Ok(())
    }

    fn read(&self) -> Result<Map<String, Value>, StoreError> {
        if !self.path.exists() {
            return Ok(Map::new());
        }
        let content = std::fs::read_to_string(&self.path).map_err(|source| StoreError::Io {
            path: self.path.clone(),
            source,
        })?;
        match serde_json::from_str::<Value>(&content)? {
            Value::Object(map) => Ok(map),
            _ => Err(StoreError::NotAnObject),
        }
    }

    fn write(&self, data: &Map<String, Value>) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| StoreError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        // 4-space indent, same layout the theme writes
        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
        serde::Serialize::serialize(data, &mut ser)?;

        std::fs::write(&self.path, buf).map_err(|source| StoreError::Io {
            path: self.path.clone(),
            source,
        })
    }

    fn try_get(&self, key: &str) -> Result<u64, StoreError> {
        let data = self.read()?;
        Ok(data
            .get(key)
            .and_then(|entry| entry.get(POSITION_FIELD))
            .and_then(parse_position)
            .unwrap_or(0))
    }

    fn try_set(&self, key: &str, position_ms: u64) -> Result<(), StoreError> {
        // A corrupt file is replaced rather than blocking every future save
        let mut data = match self.read() {
            Ok(data) => data,
            Err(StoreError::Io { path, source }) => return Err(StoreError::Io { path, source }),
            Err(e) => {
                tracing::warn!("Discarding unreadable position database: {}", e);
                Map::new()
            }
        };

        let entry = data
            .entry(key.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        if !entry.is_object() {
            *entry = Value::Object(Map::new());
        }
        if let Value::Object(fields) = entry {
            fields.insert(POSITION_FIELD.to_string(), Value::from(position_ms));
        }

        self.write(&data)
    }

    fn try_remove(&self, key: &str) -> Result<bool, StoreError> {
        if !self.path.exists() {
            return Ok(false);
        }
        let mut data = self.read()?;
        if data.remove(key).is_none() {
            return Ok(false);
        }
        self.write(&data)?;
        Ok(true)
    }

    /// Saved position for `key`, 0 when absent or unreadable
    pub fn get(&self, key: &str) -> u64 {
        match self.try_get(key) {
            Ok(position) => position,
            Err(e) => {
                tracing::warn!("Failed to read saved position for {:?}: {}", key, e);
                0
            }
        }
    }

    /// Save a position. Returns false when the save was skipped.
    pub fn set(&self, key: &str, position_ms: u64) -> bool {
        match self.try_set(key, position_ms) {
            Ok(()) => {
                tracing::debug!("Saved position {}ms for {:?}", position_ms, key);
                true
            }
            Err(e) => {
                tracing::warn!("Failed to save position for {:?}: {}", key, e);
                false
            }
        }
    }

    /// Forget the position for `key`. Returns whether an entry was removed.
    pub fn remove(&self, key: &str) -> bool {
        match self.try_remove(key) {
            Ok(removed) => removed,
            Err(e) => {
                tracing::warn!("Failed to remove saved position for {:?}: {}", key, e);
                false
            }
        }
    }
}

/// Accept non-negative integers, and strings made only of digits
fn parse_position(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) if !s.is_empty() && s.chars().all(|c| c.is_ascii_digit()) => s.parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> (tempfile::TempDir, PositionStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = PositionStore::open(dir.path().join("themes").join("PMDB-Theme").join("database.json"));
        (dir, store)
    }

    #[test]
    fn test_open_creates_empty_database() {
        let (_dir, store) = store();
        let content = std::fs::read_to_string(store.path()).unwrap();
        assert_eq!(serde_json::from_str::<Value>(&content).unwrap(), serde_json::json!({}));
    }

    #[test]
    fn test_set_then_get() {
        let (_dir, store) = store();
        assert!(store.set("movie", 42_000));
        assert_eq!(store.get("movie"), 42_000);
        assert_eq!(store.get("other"), 0);

        let content = std::fs::read_to_string(store.path()).unwrap();
        let value: Value = serde_json::from_str(&content).unwrap();
        assert_eq!(value["movie"][POSITION_FIELD], 42_000);
    }

    #[test]
    fn test_remove_unknown_key_is_benign() {
        let (_dir, store) = store();
        store.set("movie", 1000);
        let before = std::fs::read_to_string(store.path()).unwrap();

        assert!(!store.remove("never-saved"));
        assert_eq!(std::fs::read_to_string(store.path()).unwrap(), before);

        assert!(store.remove("movie"));
        assert_eq!(store.get("movie"), 0);
    }

    #[test]
    fn test_corrupt_file_reads_as_empty_and_is_replaced() {
        let (_dir, store) = store();
        std::fs::write(store.path(), "{ not json").unwrap();
        assert_eq!(store.get("movie"), 0);
        assert!(!store.remove("movie"));

        assert!(store.set("movie", 5_000));
        assert_eq!(store.get("movie"), 5_000);
    }

    #[test]
    fn test_set_preserves_other_entries_and_fields() {
        let (_dir, store) = store();
        std::fs::write(
            store.path(),
            r#"{"other": {"x-lastPosition": 7}, "movie": {"x-rating": 5}}"#,
        )
        .unwrap();

        store.set("movie", 9_000);

        let value: Value = serde_json::from_str(&std::fs::read_to_string(store.path()).unwrap()).unwrap();
        assert_eq!(value["other"][POSITION_FIELD], 7);
        assert_eq!(value["movie"]["x-rating"], 5);
        assert_eq!(value["movie"][POSITION_FIELD], 9_000);
    }

    #[test]
    fn test_unparseable_positions_read_as_zero() {
        let (_dir, store) = store();
        std::fs::write(
            store.path(),
            r#"{"a": {"x-lastPosition": "1500"}, "b": {"x-lastPosition": -3}, "c": {"x-lastPosition": "12s"}, "d": 4}"#,
        )
        .unwrap();
        assert_eq!(store.get("a"), 1500);
        assert_eq!(store.get("b"), 0);
        assert_eq!(store.get("c"), 0);
        assert_eq!(store.get("d"), 0);
    }

    #[test]
    fn test_media_key_strips_extension() {
        assert_eq!(media_key(Path::new("/videos/The Movie (1999).mkv")), "The Movie (1999)");
        assert_eq!(media_key(Path::new("clip")), "clip");
    }
}
