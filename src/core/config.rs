//! Configuration management with layered hierarchy
//!
//! Built-in defaults, then the user file, then environment variables. The
//! user file is also where the recent-files list and window geometry are
//! written back.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Longest recent-files list kept
pub const MAX_RECENT_FILES: usize = 4;

/// Env var naming the config file to use instead of the user one
pub const CONFIG_ENV: &str = "PARTSTRACKER_CONFIG";

/// Env var naming the data file to use instead of `current_file`
pub const FILE_ENV: &str = "PARTSTRACKER_FILE";

#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("no config directory available on this system")]
    #[diagnostic(
        code(partstracker::config::no_dir),
        help("set PARTSTRACKER_CONFIG to a writable file path")
    )]
    NoConfigDir,

    #[error("failed to serialize config: {0}")]
    #[diagnostic(code(partstracker::config::serialize))]
    Serialize(#[from] serde_yml::Error),

    #[error("failed to write config: {0}")]
    Io(#[from] std::io::Error),
}

/// Main window position and size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowGeometry {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Default for WindowGeometry {
    fn default() -> Self {
        Self {
            x: 100,
            y: 100,
            width: 900,
            height: 600,
        }
    }
}

/// PartsTracker settings
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Most recently used data files, newest first
    pub recent_files: Vec<PathBuf>,

    /// Data file opened at startup
    pub current_file: Option<PathBuf>,

    /// Default directory for new data files
    pub data_dir: Option<PathBuf>,

    /// Default directory for CSV exports
    pub export_dir: Option<PathBuf>,

    pub window: Option<WindowGeometry>,

    /// Where this config was loaded from and is saved to
    #[serde(skip)]
    path: Option<PathBuf>,

    /// Data file named by the environment, never written back
    #[serde(skip)]
    file_override: Option<PathBuf>,
}

impl Config {
    /// Load configuration from all sources, merging in priority order
    pub fn load() -> Self {
        let mut config = match Self::config_path() {
            Some(path) => Self::load_from(&path),
            None => Config::default(),
        };

        if let Ok(file) = std::env::var(FILE_ENV) {
            if !file.is_empty() {
                config.file_override = Some(PathBuf::from(file));
            }
        }

        config
    }

    /// Defaults overlaid with the file at `path`; a missing or unreadable
    /// file leaves the defaults
    pub fn load_from(path: &Path) -> Self {
        let mut config = Config::default();

        if path.exists() {
            match std::fs::read_to_string(path) {
                Ok(contents) => match serde_yml::from_str::<Config>(&contents) {
                    Ok(user) => config.merge(user),
                    Err(e) => tracing::warn!(
                        path = %path.display(),
                        error = %e,
                        "ignoring malformed config"
                    ),
                },
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "cannot read config")
                }
            }
        }

        config.path = Some(path.to_path_buf());
        config
    }

    /// Path of the config file: the env var if set, else the user config dir
    pub fn config_path() -> Option<PathBuf> {
        if let Ok(path) = std::env::var(CONFIG_ENV) {
            if !path.is_empty() {
                return Some(PathBuf::from(path));
            }
        }
        directories::ProjectDirs::from("", "", "partstracker")
            .map(|dirs| dirs.config_dir().join("config.yaml"))
    }

    /// Merge another config into this one (other takes precedence)
    fn merge(&mut self, other: Config) {
        if !other.recent_files.is_empty() {
            self.recent_files = other.recent_files;
        }
        if other.current_file.is_some() {
            self.current_file = other.current_file;
        }
        if other.data_dir.is_some() {
            self.data_dir = other.data_dir;
        }
        if other.export_dir.is_some() {
            self.export_dir = other.export_dir;
        }
        if other.window.is_some() {
            self.window = other.window;
        }
        let mut seen = HashSet::new();
        self.recent_files.retain(|p| seen.insert(p.clone()));
        self.recent_files.truncate(MAX_RECENT_FILES);
    }

    /// Write the config back to where it was loaded from
    pub fn save(&self) -> Result<(), ConfigError> {
        let path = match &self.path {
            Some(path) => path.clone(),
            None => Self::config_path().ok_or(ConfigError::NoConfigDir)?,
        };
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let yaml = serde_yml::to_string(self)?;
        std::fs::write(&path, yaml)?;
        tracing::debug!(path = %path.display(), "saved config");
        Ok(())
    }

    /// Data file to use: the env override, else the last one opened
    pub fn current_file(&self) -> Option<&Path> {
        self.file_override
            .as_deref()
            .or(self.current_file.as_deref())
    }

    /// Put `path` at the top of the recent list
    pub fn add_recent_file(&mut self, path: &Path) {
        self.recent_files.retain(|p| p != path);
        self.recent_files.insert(0, path.to_path_buf());
        self.recent_files.truncate(MAX_RECENT_FILES);
    }

    pub fn remove_recent_file(&mut self, path: &Path) {
        self.recent_files.retain(|p| p != path);
    }

    /// Recent file `n`, counted from 1 as on the File menu
    pub fn recent_file(&self, n: usize) -> Option<&Path> {
        n.checked_sub(1)
            .and_then(|i| self.recent_files.get(i))
            .map(PathBuf::as_path)
    }

    /// Window geometry, or the default one
    pub fn window(&self) -> WindowGeometry {
        self.window.unwrap_or_default()
    }

    /// Where a new data file named `name` goes when no directory is given
    pub fn data_file_path(&self, name: &Path) -> PathBuf {
        match (&self.data_dir, name.parent()) {
            (Some(dir), Some(parent)) if parent.as_os_str().is_empty() => dir.join(name),
            _ => name.to_path_buf(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_recent_files_newest_first_without_duplicates() {
        let mut config = Config::default();
        for name in ["a.db", "b.db", "c.db", "a.db"] {
            config.add_recent_file(Path::new(name));
        }
        assert_eq!(
            config.recent_files,
            vec![
                PathBuf::from("a.db"),
                PathBuf::from("c.db"),
                PathBuf::from("b.db")
            ]
        );
        assert_eq!(config.recent_file(1), Some(Path::new("a.db")));
        assert_eq!(config.recent_file(0), None);
        assert_eq!(config.recent_file(4), None);
    }

    #[test]
    fn test_recent_files_capped() {
        let mut config = Config::default();
        for i in 0..6 {
            config.add_recent_file(&PathBuf::from(format!("{}.db", i)));
        }
        assert_eq!(config.recent_files.len(), MAX_RECENT_FILES);
        assert_eq!(config.recent_file(1), Some(Path::new("5.db")));
    }

    #[test]
    fn test_save_and_reload() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("nested").join("config.yaml");

        let mut config = Config::load_from(&path);
        config.add_recent_file(Path::new("/data/parts.db"));
        config.current_file = Some(PathBuf::from("/data/parts.db"));
        config.window = Some(WindowGeometry {
            x: 5,
            y: 6,
            width: 700,
            height: 500,
        });
        config.save().unwrap();

        let loaded = Config::load_from(&path);
        assert_eq!(loaded, config);
        assert_eq!(loaded.current_file(), Some(Path::new("/data/parts.db")));
    }

    #[test]
    fn test_malformed_file_gives_defaults() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.yaml");
        std::fs::write(&path, "recent_files: [unterminated").unwrap();

        let config = Config::load_from(&path);
        assert!(config.recent_files.is_empty());
        assert_eq!(config.window(), WindowGeometry::default());
    }

    #[test]
    fn test_load_drops_repeated_recent_files() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.yaml");
        std::fs::write(&path, "recent_files: [a.db, b.db, a.db]\n").unwrap();

        let config = Config::load_from(&path);
        assert_eq!(
            config.recent_files,
            vec![PathBuf::from("a.db"), PathBuf::from("b.db")]
        );
    }

    #[test]
    fn test_data_file_path_uses_data_dir_for_bare_names() {
        let config = Config {
            data_dir: Some(PathBuf::from("/srv/parts")),
            ..Default::default()
        };
        assert_eq!(
            config.data_file_path(Path::new("car.db")),
            PathBuf::from("/srv/parts/car.db")
        );
        assert_eq!(
            config.data_file_path(Path::new("/tmp/car.db")),
            PathBuf::from("/tmp/car.db")
        );
    }
}
