//! The open data file and the File menu actions
//!
//! A workspace owns at most one [`Store`]. Opening or creating a file
//! records it in the config's recent list and makes it the current file.

use std::path::{Path, PathBuf};

use crate::core::config::Config;
use crate::core::store::{Store, StoreError};

#[derive(Debug, Default)]
pub struct Workspace {
    store: Option<Store>,
}

impl Workspace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open the file named on the command line, else the config's current file
    pub fn from_config(config: &Config, file: Option<&Path>) -> Result<Self, StoreError> {
        let mut workspace = Self::new();
        if let Some(path) = file.or(config.current_file()) {
            workspace.store = Some(Store::open(path)?);
        }
        Ok(workspace)
    }

    /// Create a new data file and make it current
    pub fn new_file(&mut self, config: &mut Config, path: &Path) -> Result<&Store, StoreError> {
        let path = config.data_file_path(path);
        let store = Store::create(&path)?;
        self.remember(config, &path);
        Ok(self.store.insert(store))
    }

    /// Open an existing data file and make it current
    pub fn open_file(&mut self, config: &mut Config, path: &Path) -> Result<&Store, StoreError> {
        let store = match Store::open(path) {
            Ok(store) => store,
            Err(e @ StoreError::FileMissing(_)) => {
                config.remove_recent_file(path);
                return Err(e);
            }
            Err(e) => return Err(e),
        };
        self.remember(config, path);
        Ok(self.store.insert(store))
    }

    /// Open recent file `n` (from 1)
    pub fn open_recent(&mut self, config: &mut Config, n: usize) -> Result<&Store, StoreError> {
        let path = config
            .recent_file(n)
            .map(Path::to_path_buf)
            .ok_or(StoreError::NotFound {
                kind: "recent file",
                key: n.to_string(),
            })?;
        self.open_file(config, &path)
    }

    /// Close the data file; the next start opens nothing
    pub fn close(&mut self, config: &mut Config) -> Option<PathBuf> {
        let closed = self.path();
        self.store = None;
        config.current_file = None;
        if let Some(path) = &closed {
            tracing::info!(path = %path.display(), "closed data file");
        }
        closed
    }

    pub fn is_open(&self) -> bool {
        self.store.is_some()
    }

    pub fn store(&self) -> Result<&Store, StoreError> {
        self.store.as_ref().ok_or(StoreError::NoFileOpen)
    }

    pub fn path(&self) -> Option<PathBuf> {
        self.store
            .as_ref()
            .and_then(|s| s.path())
            .map(Path::to_path_buf)
    }

    fn remember(&self, config: &mut Config, path: &Path) {
        let path = std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
        config.add_recent_file(&path);
        config.current_file = Some(path);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_no_file_open() {
        let workspace = Workspace::new();
        assert!(!workspace.is_open());
        assert!(matches!(workspace.store(), Err(StoreError::NoFileOpen)));
    }

    #[test]
    fn test_new_open_close_tracks_recent_files() {
        let tmp = TempDir::new().unwrap();
        let mut config = Config::load_from(&tmp.path().join("config.yaml"));
        let mut workspace = Workspace::new();

        let first = tmp.path().join("first.db");
        let second = tmp.path().join("second.db");
        workspace.new_file(&mut config, &first).unwrap();
        workspace.new_file(&mut config, &second).unwrap();
        assert!(workspace.is_open());
        assert_eq!(config.recent_files.len(), 2);
        assert!(config.recent_files[0].ends_with("second.db"));

        assert!(matches!(
            workspace.new_file(&mut config, &first),
            Err(StoreError::FileExists(_))
        ));

        workspace.open_recent(&mut config, 2).unwrap();
        assert!(config.recent_files[0].ends_with("first.db"));
        assert!(config.current_file().unwrap().ends_with("first.db"));

        let closed = workspace.close(&mut config).unwrap();
        assert!(closed.ends_with("first.db"));
        assert!(config.current_file().is_none());
        assert!(workspace.store().is_err());
    }

    #[test]
    fn test_open_missing_file_drops_it_from_recent() {
        let tmp = TempDir::new().unwrap();
        let mut config = Config::load_from(&tmp.path().join("config.yaml"));
        let gone = tmp.path().join("gone.db");
        config.add_recent_file(&gone);

        let mut workspace = Workspace::new();
        assert!(matches!(
            workspace.open_file(&mut config, &gone),
            Err(StoreError::FileMissing(_))
        ));
        assert!(config.recent_files.is_empty());
    }

    #[test]
    fn test_from_config_prefers_command_line_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("parts.db");
        Store::create(&path).unwrap();

        let config = Config::default();
        let workspace = Workspace::from_config(&config, Some(&path)).unwrap();
        assert!(workspace.is_open());
        assert!(Workspace::from_config(&config, None).unwrap().store().is_err());
    }
}
