use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

use crate::error::SyncError;

/// Format used for the last backup/restore timestamps
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Repository settings persisted between runs
///
/// Serialized as a single JSON object. `repository_dir` is a scratch
/// location: it is wiped at the start and end of every backup or restore and
/// never holds state between runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryConfig {
    /// Remote URL, `https://...git` or `git@...git`
    #[serde(rename = "repositoryUrl")]
    pub repository_url: String,

    /// Where the remote is cloned while a run is in progress
    #[serde(rename = "repositoryDir")]
    pub repository_dir: PathBuf,

    /// Local time of the last successful backup
    #[serde(rename = "lastBackup", default)]
    pub last_backup: Option<String>,

    /// Local time of the last successful restore
    #[serde(rename = "lastRestore", default)]
    pub last_restore: Option<String>,
}

/// Check that `url` has the shape `(https://|git@)<something>.git`
pub fn is_valid_repository_url(url: &str) -> bool {
    let rest = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("git@"));

    match rest.and_then(|r| r.strip_suffix(".git")) {
        Some(middle) => !middle.is_empty() && !middle.chars().any(char::is_whitespace),
        None => false,
    }
}

fn now_timestamp() -> String {
    chrono::Local::now().format(TIMESTAMP_FORMAT).to_string()
}

/// Load/save access to the single [`RepositoryConfig`] record
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at the platform's default config location
    pub fn open_default() -> Result<Self> {
        Ok(Self::new(crate::config::ConfigManager::repository_config_path()?))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the record; a missing file is `None`, not an error
    pub fn load(&self) -> Result<Option<RepositoryConfig>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read {}", self.path.display()))?;
        let config = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse {}", self.path.display()))?;

        Ok(Some(config))
    }

    /// Load the record or fail with [`SyncError::RepositoryNotConfigured`]
    pub fn require(&self) -> Result<RepositoryConfig> {
        self.load()?
            .ok_or_else(|| SyncError::RepositoryNotConfigured.into())
    }

    /// Replace the record with a fresh one; both timestamps are cleared.
    ///
    /// An invalid URL leaves any existing record untouched.
    pub fn save(&self, url: &str, directory: &Path) -> Result<RepositoryConfig> {
        let url = url.trim();
        if !is_valid_repository_url(url) {
            return Err(SyncError::InvalidUrl(url.to_string()).into());
        }

        let config = RepositoryConfig {
            repository_url: url.to_string(),
            repository_dir: directory.to_path_buf(),
            last_backup: None,
            last_restore: None,
        };
        self.write(&config)?;
        Ok(config)
    }

    /// Stamp the current local time as the last backup
    pub fn record_backup(&self) -> Result<RepositoryConfig> {
        let mut config = self.require()?;
        config.last_backup = Some(now_timestamp());
        self.write(&config)?;
        Ok(config)
    }

    /// Stamp the current local time as the last restore
    pub fn record_restore(&self) -> Result<RepositoryConfig> {
        let mut config = self.require()?;
        config.last_restore = Some(now_timestamp());
        self.write(&config)?;
        Ok(config)
    }

    /// Delete the record. Returns whether a file was removed.
    pub fn clear(&self) -> Result<bool> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => {
                Err(e).with_context(|| format!("Failed to remove {}", self.path.display()))
            }
        }
    }

    /// Write through a temp file in the same directory, then rename over the
    /// original, so a crash never leaves a half-written record.
    fn write(&self, config: &RepositoryConfig) -> Result<()> {
        let parent = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;

        let content =
            serde_json::to_string_pretty(config).context("Failed to serialize repository config")?;

        let mut temp = NamedTempFile::new_in(parent)
            .with_context(|| format!("Failed to create temp file in {}", parent.display()))?;
        temp.write_all(content.as_bytes())?;
        temp.as_file().sync_all()?;
        temp.persist(&self.path)
            .with_context(|| format!("Failed to write {}", self.path.display()))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store(temp: &TempDir) -> ConfigStore {
        ConfigStore::new(temp.path().join("zen-sync").join("repository.json"))
    }

    #[test]
    fn test_url_validation() {
        assert!(is_valid_repository_url("https://github.com/user/zen.git"));
        assert!(is_valid_repository_url("git@github.com:user/zen.git"));

        assert!(!is_valid_repository_url("https://github.com/user/zen"));
        assert!(!is_valid_repository_url("http://github.com/user/zen.git"));
        assert!(!is_valid_repository_url("ssh://git@github.com/user/zen.git"));
        assert!(!is_valid_repository_url("github.com/user/zen.git"));
        assert!(!is_valid_repository_url("https://.git"));
        assert!(!is_valid_repository_url(""));
    }

    #[test]
    fn test_load_without_file_is_none() {
        let temp = TempDir::new().unwrap();
        assert_eq!(store(&temp).load().unwrap(), None);
    }

    #[test]
    fn test_save_then_load_has_no_timestamps() {
        let temp = TempDir::new().unwrap();
        let store = store(&temp);
        store
            .save("git@github.com:user/zen.git", Path::new("/tmp/zen-repo"))
            .unwrap();
        store.record_backup().unwrap();

        store
            .save("https://github.com/user/other.git", Path::new("/tmp/zen-repo"))
            .unwrap();
        let loaded = store.load().unwrap().unwrap();

        assert_eq!(loaded.repository_url, "https://github.com/user/other.git");
        assert_eq!(loaded.last_backup, None);
        assert_eq!(loaded.last_restore, None);
    }

    #[test]
    fn test_invalid_url_leaves_record_untouched() {
        let temp = TempDir::new().unwrap();
        let store = store(&temp);
        let original = store
            .save("git@github.com:user/zen.git", Path::new("/tmp/zen-repo"))
            .unwrap();

        let err = store
            .save("https://github.com/user/zen", Path::new("/elsewhere"))
            .unwrap_err();

        assert!(matches!(
            err.downcast_ref::<SyncError>(),
            Some(SyncError::InvalidUrl(_))
        ));
        assert_eq!(store.load().unwrap(), Some(original));
    }

    #[test]
    fn test_record_timestamps() {
        let temp = TempDir::new().unwrap();
        let store = store(&temp);
        store
            .save("git@github.com:user/zen.git", Path::new("/tmp/zen-repo"))
            .unwrap();

        let after_backup = store.record_backup().unwrap();
        let stamp = after_backup.last_backup.unwrap();
        assert!(chrono::NaiveDateTime::parse_from_str(&stamp, TIMESTAMP_FORMAT).is_ok());
        assert_eq!(after_backup.last_restore, None);

        let after_restore = store.record_restore().unwrap();
        assert_eq!(after_restore.last_backup, Some(stamp));
        assert!(after_restore.last_restore.is_some());
    }

    #[test]
    fn test_record_without_config_fails() {
        let temp = TempDir::new().unwrap();
        let err = store(&temp).record_backup().unwrap_err();
        assert_eq!(
            err.downcast_ref::<SyncError>(),
            Some(&SyncError::RepositoryNotConfigured)
        );
    }

    #[test]
    fn test_clear_is_idempotent() {
        let temp = TempDir::new().unwrap();
        let store = store(&temp);
        store
            .save("git@github.com:user/zen.git", Path::new("/tmp/zen-repo"))
            .unwrap();

        assert!(store.clear().unwrap());
        assert_eq!(store.load().unwrap(), None);
        assert!(!store.clear().unwrap());
        assert_eq!(store.load().unwrap(), None);
    }

    #[test]
    fn test_json_field_names() {
        let temp = TempDir::new().unwrap();
        let store = store(&temp);
        store
            .save("git@github.com:user/zen.git", Path::new("/tmp/zen-repo"))
            .unwrap();

        let raw: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(store.path()).unwrap()).unwrap();
        assert_eq!(raw["repositoryUrl"], "git@github.com:user/zen.git");
        assert_eq!(raw["repositoryDir"], "/tmp/zen-repo");
        assert!(raw["lastBackup"].is_null());
        assert!(raw["lastRestore"].is_null());
    }
}
