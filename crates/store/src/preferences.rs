//! Per-user preferences.
//!
//! A flat JSON object of string keys to string values, stored at
//! `<config dir>/taskboard/preferences.json` unless another path is given.
//! Structured values are themselves JSON-encoded strings under fixed keys:
//!
//! | Key | Value |
//! |-----|-------|
//! | [`DIRECTORIES_KEY`] | JSON array of active task-list directories |
//! | [`GITHUB_KEY`] | JSON object `{ "token", "username" }` |
//!
//! ## Security
//!
//! The file holds a GitHub token. On Unix it is written with mode
//! [`PREFERENCES_FILE_MODE`] (owner read/write only).

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::fs_store::write_atomic;

/// Key of the active directory list.
pub const DIRECTORIES_KEY: &str = "taskboard.directories";

/// Key of the GitHub credentials.
pub const GITHUB_KEY: &str = "taskboard.github";

/// Required permissions for the preferences file (Unix: 0600).
pub const PREFERENCES_FILE_MODE: u32 = 0o600;

#[derive(Debug, Error)]
pub enum PreferenceError {
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("preference {key} is malformed: {message}")]
    Malformed { key: String, message: String },

    #[error("no per-user configuration directory on this platform")]
    NoConfigDir,
}

impl From<board::StoreError> for PreferenceError {
    fn from(err: board::StoreError) -> Self {
        match err {
            board::StoreError::Io { path, source } => Self::Io { path, source },
            other => Self::Malformed {
                key: String::new(),
                message: other.to_string(),
            },
        }
    }
}

/// GitHub login used by the sync commands.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GithubCredentials {
    #[serde(default)]
    pub token: String,
    #[serde(default)]
    pub username: String,
}

impl GithubCredentials {
    pub fn is_complete(&self) -> bool {
        !self.token.is_empty() && !self.username.is_empty()
    }
}

impl std::fmt::Debug for GithubCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GithubCredentials")
            .field("token", &if self.token.is_empty() { "" } else { "<redacted>" })
            .field("username", &self.username)
            .finish()
    }
}

/// Preference file accessor. Every call reads or rewrites the whole file.
#[derive(Debug, Clone)]
pub struct PreferenceStore {
    path: PathBuf,
}

impl PreferenceStore {
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Default location below the platform's per-user config directory.
    pub fn default_path() -> Result<PathBuf, PreferenceError> {
        dirs::config_dir()
            .map(|dir| dir.join("taskboard").join("preferences.json"))
            .ok_or(PreferenceError::NoConfigDir)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>, PreferenceError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(source) => {
                return Err(PreferenceError::Io {
                    path: self.path.clone(),
                    source,
                })
            }
        };
        serde_json::from_str(&raw).map_err(|e| PreferenceError::Malformed {
            key: self.path.display().to_string(),
            message: e.to_string(),
        })
    }

    fn write_all(&self, values: &BTreeMap<String, String>) -> Result<(), PreferenceError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| PreferenceError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let mut json = serde_json::to_string_pretty(values).map_err(|e| PreferenceError::Malformed {
            key: self.path.display().to_string(),
            message: e.to_string(),
        })?;
        json.push('\n');
        write_atomic(&self.path, json.as_bytes())?;
        restrict_permissions(&self.path)?;
        debug!(path = %self.path.display(), "saved preferences");
        Ok(())
    }

    pub fn get_string(&self, key: &str) -> Result<Option<String>, PreferenceError> {
        Ok(self.read_all()?.remove(key))
    }

    pub fn set_string(&self, key: &str, value: impl Into<String>) -> Result<(), PreferenceError> {
        let mut values = self.read_all()?;
        values.insert(key.to_string(), value.into());
        self.write_all(&values)
    }

    fn get_json<T: DeserializeOwned + Default>(&self, key: &str) -> Result<T, PreferenceError> {
        match self.get_string(key)? {
            None => Ok(T::default()),
            Some(raw) => serde_json::from_str(&raw).map_err(|e| PreferenceError::Malformed {
                key: key.to_string(),
                message: e.to_string(),
            }),
        }
    }

    fn set_json<T: Serialize>(&self, key: &str, value: &T) -> Result<(), PreferenceError> {
        let raw = serde_json::to_string(value).map_err(|e| PreferenceError::Malformed {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        self.set_string(key, raw)
    }

    /// Active task-list directories, in the order they were added.
    pub fn directories(&self) -> Result<Vec<PathBuf>, PreferenceError> {
        self.get_json(DIRECTORIES_KEY)
    }

    pub fn set_directories(&self, directories: &[PathBuf]) -> Result<(), PreferenceError> {
        self.set_json(DIRECTORIES_KEY, &directories)
    }

    /// Adds a directory unless already present. Returns `true` if added.
    pub fn add_directory(&self, directory: &Path) -> Result<bool, PreferenceError> {
        let mut directories = self.directories()?;
        if directories.iter().any(|d| d == directory) {
            return Ok(false);
        }
        directories.push(directory.to_path_buf());
        self.set_directories(&directories)?;
        Ok(true)
    }

    /// Removes a directory. Returns `true` if it was present.
    pub fn remove_directory(&self, directory: &Path) -> Result<bool, PreferenceError> {
        let mut directories = self.directories()?;
        let before = directories.len();
        directories.retain(|d| d != directory);
        if directories.len() == before {
            return Ok(false);
        }
        self.set_directories(&directories)?;
        Ok(true)
    }

    pub fn github_credentials(&self) -> Result<GithubCredentials, PreferenceError> {
        self.get_json(GITHUB_KEY)
    }

    pub fn set_github_credentials(&self, credentials: &GithubCredentials) -> Result<(), PreferenceError> {
        self.set_json(GITHUB_KEY, credentials)
    }
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> Result<(), PreferenceError> {
    use std::os::unix::fs::PermissionsExt;

    fs::set_permissions(path, fs::Permissions::from_mode(PREFERENCES_FILE_MODE)).map_err(|source| {
        PreferenceError::Io {
            path: path.to_path_buf(),
            source,
        }
    })
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> Result<(), PreferenceError> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    use super::*;

    fn store(temp: &TempDir) -> PreferenceStore {
        PreferenceStore::at(temp.path().join("config/preferences.json"))
    }

    #[test]
    fn missing_file_yields_defaults() {
        let temp = TempDir::new().unwrap();
        let prefs = store(&temp);
        assert!(prefs.directories().unwrap().is_empty());
        assert_eq!(prefs.github_credentials().unwrap(), GithubCredentials::default());
    }

    #[test]
    fn values_are_json_strings_under_fixed_keys() {
        let temp = TempDir::new().unwrap();
        let prefs = store(&temp);
        prefs.set_directories(&[PathBuf::from("tasks")]).unwrap();
        prefs
            .set_github_credentials(&GithubCredentials {
                token: "t".into(),
                username: "octocat".into(),
            })
            .unwrap();

        let raw: BTreeMap<String, String> =
            serde_json::from_str(&fs::read_to_string(prefs.path()).unwrap()).unwrap();
        assert_eq!(raw[DIRECTORIES_KEY], r#"["tasks"]"#);
        assert_eq!(raw[GITHUB_KEY], r#"{"token":"t","username":"octocat"}"#);
    }

    #[test]
    fn add_and_remove_directories() {
        let temp = TempDir::new().unwrap();
        let prefs = store(&temp);
        assert!(prefs.add_directory(Path::new("a")).unwrap());
        assert!(prefs.add_directory(Path::new("b")).unwrap());
        assert!(!prefs.add_directory(Path::new("a")).unwrap());
        assert!(prefs.remove_directory(Path::new("a")).unwrap());
        assert!(!prefs.remove_directory(Path::new("zzz")).unwrap());
        assert_eq!(prefs.directories().unwrap(), vec![PathBuf::from("b")]);
    }

    #[test]
    fn malformed_values_name_their_key() {
        let temp = TempDir::new().unwrap();
        let prefs = store(&temp);
        prefs.set_string(DIRECTORIES_KEY, "not json").unwrap();
        match prefs.directories() {
            Err(PreferenceError::Malformed { key, .. }) => assert_eq!(key, DIRECTORIES_KEY),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn debug_output_hides_token() {
        let creds = GithubCredentials {
            token: "ghp_secret".into(),
            username: "octocat".into(),
        };
        let shown = format!("{creds:?}");
        assert!(!shown.contains("ghp_secret"));
        assert!(shown.contains("octocat"));
        assert!(creds.is_complete());
    }

    #[cfg(unix)]
    #[test]
    fn file_is_private_to_owner() {
        use std::os::unix::fs::PermissionsExt;

        let temp = TempDir::new().unwrap();
        let prefs = store(&temp);
        prefs.set_string("k", "v").unwrap();
        let mode = fs::metadata(prefs.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, PREFERENCES_FILE_MODE);
    }
}
