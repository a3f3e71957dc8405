//! Persisted session credentials.
//!
//! The credential record is a cache, never a source of truth: the server
//! decides token validity on every call. A corrupt or stale record is
//! treated the same as no record at all.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::api::types::PanelUser;
use crate::config::paths;

/// Persisted session token plus the operator profile cached alongside it.
///
/// The cached profile lets the panel render the header before the first
/// `me` round trip; it is refreshed from the server on every resolve.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub token: String,
    pub user: PanelUser,
}

/// On-disk credential store at `${BOTDECK_HOME}/credentials.json`.
#[derive(Debug, Clone)]
pub struct CredentialStore {
    path: PathBuf,
}

impl CredentialStore {
    /// Creates a store at the default credentials path.
    pub fn new() -> Self {
        Self {
            path: paths::credentials_path(),
        }
    }

    /// Creates a store backed by a specific file.
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the backing file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the stored credentials, if any.
    ///
    /// A missing file yields `None`. An unreadable or unparsable record is
    /// logged and also yields `None` rather than an error.
    pub fn load(&self) -> Result<Option<Credentials>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let contents = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read credentials from {}", self.path.display()))?;

        match serde_json::from_str(&contents) {
            Ok(credentials) => Ok(Some(credentials)),
            Err(e) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "discarding unparsable credential record"
                );
                Ok(None)
            }
        }
    }

    /// Persists credentials, restricting the file to the owner on unix.
    pub fn save(&self, credentials: &Credentials) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }

        let contents = serde_json::to_string_pretty(credentials)
            .context("Failed to serialize credentials")?;

        #[cfg(unix)]
        {
            use std::io::Write;
            use std::os::unix::fs::OpenOptionsExt;

            let mut file = fs::OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .mode(0o600)
                .open(&self.path)
                .with_context(|| format!("Failed to open {}", self.path.display()))?;
            file.write_all(contents.as_bytes())
                .with_context(|| format!("Failed to write {}", self.path.display()))?;
        }

        #[cfg(not(unix))]
        {
            fs::write(&self.path, contents)
                .with_context(|| format!("Failed to write {}", self.path.display()))?;
        }

        Ok(())
    }

    /// Removes the stored credentials. Missing file is not an error.
    pub fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e)
                .with_context(|| format!("Failed to remove {}", self.path.display())),
        }
    }
}

impl Default for CredentialStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roles::Role;

    fn sample_credentials() -> Credentials {
        Credentials {
            token: "tok-123".to_string(),
            user: PanelUser {
                id: 1,
                login: "root".to_string(),
                display_name: "Root".to_string(),
                role: Role::Owner,
            },
        }
    }

    #[test]
    fn test_load_missing_file_yields_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = CredentialStore::at(dir.path().join("credentials.json"));
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn test_save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let store = CredentialStore::at(dir.path().join("credentials.json"));
        store.save(&sample_credentials()).unwrap();

        let loaded = store.load().unwrap().unwrap();
        assert_eq!(loaded.token, "tok-123");
        assert_eq!(loaded.user.login, "root");
        assert_eq!(loaded.user.role, Role::Owner);
    }

    #[test]
    fn test_corrupt_record_is_treated_as_absent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("credentials.json");
        fs::write(&path, "not json").unwrap();

        let store = CredentialStore::at(&path);
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn test_clear_removes_file_and_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = CredentialStore::at(dir.path().join("credentials.json"));
        store.save(&sample_credentials()).unwrap();

        store.clear().unwrap();
        assert!(store.load().unwrap().is_none());
        store.clear().unwrap();
    }

    #[cfg(unix)]
    #[test]
    fn test_saved_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let store = CredentialStore::at(dir.path().join("credentials.json"));
        store.save(&sample_credentials()).unwrap();

        let mode = fs::metadata(store.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
