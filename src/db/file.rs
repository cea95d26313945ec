// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! JSON file credential store.
//!
//! The whole file is `{ "<entry_id>": Credentials, ... }`. Writes go to a
//! sibling temp file that is then renamed over the original, so a crash never
//! leaves a half-written file behind.

use std::collections::BTreeMap;
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use super::{CredentialStore, StoreError};
use crate::models::Credentials;

pub struct FileStore {
    path: PathBuf,
    entries: Mutex<BTreeMap<String, Credentials>>,
}

impl FileStore {
    /// Open the store at `path`. A missing file is an empty store.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();

        let entries = match fs::read_to_string(&path) {
            Ok(contents) if contents.trim().is_empty() => BTreeMap::new(),
            Ok(contents) => serde_json::from_str(&contents)?,
            Err(e) if e.kind() == ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e.into()),
        };

        tracing::info!(path = %path.display(), count = entries.len(), "Opened credential store");

        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    fn lock(&self) -> MutexGuard<'_, BTreeMap<String, Credentials>> {
        // The map is only replaced wholesale, so a poisoned lock still holds consistent data
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn persist(&self, entries: &BTreeMap<String, Credentials>) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(entries)?;

        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        // A stale temp file may carry looser permissions; start from scratch
        match fs::remove_file(&tmp) {
            Err(e) if e.kind() != ErrorKind::NotFound => return Err(e.into()),
            _ => {}
        }

        let result =
            write_private(&tmp, json.as_bytes()).and_then(|()| fs::rename(&tmp, &self.path));
        if let Err(e) = result {
            let _ = fs::remove_file(&tmp);
            return Err(e.into());
        }
        Ok(())
    }
}

/// Create `path` readable only by its owner, write it and flush it to disk.
fn write_private(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    let mut options = OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let mut file = options.open(path)?;
    file.write_all(contents)?;
    file.sync_all()
}

impl CredentialStore for FileStore {
    fn load_all(&self) -> Result<Vec<(String, Credentials)>, StoreError> {
        Ok(self
            .lock()
            .iter()
            .map(|(id, creds)| (id.clone(), creds.clone()))
            .collect())
    }

    fn get(&self, entry_id: &str) -> Result<Option<Credentials>, StoreError> {
        Ok(self.lock().get(entry_id).cloned())
    }

    fn put(&self, entry_id: &str, credentials: &Credentials) -> Result<(), StoreError> {
        let mut entries = self.lock();
        let mut updated = entries.clone();
        updated.insert(entry_id.to_string(), credentials.clone());

        self.persist(&updated)?;
        *entries = updated;

        tracing::info!(entry_id, "Stored credentials");
        Ok(())
    }

    fn remove(&self, entry_id: &str) -> Result<bool, StoreError> {
        let mut entries = self.lock();
        if !entries.contains_key(entry_id) {
            return Ok(false);
        }

        let mut updated = entries.clone();
        updated.remove(entry_id);

        self.persist(&updated)?;
        *entries = updated;

        tracing::info!(entry_id, "Removed credentials");
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn creds(token: &str) -> Credentials {
        Credentials {
            consumer_key: "ck".to_string(),
            consumer_secret: "cs".to_string(),
            access_token: token.to_string(),
            access_token_secret: "ts".to_string(),
        }
    }

    #[test]
    fn test_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path().join("creds.json")).unwrap();
        assert!(store.load_all().unwrap().is_empty());
    }

    #[test]
    fn test_put_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("creds.json");

        let store = FileStore::open(&path).unwrap();
        store.put("kitchen", &creds("a")).unwrap();
        store.put("default", &creds("b")).unwrap();
        drop(store);

        let reopened = FileStore::open(&path).unwrap();
        let all = reopened.load_all().unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].0, "default");
        assert_eq!(reopened.get("kitchen").unwrap(), Some(creds("a")));
    }

    #[test]
    fn test_remove() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("creds.json");

        let store = FileStore::open(&path).unwrap();
        store.put("default", &creds("a")).unwrap();
        assert!(store.remove("default").unwrap());
        assert!(!store.remove("default").unwrap());

        let reopened = FileStore::open(&path).unwrap();
        assert_eq!(reopened.get("default").unwrap(), None);
    }

    #[test]
    fn test_corrupt_file_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("creds.json");
        fs::write(&path, "{not json").unwrap();

        assert!(matches!(FileStore::open(&path), Err(StoreError::Corrupt(_))));
    }

    #[cfg(unix)]
    #[test]
    fn test_file_is_private() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("creds.json");
        let store = FileStore::open(&path).unwrap();
        store.put("default", &creds("a")).unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
        assert!(!dir.path().join("creds.json.tmp").exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_stale_temp_file_does_not_leak_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("creds.json");
        let tmp = dir.path().join("creds.json.tmp");
        fs::write(&tmp, "leftover").unwrap();
        fs::set_permissions(&tmp, fs::Permissions::from_mode(0o644)).unwrap();

        let store = FileStore::open(&path).unwrap();
        store.put("default", &creds("a")).unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
        assert!(!tmp.exists());
    }

    #[test]
    fn test_failed_rename_cleans_up() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("creds.json");
        let store = FileStore::open(&path).unwrap();

        // A file cannot be renamed over a non-empty directory
        fs::create_dir(&path).unwrap();
        fs::write(path.join("occupied"), "x").unwrap();

        assert!(matches!(
            store.put("default", &creds("a")),
            Err(StoreError::Io(_))
        ));
        assert!(!dir.path().join("creds.json.tmp").exists());
        assert_eq!(store.get("default").unwrap(), None);
    }
}
