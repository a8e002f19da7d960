use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::debug;

use super::KeyValueStore;
use crate::error::StorageError;
use crate::lock::StorageLock;

const LOCK_FILE: &str = ".lock";

/// Default wait for the directory write lock.
pub const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_millis(2000);

/// One JSON document per key under a data directory: `<dir>/<key>.json`.
///
/// Writes go to a temporary sibling first and are renamed into place while
/// holding the directory lock, so readers see either the old or the new
/// document, never a partial one.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
    lock_timeout: Duration,
}

impl FileStorage {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            lock_timeout: DEFAULT_LOCK_TIMEOUT,
        }
    }

    #[must_use]
    pub const fn with_lock_timeout(mut self, timeout: Duration) -> Self {
        self.lock_timeout = timeout;
        self
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn key_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }

    fn io_error(key: &str, source: io::Error) -> StorageError {
        StorageError::Io {
            key: key.to_string(),
            source,
        }
    }
}

impl KeyValueStore for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        match fs::read_to_string(self.key_path(key)) {
            Ok(content) => Ok(Some(content)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(Self::io_error(key, err)),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        fs::create_dir_all(&self.dir).map_err(|err| Self::io_error(key, err))?;
        let _lock = StorageLock::acquire(&self.dir.join(LOCK_FILE), self.lock_timeout)?;

        let target = self.key_path(key);
        let tmp = self.dir.join(format!(".{key}.json.tmp"));
        let written = fs::File::create(&tmp)
            .and_then(|mut file| {
                file.write_all(value.as_bytes())?;
                file.sync_all()
            })
            .and_then(|()| fs::rename(&tmp, &target));
        if let Err(err) = written {
            if let Err(cleanup) = fs::remove_file(&tmp)
                && cleanup.kind() != io::ErrorKind::NotFound
            {
                debug!(key, error = %cleanup, "failed to remove temp file");
            }
            return Err(Self::io_error(key, err));
        }

        debug!(key, bytes = value.len(), path = %target.display(), "wrote storage key");
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        if !self.dir.is_dir() {
            return Ok(());
        }
        let _lock = StorageLock::acquire(&self.dir.join(LOCK_FILE), self.lock_timeout)?;
        match fs::remove_file(self.key_path(key)) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(Self::io_error(key, err)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_then_get_round_trips() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let mut storage = FileStorage::new(dir.path().join("data"));
        storage.set("jd_requests", "[1,2,3]")?;
        assert_eq!(storage.get("jd_requests")?.as_deref(), Some("[1,2,3]"));
        assert!(dir.path().join("data/jd_requests.json").exists());
        Ok(())
    }

    #[test]
    fn missing_directory_reads_as_none() -> Result<(), StorageError> {
        let storage = FileStorage::new("/definitely/not/a/jd/data/dir");
        assert_eq!(storage.get("jd_users")?, None);
        Ok(())
    }

    #[test]
    fn overwrite_leaves_no_temp_file() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let mut storage = FileStorage::new(dir.path());
        storage.set("jd_users", "[]")?;
        storage.set("jd_users", "[{}]")?;
        assert_eq!(storage.get("jd_users")?.as_deref(), Some("[{}]"));
        assert!(!dir.path().join(".jd_users.json.tmp").exists());
        Ok(())
    }

    #[test]
    fn failed_rename_leaves_no_temp_file() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        // A non-empty directory at the target path makes the rename fail.
        fs::create_dir_all(dir.path().join("jd_users.json/blocker"))?;
        let mut storage = FileStorage::new(dir.path());

        let err = storage.set("jd_users", "[]").expect_err("target is a directory");
        assert!(matches!(err, StorageError::Io { .. }));
        assert!(!dir.path().join(".jd_users.json.tmp").exists());
        Ok(())
    }

    #[test]
    fn remove_is_idempotent() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let mut storage = FileStorage::new(dir.path());
        storage.set("current_user", "{}")?;
        storage.remove("current_user")?;
        storage.remove("current_user")?;
        assert_eq!(storage.get("current_user")?, None);
        Ok(())
    }

    #[test]
    fn held_lock_surfaces_as_lock_error() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let _held = StorageLock::acquire(&dir.path().join(LOCK_FILE), Duration::from_millis(50))?;
        let mut storage =
            FileStorage::new(dir.path()).with_lock_timeout(Duration::from_millis(20));
        let err = storage.set("jd_users", "[]").expect_err("lock is held");
        assert!(matches!(err, StorageError::Lock(_)));
        Ok(())
    }
}
