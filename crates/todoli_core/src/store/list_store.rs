//! List store contracts and directory-backed implementation.
//!
//! # Responsibility
//! - Map list names to files inside one store directory.
//! - Provide existence, enumeration, durable write, delete and rename primitives.
//!
//! # Invariants
//! - A list named `n` lives at `<root>/<n>.xml`; no other file maps to `n`.
//! - Writes go through a temp file and an atomic rename, so a reader never
//!   observes a partially written list file.
//! - Deleting an absent list is a no-op.
//! - Temp files never show up in `list_names`.

use log::{error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// File extension of list files, without the dot.
pub const LIST_FILE_EXTENSION: &str = "xml";

const TEMP_FILE_EXTENSION: &str = "tmp";

pub type StoreResult<T> = Result<T, StoreError>;

/// Store-level error for list file operations.
#[derive(Debug)]
pub enum StoreError {
    Io { path: PathBuf, source: std::io::Error },
    NameCollision(String),
}

impl StoreError {
    fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "{}: {source}", path.display()),
            Self::NameCollision(name) => write!(f, "a list named `{name}` already exists"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::NameCollision(_) => None,
        }
    }
}

/// Repository interface over list files.
pub trait ListRepository {
    /// Returns whether a file for `name` exists directly in the store.
    fn exists(&self, name: &str) -> bool;
    /// Returns every list name in enumeration order of the host file system.
    fn list_names(&self) -> StoreResult<Vec<String>>;
    /// Reads raw list bytes; `None` when the list has no file.
    fn read(&self, name: &str) -> StoreResult<Option<Vec<u8>>>;
    /// Durably replaces the contents of the list file.
    fn write(&self, name: &str, contents: &[u8]) -> StoreResult<()>;
    /// Removes the list file if present.
    fn delete(&self, name: &str) -> StoreResult<()>;
    /// Writes `contents` under `new_name`, then removes `old_name`.
    ///
    /// Fails with [`StoreError::NameCollision`] when `new_name` already exists.
    fn rename_file(&self, old_name: &str, new_name: &str, contents: &[u8]) -> StoreResult<()>;
}

/// Directory-backed list store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileListStore {
    root: PathBuf,
}

impl FileListStore {
    /// Opens a store rooted at `root`, creating the directory if needed.
    ///
    /// # Side effects
    /// - Creates `root` and missing parents. Idempotent for existing directories.
    pub fn open(root: impl Into<PathBuf>) -> StoreResult<Self> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(|err| {
            error!(
                "event=store_open module=store status=error root={} error={}",
                root.display(),
                err
            );
            StoreError::io(&root, err)
        })?;
        info!(
            "event=store_open module=store status=ok root={}",
            root.display()
        );
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the file path for `name`. Pure function of root and name.
    pub fn path_for(&self, name: &str) -> PathBuf {
        self.root.join(format!("{name}.{LIST_FILE_EXTENSION}"))
    }

    fn temp_path_for(&self, name: &str) -> PathBuf {
        self.root
            .join(format!(".{name}.{}.{TEMP_FILE_EXTENSION}", Uuid::new_v4().simple()))
    }

    fn write_atomic(&self, name: &str, contents: &[u8]) -> StoreResult<()> {
        let target = self.path_for(name);
        let temp = self.temp_path_for(name);

        let result = write_synced(&temp, contents)
            .and_then(|()| fs::rename(&temp, &target))
            .map_err(|err| StoreError::io(&target, err));

        if result.is_err() {
            // Best effort: the temp file is not a list and must not linger.
            let _ = fs::remove_file(&temp);
        }
        result
    }
}

fn write_synced(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(contents)?;
    file.sync_all()
}

impl ListRepository for FileListStore {
    fn exists(&self, name: &str) -> bool {
        self.path_for(name).is_file()
    }

    fn list_names(&self) -> StoreResult<Vec<String>> {
        let entries = fs::read_dir(&self.root).map_err(|err| StoreError::io(&self.root, err))?;

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|err| StoreError::io(&self.root, err))?;
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            if path.extension().and_then(|ext| ext.to_str()) != Some(LIST_FILE_EXTENSION) {
                continue;
            }
            match path.file_stem().and_then(|stem| stem.to_str()) {
                Some(stem) => names.push(stem.to_string()),
                None => warn!(
                    "event=store_list module=store status=skip reason=non_utf8_name path={}",
                    path.display()
                ),
            }
        }
        Ok(names)
    }

    fn read(&self, name: &str) -> StoreResult<Option<Vec<u8>>> {
        let path = self.path_for(name);
        match fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(StoreError::io(path, err)),
        }
    }

    fn write(&self, name: &str, contents: &[u8]) -> StoreResult<()> {
        self.write_atomic(name, contents)
    }

    fn delete(&self, name: &str) -> StoreResult<()> {
        let path = self.path_for(name);
        match fs::remove_file(&path) {
            Ok(()) => {
                info!("event=store_delete module=store status=ok name={name}");
                Ok(())
            }
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(StoreError::io(path, err)),
        }
    }

    fn rename_file(&self, old_name: &str, new_name: &str, contents: &[u8]) -> StoreResult<()> {
        if self.exists(new_name) {
            return Err(StoreError::NameCollision(new_name.to_string()));
        }

        // The new file is complete before the old one goes away; a crash in
        // between leaves both, never neither.
        self.write_atomic(new_name, contents)?;
        if let Err(err) = self.delete(old_name) {
            // Roll back so the rename can be retried under the same name.
            if let Err(cleanup) = fs::remove_file(self.path_for(new_name)) {
                warn!(
                    "event=store_rename module=store status=error error_code=rollback_failed new_name={new_name} error={cleanup}"
                );
            }
            return Err(err);
        }
        Ok(())
    }
}
