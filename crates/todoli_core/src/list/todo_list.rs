//! Todo list entity.
//!
//! # Responsibility
//! - Hold one list in memory: name, ordered tasks and the dirty flag.
//! - Compose the store, codec and name generator into list use-cases
//!   (open, create, save, rename, delete, task edits).
//!
//! # Invariants
//! - `dirty` is false right after a successful load or save, and true right
//!   after any accepted mutation (add, remove, edit, rename, delete).
//! - Rejected operations leave name, tasks and `dirty` untouched.
//! - A deleted list is immediately re-seeded with a fresh generated name; the
//!   entity is never left without a name.
//! - All mutations take `&mut self`, so no rename or delete can interleave
//!   with an in-flight save on the same entity.
//! - `save` returns only after the file has been written and synced.

use crate::model::task::{Task, TaskValidationError};
use crate::store::codec::{decode_tasks, encode_tasks, CodecError};
use crate::store::list_store::{FileListStore, ListRepository, StoreError};
use crate::store::naming::generate_unique_name;
use log::{error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub type ListResult<T> = Result<T, ListError>;

/// Error for list entity operations.
#[derive(Debug)]
pub enum ListError {
    InvalidTask(TaskValidationError),
    IndexOutOfRange { index: usize, len: usize },
    NameCollision(String),
    /// The backing file was not loaded, so moving it would lose its content.
    UnloadedContent(String),
    Store(StoreError),
    Codec(CodecError),
}

impl Display for ListError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidTask(err) => write!(f, "{err}"),
            Self::IndexOutOfRange { index, len } => {
                write!(f, "task index {index} out of range for list of {len}")
            }
            Self::NameCollision(name) => write!(f, "a list named `{name}` already exists"),
            Self::UnloadedContent(name) => write!(
                f,
                "list `{name}` has file content that was not loaded; save or reload it first"
            ),
            Self::Store(err) => write!(f, "{err}"),
            Self::Codec(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ListError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidTask(err) => Some(err),
            Self::Store(err) => Some(err),
            Self::Codec(err) => Some(err),
            Self::IndexOutOfRange { .. } | Self::NameCollision(_) | Self::UnloadedContent(_) => {
                None
            }
        }
    }
}

impl From<TaskValidationError> for ListError {
    fn from(value: TaskValidationError) -> Self {
        Self::InvalidTask(value)
    }
}

impl From<StoreError> for ListError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::NameCollision(name) => Self::NameCollision(name),
            other => Self::Store(other),
        }
    }
}

impl From<CodecError> for ListError {
    fn from(value: CodecError) -> Self {
        Self::Codec(value)
    }
}

/// What happened when the entity tried to read its backing file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Name was generated; there was nothing to read.
    Fresh,
    /// No file exists for the name; the list starts empty.
    Missing,
    /// File was decoded into `tasks` entries.
    Loaded { tasks: usize },
    /// File exists but could not be decoded; the list starts empty and the
    /// file is left untouched until the next save overwrites it.
    Malformed { reason: String },
    /// File exists but could not be read; the list starts empty.
    Unreadable { reason: String },
}

impl LoadOutcome {
    /// Returns whether existing on-disk content was not loaded.
    ///
    /// Saving in this state overwrites that content; renaming is refused.
    pub fn discarded_content(&self) -> bool {
        matches!(self, Self::Malformed { .. } | Self::Unreadable { .. })
    }

    fn label(&self) -> &'static str {
        match self {
            Self::Fresh => "fresh",
            Self::Missing => "missing",
            Self::Loaded { .. } => "loaded",
            Self::Malformed { .. } => "malformed",
            Self::Unreadable { .. } => "unreadable",
        }
    }
}

/// In-memory todo list bound to a name in a list store.
#[derive(Debug)]
pub struct TodoList<R: ListRepository = FileListStore> {
    store: R,
    name: String,
    tasks: Vec<Task>,
    dirty: bool,
    load_outcome: LoadOutcome,
}

impl<R: ListRepository> TodoList<R> {
    /// Binds a list to `name`, loading its file when one exists.
    ///
    /// Never fails: a missing, malformed or unreadable file yields an empty
    /// list, and [`TodoList::load_outcome`] tells the cases apart.
    pub fn open(store: R, name: impl Into<String>) -> Self {
        let mut list = Self::unloaded(store, name.into(), LoadOutcome::Missing);
        list.load();
        list
    }

    /// Creates an empty list under a freshly generated, unused name.
    pub fn new_unnamed(store: R) -> Self {
        let name = generate_unique_name(&store);
        info!("event=list_open module=list status=ok name={name} outcome=fresh");
        Self::unloaded(store, name, LoadOutcome::Fresh)
    }

    /// Creates a new list under `name` and writes its empty file right away.
    ///
    /// # Errors
    /// - [`ListError::NameCollision`] when a list with `name` already exists.
    /// - Store or codec errors when the initial save fails.
    pub fn create(store: R, name: impl Into<String>) -> ListResult<Self> {
        let name = name.into();
        if store.exists(&name) {
            warn!("event=list_create module=list status=error error_code=name_collision name={name}");
            return Err(ListError::NameCollision(name));
        }

        let mut list = Self::unloaded(store, name, LoadOutcome::Missing);
        list.save()?;
        info!(
            "event=list_create module=list status=ok name={}",
            list.name
        );
        Ok(list)
    }

    fn unloaded(store: R, name: String, load_outcome: LoadOutcome) -> Self {
        Self {
            store,
            name,
            tasks: Vec::new(),
            dirty: false,
            load_outcome,
        }
    }

    /// Discards in-memory state and reads the backing file again.
    pub fn reload(&mut self) -> &LoadOutcome {
        self.load();
        &self.load_outcome
    }

    fn load(&mut self) {
        self.tasks.clear();
        self.load_outcome = match self.store.read(&self.name) {
            Ok(None) => LoadOutcome::Missing,
            Ok(Some(bytes)) => match decode_tasks(&bytes) {
                Ok(tasks) => {
                    self.tasks = tasks;
                    LoadOutcome::Loaded {
                        tasks: self.tasks.len(),
                    }
                }
                Err(err) => LoadOutcome::Malformed {
                    reason: err.to_string(),
                },
            },
            Err(err) => LoadOutcome::Unreadable {
                reason: err.to_string(),
            },
        };
        self.dirty = false;

        match &self.load_outcome {
            LoadOutcome::Malformed { reason } | LoadOutcome::Unreadable { reason } => warn!(
                "event=list_open module=list status=error name={} outcome={} error={}",
                self.name,
                self.load_outcome.label(),
                reason
            ),
            outcome => info!(
                "event=list_open module=list status=ok name={} outcome={} tasks={}",
                self.name,
                outcome.label(),
                self.tasks.len()
            ),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Tasks in display and file order.
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn task(&self, index: usize) -> Option<&Task> {
        self.tasks.get(index)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Returns whether there are mutations not yet written to the file.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn load_outcome(&self) -> &LoadOutcome {
        &self.load_outcome
    }

    pub fn store(&self) -> &R {
        &self.store
    }

    /// Appends a task.
    ///
    /// # Errors
    /// - [`ListError::InvalidTask`] when `title` is empty; the list is unchanged.
    pub fn add_task(
        &mut self,
        title: impl Into<String>,
        description: impl Into<String>,
    ) -> ListResult<()> {
        let task = Task::new(title, description).inspect_err(|err| {
            warn!(
                "event=task_add module=list status=error name={} error={}",
                self.name, err
            );
        })?;
        self.tasks.push(task);
        self.dirty = true;
        info!(
            "event=task_add module=list status=ok name={} index={}",
            self.name,
            self.tasks.len() - 1
        );
        Ok(())
    }

    /// Appends a task with the placeholder description.
    pub fn add_task_titled(&mut self, title: impl Into<String>) -> ListResult<()> {
        self.add_task(title, "")
    }

    /// Removes and returns the task at `index`; later tasks shift down.
    ///
    /// Out-of-range indexes are a no-op and return `None`.
    pub fn remove_task(&mut self, index: usize) -> Option<Task> {
        if index >= self.tasks.len() {
            return None;
        }
        let removed = self.tasks.remove(index);
        self.dirty = true;
        info!(
            "event=task_remove module=list status=ok name={} index={index}",
            self.name
        );
        Some(removed)
    }

    /// Replaces the task at `index` in place, keeping its position.
    ///
    /// # Errors
    /// - [`ListError::IndexOutOfRange`] for an invalid index.
    /// - [`ListError::InvalidTask`] when `title` is empty.
    ///
    /// The list is unchanged on error.
    pub fn edit_task(
        &mut self,
        index: usize,
        title: impl Into<String>,
        description: impl Into<String>,
    ) -> ListResult<()> {
        let len = self.tasks.len();
        if index >= len {
            return Err(ListError::IndexOutOfRange { index, len });
        }
        let task = Task::new(title, description)?;
        self.tasks[index] = task;
        self.dirty = true;
        info!(
            "event=task_edit module=list status=ok name={} index={index}",
            self.name
        );
        Ok(())
    }

    /// Moves the list to `new_name`.
    ///
    /// Current in-memory tasks are written under the new name, then the old
    /// file is removed, then the entity adopts the new name.
    ///
    /// # Errors
    /// - [`ListError::NameCollision`] when `new_name` already exists. Nothing
    ///   changes on disk or in memory.
    /// - [`ListError::UnloadedContent`] while the backing file holds content
    ///   that failed to load (see [`LoadOutcome::discarded_content`]).
    /// - Store or codec errors; the entity keeps its old name and no file is
    ///   left under `new_name`.
    pub fn rename(&mut self, new_name: impl Into<String>) -> ListResult<()> {
        let new_name = new_name.into();
        if self.load_outcome.discarded_content() {
            warn!(
                "event=list_rename module=list status=error error_code=unloaded_content name={} outcome={}",
                self.name,
                self.load_outcome.label()
            );
            return Err(ListError::UnloadedContent(self.name.clone()));
        }
        if self.store.exists(&new_name) {
            warn!(
                "event=list_rename module=list status=error error_code=name_collision name={} new_name={}",
                self.name, new_name
            );
            return Err(ListError::NameCollision(new_name));
        }
        if new_name == self.name {
            return Ok(());
        }

        let result = encode_tasks(&self.tasks)
            .map_err(ListError::from)
            .and_then(|bytes| {
                self.store
                    .rename_file(&self.name, &new_name, &bytes)
                    .map_err(ListError::from)
            });
        if let Err(err) = result {
            error!(
                "event=list_rename module=list status=error name={} new_name={} error={}",
                self.name, new_name, err
            );
            return Err(err);
        }

        info!(
            "event=list_rename module=list status=ok name={} new_name={}",
            self.name, new_name
        );
        self.name = new_name;
        self.dirty = true;
        Ok(())
    }

    /// Deletes the list and re-seeds the entity as a new, empty list.
    ///
    /// # Errors
    /// - Store errors when the file cannot be removed; the entity is unchanged.
    pub fn delete(&mut self) -> ListResult<()> {
        if let Err(err) = self.store.delete(&self.name) {
            error!(
                "event=list_delete module=list status=error name={} error={}",
                self.name, err
            );
            return Err(err.into());
        }

        let new_name = generate_unique_name(&self.store);
        info!(
            "event=list_delete module=list status=ok name={} reseeded_as={}",
            self.name, new_name
        );
        self.tasks.clear();
        self.name = new_name;
        self.load_outcome = LoadOutcome::Fresh;
        self.dirty = true;
        Ok(())
    }

    /// Writes the current tasks to the backing file and clears `dirty`.
    ///
    /// # Errors
    /// - Store or codec errors; `dirty` keeps its value so the caller can retry.
    pub fn save(&mut self) -> ListResult<()> {
        let result = encode_tasks(&self.tasks)
            .map_err(ListError::from)
            .and_then(|bytes| {
                self.store
                    .write(&self.name, &bytes)
                    .map_err(ListError::from)
            });

        match result {
            Ok(()) => {
                self.dirty = false;
                // The unreadable content is gone; the file now matches memory.
                if self.load_outcome.discarded_content() {
                    self.load_outcome = LoadOutcome::Loaded {
                        tasks: self.tasks.len(),
                    };
                }
                info!(
                    "event=list_save module=list status=ok name={} tasks={}",
                    self.name,
                    self.tasks.len()
                );
                Ok(())
            }
            Err(err) => {
                error!(
                    "event=list_save module=list status=error name={} error={}",
                    self.name, err
                );
                Err(err)
            }
        }
    }

    /// Returns whether a list named `candidate` exists in the store.
    pub fn exists(&self, candidate: &str) -> bool {
        self.store.exists(candidate)
    }

    /// Returns all list names in the store.
    pub fn list_names(&self) -> ListResult<Vec<String>> {
        Ok(self.store.list_names()?)
    }
}

impl TodoList<FileListStore> {
    /// Path of the backing file, whether or not it exists yet.
    pub fn path(&self) -> PathBuf {
        self.store.path_for(&self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::{ListError, LoadOutcome, TodoList};
    use crate::model::task::DESCRIPTION_PLACEHOLDER;
    use crate::store::list_store::{FileListStore, ListRepository};

    fn setup() -> (tempfile::TempDir, FileListStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = FileListStore::open(dir.path()).unwrap();
        (dir, store)
    }

    #[test]
    fn unnamed_list_starts_clean_and_empty() {
        let (_dir, store) = setup();
        let list = TodoList::new_unnamed(store);
        assert!(list.is_empty());
        assert!(!list.is_dirty());
        assert_eq!(list.load_outcome(), &LoadOutcome::Fresh);
        assert!(!list.exists(list.name()));
    }

    #[test]
    fn open_missing_name_starts_empty() {
        let (_dir, store) = setup();
        let list = TodoList::open(store, "Groceries");
        assert_eq!(list.name(), "Groceries");
        assert!(list.is_empty());
        assert!(!list.is_dirty());
        assert_eq!(list.load_outcome(), &LoadOutcome::Missing);
    }

    #[test]
    fn add_task_rejects_empty_title_without_mutation() {
        let (_dir, store) = setup();
        let mut list = TodoList::open(store, "a");
        let err = list.add_task("", "x").unwrap_err();
        assert!(matches!(err, ListError::InvalidTask(_)));
        assert!(list.is_empty());
        assert!(!list.is_dirty());
    }

    #[test]
    fn add_task_normalizes_empty_description() {
        let (_dir, store) = setup();
        let mut list = TodoList::open(store, "a");
        list.add_task("T", "").unwrap();
        assert_eq!(list.tasks()[0].description(), DESCRIPTION_PLACEHOLDER);
        assert!(list.is_dirty());

        list.add_task_titled("U").unwrap();
        assert_eq!(list.task(1).unwrap().description(), DESCRIPTION_PLACEHOLDER);
    }

    #[test]
    fn remove_task_out_of_range_is_noop() {
        let (_dir, store) = setup();
        let mut list = TodoList::open(store, "a");
        list.add_task("one", "1").unwrap();
        list.save().unwrap();

        assert_eq!(list.remove_task(1), None);
        assert_eq!(list.len(), 1);
        assert!(!list.is_dirty());
    }

    #[test]
    fn remove_task_shifts_later_tasks() {
        let (_dir, store) = setup();
        let mut list = TodoList::open(store, "a");
        for title in ["one", "two", "three"] {
            list.add_task(title, "").unwrap();
        }
        list.save().unwrap();

        let removed = list.remove_task(1).unwrap();
        assert_eq!(removed.title(), "two");
        let titles: Vec<_> = list.tasks().iter().map(|task| task.title()).collect();
        assert_eq!(titles, vec!["one", "three"]);
        assert!(list.is_dirty());
    }

    #[test]
    fn edit_task_replaces_in_place() {
        let (_dir, store) = setup();
        let mut list = TodoList::open(store, "a");
        for title in ["one", "two", "three"] {
            list.add_task(title, "").unwrap();
        }
        list.edit_task(0, "uno", "first").unwrap();
        assert_eq!(list.task(0).unwrap().title(), "uno");
        assert_eq!(list.task(0).unwrap().description(), "first");
        assert_eq!(list.len(), 3);

        assert!(matches!(
            list.edit_task(3, "x", "y").unwrap_err(),
            ListError::IndexOutOfRange { index: 3, len: 3 }
        ));
        assert!(matches!(
            list.edit_task(1, "", "y").unwrap_err(),
            ListError::InvalidTask(_)
        ));
        assert_eq!(list.task(1).unwrap().title(), "two");
    }

    #[test]
    fn save_clears_dirty_and_writes_file() {
        let (_dir, store) = setup();
        let mut list = TodoList::open(store, "a");
        list.add_task("one", "").unwrap();
        list.save().unwrap();
        assert!(!list.is_dirty());
        assert!(list.store().exists("a"));
    }

    #[test]
    fn failed_save_keeps_dirty() {
        let (dir, store) = setup();
        let mut list = TodoList::open(store, "a");
        list.add_task("one", "").unwrap();
        // A directory in place of the list file makes the final rename fail.
        std::fs::create_dir(dir.path().join("a.xml")).unwrap();
        std::fs::write(dir.path().join("a.xml").join("keep"), b"x").unwrap();

        assert!(matches!(list.save().unwrap_err(), ListError::Store(_)));
        assert!(list.is_dirty());
    }

    #[test]
    fn failed_delete_keeps_name_and_tasks() {
        let (dir, store) = setup();
        let mut list = TodoList::open(store, "a");
        list.add_task("one", "").unwrap();
        list.add_task("two", "").unwrap();
        std::fs::create_dir(dir.path().join("a.xml")).unwrap();
        std::fs::write(dir.path().join("a.xml").join("keep"), b"x").unwrap();

        assert!(matches!(list.delete().unwrap_err(), ListError::Store(_)));
        assert_eq!(list.name(), "a");
        assert_eq!(list.len(), 2);
        assert!(list.is_dirty());
    }

    #[test]
    fn failed_rename_leaves_no_orphan_and_can_be_retried() {
        let (dir, store) = setup();
        let mut list = TodoList::open(store, "old");
        list.add_task("one", "").unwrap();
        list.save().unwrap();

        // Swap the saved file for a directory so removing it fails.
        let old_path = dir.path().join("old.xml");
        std::fs::remove_file(&old_path).unwrap();
        std::fs::create_dir(&old_path).unwrap();
        std::fs::write(old_path.join("keep"), b"x").unwrap();

        assert!(matches!(list.rename("new").unwrap_err(), ListError::Store(_)));
        assert_eq!(list.name(), "old");
        assert!(!list.exists("new"));

        std::fs::remove_dir_all(&old_path).unwrap();
        list.rename("new").unwrap();
        assert_eq!(list.name(), "new");
        assert!(list.exists("new"));
    }

    #[test]
    fn rename_refuses_to_move_unloaded_content() {
        let (dir, store) = setup();
        std::fs::write(dir.path().join("broken.xml"), b"<tasks><task").unwrap();

        let mut list = TodoList::open(store, "broken");
        let err = list.rename("renamed").unwrap_err();
        assert!(matches!(err, ListError::UnloadedContent(name) if name == "broken"));
        assert_eq!(list.name(), "broken");
        assert!(!list.exists("renamed"));
        assert_eq!(
            std::fs::read(dir.path().join("broken.xml")).unwrap(),
            b"<tasks><task"
        );

        // An explicit save replaces the corrupt file and unblocks rename.
        list.save().unwrap();
        assert!(!list.load_outcome().discarded_content());
        list.rename("renamed").unwrap();
        assert!(!list.exists("broken"));
    }

    #[test]
    fn path_points_into_store_root() {
        let (dir, store) = setup();
        let mut list = TodoList::open(store, "Groceries");
        assert_eq!(list.path(), dir.path().join("Groceries.xml"));
        assert!(!list.path().exists());

        list.save().unwrap();
        assert!(list.path().is_file());
        list.rename("Shopping").unwrap();
        assert_eq!(list.path(), dir.path().join("Shopping.xml"));
    }

    #[test]
    fn malformed_file_is_reported_distinctly() {
        let (dir, store) = setup();
        std::fs::write(dir.path().join("broken.xml"), b"<tasks><task").unwrap();

        let list = TodoList::open(store, "broken");
        assert!(list.is_empty());
        assert!(!list.is_dirty());
        assert!(matches!(list.load_outcome(), LoadOutcome::Malformed { .. }));
        assert!(list.load_outcome().discarded_content());
        assert_eq!(
            std::fs::read(dir.path().join("broken.xml")).unwrap(),
            b"<tasks><task"
        );
    }

    #[test]
    fn reload_discards_unsaved_changes() {
        let (_dir, store) = setup();
        let mut list = TodoList::open(store, "a");
        list.add_task("kept", "").unwrap();
        list.save().unwrap();
        list.add_task("dropped", "").unwrap();

        assert_eq!(list.reload(), &LoadOutcome::Loaded { tasks: 1 });
        assert_eq!(list.len(), 1);
        assert!(!list.is_dirty());
    }

    #[test]
    fn rename_to_same_unsaved_name_is_noop() {
        let (_dir, store) = setup();
        let mut list = TodoList::open(store, "draft");
        list.rename("draft").unwrap();
        assert_eq!(list.name(), "draft");
        assert!(!list.store().exists("draft"));
    }
}
