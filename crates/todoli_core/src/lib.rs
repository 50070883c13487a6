//! Core engine for ToDoLi, a personal todo-list manager.
//! Lists are named, ordered task collections stored one XML file per list.

pub mod config;
pub mod list;
pub mod logging;
pub mod model;
pub mod store;

pub use config::{AppConfig, ConfigError, StoreLocation};
pub use list::name::validate_list_name;
pub use list::todo_list::{ListError, ListResult, LoadOutcome, TodoList};
pub use logging::{default_log_level, init_logging, init_logging_with_retention, logging_status};
pub use model::task::{Task, TaskValidationError, DESCRIPTION_PLACEHOLDER};
pub use store::codec::{decode_tasks, encode_tasks, CodecError};
pub use store::list_store::{FileListStore, ListRepository, StoreError, StoreResult};
pub use store::naming::generate_unique_name;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
