//! Task domain model.
//!
//! # Responsibility
//! - Define the title/description pair stored in every list.
//! - Normalize task input before it reaches list state.
//!
//! # Invariants
//! - `title` is never empty (or whitespace-only).
//! - `description` is never empty; blank input becomes [`DESCRIPTION_PLACEHOLDER`].
//! - Tasks have no identity beyond their position; equality is by content.

use std::error::Error;
use std::fmt::{Display, Formatter};

/// Stored in place of an empty description.
pub const DESCRIPTION_PLACEHOLDER: &str = "-/-";

/// One entry of a todo list.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Task {
    title: String,
    description: String,
}

/// Validation errors for task input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskValidationError {
    EmptyTitle,
}

impl Display for TaskValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyTitle => write!(f, "task title cannot be empty"),
        }
    }
}

impl Error for TaskValidationError {}

impl Task {
    /// Creates a validated task.
    ///
    /// # Errors
    /// - Returns [`TaskValidationError::EmptyTitle`] when `title` is blank.
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
    ) -> Result<Self, TaskValidationError> {
        let title = title.into();
        if title.trim().is_empty() {
            return Err(TaskValidationError::EmptyTitle);
        }

        let description = description.into();
        let description = if description.trim().is_empty() {
            DESCRIPTION_PLACEHOLDER.to_string()
        } else {
            description
        };

        Ok(Self { title, description })
    }

    /// Creates a task whose description is the placeholder.
    pub fn titled(title: impl Into<String>) -> Result<Self, TaskValidationError> {
        Self::new(title, DESCRIPTION_PLACEHOLDER)
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns whether the description is the placeholder value.
    pub fn has_placeholder_description(&self) -> bool {
        self.description == DESCRIPTION_PLACEHOLDER
    }
}

#[cfg(test)]
mod tests {
    use super::{Task, TaskValidationError, DESCRIPTION_PLACEHOLDER};

    #[test]
    fn empty_title_is_rejected() {
        assert_eq!(Task::new("", "x"), Err(TaskValidationError::EmptyTitle));
        assert_eq!(Task::new("   ", "x"), Err(TaskValidationError::EmptyTitle));
    }

    #[test]
    fn empty_description_becomes_placeholder() {
        let task = Task::new("Milk", "").unwrap();
        assert_eq!(task.description(), DESCRIPTION_PLACEHOLDER);
        assert!(task.has_placeholder_description());
    }

    #[test]
    fn titled_uses_placeholder() {
        let task = Task::titled("Eggs").unwrap();
        assert_eq!(task.title(), "Eggs");
        assert_eq!(task.description(), DESCRIPTION_PLACEHOLDER);
    }

    #[test]
    fn equality_is_by_content() {
        let a = Task::new("Eggs", "2 dozen").unwrap();
        let b = Task::new("Eggs", "2 dozen").unwrap();
        assert_eq!(a, b);
        assert_ne!(a, Task::new("Eggs", "1 dozen").unwrap());
    }
}
