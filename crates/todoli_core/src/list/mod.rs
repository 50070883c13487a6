//! Todo list entities and caller-side helpers.
//!
//! # Responsibility
//! - Expose the in-memory list entity that drives all list use-cases.
//! - Provide name validation for presentation layers.
//!
//! # See also
//! - `store` for the on-disk layout.

pub mod name;
pub mod todo_list;
