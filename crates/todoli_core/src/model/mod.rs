//! Domain model for todo lists.
//!
//! # Responsibility
//! - Define the value types that list state and the file codec share.
//!
//! # Invariants
//! - Model types validate their own input on construction.

pub mod task;
