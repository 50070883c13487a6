//! File-backed persistence for todo lists.
//!
//! # Responsibility
//! - Own the on-disk layout: one `<name>.xml` file per list in one directory.
//! - Provide the XML codec and the unique-name generator used by list entities.
//!
//! # Invariants
//! - Only this module touches list files directly.

pub mod codec;
pub mod list_store;
pub mod naming;
