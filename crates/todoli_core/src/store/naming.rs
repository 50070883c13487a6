//! Collision-free list name generation.
//!
//! # Responsibility
//! - Produce names for lists created without an explicit name.
//!
//! # Invariants
//! - A returned name has no file in the store at the moment of return.
//! - Names consist of decimal digits followed by zero or more characters
//!   from [`SUFFIX_CHARS`], so they are always legal file names.

use super::list_store::ListRepository;
use rand::Rng;
use std::time::{SystemTime, UNIX_EPOCH};

/// Alphabet for disambiguating suffix characters.
pub const SUFFIX_CHARS: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Generates a name that does not collide with any list in `store`.
///
/// The seed is the current time in 100ns ticks since the Unix epoch. While the
/// candidate collides, one random suffix character is appended.
pub fn generate_unique_name<R: ListRepository + ?Sized>(store: &R) -> String {
    extend_until_unique(store, timestamp_seed(), &mut rand::rng())
}

/// Appends random suffix characters to `seed` until it is unused in `store`.
pub fn extend_until_unique<R, G>(store: &R, seed: String, rng: &mut G) -> String
where
    R: ListRepository + ?Sized,
    G: Rng,
{
    let mut candidate = seed;
    while store.exists(&candidate) {
        let index = rng.random_range(0..SUFFIX_CHARS.len());
        candidate.push(char::from(SUFFIX_CHARS[index]));
    }
    candidate
}

fn timestamp_seed() -> String {
    let ticks = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_nanos() / 100)
        .unwrap_or_default();
    ticks.to_string()
}
