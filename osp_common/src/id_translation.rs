//! Dense renumbering of sparse IDs
//!
//! Each distinct ID gets the next index, starting at 0, the first time it is
//! seen. Used to turn hashes or pointers into stable compact indices.

use std::sync::{Mutex, OnceLock, PoisonError};
use rustc_hash::FxHashMap;

/// Process-wide table behind `translated_hash`
static TRANSLATION: OnceLock<Mutex<IdTranslation>> = OnceLock::new();

/// Table assigning dense indices to IDs in order of first sight
#[derive(Debug, Clone, Default)]
pub struct IdTranslation {
    indices: FxHashMap<u64, u64>,
}

impl IdTranslation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index of `id`, assigning the next free one on first sight
    pub fn translate(&mut self, id: u64) -> u64 {
        let next = self.indices.len() as u64;
        *self.indices.entry(id).or_insert(next)
    }

    /// Index of `id` if it was seen before
    pub fn get(&self, id: u64) -> Option<u64> {
        self.indices.get(&id).copied()
    }

    /// Number of distinct IDs seen
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

/// Dense index of `id` in the process-wide table
pub fn translated_hash(id: u64) -> u64 {
    TRANSLATION
        .get_or_init(|| Mutex::new(IdTranslation::new()))
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .translate(id)
}

#[cfg(test)]
#[path = "id_translation_tests.rs"]
mod tests;
