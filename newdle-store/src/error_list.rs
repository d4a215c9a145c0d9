//! Process-wide list of user-visible errors.

use serde::{Deserialize, Serialize};

/// One reported error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorEntry {
    /// Identifier used to dismiss the entry.
    pub id: u64,
    /// Human-readable message.
    pub message: String,
}

/// Ordered list of transient errors.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorList {
    entries: Vec<ErrorEntry>,
}

impl ErrorList {
    /// Appends an error and returns its id.
    ///
    /// Ids continue from the newest entry, starting at 0 for an empty list.
    pub fn add(&mut self, message: impl Into<String>) -> u64 {
        let id = self.entries.last().map_or(0, |e| e.id + 1);
        self.entries.push(ErrorEntry {
            id,
            message: message.into(),
        });
        id
    }

    /// Removes the entry with the given id. Returns true if it existed.
    pub fn remove(&mut self, id: u64) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.id != id);
        self.entries.len() != before
    }

    /// Removes all entries.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Returns the entries, oldest first.
    pub fn entries(&self) -> &[ErrorEntry] {
        &self.entries
    }

    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if there are no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
