//! The identifier-keyed index and its merge policies.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Well-known type tags declared by documents.
///
/// Informational only; the index never validates a declared tag against
/// this list.
pub mod typenames {
    pub const COURSE: &str = "course";
    pub const UNIT: &str = "unit";
    pub const PAGE: &str = "page";
}

/// How records sharing an identifier are resolved during the index build.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum MergePolicy {
    /// Source-compatible silent overwrite: the later-arriving record wins.
    ///
    /// Arrival order follows task completion order, so the winner is
    /// non-deterministic when collisions exist.
    #[default]
    LastWins,
    /// The record with the lexicographically smallest source path wins.
    /// Deterministic regardless of task completion order.
    FirstWins,
    /// A collision on a non-empty identifier fails the whole build.
    /// Empty identifiers (soft failures) are exempt and collapse silently.
    ErrorOnConflict,
}

impl MergePolicy {
    /// Returns the policy as a string.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::LastWins => "last-wins",
            Self::FirstWins => "first-wins",
            Self::ErrorOnConflict => "error-on-conflict",
        }
    }
}

impl fmt::Display for MergePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The externally visible value type, one per identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexEntry {
    /// The document's declared type tag.
    #[serde(rename = "type")]
    pub type_tag: String,
    /// Path of the source file the entry was built from.
    pub filepath: String,
}

/// Mapping from declared identifier to [`IndexEntry`].
///
/// Built once by [`crate::IndexBuilder`] and read-only afterwards. Keys are
/// stored in a `BTreeMap` so iteration and serialization are deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentIndex {
    entries: BTreeMap<String, IndexEntry>,
}

impl ContentIndex {
    /// Creates an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true when the index holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the entry for `id`, if any.
    pub fn get(&self, id: &str) -> Option<&IndexEntry> {
        self.entries.get(id)
    }

    /// Returns the entry for `id` only when its declared type tag matches.
    pub fn lookup(&self, id: &str, type_tag: &str) -> Option<&IndexEntry> {
        self.entries
            .get(id)
            .filter(|entry| entry.type_tag == type_tag)
    }

    /// Iterates over entries in identifier order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &IndexEntry)> {
        self.entries.iter()
    }

    pub(crate) fn insert(&mut self, id: String, entry: IndexEntry) -> Option<IndexEntry> {
        self.entries.insert(id, entry)
    }
}
