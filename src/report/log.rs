use std::collections::{BTreeMap, BTreeSet};

use super::codes::ErrorCode;

/// Error records grouped by code.
///
/// Codes iterate in ascending numeric order; records under one code keep
/// their insertion order.
#[derive(Debug, Clone)]
pub struct ErrorLog<R> {
    entries: BTreeMap<ErrorCode, Vec<R>>,
}

impl<R> Default for ErrorLog<R> {
    fn default() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }
}

impl<R> ErrorLog<R> {
    /// Creates an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a record to the bucket for `code`.
    pub fn push(&mut self, code: ErrorCode, record: R) {
        self.entries.entry(code).or_default().push(record);
    }

    /// Records logged under `code`, in insertion order.
    #[must_use]
    pub fn records(&self, code: ErrorCode) -> &[R] {
        self.entries
            .get(&code)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// All records, grouped by ascending code.
    pub fn iter(&self) -> impl Iterator<Item = (ErrorCode, &R)> {
        self.entries
            .iter()
            .flat_map(|(&code, records)| records.iter().map(move |r| (code, r)))
    }

    /// The distinct codes present in the log.
    #[must_use]
    pub fn codes(&self) -> BTreeSet<ErrorCode> {
        self.entries.keys().copied().collect()
    }

    /// Whether any record was logged under `code`.
    #[must_use]
    pub fn contains(&self, code: ErrorCode) -> bool {
        self.entries.contains_key(&code)
    }

    /// Total number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Removes every record.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// A solid-level record naming the pair of shells involved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellPairRecord {
    pub shell_a: Option<usize>,
    pub shell_b: Option<usize>,
    pub info: String,
}

/// A shell-level record naming the offending face.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FaceRecord {
    pub face: Option<usize>,
    pub info: String,
}

/// Renders an optional index the way reports expect, `-1` meaning "none".
#[must_use]
pub fn index_label(index: Option<usize>) -> String {
    index.map_or_else(|| "-1".to_string(), |i| i.to_string())
}
