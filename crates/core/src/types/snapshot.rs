//! Point-in-time copies of on-chain lists.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A wholesale copy of a list read from the contract.
///
/// Snapshots are replaced on every refresh, never patched in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot<T> {
    entries: Vec<T>,
    fetched_at: DateTime<Utc>,
}

impl<T> Snapshot<T> {
    /// Wrap freshly fetched entries, stamped with the current time.
    #[must_use]
    pub fn new(entries: Vec<T>) -> Self {
        Self {
            entries,
            fetched_at: Utc::now(),
        }
    }

    /// Entries in contract order.
    #[must_use]
    pub fn entries(&self) -> &[T] {
        &self.entries
    }

    /// When the snapshot was taken.
    #[must_use]
    pub const fn fetched_at(&self) -> DateTime<Utc> {
        self.fetched_at
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the snapshot has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Find the first entry matching `predicate`.
    pub fn find(&self, predicate: impl FnMut(&&T) -> bool) -> Option<&T> {
        self.entries.iter().find(predicate)
    }
}

impl<'a, T> IntoIterator for &'a Snapshot<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find() {
        let snapshot = Snapshot::new(vec![1, 2, 3]);
        assert_eq!(snapshot.find(|n| **n == 2), Some(&2));
        assert_eq!(snapshot.find(|n| **n == 9), None);
        assert_eq!(snapshot.len(), 3);
    }

    #[test]
    fn test_replaced_not_patched() {
        let first = Snapshot::new(vec!["a"]);
        let second = Snapshot::new(vec!["b", "c"]);
        assert!(second.fetched_at() >= first.fetched_at());
        assert_eq!(first.entries(), ["a"]);
    }
}
