//! Identity set that admits each item id once per run.

use indexmap::IndexSet;

use crate::types::ItemId;

/// Tracks ids already admitted into a result set.
///
/// Membership is hash-based; admission order is retained so callers can report
/// which ids made it in and in what order.
#[derive(Clone, Debug, Default)]
pub struct Deduplicator {
    seen: IndexSet<ItemId>,
    rejected: usize,
}

impl Deduplicator {
    /// Create an empty deduplicator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Admit `id` if it has not been seen; returns `true` on first sight.
    pub fn is_new(&mut self, id: &str) -> bool {
        if self.seen.contains(id) {
            self.rejected = self.rejected.saturating_add(1);
            return false;
        }
        self.seen.insert(id.to_string());
        true
    }

    /// Returns `true` when `id` was already admitted, without side effects.
    pub fn contains(&self, id: &str) -> bool {
        self.seen.contains(id)
    }

    /// Number of admitted ids.
    pub fn len(&self) -> usize {
        self.seen.len()
    }

    /// Returns `true` when nothing has been admitted.
    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }

    /// Number of repeat submissions turned away.
    pub fn rejected(&self) -> usize {
        self.rejected
    }

    /// Admitted ids in admission order.
    pub fn admitted(&self) -> impl Iterator<Item = &str> {
        self.seen.iter().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_submission_of_an_id_is_rejected() {
        let mut dedup = Deduplicator::new();
        assert!(dedup.is_new("reddit_pcos"));
        assert!(!dedup.is_new("reddit_pcos"));
        assert!(dedup.is_new("facebook_pcos"));
        assert_eq!(dedup.len(), 2);
        assert_eq!(dedup.rejected(), 1);
    }

    #[test]
    fn contains_does_not_admit() {
        let mut dedup = Deduplicator::new();
        assert!(!dedup.contains("a"));
        assert!(dedup.is_empty());
        assert!(dedup.is_new("a"));
        assert!(dedup.contains("a"));
    }

    #[test]
    fn admission_order_is_kept() {
        let mut dedup = Deduplicator::new();
        for id in ["c", "a", "c", "b", "a"] {
            dedup.is_new(id);
        }
        let admitted: Vec<&str> = dedup.admitted().collect();
        assert_eq!(admitted, vec!["c", "a", "b"]);
        assert_eq!(dedup.rejected(), 2);
    }
}
