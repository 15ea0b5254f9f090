//! The live set of candidate words for each slot. Removals are recorded on a trail so that a
//! branch of the search can put back exactly what it (and everything it called) took away.

use bit_set::BitSet;
use std::fmt::{Debug, Formatter};

use crate::grid_config::SlotId;
use crate::word_list::WordId;

/// A position on the removal trail, returned by `Domains::checkpoint`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Checkpoint(usize);

#[derive(Clone)]
pub struct Domains {
    options: Vec<BitSet>,

    /// Cached `options[slot_id].len()`, which is otherwise a linear count.
    remaining_option_counts: Vec<usize>,

    /// Every (slot, word) removal since the last `commit`, oldest first.
    trail: Vec<(SlotId, WordId)>,
}

impl Debug for Domains {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Domains")
            .field("remaining_option_counts", &self.remaining_option_counts)
            .field("trail", &format!("({} removals)", self.trail.len()))
            .finish()
    }
}

impl Domains {
    /// Give each of `slot_count` slots every one of `word_count` words as a candidate.
    pub fn new(slot_count: usize, word_count: usize) -> Domains {
        Domains {
            options: (0..slot_count).map(|_| (0..word_count).collect()).collect(),
            remaining_option_counts: vec![word_count; slot_count],
            trail: vec![],
        }
    }

    pub fn len(&self, slot_id: SlotId) -> usize {
        self.remaining_option_counts[slot_id]
    }

    pub fn is_empty(&self, slot_id: SlotId) -> bool {
        self.remaining_option_counts[slot_id] == 0
    }

    /// Is any slot out of candidates?
    pub fn any_empty(&self) -> bool {
        self.remaining_option_counts.iter().any(|&count| count == 0)
    }

    /// The remaining candidates for a slot, in ascending id order.
    pub fn iter(&self, slot_id: SlotId) -> impl Iterator<Item = WordId> + '_ {
        self.options[slot_id].iter()
    }

    /// Remove a candidate, returning whether it was present.
    pub fn remove(&mut self, slot_id: SlotId, word_id: WordId) -> bool {
        if !self.options[slot_id].remove(word_id) {
            return false;
        }

        self.remaining_option_counts[slot_id] -= 1;
        self.trail.push((slot_id, word_id));
        true
    }

    /// Remove every candidate for which `keep` returns false, returning how many were removed.
    pub fn retain<F>(&mut self, slot_id: SlotId, mut keep: F) -> usize
    where
        F: FnMut(WordId) -> bool,
    {
        let doomed: Vec<WordId> = self.options[slot_id]
            .iter()
            .filter(|&word_id| !keep(word_id))
            .collect();

        for &word_id in &doomed {
            self.remove(slot_id, word_id);
        }

        doomed.len()
    }

    pub fn checkpoint(&self) -> Checkpoint {
        Checkpoint(self.trail.len())
    }

    /// Restore every candidate removed since `checkpoint` was taken.
    pub fn rollback(&mut self, checkpoint: Checkpoint) {
        while self.trail.len() > checkpoint.0 {
            if let Some((slot_id, word_id)) = self.trail.pop() {
                self.options[slot_id].insert(word_id);
                self.remaining_option_counts[slot_id] += 1;
            }
        }
    }

    /// Make all removals so far permanent; earlier checkpoints are invalidated.
    pub fn commit(&mut self) {
        self.trail.clear();
    }

    /// Copy out the candidates for every slot, for comparing states.
    pub fn snapshot(&self) -> Vec<Vec<WordId>> {
        self.options.iter().map(|options| options.iter().collect()).collect()
    }
}

#[cfg(test)]
mod tests {
    use crate::domains::Domains;

    #[test]
    fn test_starts_full() {
        let domains = Domains::new(2, 3);

        assert_eq!(domains.snapshot(), vec![vec![0, 1, 2], vec![0, 1, 2]]);
        assert_eq!(domains.len(1), 3);
        assert!(!domains.any_empty());
    }

    #[test]
    fn test_remove_and_retain_keep_counts() {
        let mut domains = Domains::new(2, 4);

        assert!(domains.remove(0, 2));
        assert!(!domains.remove(0, 2));
        assert_eq!(domains.retain(1, |word_id| word_id % 2 == 0), 2);

        assert_eq!(domains.snapshot(), vec![vec![0, 1, 3], vec![0, 2]]);
        assert_eq!((domains.len(0), domains.len(1)), (3, 2));
    }

    #[test]
    fn test_nested_rollback_is_exact() {
        let mut domains = Domains::new(3, 5);
        domains.remove(2, 4);

        let outer = domains.checkpoint();
        let before_outer = domains.snapshot();
        domains.retain(0, |word_id| word_id == 1);

        let inner = domains.checkpoint();
        let before_inner = domains.snapshot();
        domains.retain(1, |_| false);
        domains.remove(0, 1);
        assert!(domains.any_empty());

        domains.rollback(inner);
        assert_eq!(domains.snapshot(), before_inner);

        domains.rollback(outer);
        assert_eq!(domains.snapshot(), before_outer);
        assert_eq!(domains.len(0), 5);
        assert_eq!(domains.len(2), 4);
    }

    #[test]
    fn test_commit_makes_removals_permanent() {
        let mut domains = Domains::new(1, 3);
        domains.remove(0, 0);
        domains.commit();

        let checkpoint = domains.checkpoint();
        domains.remove(0, 1);
        domains.rollback(checkpoint);

        assert_eq!(domains.snapshot(), vec![vec![1, 2]]);
    }
}
