//! Per-slot candidate sets. Every removal is pushed onto an undo trail so search can try a
//! choice, prune around it, and put back exactly what it removed if the choice fails.

use bit_set::BitSet;

use crate::puzzle::SlotId;
use crate::vocabulary::WordId;

/// Position in the undo trail; see `DomainStore::checkpoint`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Checkpoint(usize);

#[derive(Debug, Clone)]
pub struct DomainStore {
    /// Indexed by slot id; each set holds the word ids still possible for that slot.
    domains: Vec<BitSet>,

    /// Cached `domains[slot_id].len()`, since `BitSet::len` has to count.
    option_counts: Vec<usize>,

    /// Every (slot, word) removal made since the last `commit`, oldest first.
    trail: Vec<(SlotId, WordId)>,
}

impl DomainStore {
    /// Start every slot off with the whole vocabulary.
    pub fn new(slot_count: usize, word_count: usize) -> DomainStore {
        let full: BitSet = (0..word_count).collect();

        DomainStore {
            domains: vec![full; slot_count],
            option_counts: vec![word_count; slot_count],
            trail: vec![],
        }
    }

    /// Word ids remaining for this slot, in ascending order.
    pub fn domain(&self, slot_id: SlotId) -> impl Iterator<Item = WordId> + '_ {
        self.domains[slot_id].iter()
    }

    pub fn len(&self, slot_id: SlotId) -> usize {
        self.option_counts[slot_id]
    }

    pub fn is_empty(&self, slot_id: SlotId) -> bool {
        self.option_counts[slot_id] == 0
    }

    pub fn contains(&self, slot_id: SlotId, word_id: WordId) -> bool {
        self.domains[slot_id].contains(word_id)
    }

    pub fn remove(&mut self, slot_id: SlotId, word_id: WordId) -> bool {
        if !self.domains[slot_id].remove(word_id) {
            return false;
        }
        self.option_counts[slot_id] -= 1;
        self.trail.push((slot_id, word_id));
        true
    }

    /// Remove every word for which `keep` returns false. Returns whether anything was removed.
    pub fn restrict<P>(&mut self, slot_id: SlotId, mut keep: P) -> bool
    where
        P: FnMut(WordId) -> bool,
    {
        let doomed: Vec<WordId> = self.domains[slot_id].iter().filter(|&w| !keep(w)).collect();

        for &word_id in &doomed {
            self.remove(slot_id, word_id);
        }

        !doomed.is_empty()
    }

    /// Narrow the slot down to a single word.
    pub fn set(&mut self, slot_id: SlotId, word_id: WordId) -> bool {
        self.restrict(slot_id, |w| w == word_id)
    }

    pub fn clear(&mut self, slot_id: SlotId) -> bool {
        self.restrict(slot_id, |_| false)
    }

    pub fn checkpoint(&self) -> Checkpoint {
        Checkpoint(self.trail.len())
    }

    /// Reinsert every word removed since `checkpoint`, newest first.
    pub fn rollback(&mut self, checkpoint: Checkpoint) {
        while self.trail.len() > checkpoint.0 {
            if let Some((slot_id, word_id)) = self.trail.pop() {
                self.domains[slot_id].insert(word_id);
                self.option_counts[slot_id] += 1;
            }
        }
    }

    /// Forget the undo trail. Removals made so far become permanent, and any checkpoint taken
    /// before this call is no longer meaningful.
    pub fn commit(&mut self) {
        self.trail.clear();
    }

    /// A plain copy of every slot's remaining word ids.
    pub fn snapshot(&self) -> Vec<Vec<WordId>> {
        self.domains.iter().map(|domain| domain.iter().collect()).collect()
    }
}
