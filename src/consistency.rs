//! Node consistency and the AC-3 algorithm for arc consistency. For our purposes a grid is
//! arc-consistent when every word left in a slot's domain has, for each crossing slot, at least
//! one *different* word in that slot's domain with the same letter in the shared cell.

use log::debug;
use std::collections::{HashMap, HashSet, VecDeque};

use crate::domain::DomainStore;
use crate::puzzle::{PuzzleModel, SlotId};
use crate::vocabulary::{Vocabulary, WordId};

/// A directed constraint: make the first slot consistent with the second.
pub type DirectedArc = (SlotId, SlotId);

/// Result from a successful call to `enforce_arc_consistency`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArcConsistencySuccess {
    /// How many times `revise` ran.
    pub revisions: u64,
    /// How many words were removed across all slots.
    pub eliminations: u64,
}

/// Result from a failed call to `enforce_arc_consistency`, naming the slot whose domain was
/// wiped out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArcConsistencyFailure {
    pub slot_id: SlotId,
    pub revisions: u64,
}

pub type ArcConsistencyResult = Result<ArcConsistencySuccess, ArcConsistencyFailure>;

/// Remove every word whose length differs from its slot's. Returns whether anything was
/// removed; running it a second time never removes more.
pub fn enforce_node_consistency(
    model: &PuzzleModel,
    vocabulary: &Vocabulary,
    domains: &mut DomainStore,
) -> bool {
    let mut revised = false;

    for slot_config in model.slot_configs() {
        let length = slot_config.slot.length;
        revised |= domains.restrict(slot_config.id, |word_id| {
            vocabulary.word(word_id).len() == length
        });
    }

    revised
}

/// Make slot `x` arc-consistent with slot `y`: drop every word in `x` that no other word in `y`
/// agrees with at their shared cell. A pair that doesn't cross is left alone. Returns whether
/// `x`'s domain shrank.
pub fn revise(
    model: &PuzzleModel,
    vocabulary: &Vocabulary,
    domains: &mut DomainStore,
    x: SlotId,
    y: SlotId,
) -> bool {
    let Some((x_cell, y_cell)) = model.overlap(x, y) else {
        return false;
    };

    // For each letter `y` can put in the shared cell: how many of its words do so, and one of
    // them. A single supporter only counts if it isn't the word being checked.
    let mut support: HashMap<char, (usize, WordId)> = HashMap::new();
    for word_id in domains.domain(y) {
        if let Some(glyph) = vocabulary.word(word_id).char_at(y_cell) {
            support.entry(glyph).or_insert((0, word_id)).0 += 1;
        }
    }

    domains.restrict(x, |word_id| {
        vocabulary
            .word(word_id)
            .char_at(x_cell)
            .and_then(|glyph| support.get(&glyph))
            .map_or(false, |&(count, supporter)| count > 1 || supporter != word_id)
    })
}

/// Worklist of arcs still to be revised. An arc that is already waiting isn't queued twice.
#[derive(Debug)]
struct ConsistencyQueue {
    queue: VecDeque<DirectedArc>,
    queued: HashSet<DirectedArc>,
}

impl ConsistencyQueue {
    fn with_initial_queue<Items>(items: Items) -> ConsistencyQueue
    where
        Items: IntoIterator<Item = DirectedArc>,
    {
        let mut queue = ConsistencyQueue {
            queue: VecDeque::new(),
            queued: HashSet::new(),
        };
        for arc in items {
            queue.enqueue(arc);
        }
        queue
    }

    fn pop_front(&mut self) -> Option<DirectedArc> {
        let arc = self.queue.pop_front()?;
        self.queued.remove(&arc);
        Some(arc)
    }

    fn enqueue(&mut self, arc: DirectedArc) {
        if self.queued.insert(arc) {
            self.queue.push_back(arc);
        }
    }
}

/// AC-3. Starts from `arcs`, or from every arc in the puzzle if none are given. Whenever `x`
/// shrinks while being revised against `y`, every arc `(z, x)` with `z` another neighbor of `x`
/// is queued again, since `z` may have been relying on a word `x` just lost.
pub fn enforce_arc_consistency(
    model: &PuzzleModel,
    vocabulary: &Vocabulary,
    domains: &mut DomainStore,
    arcs: Option<Vec<DirectedArc>>,
) -> ArcConsistencyResult {
    let mut queue =
        ConsistencyQueue::with_initial_queue(arcs.unwrap_or_else(|| model.arcs()));
    let mut success = ArcConsistencySuccess::default();

    while let Some((x, y)) = queue.pop_front() {
        let before = domains.len(x);
        success.revisions += 1;

        if !revise(model, vocabulary, domains, x, y) {
            continue;
        }
        success.eliminations += (before - domains.len(x)) as u64;

        if domains.is_empty(x) {
            debug!("arc consistency wiped out slot {x} while revising against slot {y}");
            return Err(ArcConsistencyFailure {
                slot_id: x,
                revisions: success.revisions,
            });
        }

        for z in model.neighbors(x).iter().filter(|&z| z != y) {
            queue.enqueue((z, x));
        }
    }

    Ok(success)
}
