//! Depth-first backtracking search over partial assignments. Slots are picked by fewest
//! remaining options (ties go to the slot crossing the most others), and each slot's options
//! are tried least-constraining first.

use instant::{Duration, Instant};
use log::{debug, info, trace};
use rayon::prelude::*;
use smallvec::SmallVec;
use std::cmp::Reverse;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use crate::assignment::Assignment;
use crate::consistency::{
    enforce_arc_consistency, enforce_node_consistency, ArcConsistencyFailure,
    ArcConsistencySuccess, DirectedArc,
};
use crate::domain::DomainStore;
use crate::puzzle::{PuzzleModel, SlotId};
use crate::vocabulary::{Vocabulary, WordId};
use crate::{INTERRUPT_FREQUENCY, MAX_SLOT_LENGTH};

/// When arc consistency is enforced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Propagation {
    /// Once, before search starts.
    #[default]
    Preprocess,

    /// Before search starts and again after every tentative choice, undoing the pruning when
    /// the choice is abandoned.
    Maintain,
}

/// Knobs for a single call to `solve`.
#[derive(Debug, Clone, Default)]
pub struct SolveOptions {
    pub propagation: Propagation,

    /// Explore the first slot's options on separate threads. The result is the same one a
    /// sequential search would return.
    pub parallel: bool,

    /// Checked every `INTERRUPT_FREQUENCY` states; once set, the search gives up.
    pub abort: Option<Arc<AtomicBool>>,

    /// Give up once this much time has passed since the call started.
    pub time_limit: Option<Duration>,
}

/// A struct tracking statistics about the filling process.
#[derive(Debug, Clone, Default)]
pub struct Statistics {
    pub states: u64,
    pub backtracks: u64,
    pub revisions: u64,
    pub initial_arc_consistency_time: Duration,
    pub duration: Duration,
}

impl Statistics {
    fn absorb(&mut self, other: &Statistics) {
        self.states += other.states;
        self.backtracks += other.backtracks;
        self.revisions += other.revisions;
    }
}

/// A struct representing the results of a successful fill operation.
#[derive(Debug)]
pub struct FillSuccess {
    pub statistics: Statistics,
    pub assignment: Assignment,
}

/// Why `solve` didn't return an assignment. `NoSolution` is an ordinary answer: the search
/// space was exhausted (or arc consistency proved it empty up front).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FillFailure {
    NoSolution,
    Abort,
    Timeout,
}

/// A parallel branch's position among its siblings. `settled` holds the lowest sibling index
/// whose outcome is already known; any branch after it can no longer be the answer.
#[derive(Debug, Clone)]
struct SiblingCutoff {
    index: usize,
    settled: Arc<AtomicUsize>,
}

impl SiblingCutoff {
    fn is_superseded(&self) -> bool {
        self.settled.load(Ordering::Relaxed) < self.index
    }
}

/// Live state of one search. Parallel branches each get their own copy.
#[derive(Clone)]
struct Search<'a> {
    model: &'a PuzzleModel,
    vocabulary: &'a Vocabulary,
    options: &'a SolveOptions,
    deadline: Option<Instant>,
    domains: DomainStore,
    assignment: Assignment,
    statistics: Statistics,
    cutoff: Option<SiblingCutoff>,
}

impl<'a> Search<'a> {
    fn new(
        model: &'a PuzzleModel,
        vocabulary: &'a Vocabulary,
        options: &'a SolveOptions,
        start: Instant,
    ) -> Search<'a> {
        Search {
            model,
            vocabulary,
            options,
            deadline: options.time_limit.map(|time_limit| start + time_limit),
            domains: DomainStore::new(model.slot_count(), vocabulary.len()),
            assignment: Assignment::new(model.slot_count()),
            statistics: Statistics::default(),
            cutoff: None,
        }
    }

    /// Node consistency followed by a full AC-3 pass. Any empty domain at this point means
    /// there's nothing to search.
    fn preprocess(&mut self) -> Result<(), FillFailure> {
        let start = Instant::now();

        enforce_node_consistency(self.model, self.vocabulary, &mut self.domains);
        if let Some(slot_id) =
            (0..self.model.slot_count()).find(|&slot_id| self.domains.is_empty(slot_id))
        {
            info!("no words fit the {}", self.model.slot(slot_id));
            return Err(FillFailure::NoSolution);
        }

        let result = enforce_arc_consistency(self.model, self.vocabulary, &mut self.domains, None);
        self.statistics.initial_arc_consistency_time = start.elapsed();

        match result {
            Ok(ArcConsistencySuccess { revisions, eliminations }) => {
                self.statistics.revisions += revisions;
                info!(
                    "initial arc consistency removed {} options in {:?}",
                    eliminations, self.statistics.initial_arc_consistency_time
                );
            }
            Err(ArcConsistencyFailure { slot_id, revisions }) => {
                self.statistics.revisions += revisions;
                info!("initial arc consistency emptied the {}", self.model.slot(slot_id));
                return Err(FillFailure::NoSolution);
            }
        }

        // Nothing above this point will ever need to be undone.
        self.domains.commit();
        Ok(())
    }

    fn check_interrupt(&self) -> Result<(), FillFailure> {
        if self.statistics.states % INTERRUPT_FREQUENCY != 0 {
            return Ok(());
        }
        if let Some(abort) = &self.options.abort {
            if abort.load(Ordering::Relaxed) {
                debug!("aborting after {} states", self.statistics.states);
                return Err(FillFailure::Abort);
            }
        }
        if let Some(cutoff) = &self.cutoff {
            if cutoff.is_superseded() {
                debug!(
                    "dropping branch {} after {} states",
                    cutoff.index, self.statistics.states
                );
                return Err(FillFailure::Abort);
            }
        }
        if let Some(deadline) = self.deadline {
            if Instant::now() >= deadline {
                debug!("timed out after {} states", self.statistics.states);
                return Err(FillFailure::Timeout);
            }
        }
        Ok(())
    }

    /// Pick the unassigned slot with the fewest remaining options, preferring the slot with
    /// more crossings on a tie and the lower id after that. `None` means every slot is filled.
    fn select_unassigned_slot(&self) -> Option<SlotId> {
        (0..self.model.slot_count())
            .filter(|&slot_id| !self.assignment.is_assigned(slot_id))
            .min_by_key(|&slot_id| {
                (
                    self.domains.len(slot_id),
                    Reverse(self.model.degree(slot_id)),
                    slot_id,
                )
            })
    }

    /// Return the slot's options ordered by how many words each would rule out of the
    /// unassigned crossing slots, fewest first; ties keep vocabulary order.
    fn order_domain_values(&self, slot_id: SlotId) -> Vec<WordId> {
        // For each crossing into an unassigned slot: our cell index, the size of the crossing
        // slot's domain, and how many of its words put each letter in the shared cell.
        let letter_counts: SmallVec<[(usize, usize, HashMap<char, usize>); MAX_SLOT_LENGTH]> =
            self.model
                .crossings(slot_id)
                .iter()
                .enumerate()
                .filter_map(|(cell_idx, crossing_opt)| {
                    let crossing = crossing_opt.as_ref()?;
                    if self.assignment.is_assigned(crossing.other_slot_id) {
                        return None;
                    }

                    let mut counts: HashMap<char, usize> = HashMap::new();
                    for word_id in self.domains.domain(crossing.other_slot_id) {
                        if let Some(glyph) =
                            self.vocabulary.word(word_id).char_at(crossing.other_slot_cell)
                        {
                            *counts.entry(glyph).or_insert(0) += 1;
                        }
                    }

                    Some((cell_idx, self.domains.len(crossing.other_slot_id), counts))
                })
                .collect();

        let mut options: Vec<WordId> = self.domains.domain(slot_id).collect();
        options.sort_by_cached_key(|&word_id| {
            let word = self.vocabulary.word(word_id);
            let ruled_out: usize = letter_counts
                .iter()
                .map(|(cell_idx, total, counts)| {
                    let compatible = word
                        .char_at(*cell_idx)
                        .and_then(|glyph| counts.get(&glyph))
                        .copied()
                        .unwrap_or(0);
                    total - compatible
                })
                .sum();
            (ruled_out, word_id)
        });
        options
    }

    /// Would placing this word keep the assignment valid with respect to the slots that are
    /// already filled? Unfilled crossings are checked when their turn comes.
    fn is_consistent(&self, slot_id: SlotId, word_id: WordId) -> bool {
        let word = self.vocabulary.word(word_id);

        if word.len() != self.model.slot(slot_id).length {
            return false;
        }
        if self.assignment.contains_word(word_id) {
            return false;
        }

        self.model
            .crossings(slot_id)
            .iter()
            .enumerate()
            .all(|(cell_idx, crossing_opt)| {
                let Some(crossing) = crossing_opt else { return true };
                match self.assignment.get(crossing.other_slot_id) {
                    Some(other_word_id) => {
                        word.char_at(cell_idx)
                            == self
                                .vocabulary
                                .word(other_word_id)
                                .char_at(crossing.other_slot_cell)
                    }
                    None => true,
                }
            })
    }

    /// With `Propagation::Maintain`, prune the consequences of the choice just made from the
    /// domains of the other slots. Returns false if that empties any of them.
    fn propagate(&mut self, slot_id: SlotId, word_id: WordId) -> bool {
        if self.options.propagation != Propagation::Maintain {
            return true;
        }

        let mut changed: Vec<SlotId> = vec![];

        if self.domains.set(slot_id, word_id) {
            changed.push(slot_id);
        }

        // The word is now taken everywhere else.
        for other_slot_id in 0..self.model.slot_count() {
            if other_slot_id == slot_id || self.assignment.is_assigned(other_slot_id) {
                continue;
            }
            if self.domains.remove(other_slot_id, word_id) {
                if self.domains.is_empty(other_slot_id) {
                    return false;
                }
                changed.push(other_slot_id);
            }
        }

        let model = self.model;
        let assignment = &self.assignment;
        let arcs: Vec<DirectedArc> = changed
            .iter()
            .flat_map(move |&x| {
                model
                    .neighbors(x)
                    .iter()
                    .filter(move |&z| !assignment.is_assigned(z))
                    .map(move |z| (z, x))
            })
            .collect();
        if arcs.is_empty() {
            return true;
        }

        match enforce_arc_consistency(self.model, self.vocabulary, &mut self.domains, Some(arcs)) {
            Ok(success) => {
                self.statistics.revisions += success.revisions;
                true
            }
            Err(failure) => {
                self.statistics.revisions += failure.revisions;
                false
            }
        }
    }

    /// Try one word for one slot: check it, place it, propagate, and recurse. On failure the
    /// assignment and domains are put back exactly as they were. `Ok(false)` means this word
    /// leads nowhere.
    fn try_choice(&mut self, slot_id: SlotId, word_id: WordId) -> Result<bool, FillFailure> {
        if !self.is_consistent(slot_id, word_id) {
            return Ok(false);
        }

        trace!(
            "trying {} in the {}",
            self.vocabulary.word(word_id).string,
            self.model.slot(slot_id)
        );

        let checkpoint = self.domains.checkpoint();
        self.assignment.assign(slot_id, word_id);

        if self.propagate(slot_id, word_id) && self.backtrack()? {
            return Ok(true);
        }

        self.statistics.backtracks += 1;
        debug!(
            "backtracking from {} in the {}",
            self.vocabulary.word(word_id).string,
            self.model.slot(slot_id)
        );
        self.assignment.unassign(slot_id);
        self.domains.rollback(checkpoint);
        Ok(false)
    }

    /// Extend the current assignment to a complete one. `Ok(false)` means no extension exists
    /// and the caller should undo its own choice.
    fn backtrack(&mut self) -> Result<bool, FillFailure> {
        self.check_interrupt()?;
        self.statistics.states += 1;

        let Some(slot_id) = self.select_unassigned_slot() else {
            return Ok(true);
        };

        for word_id in self.order_domain_values(slot_id) {
            if self.try_choice(slot_id, word_id)? {
                return Ok(true);
            }
        }

        Ok(false)
    }

    /// Like `backtrack`, but each option for the first slot is explored in its own copy of the
    /// search state. The earliest option (in value order) that succeeds wins, so this returns
    /// the same assignment as the sequential search. Once a branch settles, every branch after
    /// it stops at its next interrupt check. Statistics only cover the winning branch.
    fn backtrack_parallel(&mut self) -> Result<bool, FillFailure> {
        self.check_interrupt()?;
        self.statistics.states += 1;

        let Some(slot_id) = self.select_unassigned_slot() else {
            return Ok(true);
        };

        let candidates = self.order_domain_values(slot_id);
        let root: &Search<'a> = self;

        let settled = Arc::new(AtomicUsize::new(usize::MAX));

        let outcome = candidates.par_iter().enumerate().find_map_first(|(index, &word_id)| {
            let mut branch = root.clone();
            branch.statistics = Statistics::default();
            branch.cutoff = Some(SiblingCutoff {
                index,
                settled: settled.clone(),
            });

            let outcome = match branch.try_choice(slot_id, word_id) {
                Ok(true) => Some(Ok(branch)),
                Ok(false) => None,
                Err(failure) => Some(Err(failure)),
            };
            if outcome.is_some() {
                settled.fetch_min(index, Ordering::Relaxed);
            }
            outcome
        });

        match outcome {
            Some(Ok(branch)) => {
                self.statistics.absorb(&branch.statistics);
                self.domains = branch.domains;
                self.assignment = branch.assignment;
                Ok(true)
            }
            Some(Err(failure)) => Err(failure),
            None => Ok(false),
        }
    }
}

/// Find an assignment of words to every slot such that lengths match, no word repeats, and
/// crossing slots agree on their shared letter. Returns the first such assignment the search
/// reaches, or `FillFailure::NoSolution` if there isn't one.
pub fn solve(
    model: &PuzzleModel,
    vocabulary: &Vocabulary,
    options: &SolveOptions,
) -> Result<FillSuccess, FillFailure> {
    let start = Instant::now();

    info!(
        "solving {} slots with {} words ({:?}{})",
        model.slot_count(),
        vocabulary.len(),
        options.propagation,
        if options.parallel { ", parallel" } else { "" }
    );

    let mut search = Search::new(model, vocabulary, options, start);
    search.preprocess()?;

    let found = if options.parallel {
        search.backtrack_parallel()?
    } else {
        search.backtrack()?
    };

    search.statistics.duration = start.elapsed();
    info!("{:?}", search.statistics);

    if !found {
        return Err(FillFailure::NoSolution);
    }

    Ok(FillSuccess {
        statistics: search.statistics,
        assignment: search.assignment,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assignment::verify_assignment;
    use crate::puzzle::Direction::{Across, Down};
    use crate::puzzle::Slot;

    fn all_modes() -> Vec<SolveOptions> {
        vec![
            SolveOptions::default(),
            SolveOptions {
                propagation: Propagation::Maintain,
                ..SolveOptions::default()
            },
            SolveOptions {
                parallel: true,
                ..SolveOptions::default()
            },
            SolveOptions {
                propagation: Propagation::Maintain,
                parallel: true,
                ..SolveOptions::default()
            },
        ]
    }

    fn words_by_slot(
        model: &PuzzleModel,
        vocabulary: &Vocabulary,
        assignment: &Assignment,
    ) -> Vec<String> {
        (0..model.slot_count())
            .map(|slot_id| assignment.word(slot_id, vocabulary).unwrap_or("").to_string())
            .collect()
    }

    /// ###
    /// ...
    /// #.#
    /// #.#
    fn crossing_pair() -> PuzzleModel {
        PuzzleModel::from_slots(3, 4, &[Slot::new(1, 0, Across, 3), Slot::new(1, 1, Down, 3)])
            .unwrap()
    }

    /// #___#
    /// #_##_
    /// #_##_
    /// #_##_
    /// #____
    fn cs_structure() -> PuzzleModel {
        PuzzleModel::from_slots(
            5,
            5,
            &[
                Slot::new(0, 1, Across, 3),
                Slot::new(0, 1, Down, 5),
                Slot::new(1, 4, Down, 4),
                Slot::new(4, 1, Across, 4),
            ],
        )
        .unwrap()
    }

    fn number_words() -> Vocabulary {
        Vocabulary::new([
            "ONE", "TWO", "THREE", "FOUR", "FIVE", "SIX", "SEVEN", "EIGHT", "NINE", "TEN",
        ])
    }

    #[test]
    fn test_crossing_pair_is_solved() {
        let model = crossing_pair();
        let vocabulary = Vocabulary::new(["CAT", "COG", "ACE"]);

        for options in all_modes() {
            let result = solve(&model, &vocabulary, &options).expect("Failed to find a fill");

            verify_assignment(&model, &vocabulary, &result.assignment).unwrap();
            assert_eq!(words_by_slot(&model, &vocabulary, &result.assignment), vec!["ACE", "CAT"]);
        }
    }

    #[test]
    fn test_crossing_pair_without_shared_letter_is_unsatisfiable() {
        let model = crossing_pair();
        let vocabulary = Vocabulary::new(["CAT", "DOG"]);

        for options in all_modes() {
            assert_eq!(
                solve(&model, &vocabulary, &options).unwrap_err(),
                FillFailure::NoSolution
            );
        }
    }

    #[test]
    fn test_words_cannot_repeat() {
        // ...
        // ###
        // ...
        let model =
            PuzzleModel::from_slots(3, 3, &[Slot::new(0, 0, Across, 3), Slot::new(2, 0, Across, 3)])
                .unwrap();

        for options in all_modes() {
            assert_eq!(
                solve(&model, &Vocabulary::new(["CAT"]), &options).unwrap_err(),
                FillFailure::NoSolution
            );

            let result = solve(&model, &Vocabulary::new(["CAT", "DOG"]), &options).unwrap();
            verify_assignment(&model, &Vocabulary::new(["CAT", "DOG"]), &result.assignment)
                .unwrap();
        }
    }

    #[test]
    fn test_unique_solution_is_found() {
        let model = cs_structure();
        let vocabulary = number_words();

        for options in all_modes() {
            let result = solve(&model, &vocabulary, &options).expect("Failed to find a fill");

            assert_eq!(
                words_by_slot(&model, &vocabulary, &result.assignment),
                vec!["SIX", "SEVEN", "FIVE", "NINE"]
            );
        }
    }

    #[test]
    fn test_missing_length_short_circuits() {
        let model = cs_structure();
        let vocabulary = Vocabulary::new(["ONE", "TWO", "FOUR", "FIVE"]);

        assert_eq!(
            solve(&model, &vocabulary, &SolveOptions::default()).unwrap_err(),
            FillFailure::NoSolution
        );
    }

    /// A 2x2 block: every row and every column is a word.
    #[test]
    fn test_search_backtracks_past_dead_ends() {
        let model = PuzzleModel::from_structure(vec![vec![true; 2]; 2]).unwrap();
        let vocabulary = Vocabulary::new(["AB", "AC", "BD", "CD", "AA", "BB", "DA", "CA"]);

        for options in all_modes() {
            let result = solve(&model, &vocabulary, &options).expect("Failed to find a fill");
            verify_assignment(&model, &vocabulary, &result.assignment).unwrap();
        }
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let model = PuzzleModel::from_structure(vec![vec![true; 3]; 3]).unwrap();
        let vocabulary = Vocabulary::new([
            "BAT", "ARE", "TEN", "BAN", "ATE", "TEA", "EAT", "NET", "ANT", "TAN", "BET", "ERA",
            "RAT", "TAR", "ART", "NAB", "TAB", "BEN", "RAN", "NEB",
        ]);

        for propagation in [Propagation::Preprocess, Propagation::Maintain] {
            let sequential = solve(
                &model,
                &vocabulary,
                &SolveOptions { propagation, ..SolveOptions::default() },
            );
            let parallel = solve(
                &model,
                &vocabulary,
                &SolveOptions { propagation, parallel: true, ..SolveOptions::default() },
            );

            match (sequential, parallel) {
                (Ok(sequential), Ok(parallel)) => {
                    verify_assignment(&model, &vocabulary, &sequential.assignment).unwrap();
                    assert_eq!(sequential.assignment.choices(), parallel.assignment.choices());
                }
                (Err(sequential), Err(parallel)) => assert_eq!(sequential, parallel),
                (sequential, parallel) => {
                    panic!("modes disagree: {:?} vs {:?}", sequential.is_ok(), parallel.is_ok())
                }
            }
        }
    }

    /// Eight separate three-letter slots but only seven words. Arc consistency has nothing to
    /// work with, so proving there's no fill means trying every ordering.
    fn pigeonhole() -> (PuzzleModel, Vocabulary) {
        let slots: Vec<Slot> = (0..8).map(|idx| Slot::new(2 * idx, 0, Across, 3)).collect();
        let model = PuzzleModel::from_slots(3, 15, &slots).unwrap();
        let vocabulary = Vocabulary::new(["ACE", "BAT", "CAT", "DOG", "EMU", "FOX", "GNU"]);
        (model, vocabulary)
    }

    #[test]
    fn test_settled_sibling_stops_later_branches() {
        let (model, vocabulary) = pigeonhole();
        let options = SolveOptions::default();
        let mut root = Search::new(&model, &vocabulary, &options, Instant::now());
        root.preprocess().unwrap();

        let mut unchecked = root.clone();
        assert_eq!(unchecked.backtrack(), Ok(false));
        assert!(unchecked.statistics.states > 1000);

        // Sibling 0 has already found a fill, so sibling 1's dead end isn't worth exploring.
        let settled = Arc::new(AtomicUsize::new(0));
        let mut later = root.clone();
        later.cutoff = Some(SiblingCutoff {
            index: 1,
            settled: settled.clone(),
        });
        assert_eq!(later.backtrack(), Err(FillFailure::Abort));
        assert!(later.statistics.states <= INTERRUPT_FREQUENCY);

        // The settled branch itself and anything before it keep going.
        let mut earlier = root.clone();
        earlier.cutoff = Some(SiblingCutoff { index: 0, settled });
        assert_eq!(earlier.backtrack(), Ok(false));
        assert_eq!(earlier.statistics.states, unchecked.statistics.states);
    }

    /// A four-letter top entry with a two-letter down slot through its second cell, then six
    /// four-letter rows that each need an A-word because of the two-letter tab hanging off their
    /// first cell.
    #[test]
    fn test_parallel_search_skips_dead_siblings() {
        let mut slots = vec![Slot::new(0, 0, Across, 4), Slot::new(0, 1, Down, 2)];
        for idx in 0..6 {
            slots.push(Slot::new(3 + 3 * idx, 0, Across, 4));
            slots.push(Slot::new(3 + 3 * idx, 0, Down, 2));
        }
        let model = PuzzleModel::from_slots(4, 20, &slots).unwrap();
        let vocabulary = Vocabulary::new([
            "ZERO", "AXLE", "ABLE", "ACHE", "AMID", "ARCH", "AUNT", "EX", "XI", "AA", "AB", "AD",
            "AE", "AG", "AH",
        ]);

        // ZERO comes first and fills at once. AXLE takes one of the six A-words the rows need,
        // which only shows after every way of filling the rows and tabs has been tried.
        let sequential = solve(&model, &vocabulary, &SolveOptions::default()).unwrap();
        assert_eq!(sequential.assignment.word(0, &vocabulary), Some("ZERO"));

        for propagation in [Propagation::Preprocess, Propagation::Maintain] {
            let parallel = solve(
                &model,
                &vocabulary,
                &SolveOptions { propagation, parallel: true, ..SolveOptions::default() },
            )
            .expect("Failed to find a fill");

            verify_assignment(&model, &vocabulary, &parallel.assignment).unwrap();
            assert_eq!(parallel.assignment.word(0, &vocabulary), Some("ZERO"));
        }
        let parallel = solve(
            &model,
            &vocabulary,
            &SolveOptions { parallel: true, ..SolveOptions::default() },
        )
        .unwrap();
        assert_eq!(sequential.assignment.choices(), parallel.assignment.choices());
    }

    #[test]
    fn test_value_order_prefers_least_constraining_word() {
        let model = crossing_pair();
        let vocabulary = Vocabulary::new(["CAT", "COG", "ACE"]);
        let options = SolveOptions::default();
        let mut search = Search::new(&model, &vocabulary, &options, Instant::now());
        search.preprocess().unwrap();

        // After arc consistency the across slot has two options and goes first.
        assert_eq!(search.select_unassigned_slot(), Some(0));

        // "ACE" leaves "CAT" and "COG" open below; "CAT" would leave only "ACE".
        let ordered: Vec<&str> = search
            .order_domain_values(0)
            .into_iter()
            .map(|word_id| vocabulary.word(word_id).string.as_str())
            .collect();
        assert_eq!(ordered, vec!["ACE", "CAT"]);
    }

    #[test]
    fn test_slot_selection_breaks_ties_by_degree() {
        // .....
        // #.#.#
        // #.#.#
        let model = PuzzleModel::from_slots(
            5,
            3,
            &[
                Slot::new(0, 0, Across, 5),
                Slot::new(0, 1, Down, 3),
                Slot::new(0, 3, Down, 3),
            ],
        )
        .unwrap();
        let vocabulary = Vocabulary::new(["AAAAA", "BBBBB", "AAA", "BBB"]);
        let options = SolveOptions::default();
        let mut search = Search::new(&model, &vocabulary, &options, Instant::now());
        enforce_node_consistency(&model, &vocabulary, &mut search.domains);

        // Every slot has two options, but the across slot crosses both others.
        assert_eq!(search.select_unassigned_slot(), Some(0));

        search.assignment.assign(0, 0);
        assert_eq!(search.select_unassigned_slot(), Some(1));
    }

    #[test]
    fn test_maintained_propagation_restores_domains_on_backtrack() {
        let model = PuzzleModel::from_structure(vec![vec![true; 2]; 2]).unwrap();
        let vocabulary = Vocabulary::new(["AB", "AC", "BD", "CD", "AA", "BB", "DA", "CA"]);
        let options = SolveOptions {
            propagation: Propagation::Maintain,
            ..SolveOptions::default()
        };
        let mut search = Search::new(&model, &vocabulary, &options, Instant::now());
        search.preprocess().unwrap();
        let before = search.domains.snapshot();

        for slot_id in 0..model.slot_count() {
            for word_id in search.domains.domain(slot_id).collect::<Vec<_>>() {
                let checkpoint = search.domains.checkpoint();
                search.assignment.assign(slot_id, word_id);
                search.propagate(slot_id, word_id);
                search.assignment.unassign(slot_id);
                search.domains.rollback(checkpoint);

                assert_eq!(search.domains.snapshot(), before);
            }
        }
    }

    #[test]
    fn test_abort_and_timeout() {
        let model = cs_structure();
        let vocabulary = number_words();

        let abort = Arc::new(AtomicBool::new(true));
        let options = SolveOptions {
            abort: Some(abort.clone()),
            ..SolveOptions::default()
        };
        assert_eq!(solve(&model, &vocabulary, &options).unwrap_err(), FillFailure::Abort);

        abort.store(false, Ordering::Relaxed);
        assert!(solve(&model, &vocabulary, &options).is_ok());

        let options = SolveOptions {
            time_limit: Some(Duration::ZERO),
            ..SolveOptions::default()
        };
        assert_eq!(solve(&model, &vocabulary, &options).unwrap_err(), FillFailure::Timeout);
    }

    #[test]
    fn test_empty_puzzle_is_trivially_solved() {
        let model = PuzzleModel::from_structure(vec![vec![false; 3]; 3]).unwrap();
        let result = solve(&model, &Vocabulary::new(["CAT"]), &SolveOptions::default()).unwrap();

        assert!(result.assignment.is_empty());
        assert!(result.assignment.is_complete());
    }
}
