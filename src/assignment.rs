use bit_set::BitSet;
use std::collections::BTreeMap;
use thiserror::Error;

use crate::puzzle::{PuzzleModel, Slot, SlotId};
use crate::vocabulary::{Vocabulary, WordId};

/// A struct recording a slot assignment made during the filling process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Choice {
    pub slot_id: SlotId,
    pub word_id: WordId,
}

/// A partial or complete mapping from slots to words.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    /// Indexed by slot id.
    words: Vec<Option<WordId>>,

    /// Word ids currently placed anywhere, for the all-distinct rule.
    used_words: BitSet,
}

impl Assignment {
    pub fn new(slot_count: usize) -> Assignment {
        Assignment {
            words: vec![None; slot_count],
            used_words: BitSet::new(),
        }
    }

    pub fn get(&self, slot_id: SlotId) -> Option<WordId> {
        self.words[slot_id]
    }

    pub fn is_assigned(&self, slot_id: SlotId) -> bool {
        self.words[slot_id].is_some()
    }

    pub fn contains_word(&self, word_id: WordId) -> bool {
        self.used_words.contains(word_id)
    }

    pub fn assign(&mut self, slot_id: SlotId, word_id: WordId) {
        self.unassign(slot_id);
        self.words[slot_id] = Some(word_id);
        self.used_words.insert(word_id);
    }

    pub fn unassign(&mut self, slot_id: SlotId) {
        if let Some(word_id) = self.words[slot_id].take() {
            self.used_words.remove(word_id);
        }
    }

    /// Number of slots that currently have a word.
    pub fn len(&self) -> usize {
        self.words.iter().filter(|word| word.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.words.iter().all(Option::is_none)
    }

    pub fn is_complete(&self) -> bool {
        self.words.iter().all(Option::is_some)
    }

    /// Assigned (slot, word) pairs in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (SlotId, WordId)> + '_ {
        self.words
            .iter()
            .enumerate()
            .filter_map(|(slot_id, word)| word.map(|word_id| (slot_id, word_id)))
    }

    pub fn choices(&self) -> Vec<Choice> {
        self.iter()
            .map(|(slot_id, word_id)| Choice { slot_id, word_id })
            .collect()
    }

    pub fn word<'a>(&self, slot_id: SlotId, vocabulary: &'a Vocabulary) -> Option<&'a str> {
        self.words[slot_id].map(|word_id| vocabulary.word(word_id).string.as_str())
    }

    pub fn to_map(&self, model: &PuzzleModel, vocabulary: &Vocabulary) -> BTreeMap<Slot, String> {
        self.iter()
            .map(|(slot_id, word_id)| (*model.slot(slot_id), vocabulary.word(word_id).string.clone()))
            .collect()
    }
}

/// The first rule a finished assignment was found to break.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Violation {
    #[error("{0} has no word")]
    Unassigned(Slot),

    #[error("word id {0} is not in the vocabulary")]
    UnknownWord(WordId),

    #[error("\"{word}\" doesn't fit the {slot}")]
    WrongLength { slot: Slot, word: String },

    #[error("\"{0}\" is used more than once")]
    Duplicate(String),

    #[error("{0} and {1} disagree where they cross")]
    Mismatch(Slot, Slot),
}

/// Check a complete assignment against every rule from scratch. Search never needs this since
/// it checks each extension as it goes; it's for callers that want proof.
pub fn verify_assignment(
    model: &PuzzleModel,
    vocabulary: &Vocabulary,
    assignment: &Assignment,
) -> Result<(), Violation> {
    let mut seen = BitSet::with_capacity(vocabulary.len());

    for slot_config in model.slot_configs() {
        let word_id = assignment
            .get(slot_config.id)
            .ok_or(Violation::Unassigned(slot_config.slot))?;
        if word_id >= vocabulary.len() {
            return Err(Violation::UnknownWord(word_id));
        }

        let word = vocabulary.word(word_id);
        if word.len() != slot_config.slot.length {
            return Err(Violation::WrongLength {
                slot: slot_config.slot,
                word: word.string.clone(),
            });
        }
        if !seen.insert(word_id) {
            return Err(Violation::Duplicate(word.string.clone()));
        }
    }

    for slot_config in model.slot_configs() {
        for (cell_idx, crossing) in slot_config.crossings.iter().enumerate() {
            let Some(crossing) = crossing else { continue };

            let glyph = assignment
                .get(slot_config.id)
                .and_then(|word_id| vocabulary.word(word_id).char_at(cell_idx));
            let other_glyph = assignment
                .get(crossing.other_slot_id)
                .and_then(|word_id| vocabulary.word(word_id).char_at(crossing.other_slot_cell));

            if glyph != other_glyph {
                return Err(Violation::Mismatch(
                    slot_config.slot,
                    *model.slot(crossing.other_slot_id),
                ));
            }
        }
    }

    Ok(())
}
