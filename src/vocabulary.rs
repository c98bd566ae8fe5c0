use smallvec::SmallVec;
use std::collections::HashMap;
use std::fmt::{Debug, Formatter};

use crate::MAX_SLOT_LENGTH;

/// An identifier for a given word, based on its index in the `Vocabulary`'s `words` field.
pub type WordId = usize;

/// A candidate word. Positions within a word are character positions, so `chars` is what the
/// solver compares at crossings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Word {
    pub string: String,
    pub chars: SmallVec<[char; MAX_SLOT_LENGTH]>,
}

impl Word {
    pub fn new(string: &str) -> Word {
        Word {
            string: string.to_string(),
            chars: string.chars().collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    pub fn char_at(&self, cell_idx: usize) -> Option<char> {
        self.chars.get(cell_idx).copied()
    }
}

/// The read-only set of words a puzzle may use. Duplicates in the input collapse into a single
/// entry, and ids follow first-appearance order so results are reproducible.
#[derive(Clone, Default)]
pub struct Vocabulary {
    pub words: Vec<Word>,
    word_id_by_string: HashMap<String, WordId>,
}

impl Debug for Vocabulary {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Vocabulary")
            .field("words", &format_args!("({} entries)", self.words.len()))
            .finish()
    }
}

impl Vocabulary {
    pub fn new<I, S>(words: I) -> Vocabulary
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut vocabulary = Vocabulary::default();
        for word in words {
            vocabulary.insert(word.as_ref());
        }
        vocabulary
    }

    /// Add a word if it isn't already present, returning its id either way.
    pub fn insert(&mut self, string: &str) -> WordId {
        if let Some(&word_id) = self.word_id_by_string.get(string) {
            return word_id;
        }

        let word_id = self.words.len();
        self.words.push(Word::new(string));
        self.word_id_by_string.insert(string.to_string(), word_id);
        word_id
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn word(&self, word_id: WordId) -> &Word {
        &self.words[word_id]
    }

    pub fn word_id(&self, string: &str) -> Option<WordId> {
        self.word_id_by_string.get(string).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicates_collapse_in_first_seen_order() {
        let vocabulary = Vocabulary::new(["CAT", "DOG", "CAT", "EMU"]);

        assert_eq!(vocabulary.len(), 3);
        assert_eq!(vocabulary.word_id("CAT"), Some(0));
        assert_eq!(vocabulary.word_id("EMU"), Some(2));
        assert_eq!(vocabulary.word_id("COW"), None);
    }

    #[test]
    fn test_positions_are_characters_not_bytes() {
        let word = Word::new("ÉTÉ");

        assert_eq!(word.len(), 3);
        assert_eq!(word.char_at(2), Some('É'));
        assert_eq!(word.char_at(3), None);
    }
}
