//! The vocabulary every slot's candidates are drawn from.

use smallvec::SmallVec;
use std::collections::HashMap;
use std::fmt::{Debug, Formatter};
use std::fs;
use std::path::Path;

use crate::errors::WordListError;
use crate::MAX_SLOT_LENGTH;

/// An identifier for a given word, based on its index in the `WordList`'s `words` field.
pub type WordId = usize;

/// A struct representing a word that can be chosen for a slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Word {
    pub string: String,
    pub glyphs: SmallVec<[char; MAX_SLOT_LENGTH]>,
}

impl Word {
    fn new(string: String) -> Word {
        let glyphs = string.chars().collect();
        Word { string, glyphs }
    }

    /// Length in characters, which is what has to match a slot's length.
    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }
}

/// Canonical form used for matching and display: surrounding whitespace removed, uppercased.
pub fn normalize_word(raw: &str) -> String {
    raw.trim().to_uppercase()
}

/// A deduplicated list of normalized words, in the order they were first seen.
#[derive(Clone, Default)]
pub struct WordList {
    pub words: Vec<Word>,
    pub word_id_by_string: HashMap<String, WordId>,
}

impl Debug for WordList {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WordList")
            .field("words", &format!("({} entries)", self.words.len()))
            .finish()
    }
}

impl WordList {
    pub fn new<I, S>(raw_words: I) -> WordList
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut word_list = WordList::default();

        for raw_word in raw_words {
            let normalized = normalize_word(raw_word.as_ref());
            if normalized.is_empty() || word_list.word_id_by_string.contains_key(&normalized) {
                continue;
            }

            word_list
                .word_id_by_string
                .insert(normalized.clone(), word_list.words.len());
            word_list.words.push(Word::new(normalized));
        }

        word_list
    }

    /// Parse a word list with one entry per line. Scored lists (`word;score`) are accepted, but
    /// the score is ignored.
    pub fn parse_from_str(contents: &str) -> WordList {
        WordList::new(
            contents
                .lines()
                .map(|line| line.split(';').next().unwrap_or(""))
                .filter(|word| !word.trim().is_empty()),
        )
    }

    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<WordList, WordListError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| WordListError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let word_list = WordList::parse_from_str(&contents);
        log::debug!("Loaded {} words from {}", word_list.len(), path.display());

        Ok(word_list)
    }

    pub fn get_word_id(&self, word: &str) -> Option<WordId> {
        self.word_id_by_string.get(&normalize_word(word)).copied()
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}
