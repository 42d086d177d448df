// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Flat word-list dictionary.

use std::collections::HashSet;
use std::path::Path;

use folio_core::error::Result;
use tracing::{info, instrument};

use super::matches::LengthIndex;
use super::{Dictionary, base_word, read_dictionary_file};

/// Dictionary backed by a newline-delimited word list.
///
/// Each line holds one entry; only the text before the first `/` counts, so
/// Hunspell-style `.dic` files with affix flags load as plain stems. Blank
/// lines and `#` comments are ignored.
#[derive(Debug, Clone)]
pub struct WordListDictionary {
    words: HashSet<String>,
    index: LengthIndex,
}

impl WordListDictionary {
    /// Load a word list from `path`.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = read_dictionary_file(path.as_ref())?;
        let dictionary = Self::parse(&content);
        info!(words = dictionary.len(), "Word list loaded");
        Ok(dictionary)
    }

    /// Build a dictionary from the contents of a word-list file.
    pub fn parse(content: &str) -> Self {
        Self::from_words(content.lines().filter_map(base_word))
    }

    pub fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let words: HashSet<String> = words.into_iter().map(Into::into).collect();
        let index = words.iter().cloned().collect();
        Self { words, index }
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

impl Dictionary for WordListDictionary {
    fn check(&self, word: &str) -> bool {
        self.words.contains(word)
    }

    fn suggest(&self, word: &str) -> Vec<String> {
        self.index.close_matches(word)
    }
}
