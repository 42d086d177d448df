// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Fuzzy token correction against a dictionary.

use std::sync::Arc;

use lazy_static::lazy_static;
use regex::Regex;
use tracing::debug;

use crate::dictionary::Dictionary;
use crate::dictionary::matches::similarity;

lazy_static! {
    // Alternating word and non-word runs; together they cover every character.
    static ref TOKEN: Regex = Regex::new(r"\w+|\W+").unwrap();
}

/// Default score a suggestion must exceed to replace a token.
pub const DEFAULT_ACCEPT_THRESHOLD: f64 = 0.9;

/// Split `line` into word and non-word tokens; concatenating them gives back
/// `line` exactly.
pub fn tokenize(line: &str) -> Vec<&str> {
    TOKEN.find_iter(line).map(|m| m.as_str()).collect()
}

fn is_word(token: &str) -> bool {
    token.chars().next().is_some_and(|c| c.is_alphanumeric() || c == '_')
}

/// Replaces misrecognised words with a near-identical dictionary word.
#[derive(Clone)]
pub struct FuzzyCorrector {
    dictionary: Arc<dyn Dictionary>,
    accept_threshold: f64,
}

impl FuzzyCorrector {
    pub fn new(dictionary: Arc<dyn Dictionary>, accept_threshold: f64) -> Self {
        Self {
            dictionary,
            accept_threshold,
        }
    }

    /// Correct one line, returning it together with the number of tokens
    /// replaced. Non-word tokens are copied through untouched.
    pub fn correct_counted(&self, line: &str) -> (String, usize) {
        let mut corrected = String::with_capacity(line.len());
        let mut replaced = 0;

        for token in tokenize(line) {
            match self.replacement(token) {
                Some(word) => {
                    debug!(from = token, to = %word, "Token corrected");
                    corrected.push_str(&word);
                    replaced += 1;
                }
                None => corrected.push_str(token),
            }
        }

        (corrected, replaced)
    }

    pub fn correct(&self, line: &str) -> String {
        self.correct_counted(line).0
    }

    /// The best suggestion for `token`, if it clears the accept threshold.
    fn replacement(&self, token: &str) -> Option<String> {
        if !is_word(token) || self.dictionary.check(token) {
            return None;
        }

        // Strictly greater keeps the first candidate on ties.
        let (best, score) = self
            .dictionary
            .suggest(token)
            .into_iter()
            .fold(None::<(String, f64)>, |best, candidate| {
                let score = similarity(token, &candidate);
                match best {
                    Some((_, best_score)) if score <= best_score => best,
                    _ => Some((candidate, score)),
                }
            })?;

        (score > self.accept_threshold && best != token).then_some(best)
    }
}
