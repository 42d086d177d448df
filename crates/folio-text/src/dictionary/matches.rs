// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Close-match lookup over a word list.
//
// Similarity is the Ratcliff/Obershelp ratio `2M/T`, where `M` counts the
// characters in matching blocks and `T` is the combined length. Words are
// bucketed by character count. A candidate whose length differs too much from
// the query can never reach the similarity cutoff, so only the buckets inside
// that window are scanned, in parallel.

use std::collections::BTreeMap;

use rayon::prelude::*;

/// Maximum number of suggestions returned.
pub const MAX_MATCHES: usize = 3;
/// Minimum similarity for a word to count as a close match.
pub const MATCH_CUTOFF: f64 = 0.6;

/// Symmetric similarity of two strings in `[0, 1]`; `1.0` means identical.
pub fn similarity(a: &str, b: &str) -> f64 {
    // Block selection depends on argument order; fix it so the score does not.
    let (a, b) = if a <= b { (a, b) } else { (b, a) };
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }
    (2 * matching_chars(&a, &b)) as f64 / total as f64
}

/// Characters covered by the matching blocks of `a` and `b`: the longest
/// common run, then recursively the runs to its left and right.
fn matching_chars(a: &[char], b: &[char]) -> usize {
    let (i, j, size) = longest_match(a, b);
    if size == 0 {
        return 0;
    }
    size + matching_chars(&a[..i], &b[..j]) + matching_chars(&a[i + size..], &b[j + size..])
}

/// Longest common run as `(start in a, start in b, length)`, earliest in `a`
/// and then in `b` on ties.
fn longest_match(a: &[char], b: &[char]) -> (usize, usize, usize) {
    let mut best = (0, 0, 0);
    let mut prev = vec![0usize; b.len() + 1];
    let mut row = vec![0usize; b.len() + 1];
    for (i, ca) in a.iter().enumerate() {
        for (j, cb) in b.iter().enumerate() {
            row[j + 1] = if ca == cb { prev[j] + 1 } else { 0 };
            let k = row[j + 1];
            if k > best.2 {
                best = (i + 1 - k, j + 1 - k, k);
            }
        }
        std::mem::swap(&mut prev, &mut row);
    }
    best
}

/// Word list bucketed by length in characters.
#[derive(Debug, Default, Clone)]
pub struct LengthIndex {
    buckets: BTreeMap<usize, Vec<String>>,
}

impl LengthIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, word: impl Into<String>) {
        let word = word.into();
        self.buckets
            .entry(word.chars().count())
            .or_default()
            .push(word);
    }

    pub fn len(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Up to [`MAX_MATCHES`] words with similarity at least [`MATCH_CUTOFF`],
    /// best first; equal scores are ordered alphabetically.
    pub fn close_matches(&self, word: &str) -> Vec<String> {
        let length = word.chars().count();
        if length == 0 {
            return Vec::new();
        }

        // At most the shorter word can match, so 2 * min / (n + m) bounds the
        // score; it falls below 0.6 outside [3n/7, 7n/3].
        let min_len = (length * 3).div_ceil(7);
        let max_len = length * 7 / 3;

        let buckets: Vec<&[String]> = self
            .buckets
            .range(min_len..=max_len)
            .map(|(_, words)| words.as_slice())
            .collect();

        let mut scored: Vec<(f64, &str)> = buckets
            .into_par_iter()
            .flat_map_iter(|words| {
                words.iter().filter_map(|candidate| {
                    let score = similarity(word, candidate);
                    (score >= MATCH_CUTOFF).then_some((score, candidate.as_str()))
                })
            })
            .collect();

        scored.sort_by(|a, b| b.0.total_cmp(&a.0).then_with(|| a.1.cmp(b.1)));
        scored
            .into_iter()
            .take(MAX_MATCHES)
            .map(|(_, candidate)| candidate.to_string())
            .collect()
    }
}

impl<S: Into<String>> FromIterator<S> for LengthIndex {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut index = Self::new();
        for word in iter {
            index.insert(word);
        }
        index
    }
}
