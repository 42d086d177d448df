// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Line-break hyphenation repair.
//
// Scanned text breaks words at the end of a line with a hyphen. A break is
// only undone when the rejoined word is in the dictionary; otherwise the two
// lines are concatenated unchanged, so a genuinely hyphenated word keeps its
// hyphen and no text is ever lost.

use std::sync::Arc;

use lazy_static::lazy_static;
use regex::Regex;
use tracing::{debug, instrument};

use crate::dictionary::Dictionary;

lazy_static! {
    // The word directly in front of a line-final hyphen.
    static ref WORD_BEFORE_HYPHEN: Regex = Regex::new(r"(\w+)-$").unwrap();
}

/// Rejoins words split across lines, in a single forward pass.
#[derive(Clone)]
pub struct HyphenReconstructor {
    dictionary: Arc<dyn Dictionary>,
    endings: Vec<String>,
}

impl HyphenReconstructor {
    pub fn new(dictionary: Arc<dyn Dictionary>, endings: Vec<String>) -> Self {
        Self {
            dictionary,
            endings,
        }
    }

    /// Reconstruct `lines`.
    ///
    /// A line ending in a hyphen is resolved together with the next non-blank
    /// line, either as a dictionary-validated merge or as a plain
    /// concatenation. Other lines are running prose and are joined in pairs
    /// with a space. Blank lines end a paragraph and are not emitted. Never
    /// returns more lines than it was given.
    #[instrument(skip_all, fields(lines = lines.len()))]
    pub fn reconstruct<S: AsRef<str>>(&self, lines: &[S]) -> Vec<String> {
        let mut output = Vec::new();
        let mut pending: Option<String> = None;
        let mut carried: Option<String> = None;
        let mut next = 0;

        loop {
            let line = match carried.take() {
                Some(line) => line,
                None => match lines.get(next) {
                    Some(line) => {
                        next += 1;
                        line.as_ref().trim_end().to_string()
                    }
                    None => break,
                },
            };

            if line.trim().is_empty() {
                output.extend(pending.take());
                continue;
            }

            let following = lines
                .get(next)
                .map(AsRef::as_ref)
                .filter(|candidate| !candidate.trim().is_empty());

            if ends_with_hyphen(&line) {
                if let Some(following) = following {
                    next += 1;
                    let resolved = self.resolve_break(&line, following);
                    if ends_with_hyphen(&resolved) {
                        // The next line broke too; resolve it in the same pass.
                        carried = Some(resolved);
                    } else {
                        output.push(join_prose(pending.take(), resolved));
                    }
                    continue;
                }
            }

            let mut buffer = join_prose(pending.take(), line);
            match following {
                Some(following) if !ends_with_hyphen(following) => {
                    next += 1;
                    buffer.push(' ');
                    buffer.push_str(following.trim());
                    output.push(buffer);
                }
                Some(_) => pending = Some(buffer),
                None => output.push(buffer),
            }
        }

        output.extend(pending);
        output
    }

    /// Resolve one hyphen break between `current` and `next`.
    fn resolve_break(&self, current: &str, next: &str) -> String {
        let current = current.trim_end();
        let next = next.trim_start();
        let split = next.find(char::is_whitespace).unwrap_or(next.len());
        let (suffix, rest) = next.split_at(split);

        if let Some(prefix) = WORD_BEFORE_HYPHEN
            .captures(current)
            .and_then(|caps| caps.get(1))
        {
            let candidate = format!("{}{}", prefix.as_str(), suffix);
            if self.dictionary.check_with_endings(&candidate, &self.endings) {
                debug!(word = %candidate, "Hyphen break merged");
                return format!("{}{}{}", &current[..prefix.start()], candidate, rest);
            }
            debug!(word = %candidate, "Merge rejected, keeping hyphen");
        }

        format!("{current}{next}")
    }
}

fn ends_with_hyphen(line: &str) -> bool {
    line.trim_end().ends_with('-')
}

fn join_prose(pending: Option<String>, line: String) -> String {
    match pending {
        Some(mut buffer) => {
            buffer.push(' ');
            buffer.push_str(&line);
            buffer
        }
        None => line,
    }
}
