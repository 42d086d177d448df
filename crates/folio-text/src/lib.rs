// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// folio-text — Post-processing of recognised text for Folio.
//
// Language dictionaries (plain word lists and Hunspell pairs), repair of
// words split by line-break hyphenation, fuzzy dictionary-backed token
// correction, and the sanitize step that runs both over a page-record stream.

pub mod dictionary;
pub mod fuzzy;
pub mod hyphen;
pub mod sanitize;

// Re-export the primary types so callers can use `folio_text::Sanitizer` etc.
pub use dictionary::{Dictionary, SpellDictionary, WordListDictionary, load_dictionary};
pub use fuzzy::FuzzyCorrector;
pub use hyphen::HyphenReconstructor;
pub use sanitize::{SanitizeReport, Sanitizer};
