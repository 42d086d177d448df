// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Dictionaries — the word-validity and suggestion oracle used by hyphenation
// repair and fuzzy correction.
//
// A dictionary is built once per run and shared read-only between workers.
// Lookups are case-sensitive.

pub mod hunspell;
pub mod matches;
pub mod word_list;

use std::path::Path;
use std::sync::Arc;

use folio_core::config::{DictionaryKind, SanitizeConfig};
use folio_core::error::{FolioError, Result};
use tracing::{info, instrument};

pub use hunspell::SpellDictionary;
pub use word_list::WordListDictionary;

/// Language-specific word validity and suggestions.
pub trait Dictionary: Send + Sync {
    /// Whether `word` is a known word form.
    fn check(&self, word: &str) -> bool;

    /// Close matches for `word`, best first. Empty when nothing is close.
    fn suggest(&self, word: &str) -> Vec<String>;

    /// `check`, falling back to stripping one of `endings` from the end of
    /// `word` (so `"Häuser"` + `"en"` style inflections still validate).
    fn check_with_endings(&self, word: &str, endings: &[String]) -> bool {
        if self.check(word) {
            return true;
        }
        endings.iter().any(|ending| {
            !ending.is_empty()
                && word.len() > ending.len()
                && word.ends_with(ending.as_str())
                && self.check(&word[..word.len() - ending.len()])
        })
    }
}

/// Build the dictionary configured for `language`.
///
/// # Errors
///
/// `UnsupportedLanguage` when no dictionary is configured for the code, and
/// `DictionaryLoad` when its files cannot be read or compiled.
#[instrument(skip(config))]
pub fn load_dictionary(language: &str, config: &SanitizeConfig) -> Result<Arc<dyn Dictionary>> {
    let source = config.dictionary_for(language)?;
    let dictionary: Arc<dyn Dictionary> = match source.kind {
        DictionaryKind::WordList => Arc::new(WordListDictionary::load(&source.path)?),
        DictionaryKind::Hunspell => Arc::new(SpellDictionary::load(&source.path)?),
    };
    info!(path = %source.path.display(), kind = ?source.kind, "Dictionary ready");
    Ok(dictionary)
}

/// Read a dictionary file, mapping failures to `DictionaryLoad`.
fn read_dictionary_file(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|err| {
        FolioError::DictionaryLoad(format!("failed to read {}: {}", path.display(), err))
    })
}

/// Base word of one dictionary line: the text before the first `/`, trimmed.
/// Blank lines and `#` comments yield `None`.
fn base_word(line: &str) -> Option<&str> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return None;
    }
    let word = trimmed.split('/').next().unwrap_or_default().trim();
    (!word.is_empty()).then_some(word)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    struct SetDictionary(HashSet<&'static str>);

    impl Dictionary for SetDictionary {
        fn check(&self, word: &str) -> bool {
            self.0.contains(word)
        }

        fn suggest(&self, _word: &str) -> Vec<String> {
            Vec::new()
        }
    }

    fn endings() -> Vec<String> {
        ["e", "en", "s"].iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn base_word_strips_flags_and_comments() {
        assert_eq!(base_word("Haus/SN"), Some("Haus"));
        assert_eq!(base_word("  Baum  "), Some("Baum"));
        assert_eq!(base_word("Staat /S"), Some("Staat"));
        assert_eq!(base_word("# comment"), None);
        assert_eq!(base_word("   "), None);
        assert_eq!(base_word("/XY"), None);
    }

    #[test]
    fn endings_allow_inflected_forms() {
        let dict = SetDictionary(["Staat", "Frau"].into_iter().collect());
        assert!(dict.check_with_endings("Staat", &endings()));
        assert!(dict.check_with_endings("Staates", &[String::from("es")]));
        assert!(dict.check_with_endings("Staats", &endings()));
        assert!(dict.check_with_endings("Frauen", &endings()));
        assert!(!dict.check_with_endings("Fraun", &endings()));
        assert!(!dict.check_with_endings("Staats", &[]));
    }

    #[test]
    fn ending_never_strips_whole_word() {
        let dict = SetDictionary([""].into_iter().collect());
        assert!(!dict.check_with_endings("s", &endings()));
        assert!(!dict.check_with_endings("Baum", &[String::new()]));
    }

    #[test]
    fn factory_rejects_unknown_language() {
        let config = SanitizeConfig::default();
        assert!(matches!(
            load_dictionary("xx", &config),
            Err(FolioError::UnsupportedLanguage(_))
        ));
    }

    #[test]
    fn factory_builds_configured_word_list() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("german.dic"), "Haus/N\nBaum\n").unwrap();
        let config = SanitizeConfig {
            dictionary_dir: dir.path().to_path_buf(),
            ..SanitizeConfig::default()
        };

        let dict = load_dictionary("deu", &config).unwrap();
        assert!(dict.check("Haus"));
        assert!(!dict.check("haus"));
    }

    #[test]
    fn factory_reports_missing_files() {
        let dir = tempfile::tempdir().unwrap();
        let config = SanitizeConfig {
            dictionary_dir: dir.path().to_path_buf(),
            ..SanitizeConfig::default()
        };
        assert!(matches!(
            load_dictionary("deu", &config),
            Err(FolioError::DictionaryLoad(_))
        ));
        assert!(matches!(
            load_dictionary("eng", &config),
            Err(FolioError::DictionaryLoad(_))
        ));
    }
}
