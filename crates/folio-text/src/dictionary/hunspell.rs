// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Hunspell dictionary — an `.aff`/`.dic` pair compiled with zspell.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use folio_core::error::{FolioError, Result};
use tracing::{info, instrument};

use super::matches::LengthIndex;
use super::{Dictionary, base_word, read_dictionary_file};

/// Affix-aware dictionary built from a Hunspell `.aff`/`.dic` pair.
///
/// `check` goes through zspell so inflected forms derived by affix rules are
/// accepted. Suggestions are ranked close matches among the `.dic` stems.
pub struct SpellDictionary {
    speller: zspell::Dictionary,
    stems: LengthIndex,
}

impl SpellDictionary {
    /// Load `<stem>.aff` and `<stem>.dic`, e.g. `dictionaries/en_US`.
    #[instrument(skip_all, fields(stem = %stem.as_ref().display()))]
    pub fn load(stem: impl AsRef<Path>) -> Result<Self> {
        let stem = stem.as_ref();
        let aff = read_dictionary_file(&with_suffix(stem, ".aff"))?;
        let dic = read_dictionary_file(&with_suffix(stem, ".dic"))?;
        let dictionary = Self::from_strs(&aff, &dic)?;
        info!(stems = dictionary.stems.len(), "Hunspell dictionary loaded");
        Ok(dictionary)
    }

    /// Compile a dictionary from the contents of an `.aff` and a `.dic` file.
    pub fn from_strs(aff: &str, dic: &str) -> Result<Self> {
        let speller = zspell::builder()
            .config_str(aff)
            .dict_str(dic)
            .build()
            .map_err(|err| {
                FolioError::DictionaryLoad(format!("failed to build Hunspell dictionary: {err}"))
            })?;

        // The first line of a .dic file is the entry count.
        let stems = dic
            .lines()
            .skip(1)
            .filter_map(base_word)
            .map(str::to_string)
            .collect();

        Ok(Self { speller, stems })
    }
}

impl Dictionary for SpellDictionary {
    fn check(&self, word: &str) -> bool {
        self.speller.check_word(word)
    }

    fn suggest(&self, word: &str) -> Vec<String> {
        self.stems.close_matches(word)
    }
}

fn with_suffix(stem: &Path, suffix: &str) -> PathBuf {
    let mut path = OsString::from(stem.as_os_str());
    path.push(suffix);
    PathBuf::from(path)
}
