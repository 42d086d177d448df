// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Pipeline configuration.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{FolioError, Result};
use crate::types::OrientationMode;

/// Settings for the whole pipeline, loadable from a JSON file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Tesseract language code, also used to pick the dictionary (e.g. `deu`).
    pub language: String,
    /// Worker threads for page processing. `None` uses one per CPU.
    pub workers: Option<usize>,
    pub scan: ScanConfig,
    pub sanitize: SanitizeConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            language: "deu".into(),
            workers: None,
            scan: ScanConfig::default(),
            sanitize: SanitizeConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Read a configuration file. Missing keys fall back to their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let data = std::fs::read_to_string(path.as_ref())?;
        let config: Self = serde_json::from_str(&data)?;
        config.validate()?;
        Ok(config)
    }

    /// Write the configuration as pretty-printed JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path.as_ref(), json)?;
        Ok(())
    }

    /// Reject values the algorithms cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.language.trim().is_empty() {
            return Err(FolioError::Config("language must not be empty".into()));
        }
        if self.workers == Some(0) {
            return Err(FolioError::Config("workers must be at least 1".into()));
        }
        if !(-1..=100).contains(&self.scan.keep_threshold) {
            return Err(FolioError::Config(format!(
                "keep_threshold {} outside [-1, 100]",
                self.scan.keep_threshold
            )));
        }
        if self.scan.upscale_factor == 0 {
            return Err(FolioError::Config("upscale_factor must be at least 1".into()));
        }
        if !(0.0..=1.0).contains(&self.sanitize.accept_threshold) {
            return Err(FolioError::Config(format!(
                "accept_threshold {} outside [0, 1]",
                self.sanitize.accept_threshold
            )));
        }
        Ok(())
    }
}

/// OCR, preprocessing and orientation-search settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Words scored at or below this are left out of the page text.
    pub keep_threshold: i32,
    /// A coarse candidate above this ends the cardinal search early and
    /// unlocks the fine search.
    pub high_confidence_threshold: f64,
    /// Upper bound on single-degree steps in the fine search.
    pub max_fine_steps: u32,
    pub orientation: OrientationMode,
    /// Binarization cut-off; 0 disables binarization.
    pub binarize_threshold: u8,
    pub upscale_factor: u32,
    /// Keep a copy of every preprocessed page under `preprocessed_images/`.
    pub save_preprocessed: bool,
    /// Explicit tesseract executable. Looked up on `PATH` when absent.
    pub tesseract_binary: Option<PathBuf>,
    pub tessdata_dir: Option<PathBuf>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            keep_threshold: 60,
            high_confidence_threshold: 40.0,
            max_fine_steps: 10,
            orientation: OrientationMode::Off,
            binarize_threshold: 0,
            upscale_factor: 2,
            save_preprocessed: false,
            tesseract_binary: None,
            tessdata_dir: None,
        }
    }
}

/// Which dictionary implementation backs a language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DictionaryKind {
    /// Flat list, one entry per line, `/flags` suffix ignored.
    WordList,
    /// Hunspell `.aff` + `.dic` pair; `path` names the shared stem.
    Hunspell,
}

/// Where the dictionary for one language lives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DictionarySource {
    pub kind: DictionaryKind,
    /// Relative paths resolve against `SanitizeConfig::dictionary_dir`.
    pub path: PathBuf,
}

/// Hyphenation repair and fuzzy correction settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SanitizeConfig {
    /// A suggestion must score strictly above this to replace a token.
    pub accept_threshold: f64,
    /// Suffixes stripped when a merged word is not found as-is.
    pub endings: Vec<String>,
    pub dictionary_dir: PathBuf,
    /// Per-language dictionary sources, keyed by language code.
    pub dictionaries: BTreeMap<String, DictionarySource>,
}

impl Default for SanitizeConfig {
    fn default() -> Self {
        let mut dictionaries = BTreeMap::new();
        dictionaries.insert(
            "deu".to_string(),
            DictionarySource {
                kind: DictionaryKind::WordList,
                path: PathBuf::from("german.dic"),
            },
        );
        dictionaries.insert(
            "eng".to_string(),
            DictionarySource {
                kind: DictionaryKind::Hunspell,
                path: PathBuf::from("en_US"),
            },
        );
        Self {
            accept_threshold: 0.9,
            endings: vec!["e".into(), "en".into(), "s".into()],
            dictionary_dir: default_dictionary_dir(),
            dictionaries,
        }
    }
}

impl SanitizeConfig {
    /// Resolve the dictionary source for `language`, with its path made
    /// absolute against `dictionary_dir`.
    pub fn dictionary_for(&self, language: &str) -> Result<DictionarySource> {
        let source = self
            .dictionaries
            .get(language)
            .ok_or_else(|| FolioError::UnsupportedLanguage(language.to_string()))?;
        let path = if source.path.is_absolute() {
            source.path.clone()
        } else {
            self.dictionary_dir.join(&source.path)
        };
        Ok(DictionarySource {
            kind: source.kind,
            path,
        })
    }
}

/// Default dictionary directory: `$XDG_DATA_HOME/folio/dictionaries`, falling
/// back to `~/.local/share/folio/dictionaries`.
fn default_dictionary_dir() -> PathBuf {
    let base = if let Ok(xdg) = std::env::var("XDG_DATA_HOME") {
        PathBuf::from(xdg)
    } else if let Ok(home) = std::env::var("HOME") {
        PathBuf::from(home).join(".local").join("share")
    } else {
        PathBuf::from(".")
    };
    base.join("folio").join("dictionaries")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_values() {
        let config = PipelineConfig::default();
        assert_eq!(config.language, "deu");
        assert_eq!(config.scan.keep_threshold, 60);
        assert_eq!(config.scan.high_confidence_threshold, 40.0);
        assert_eq!(config.scan.max_fine_steps, 10);
        assert_eq!(config.scan.orientation, OrientationMode::Off);
        assert_eq!(config.sanitize.endings, vec!["e", "en", "s"]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("folio.json");
        std::fs::write(&path, r#"{"language": "eng", "scan": {"orientation": 2}}"#).unwrap();

        let config = PipelineConfig::load(&path).unwrap();
        assert_eq!(config.language, "eng");
        assert_eq!(config.scan.orientation, OrientationMode::Fine);
        assert_eq!(config.scan.keep_threshold, 60);
        assert_eq!(config.sanitize.accept_threshold, 0.9);
    }

    #[test]
    fn save_then_load_preserves_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("folio.json");
        let mut config = PipelineConfig::default();
        config.workers = Some(3);
        config.scan.binarize_threshold = 128;
        config.save(&path).unwrap();

        let loaded = PipelineConfig::load(&path).unwrap();
        assert_eq!(loaded.workers, Some(3));
        assert_eq!(loaded.scan.binarize_threshold, 128);
    }

    #[test]
    fn validate_rejects_out_of_range_values() {
        let mut config = PipelineConfig::default();
        config.sanitize.accept_threshold = 1.5;
        assert!(matches!(config.validate(), Err(FolioError::Config(_))));

        let mut config = PipelineConfig::default();
        config.workers = Some(0);
        assert!(config.validate().is_err());

        let mut config = PipelineConfig::default();
        config.scan.keep_threshold = 101;
        assert!(config.validate().is_err());
    }

    #[test]
    fn dictionary_for_resolves_relative_paths() {
        let mut sanitize = SanitizeConfig::default();
        sanitize.dictionary_dir = PathBuf::from("/dicts");
        let source = sanitize.dictionary_for("deu").unwrap();
        assert_eq!(source.kind, DictionaryKind::WordList);
        assert_eq!(source.path, PathBuf::from("/dicts/german.dic"));

        assert!(matches!(
            sanitize.dictionary_for("fra"),
            Err(FolioError::UnsupportedLanguage(lang)) if lang == "fra"
        ));
    }
}
