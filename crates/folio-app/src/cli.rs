// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Command-line interface. Flags override values from the configuration file.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use folio_core::config::{DictionaryKind, DictionarySource, PipelineConfig};
use folio_core::error::Result;
use folio_core::types::OrientationMode;

/// Folio — orientation-corrected OCR of scanned pages
#[derive(Parser, Debug)]
#[command(name = "folio", version)]
#[command(about = "OCR a directory of scanned pages and clean up the recognised text")]
pub struct Cli {
    /// JSON configuration file; flags take precedence over its values
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log level used when RUST_LOG is not set
    #[arg(long, global = true, default_value = "warn")]
    pub log_level: String,

    /// Recognition language (Tesseract code, also selects the dictionary)
    #[arg(short, long, global = true)]
    pub language: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Recognise every page image in a directory into ocr_result.txt
    Ocr {
        dir: PathBuf,
        #[command(flatten)]
        scan: ScanOptions,
    },
    /// Repair hyphenation and correct words in ocr_result.txt
    Sanitize {
        dir: PathBuf,
        #[command(flatten)]
        text: TextOptions,
    },
    /// Run ocr, then sanitize
    Run {
        dir: PathBuf,
        #[command(flatten)]
        scan: ScanOptions,
        #[command(flatten)]
        text: TextOptions,
    },
}

impl Command {
    pub fn dir(&self) -> &PathBuf {
        match self {
            Self::Ocr { dir, .. } | Self::Sanitize { dir, .. } | Self::Run { dir, .. } => dir,
        }
    }
}

#[derive(Args, Debug, Default)]
pub struct ScanOptions {
    /// Binarization threshold (0 disables binarization)
    #[arg(long)]
    pub threshold: Option<u8>,

    /// Save preprocessed pages to <dir>/preprocessed_images
    #[arg(long)]
    pub save_preprocessed: bool,

    /// Orientation search: 0 = off, 1 = quarter turns, 2 = quarter turns + fine angle
    #[arg(long)]
    pub check_orientation: Option<u8>,

    /// Tesseract data directory
    #[arg(long)]
    pub tessdata_path: Option<PathBuf>,

    /// Tesseract binary (defaults to the one on PATH)
    #[arg(long)]
    pub tesseract: Option<PathBuf>,

    /// Words scored at or below this confidence are dropped from the text
    #[arg(long)]
    pub keep_threshold: Option<i32>,

    /// Number of pages recognised in parallel
    #[arg(long)]
    pub workers: Option<usize>,
}

#[derive(Args, Debug, Default)]
pub struct TextOptions {
    /// Dictionary for the selected language (a word list, or a Hunspell stem
    /// when the language is configured for Hunspell)
    #[arg(long)]
    pub dictionary: Option<PathBuf>,

    /// Minimum similarity a correction must exceed
    #[arg(long)]
    pub accept_threshold: Option<f64>,
}

impl Cli {
    /// Apply every flag that was given on top of `config`.
    pub fn apply(&self, config: &mut PipelineConfig) -> Result<()> {
        if let Some(language) = &self.language {
            config.language = language.clone();
        }
        match &self.command {
            Command::Ocr { scan, .. } => scan.apply(config)?,
            Command::Sanitize { text, .. } => text.apply(config),
            Command::Run { scan, text, .. } => {
                scan.apply(config)?;
                text.apply(config);
            }
        }
        Ok(())
    }
}

impl ScanOptions {
    fn apply(&self, config: &mut PipelineConfig) -> Result<()> {
        let scan = &mut config.scan;
        if let Some(threshold) = self.threshold {
            scan.binarize_threshold = threshold;
        }
        if self.save_preprocessed {
            scan.save_preprocessed = true;
        }
        if let Some(mode) = self.check_orientation {
            scan.orientation = OrientationMode::try_from(mode)?;
        }
        if let Some(dir) = &self.tessdata_path {
            scan.tessdata_dir = Some(dir.clone());
        }
        if let Some(binary) = &self.tesseract {
            scan.tesseract_binary = Some(binary.clone());
        }
        if let Some(keep) = self.keep_threshold {
            scan.keep_threshold = keep;
        }
        if self.workers.is_some() {
            config.workers = self.workers;
        }
        Ok(())
    }
}

impl TextOptions {
    fn apply(&self, config: &mut PipelineConfig) {
        if let Some(path) = &self.dictionary {
            let kind = config
                .sanitize
                .dictionaries
                .get(&config.language)
                .map(|source| source.kind)
                .unwrap_or(DictionaryKind::WordList);
            config.sanitize.dictionaries.insert(
                config.language.clone(),
                DictionarySource {
                    kind,
                    path: path.clone(),
                },
            );
        }
        if let Some(threshold) = self.accept_threshold {
            config.sanitize.accept_threshold = threshold;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_core::error::FolioError;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap()
    }

    #[test]
    fn ocr_flags_override_config() {
        let cli = parse(&[
            "folio",
            "ocr",
            "scans",
            "--language",
            "eng",
            "--threshold",
            "140",
            "--check-orientation",
            "2",
            "--keep-threshold",
            "70",
            "--workers",
            "4",
            "--save-preprocessed",
        ]);
        let mut config = PipelineConfig::default();
        cli.apply(&mut config).unwrap();

        assert_eq!(cli.command.dir(), &PathBuf::from("scans"));
        assert_eq!(config.language, "eng");
        assert_eq!(config.scan.binarize_threshold, 140);
        assert_eq!(config.scan.orientation, OrientationMode::Fine);
        assert_eq!(config.scan.keep_threshold, 70);
        assert_eq!(config.workers, Some(4));
        assert!(config.scan.save_preprocessed);
        assert_eq!(cli.log_level, "warn");
    }

    #[test]
    fn absent_flags_keep_config_values() {
        let cli = parse(&["folio", "ocr", "scans"]);
        let mut config = PipelineConfig::default();
        config.scan.keep_threshold = 42;
        config.workers = Some(2);
        cli.apply(&mut config).unwrap();
        assert_eq!(config.scan.keep_threshold, 42);
        assert_eq!(config.workers, Some(2));
        assert_eq!(config.language, "deu");
    }

    #[test]
    fn invalid_orientation_mode_is_rejected() {
        let cli = parse(&["folio", "ocr", "scans", "--check-orientation", "3"]);
        let result = cli.apply(&mut PipelineConfig::default());
        assert!(matches!(result, Err(FolioError::InvalidOrientationMode(3))));
    }

    #[test]
    fn dictionary_flag_keeps_configured_kind() {
        let cli = parse(&[
            "folio",
            "--language",
            "eng",
            "sanitize",
            "out",
            "--dictionary",
            "/dicts/en_GB",
            "--accept-threshold",
            "0.85",
        ]);
        let mut config = PipelineConfig::default();
        cli.apply(&mut config).unwrap();

        let source = &config.sanitize.dictionaries["eng"];
        assert_eq!(source.kind, DictionaryKind::Hunspell);
        assert_eq!(source.path, PathBuf::from("/dicts/en_GB"));
        assert_eq!(config.sanitize.accept_threshold, 0.85);
    }

    #[test]
    fn run_accepts_both_option_sets() {
        let cli = parse(&[
            "folio",
            "run",
            "scans",
            "--tesseract",
            "/opt/tesseract",
            "--dictionary",
            "german.txt",
            "--log-level",
            "debug",
        ]);
        let mut config = PipelineConfig::default();
        cli.apply(&mut config).unwrap();

        assert_eq!(config.scan.tesseract_binary, Some(PathBuf::from("/opt/tesseract")));
        assert_eq!(config.sanitize.dictionaries["deu"].path, PathBuf::from("german.txt"));
        assert_eq!(cli.log_level, "debug");
    }
}
