// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// OCR (Optical Character Recognition) capability for Folio.
//
// Recognition itself is delegated to an external engine behind the
// `OcrCapability` trait. The production implementation drives the Tesseract
// command-line tool and parses its TSV output into per-word confidences.
//
// # Engine Setup
//
// Tesseract must be installed together with the trained data for the page
// language (e.g. `tesseract-ocr-deu`):
//
// ```sh
// apt install tesseract-ocr tesseract-ocr-deu
// tesseract --list-langs
// ```
//
// The executable is located once on `PATH` at startup unless an explicit path
// is configured; the tessdata directory defaults to Tesseract's own.

use std::collections::HashMap;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;

use folio_core::config::ScanConfig;
use folio_core::error::{FolioError, Result};
use folio_core::types::OcrWord;
use image::{DynamicImage, ImageFormat};
use tracing::{debug, info, instrument, warn};

/// Engine mode passed as `--oem` (3 = default, LSTM where available).
const DEFAULT_OEM: u8 = 3;
/// Page segmentation mode passed as `--psm` (3 = fully automatic).
const DEFAULT_PSM: u8 = 3;

/// Number of columns in a Tesseract TSV row.
const TSV_COLUMNS: usize = 12;

/// Anything that can turn a page image into scored words.
///
/// Implementations are shared by every page worker, so they must be `Sync`.
/// Language and data paths are fixed when the implementation is built.
pub trait OcrCapability: Send + Sync {
    /// Recognise `image`, returning words in reading order.
    fn recognize(&self, image: &DynamicImage) -> Result<Vec<OcrWord>>;
}

/// Configuration for constructing a [`TesseractEngine`].
#[derive(Debug, Clone)]
pub struct TesseractConfig {
    /// Path to the `tesseract` executable.
    pub binary: PathBuf,
    /// Tesseract language code (`deu`, `eng`, `deu+eng`, ...).
    pub language: String,
    /// Directory holding `<language>.traineddata`, if not Tesseract's default.
    pub tessdata_dir: Option<PathBuf>,
    pub oem: u8,
    pub psm: u8,
}

impl TesseractConfig {
    /// Create a config using the `tesseract` found on `PATH`.
    ///
    /// # Errors
    ///
    /// Returns [`FolioError::OcrUnavailable`] when no executable is found.
    pub fn new(language: impl Into<String>) -> Result<Self> {
        let binary = locate_tesseract().ok_or_else(|| {
            FolioError::OcrUnavailable(
                "tesseract executable not found in any PATH directory".into(),
            )
        })?;
        Ok(Self::with_binary(binary, language))
    }

    /// Create a config pointing at a specific executable.
    pub fn with_binary(binary: impl Into<PathBuf>, language: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
            language: language.into(),
            tessdata_dir: None,
            oem: DEFAULT_OEM,
            psm: DEFAULT_PSM,
        }
    }

    /// Build the config from pipeline settings, locating the executable on
    /// `PATH` when none is configured.
    pub fn from_scan_config(language: &str, scan: &ScanConfig) -> Result<Self> {
        let mut config = match &scan.tesseract_binary {
            Some(binary) => Self::with_binary(binary, language),
            None => Self::new(language)?,
        };
        config.tessdata_dir = scan.tessdata_dir.clone();
        Ok(config)
    }

    pub fn tessdata_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.tessdata_dir = Some(dir.into());
        self
    }

    /// Verify that the executable and the tessdata directory exist.
    pub fn validate(&self) -> Result<()> {
        if !self.binary.is_file() {
            return Err(FolioError::OcrUnavailable(format!(
                "tesseract executable not found at {}",
                self.binary.display()
            )));
        }
        if let Some(dir) = &self.tessdata_dir {
            if !dir.is_dir() {
                return Err(FolioError::OcrUnavailable(format!(
                    "tessdata directory not found at {}",
                    dir.display()
                )));
            }
        }
        if self.language.trim().is_empty() {
            return Err(FolioError::Config("OCR language must not be empty".into()));
        }
        Ok(())
    }
}

/// Search every `PATH` directory for the Tesseract executable.
pub fn locate_tesseract() -> Option<PathBuf> {
    let names: &[&str] = if cfg!(windows) {
        &["tesseract.exe"]
    } else {
        &["tesseract"]
    };
    let paths = std::env::var_os("PATH")?;
    let found = std::env::split_paths(&paths)
        .flat_map(|dir| names.iter().map(move |name| dir.join(name)))
        .find(|candidate| candidate.is_file());
    match &found {
        Some(path) => info!(path = %path.display(), "Tesseract found"),
        None => warn!("Tesseract executable not found in any PATH directory"),
    }
    found
}

/// OCR capability backed by the Tesseract command-line tool.
///
/// Each call writes the page to a temporary PNG, runs
/// `tesseract <png> stdout -l <lang> --oem 3 --psm 3 tsv` and parses the
/// word table from standard output. Calls are independent, so one engine can
/// serve many worker threads at once.
#[derive(Debug, Clone)]
pub struct TesseractEngine {
    config: TesseractConfig,
}

impl TesseractEngine {
    /// Create an engine after checking that the executable exists.
    ///
    /// # Errors
    ///
    /// Returns [`FolioError::OcrUnavailable`] if the executable or tessdata
    /// directory is missing.
    #[instrument(skip_all, fields(
        binary = %config.binary.display(),
        language = %config.language,
    ))]
    pub fn new(config: TesseractConfig) -> Result<Self> {
        config.validate()?;
        info!("Tesseract engine ready");
        Ok(Self { config })
    }

    /// Command-line arguments for recognising the image stored at `image_path`.
    fn command_args(&self, image_path: &Path) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec![
            image_path.as_os_str().to_owned(),
            "stdout".into(),
            "-l".into(),
            self.config.language.clone().into(),
            "--oem".into(),
            self.config.oem.to_string().into(),
            "--psm".into(),
            self.config.psm.to_string().into(),
        ];
        if let Some(dir) = &self.config.tessdata_dir {
            args.push("--tessdata-dir".into());
            args.push(dir.as_os_str().to_owned());
        }
        args.push("tsv".into());
        args
    }
}

impl OcrCapability for TesseractEngine {
    #[instrument(skip_all, fields(width = image.width(), height = image.height()))]
    fn recognize(&self, image: &DynamicImage) -> Result<Vec<OcrWord>> {
        let page_file = tempfile::Builder::new()
            .prefix("folio-page-")
            .suffix(".png")
            .tempfile()
            .map_err(|err| {
                FolioError::OcrInvocation(format!("failed to create temporary page file: {err}"))
            })?;

        image
            .save_with_format(page_file.path(), ImageFormat::Png)
            .map_err(|err| {
                FolioError::OcrInvocation(format!("failed to write temporary page image: {err}"))
            })?;

        let output = Command::new(&self.config.binary)
            .args(self.command_args(page_file.path()))
            .output()
            .map_err(|err| {
                FolioError::OcrInvocation(format!(
                    "failed to run {}: {}",
                    self.config.binary.display(),
                    err
                ))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(FolioError::OcrInvocation(format!(
                "tesseract exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        let words = parse_tsv(&String::from_utf8_lossy(&output.stdout));
        debug!(word_count = words.len(), "Tesseract recognition complete");
        Ok(words)
    }
}

/// Parse Tesseract's TSV output into words.
///
/// Tesseract numbers lines within each paragraph, so `line_num` restarts in
/// every block. Lines are renumbered page-wide here, in order of first
/// appearance, so that sorting by `line_num` yields reading order.
/// Malformed rows are skipped.
pub fn parse_tsv(tsv: &str) -> Vec<OcrWord> {
    let mut line_index: HashMap<(u32, u32, u32, u32), i32> = HashMap::new();
    let mut words = Vec::new();

    for row in tsv.lines() {
        if row.is_empty() || row.starts_with("level") {
            continue;
        }
        let fields: Vec<&str> = row.splitn(TSV_COLUMNS, '\t').collect();
        if fields.len() < TSV_COLUMNS - 1 {
            debug!(row, "Skipping short TSV row");
            continue;
        }

        let key = match (
            fields[1].parse::<u32>(),
            fields[2].parse::<u32>(),
            fields[3].parse::<u32>(),
            fields[4].parse::<u32>(),
        ) {
            (Ok(page), Ok(block), Ok(par), Ok(line)) => (page, block, par, line),
            _ => {
                debug!(row, "Skipping TSV row with non-numeric layout columns");
                continue;
            }
        };
        let Ok(confidence) = fields[10].trim().parse::<f32>() else {
            debug!(row, "Skipping TSV row with non-numeric confidence");
            continue;
        };

        let next_index = line_index.len() as i32;
        let line_num = *line_index.entry(key).or_insert(next_index);
        let text = fields.get(11).copied().unwrap_or_default();

        words.push(OcrWord::new(
            text,
            (confidence.round() as i32).clamp(-1, 100),
            line_num,
        ));
    }

    words
}
