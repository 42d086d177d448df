// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Pipeline steps behind the `ocr`, `sanitize` and `run` subcommands.
//
// Startup problems (missing Tesseract, unreadable dictionary, bad directory)
// are returned as errors before any page is touched. Page failures are not:
// they are listed in the batch report and the command still succeeds.

use std::path::Path;
use std::sync::Arc;

use folio_core::config::PipelineConfig;
use folio_core::error::{FolioError, Result};
use folio_core::types::PageStatus;
use folio_scan::{BatchReport, PageBatch, TesseractConfig, TesseractEngine};
use folio_text::{Dictionary, SanitizeReport, Sanitizer, load_dictionary};
use tracing::{info, warn};

fn ensure_dir(dir: &Path) -> Result<()> {
    if dir.is_dir() {
        Ok(())
    } else {
        Err(FolioError::Config(format!(
            "input directory {} does not exist",
            dir.display()
        )))
    }
}

/// Recognise every page in `dir` and write `ocr_result.txt`.
pub fn run_ocr(dir: &Path, config: &PipelineConfig) -> Result<BatchReport> {
    ensure_dir(dir)?;
    let engine = TesseractEngine::new(TesseractConfig::from_scan_config(
        &config.language,
        &config.scan,
    )?)?;
    info!(language = %config.language, "Tesseract ready");

    let report = PageBatch::new(config, &engine).run(dir)?;
    for outcome in &report.outcomes {
        if let PageStatus::Failed { reason } = &outcome.status {
            warn!(page = outcome.page_number, file = %outcome.page_file, %reason, "Page not recognised");
        }
    }
    println!(
        "{} of {} pages recognised ({} failed) -> {}",
        report.succeeded(),
        report.outcomes.len(),
        report.failed(),
        report.output_path.display()
    );
    Ok(report)
}

/// Sanitize `dir/ocr_result.txt` into `sanitized_result.txt`.
pub fn run_sanitize(dir: &Path, config: &PipelineConfig) -> Result<SanitizeReport> {
    ensure_dir(dir)?;
    let dictionary = load_dictionary(&config.language, &config.sanitize)?;
    sanitize_with(dir, config, dictionary)
}

/// OCR then sanitize. The dictionary is loaded first so a bad dictionary
/// fails the run before any page is recognised.
pub fn run_all(dir: &Path, config: &PipelineConfig) -> Result<()> {
    ensure_dir(dir)?;
    let dictionary = load_dictionary(&config.language, &config.sanitize)?;
    run_ocr(dir, config)?;
    sanitize_with(dir, config, dictionary)?;
    Ok(())
}

fn sanitize_with(
    dir: &Path,
    config: &PipelineConfig,
    dictionary: Arc<dyn Dictionary>,
) -> Result<SanitizeReport> {
    let report = Sanitizer::new(dictionary, &config.sanitize).run(dir)?;
    println!(
        "{} lines -> {} lines, {} words corrected -> {}",
        report.input_lines,
        report.output_lines,
        report.replacements,
        report.output_path.display()
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_core::types::{OCR_RESULT_FILE, SANITIZED_RESULT_FILE};

    #[test]
    fn missing_directory_fails_before_startup() {
        let config = PipelineConfig::default();
        let missing = Path::new("/nonexistent/folio/scans");
        assert!(matches!(run_ocr(missing, &config), Err(FolioError::Config(_))));
        assert!(matches!(run_sanitize(missing, &config), Err(FolioError::Config(_))));
        assert!(matches!(run_all(missing, &config), Err(FolioError::Config(_))));
    }

    #[test]
    fn sanitize_uses_configured_dictionary() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("german.dic"), "Staatsangehörigkeit/P\n").unwrap();
        std::fs::write(
            dir.path().join(OCR_RESULT_FILE),
            "{\"new_page\":true,\"page_number\":1,\"page_file\":\"a.png\",\"confidence\":80.0,\"final_angle\":0}\nStaats-\nangehörigkeit\n",
        )
        .unwrap();

        let mut config = PipelineConfig::default();
        config.sanitize.dictionary_dir = dir.path().to_path_buf();

        let report = run_sanitize(dir.path(), &config).unwrap();
        assert_eq!(report.output_lines, 1);
        let text = std::fs::read_to_string(dir.path().join(SANITIZED_RESULT_FILE)).unwrap();
        assert_eq!(text, "Staatsangehörigkeit");
    }

    #[test]
    fn run_checks_dictionary_before_ocr() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = PipelineConfig::default();
        config.sanitize.dictionary_dir = dir.path().join("missing");
        assert!(matches!(
            run_all(dir.path(), &config),
            Err(FolioError::DictionaryLoad(_))
        ));
        assert!(!dir.path().join(OCR_RESULT_FILE).exists());
    }

    #[test]
    fn sanitize_fails_on_unsupported_language() {
        let dir = tempfile::tempdir().unwrap();
        let config = PipelineConfig {
            language: "tlh".into(),
            ..PipelineConfig::default()
        };
        assert!(matches!(
            run_sanitize(dir.path(), &config),
            Err(FolioError::UnsupportedLanguage(_))
        ));
    }
}
