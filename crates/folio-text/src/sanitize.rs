// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Sanitize step — turns the page-record stream written by the OCR step into
// clean running text.
//
// Page records are dropped first, so a word broken across a page boundary is
// repaired like any other line break. Hyphenation repair runs before fuzzy
// correction: correcting the halves of a split word would only damage them.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use folio_core::config::SanitizeConfig;
use folio_core::error::Result;
use folio_core::types::{OCR_RESULT_FILE, PageRecord, SANITIZED_RESULT_FILE};
use rayon::prelude::*;
use tracing::{info, instrument};

use crate::dictionary::Dictionary;
use crate::fuzzy::FuzzyCorrector;
use crate::hyphen::HyphenReconstructor;

/// Summary of one sanitize run.
#[derive(Debug, Clone, PartialEq)]
pub struct SanitizeReport {
    /// Text lines read, page records excluded.
    pub input_lines: usize,
    pub output_lines: usize,
    /// Tokens replaced by fuzzy correction.
    pub replacements: usize,
    pub output_path: PathBuf,
}

/// Text lines of a result stream, with page-record lines removed.
pub fn strip_page_records(text: &str) -> Vec<&str> {
    text.lines()
        .filter(|line| PageRecord::parse_line(line).is_none())
        .collect()
}

/// Hyphenation repair followed by fuzzy correction.
pub struct Sanitizer {
    hyphens: HyphenReconstructor,
    corrector: FuzzyCorrector,
}

impl Sanitizer {
    pub fn new(dictionary: Arc<dyn Dictionary>, config: &SanitizeConfig) -> Self {
        Self {
            hyphens: HyphenReconstructor::new(dictionary.clone(), config.endings.clone()),
            corrector: FuzzyCorrector::new(dictionary, config.accept_threshold),
        }
    }

    /// Sanitize plain text lines, returning the output lines and the number
    /// of replaced tokens.
    pub fn sanitize_lines<S: AsRef<str>>(&self, lines: &[S]) -> (Vec<String>, usize) {
        let reconstructed = self.hyphens.reconstruct(lines);
        let corrected: Vec<(String, usize)> = reconstructed
            .par_iter()
            .map(|line| self.corrector.correct_counted(line))
            .collect();

        let replacements = corrected.iter().map(|(_, count)| count).sum();
        let lines = corrected.into_iter().map(|(line, _)| line).collect();
        (lines, replacements)
    }

    /// Sanitize `<dir>/ocr_result.txt` into `<dir>/sanitized_result.txt`.
    #[instrument(skip_all, fields(dir = %dir.as_ref().display()))]
    pub fn run(&self, dir: impl AsRef<Path>) -> Result<SanitizeReport> {
        let dir = dir.as_ref();
        let raw = std::fs::read_to_string(dir.join(OCR_RESULT_FILE))?;
        let text_lines = strip_page_records(&raw);

        let (lines, replacements) = self.sanitize_lines(&text_lines);

        let output_path = dir.join(SANITIZED_RESULT_FILE);
        std::fs::write(&output_path, lines.join("\n"))?;

        let report = SanitizeReport {
            input_lines: text_lines.len(),
            output_lines: lines.len(),
            replacements,
            output_path,
        };
        info!(
            input_lines = report.input_lines,
            output_lines = report.output_lines,
            replacements = report.replacements,
            "Sanitized text written"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dictionary::WordListDictionary;
    use folio_core::error::FolioError;

    fn sanitizer() -> Sanitizer {
        let dictionary = Arc::new(WordListDictionary::from_words([
            "Staatsangehörigkeit",
            "Zeitung",
            "Die",
        ]));
        Sanitizer::new(dictionary, &SanitizeConfig::default())
    }

    const RESULT: &str = r#"{"new_page":true,"page_number":1,"page_file":"p1.jpg","confidence":88.5,"final_angle":0}
Die Staats-
'{"new_page": true, "page_number": 2, "page_file": "p2.jpg", "confidence": 71.0, "final_angle": 90}'
angehörigkeit der Zeitunq
{"new_page":true,"page_number":3,"page_file":"p3.jpg","confidence":0.0,"final_angle":0,"error":"failed to load page image"}
"#;

    #[test]
    fn page_records_are_removed() {
        let lines = strip_page_records(RESULT);
        assert_eq!(lines, vec!["Die Staats-", "angehörigkeit der Zeitunq"]);
    }

    #[test]
    fn records_without_confidence_are_removed() {
        let text = "'{\"new_page\": true, \"page_number\": 1, \"page_file\": \"scan_001.jpg\", \"final_angle\": 90}'\nStaats-\nangehörigkeit weiter\n";
        let lines = strip_page_records(text);
        assert_eq!(lines, vec!["Staats-", "angehörigkeit weiter"]);
    }

    #[test]
    fn ordinary_braces_are_kept() {
        let lines = strip_page_records("{nicht json}\n{\"new_page\": false}");
        assert_eq!(lines.len(), 2);
    }

    #[test]
    fn merges_across_pages_then_corrects() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(OCR_RESULT_FILE), RESULT).unwrap();

        let report = sanitizer().run(dir.path()).unwrap();
        assert_eq!(report.input_lines, 2);
        assert_eq!(report.output_lines, 1);
        assert_eq!(report.replacements, 0);

        let written = std::fs::read_to_string(&report.output_path).unwrap();
        assert_eq!(written, "Die Staatsangehörigkeit der Zeitunq");
    }

    #[test]
    fn lower_threshold_enables_correction() {
        let dictionary = Arc::new(WordListDictionary::from_words(["Zeitung"]));
        let config = SanitizeConfig {
            accept_threshold: 0.8,
            ..SanitizeConfig::default()
        };
        let (lines, replacements) =
            Sanitizer::new(dictionary, &config).sanitize_lines(&["Die Zeitunq", "von heute"]);
        assert_eq!(lines, vec!["Die Zeitung von heute"]);
        assert_eq!(replacements, 1);
    }

    #[test]
    fn missing_result_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(sanitizer().run(dir.path()), Err(FolioError::Io(_))));
    }
}
