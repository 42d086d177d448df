// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Confidence-filtered text extraction.
//
// One OCR pass over one orientation of a page. Words the engine is unsure of
// are kept out of the text, but the page-level score averages every scored
// word so that the orientation search still sees low-confidence structure.

use std::collections::BTreeMap;

use folio_core::error::Result;
use folio_core::types::OcrWord;
use image::DynamicImage;
use tracing::{debug, instrument};

use super::ocr::OcrCapability;

/// Default cut-off: words scored at or below this are dropped from the text.
pub const DEFAULT_KEEP_THRESHOLD: i32 = 60;

/// Text and aggregate confidence of a single OCR pass.
#[derive(Debug, Clone, PartialEq)]
pub struct Extraction {
    pub text: String,
    /// Mean of all non-negative word confidences, `0.0` when there are none.
    pub confidence: f64,
}

/// Runs OCR once and reassembles confident words into lines.
#[derive(Debug, Clone, Copy)]
pub struct ConfidenceExtractor {
    keep_threshold: i32,
}

impl Default for ConfidenceExtractor {
    fn default() -> Self {
        Self::new(DEFAULT_KEEP_THRESHOLD)
    }
}

impl ConfidenceExtractor {
    pub fn new(keep_threshold: i32) -> Self {
        Self { keep_threshold }
    }

    /// Recognise `image` with `ocr` and score the result.
    #[instrument(skip_all, fields(keep_threshold = self.keep_threshold))]
    pub fn extract(&self, image: &DynamicImage, ocr: &dyn OcrCapability) -> Result<Extraction> {
        let words = ocr.recognize(image)?;
        let extraction = self.assemble(&words);
        debug!(
            words = words.len(),
            confidence = extraction.confidence,
            "Extraction scored"
        );
        Ok(extraction)
    }

    /// Build the page text and confidence from already-recognised words.
    pub fn assemble(&self, words: &[OcrWord]) -> Extraction {
        Extraction {
            text: self.reassemble_lines(words),
            confidence: mean_confidence(words),
        }
    }

    /// Group words above the keep threshold by line, in OCR order, and join
    /// them: spaces within a line, newlines between lines in `line_num` order.
    fn reassemble_lines(&self, words: &[OcrWord]) -> String {
        let mut lines: BTreeMap<i32, Vec<&str>> = BTreeMap::new();
        for word in words {
            if word.confidence <= self.keep_threshold || word.text.trim().is_empty() {
                continue;
            }
            lines.entry(word.line_num).or_default().push(word.text.as_str());
        }

        lines
            .values()
            .map(|line| line.join(" "))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Mean of every non-negative confidence; negative values mark non-text
/// regions and are never averaged.
pub fn mean_confidence(words: &[OcrWord]) -> f64 {
    let (sum, count) = words
        .iter()
        .filter(|word| word.has_confidence())
        .fold((0i64, 0usize), |(sum, count), word| {
            (sum + i64::from(word.confidence), count + 1)
        });
    if count == 0 {
        0.0
    } else {
        sum as f64 / count as f64
    }
}
