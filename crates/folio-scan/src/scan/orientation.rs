// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Orientation search — finds the rotation at which the OCR engine is most
// confident about a page.
//
// ## Phases
//
// 1. **Coarse** — the four cardinal rotations in order 0, 90, 180, 270. A
//    candidate only replaces the best so far when it scores strictly higher,
//    so ties keep the earliest angle. The loop stops as soon as a candidate
//    clears the high-confidence threshold.
// 2. **Fine** — a greedy single-degree hill-climb around the coarse winner:
//    keep stepping +1° while the score improves (at most `max_fine_steps`).
//    Only if the very first +1° step fails is the −1° direction tried. There
//    is no backtracking. The fine phase only runs once the coarse winner has
//    cleared the high-confidence threshold; below that the page is mostly
//    noise and the extra OCR passes buy nothing.

use folio_core::config::ScanConfig;
use folio_core::error::Result;
use folio_core::types::{CARDINAL_ANGLES, OrientationMode, PageRecognitionResult};
use tracing::{debug, info, instrument};

use super::confidence::ConfidenceExtractor;
use super::ocr::OcrCapability;
use crate::image::PageImage;

/// Default score above which the coarse search stops early.
pub const DEFAULT_HIGH_CONFIDENCE_THRESHOLD: f64 = 40.0;
/// Default bound on single-degree steps in either direction.
pub const DEFAULT_MAX_FINE_STEPS: u32 = 10;

/// Confidence-driven rotation search over one page.
#[derive(Debug, Clone, Copy)]
pub struct OrientationSearch {
    extractor: ConfidenceExtractor,
    high_confidence_threshold: f64,
    max_fine_steps: u32,
}

impl Default for OrientationSearch {
    fn default() -> Self {
        Self {
            extractor: ConfidenceExtractor::default(),
            high_confidence_threshold: DEFAULT_HIGH_CONFIDENCE_THRESHOLD,
            max_fine_steps: DEFAULT_MAX_FINE_STEPS,
        }
    }
}

impl OrientationSearch {
    pub fn new(
        extractor: ConfidenceExtractor,
        high_confidence_threshold: f64,
        max_fine_steps: u32,
    ) -> Self {
        Self {
            extractor,
            high_confidence_threshold,
            max_fine_steps,
        }
    }

    pub fn from_config(scan: &ScanConfig) -> Self {
        Self::new(
            ConfidenceExtractor::new(scan.keep_threshold),
            scan.high_confidence_threshold,
            scan.max_fine_steps,
        )
    }

    /// Find the rotation of `page` that maximises OCR confidence.
    ///
    /// Failing to improve on angle 0 is a normal outcome, not an error.
    ///
    /// # Errors
    ///
    /// Propagates [`FolioError::OcrInvocation`](folio_core::FolioError) from
    /// the first OCR call that fails; the page cannot be scored without it.
    #[instrument(skip_all, fields(mode = ?mode, size = ?page.dimensions()))]
    pub fn search(
        &self,
        page: &PageImage,
        ocr: &dyn OcrCapability,
        mode: OrientationMode,
    ) -> Result<PageRecognitionResult> {
        let mut best = if mode.runs_coarse() {
            self.coarse(page, ocr)?
        } else {
            self.evaluate(page, ocr, 0)?
        };

        if mode.runs_fine() {
            if best.confidence > self.high_confidence_threshold {
                best = self.fine(page, ocr, best)?;
            } else {
                debug!(
                    confidence = best.confidence,
                    "Coarse winner below threshold, skipping fine search"
                );
            }
        }

        info!(angle = best.angle, confidence = best.confidence, "Orientation chosen");
        Ok(best)
    }

    /// Recognise the page at `angle` and score it.
    fn evaluate(
        &self,
        page: &PageImage,
        ocr: &dyn OcrCapability,
        angle: i32,
    ) -> Result<PageRecognitionResult> {
        let extraction = self.extractor.extract(&page.view_at(angle), ocr)?;
        debug!(angle, confidence = extraction.confidence, "Candidate evaluated");
        Ok(PageRecognitionResult {
            text: extraction.text,
            angle,
            confidence: extraction.confidence,
        })
    }

    fn coarse(&self, page: &PageImage, ocr: &dyn OcrCapability) -> Result<PageRecognitionResult> {
        let mut best: Option<PageRecognitionResult> = None;

        for angle in CARDINAL_ANGLES {
            let candidate = self.evaluate(page, ocr, angle)?;
            let confident = candidate.confidence > self.high_confidence_threshold;
            let improves = best
                .as_ref()
                .is_none_or(|current| candidate.confidence > current.confidence);
            if improves {
                best = Some(candidate);
            }
            if confident {
                debug!(angle, "High-confidence candidate, ending coarse search");
                break;
            }
        }

        // CARDINAL_ANGLES is non-empty, so the first candidate always lands.
        Ok(best.unwrap_or_else(|| PageRecognitionResult {
            text: String::new(),
            angle: 0,
            confidence: 0.0,
        }))
    }

    fn fine(
        &self,
        page: &PageImage,
        ocr: &dyn OcrCapability,
        start: PageRecognitionResult,
    ) -> Result<PageRecognitionResult> {
        let (best, improved) = self.climb(page, ocr, start, 1)?;
        if improved {
            return Ok(best);
        }
        let (best, _) = self.climb(page, ocr, best, -1)?;
        Ok(best)
    }

    /// Step `direction` degrees at a time while the score strictly improves.
    fn climb(
        &self,
        page: &PageImage,
        ocr: &dyn OcrCapability,
        start: PageRecognitionResult,
        direction: i32,
    ) -> Result<(PageRecognitionResult, bool)> {
        let mut best = start;
        let mut improved = false;

        for _ in 0..self.max_fine_steps {
            let candidate = self.evaluate(page, ocr, best.angle + direction)?;
            if candidate.confidence <= best.confidence {
                break;
            }
            best = candidate;
            improved = true;
        }

        Ok((best, improved))
    }
}
