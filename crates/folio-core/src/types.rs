// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the Folio OCR pipeline.

use serde::{Deserialize, Serialize};

use crate::error::FolioError;

/// The four cardinal rotations evaluated by the coarse orientation search,
/// in evaluation order.
pub const CARDINAL_ANGLES: [i32; 4] = [0, 90, 180, 270];

/// A single token reported by the OCR engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OcrWord {
    /// Recognised text (may be empty for layout rows).
    pub text: String,
    /// Engine confidence in `[-1, 100]`; `-1` marks non-text regions.
    pub confidence: i32,
    /// Line index as reported by the engine.
    pub line_num: i32,
}

impl OcrWord {
    pub fn new(text: impl Into<String>, confidence: i32, line_num: i32) -> Self {
        Self {
            text: text.into(),
            confidence,
            line_num,
        }
    }

    /// Whether the engine scored this token at all.
    pub fn has_confidence(&self) -> bool {
        self.confidence >= 0
    }
}

/// Outcome of one orientation search over a page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageRecognitionResult {
    /// Reassembled text at the winning angle.
    pub text: String,
    /// Winning rotation in degrees: a cardinal angle plus a bounded fine offset.
    pub angle: i32,
    /// Mean OCR confidence at the winning angle, in `[0, 100]`.
    pub confidence: f64,
}

/// How much effort the orientation search spends on a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum OrientationMode {
    /// Recognise the page as-is.
    #[default]
    Off,
    /// Try the four cardinal rotations.
    Coarse,
    /// Cardinal rotations followed by a single-degree hill-climb.
    Fine,
}

impl OrientationMode {
    pub fn runs_coarse(self) -> bool {
        !matches!(self, Self::Off)
    }

    pub fn runs_fine(self) -> bool {
        matches!(self, Self::Fine)
    }
}

impl TryFrom<u8> for OrientationMode {
    type Error = FolioError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Off),
            1 => Ok(Self::Coarse),
            2 => Ok(Self::Fine),
            other => Err(FolioError::InvalidOrientationMode(other)),
        }
    }
}

impl From<OrientationMode> for u8 {
    fn from(mode: OrientationMode) -> Self {
        match mode {
            OrientationMode::Off => 0,
            OrientationMode::Coarse => 1,
            OrientationMode::Fine => 2,
        }
    }
}

/// Page-record stream written by the OCR step.
pub const OCR_RESULT_FILE: &str = "ocr_result.txt";
/// Cleaned text written by the sanitize step.
pub const SANITIZED_RESULT_FILE: &str = "sanitized_result.txt";

/// Metadata line written ahead of each page's text in the OCR result file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageRecord {
    pub new_page: bool,
    pub page_number: usize,
    pub page_file: String,
    /// Missing from records written before confidences were reported.
    #[serde(default)]
    pub confidence: f64,
    #[serde(default)]
    pub final_angle: i32,
    /// Present only for pages that could not be recognised.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PageRecord {
    /// Parse a line of the result file as a page record.
    ///
    /// Accepts bare JSON as well as the older single-quoted form `'{...}'`.
    /// Returns `None` for ordinary text lines.
    pub fn parse_line(line: &str) -> Option<Self> {
        let trimmed = line.trim();
        let json = trimmed
            .strip_prefix('\'')
            .and_then(|rest| rest.strip_suffix('\''))
            .unwrap_or(trimmed);
        if !json.starts_with('{') {
            return None;
        }
        serde_json::from_str::<PageRecord>(json)
            .ok()
            .filter(|record| record.new_page)
    }
}

/// Result of processing a single page: either recognised text or the reason
/// the page was skipped.
#[derive(Debug, Clone, PartialEq)]
pub enum PageStatus {
    Recognized(PageRecognitionResult),
    Failed { reason: String },
}

/// Per-page result carried through the batch in page order.
#[derive(Debug, Clone, PartialEq)]
pub struct PageOutcome {
    /// 1-based page index in sorted file order.
    pub page_number: usize,
    pub page_file: String,
    pub status: PageStatus,
}

impl PageOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self.status, PageStatus::Failed { .. })
    }

    /// The metadata record describing this page.
    pub fn record(&self) -> PageRecord {
        let (confidence, final_angle, error) = match &self.status {
            PageStatus::Recognized(result) => (result.confidence, result.angle, None),
            PageStatus::Failed { reason } => (0.0, 0, Some(reason.clone())),
        };
        PageRecord {
            new_page: true,
            page_number: self.page_number,
            page_file: self.page_file.clone(),
            confidence,
            final_angle,
            error,
        }
    }

    /// Recognised text, empty for failed pages.
    pub fn text(&self) -> &str {
        match &self.status {
            PageStatus::Recognized(result) => &result.text,
            PageStatus::Failed { .. } => "",
        }
    }
}
