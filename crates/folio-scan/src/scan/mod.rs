// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Recognition pipeline — the OCR capability and its Tesseract backend,
// confidence-filtered extraction, and the orientation search built on top.

pub mod confidence;
pub mod ocr;
pub mod orientation;

pub use confidence::{ConfidenceExtractor, Extraction};
pub use ocr::{OcrCapability, TesseractConfig, TesseractEngine};
pub use orientation::OrientationSearch;
