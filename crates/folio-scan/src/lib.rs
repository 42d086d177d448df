// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// folio-scan — Page recognition for Folio.
//
// Preprocesses scanned page images (grayscale, upscale, denoise, binarize),
// drives Tesseract through its command-line interface, searches for the
// orientation that reads best, and writes the page-record stream for a whole
// directory of pages.

pub mod batch;
pub mod image;
pub mod scan;

// Re-export the primary types so callers can use `folio_scan::PageBatch` etc.
pub use batch::{BatchReport, PageBatch};
pub use image::{ImageProcessor, PageImage};
pub use scan::{
    ConfidenceExtractor, Extraction, OcrCapability, OrientationSearch, TesseractConfig,
    TesseractEngine,
};
