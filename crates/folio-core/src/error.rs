// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Folio.

use thiserror::Error;

/// Top-level error type for all Folio operations.
#[derive(Debug, Error)]
pub enum FolioError {
    // -- Page errors (isolated per page, the batch continues) --
    #[error("failed to load page image: {0}")]
    ImageLoad(String),

    #[error("OCR invocation failed: {0}")]
    OcrInvocation(String),

    // -- Startup errors (fatal before any page is processed) --
    #[error("OCR engine unavailable: {0}")]
    OcrUnavailable(String),

    #[error("failed to load dictionary: {0}")]
    DictionaryLoad(String),

    #[error("unsupported language: {0}")]
    UnsupportedLanguage(String),

    #[error("invalid orientation mode {0} (expected 0, 1 or 2)")]
    InvalidOrientationMode(u8),

    #[error("invalid configuration: {0}")]
    Config(String),

    // -- Storage / persistence --
    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl FolioError {
    /// Whether this error only affects the page that raised it.
    pub fn is_page_local(&self) -> bool {
        matches!(self, Self::ImageLoad(_) | Self::OcrInvocation(_))
    }
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, FolioError>;
