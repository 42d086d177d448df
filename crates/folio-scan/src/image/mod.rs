// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image module — page preprocessing and rotation.

pub mod page;
pub mod processor;

pub use page::PageImage;
pub use processor::ImageProcessor;
