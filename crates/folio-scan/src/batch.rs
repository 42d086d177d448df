// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Page batch — runs preprocessing and the orientation search over every page
// image in a directory and writes the page-record stream.
//
// Pages are independent: they may be recognised on a rayon pool, and a page
// that fails is recorded and skipped without stopping the batch. Results are
// always written in page order, whatever order the workers finish in.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use folio_core::config::PipelineConfig;
use folio_core::error::{FolioError, Result};
use folio_core::types::{OCR_RESULT_FILE, PageOutcome, PageRecognitionResult, PageStatus};
use rayon::prelude::*;
use tracing::{error, info, instrument, warn};

use crate::image::{ImageProcessor, PageImage};
use crate::scan::ocr::OcrCapability;
use crate::scan::orientation::OrientationSearch;

/// Subdirectory receiving preprocessed pages when saving is enabled.
pub const PREPROCESSED_DIR: &str = "preprocessed_images";

const IMAGE_EXTENSIONS: [&str; 5] = ["jpg", "jpeg", "png", "tif", "tiff"];

/// Summary of one batch run.
#[derive(Debug, Clone)]
pub struct BatchReport {
    /// One entry per discovered page, in page order.
    pub outcomes: Vec<PageOutcome>,
    pub output_path: PathBuf,
}

impl BatchReport {
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| !o.is_failure()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_failure()).count()
    }
}

/// List the page images in `dir`, sorted by file name.
pub fn discover_pages(dir: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
    let mut pages: Vec<PathBuf> = std::fs::read_dir(dir.as_ref())?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.is_file() && is_page_image(path))
        .collect();
    pages.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(pages)
}

fn is_page_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            IMAGE_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
}

/// Processes the pages of one directory against a shared OCR capability.
pub struct PageBatch<'a> {
    config: &'a PipelineConfig,
    ocr: &'a dyn OcrCapability,
    search: OrientationSearch,
}

impl<'a> PageBatch<'a> {
    pub fn new(config: &'a PipelineConfig, ocr: &'a dyn OcrCapability) -> Self {
        Self {
            config,
            ocr,
            search: OrientationSearch::from_config(&config.scan),
        }
    }

    /// Recognise every page in `input_dir` and write `ocr_result.txt` there.
    ///
    /// # Errors
    ///
    /// Only directory-level problems (unreadable directory, unwritable result
    /// file, bad worker count) fail the batch; page failures are recorded in
    /// the report instead.
    #[instrument(skip_all, fields(input_dir = %input_dir.as_ref().display()))]
    pub fn run(&self, input_dir: impl AsRef<Path>) -> Result<BatchReport> {
        let input_dir = input_dir.as_ref();
        let pages = discover_pages(input_dir)?;
        info!(pages = pages.len(), "Starting OCR batch");

        if self.config.scan.save_preprocessed {
            std::fs::create_dir_all(input_dir.join(PREPROCESSED_DIR))?;
        }

        let outcomes = self.process_all(&pages, input_dir)?;

        let output_path = input_dir.join(OCR_RESULT_FILE);
        write_results(&outcomes, &output_path)?;

        let report = BatchReport {
            outcomes,
            output_path,
        };
        info!(
            succeeded = report.succeeded(),
            failed = report.failed(),
            output = %report.output_path.display(),
            "OCR batch complete"
        );
        Ok(report)
    }

    fn process_all(&self, pages: &[PathBuf], input_dir: &Path) -> Result<Vec<PageOutcome>> {
        let work = || {
            pages
                .par_iter()
                .enumerate()
                .map(|(index, path)| self.process_page(index + 1, path, input_dir))
                .collect::<Vec<_>>()
        };

        match self.config.workers {
            Some(threads) => {
                let pool = rayon::ThreadPoolBuilder::new()
                    .num_threads(threads)
                    .build()
                    .map_err(|err| {
                        FolioError::Config(format!("failed to build worker pool: {err}"))
                    })?;
                Ok(pool.install(work))
            }
            None => Ok(work()),
        }
    }

    /// Process one page. Never fails: errors become a `Failed` outcome.
    pub fn process_page(&self, page_number: usize, path: &Path, input_dir: &Path) -> PageOutcome {
        let page_file = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();

        let status = match self.recognize_page(path, input_dir) {
            Ok(result) => {
                info!(
                    page = page_number,
                    file = %page_file,
                    angle = result.angle,
                    confidence = result.confidence,
                    "Page processed"
                );
                PageStatus::Recognized(result)
            }
            Err(err) => {
                if err.is_page_local() {
                    warn!(page = page_number, file = %page_file, error = %err, "Page skipped");
                } else {
                    error!(page = page_number, file = %page_file, error = %err, "Page failed");
                }
                PageStatus::Failed {
                    reason: err.to_string(),
                }
            }
        };

        PageOutcome {
            page_number,
            page_file,
            status,
        }
    }

    fn recognize_page(&self, path: &Path, input_dir: &Path) -> Result<PageRecognitionResult> {
        let processed = ImageProcessor::open(path)?.preprocess(&self.config.scan);
        let mut page = PageImage::new(processed.into_dynamic());

        let result = self
            .search
            .search(&page, self.ocr, self.config.scan.orientation)?;

        if self.config.scan.save_preprocessed {
            page.set_angle(result.angle);
            if let Some(name) = path.file_name() {
                let target = input_dir.join(PREPROCESSED_DIR).join(name);
                if let Err(err) = ImageProcessor::from_dynamic(page.view()).save(&target) {
                    warn!(error = %err, "Could not save preprocessed page");
                }
            }
        }

        Ok(result)
    }
}

/// Write the page-record stream: for every page a JSON record line followed
/// by the page text.
pub fn write_results(outcomes: &[PageOutcome], path: impl AsRef<Path>) -> Result<()> {
    let mut out = BufWriter::new(File::create(path.as_ref())?);
    for outcome in outcomes {
        writeln!(out, "{}", serde_json::to_string(&outcome.record())?)?;
        let text = outcome.text();
        if !text.is_empty() {
            writeln!(out, "{text}")?;
        }
    }
    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_core::types::{OcrWord, OrientationMode, PageRecord};
    use image::{DynamicImage, GrayImage, Luma};

    /// Answers with one confident word whose text is the image width, so each
    /// page's output can be traced back to its input.
    struct WidthOcr;

    impl OcrCapability for WidthOcr {
        fn recognize(&self, image: &DynamicImage) -> Result<Vec<OcrWord>> {
            if image.width() == 2 * 13 {
                return Err(FolioError::OcrInvocation("engine crashed".into()));
            }
            Ok(vec![
                OcrWord::new(format!("w{}", image.width()), 90, 1),
                OcrWord::new("Seite", 80, 2),
            ])
        }
    }

    fn write_page(dir: &Path, name: &str, width: u32) {
        GrayImage::from_pixel(width, 8, Luma([255u8]))
            .save(dir.join(name))
            .unwrap();
    }

    #[test]
    fn discover_pages_filters_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        write_page(dir.path(), "b.png", 4);
        write_page(dir.path(), "a.PNG", 4);
        std::fs::write(dir.path().join("notes.txt"), "x").unwrap();
        std::fs::create_dir(dir.path().join("sub.jpg")).unwrap();

        let pages = discover_pages(dir.path()).unwrap();
        let names: Vec<_> = pages
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.PNG", "b.png"]);
    }

    #[test]
    fn batch_keeps_page_order_and_isolates_failures() {
        let dir = tempfile::tempdir().unwrap();
        write_page(dir.path(), "page_01.png", 10);
        write_page(dir.path(), "page_02.png", 11);
        write_page(dir.path(), "page_03.png", 13); // OCR fails for this one
        std::fs::write(dir.path().join("page_04.jpg"), b"not an image").unwrap();
        write_page(dir.path(), "page_05.png", 12);

        let config = PipelineConfig {
            workers: Some(3),
            ..PipelineConfig::default()
        };
        let report = PageBatch::new(&config, &WidthOcr).run(dir.path()).unwrap();

        assert_eq!(report.outcomes.len(), 5);
        assert_eq!(report.succeeded(), 3);
        assert_eq!(report.failed(), 2);
        let numbers: Vec<_> = report.outcomes.iter().map(|o| o.page_number).collect();
        assert_eq!(numbers, vec![1, 2, 3, 4, 5]);
        assert!(matches!(
            report.outcomes[3].status,
            PageStatus::Failed { ref reason } if reason.contains("load page image")
        ));

        let written = std::fs::read_to_string(&report.output_path).unwrap();
        let lines: Vec<&str> = written.lines().collect();
        assert_eq!(PageRecord::parse_line(lines[0]).unwrap().page_file, "page_01.png");
        assert_eq!(lines[1], "w20");
        assert_eq!(lines[2], "Seite");
        assert_eq!(PageRecord::parse_line(lines[3]).unwrap().page_number, 2);
        assert_eq!(lines[4], "w22");
        let failed = PageRecord::parse_line(lines[6]).unwrap();
        assert_eq!(failed.page_number, 3);
        assert!(failed.error.unwrap().contains("engine crashed"));
        assert_eq!(PageRecord::parse_line(lines[7]).unwrap().page_number, 4);
        assert_eq!(PageRecord::parse_line(lines[8]).unwrap().page_number, 5);
        assert_eq!(lines[9], "w24");
    }

    #[test]
    fn batch_saves_preprocessed_pages() {
        let dir = tempfile::tempdir().unwrap();
        write_page(dir.path(), "scan.png", 6);
        let mut config = PipelineConfig::default();
        config.scan.save_preprocessed = true;
        config.scan.orientation = OrientationMode::Coarse;

        let report = PageBatch::new(&config, &WidthOcr).run(dir.path()).unwrap();
        assert_eq!(report.succeeded(), 1);
        assert!(dir.path().join(PREPROCESSED_DIR).join("scan.png").is_file());
    }

    #[test]
    fn empty_directory_writes_empty_result() {
        let dir = tempfile::tempdir().unwrap();
        let config = PipelineConfig::default();
        let report = PageBatch::new(&config, &WidthOcr).run(dir.path()).unwrap();
        assert!(report.outcomes.is_empty());
        assert_eq!(std::fs::read_to_string(report.output_path).unwrap(), "");
    }
}
