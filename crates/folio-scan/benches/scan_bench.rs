// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Criterion benchmarks for the folio-scan crate: the preprocessing chain, the
// fine-angle rotation used by the orientation search, and TSV parsing.

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use image::{DynamicImage, GrayImage, Luma};

use folio_core::ScanConfig;
use folio_scan::ImageProcessor;
use folio_scan::image::processor::rotate_expanded;
use folio_scan::scan::ocr::parse_tsv;

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// 200x280 synthetic page: light background with dark horizontal "text" bars.
fn synthetic_page() -> DynamicImage {
    let (width, height) = (200u32, 280u32);
    let mut img = GrayImage::from_pixel(width, height, Luma([235u8]));
    for line in 0..12 {
        let top = 20 + line * 20;
        for y in top..top + 6 {
            for x in 20..180 {
                img.put_pixel(x, y, Luma([25u8]));
            }
        }
    }
    DynamicImage::ImageLuma8(img)
}

/// Tesseract TSV output for `lines` lines of five words each.
fn synthetic_tsv(lines: usize) -> String {
    let mut tsv = String::from(
        "level\tpage_num\tblock_num\tpar_num\tline_num\tword_num\tleft\ttop\twidth\theight\tconf\ttext\n",
    );
    for line in 1..=lines {
        for word in 1..=5 {
            tsv.push_str(&format!(
                "5\t1\t1\t1\t{line}\t{word}\t{}\t{}\t40\t12\t{}.5\twort{word}\n",
                word * 45,
                line * 20,
                50 + (line + word) % 50,
            ));
        }
    }
    tsv
}

// ---------------------------------------------------------------------------
// Benchmarks
// ---------------------------------------------------------------------------

fn bench_preprocess(c: &mut Criterion) {
    let page = synthetic_page();
    let config = ScanConfig::default();

    c.bench_function("preprocess (200x280, upscale 2)", |b| {
        b.iter(|| {
            let processed = ImageProcessor::from_dynamic(black_box(page.clone())).preprocess(&config);
            black_box(processed.into_dynamic());
        });
    });
}

/// Fine steps are the only non-lossless rotations, so they dominate the
/// orientation search's image work.
fn bench_fine_rotation(c: &mut Criterion) {
    let page = synthetic_page();

    c.bench_function("rotate_expanded (3 degrees)", |b| {
        b.iter(|| black_box(rotate_expanded(black_box(&page), 3)));
    });
}

fn bench_parse_tsv(c: &mut Criterion) {
    let tsv = synthetic_tsv(60);

    c.bench_function("parse_tsv (300 words)", |b| {
        b.iter(|| black_box(parse_tsv(black_box(&tsv))));
    });
}

criterion_group!(benches, bench_preprocess, bench_fine_rotation, bench_parse_tsv);
criterion_main!(benches);
