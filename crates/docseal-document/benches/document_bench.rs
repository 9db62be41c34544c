// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Criterion benchmarks for the docseal-document crate: text layout on its own
// and the full render to PDF bytes.

use criterion::{Criterion, black_box, criterion_group, criterion_main};

use docseal_core::types::BaseFont;
use docseal_document::{GlyphWidths, PageGeometry, PageRenderer, lay_out};

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// Roughly one full page of body text.
fn page_of_text() -> String {
    "Lorem ipsum dolor sit amet, consectetur adipiscing elit, sed do eiusmod \
     tempor incididunt ut labore et dolore magna aliqua.\n"
        .repeat(40)
}

// ---------------------------------------------------------------------------
// Benchmarks
// ---------------------------------------------------------------------------

fn bench_layout(c: &mut Criterion) {
    let body = page_of_text();
    let widths = GlyphWidths::builtin(BaseFont::Helvetica);
    c.bench_function("lay_out (full page)", |b| {
        b.iter(|| {
            let layout = lay_out(
                &PageGeometry::A4,
                &widths,
                black_box("Invoice"),
                black_box(&body),
            );
            black_box(layout.ok());
        });
    });
}

/// Render with the built-in Helvetica font, which is the hot path in
/// production when no font file is configured.
fn bench_render(c: &mut Criterion) {
    let body = page_of_text();
    let renderer = PageRenderer::default();
    c.bench_function("render (builtin font, full page)", |b| {
        b.iter(|| {
            let page = renderer.render(black_box("Invoice"), black_box(&body));
            black_box(page.ok());
        });
    });
}

fn bench_font_metrics(c: &mut Criterion) {
    c.bench_function("glyph widths (builtin Helvetica)", |b| {
        b.iter(|| black_box(GlyphWidths::builtin(BaseFont::Helvetica)));
    });
}

criterion_group!(benches, bench_layout, bench_render, bench_font_metrics);
criterion_main!(benches);
