// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Page renderer: turn a (title, body) pair into a single-page PDF using
// `printpdf` 0.8.
//
// printpdf 0.8 uses a data-oriented API: documents are built by constructing
// `PdfPage` structs containing `Vec<Op>` operation lists, then serialised via
// `PdfDocument::save()`.
//
// printpdf writes builtin-font strings as raw UTF-8 under WinAnsiEncoding, so
// for the standard 14 fonts the `Tj` operand is encoded here and emitted as a
// raw operation.

use std::borrow::Cow;
use std::path::PathBuf;

use docseal_core::artifacts::{WorkDir, write_atomic};
use docseal_core::error::{DocsealError, Result};
use docseal_core::types::{Document, DocumentId, FontSource};
use printpdf::{
    BuiltinFont, DictItem, FontId, Mm, Op, ParsedFont, PdfDocument, PdfPage, PdfSaveOptions,
    PdfWarnMsg, Point, Pt, TextItem,
};
use tracing::{debug, info, instrument};

use super::fonts::{GlyphWidths, builtin_for};
use super::winansi;
use crate::layout::{PageGeometry, PlacedLine, lay_out};

/// Points per millimetre conversion used for page dimensions.
const PT_PER_MM: f32 = 72.0 / 25.4;

/// Bytes of a freshly rendered page, before it touches the filesystem.
#[derive(Debug, Clone)]
pub struct RenderedPage {
    pub bytes: Vec<u8>,
    /// Wrapped body lines that did not fit the content rectangle.
    pub dropped_lines: usize,
    /// Characters the builtin font's encoding could not represent, printed
    /// as `?`.
    pub replaced_chars: usize,
}

/// The transient, unsigned artifact for one document identity.
///
/// Carries both the bytes and the path they were written to, so the signing
/// stage can read either.
#[derive(Debug, Clone)]
pub struct UnsignedRendering {
    pub id: DocumentId,
    pub path: PathBuf,
    pub bytes: Vec<u8>,
    pub dropped_lines: usize,
}

/// Lays out and renders documents onto a single fixed-size page.
#[derive(Debug, Clone)]
pub struct PageRenderer {
    font: FontSource,
    geometry: PageGeometry,
}

/// A font ready to be referenced from page operations.
enum ResolvedFont {
    Builtin(BuiltinFont),
    Embedded(FontId),
}

impl PageRenderer {
    /// Renderer on A4 with the given font.
    pub fn new(font: FontSource) -> Self {
        Self {
            font,
            geometry: PageGeometry::A4,
        }
    }

    pub fn with_geometry(mut self, geometry: PageGeometry) -> Self {
        self.geometry = geometry;
        self
    }

    pub fn geometry(&self) -> &PageGeometry {
        &self.geometry
    }

    /// Render `title` and `body` into PDF bytes.
    ///
    /// Empty strings are fine and leave their region blank. Body text that does
    /// not fit the page is dropped; the count is reported on the result.
    #[instrument(skip(self, title, body), fields(title_len = title.len(), body_len = body.len()))]
    pub fn render(&self, title: &str, body: &str) -> Result<RenderedPage> {
        let mut doc = PdfDocument::new(title);
        let (font, widths) = self.resolve_font(&mut doc)?;

        let (title, body, replaced_chars) = match font {
            ResolvedFont::Builtin(_) => {
                let (title, in_title) = winansi::representable(title);
                let (body, in_body) = winansi::representable(body);
                (Cow::Owned(title), Cow::Owned(body), in_title + in_body)
            }
            ResolvedFont::Embedded(_) => (Cow::Borrowed(title), Cow::Borrowed(body), 0),
        };
        if replaced_chars > 0 {
            debug!(replaced_chars, "Characters outside WinAnsiEncoding replaced");
        }

        let layout = lay_out(&self.geometry, &widths, &title, &body)?;

        let mut ops: Vec<Op> = Vec::new();
        for line in layout.title.iter().chain(layout.body.iter()) {
            push_line(&mut ops, &font, line);
        }

        let page = PdfPage::new(
            Mm(self.geometry.width_pt / PT_PER_MM),
            Mm(self.geometry.height_pt / PT_PER_MM),
            ops,
        );
        doc.with_pages(vec![page]);

        if layout.dropped_lines > 0 {
            debug!(
                dropped_lines = layout.dropped_lines,
                "Body overflowed the content rectangle"
            );
        }
        if layout.title_truncated {
            debug!("Title cut at the right margin");
        }

        // Raw operations are only written with `secure` off.
        let options = PdfSaveOptions {
            secure: false,
            ..PdfSaveOptions::default()
        };
        let mut warnings: Vec<PdfWarnMsg> = Vec::new();
        let bytes = doc.save(&options, &mut warnings);
        debug!(
            bytes = bytes.len(),
            body_lines = layout.body.len(),
            warnings = warnings.len(),
            "Page rendered"
        );

        Ok(RenderedPage {
            bytes,
            dropped_lines: layout.dropped_lines,
            replaced_chars,
        })
    }

    /// Render `document` and write it to its transient `unsigned_<id>.pdf` path
    /// inside `work`.
    #[instrument(skip_all, fields(id = %document.id))]
    pub fn render_to(&self, document: &Document, work: &WorkDir) -> Result<UnsignedRendering> {
        let rendered = self.render(&document.title, &document.content)?;
        let path = work.paths_for(document.id).unsigned;
        write_atomic(&path, &rendered.bytes)?;

        info!(path = %path.display(), bytes = rendered.bytes.len(), "Unsigned rendering written");

        Ok(UnsignedRendering {
            id: document.id,
            path,
            bytes: rendered.bytes,
            dropped_lines: rendered.dropped_lines,
        })
    }

    fn resolve_font(&self, doc: &mut PdfDocument) -> Result<(ResolvedFont, GlyphWidths)> {
        match &self.font {
            FontSource::Builtin(base) => Ok((
                ResolvedFont::Builtin(builtin_for(*base)),
                GlyphWidths::builtin(*base),
            )),
            FontSource::File(path) => {
                let bytes = std::fs::read(path).map_err(|e| {
                    DocsealError::FontUnavailable(format!("{}: {e}", path.display()))
                })?;
                let mut warnings = Vec::new();
                let parsed = ParsedFont::from_bytes(&bytes, 0, &mut warnings).ok_or_else(|| {
                    DocsealError::FontUnavailable(format!(
                        "{}: not a usable TrueType/OpenType font",
                        path.display()
                    ))
                })?;
                debug!(path = %path.display(), "Embedding font");
                let id = doc.add_font(&parsed);
                Ok((ResolvedFont::Embedded(id), GlyphWidths::embedded(parsed)))
            }
        }
    }
}

impl Default for PageRenderer {
    fn default() -> Self {
        Self::new(FontSource::default())
    }
}

fn push_line(ops: &mut Vec<Op>, font: &ResolvedFont, line: &PlacedLine) {
    ops.push(Op::StartTextSection);
    ops.push(Op::SetTextCursor {
        pos: Point {
            x: Pt(line.x_pt),
            y: Pt(line.baseline_pt),
        },
    });
    match font {
        ResolvedFont::Builtin(builtin) => {
            ops.push(Op::SetFontSizeBuiltinFont {
                size: Pt(line.size_pt),
                font: *builtin,
            });
            ops.push(Op::Unknown {
                key: "Tj".into(),
                value: vec![DictItem::String {
                    data: winansi::encode(&line.text),
                    literal: false,
                }],
            });
            // Writes nothing; keeps the font in the page resources.
            ops.push(Op::WriteTextBuiltinFont {
                items: Vec::new(),
                font: *builtin,
            });
        }
        ResolvedFont::Embedded(id) => {
            ops.push(Op::SetFontSize {
                size: Pt(line.size_pt),
                font: id.clone(),
            });
            ops.push(Op::WriteText {
                items: vec![TextItem::Text(line.text.clone())],
                font: id.clone(),
            });
        }
    }
    ops.push(Op::EndTextSection);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::Margins;
    use crate::pdf::reader::PdfReader;
    use lopdf::Object;
    use lopdf::content::Content;

    /// Operands of every `Tj` on the first page, in drawing order.
    fn shown_strings(pdf: &[u8]) -> Vec<Vec<u8>> {
        let content = PdfReader::from_bytes(pdf).unwrap().page_content(1).unwrap();
        Content::decode(&content)
            .unwrap()
            .operations
            .into_iter()
            .filter(|op| op.operator == "Tj")
            .filter_map(|op| match op.operands.first() {
                Some(Object::String(bytes, _)) => Some(bytes.clone()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn renders_a_single_a4_page() {
        let page = PageRenderer::default().render("Invoice", "Total: $42").unwrap();
        assert!(page.bytes.starts_with(b"%PDF"));

        let reader = PdfReader::from_bytes(&page.bytes).unwrap();
        assert_eq!(reader.page_count(), 1);
        let [x0, y0, x1, y1] = reader.media_box(1).unwrap();
        assert_eq!((x0, y0), (0.0, 0.0));
        assert!((x1 - 595.28).abs() < 0.5, "width {x1}");
        assert!((y1 - 841.89).abs() < 0.5, "height {y1}");
    }

    #[test]
    fn content_streams_are_stable_across_runs() {
        let renderer = PageRenderer::default();
        let a = renderer.render("Invoice", "Total: $42").unwrap();
        let b = renderer.render("Invoice", "Total: $42").unwrap();

        let content_a = PdfReader::from_bytes(&a.bytes).unwrap().page_content(1).unwrap();
        let content_b = PdfReader::from_bytes(&b.bytes).unwrap().page_content(1).unwrap();
        assert!(!content_a.is_empty());
        assert_eq!(content_a, content_b);
    }

    #[test]
    fn different_text_changes_the_page() {
        let renderer = PageRenderer::default();
        let a = renderer.render("Invoice", "Total: $42").unwrap();
        let b = renderer.render("Invoice", "Total: $43").unwrap();
        let content_a = PdfReader::from_bytes(&a.bytes).unwrap().page_content(1).unwrap();
        let content_b = PdfReader::from_bytes(&b.bytes).unwrap().page_content(1).unwrap();
        assert_ne!(content_a, content_b);
    }

    #[test]
    fn empty_document_still_renders() {
        let page = PageRenderer::default().render("", "").unwrap();
        assert!(!page.bytes.is_empty());
        assert_eq!(PdfReader::from_bytes(&page.bytes).unwrap().page_count(), 1);
        assert_eq!(page.dropped_lines, 0);
    }

    #[test]
    fn overflow_is_reported_not_paginated() {
        let body = "word ".repeat(20_000);
        let page = PageRenderer::default().render("Long", &body).unwrap();
        assert!(page.dropped_lines > 0);
        assert_eq!(PdfReader::from_bytes(&page.bytes).unwrap().page_count(), 1);
    }

    #[test]
    fn builtin_font_text_is_winansi_encoded() {
        let page = PageRenderer::default().render("Café", "Zürich").unwrap();
        assert_eq!(shown_strings(&page.bytes), vec![b"Caf\xE9".to_vec(), b"Z\xFCrich".to_vec()]);
        assert_eq!(page.replaced_chars, 0);
    }

    #[test]
    fn text_outside_winansi_is_replaced() {
        let page = PageRenderer::default().render("Счёт", "Total: 42").unwrap();
        assert_eq!(shown_strings(&page.bytes), vec![b"????".to_vec(), b"Total: 42".to_vec()]);
        assert_eq!(page.replaced_chars, 4);
    }

    #[test]
    fn builtin_font_is_declared_with_winansi_encoding() {
        let page = PageRenderer::default().render("Invoice", "").unwrap();
        let doc = lopdf::Document::load_mem(&page.bytes).unwrap();
        let font = doc
            .objects
            .values()
            .filter_map(|o| o.as_dict().ok())
            .find(|d| d.get(b"Type").and_then(Object::as_name).ok() == Some(b"Font".as_slice()))
            .expect("font resource");
        assert_eq!(font.get(b"BaseFont").unwrap().as_name().unwrap(), b"Helvetica");
        assert_eq!(font.get(b"Encoding").unwrap().as_name().unwrap(), b"WinAnsiEncoding");
    }

    #[test]
    fn wide_glyphs_wrap_inside_the_content_rect() {
        let page = PageRenderer::default().render("", &"W".repeat(200)).unwrap();
        let lines = shown_strings(&page.bytes);

        assert_eq!(lines.iter().map(Vec::len).sum::<usize>(), 200);
        // Helvetica's W is 0.944 em: at most 38 fit in 515.28 pt at 14 pt.
        assert!(lines.len() >= 6, "only {} lines", lines.len());
        assert!(lines.iter().all(|l| l.len() <= 38));
    }

    #[test]
    fn missing_font_file_is_font_unavailable() {
        let renderer = PageRenderer::new(FontSource::File("/nonexistent/arial.ttf".into()));
        match renderer.render("t", "b") {
            Err(DocsealError::FontUnavailable(_)) => {}
            other => panic!("expected FontUnavailable, got {other:?}"),
        }
    }

    #[test]
    fn garbage_font_file_is_font_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.ttf");
        std::fs::write(&path, b"definitely not a font").unwrap();

        let renderer = PageRenderer::new(FontSource::File(path));
        assert!(matches!(
            renderer.render("t", "b"),
            Err(DocsealError::FontUnavailable(_))
        ));
    }

    #[test]
    fn degenerate_geometry_is_layout_overflow() {
        let geometry = PageGeometry {
            margins: Margins {
                left: 40.0,
                right: 40.0,
                top: 500.0,
                bottom: 400.0,
            },
            ..PageGeometry::A4
        };
        let renderer = PageRenderer::default().with_geometry(geometry);
        assert!(matches!(
            renderer.render("t", "b"),
            Err(DocsealError::LayoutOverflow { .. })
        ));
    }

    #[test]
    fn render_to_writes_the_transient_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let work = WorkDir::create(dir.path()).unwrap();
        let document = Document::new(DocumentId(7), "Receipt", "Paid in full");

        let rendering = PageRenderer::default().render_to(&document, &work).unwrap();
        assert_eq!(rendering.id, DocumentId(7));
        assert_eq!(rendering.path, dir.path().join("unsigned_7.pdf"));
        assert_eq!(std::fs::read(&rendering.path).unwrap(), rendering.bytes);
    }

    #[test]
    fn failed_render_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let work = WorkDir::create(dir.path()).unwrap();
        let renderer = PageRenderer::new(FontSource::File(dir.path().join("missing.ttf")));

        assert!(renderer.render_to(&Document::new(DocumentId(8), "t", "b"), &work).is_err());
        assert!(!dir.path().join("unsigned_8.pdf").exists());
    }
}
