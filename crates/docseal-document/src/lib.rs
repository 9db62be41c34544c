// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// docseal-document: Page layout, rendering and PDF inspection for Docseal.
//
// Renders a document's title and body onto a single A4 page (`printpdf`) and
// provides read access to existing PDFs (`lopdf`) for the signing stage.

pub mod layout;
pub mod pdf;

// Re-export the primary structs so callers can use `docseal_document::PageRenderer` etc.
pub use layout::{PageGeometry, PageLayout, TextMeasure, lay_out};
pub use pdf::fonts::GlyphWidths;
pub use pdf::reader::PdfReader;
pub use pdf::renderer::{PageRenderer, RenderedPage, UnsignedRendering};
