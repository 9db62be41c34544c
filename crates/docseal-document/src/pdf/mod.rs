// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF module: rendering new pages and inspecting existing PDFs.

pub mod fonts;
pub mod reader;
pub mod renderer;
pub mod winansi;

pub use fonts::GlyphWidths;
pub use reader::PdfReader;
pub use renderer::{PageRenderer, RenderedPage, UnsignedRendering};
