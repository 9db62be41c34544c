// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Glyph advances for laying out text in the page font.
//
// Standard 14 fonts are measured with the metric-compatible TrueType copies
// printpdf bundles for them; embedded fonts with their own hmtx table.

use docseal_core::types::BaseFont;
use printpdf::{BuiltinFont, ParsedFont};
use tracing::warn;

use crate::layout::TextMeasure;

/// No glyph in the standard 14 Latin fonts is wider than one em.
const FULL_EM: f32 = 1.0;

/// Per-glyph advances of one font.
///
/// Glyphs the font cannot map are measured at the font's widest advance, so
/// text never runs wider than laid out.
pub struct GlyphWidths {
    font: Option<ParsedFont>,
    fallback_em: f32,
}

impl GlyphWidths {
    /// Metrics of a standard 14 font.
    pub fn builtin(base: BaseFont) -> Self {
        let font = builtin_for(base);
        let parsed = ParsedFont::from_bytes(&font.get_subset_font().bytes, 0, &mut Vec::new());
        if parsed.is_none() {
            warn!(font = font.get_id(), "no metrics for builtin font, measuring glyphs at one em");
        }
        Self::new(parsed)
    }

    /// Metrics of a font file about to be embedded.
    pub fn embedded(font: ParsedFont) -> Self {
        Self::new(Some(font))
    }

    fn new(font: Option<ParsedFont>) -> Self {
        let widest = font
            .as_ref()
            .map(|f| f.font_metrics.get_advance_width_max(1.0))
            .filter(|w| *w > 0.0);
        Self {
            font,
            fallback_em: widest.unwrap_or(FULL_EM),
        }
    }

    /// Advance of `c` in font units, when the font has one.
    fn advance_units(font: &ParsedFont, c: char) -> Option<f32> {
        let space = (c == ' ').then(|| font.get_space_width()).flatten();
        let advance = match space {
            Some(width) => width as f32,
            None => f32::from(font.get_horizontal_advance(font.lookup_glyph_index(u32::from(c))?)),
        };
        (advance > 0.0).then_some(advance)
    }
}

impl TextMeasure for GlyphWidths {
    fn advance_em(&self, c: char) -> f32 {
        let Some(font) = &self.font else {
            return self.fallback_em;
        };
        match Self::advance_units(font, c) {
            Some(units) => units / f32::from(font.font_metrics.units_per_em.max(1)),
            None => self.fallback_em,
        }
    }
}

pub(crate) fn builtin_for(base: BaseFont) -> BuiltinFont {
    match base {
        BaseFont::Helvetica => BuiltinFont::Helvetica,
        BaseFont::TimesRoman => BuiltinFont::TimesRoman,
        BaseFont::Courier => BuiltinFont::Courier,
    }
}
