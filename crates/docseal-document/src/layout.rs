// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Page geometry and text layout for the single-page document rendering.
//
// All measurements are PDF points. Positions handed in and stored on
// `PageGeometry` are measured from the top-left corner of the page (the way a
// designer describes a layout); `PlacedLine::baseline_pt` is already converted
// to PDF user space, where y grows upwards from the bottom edge.

use docseal_core::error::{DocsealError, Result};

/// ISO A4 width.
pub const A4_WIDTH_PT: f32 = 595.28;
/// ISO A4 height.
pub const A4_HEIGHT_PT: f32 = 841.89;

pub const TITLE_SIZE_PT: f32 = 24.0;
pub const BODY_SIZE_PT: f32 = 14.0;

/// Line pitch as a multiple of the font size.
const LINE_HEIGHT_FACTOR: f32 = 1.2;

/// Distance from the top of a line box to its baseline, as a fraction of the
/// font size.
const ASCENT_FACTOR: f32 = 0.8;

/// Horizontal advances of the font text is set in.
pub trait TextMeasure {
    /// Advance width of `c` as a fraction of the font size.
    fn advance_em(&self, c: char) -> f32;

    /// Width of `text` set at `size_pt`.
    fn width_pt(&self, text: &str, size_pt: f32) -> f32 {
        text.chars().map(|c| self.advance_em(c)).sum::<f32>() * size_pt
    }
}

/// Page margins.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Margins {
    pub left: f32,
    pub right: f32,
    pub top: f32,
    pub bottom: f32,
}

/// Size of the page and where things go on it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    pub width_pt: f32,
    pub height_pt: f32,
    pub margins: Margins,
    /// Top-left corner of the title line.
    pub title_origin: (f32, f32),
    pub title_size_pt: f32,
    pub body_size_pt: f32,
}

impl PageGeometry {
    /// A4 portrait with the title at (40, 40) and the body box starting at (40, 80).
    pub const A4: Self = Self {
        width_pt: A4_WIDTH_PT,
        height_pt: A4_HEIGHT_PT,
        margins: Margins {
            left: 40.0,
            right: 40.0,
            top: 80.0,
            bottom: 40.0,
        },
        title_origin: (40.0, 40.0),
        title_size_pt: TITLE_SIZE_PT,
        body_size_pt: BODY_SIZE_PT,
    };

    /// The rectangle body text flows into.
    ///
    /// Fails with `LayoutOverflow` when the margins leave no positive area.
    pub fn content_rect(&self) -> Result<ContentRect> {
        let width = self.width_pt - self.margins.left - self.margins.right;
        let height = self.height_pt - self.margins.top - self.margins.bottom;
        if !(width > 0.0 && height > 0.0) {
            return Err(DocsealError::LayoutOverflow {
                width_pt: width,
                height_pt: height,
            });
        }
        Ok(ContentRect {
            left: self.margins.left,
            top: self.margins.top,
            width,
            height,
        })
    }

    fn body_line_height(&self) -> f32 {
        self.body_size_pt * LINE_HEIGHT_FACTOR
    }

    /// Convert a top-relative baseline into PDF user space.
    fn to_user_space(&self, from_top: f32) -> f32 {
        self.height_pt - from_top
    }
}

impl Default for PageGeometry {
    fn default() -> Self {
        Self::A4
    }
}

/// Body text area, measured from the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContentRect {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

/// One line of text with its final position.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedLine {
    pub text: String,
    pub x_pt: f32,
    /// Baseline in PDF user space (from the bottom edge).
    pub baseline_pt: f32,
    pub size_pt: f32,
}

/// Everything that goes on the page.
#[derive(Debug, Clone, PartialEq)]
pub struct PageLayout {
    /// `None` when the title is empty.
    pub title: Option<PlacedLine>,
    /// Body lines that fit the content rectangle, blank lines omitted.
    pub body: Vec<PlacedLine>,
    /// Wrapped lines that did not fit and were dropped.
    pub dropped_lines: usize,
    /// The title was cut to the page width.
    pub title_truncated: bool,
}

/// Lay out `title` and `body` on a single page, measuring text with `measure`.
///
/// The title is a single line; characters that would cross the right margin
/// are cut. The body is word-wrapped to the content width and lines beyond
/// the content height are dropped.
pub fn lay_out(
    geometry: &PageGeometry,
    measure: &impl TextMeasure,
    title: &str,
    body: &str,
) -> Result<PageLayout> {
    let rect = geometry.content_rect()?;

    let (title_x, title_top) = geometry.title_origin;
    let title_room = geometry.width_pt - title_x - geometry.margins.right;
    let fitted_title = fit_to_width(title, title_room, geometry.title_size_pt, measure);
    let title_truncated = fitted_title.len() < title.len();
    let title = (!fitted_title.is_empty()).then(|| PlacedLine {
        text: fitted_title.to_owned(),
        x_pt: title_x,
        baseline_pt: geometry.to_user_space(title_top + geometry.title_size_pt * ASCENT_FACTOR),
        size_pt: geometry.title_size_pt,
    });

    let line_height = geometry.body_line_height();
    let capacity = (rect.height / line_height).floor() as usize;

    let wrapped = wrap_text(body, rect.width, geometry.body_size_pt, measure);
    let dropped_lines = wrapped.len().saturating_sub(capacity);

    let body = wrapped
        .into_iter()
        .take(capacity)
        .enumerate()
        .filter(|(_, line)| !line.is_empty())
        .map(|(row, text)| {
            let top = rect.top + row as f32 * line_height;
            PlacedLine {
                text,
                x_pt: rect.left,
                baseline_pt: geometry.to_user_space(top + geometry.body_size_pt * ASCENT_FACTOR),
                size_pt: geometry.body_size_pt,
            }
        })
        .collect();

    Ok(PageLayout {
        title,
        body,
        dropped_lines,
        title_truncated,
    })
}

/// Longest prefix of `text` no wider than `max_width`.
fn fit_to_width<'a>(
    text: &'a str,
    max_width: f32,
    size_pt: f32,
    measure: &impl TextMeasure,
) -> &'a str {
    let mut width = 0.0;
    for (at, c) in text.char_indices() {
        width += measure.advance_em(c) * size_pt;
        if width > max_width {
            return &text[..at];
        }
    }
    text
}

// -- Text wrapping helper -----------------------------------------------------

/// Wrap a multi-line string so that no line is wider than `max_width` points.
///
/// Splits on existing newlines first, then performs simple word-wrap within each
/// paragraph. Words wider than a line are force-broken; a single glyph wider
/// than the line still gets a line of its own.
fn wrap_text(
    text: &str,
    max_width: f32,
    size_pt: f32,
    measure: &impl TextMeasure,
) -> Vec<String> {
    let space = measure.width_pt(" ", size_pt);
    let mut result = Vec::new();

    for paragraph in text.lines() {
        let words: Vec<&str> = paragraph.split_whitespace().collect();
        if words.is_empty() {
            result.push(String::new());
            continue;
        }

        let mut current_line = String::new();
        let mut current_width = 0.0;

        for word in words {
            let word_width = measure.width_pt(word, size_pt);
            if word_width > max_width {
                if !current_line.is_empty() {
                    result.push(std::mem::take(&mut current_line));
                }
                let mut pieces = break_word(word, max_width, size_pt, measure);
                current_line = pieces.pop().unwrap_or_default();
                current_width = measure.width_pt(&current_line, size_pt);
                result.extend(pieces);
            } else if current_line.is_empty() {
                current_line.push_str(word);
                current_width = word_width;
            } else if current_width + space + word_width <= max_width {
                current_line.push(' ');
                current_line.push_str(word);
                current_width += space + word_width;
            } else {
                result.push(std::mem::replace(&mut current_line, word.to_owned()));
                current_width = word_width;
            }
        }

        if !current_line.is_empty() {
            result.push(current_line);
        }
    }

    result
}

/// Split one word into pieces that each fit `max_width`.
fn break_word(
    word: &str,
    max_width: f32,
    size_pt: f32,
    measure: &impl TextMeasure,
) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut piece = String::new();
    let mut width = 0.0;

    for c in word.chars() {
        let advance = measure.advance_em(c) * size_pt;
        if !piece.is_empty() && width + advance > max_width {
            pieces.push(std::mem::take(&mut piece));
            width = 0.0;
        }
        piece.push(c);
        width += advance;
    }
    if !piece.is_empty() {
        pieces.push(piece);
    }
    pieces
}
