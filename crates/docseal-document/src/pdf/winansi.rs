// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// WinAnsiEncoding (Windows-1252) for text set in the standard 14 fonts.
//
// Printable ASCII and the Latin-1 upper half map to themselves; the 0x80..0x9F
// block carries the typographic extras listed below.

/// Printed in place of characters the encoding cannot represent.
pub const REPLACEMENT: char = '?';

const EXTRAS: [(char, u8); 27] = [
    ('€', 0x80),
    ('‚', 0x82),
    ('ƒ', 0x83),
    ('„', 0x84),
    ('…', 0x85),
    ('†', 0x86),
    ('‡', 0x87),
    ('ˆ', 0x88),
    ('‰', 0x89),
    ('Š', 0x8A),
    ('‹', 0x8B),
    ('Œ', 0x8C),
    ('Ž', 0x8E),
    ('‘', 0x91),
    ('’', 0x92),
    ('“', 0x93),
    ('”', 0x94),
    ('•', 0x95),
    ('–', 0x96),
    ('—', 0x97),
    ('˜', 0x98),
    ('™', 0x99),
    ('š', 0x9A),
    ('›', 0x9B),
    ('œ', 0x9C),
    ('ž', 0x9E),
    ('Ÿ', 0x9F),
];

/// The WinAnsi code for `c`, if it has one.
pub fn encode_char(c: char) -> Option<u8> {
    match u32::from(c) {
        0x20..=0x7E | 0xA0..=0xFF => u8::try_from(u32::from(c)).ok(),
        _ => EXTRAS.iter().find(|(ch, _)| *ch == c).map(|(_, code)| *code),
    }
}

/// Replace every non-whitespace character WinAnsi cannot represent.
///
/// Whitespace is left alone so line structure survives for layout. Returns the
/// text and the number of replacements.
pub fn representable(text: &str) -> (String, usize) {
    let mut replaced = 0;
    let text = text
        .chars()
        .map(|c| {
            if c.is_whitespace() || encode_char(c).is_some() {
                c
            } else {
                replaced += 1;
                REPLACEMENT
            }
        })
        .collect();
    (text, replaced)
}

/// Encode one laid-out line. Whitespace becomes a space.
pub fn encode(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| {
            if c.is_whitespace() {
                b' '
            } else {
                encode_char(c).unwrap_or(REPLACEMENT as u8)
            }
        })
        .collect()
}
