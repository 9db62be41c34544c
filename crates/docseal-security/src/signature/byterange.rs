// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// ByteRange bookkeeping for embedded signatures.
//
// A signed PDF covers every byte except the `/Contents` hex string. The
// `/ByteRange` array `[0 a b c]` names the two covered spans: `0..a` and
// `b..b+c`, where `a..b` is the `<...>` value including its brackets.
//
// Both the `/Contents` value and the `/ByteRange` array are written as
// fixed-width placeholders first, so filling them in later never moves a byte.

use docseal_core::error::{DocsealError, Result};

/// Default space reserved for the DER-encoded CMS blob.
pub const DEFAULT_SIGNATURE_CAPACITY: usize = 8192;

/// Width reserved for the `/ByteRange` array text. Fits four ten-digit offsets.
pub const BYTE_RANGE_WIDTH: usize = 48;

/// The reserved `/Contents <...>` slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContentsPlaceholder {
    capacity: usize,
}

impl ContentsPlaceholder {
    /// Reserve room for a signature of up to `capacity` bytes.
    pub fn new(capacity: usize) -> Self {
        Self { capacity }
    }

    /// Total length of the placeholder text: two hex digits per byte plus the
    /// angle brackets.
    pub fn len(&self) -> usize {
        self.capacity * 2 + 2
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// `<000...000>` of exactly [`Self::len`] bytes.
    pub fn text(&self) -> String {
        format!("<{}>", "0".repeat(self.capacity * 2))
    }

    /// Overwrite the placeholder at `offset` with `signature`, zero-padded.
    pub fn fill(&self, pdf: &mut [u8], offset: usize, signature: &[u8]) -> Result<()> {
        if signature.len() > self.capacity {
            return Err(DocsealError::SigningFailed(format!(
                "signature ({} bytes) exceeds reserved space ({} bytes)",
                signature.len(),
                self.capacity
            )));
        }
        let slot = pdf
            .get_mut(offset..offset + self.len())
            .ok_or_else(|| DocsealError::SigningFailed("signature slot out of bounds".into()))?;
        if slot.first() != Some(&b'<') || slot.last() != Some(&b'>') {
            return Err(DocsealError::SigningFailed(
                "signature slot does not hold a placeholder".into(),
            ));
        }

        let hex = hex::encode_upper(signature);
        let body = &mut slot[1..self.len() - 1];
        body[..hex.len()].copy_from_slice(hex.as_bytes());
        body[hex.len()..].fill(b'0');
        Ok(())
    }
}

impl Default for ContentsPlaceholder {
    fn default() -> Self {
        Self::new(DEFAULT_SIGNATURE_CAPACITY)
    }
}

/// A `/ByteRange` value: `[start1, len1, start2, len2]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange(pub [usize; 4]);

impl ByteRange {
    /// Range covering a file of `file_len` bytes except the placeholder of
    /// `placeholder_len` bytes at `contents_offset`.
    pub fn around(contents_offset: usize, placeholder_len: usize, file_len: usize) -> Self {
        let after = contents_offset + placeholder_len;
        Self([0, contents_offset, after, file_len.saturating_sub(after)])
    }

    /// Placeholder text for the array, [`BYTE_RANGE_WIDTH`] bytes wide.
    pub fn placeholder() -> String {
        format!("{:<width$}", "[0 0 0 0]", width = BYTE_RANGE_WIDTH)
    }

    /// The array as PDF text, space-padded to [`BYTE_RANGE_WIDTH`].
    pub fn to_padded(&self) -> Result<String> {
        let [a, b, c, d] = self.0;
        let text = format!("[{a} {b} {c} {d}]");
        if text.len() > BYTE_RANGE_WIDTH {
            return Err(DocsealError::SigningFailed(format!(
                "ByteRange {text} does not fit its reserved width"
            )));
        }
        Ok(format!("{text:<width$}", width = BYTE_RANGE_WIDTH))
    }

    /// Parse the array text following a `/ByteRange` key.
    pub fn parse(text: &[u8]) -> Result<Self> {
        let malformed = || DocsealError::MalformedPdf("unreadable /ByteRange".into());

        let open = text.iter().position(|&b| b == b'[').ok_or_else(malformed)?;
        let close = text[open..].iter().position(|&b| b == b']').ok_or_else(malformed)? + open;
        let inner = std::str::from_utf8(&text[open + 1..close]).map_err(|_| malformed())?;

        let values = inner
            .split_ascii_whitespace()
            .map(|n| n.parse::<usize>().map_err(|_| malformed()))
            .collect::<Result<Vec<_>>>()?;
        let values: [usize; 4] = values.try_into().map_err(|_| malformed())?;
        Ok(Self(values))
    }

    /// Check that the range starts at zero, ends at `file_len` and leaves a
    /// single gap.
    pub fn validate(&self, file_len: usize) -> Result<()> {
        let [start, len1, start2, len2] = self.0;
        if start != 0 || len1 > start2 || start2 + len2 != file_len {
            return Err(DocsealError::MalformedPdf(format!(
                "ByteRange {:?} does not cover a {file_len} byte file",
                self.0
            )));
        }
        Ok(())
    }

    /// The two covered spans of `pdf`.
    pub fn covered<'a>(&self, pdf: &'a [u8]) -> Result<[&'a [u8]; 2]> {
        self.validate(pdf.len())?;
        let [_, len1, start2, len2] = self.0;
        Ok([&pdf[..len1], &pdf[start2..start2 + len2]])
    }

    /// The excluded gap, i.e. the `<...>` hex string.
    pub fn gap<'a>(&self, pdf: &'a [u8]) -> Result<&'a [u8]> {
        self.validate(pdf.len())?;
        Ok(&pdf[self.0[1]..self.0[2]])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholder_length() {
        let slot = ContentsPlaceholder::new(1024);
        // 1024 bytes * 2 (hex) + 2 (brackets) = 2050
        assert_eq!(slot.len(), 2050);
        assert_eq!(slot.text().len(), 2050);
    }

    #[test]
    fn range_around_the_placeholder() {
        let range = ByteRange::around(400, 100, 1000);
        assert_eq!(range.0, [0, 400, 500, 500]);
        assert!(range.validate(1000).is_ok());
    }

    #[test]
    fn padded_text_keeps_its_width() {
        let range = ByteRange([0, 1234, 5678, 90]);
        let text = range.to_padded().unwrap();
        assert_eq!(text.len(), BYTE_RANGE_WIDTH);
        assert_eq!(ByteRange::placeholder().len(), BYTE_RANGE_WIDTH);
        assert!(text.starts_with("[0 1234 5678 90]"));
        assert_eq!(ByteRange::parse(text.as_bytes()).unwrap(), range);
    }

    #[test]
    fn covered_spans_skip_the_gap() {
        let pdf = b"AAA<00>CCC";
        let range = ByteRange::around(3, 4, pdf.len());
        let [first, second] = range.covered(pdf).unwrap();
        assert_eq!(first, b"AAA");
        assert_eq!(second, b"CCC");
        assert_eq!(range.gap(pdf).unwrap(), b"<00>");
    }

    #[test]
    fn ranges_that_miss_the_end_are_rejected() {
        assert!(ByteRange([0, 100, 150, 100]).validate(200).is_err());
        assert!(ByteRange([10, 100, 150, 50]).validate(200).is_err());
    }

    #[test]
    fn fill_pads_with_zeros() {
        let slot = ContentsPlaceholder::new(4);
        let mut pdf = b"XX<00000000>YY".to_vec();
        slot.fill(&mut pdf, 2, &[0xAB, 0xCD]).unwrap();
        assert_eq!(&pdf, b"XX<ABCD0000>YY");
    }

    #[test]
    fn oversized_signature_is_signing_failure() {
        let slot = ContentsPlaceholder::new(2);
        let mut pdf = b"XX<0000>YY".to_vec();
        assert!(matches!(
            slot.fill(&mut pdf, 2, &[1, 2, 3]),
            Err(DocsealError::SigningFailed(_))
        ));
    }

    #[test]
    fn garbage_byte_range_is_malformed() {
        assert!(ByteRange::parse(b"[0 1 2]").is_err());
        assert!(ByteRange::parse(b"no array here").is_err());
    }
}
