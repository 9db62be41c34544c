// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Read back the embedded signature of a signed PDF.
//
// This reports what the signature claims and whether the covered bytes still
// hash to the embedded digest. It does not validate the certificate or the
// RSA signature value.

use docseal_core::error::{DocsealError, Result};

use crate::integrity::sha256_parts;
use crate::signature::byterange::ByteRange;
use crate::signature::cms::parse_signed_data;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureInfo {
    pub byte_range: ByteRange,
    /// Digest recorded in the CMS `messageDigest` attribute.
    pub message_digest: Vec<u8>,
    /// SHA-256 of the covered bytes as they are now.
    pub computed_digest: [u8; 32],
    /// Dotted OID of the digest algorithm.
    pub digest_algorithm: String,
    pub signer_subject: Option<String>,
    /// Hex serial number of the signer certificate.
    pub signer_serial: String,
}

impl SignatureInfo {
    /// Inspect the last signature in `pdf`.
    pub fn extract(pdf: &[u8]) -> Result<Self> {
        const KEY: &[u8] = b"/ByteRange";
        let at = pdf
            .windows(KEY.len())
            .rposition(|window| window == KEY)
            .ok_or_else(|| DocsealError::MalformedPdf("no signature in document".into()))?;

        let byte_range = ByteRange::parse(&pdf[at + KEY.len()..])?;
        let gap = byte_range.gap(pdf)?;
        let hex_digits = gap
            .strip_prefix(b"<")
            .and_then(|rest| rest.strip_suffix(b">"))
            .ok_or_else(|| DocsealError::MalformedPdf("/Contents is not a hex string".into()))?;
        let der = hex::decode(hex_digits)
            .map_err(|e| DocsealError::MalformedPdf(format!("/Contents: {e}")))?;

        let summary = parse_signed_data(&der)?;
        let [before, after] = byte_range.covered(pdf)?;

        Ok(Self {
            byte_range,
            message_digest: summary.message_digest,
            computed_digest: sha256_parts(&[before, after]),
            digest_algorithm: summary.digest_algorithm,
            signer_subject: summary.subject,
            signer_serial: summary.serial,
        })
    }

    /// Whether the covered bytes still hash to the embedded digest.
    pub fn digest_matches(&self) -> bool {
        self.message_digest == self.computed_digest
    }
}
