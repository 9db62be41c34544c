// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Signing engine: turn an unsigned PDF into a signed one.
//
// Each call re-reads and decodes the keystore, appends a signature field as an
// incremental update, signs the covered byte ranges with SHA-256 + RSA and
// writes the final artifact atomically. The unsigned input is removed only
// after the final artifact is in place; on any failure it stays untouched.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use docseal_core::artifacts::{Cleanup, discard_transient, read_artifact, write_atomic};
use docseal_core::config::SigningConfig;
use docseal_core::error::Result;
use tracing::{debug, info, instrument};

use crate::credentials::SigningCredentials;
use crate::integrity::{hash_bytes, sha256_parts};
use crate::keystore::{SigningIdentity, load_identity};
use crate::signature::byterange::{ByteRange, DEFAULT_SIGNATURE_CAPACITY};
use crate::signature::cms::SignatureContext;
use crate::signature::incremental;

/// Name of the signature form field unless configured otherwise.
pub const DEFAULT_FIELD_NAME: &str = "Signature1";

/// Metadata written into the signature dictionary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignOptions {
    pub reason: Option<String>,
    pub location: Option<String>,
    pub contact_info: Option<String>,
    pub signer_name: Option<String>,
    /// `/T` of the signature widget.
    pub field_name: String,
    /// Bytes reserved for the DER signature inside `/Contents`.
    pub signature_capacity: usize,
    /// Signing time recorded as `/M`. `None` means the time of signing.
    pub signing_time: Option<DateTime<Utc>>,
}

impl Default for SignOptions {
    fn default() -> Self {
        Self {
            reason: None,
            location: None,
            contact_info: None,
            signer_name: None,
            field_name: DEFAULT_FIELD_NAME.into(),
            signature_capacity: DEFAULT_SIGNATURE_CAPACITY,
            signing_time: None,
        }
    }
}

impl SignOptions {
    pub fn from_config(config: &SigningConfig) -> Self {
        Self {
            reason: config.reason.clone(),
            location: config.location.clone(),
            contact_info: config.contact_info.clone(),
            signer_name: config.signer_name.clone(),
            field_name: config
                .field_name
                .clone()
                .unwrap_or_else(|| DEFAULT_FIELD_NAME.into()),
            ..Self::default()
        }
    }
}

/// A signed PDF held in memory.
#[derive(Debug, Clone)]
pub struct SignedBytes {
    pub bytes: Vec<u8>,
    /// SHA-256 over the byte range, as embedded in the CMS `messageDigest`.
    pub message_digest: [u8; 32],
    pub byte_range: ByteRange,
}

/// Outcome of a successful [`SigningEngine::sign`].
#[derive(Debug, Clone)]
pub struct SignedArtifact {
    pub path: PathBuf,
    pub bytes: Vec<u8>,
    pub message_digest: [u8; 32],
    /// Whether the unsigned input could be removed. A failure here does not
    /// invalidate the signed artifact.
    pub cleanup: Cleanup,
}

#[derive(Debug, Clone, Default)]
pub struct SigningEngine {
    options: SignOptions,
}

impl SigningEngine {
    pub fn new(options: SignOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &SignOptions {
        &self.options
    }

    /// Sign the PDF at `unsigned_path`, writing the result to `final_path`.
    ///
    /// Fails before touching `final_path` if the keystore cannot be read or
    /// decoded or holds a non-RSA key.
    #[instrument(
        skip_all,
        fields(unsigned = %unsigned_path.display(), target = %final_path.display())
    )]
    pub fn sign(
        &self,
        unsigned_path: &Path,
        final_path: &Path,
        credentials: &SigningCredentials,
    ) -> Result<SignedArtifact> {
        let identity = load_identity(credentials)?;
        let unsigned = read_artifact(unsigned_path)?;

        let signed = self.sign_bytes(&unsigned, &identity)?;
        write_atomic(final_path, &signed.bytes)?;

        info!(
            bytes = signed.bytes.len(),
            sha256 = %hash_bytes(&signed.bytes),
            "signed artifact written"
        );

        let cleanup = discard_transient(unsigned_path);

        Ok(SignedArtifact {
            path: final_path.to_path_buf(),
            bytes: signed.bytes,
            message_digest: signed.message_digest,
            cleanup,
        })
    }

    /// Sign `unsigned` in memory with an already decoded identity.
    #[instrument(skip_all, fields(unsigned_len = unsigned.len()))]
    pub fn sign_bytes(&self, unsigned: &[u8], identity: &SigningIdentity) -> Result<SignedBytes> {
        let signed_at = self.options.signing_time.unwrap_or_else(Utc::now);
        let mut prepared = incremental::prepare(unsigned, &self.options, signed_at)?;

        let [before, after] = prepared.byte_range.covered(&prepared.bytes)?;
        let message_digest = sha256_parts(&[before, after]);
        debug!(digest = %hex::encode(message_digest), "byte range digested");

        let signature = SignatureContext::new(identity).sign_digest(&message_digest)?;
        debug!(
            signature_len = signature.len(),
            capacity = prepared.placeholder.capacity(),
            "CMS signature built"
        );
        prepared
            .placeholder
            .fill(&mut prepared.bytes, prepared.contents_offset, &signature)?;

        Ok(SignedBytes {
            bytes: prepared.bytes,
            message_digest,
            byte_range: prepared.byte_range,
        })
    }
}
