// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// docseal-security: Keystore handling and PDF signing for Docseal.
//
// Decodes PKCS#12 keystores (RSA only), embeds detached CMS signatures into
// PDFs as incremental updates, and reads those signatures back.

pub mod credentials;
pub mod inspect;
pub mod integrity;
pub mod keystore;
pub mod signature;
pub mod signer;

#[cfg(any(test, feature = "fixtures"))]
pub mod fixtures;

pub use credentials::{KeystoreSource, SigningCredentials};
pub use inspect::SignatureInfo;
pub use integrity::hash_bytes;
pub use keystore::SigningIdentity;
pub use signer::{SignOptions, SignedArtifact, SignedBytes, SigningEngine};
