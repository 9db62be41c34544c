// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PKCS#12 keystore decoding: extract the signing key and certificate.
//
// Both the legacy (3DES, SHA-1 MAC) and the PBES2 (AES, SHA-2 MAC) container
// formats are read. Only RSA keys are accepted. The key's algorithm is checked
// on the PKCS#8 envelope before any RSA parsing so that other key types fail
// with a precise error instead of a generic decode failure.

use const_oid::db::rfc5912::RSA_ENCRYPTION;
use der::{Decode, Encode};
use docseal_core::error::{DocsealError, Result};
use p12_keystore::{KeyStore, KeyStoreEntry};
use pkcs8::PrivateKeyInfo;
use rsa::pkcs8::{DecodePrivateKey, DecodePublicKey};
use rsa::{RsaPrivateKey, RsaPublicKey};
use tracing::{debug, instrument};
use x509_cert::Certificate;

use crate::credentials::SigningCredentials;

/// Key material extracted from a keystore for one signing operation.
pub struct SigningIdentity {
    pub key: RsaPrivateKey,
    pub certificate: Certificate,
}

impl std::fmt::Debug for SigningIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SigningIdentity")
            .field("key", &"[REDACTED]")
            .field("subject", &self.certificate.tbs_certificate.subject.to_string())
            .finish()
    }
}

/// Read and decode the keystore named by `credentials`.
#[instrument(skip_all)]
pub fn load_identity(credentials: &SigningCredentials) -> Result<SigningIdentity> {
    let bytes = credentials.read_keystore()?;
    decode_keystore(&bytes, credentials.passphrase())
}

/// Decode a PKCS#12 container, returning its RSA key and the certificate
/// issued for that key.
///
/// The container must hold exactly one private key. Further certificates
/// (a chain, trusted roots) are allowed; the one whose public key matches the
/// private key is used.
pub fn decode_keystore(bytes: &[u8], passphrase: &str) -> Result<SigningIdentity> {
    let store = KeyStore::from_pkcs12(bytes, passphrase)
        .map_err(|e| DocsealError::KeystoreDecodeFailed(format!("cannot open container: {e}")))?;

    let mut keys = Vec::new();
    let mut certificates = Vec::new();
    for (_, entry) in store.entries() {
        if let KeyStoreEntry::PrivateKeyChain(chain) = entry {
            keys.push(chain.key());
            certificates.extend(chain.chain().iter().map(|c| c.as_der()));
        } else if let KeyStoreEntry::Certificate(certificate) = entry {
            certificates.push(certificate.as_der());
        }
    }

    let key_der = match keys.as_slice() {
        [key] => *key,
        [] => return Err(DocsealError::KeystoreDecodeFailed("no private key in keystore".into())),
        more => {
            return Err(DocsealError::KeystoreDecodeFailed(format!(
                "keystore holds {} private keys, expected one",
                more.len()
            )));
        }
    };

    ensure_rsa(key_der)?;

    let key = RsaPrivateKey::from_pkcs8_der(key_der)
        .map_err(|e| DocsealError::KeystoreDecodeFailed(format!("RSA key: {e}")))?;
    let certificate = certificate_for(&key, &certificates)?;

    debug!(
        subject = %certificate.tbs_certificate.subject,
        certificates = certificates.len(),
        "keystore decoded"
    );

    Ok(SigningIdentity { key, certificate })
}

/// Reject any PKCS#8 key whose algorithm is not `rsaEncryption`.
fn ensure_rsa(key_der: &[u8]) -> Result<()> {
    let info = PrivateKeyInfo::try_from(key_der)
        .map_err(|e| DocsealError::KeystoreDecodeFailed(format!("PKCS#8 envelope: {e}")))?;
    let oid = info.algorithm.oid;
    if oid != RSA_ENCRYPTION {
        return Err(DocsealError::UnsupportedKeyType(oid.to_string()));
    }
    Ok(())
}

/// The first certificate among `candidates` whose subject public key is the
/// public half of `key`.
fn certificate_for(key: &RsaPrivateKey, candidates: &[&[u8]]) -> Result<Certificate> {
    let public = key.to_public_key();
    for der in candidates {
        let certificate = Certificate::from_der(der)
            .map_err(|e| DocsealError::KeystoreDecodeFailed(format!("certificate: {e}")))?;
        let spki = certificate
            .tbs_certificate
            .subject_public_key_info
            .to_der()
            .map_err(|e| DocsealError::KeystoreDecodeFailed(format!("certificate key: {e}")))?;
        if RsaPublicKey::from_public_key_der(&spki).is_ok_and(|k| k == public) {
            return Ok(certificate);
        }
    }
    Err(DocsealError::KeystoreDecodeFailed(
        "no certificate in keystore matches the private key".into(),
    ))
}
