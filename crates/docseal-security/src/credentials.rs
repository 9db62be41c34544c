// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Signing credentials: where the PKCS#12 keystore comes from and the
// passphrase that unlocks it.

use std::path::PathBuf;

use docseal_core::config::SigningConfig;
use docseal_core::error::{DocsealError, Result};
use secrecy::{ExposeSecret, SecretString};
use tracing::debug;

/// Location of the keystore bytes.
#[derive(Clone)]
pub enum KeystoreSource {
    Path(PathBuf),
    Bytes(Vec<u8>),
}

impl std::fmt::Debug for KeystoreSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Path(path) => f.debug_tuple("Path").field(path).finish(),
            Self::Bytes(bytes) => write!(f, "Bytes({} bytes)", bytes.len()),
        }
    }
}

/// Keystore source plus passphrase, handed explicitly to the signing engine.
///
/// The keystore is read afresh from its source on every signing operation;
/// nothing decoded from it outlives the call.
#[derive(Clone)]
pub struct SigningCredentials {
    source: KeystoreSource,
    /// Wrapped in a `SecretString` so that it is zeroised on drop and kept out
    /// of `Debug` output.
    passphrase: SecretString,
}

impl SigningCredentials {
    pub fn new(source: KeystoreSource, passphrase: impl Into<String>) -> Self {
        Self {
            source,
            passphrase: SecretString::from(passphrase.into()),
        }
    }

    pub fn from_path(path: impl Into<PathBuf>, passphrase: impl Into<String>) -> Self {
        Self::new(KeystoreSource::Path(path.into()), passphrase)
    }

    pub fn from_bytes(bytes: Vec<u8>, passphrase: impl Into<String>) -> Self {
        Self::new(KeystoreSource::Bytes(bytes), passphrase)
    }

    /// Credentials described by the `signing` configuration section.
    pub fn from_config(config: &SigningConfig) -> Self {
        Self::from_path(&config.keystore_path, config.keystore_passphrase.clone())
    }

    pub fn source(&self) -> &KeystoreSource {
        &self.source
    }

    pub(crate) fn passphrase(&self) -> &str {
        self.passphrase.expose_secret()
    }

    /// Read the raw keystore bytes from their source.
    pub(crate) fn read_keystore(&self) -> Result<Vec<u8>> {
        match &self.source {
            KeystoreSource::Path(path) => {
                let bytes = std::fs::read(path).map_err(|e| {
                    DocsealError::KeystoreUnreadable(format!("{}: {e}", path.display()))
                })?;
                debug!(path = %path.display(), bytes = bytes.len(), "keystore read");
                Ok(bytes)
            }
            KeystoreSource::Bytes(bytes) if bytes.is_empty() => Err(
                DocsealError::KeystoreUnreadable("keystore byte source is empty".into()),
            ),
            KeystoreSource::Bytes(bytes) => Ok(bytes.clone()),
        }
    }
}

impl std::fmt::Debug for SigningCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SigningCredentials")
            .field("source", &self.source)
            .field("passphrase", &"[REDACTED]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_keystore_file_is_unreadable() {
        let creds = SigningCredentials::from_path("/nonexistent/cert.p12", "123456");
        assert!(matches!(
            creds.read_keystore(),
            Err(DocsealError::KeystoreUnreadable(_))
        ));
    }

    #[test]
    fn empty_byte_source_is_unreadable() {
        let creds = SigningCredentials::from_bytes(Vec::new(), "123456");
        assert!(matches!(
            creds.read_keystore(),
            Err(DocsealError::KeystoreUnreadable(_))
        ));
    }

    #[test]
    fn debug_output_hides_the_passphrase() {
        let creds = SigningCredentials::from_bytes(vec![1, 2, 3], "hunter2");
        let shown = format!("{creds:?}");
        assert!(!shown.contains("hunter2"));
        assert!(shown.contains("3 bytes"));
    }

    #[test]
    fn config_section_maps_to_a_path_source() {
        let creds = SigningCredentials::from_config(&SigningConfig::default());
        match creds.source() {
            KeystoreSource::Path(path) => assert!(path.ends_with("cert.p12")),
            other => panic!("unexpected source {other:?}"),
        }
        assert_eq!(creds.passphrase(), "123456");
    }
}
