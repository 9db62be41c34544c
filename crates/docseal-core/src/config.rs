// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Application configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::types::FontSource;

/// Process-wide settings. Every section has defaults so a partial config file
/// (or none at all) is enough to start.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub signing: SigningConfig,
    pub rendering: RenderingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 4000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// SQLite database holding the document records.
    pub database_path: PathBuf,
    /// Directory the pipeline writes `unsigned_<id>.pdf` and `<id>.pdf` into.
    pub working_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from("docseal.db"),
            working_dir: PathBuf::from("artifacts"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SigningConfig {
    /// PKCS#12 container with the signing key and certificate.
    pub keystore_path: PathBuf,
    pub keystore_passphrase: String,
    pub reason: Option<String>,
    pub location: Option<String>,
    pub contact_info: Option<String>,
    /// `/Name` in the signature dictionary.
    pub signer_name: Option<String>,
    /// Name of the signature form field; a built-in name when unset.
    pub field_name: Option<String>,
}

impl Default for SigningConfig {
    fn default() -> Self {
        Self {
            keystore_path: PathBuf::from("cert.p12"),
            keystore_passphrase: "123456".into(),
            reason: None,
            location: None,
            contact_info: None,
            signer_name: None,
            field_name: None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderingConfig {
    pub font: FontSource,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::BaseFont;

    #[test]
    fn defaults_match_the_documented_values() {
        let config = AppConfig::default();
        assert_eq!(config.server.port, 4000);
        assert_eq!(config.storage.working_dir, PathBuf::from("artifacts"));
        assert_eq!(config.signing.keystore_path, PathBuf::from("cert.p12"));
        assert_eq!(config.rendering.font, FontSource::Builtin(BaseFont::Helvetica));
    }

    #[test]
    fn partial_documents_fill_in_defaults() {
        let json = r#"{"server":{"port":8080},"rendering":{"font":{"file":"a.ttf"}}}"#;
        let config: AppConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.rendering.font, FontSource::File("a.ttf".into()));
        assert_eq!(config.signing.keystore_passphrase, "123456");
    }
}
