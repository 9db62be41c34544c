// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Docseal.

use std::path::PathBuf;

use thiserror::Error;

use crate::types::DocumentId;

/// Top-level error type for all Docseal operations.
#[derive(Debug, Error)]
pub enum DocsealError {
    // -- Rendering errors --
    #[error("font unavailable: {0}")]
    FontUnavailable(String),

    #[error("content rectangle is empty ({width_pt} x {height_pt} pt)")]
    LayoutOverflow { width_pt: f32, height_pt: f32 },

    // -- Signing errors --
    #[error("keystore unreadable: {0}")]
    KeystoreUnreadable(String),

    #[error("keystore could not be decoded: {0}")]
    KeystoreDecodeFailed(String),

    #[error("unsupported private key type: {0}")]
    UnsupportedKeyType(String),

    #[error("signing failed: {0}")]
    SigningFailed(String),

    // -- PDF structure --
    #[error("malformed PDF: {0}")]
    MalformedPdf(String),

    // -- Artifact files --
    #[error("artifact I/O failed on {}: {source}", path.display())]
    ArtifactIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // -- Storage / records --
    #[error("document {0} not found")]
    NotFound(DocumentId),

    #[error("document {0} already exists")]
    Conflict(DocumentId),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("database error: {0}")]
    Database(String),

    #[error("configuration error: {0}")]
    Config(String),
}

impl DocsealError {
    /// Wrap an I/O error with the artifact path it occurred on.
    pub fn artifact_io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::ArtifactIo {
            path: path.into(),
            source,
        }
    }
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, DocsealError>;

/// Failure of a render+sign pipeline run.
///
/// Cleanup is asymmetric: a `Render` failure means nothing was produced, a
/// `Sign` failure means the unsigned artifact still exists at `retained`.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("rendering failed: {0}")]
    Render(#[source] DocsealError),

    #[error("signing failed, unsigned artifact retained at {}: {source}", retained.display())]
    Sign {
        retained: PathBuf,
        #[source]
        source: DocsealError,
    },
}

impl PipelineError {
    /// The underlying error, regardless of stage.
    pub fn cause(&self) -> &DocsealError {
        match self {
            Self::Render(source) | Self::Sign { source, .. } => source,
        }
    }

    /// Path of the unsigned artifact left behind, if any.
    pub fn retained_artifact(&self) -> Option<&std::path::Path> {
        match self {
            Self::Render(_) => None,
            Self::Sign { retained, .. } => Some(retained),
        }
    }

    pub fn into_cause(self) -> DocsealError {
        match self {
            Self::Render(source) | Self::Sign { source, .. } => source,
        }
    }
}
