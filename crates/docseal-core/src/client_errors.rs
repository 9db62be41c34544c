// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Client-facing error descriptions.
//
// Every internal error maps to a stable code and a fixed message. Messages
// never include filesystem paths, passphrases or key material; the detailed
// error only goes to the log.

use crate::error::DocsealError;

/// Broad category of a failure, which drives the transport status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// The request itself is wrong (bad id, malformed body).
    InvalidRequest,
    /// The addressed record does not exist.
    NotFound,
    /// The record already exists.
    Conflict,
    /// Nothing was produced: the page could not be rendered.
    Rendering,
    /// The page rendered but could not be signed.
    Signing,
    /// Storage or other internal failure.
    Internal,
}

/// A failure as shown to API clients.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientError {
    /// Stable machine-readable code.
    pub code: &'static str,
    /// Human-readable summary, safe to show verbatim.
    pub message: String,
    pub class: ErrorClass,
    /// Whether repeating the same request could succeed.
    pub retriable: bool,
}

impl ClientError {
    fn new(
        code: &'static str,
        message: impl Into<String>,
        class: ErrorClass,
        retriable: bool,
    ) -> Self {
        Self {
            code,
            message: message.into(),
            class,
            retriable,
        }
    }
}

/// Describe `err` for an API client.
pub fn describe_error(err: &DocsealError) -> ClientError {
    match err {
        // -- Rendering --
        DocsealError::FontUnavailable(_) => ClientError::new(
            "FontUnavailable",
            "PDF generation failed: the configured font could not be loaded",
            ErrorClass::Rendering,
            false,
        ),
        DocsealError::LayoutOverflow { .. } => ClientError::new(
            "LayoutOverflow",
            "PDF generation failed: the page layout leaves no room for content",
            ErrorClass::Rendering,
            false,
        ),

        // -- Signing --
        DocsealError::KeystoreUnreadable(_) => ClientError::new(
            "KeystoreUnavailable",
            "PDF signing failed: the signing keystore is not available",
            ErrorClass::Signing,
            true,
        ),
        DocsealError::KeystoreDecodeFailed(_) => ClientError::new(
            "KeystoreRejected",
            "PDF signing failed: the signing keystore could not be opened",
            ErrorClass::Signing,
            false,
        ),
        DocsealError::UnsupportedKeyType(_) => ClientError::new(
            "UnsupportedKeyType",
            "PDF signing failed: the signing key is not an RSA key",
            ErrorClass::Signing,
            false,
        ),
        DocsealError::SigningFailed(_) => ClientError::new(
            "SigningFailed",
            "PDF signing failed",
            ErrorClass::Signing,
            false,
        ),
        DocsealError::MalformedPdf(_) => ClientError::new(
            "MalformedPdf",
            "The generated PDF could not be parsed",
            ErrorClass::Internal,
            false,
        ),
        DocsealError::ArtifactIo { source, .. } => ClientError::new(
            "ArtifactError",
            "Failed to read or write the generated PDF",
            ErrorClass::Internal,
            matches!(
                source.kind(),
                std::io::ErrorKind::Interrupted | std::io::ErrorKind::WouldBlock
            ),
        ),

        // -- Records --
        DocsealError::NotFound(_) => {
            ClientError::new("NotFound", "PDF not found", ErrorClass::NotFound, false)
        }
        DocsealError::Conflict(_) => ClientError::new(
            "Conflict",
            "A PDF with this id already exists",
            ErrorClass::Conflict,
            false,
        ),
        DocsealError::InvalidInput(detail) => ClientError::new(
            "InvalidRequest",
            format!("Invalid request: {detail}"),
            ErrorClass::InvalidRequest,
            false,
        ),

        // -- Internal --
        DocsealError::Database(_) => ClientError::new(
            "DatabaseError",
            "Database operation failed",
            ErrorClass::Internal,
            true,
        ),
        DocsealError::Config(_) => ClientError::new(
            "InternalError",
            "An internal error occurred",
            ErrorClass::Internal,
            false,
        ),
    }
}
