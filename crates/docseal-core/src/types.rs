// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the Docseal document store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Caller-assigned identity of a document.
///
/// Names every artifact the pipeline produces for the document, so it must be
/// stable for the document's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(pub i64);

impl DocumentId {
    /// Record ids start at 1; anything lower is never stored.
    pub fn is_valid(&self) -> bool {
        self.0 >= 1
    }
}

impl std::fmt::Display for DocumentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for DocumentId {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

/// The textual input to the render+sign pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub id: DocumentId,
    pub title: String,
    pub content: String,
}

impl Document {
    pub fn new(
        id: impl Into<DocumentId>,
        title: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            content: content.into(),
        }
    }
}

/// A document record as persisted, including its signed PDF.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredDocument {
    pub id: DocumentId,
    pub title: String,
    pub content: String,
    /// Signed PDF bytes produced by the pipeline from `title` and `content`.
    pub pdf: Vec<u8>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl StoredDocument {
    pub fn new(document: Document, pdf: Vec<u8>) -> Self {
        let now = Utc::now();
        Self {
            id: document.id,
            title: document.title,
            content: document.content,
            pdf,
            created_at: now,
            updated_at: now,
        }
    }

    /// The textual fields, without the rendered bytes.
    pub fn document(&self) -> Document {
        Document {
            id: self.id,
            title: self.title.clone(),
            content: self.content.clone(),
        }
    }
}

/// Listing view of a record (no PDF payload).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentSummary {
    pub id: DocumentId,
    pub title: String,
    pub content: String,
}

/// Built-in PDF base fonts usable without an external font file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BaseFont {
    Helvetica,
    TimesRoman,
    Courier,
}

/// Where the renderer gets its glyphs from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FontSource {
    /// One of the standard base fonts every PDF reader ships.
    Builtin(BaseFont),
    /// A TrueType/OpenType file embedded into the output.
    File(std::path::PathBuf),
}

impl Default for FontSource {
    fn default() -> Self {
        Self::Builtin(BaseFont::Helvetica)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_below_one_are_invalid() {
        assert!(!DocumentId(0).is_valid());
        assert!(!DocumentId(-4).is_valid());
        assert!(DocumentId(1).is_valid());
    }

    #[test]
    fn document_id_serialises_as_plain_number() {
        let json = serde_json::to_string(&DocumentId(7)).unwrap();
        assert_eq!(json, "7");
    }

    #[test]
    fn font_source_from_config_shapes() {
        let builtin: FontSource = serde_json::from_str(r#"{"builtin":"times-roman"}"#).unwrap();
        assert_eq!(builtin, FontSource::Builtin(BaseFont::TimesRoman));

        let file: FontSource = serde_json::from_str(r#"{"file":"fonts/arial.ttf"}"#).unwrap();
        assert_eq!(file, FontSource::File("fonts/arial.ttf".into()));
    }
}
