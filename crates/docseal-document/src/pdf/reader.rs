// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF reader: open and inspect existing PDF documents using the `lopdf` crate.
//
// The signing engine uses this to find the objects an incremental update has
// to supersede (catalog, first page) and the trailer entries it must carry
// forward.

use std::path::Path;

use docseal_core::error::{DocsealError, Result};
use lopdf::{Dictionary, Document, Object, ObjectId};
use tracing::{debug, instrument};

/// Read-only view over a parsed PDF.
pub struct PdfReader {
    /// The underlying lopdf document.
    document: Document,
    /// Source path, if opened from a file (useful for diagnostics).
    source_path: Option<String>,
}

impl PdfReader {
    // -- Construction ---------------------------------------------------------

    /// Open a PDF from the filesystem.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path_ref = path.as_ref();
        let document = Document::load(path_ref).map_err(|err| {
            DocsealError::MalformedPdf(format!("failed to open {}: {err}", path_ref.display()))
        })?;

        debug!(pages = document.get_pages().len(), "PDF loaded");

        Ok(Self {
            document,
            source_path: Some(path_ref.display().to_string()),
        })
    }

    /// Create a reader from raw PDF bytes already in memory.
    #[instrument(skip_all, fields(bytes_len = data.len()))]
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let document = Document::load_mem(data).map_err(|err| {
            DocsealError::MalformedPdf(format!("failed to load PDF from memory: {err}"))
        })?;

        debug!(pages = document.get_pages().len(), "PDF loaded from bytes");

        Ok(Self {
            document,
            source_path: None,
        })
    }

    // -- Inspection -----------------------------------------------------------

    /// Number of pages in the document.
    pub fn page_count(&self) -> usize {
        self.document.get_pages().len()
    }

    /// Return the source path if the reader was created via [`PdfReader::open`].
    pub fn source_path(&self) -> Option<&str> {
        self.source_path.as_deref()
    }

    /// Object id of page `page_number` (1-indexed).
    pub fn page_id(&self, page_number: u32) -> Result<ObjectId> {
        let pages = self.document.get_pages();
        pages.get(&page_number).copied().ok_or_else(|| {
            DocsealError::MalformedPdf(format!(
                "page {page_number} out of range (document has {} pages)",
                pages.len()
            ))
        })
    }

    /// `[llx, lly, urx, ury]` of the page's media box, following inheritance
    /// from the parent page tree node.
    pub fn media_box(&self, page_number: u32) -> Result<[f32; 4]> {
        let mut node = self.dictionary(self.page_id(page_number)?)?;
        loop {
            if let Ok(mb) = node.get(b"MediaBox") {
                return parse_rect(self.resolve(mb)?);
            }
            let parent = node
                .get(b"Parent")
                .and_then(Object::as_reference)
                .map_err(|_| DocsealError::MalformedPdf("page has no /MediaBox".into()))?;
            node = self.dictionary(parent)?;
        }
    }

    /// Decoded content stream(s) of page `page_number`.
    pub fn page_content(&self, page_number: u32) -> Result<Vec<u8>> {
        let id = self.page_id(page_number)?;
        self.document
            .get_page_content(id)
            .map_err(|err| DocsealError::MalformedPdf(format!("page {page_number} content: {err}")))
    }

    /// Object id of the document catalog (`/Root`).
    pub fn catalog_id(&self) -> Result<ObjectId> {
        self.document
            .trailer
            .get(b"Root")
            .and_then(Object::as_reference)
            .map_err(|err| DocsealError::MalformedPdf(format!("trailer /Root: {err}")))
    }

    /// Dictionary stored as object `id`.
    pub fn dictionary(&self, id: ObjectId) -> Result<&Dictionary> {
        self.document
            .get_dictionary(id)
            .map_err(|err| DocsealError::MalformedPdf(format!("object {} {}: {err}", id.0, id.1)))
    }

    /// The (merged) trailer dictionary.
    pub fn trailer(&self) -> &Dictionary {
        &self.document.trailer
    }

    /// First object number that is free for new objects.
    ///
    /// Honours the trailer's `/Size` as well as the highest object actually
    /// present, whichever is larger.
    pub fn next_object_number(&self) -> u32 {
        let size = self
            .document
            .trailer
            .get(b"Size")
            .and_then(Object::as_i64)
            .ok()
            .and_then(|s| u32::try_from(s).ok())
            .unwrap_or(0);
        size.max(self.document.max_id + 1)
    }

    /// Follow `object` if it is a reference.
    pub fn resolve<'a>(&'a self, object: &'a Object) -> Result<&'a Object> {
        match object {
            Object::Reference(id) => self.document.get_object(*id).map_err(|err| {
                DocsealError::MalformedPdf(format!("dangling reference {} {}: {err}", id.0, id.1))
            }),
            other => Ok(other),
        }
    }

    /// The underlying lopdf document.
    pub fn document(&self) -> &Document {
        &self.document
    }
}

fn parse_rect(object: &Object) -> Result<[f32; 4]> {
    let values = object
        .as_array()
        .map_err(|_| DocsealError::MalformedPdf("rectangle is not an array".into()))?;
    if values.len() != 4 {
        return Err(DocsealError::MalformedPdf(format!(
            "rectangle has {} entries",
            values.len()
        )));
    }
    let mut rect = [0.0f32; 4];
    for (slot, value) in rect.iter_mut().zip(values) {
        *slot = value
            .as_float()
            .map_err(|_| DocsealError::MalformedPdf("rectangle entry is not a number".into()))?;
    }
    Ok(rect)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::renderer::PageRenderer;

    fn sample() -> Vec<u8> {
        PageRenderer::default().render("Title", "Body").unwrap().bytes
    }

    #[test]
    fn garbage_is_malformed() {
        assert!(matches!(
            PdfReader::from_bytes(b"not a pdf"),
            Err(DocsealError::MalformedPdf(_))
        ));
    }

    #[test]
    fn catalog_and_first_page_resolve() {
        let reader = PdfReader::from_bytes(&sample()).unwrap();
        let catalog = reader.dictionary(reader.catalog_id().unwrap()).unwrap();
        assert_eq!(catalog.get(b"Type").unwrap().as_name().unwrap(), b"Catalog");

        let page = reader.dictionary(reader.page_id(1).unwrap()).unwrap();
        assert_eq!(page.get(b"Type").unwrap().as_name().unwrap(), b"Page");
    }

    #[test]
    fn out_of_range_page_is_an_error() {
        let reader = PdfReader::from_bytes(&sample()).unwrap();
        assert!(reader.page_id(2).is_err());
        assert!(reader.page_id(0).is_err());
    }

    #[test]
    fn next_object_number_is_past_every_object() {
        let reader = PdfReader::from_bytes(&sample()).unwrap();
        let next = reader.next_object_number();
        assert!(reader.document().objects.keys().all(|(num, _)| *num < next));
    }

    #[test]
    fn open_records_the_source_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.pdf");
        std::fs::write(&path, sample()).unwrap();

        let reader = PdfReader::open(&path).unwrap();
        assert_eq!(reader.page_count(), 1);
        assert!(reader.source_path().unwrap().ends_with("a.pdf"));
    }
}
