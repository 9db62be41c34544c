// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Document service: keeps the record store and the signed artifacts in step.
//
// Every mutation of a record runs under the identity lock for its id, so the
// stored PDF and `<id>.pdf` on disk always come from the same pipeline run.
// The rusqlite connection is `Send` but not `Sync`, so the store sits behind
// a `Mutex`; queries are short and contention is negligible.

use std::sync::{Mutex, MutexGuard};

use docseal_core::artifacts::{remove_if_exists, write_atomic};
use docseal_core::error::{DocsealError, PipelineError, Result};
use docseal_core::types::{Document, DocumentId, DocumentSummary, StoredDocument};
use docseal_store::DocumentStore;
use tracing::{error, info, instrument, warn};

use super::pipeline::DocumentPipeline;

/// Fields a caller may change on an existing record. `None` keeps the
/// current value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentPatch {
    pub title: Option<String>,
    pub content: Option<String>,
}

pub struct DocumentService {
    store: Mutex<DocumentStore>,
    pipeline: DocumentPipeline,
}

impl DocumentService {
    pub fn new(store: DocumentStore, pipeline: DocumentPipeline) -> Self {
        Self {
            store: Mutex::new(store),
            pipeline,
        }
    }

    pub fn pipeline(&self) -> &DocumentPipeline {
        &self.pipeline
    }

    /// Render, sign and store a new document under the caller's id.
    ///
    /// If the record cannot be stored, the fresh `<id>.pdf` is removed again.
    #[instrument(skip(self, title, content))]
    pub fn create(&self, id: DocumentId, title: String, content: String) -> Result<StoredDocument> {
        if !id.is_valid() {
            return Err(DocsealError::InvalidInput(format!("id must be at least 1, got {id}")));
        }

        self.pipeline.locks().with_lock(id, || {
            if self.store()?.get(id)?.is_some() {
                return Err(DocsealError::Conflict(id));
            }

            let document = Document::new(id, title, content);
            let artifact = self.pipeline.run_locked(&document).map_err(surface)?;
            let record = StoredDocument::new(document, artifact.bytes);
            if let Err(e) = self.store().and_then(|store| store.insert(&record)) {
                self.roll_back_artifact(id, None);
                return Err(e);
            }

            info!(id = %id, "document created");
            Ok(record)
        })
    }

    pub fn get(&self, id: DocumentId) -> Result<StoredDocument> {
        self.store()?.get(id)?.ok_or(DocsealError::NotFound(id))
    }

    pub fn list(&self) -> Result<Vec<DocumentSummary>> {
        self.store()?.list()
    }

    /// Apply `patch`, re-render and re-sign, and store the new PDF.
    ///
    /// On failure the record and `<id>.pdf` keep their previous contents.
    #[instrument(skip(self, patch))]
    pub fn update(&self, id: DocumentId, patch: DocumentPatch) -> Result<StoredDocument> {
        if !id.is_valid() {
            return Err(DocsealError::InvalidInput(format!("id must be at least 1, got {id}")));
        }

        self.pipeline.locks().with_lock(id, || {
            let mut record = self.store()?.get(id)?.ok_or(DocsealError::NotFound(id))?;
            if let Some(title) = patch.title {
                record.title = title;
            }
            if let Some(content) = patch.content {
                record.content = content;
            }

            let artifact = self.pipeline.run_locked(&record.document()).map_err(surface)?;
            let previous = std::mem::replace(&mut record.pdf, artifact.bytes);
            match self.store().and_then(|store| store.update(&record)) {
                Ok(updated_at) => record.updated_at = updated_at,
                Err(e) => {
                    self.roll_back_artifact(id, Some(&previous));
                    return Err(e);
                }
            }

            info!(id = %id, "document updated");
            Ok(record)
        })
    }

    /// Delete the record, then its signed artifact.
    ///
    /// A missing artifact is fine; failing to remove an existing one is
    /// logged and does not undo the deletion.
    #[instrument(skip(self))]
    pub fn delete(&self, id: DocumentId) -> Result<()> {
        self.pipeline.locks().with_lock(id, || {
            self.store()?.delete(id)?;

            let path = self.pipeline.signed_path(id);
            match remove_if_exists(&path) {
                Ok(true) => info!(id = %id, "document and signed artifact deleted"),
                Ok(false) => info!(id = %id, "document deleted, no signed artifact on disk"),
                Err(e) => warn!(
                    id = %id,
                    error = %e,
                    "document deleted, signed artifact left behind"
                ),
            }
            Ok(())
        })
    }

    /// Put `<id>.pdf` back the way it was before a store write failed:
    /// `previous` bytes are restored, `None` removes the file.
    fn roll_back_artifact(&self, id: DocumentId, previous: Option<&[u8]>) {
        let path = self.pipeline.signed_path(id);
        let rolled_back = match previous {
            Some(bytes) => write_atomic(&path, bytes),
            None => remove_if_exists(&path).map(|_| ()),
        };
        match rolled_back {
            Ok(()) => warn!(id = %id, "store write failed, signed artifact rolled back"),
            Err(e) => error!(
                id = %id,
                error = %e,
                "store write failed, signed artifact out of step with the record"
            ),
        }
    }

    fn store(&self) -> Result<MutexGuard<'_, DocumentStore>> {
        self.store
            .lock()
            .map_err(|_| DocsealError::Database("document store lock poisoned".into()))
    }
}

/// Log a pipeline failure with its stage details and hand back the cause.
fn surface(err: PipelineError) -> DocsealError {
    match err.retained_artifact() {
        Some(retained) => error!(
            error = %err,
            retained = %retained.display(),
            "signing failed, unsigned artifact kept"
        ),
        None => error!(error = %err, "rendering failed"),
    }
    err.into_cause()
}
