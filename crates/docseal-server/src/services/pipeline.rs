// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Render+sign pipeline for one document.
//
// Stage 1 renders to `unsigned_<id>.pdf`, stage 2 signs it into `<id>.pdf`.
// A render failure leaves nothing behind; a sign failure keeps the unsigned
// artifact and reports where it is.

use docseal_core::artifacts::WorkDir;
use docseal_core::config::AppConfig;
use docseal_core::error::{PipelineError, Result};
use docseal_core::types::{Document, DocumentId};
use docseal_document::PageRenderer;
use docseal_security::{SignOptions, SignedArtifact, SigningCredentials, SigningEngine};
use tracing::{info, instrument, warn};

use super::locks::IdentityLocks;

pub struct DocumentPipeline {
    renderer: PageRenderer,
    engine: SigningEngine,
    credentials: SigningCredentials,
    workdir: WorkDir,
    locks: IdentityLocks,
}

impl DocumentPipeline {
    pub fn new(
        renderer: PageRenderer,
        engine: SigningEngine,
        credentials: SigningCredentials,
        workdir: WorkDir,
    ) -> Self {
        Self {
            renderer,
            engine,
            credentials,
            workdir,
            locks: IdentityLocks::new(),
        }
    }

    /// Build the pipeline described by `config`, creating the working
    /// directory if needed.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let workdir = WorkDir::create(&config.storage.working_dir)?;
        Ok(Self::new(
            PageRenderer::new(config.rendering.font.clone()),
            SigningEngine::new(SignOptions::from_config(&config.signing)),
            SigningCredentials::from_config(&config.signing),
            workdir,
        ))
    }

    pub fn workdir(&self) -> &WorkDir {
        &self.workdir
    }

    /// Locks guarding the artifacts of each identity. Callers that must keep
    /// a record and its artifacts consistent hold the lock themselves and use
    /// [`run_locked`](Self::run_locked).
    pub fn locks(&self) -> &IdentityLocks {
        &self.locks
    }

    /// Render and sign `document`, serialized against other runs for the same
    /// id.
    pub fn run(&self, document: &Document) -> std::result::Result<SignedArtifact, PipelineError> {
        self.locks.with_lock(document.id, || self.run_locked(document))
    }

    /// Render and sign `document`. The caller must hold the identity lock for
    /// `document.id`.
    #[instrument(skip_all, fields(id = %document.id))]
    pub fn run_locked(
        &self,
        document: &Document,
    ) -> std::result::Result<SignedArtifact, PipelineError> {
        let rendering = self
            .renderer
            .render_to(document, &self.workdir)
            .map_err(PipelineError::Render)?;

        let target = self.workdir.paths_for(document.id).signed;
        let artifact = self
            .engine
            .sign(&rendering.path, &target, &self.credentials)
            .map_err(|source| PipelineError::Sign {
                retained: rendering.path.clone(),
                source,
            })?;

        if let Some(reason) = artifact.cleanup.warning() {
            warn!(id = %document.id, reason, "signed artifact ready, transient left behind");
        }
        info!(
            id = %document.id,
            bytes = artifact.bytes.len(),
            dropped_lines = rendering.dropped_lines,
            "document rendered and signed"
        );
        Ok(artifact)
    }

    /// Path of the signed artifact for `id`.
    pub fn signed_path(&self, id: DocumentId) -> std::path::PathBuf {
        self.workdir.paths_for(id).signed
    }
}
