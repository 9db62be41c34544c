// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Shared application state handed to every handler.

use std::sync::Arc;

use docseal_core::config::AppConfig;
use docseal_core::error::Result;
use docseal_store::DocumentStore;
use tracing::{info, warn};

use crate::services::{DocumentPipeline, DocumentService};

#[derive(Clone)]
pub struct AppState {
    pub documents: Arc<DocumentService>,
}

impl AppState {
    pub fn new(documents: DocumentService) -> Self {
        Self {
            documents: Arc::new(documents),
        }
    }

    /// Open the record store and prepare the pipeline described by `config`.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let store = DocumentStore::open(&config.storage.database_path)?;
        let pipeline = DocumentPipeline::from_config(config)?;

        // The keystore is read on every signing call, so a missing file is
        // not fatal here; report it early anyway.
        if !config.signing.keystore_path.exists() {
            warn!(
                path = %config.signing.keystore_path.display(),
                "signing keystore not found; signing will fail until it exists"
            );
        }
        info!(
            workdir = %pipeline.workdir().root().display(),
            "document service ready"
        );

        Ok(Self::new(DocumentService::new(store, pipeline)))
    }
}
