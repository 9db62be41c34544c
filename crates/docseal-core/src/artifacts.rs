// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Artifact lifecycle: deterministic naming of the transient and final PDFs
// for a document identity, atomic writes, and best-effort removal.
//
// Layout inside the working directory:
//   unsigned_<id>.pdf   transient, exists between render and a successful sign
//   <id>.pdf            final signed artifact, overwritten on every re-render

use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::{DocsealError, Result};
use crate::types::DocumentId;

/// Extension shared by every artifact the pipeline writes.
pub const ARTIFACT_EXTENSION: &str = "pdf";

/// File name of the unsigned intermediate for `id`.
pub fn unsigned_file_name(id: DocumentId) -> String {
    format!("unsigned_{id}.{ARTIFACT_EXTENSION}")
}

/// File name of the signed artifact for `id`.
pub fn signed_file_name(id: DocumentId) -> String {
    format!("{id}.{ARTIFACT_EXTENSION}")
}

/// The pair of paths belonging to one document identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    pub unsigned: PathBuf,
    pub signed: PathBuf,
}

/// Directory owned by the pipeline's caller where artifacts live.
#[derive(Debug, Clone)]
pub struct WorkDir {
    root: PathBuf,
}

impl WorkDir {
    /// Use `root` as the working directory, creating it if needed.
    pub fn create(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root).map_err(|e| DocsealError::artifact_io(&root, e))?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn paths_for(&self, id: DocumentId) -> ArtifactPaths {
        ArtifactPaths {
            unsigned: self.root.join(unsigned_file_name(id)),
            signed: self.root.join(signed_file_name(id)),
        }
    }
}

/// Result of removing a transient artifact after the work it fed succeeded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cleanup {
    Removed,
    /// Removal failed; the pipeline still succeeded. Carries the reason.
    Failed(String),
}

impl Cleanup {
    pub fn warning(&self) -> Option<&str> {
        match self {
            Self::Removed => None,
            Self::Failed(reason) => Some(reason),
        }
    }
}

/// Remove the transient artifact at `path`, downgrading failure to a warning.
pub fn discard_transient(path: &Path) -> Cleanup {
    match std::fs::remove_file(path) {
        Ok(()) => {
            debug!(path = %path.display(), "transient artifact removed");
            Cleanup::Removed
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "could not remove transient artifact");
            Cleanup::Failed(e.to_string())
        }
    }
}

/// Remove `path` if it exists. A missing file is not an error.
pub fn remove_if_exists(path: &Path) -> Result<bool> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(DocsealError::artifact_io(path, e)),
    }
}

/// Write `bytes` to `path` so that readers see either the old file or the
/// complete new one, never a prefix.
///
/// The data goes to a temporary sibling first and is renamed into place.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    let mut staged =
        tempfile::NamedTempFile::new_in(parent).map_err(|e| DocsealError::artifact_io(parent, e))?;
    staged
        .write_all(bytes)
        .and_then(|()| staged.as_file().sync_all())
        .map_err(|e| DocsealError::artifact_io(staged.path(), e))?;
    staged
        .persist(path)
        .map_err(|e| DocsealError::artifact_io(path, e.error))?;

    debug!(path = %path.display(), bytes = bytes.len(), "artifact written");
    Ok(())
}

/// Read an artifact, attaching its path to any error.
pub fn read_artifact(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path).map_err(|e| DocsealError::artifact_io(path, e))
}
