// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Docseal: Core types, error definitions and artifact lifecycle shared across
// all crates.

pub mod artifacts;
pub mod client_errors;
pub mod config;
pub mod error;
pub mod types;

pub use artifacts::{ArtifactPaths, Cleanup, WorkDir};
pub use config::AppConfig;
pub use error::{DocsealError, PipelineError};
pub use types::*;
