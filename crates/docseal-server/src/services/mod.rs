// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Service layer: bridges the HTTP handlers to the backend crates.
//
// Everything here is synchronous; handlers run it on the blocking pool.

pub mod documents;
pub mod locks;
pub mod pipeline;

pub use documents::DocumentService;
pub use locks::IdentityLocks;
pub use pipeline::DocumentPipeline;
