// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// docseal-server: render+sign pipeline orchestration, the document service
// and the REST API in front of it.

pub mod api;
pub mod config;
pub mod services;
pub mod state;

pub use state::AppState;
