// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// REST API.

pub mod error;
pub mod handlers;

use axum::Router;
use axum::routing::get;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

pub use error::ApiError;

/// All routes, with request tracing.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/pdfs", get(handlers::list_pdfs).post(handlers::create_pdf))
        .route(
            "/pdfs/:id",
            get(handlers::get_pdf)
                .patch(handlers::update_pdf)
                .delete(handlers::delete_pdf),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
