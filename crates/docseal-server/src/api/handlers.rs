// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Request handlers for the `/pdfs` resource.
//
// The document service is synchronous (SQLite, PDF rendering, RSA signing),
// so every call is moved onto Tokio's blocking pool.

use std::sync::Arc;

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use docseal_core::types::{DocumentId, DocumentSummary, StoredDocument};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{error, info};

use super::error::ApiError;
use crate::services::DocumentService;
use crate::services::documents::DocumentPatch;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateRequest {
    pub id: i64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateRequest {
    pub title: Option<String>,
    pub content: Option<String>,
}

/// A full record; the PDF is base64 encoded.
#[derive(Debug, Serialize, Deserialize)]
pub struct PdfResponse {
    pub id: DocumentId,
    pub title: String,
    pub content: String,
    pub pdf: String,
}

impl From<StoredDocument> for PdfResponse {
    fn from(record: StoredDocument) -> Self {
        Self {
            id: record.id,
            title: record.title,
            content: record.content,
            pdf: STANDARD.encode(&record.pdf),
        }
    }
}

pub async fn create_pdf(
    State(state): State<AppState>,
    payload: Result<Json<CreateRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(req) = payload?;
    let id = DocumentId(req.id);
    info!(id = %id, "create request");

    blocking(&state, move |service| service.create(id, req.title, req.content)).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "PDF created and stored" })),
    ))
}

pub async fn list_pdfs(
    State(state): State<AppState>,
) -> Result<Json<Vec<DocumentSummary>>, ApiError> {
    let summaries = blocking(&state, |service| service.list()).await?;
    Ok(Json(summaries))
}

pub async fn get_pdf(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<Json<PdfResponse>, ApiError> {
    let id = parse_id(&raw_id)?;
    let record = blocking(&state, move |service| service.get(id)).await?;
    Ok(Json(record.into()))
}

pub async fn update_pdf(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    payload: Result<Json<UpdateRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_id(&raw_id)?;
    let Json(req) = payload?;
    info!(id = %id, "update request");

    let patch = DocumentPatch {
        title: req.title,
        content: req.content,
    };
    let record = blocking(&state, move |service| service.update(id, patch)).await?;

    Ok(Json(json!({ "pdf": PdfResponse::from(record) })))
}

pub async fn delete_pdf(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_id(&raw_id)?;
    blocking(&state, move |service| service.delete(id)).await?;
    Ok(Json(json!({ "message": "PDF deleted" })))
}

pub async fn health_check() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

fn parse_id(raw: &str) -> Result<DocumentId, ApiError> {
    raw.parse::<i64>()
        .map(DocumentId)
        .map_err(|_| ApiError::bad_request("Invalid ID"))
}

/// Run `f` against the document service on the blocking pool.
async fn blocking<T, F>(state: &AppState, f: F) -> Result<T, ApiError>
where
    F: FnOnce(&DocumentService) -> docseal_core::error::Result<T> + Send + 'static,
    T: Send + 'static,
{
    let service = Arc::clone(&state.documents);
    let outcome = tokio::task::spawn_blocking(move || f(&service))
        .await
        .map_err(|e| {
            error!(error = %e, "document task did not complete");
            ApiError::internal()
        })?;
    outcome.map_err(ApiError::from)
}
