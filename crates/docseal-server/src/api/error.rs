// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// HTTP error responses.
//
// The body is `{"error": code, "message": text}` with the code and message
// taken from the client-facing description of the failure. Details that may
// carry paths or key material only go to the log.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use docseal_core::client_errors::{ErrorClass, describe_error};
use docseal_core::error::DocsealError;
use serde_json::json;
use tracing::{debug, error};

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    code: &'static str,
    message: String,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            code: "InvalidRequest",
            message: message.into(),
        }
    }

    pub fn internal() -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            code: "InternalError",
            message: "An internal error occurred".into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn code(&self) -> &'static str {
        self.code
    }
}

fn status_for(class: ErrorClass) -> StatusCode {
    match class {
        ErrorClass::InvalidRequest => StatusCode::BAD_REQUEST,
        ErrorClass::NotFound => StatusCode::NOT_FOUND,
        ErrorClass::Conflict => StatusCode::CONFLICT,
        ErrorClass::Rendering | ErrorClass::Signing | ErrorClass::Internal => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl From<DocsealError> for ApiError {
    fn from(err: DocsealError) -> Self {
        let client = describe_error(&err);
        let status = status_for(client.class);
        if status.is_server_error() {
            error!(
                code = client.code,
                retriable = client.retriable,
                error = %err,
                "request failed"
            );
        } else {
            debug!(code = client.code, error = %err, "request rejected");
        }
        Self {
            status,
            code: client.code,
            message: client.message,
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        debug!(error = %rejection, "invalid JSON body");
        Self::bad_request("Invalid inputs")
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "error": self.code,
            "message": self.message,
        }));
        (self.status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docseal_core::types::DocumentId;

    #[test]
    fn record_errors_map_to_client_statuses() {
        assert_eq!(
            ApiError::from(DocsealError::NotFound(DocumentId(1))).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::from(DocsealError::Conflict(DocumentId(1))).status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ApiError::from(DocsealError::InvalidInput("id".into())).status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn pipeline_errors_are_server_errors_with_distinct_codes() {
        let font = ApiError::from(DocsealError::FontUnavailable("a.ttf".into()));
        let key = ApiError::from(DocsealError::UnsupportedKeyType("ec".into()));
        assert_eq!(font.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(key.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(font.code(), "FontUnavailable");
        assert_eq!(key.code(), "UnsupportedKeyType");
    }
}
