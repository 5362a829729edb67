// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Handler errors and their HTTP mapping.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

use printlink_core::PrintlinkError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Invalid JSON")]
    InvalidJson,

    #[error(transparent)]
    Printlink(#[from] PrintlinkError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidJson => StatusCode::BAD_REQUEST,
            Self::Printlink(e) => match e {
                PrintlinkError::PrinterNotFound(_) => StatusCode::NOT_FOUND,
                PrintlinkError::InvalidPayload(_) | PrintlinkError::Image(_) => {
                    StatusCode::BAD_REQUEST
                }
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.to_string();
        if status.is_server_error() {
            error!(%status, error = %message, "request failed");
        } else {
            warn!(%status, error = %message, "request rejected");
        }
        (status, Json(json!({ "error": message }))).into_response()
    }
}

/// Error body for the configuration endpoint, which clients read as
/// `{"success": false, "error": ...}`.
#[derive(Debug)]
pub struct ConfigError {
    status: StatusCode,
    message: String,
}

impl ConfigError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }
}

impl From<PrintlinkError> for ConfigError {
    fn from(e: PrintlinkError) -> Self {
        match e {
            PrintlinkError::InvalidPayload(message) => Self::bad_request(message),
            other => {
                error!(error = %other, "failed to persist configuration");
                Self {
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    message: "Failed to save configuration".into(),
                }
            }
        }
    }
}

impl IntoResponse for ConfigError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(json!({ "success": false, "error": self.message })),
        )
            .into_response()
    }
}
