// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// HTTP handlers.

use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::response::Html;
use serde_json::{Map, Value, json};
use tracing::{info, instrument};

use printlink_core::{PrinterInfo, PrintlinkError, WorkerStatus};
use printlink_print::{PrintBackend, PrintRequest};
use printlink_store::ConfigStore;

use super::error::{ApiError, ConfigError};
use crate::pages;
use crate::state::AppState;

// -- Configuration ----------------------------------------------------------

pub async fn config_page(State(state): State<AppState>) -> Html<String> {
    Html(pages::config::render(&state.store.get()))
}

/// Merge the posted settings, then restart the worker with them.
#[instrument(skip_all)]
pub async fn save_config(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<Value>, ConfigError> {
    let updates: Map<String, Value> = match serde_json::from_slice(&body) {
        Ok(Value::Object(map)) => map,
        Ok(_) => return Err(ConfigError::bad_request("Expected a JSON object")),
        Err(e) => return Err(ConfigError::bad_request(format!("Invalid JSON: {e}"))),
    };

    // Storage is synchronous; keep it off the async workers.
    let store = state.store.clone();
    tokio::task::spawn_blocking(move || store.set(&updates))
        .await
        .map_err(|e| PrintlinkError::Database(format!("save task: {e}")))??;

    info!("configuration updated, requesting worker restart");
    state.supervisor.request_restart();
    Ok(Json(json!({ "success": true })))
}

// -- Worker status ----------------------------------------------------------

pub async fn status_page(State(state): State<AppState>) -> Html<String> {
    Html(pages::status::render(&state.supervisor.status()))
}

pub async fn api_status(State(state): State<AppState>) -> Json<WorkerStatus> {
    Json(state.supervisor.status())
}

pub async fn api_docs() -> Html<String> {
    Html(pages::docs::render())
}

/// Answer first, then stop the worker and the server after a short delay.
pub async fn shutdown(State(state): State<AppState>) -> Json<Value> {
    info!("shutdown requested over HTTP");
    let delay = state.timings.shutdown_delay;
    tokio::spawn(async move {
        tokio::time::sleep(delay).await;
        state.supervisor.shutdown().await;
        state.stop_server();
    });
    Json(json!({ "success": true, "message": "Services stopping..." }))
}

// -- Printing ---------------------------------------------------------------

pub async fn list_printers(State(state): State<AppState>) -> Result<Json<Vec<PrinterInfo>>, ApiError> {
    Ok(Json(state.backend().list_printers().await?))
}

pub async fn print(State(state): State<AppState>, body: Bytes) -> Result<Json<Value>, ApiError> {
    let request: PrintRequest = serde_json::from_slice(&body).map_err(|_| ApiError::InvalidJson)?;
    let receipt = state.dispatcher.submit(request).await?;
    Ok(Json(json!({
        "status": "ok",
        "printer": receipt.printer,
        "mode": receipt.mode,
    })))
}
