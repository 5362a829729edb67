// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// HTTP routes.

pub mod error;
pub mod handlers;

use axum::Router;
use axum::http::{Method, header};
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};

use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::config_page))
        .route(
            "/config",
            get(handlers::config_page).post(handlers::save_config),
        )
        .route("/status", get(handlers::status_page))
        .route("/api/status", get(handlers::api_status))
        .route("/api/docs", get(handlers::api_docs))
        .route("/shutdown", post(handlers::shutdown))
        .route("/printers", get(handlers::list_printers))
        .route("/print", post(handlers::print))
        .layer(cors())
        .with_state(state)
}

/// Browser pages on other origins (POS front-ends) call the API directly.
fn cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_headers([header::CONTENT_TYPE])
        .allow_methods([Method::POST, Method::GET, Method::OPTIONS])
}
