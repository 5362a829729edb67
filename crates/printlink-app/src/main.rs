// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Printlink — local print control surface.
//
// Serves the configuration/status pages and the print API, and keeps the
// vortex worker running in the background.  The process exits on SIGINT,
// SIGTERM, SIGQUIT or a POST to `/shutdown`; the worker is always stopped
// before it does.

mod api;
mod args;
mod pages;
mod services;
mod state;

use std::process::ExitCode;

use clap::Parser;
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use args::Args;
use services::app_services::AppServices;
use services::signals::wait_for_shutdown_signal;
use state::AppState;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let services = AppServices::init(&args);
    info!(data_dir = %services.data_dir.display(), "services ready");
    let state = AppState::new(
        services.store,
        services.backend,
        services.supervisor,
        args.timings(),
    );

    let listener = match TcpListener::bind(args.listen).await {
        Ok(listener) => listener,
        Err(e) => {
            error!(error = %e, listen = %args.listen, "failed to bind HTTP listener");
            state.supervisor.shutdown().await;
            return ExitCode::FAILURE;
        }
    };
    info!(listen = %args.listen, "HTTP surface listening");

    let stopping = state.clone();
    let served = axum::serve(listener, api::router(state.clone()))
        .with_graceful_shutdown(async move {
            stopping.drain_trigger(wait_for_shutdown_signal()).await;
        })
        .await;

    // Already done when a signal or /shutdown ended the server.
    state.supervisor.shutdown().await;

    match served {
        Ok(()) => {
            info!("printlink stopped");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "HTTP server failed");
            ExitCode::FAILURE
        }
    }
}
