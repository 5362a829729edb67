// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Shared state handed to every HTTP handler.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::watch;
use tracing::{info, warn};

use printlink_core::SupervisorTimings;
use printlink_print::{JobDispatcher, PrintBackend};
use printlink_store::ConfigStore;
use printlink_worker::SupervisorHandle;

/// Cheap to clone; every field is shared.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ConfigStore>,
    pub dispatcher: JobDispatcher,
    pub supervisor: Arc<SupervisorHandle>,
    pub timings: SupervisorTimings,
    /// Flips to `true` once the HTTP server should drain and exit.
    shutdown: Arc<watch::Sender<bool>>,
}

impl AppState {
    pub fn new(
        store: Arc<dyn ConfigStore>,
        backend: Arc<dyn PrintBackend>,
        supervisor: SupervisorHandle,
        timings: SupervisorTimings,
    ) -> Self {
        let (shutdown, _) = watch::channel(false);
        Self {
            store,
            dispatcher: JobDispatcher::new(backend, timings.temp_file_ttl),
            supervisor: Arc::new(supervisor),
            timings,
            shutdown: Arc::new(shutdown),
        }
    }

    pub fn backend(&self) -> &Arc<dyn PrintBackend> {
        self.dispatcher.backend()
    }

    /// Tell the HTTP server to stop accepting connections.
    pub fn stop_server(&self) {
        self.shutdown.send_replace(true);
    }

    /// Resolves once `stop_server` has been called.
    pub async fn server_stopped(&self) {
        let mut rx = self.shutdown.subscribe();
        // Only fails if the sender is gone, which means the state is gone too.
        let _ = rx.wait_for(|stopped| *stopped).await;
    }

    /// Resolves when the HTTP server should start draining: on `os_signal`
    /// or `stop_server`.  A signal stops the supervisor before the drain so
    /// in-flight requests cannot keep the worker alive or relaunch it.
    pub async fn drain_trigger<F>(&self, os_signal: F)
    where
        F: Future<Output = std::io::Result<()>>,
    {
        let signal = async {
            match os_signal.await {
                Ok(()) => {
                    info!("termination signal received, stopping worker");
                    self.supervisor.shutdown().await;
                }
                // Without signal handling only /shutdown can stop us.
                Err(e) => {
                    warn!(error = %e, "signal handler unavailable");
                    std::future::pending::<()>().await;
                }
            }
        };
        tokio::select! {
            () = signal => {}
            () = self.server_stopped() => {}
        }
    }
}
