// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Printlink — worker configuration, printer and status types, and the error
// enum every other crate returns.

pub mod config;
pub mod error;
pub mod timing;
pub mod types;

pub use config::WorkerConfig;
pub use error::PrintlinkError;
pub use timing::SupervisorTimings;
pub use types::*;
