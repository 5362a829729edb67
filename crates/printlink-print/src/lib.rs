// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Printlink Print — printer enumeration and job transmission.  The HTTP
// surface only sees the `PrintBackend` trait and the `JobDispatcher`; the
// CUPS backend is the production implementation.

pub mod backend;
pub mod cups;
pub mod jobs;
pub mod memory;
pub mod printer_id;
pub mod raw_client;
pub mod temp_files;

pub use backend::PrintBackend;
pub use cups::CupsBackend;
pub use jobs::{JobDispatcher, PrintReceipt, PrintRequest};
pub use memory::MemoryBackend;
pub use printer_id::printer_id;
