// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Printlink Worker — supervision of the companion worker executable.
//
// A single background task owns the child process.  The HTTP surface talks
// to it only through `ControlFlags` (restart / shutdown requests) and reads
// its progress from the `StatusRegister`.

pub mod discovery;
pub mod flags;
pub mod launch;
pub mod machine;
pub mod process;
pub mod status;
pub mod supervisor;

pub use discovery::ExecutableLocator;
pub use flags::{ControlFlags, Wake};
pub use machine::{Event, next_state};
pub use status::{StatusRegister, StatusUpdate};
pub use supervisor::{Supervisor, SupervisorHandle};
