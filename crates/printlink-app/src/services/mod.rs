// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Service layer — builds the backend subsystems the HTTP surface and the
// supervisor share.

pub mod app_services;
pub mod data_dir;
pub mod signals;
