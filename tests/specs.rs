// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Behavioral scenarios for the awc compiler.
//!
//! Each scenario writes workflow files into a temporary project, compiles
//! them through the public entry point, and checks the lock document.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

#[path = "specs/prelude.rs"]
mod prelude;

#[path = "specs/compile/mod.rs"]
mod compile;
#[path = "specs/jobs/mod.rs"]
mod jobs;
#[path = "specs/mcp/mod.rs"]
mod mcp;
#[path = "specs/network/mod.rs"]
mod network;
#[path = "specs/strict/mod.rs"]
mod strict;
