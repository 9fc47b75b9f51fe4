// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! awc-compiler: markdown workflows to runner job graphs
//!
//! A [`Compiler`] threads one [`WorkflowSpec`](awc_core::WorkflowSpec)
//! through a fixed sequence of phases, each filling one derived slot, and
//! renders the result as a lock document.

pub mod advisory;
pub mod cache;
mod compiler;
pub mod config;
pub mod engine;
pub mod expr;
pub mod imports;
pub mod jobs;
pub mod lockfile;
pub mod mcp;
pub mod network;
pub mod strict;

pub use advisory::{check_packages, PackageIndex, PackageRegistry, RegistryError};
#[cfg(any(test, feature = "test-support"))]
pub use advisory::{FakePackageRegistry, LookupCall};
pub use cache::{ActionPinCache, RepoFeatureCache, RepoFeatures};
pub use compiler::{lock_path, Compiled, Compiler};
pub use config::{CompilerConfig, ConfigError};
pub use engine::{Engine, EngineCapabilities, EngineRegistry, Invocation, McpDialect};
pub use imports::{Fragment, ImportResolver, ImportedFragments, NoImports, StaticImports};
pub use jobs::{build_job_graph, BuiltGraph};
pub use lockfile::render_lockfile;
pub use mcp::render_mcp_config;
pub use strict::{check_sandbox_conflicts, validate_strict, StrictReport};
