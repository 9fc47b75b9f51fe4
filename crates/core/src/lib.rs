// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! awc-core: the typed workflow IR shared by every compilation phase

pub mod macros;

pub mod diagnostics;
pub mod engine;
pub mod frontmatter;
pub mod job;
pub mod network;
pub mod permissions;
pub mod safe_outputs;
pub mod slot;
pub mod tools;
pub mod trigger;
pub mod workflow;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use diagnostics::{CompileError, ErrorCollector, ErrorMode, Warning};
pub use engine::{EngineConfig, EngineId, ToolPermissions};
pub use frontmatter::{split_frontmatter, Frontmatter, FrontmatterError};
pub use job::{is_valid_job_name, CustomJob, Job, JobGraph, JobPhase, Step};
pub use network::{AgentSandbox, FirewallConfig, NetworkPolicy, SandboxConfig};
pub use permissions::{PermissionLevel, Permissions, SENSITIVE_SCOPES};
pub use safe_outputs::{SafeInputTool, SafeOutputConfig, SafeOutputKind, SafeOutputsConfig};
pub use slot::Slot;
pub use tools::{
    BashTool, CacheMemoryTool, CacheScope, GitHubMode, GitHubTool, PlaywrightTool, SerenaMode,
    SerenaTool, ToolsConfig,
};
pub use trigger::{CommandTrigger, TriggerConfig};
pub use workflow::{Deprecation, McpFormat, RenderedMcpConfig, WorkflowSpec};
