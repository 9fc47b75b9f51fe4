// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Engine adapters.
//!
//! Each backend declares a static capability record and its configuration
//! dialect. The registry is built once and shared read-only.

mod claude;
mod codex;
mod copilot;
mod custom;
mod permissions;

pub use claude::ClaudeEngine;
pub use codex::CodexEngine;
pub use copilot::CopilotEngine;
pub use custom::CustomEngine;
pub use permissions::{
    compute_tool_permissions, permission_entries, PermissionEntry, SAFE_INPUTS_SERVER,
    SAFE_OUTPUTS_SERVER,
};

use awc_core::{CompileError, EngineConfig, EngineId, McpFormat, Step, ToolPermissions};
use indexmap::IndexMap;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Where the agent prompt is written by the activation job.
pub const PROMPT_PATH: &str = "/tmp/awc/prompts/prompt.txt";

/// Static feature flags for one engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineCapabilities {
    /// Accepts a per-tool allow-list.
    pub tool_allowlist: bool,
    /// Honors a max-turns limit.
    pub max_turns: bool,
    pub web_fetch: bool,
    pub web_search: bool,
    /// Can run behind the egress firewall.
    pub firewall: bool,
    /// Port of the LLM traffic gateway, when supported.
    pub llm_gateway_port: Option<u16>,
    pub plugins: bool,
    /// Has a single "allow every tool" flag.
    pub allow_all_tools: bool,
}

/// How MCP configuration is serialized for an engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct McpDialect {
    pub format: McpFormat,
    /// Emit a transport `type` field.
    pub type_field: bool,
    /// Emit a `tools` allow-list field.
    pub tools_field: bool,
    /// Lists render as `[a, b]` rather than one item per line.
    pub inline_lists: bool,
}

/// The agent CLI command line and its environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub command: String,
    pub env: IndexMap<String, String>,
}

pub trait Engine: Send + Sync + std::fmt::Debug {
    fn id(&self) -> EngineId;

    fn display_name(&self) -> &'static str;

    fn capabilities(&self) -> &EngineCapabilities;

    fn dialect(&self) -> McpDialect;

    /// Path the MCP config document is written to.
    fn mcp_config_path(&self) -> &'static str;

    /// Domains the engine's own API traffic needs.
    fn default_domains(&self) -> &'static [&'static str] {
        &[]
    }

    /// Secrets the engine reads, as env var names.
    fn secrets(&self) -> &'static [&'static str] {
        &[]
    }

    /// Render one permission entry in this engine's dialect.
    fn permission_flag(&self, _entry: &PermissionEntry) -> Option<String> {
        None
    }

    /// Command that runs the agent. `None` when the workflow's own steps do.
    fn invocation(&self, config: &EngineConfig, permissions: &ToolPermissions) -> Option<Invocation>;

    /// Placeholder for runtime installation; real install steps live outside the compiler.
    fn installation_steps(&self, config: &EngineConfig) -> Vec<Step> {
        let version = config.version.as_deref().unwrap_or("latest");
        vec![Step::run(
            format!("Install {}", self.display_name()),
            format!("echo \"installing {} {version}\"", self.id()),
        )]
    }
}

/// Immutable lookup of engines by id.
#[derive(Debug, Clone)]
pub struct EngineRegistry {
    engines: BTreeMap<EngineId, Arc<dyn Engine>>,
}

impl EngineRegistry {
    /// Registry with the four built-in engines.
    pub fn builtin() -> Self {
        let engines: [Arc<dyn Engine>; 4] = [
            Arc::new(ClaudeEngine),
            Arc::new(CodexEngine),
            Arc::new(CopilotEngine),
            Arc::new(CustomEngine),
        ];
        Self { engines: engines.into_iter().map(|e| (e.id(), e)).collect() }
    }

    pub fn get(&self, id: EngineId) -> Result<Arc<dyn Engine>, CompileError> {
        self.engines.get(&id).cloned().ok_or_else(|| CompileError::UnknownEngine {
            id: id.to_string(),
            available: self.ids().map(EngineId::as_str).collect::<Vec<_>>().join(", "),
        })
    }

    pub fn ids(&self) -> impl Iterator<Item = EngineId> + '_ {
        self.engines.keys().copied()
    }
}

impl Default for EngineRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Quote a string for a POSIX shell single-quoted context.
pub(crate) fn shell_quote(s: &str) -> String {
    format!("'{}'", s.replace('\'', "'\\''"))
}

#[cfg(test)]
#[path = "../engine_tests.rs"]
mod tests;
