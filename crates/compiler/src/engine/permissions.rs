// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Tool-permission computation.
//!
//! Tool declarations become engine-neutral [`PermissionEntry`] values,
//! which each engine renders in its own flag dialect.

use super::Engine;
use awc_core::{BashTool, ToolPermissions, WorkflowSpec};
use serde_yaml::Value;
use std::collections::BTreeSet;

/// Server id of the safe-outputs MCP server.
pub const SAFE_OUTPUTS_SERVER: &str = "safeoutputs";
/// Server id of the safe-inputs MCP server.
pub const SAFE_INPUTS_SERVER: &str = "safeinputs";

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum PermissionEntry {
    /// Unrestricted shell on an engine without an allow-all flag.
    AnyShell,
    Shell(String),
    Write,
    WebFetch,
    WebSearch,
    /// Every tool of one MCP server.
    Server(String),
    ServerTool { server: String, tool: String },
}

/// Engine-neutral entries for a workflow.
///
/// Returns `None` when an unrestricted shell short-circuits to the
/// engine's allow-all mode.
pub fn permission_entries(
    spec: &WorkflowSpec,
    allow_all_tools: bool,
) -> Option<BTreeSet<PermissionEntry>> {
    let mut entries = BTreeSet::new();
    let tools = &spec.tools;

    match &tools.bash {
        Some(BashTool::AllowAll) if allow_all_tools => return None,
        Some(BashTool::AllowAll) => {
            entries.insert(PermissionEntry::AnyShell);
        }
        Some(BashTool::Commands(commands)) => {
            entries.extend(commands.iter().map(|c| PermissionEntry::Shell(c.clone())));
        }
        None => {}
    }

    if tools.edit {
        entries.insert(PermissionEntry::Write);
    }
    if tools.web_fetch {
        entries.insert(PermissionEntry::WebFetch);
    }
    if tools.web_search {
        entries.insert(PermissionEntry::WebSearch);
    }

    if spec.has_safe_outputs() {
        entries.insert(PermissionEntry::Server(SAFE_OUTPUTS_SERVER.to_string()));
    }
    if spec.has_safe_inputs() {
        entries.insert(PermissionEntry::Server(SAFE_INPUTS_SERVER.to_string()));
    }

    if let Some(github) = &tools.github {
        match &github.allowed {
            Some(allowed) if !github.allows_everything() => {
                entries.extend(allowed.iter().map(|tool| PermissionEntry::ServerTool {
                    server: "github".to_string(),
                    tool: tool.clone(),
                }));
            }
            _ => {
                entries.insert(PermissionEntry::Server("github".to_string()));
            }
        }
    }
    if tools.playwright.is_some() {
        entries.insert(PermissionEntry::Server("playwright".to_string()));
    }
    if tools.serena.is_some() {
        entries.insert(PermissionEntry::Server("serena".to_string()));
    }

    for (name, decl) in &spec.mcp_servers {
        entries.insert(PermissionEntry::Server(name.clone()));
        let allowed = declared_allow_list(decl);
        if !allowed.iter().any(|t| t == "*") {
            entries.extend(allowed.into_iter().map(|tool| PermissionEntry::ServerTool {
                server: name.clone(),
                tool,
            }));
        }
    }

    Some(entries)
}

/// `allowed:` list from a raw server declaration, if any.
fn declared_allow_list(decl: &Value) -> Vec<String> {
    decl.get("allowed")
        .and_then(Value::as_sequence)
        .map(|seq| seq.iter().filter_map(Value::as_str).map(str::to_string).collect())
        .unwrap_or_default()
}

/// Permission flags for the agent step, sorted and deduplicated.
///
/// Engines without tool allow-listing get an empty list.
pub fn compute_tool_permissions(engine: &dyn Engine, spec: &WorkflowSpec) -> ToolPermissions {
    let caps = engine.capabilities();
    if !caps.tool_allowlist {
        return ToolPermissions::Allowed(Vec::new());
    }
    let Some(entries) = permission_entries(spec, caps.allow_all_tools) else {
        return ToolPermissions::AllowAll;
    };
    let flags: BTreeSet<String> = entries.iter().filter_map(|e| engine.permission_flag(e)).collect();
    ToolPermissions::Allowed(flags.into_iter().collect())
}
