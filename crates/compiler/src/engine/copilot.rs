// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::{
    shell_quote, Engine, EngineCapabilities, Invocation, McpDialect, PermissionEntry, PROMPT_PATH,
};
use awc_core::{EngineConfig, EngineId, McpFormat, ToolPermissions};
use indexmap::IndexMap;

const CAPABILITIES: EngineCapabilities = EngineCapabilities {
    tool_allowlist: true,
    max_turns: false,
    web_fetch: false,
    web_search: false,
    firewall: true,
    llm_gateway_port: None,
    plugins: true,
    allow_all_tools: true,
};

#[derive(Debug, Clone, Copy, Default)]
pub struct CopilotEngine;

impl Engine for CopilotEngine {
    fn id(&self) -> EngineId {
        EngineId::Copilot
    }

    fn display_name(&self) -> &'static str {
        "GitHub Copilot CLI"
    }

    fn capabilities(&self) -> &EngineCapabilities {
        &CAPABILITIES
    }

    fn dialect(&self) -> McpDialect {
        McpDialect {
            format: McpFormat::Json,
            type_field: true,
            tools_field: true,
            inline_lists: true,
        }
    }

    fn mcp_config_path(&self) -> &'static str {
        "/home/runner/.copilot/mcp-config.json"
    }

    fn default_domains(&self) -> &'static [&'static str] {
        &[
            "api.business.githubcopilot.com",
            "api.enterprise.githubcopilot.com",
            "api.githubcopilot.com",
            "api.individual.githubcopilot.com",
            "copilot-proxy.githubusercontent.com",
        ]
    }

    fn secrets(&self) -> &'static [&'static str] {
        &["COPILOT_GITHUB_TOKEN"]
    }

    fn permission_flag(&self, entry: &PermissionEntry) -> Option<String> {
        match entry {
            PermissionEntry::AnyShell => Some("shell".to_string()),
            PermissionEntry::Shell(cmd) => Some(format!("shell({cmd})")),
            PermissionEntry::Write => Some("write".to_string()),
            PermissionEntry::Server(server) => Some(server.clone()),
            PermissionEntry::ServerTool { server, tool } => Some(format!("{server}({tool})")),
            PermissionEntry::WebFetch | PermissionEntry::WebSearch => None,
        }
    }

    fn invocation(&self, config: &EngineConfig, permissions: &ToolPermissions) -> Option<Invocation> {
        let program = config.command.as_deref().unwrap_or("copilot");
        let mut parts = vec![
            program.to_string(),
            "--add-dir".to_string(),
            "/tmp/awc/".to_string(),
            "--log-level".to_string(),
            "all".to_string(),
            "--disable-builtin-mcps".to_string(),
        ];
        if let Some(model) = &config.model {
            parts.push("--model".to_string());
            parts.push(shell_quote(model));
        }
        match permissions {
            ToolPermissions::AllowAll => parts.push("--allow-all-tools".to_string()),
            ToolPermissions::Allowed(entries) => {
                for entry in entries {
                    parts.push("--allow-tool".to_string());
                    parts.push(shell_quote(entry));
                }
            }
        }
        parts.extend(config.args.iter().map(|a| shell_quote(a)));
        parts.push("--prompt".to_string());
        parts.push(format!("\"$(cat {PROMPT_PATH})\""));

        let mut env = IndexMap::new();
        env.insert(
            "COPILOT_GITHUB_TOKEN".to_string(),
            "${{ secrets.COPILOT_GITHUB_TOKEN }}".to_string(),
        );
        env.insert("XDG_CONFIG_HOME".to_string(), "/home/runner".to_string());
        for (k, v) in &config.env {
            env.insert(k.clone(), v.clone());
        }
        Some(Invocation { command: parts.join(" "), env })
    }
}
