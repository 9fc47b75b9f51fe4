// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::{
    shell_quote, Engine, EngineCapabilities, Invocation, McpDialect, PermissionEntry, PROMPT_PATH,
};
use awc_core::{EngineConfig, EngineId, McpFormat, ToolPermissions};
use indexmap::IndexMap;

const CAPABILITIES: EngineCapabilities = EngineCapabilities {
    tool_allowlist: true,
    max_turns: true,
    web_fetch: true,
    web_search: true,
    firewall: true,
    llm_gateway_port: Some(10000),
    plugins: true,
    allow_all_tools: false,
};

const MCP_CONFIG_PATH: &str = "/tmp/awc/mcp-config/mcp-servers.json";

#[derive(Debug, Clone, Copy, Default)]
pub struct ClaudeEngine;

impl Engine for ClaudeEngine {
    fn id(&self) -> EngineId {
        EngineId::Claude
    }

    fn display_name(&self) -> &'static str {
        "Claude Code"
    }

    fn capabilities(&self) -> &EngineCapabilities {
        &CAPABILITIES
    }

    fn dialect(&self) -> McpDialect {
        McpDialect {
            format: McpFormat::Json,
            type_field: false,
            tools_field: false,
            inline_lists: false,
        }
    }

    fn mcp_config_path(&self) -> &'static str {
        MCP_CONFIG_PATH
    }

    fn default_domains(&self) -> &'static [&'static str] {
        &["anthropic.com", "api.anthropic.com", "claude.ai", "sentry.io", "statsig.anthropic.com"]
    }

    fn secrets(&self) -> &'static [&'static str] {
        &["ANTHROPIC_API_KEY", "CLAUDE_CODE_OAUTH_TOKEN"]
    }

    fn permission_flag(&self, entry: &PermissionEntry) -> Option<String> {
        Some(match entry {
            PermissionEntry::AnyShell => "Bash".to_string(),
            PermissionEntry::Shell(cmd) => format!("Bash({cmd})"),
            PermissionEntry::Write => "Edit".to_string(),
            PermissionEntry::WebFetch => "WebFetch".to_string(),
            PermissionEntry::WebSearch => "WebSearch".to_string(),
            PermissionEntry::Server(server) => format!("mcp__{server}"),
            PermissionEntry::ServerTool { server, tool } => format!("mcp__{server}__{tool}"),
        })
    }

    fn invocation(&self, config: &EngineConfig, permissions: &ToolPermissions) -> Option<Invocation> {
        let program = config.command.as_deref().unwrap_or("claude");
        let mut parts = vec![
            program.to_string(),
            "--print".to_string(),
            "--mcp-config".to_string(),
            MCP_CONFIG_PATH.to_string(),
        ];
        if !permissions.entries().is_empty() {
            parts.push("--allowed-tools".to_string());
            parts.push(shell_quote(&permissions.entries().join(",")));
        }
        if let Some(turns) = config.max_turns {
            parts.push("--max-turns".to_string());
            parts.push(turns.to_string());
        }
        if let Some(model) = &config.model {
            parts.push("--model".to_string());
            parts.push(shell_quote(model));
        }
        parts.extend(config.args.iter().map(|a| shell_quote(a)));
        parts.push(format!("\"$(cat {PROMPT_PATH})\""));

        let mut env = IndexMap::new();
        env.insert("ANTHROPIC_API_KEY".to_string(), "${{ secrets.ANTHROPIC_API_KEY }}".to_string());
        env.insert("DISABLE_TELEMETRY".to_string(), "1".to_string());
        env.insert("MCP_TIMEOUT".to_string(), "120000".to_string());
        for (k, v) in &config.env {
            env.insert(k.clone(), v.clone());
        }
        Some(Invocation { command: parts.join(" "), env })
    }
}
