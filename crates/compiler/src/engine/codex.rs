// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::{shell_quote, Engine, EngineCapabilities, Invocation, McpDialect, PROMPT_PATH};
use awc_core::{EngineConfig, EngineId, McpFormat, ToolPermissions};
use indexmap::IndexMap;

const CAPABILITIES: EngineCapabilities = EngineCapabilities {
    tool_allowlist: false,
    max_turns: false,
    web_fetch: false,
    web_search: true,
    firewall: false,
    llm_gateway_port: Some(10001),
    plugins: false,
    allow_all_tools: false,
};

const CODEX_HOME: &str = "/tmp/awc/mcp-config";

#[derive(Debug, Clone, Copy, Default)]
pub struct CodexEngine;

impl Engine for CodexEngine {
    fn id(&self) -> EngineId {
        EngineId::Codex
    }

    fn display_name(&self) -> &'static str {
        "Codex"
    }

    fn capabilities(&self) -> &EngineCapabilities {
        &CAPABILITIES
    }

    fn dialect(&self) -> McpDialect {
        McpDialect {
            format: McpFormat::Toml,
            type_field: false,
            tools_field: false,
            inline_lists: true,
        }
    }

    fn mcp_config_path(&self) -> &'static str {
        "/tmp/awc/mcp-config/config.toml"
    }

    fn default_domains(&self) -> &'static [&'static str] {
        &["api.openai.com", "chatgpt.com", "openai.com"]
    }

    fn secrets(&self) -> &'static [&'static str] {
        &["OPENAI_API_KEY", "CODEX_API_KEY"]
    }

    fn invocation(&self, config: &EngineConfig, _permissions: &ToolPermissions) -> Option<Invocation> {
        let program = config.command.as_deref().unwrap_or("codex");
        let mut parts = vec![program.to_string(), "exec".to_string(), "--full-auto".to_string()];
        if let Some(model) = &config.model {
            parts.push("-c".to_string());
            parts.push(shell_quote(&format!("model={model}")));
        }
        parts.extend(config.args.iter().map(|a| shell_quote(a)));
        parts.push(format!("\"$(cat {PROMPT_PATH})\""));

        let mut env = IndexMap::new();
        env.insert("CODEX_HOME".to_string(), CODEX_HOME.to_string());
        env.insert(
            "OPENAI_API_KEY".to_string(),
            "${{ secrets.CODEX_API_KEY || secrets.OPENAI_API_KEY }}".to_string(),
        );
        for (k, v) in &config.env {
            env.insert(k.clone(), v.clone());
        }
        Some(Invocation { command: parts.join(" "), env })
    }
}
