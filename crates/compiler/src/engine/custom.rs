// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::{shell_quote, Engine, EngineCapabilities, Invocation, McpDialect, PROMPT_PATH};
use awc_core::{EngineConfig, EngineId, McpFormat, ToolPermissions};

const CAPABILITIES: EngineCapabilities = EngineCapabilities {
    tool_allowlist: false,
    max_turns: false,
    web_fetch: false,
    web_search: false,
    firewall: false,
    llm_gateway_port: None,
    plugins: false,
    allow_all_tools: false,
};

/// User-supplied agent. Runs `engine.command` if given; otherwise the
/// workflow's own `steps` do the work.
#[derive(Debug, Clone, Copy, Default)]
pub struct CustomEngine;

impl Engine for CustomEngine {
    fn id(&self) -> EngineId {
        EngineId::Custom
    }

    fn display_name(&self) -> &'static str {
        "Custom Steps"
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
        "/tmp/awc/mcp-config/mcp-servers.json"
    }

    fn invocation(&self, config: &EngineConfig, _permissions: &ToolPermissions) -> Option<Invocation> {
        let program = config.command.as_deref()?;
        let mut parts = vec![program.to_string()];
        parts.extend(config.args.iter().map(|a| shell_quote(a)));

        let mut env = config.env.clone();
        env.insert("AWC_PROMPT".to_string(), PROMPT_PATH.to_string());
        env.insert("AWC_MCP_CONFIG".to_string(), self.mcp_config_path().to_string());
        Some(Invocation { command: parts.join(" "), env })
    }

    fn installation_steps(&self, _config: &EngineConfig) -> Vec<awc_core::Step> {
        Vec::new()
    }
}
