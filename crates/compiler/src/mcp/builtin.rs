// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Descriptors for the built-in servers.
//!
//! Built-ins are assembled in a fixed order: `github`, `playwright`,
//! `serena`, `safeoutputs`, `safeinputs`.

use super::descriptor::{ContainerServer, HttpServer, McpDescriptor};
use crate::engine::{SAFE_INPUTS_SERVER, SAFE_OUTPUTS_SERVER};
use awc_core::{GitHubMode, GitHubTool, PlaywrightTool, SerenaMode, SerenaTool, WorkflowSpec};
use awc_domains::{DomainPolicy, EcosystemTable};
use std::collections::BTreeMap;

pub const GITHUB_MCP_IMAGE: &str = "ghcr.io/github/github-mcp-server";
pub const GITHUB_MCP_VERSION: &str = "v0.20.1";
pub const GITHUB_REMOTE_URL: &str = "https://api.githubcopilot.com/mcp/";
pub const GITHUB_REMOTE_READONLY_URL: &str = "https://api.githubcopilot.com/mcp-readonly/";
/// Token expression used when the workflow does not set one.
pub const DEFAULT_GITHUB_TOKEN: &str = "${{ secrets.AWC_GITHUB_TOKEN || secrets.GITHUB_TOKEN }}";

pub const PLAYWRIGHT_IMAGE: &str = "mcr.microsoft.com/playwright/mcp";
pub const SERENA_IMAGE: &str = "ghcr.io/oraios/serena:latest";
const NODE_IMAGE: &str = "node:lts-alpine";
const UV_IMAGE: &str = "ghcr.io/astral-sh/uv:python3.12-alpine";

/// Shared scratch directory mounted into helper servers.
pub const AWC_TMP_MOUNT: &str = "/tmp/awc:/tmp/awc:rw";
const WORKSPACE_MOUNT: &str = "${GITHUB_WORKSPACE}:${GITHUB_WORKSPACE}:rw";

/// Built-in servers enabled by the workflow, in emission order.
pub fn builtin_servers(spec: &WorkflowSpec, table: &EcosystemTable) -> Vec<(String, McpDescriptor)> {
    let mut servers = Vec::new();
    if let Some(github) = &spec.tools.github {
        servers.push(("github".to_string(), github_server(github)));
    }
    if let Some(playwright) = &spec.tools.playwright {
        servers.push(("playwright".to_string(), playwright_server(playwright, table)));
    }
    if let Some(serena) = &spec.tools.serena {
        servers.push(("serena".to_string(), serena_server(serena)));
    }
    if spec.has_safe_outputs() {
        servers.push((SAFE_OUTPUTS_SERVER.to_string(), safe_outputs_server(spec)));
    }
    if spec.has_safe_inputs() {
        servers.push((SAFE_INPUTS_SERVER.to_string(), safe_inputs_server(spec)));
    }
    servers
}

fn github_server(github: &GitHubTool) -> McpDescriptor {
    let token = github.github_token.clone().unwrap_or_else(|| DEFAULT_GITHUB_TOKEN.to_string());
    let allowed = match &github.allowed {
        Some(allowed) if !github.allows_everything() => allowed.clone(),
        _ => Vec::new(),
    };

    match github.mode {
        GitHubMode::Remote => {
            let url = if github.read_only { GITHUB_REMOTE_READONLY_URL } else { GITHUB_REMOTE_URL };
            let mut headers = BTreeMap::new();
            headers.insert("Authorization".to_string(), format!("Bearer {token}"));
            if !github.toolsets.is_empty() {
                headers.insert("X-MCP-Toolsets".to_string(), github.toolsets.join(","));
            }
            McpDescriptor::RemoteHttp(HttpServer { url: url.to_string(), headers, allowed })
        }
        GitHubMode::Local => {
            let version = github.version.as_deref().unwrap_or(GITHUB_MCP_VERSION);
            let mut env = BTreeMap::new();
            env.insert("GITHUB_PERSONAL_ACCESS_TOKEN".to_string(), token);
            let toolsets =
                if github.toolsets.is_empty() { "default".to_string() } else { github.toolsets.join(",") };
            env.insert("GITHUB_TOOLSETS".to_string(), toolsets);
            if github.read_only {
                env.insert("GITHUB_READ_ONLY".to_string(), "1".to_string());
            }
            McpDescriptor::ContainerStdio(ContainerServer {
                container: format!("{GITHUB_MCP_IMAGE}:{version}"),
                env,
                allowed,
                ..ContainerServer::default()
            })
        }
    }
}

/// Playwright's host allow-list, with ecosystem ids expanded.
pub fn playwright_domains(playwright: &PlaywrightTool, table: &EcosystemTable) -> Vec<String> {
    if playwright.allowed_domains.is_empty() {
        return vec!["localhost".to_string(), "127.0.0.1".to_string()];
    }
    table.resolve_allowed_domains(&DomainPolicy::allowing(playwright.allowed_domains.iter().cloned()))
}

fn playwright_server(playwright: &PlaywrightTool, table: &EcosystemTable) -> McpDescriptor {
    let image = match &playwright.version {
        Some(version) => format!("{PLAYWRIGHT_IMAGE}:{version}"),
        None => PLAYWRIGHT_IMAGE.to_string(),
    };
    let mut entrypoint_args = vec![
        "--output-dir".to_string(),
        "/tmp/awc/mcp-logs/playwright".to_string(),
        "--allowed-hosts".to_string(),
        playwright_domains(playwright, table).join(","),
    ];
    entrypoint_args.extend(playwright.args.iter().cloned());
    McpDescriptor::ContainerStdio(ContainerServer {
        container: image,
        entrypoint_args,
        mounts: vec![AWC_TMP_MOUNT.to_string()],
        args: vec!["--init".to_string(), "--network".to_string(), "host".to_string()],
        ..ContainerServer::default()
    })
}

fn serena_server(serena: &SerenaTool) -> McpDescriptor {
    let mut serve = vec![
        "start-mcp-server".to_string(),
        "--context".to_string(),
        "codex".to_string(),
        "--project".to_string(),
        "${GITHUB_WORKSPACE}".to_string(),
    ];
    let server = match serena.mode {
        SerenaMode::Docker => ContainerServer {
            container: SERENA_IMAGE.to_string(),
            entrypoint: Some("serena".to_string()),
            entrypoint_args: serve,
            mounts: vec![WORKSPACE_MOUNT.to_string()],
            ..ContainerServer::default()
        },
        SerenaMode::Local => {
            let mut args = vec![
                "--from".to_string(),
                "git+https://github.com/oraios/serena".to_string(),
                "serena".to_string(),
            ];
            args.append(&mut serve);
            ContainerServer {
                container: UV_IMAGE.to_string(),
                entrypoint: Some("uvx".to_string()),
                entrypoint_args: args,
                mounts: vec![WORKSPACE_MOUNT.to_string()],
                ..ContainerServer::default()
            }
        }
    };
    McpDescriptor::ContainerStdio(server)
}

fn node_helper(script: &str, env: BTreeMap<String, String>) -> ContainerServer {
    ContainerServer {
        container: NODE_IMAGE.to_string(),
        entrypoint: Some("node".to_string()),
        entrypoint_args: vec![script.to_string()],
        mounts: vec![AWC_TMP_MOUNT.to_string()],
        env,
        passthrough_env: vec!["GITHUB_REPOSITORY".to_string(), "GITHUB_SERVER_URL".to_string()],
        ..ContainerServer::default()
    }
}

fn safe_outputs_server(spec: &WorkflowSpec) -> McpDescriptor {
    let mut env = BTreeMap::new();
    env.insert("AWC_SAFE_OUTPUTS".to_string(), "/tmp/awc/safeoutputs/outputs.jsonl".to_string());
    env.insert(
        "AWC_SAFE_OUTPUTS_CONFIG_PATH".to_string(),
        "/tmp/awc/safeoutputs/config.json".to_string(),
    );
    if spec.safe_outputs.as_ref().is_some_and(|s| s.staged) {
        env.insert("AWC_SAFE_OUTPUTS_STAGED".to_string(), "true".to_string());
    }
    McpDescriptor::ContainerStdio(node_helper("/tmp/awc/safeoutputs/mcp-server.cjs", env))
}

fn safe_inputs_server(spec: &WorkflowSpec) -> McpDescriptor {
    let mut env = BTreeMap::new();
    env.insert("AWC_SAFE_INPUTS_CONFIG_PATH".to_string(), "/tmp/awc/safeinputs/tools.json".to_string());
    for tool in spec.safe_inputs.values() {
        for (k, v) in &tool.env {
            env.insert(k.clone(), v.clone());
        }
    }
    let mut server = node_helper("/tmp/awc/safeinputs/mcp-server.cjs", env);
    server.allowed = spec.safe_inputs.keys().cloned().collect();
    McpDescriptor::ContainerStdio(server)
}

#[cfg(test)]
#[path = "builtin_tests.rs"]
mod tests;
