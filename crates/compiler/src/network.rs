// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-engine network policy: effective domains and the egress wrapper.

use crate::engine::{shell_quote, Engine};
use crate::mcp::playwright_domains;
use awc_core::{AgentSandbox, GitHubMode, Step, WorkflowSpec};
use awc_domains::{DomainPolicy, EcosystemTable};
use serde_yaml::Value;
use std::collections::BTreeSet;

/// Firewall release installed when the workflow does not pin one.
pub const DEFAULT_FIREWALL_VERSION: &str = "v0.7.0";
pub const SRT_SETTINGS_PATH: &str = "/tmp/awc/sandbox/srt-settings.json";

/// Host of the remote github server endpoint.
const GITHUB_REMOTE_HOST: &str = "api.githubcopilot.com";

/// The declared allow/block lists, or the defaults when `network:` is absent.
pub fn domain_policy(spec: &WorkflowSpec) -> DomainPolicy {
    spec.network.as_ref().map(|n| n.domains.clone()).unwrap_or_default()
}

/// Domains the agent may reach: the resolved allow-list plus the engine's
/// own API domains, HTTP server hosts, and add-on tool domains, minus
/// everything blocked.
pub fn engine_allowed_domains(
    engine: &dyn Engine,
    spec: &WorkflowSpec,
    table: &EcosystemTable,
) -> Vec<String> {
    let mut extra: BTreeSet<String> =
        engine.default_domains().iter().map(|d| d.to_string()).collect();
    extra.extend(http_server_hosts(spec));
    if let Some(playwright) = &spec.tools.playwright {
        extra.extend(playwright_domains(playwright, table));
    }
    table.effective_allowed_domains(&domain_policy(spec), extra)
}

pub fn blocked_domains(spec: &WorkflowSpec, table: &EcosystemTable) -> Vec<String> {
    table.resolve_blocked_domains(&domain_policy(spec))
}

/// Hosts of every HTTP MCP server the agent talks to.
pub fn http_server_hosts(spec: &WorkflowSpec) -> BTreeSet<String> {
    let mut hosts = BTreeSet::new();
    if spec.tools.github.as_ref().is_some_and(|g| g.mode == GitHubMode::Remote) {
        hosts.insert(GITHUB_REMOTE_HOST.to_string());
    }
    for (name, decl) in &spec.mcp_servers {
        let Some(raw) = decl.get("url").and_then(Value::as_str) else { continue };
        match url::Url::parse(raw) {
            Ok(parsed) => {
                if let Some(host) = parsed.host_str() {
                    hosts.insert(host.to_string());
                }
            }
            Err(e) => tracing::debug!(server = %name, url = %raw, error = %e, "skipping unparsable server url"),
        }
    }
    hosts
}

/// Whether the agent runs behind the egress firewall.
///
/// Only firewall-capable engines get one. An explicit `firewall: false`,
/// a runtime sandbox, or a disabled sandbox turn it off; otherwise it is
/// on whenever it is requested or the network is restricted.
pub fn firewall_enabled(engine: &dyn Engine, spec: &WorkflowSpec) -> bool {
    if !engine.capabilities().firewall {
        return false;
    }
    match spec.sandbox.agent {
        Some(AgentSandbox::Srt | AgentSandbox::Disabled) => return false,
        Some(AgentSandbox::Awf) => return !spec.network.as_ref().is_some_and(|n| n.firewall_disabled()),
        None => {}
    }
    match &spec.network {
        Some(network) if network.firewall_disabled() => false,
        Some(network) => network.firewall_requested() || network.is_restricted(),
        None => false,
    }
}

/// Steps that install the egress wrapper, if any.
pub fn wrapper_install_steps(spec: &WorkflowSpec, firewall: bool) -> Vec<Step> {
    if firewall {
        let version = spec
            .network
            .as_ref()
            .and_then(|n| n.firewall.as_ref())
            .and_then(|f| f.version.as_deref())
            .unwrap_or(DEFAULT_FIREWALL_VERSION);
        return vec![Step::run("Install awf", format!("echo \"installing awf {version}\""))];
    }
    if spec.sandbox.uses_runtime_sandbox() {
        return vec![Step::run("Install srt", "echo \"installing srt\"")];
    }
    Vec::new()
}

/// Runtime sandbox settings: the resolved allow and deny lists.
pub fn srt_settings(allowed: &[String], blocked: &[String]) -> String {
    let settings = serde_json::json!({
        "network": { "allowedDomains": allowed, "deniedDomains": blocked },
    });
    serde_json::to_string_pretty(&settings).unwrap_or_default()
}

/// Wrap the agent command in the firewall or the runtime sandbox.
pub fn wrap_command(spec: &WorkflowSpec, firewall: bool, allowed: &[String], command: &str) -> String {
    if firewall {
        let mut parts = vec![
            "sudo -E awf".to_string(),
            "--env-all".to_string(),
            "--container-workdir \"${GITHUB_WORKSPACE}\"".to_string(),
            format!("--allow-domains {}", shell_quote(&allowed.join(","))),
        ];
        if let Some(fw) = spec.network.as_ref().and_then(|n| n.firewall.as_ref()) {
            if let Some(level) = &fw.log_level {
                parts.push(format!("--log-level {}", shell_quote(level)));
            }
            parts.extend(fw.args.iter().map(|a| shell_quote(a)));
        }
        parts.push("--".to_string());
        parts.push(command.to_string());
        return parts.join(" ");
    }
    if spec.sandbox.uses_runtime_sandbox() {
        return format!("srt --settings {SRT_SETTINGS_PATH} -- {command}");
    }
    command.to_string()
}

#[cfg(test)]
#[path = "network_tests.rs"]
mod tests;
