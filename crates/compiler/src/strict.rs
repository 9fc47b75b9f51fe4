// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Security policy checks.
//!
//! [`validate_strict`] runs only for strict workflows and refuses unsafe
//! configurations. [`check_sandbox_conflicts`] runs for every workflow.

use crate::engine::Engine;
use crate::mcp::McpDescriptor;
use awc_core::{
    AgentSandbox, CacheScope, CompileError, ErrorCollector, ErrorMode, Permissions, SerenaMode,
    Warning, WorkflowSpec, SENSITIVE_SCOPES,
};
use awc_domains::{is_valid_domain_pattern, EcosystemTable, DEFAULTS_ECOSYSTEM};

/// Outcome of a strict pass that found no errors.
#[derive(Debug, Default)]
pub struct StrictReport {
    pub warnings: Vec<Warning>,
}

/// Validate a workflow against strict-mode policy.
///
/// In collect-all mode every violation is reported together.
pub fn validate_strict(
    spec: &WorkflowSpec,
    engine: &dyn Engine,
    table: &EcosystemTable,
    mode: ErrorMode,
) -> Result<StrictReport, CompileError> {
    let mut errors = ErrorCollector::new(mode);
    let mut report = StrictReport::default();

    check_permissions(spec.permissions.as_ref(), &mut errors)?;
    check_network(spec, engine, table, &mut errors, &mut report.warnings)?;
    check_mcp_servers(spec, &mut errors)?;
    check_tools(spec, &mut errors)?;
    for deprecation in &spec.deprecated {
        errors.push(CompileError::strict(
            &deprecation.field,
            format!("deprecated field; use '{}' instead", deprecation.replacement),
        ))?;
    }
    check_sandbox(spec, engine, &mut errors)?;

    tracing::debug!(
        workflow = %spec.id,
        errors = errors.len(),
        warnings = report.warnings.len(),
        "strict mode checked"
    );
    errors.finish()?;
    Ok(report)
}

/// `firewall` and `sandbox.agent: srt` are mutually exclusive.
pub fn check_sandbox_conflicts(spec: &WorkflowSpec) -> Result<(), CompileError> {
    let firewall = spec.network.as_ref().is_some_and(|n| n.firewall_requested());
    if firewall && spec.sandbox.uses_runtime_sandbox() {
        return Err(CompileError::invalid(
            "sandbox.agent",
            "'srt' cannot be combined with network.firewall; choose one of them",
        ));
    }
    Ok(())
}

fn check_permissions(
    permissions: Option<&Permissions>,
    errors: &mut ErrorCollector,
) -> Result<(), CompileError> {
    let Some(permissions) = permissions else { return Ok(()) };
    if matches!(permissions, Permissions::WriteAll) {
        return errors.push(CompileError::strict(
            "permissions",
            format!(
                "write-all grants write on {}; declare read scopes and use safe-outputs for changes",
                SENSITIVE_SCOPES.join(", ")
            ),
        ));
    }
    for scope in permissions.scopes_with_write(&SENSITIVE_SCOPES) {
        errors.push(CompileError::strict(
            format!("permissions.{scope}"),
            "write not allowed; use safe-outputs to make changes",
        ))?;
    }
    Ok(())
}

fn check_network(
    spec: &WorkflowSpec,
    engine: &dyn Engine,
    table: &EcosystemTable,
    errors: &mut ErrorCollector,
    warnings: &mut Vec<Warning>,
) -> Result<(), CompileError> {
    let Some(network) = &spec.network else { return Ok(()) };

    for entry in network.domains.allowed.iter().flatten() {
        let location = "network.allowed";
        if entry == "*" {
            errors.push(CompileError::strict(
                location,
                "'*' allows every domain; list ecosystems or domains instead",
            ))?;
        } else if entry == DEFAULTS_ECOSYSTEM || table.is_ecosystem(entry) {
            continue;
        } else if !is_valid_domain_pattern(entry) {
            errors.push(CompileError::strict(
                location,
                format!("'{entry}' is not a valid domain or ecosystem id, e.g. 'api.example.com' or 'python'"),
            ))?;
        } else if let Some(ecosystem) = table.ecosystem_of(entry) {
            warnings.push(Warning::new(
                location,
                format!("'{entry}' is part of the '{ecosystem}' ecosystem; consider using '{ecosystem}'"),
            ));
        }
    }

    let firewall = spec.firewall_enabled.get().copied().unwrap_or(false);
    if engine.capabilities().firewall
        && network.is_restricted()
        && !firewall
        && !spec.sandbox.uses_runtime_sandbox()
        && !spec.sandbox.is_disabled()
    {
        errors.push(CompileError::strict(
            "network.firewall",
            format!(
                "the {} engine must run behind the firewall when the network is restricted; \
                 remove 'firewall: false' or set sandbox.agent: srt",
                engine.id()
            ),
        ))?;
    }
    Ok(())
}

fn check_mcp_servers(spec: &WorkflowSpec, errors: &mut ErrorCollector) -> Result<(), CompileError> {
    let has_allow_list = spec
        .network
        .as_ref()
        .and_then(|n| n.domains.allowed.as_ref())
        .is_some_and(|allowed| !allowed.is_empty());
    for (name, decl) in &spec.mcp_servers {
        // Malformed declarations are reported by the renderer.
        let Ok(McpDescriptor::ContainerStdio(server)) = McpDescriptor::from_declaration(name, decl) else {
            continue;
        };
        if !has_allow_list {
            errors.push(CompileError::strict(
                format!("mcp-servers.{name}"),
                format!(
                    "container servers need a top-level network allow-list, e.g.\n\
                     network:\n  allowed: [\"defaults\"]\n\
                     mcp-servers:\n  {name}:\n    container: \"{}\"",
                    server.container
                ),
            ))?;
        }
    }
    Ok(())
}

fn check_tools(spec: &WorkflowSpec, errors: &mut ErrorCollector) -> Result<(), CompileError> {
    if spec.tools.serena.as_ref().is_some_and(|s| s.mode == SerenaMode::Local) {
        errors.push(CompileError::strict(
            "tools.serena.mode",
            "local mode runs outside the container; use mode: docker",
        ))?;
    }
    if spec.tools.cache_memory.as_ref().is_some_and(|c| c.scope == CacheScope::Repo) {
        errors.push(CompileError::strict(
            "tools.cache-memory.scope",
            "repo scope shares memory across workflows; use scope: workflow",
        ))?;
    }
    Ok(())
}

fn check_sandbox(spec: &WorkflowSpec, engine: &dyn Engine, errors: &mut ErrorCollector) -> Result<(), CompileError> {
    if spec.sandbox.agent != Some(AgentSandbox::Disabled) {
        return Ok(());
    }
    let message = match engine.capabilities().llm_gateway_port {
        Some(port) => format!(
            "sandbox.agent: false is not allowed; the {} engine's LLM traffic is routed through \
             the gateway on port {port}, which requires the sandbox",
            engine.id()
        ),
        None => format!(
            "sandbox.agent: false is not allowed; the {} engine must run under awf or srt",
            engine.id()
        ),
    };
    errors.push(CompileError::strict("sandbox.agent", message))
}

#[cfg(test)]
#[path = "strict_tests.rs"]
mod tests;
