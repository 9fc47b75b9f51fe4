// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The workflow IR threaded through every compilation phase.
//!
//! Declared sections are typed once here, at the frontmatter boundary.
//! Derived fields are [`Slot`]s, each written by exactly one phase.

use crate::diagnostics::{CompileError, ErrorCollector, Warning};
use crate::engine::{EngineConfig, ToolPermissions};
use crate::frontmatter::{value_kind, Frontmatter};
use crate::job::{CustomJob, JobGraph, Step};
use crate::network::{NetworkPolicy, SandboxConfig};
use crate::permissions::Permissions;
use crate::safe_outputs::{SafeInputTool, SafeOutputsConfig};
use crate::slot::Slot;
use crate::tools::ToolsConfig;
use crate::trigger::TriggerConfig;
use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde_yaml::Value;
use std::collections::BTreeMap;

/// Top-level keys copied verbatim into the generated document.
pub const PASSTHROUGH_KEYS: &[&str] = &[
    "env",
    "concurrency",
    "run-name",
    "timeout-minutes",
    "runs-on",
    "environment",
    "container",
    "cache",
    "if",
    "features",
];

/// Deprecated top-level keys and their replacements.
pub const DEPRECATED_KEYS: &[(&str, &str)] =
    &[("timeout_minutes", "timeout-minutes"), ("runs_on", "runs-on")];

/// A deprecated field that was used, and what replaces it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deprecation {
    pub field: String,
    pub replacement: &'static str,
}

/// Serialization dialect of a rendered MCP config document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum McpFormat {
    /// `{"mcpServers": {...}}`
    Json,
    /// `[mcp_servers.<name>]` tables
    Toml,
}

crate::simple_display! {
    McpFormat {
        Json => "json",
        Toml => "toml",
    }
}

/// Output of the MCP renderer for the agent job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedMcpConfig {
    pub format: McpFormat,
    pub document: String,
    /// Synthetic variable → original expression, for the writing step's env.
    pub env: BTreeMap<String, String>,
    /// Rendered server names, in emission order.
    pub servers: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct WorkflowSpec {
    /// Derived from the source file name. Never from `name:`.
    pub id: String,
    pub name: String,
    pub tracker_id: Option<String>,
    pub description: Option<String>,
    pub engine: EngineConfig,
    pub tools: ToolsConfig,
    /// Custom MCP servers: `mcp-servers:` plus non-built-in `tools:` entries.
    pub mcp_servers: IndexMap<String, Value>,
    pub network: Option<NetworkPolicy>,
    pub sandbox: SandboxConfig,
    pub permissions: Option<Permissions>,
    pub safe_outputs: Option<SafeOutputsConfig>,
    pub safe_inputs: IndexMap<String, SafeInputTool>,
    pub jobs: IndexMap<String, CustomJob>,
    pub steps: Vec<Step>,
    pub post_steps: Vec<Step>,
    pub services: IndexMap<String, Value>,
    pub on: TriggerConfig,
    pub roles: Option<Vec<String>>,
    pub strict: Option<bool>,
    pub imports: Vec<String>,
    pub passthrough: IndexMap<String, Value>,
    /// Unrecognized top-level keys, carried through unexamined.
    pub unknown: IndexMap<String, Value>,
    pub deprecated: Vec<Deprecation>,
    /// The agent prompt.
    pub markdown: String,
    pub warnings: Vec<Warning>,

    pub allowed_domains: Slot<Vec<String>>,
    pub blocked_domains: Slot<Vec<String>>,
    pub firewall_enabled: Slot<bool>,
    pub tool_permissions: Slot<ToolPermissions>,
    pub mcp_config: Slot<RenderedMcpConfig>,
    pub job_graph: Slot<JobGraph>,
}

impl WorkflowSpec {
    /// Type every declared section. Section errors go to `errors`; the
    /// returned IR holds defaults for sections that failed.
    pub fn from_frontmatter(
        id: impl Into<String>,
        mut fm: Frontmatter,
        markdown: impl Into<String>,
        errors: &mut ErrorCollector,
    ) -> Result<Self, CompileError> {
        let id = id.into();
        let markdown = markdown.into();
        let mut spec = WorkflowSpec { id: id.clone(), markdown, ..Self::default() };

        let name: Option<String> = section(&mut fm, "name", errors)?;
        spec.name = name
            .or_else(|| markdown_title(&spec.markdown))
            .unwrap_or_else(|| id.clone());
        spec.description = section(&mut fm, "description", errors)?;
        spec.tracker_id = section(&mut fm, "tracker-id", errors)?;
        if let Some(tracker) = &spec.tracker_id {
            if let Err(message) = validate_tracker_id(tracker) {
                errors.push(CompileError::invalid("tracker-id", message))?;
            }
        }

        if let Some(engine) = section(&mut fm, "engine", errors)? {
            spec.engine = engine;
        }

        if let Some(value) = fm.take("tools") {
            let parsed = match &value {
                Value::Mapping(map) => ToolsConfig::from_map(map),
                Value::Null => Ok(ToolsConfig::default()),
                other => Err(CompileError::invalid(
                    "tools",
                    format!("expected a mapping of tool names, found {}", value_kind(other)),
                )),
            };
            if let Some(tools) = errors.check(parsed)? {
                spec.tools = tools;
            }
        }
        if let Some(servers) = section::<IndexMap<String, Value>>(&mut fm, "mcp-servers", errors)? {
            spec.mcp_servers = servers;
        }
        for (name, decl) in std::mem::take(&mut spec.tools.custom) {
            if spec.mcp_servers.contains_key(&name) {
                spec.warn(
                    format!("tools.{name}"),
                    "also declared under mcp-servers; the mcp-servers entry is used",
                );
                continue;
            }
            spec.mcp_servers.insert(name, decl);
        }

        spec.network = section(&mut fm, "network", errors)?;
        if let Some(sandbox) = section(&mut fm, "sandbox", errors)? {
            spec.sandbox = sandbox;
        }
        spec.permissions = section(&mut fm, "permissions", errors)?;

        if let Some(value) = fm.take("safe-outputs") {
            let parsed = match &value {
                Value::Mapping(map) => SafeOutputsConfig::from_map(map).map(Some),
                Value::Null => Ok(None),
                other => Err(CompileError::invalid(
                    "safe-outputs",
                    format!("expected a mapping of output types, found {}", value_kind(other)),
                )),
            };
            if let Some(Some(mut safe_outputs)) = errors.check(parsed)? {
                for (field, replacement) in std::mem::take(&mut safe_outputs.deprecated) {
                    spec.deprecated.push(Deprecation { field, replacement });
                }
                spec.safe_outputs = Some(safe_outputs);
            }
        }
        if let Some(inputs) = section(&mut fm, "safe-inputs", errors)? {
            spec.safe_inputs = inputs;
        }

        if let Some(jobs) = section(&mut fm, "jobs", errors)? {
            spec.jobs = jobs;
        }
        if let Some(steps) = section(&mut fm, "steps", errors)? {
            spec.steps = steps;
        }
        if let Some(steps) = section(&mut fm, "post-steps", errors)? {
            spec.post_steps = steps;
        }
        if let Some(services) = section(&mut fm, "services", errors)? {
            spec.services = services;
        }

        if let Some(value) = fm.take("on") {
            let parsed = TriggerConfig::from_value(&value).map_err(|m| CompileError::invalid("on", m));
            if let Some(trigger) = errors.check(parsed)? {
                spec.on = trigger;
            }
        }
        spec.roles = match fm.take("roles") {
            None => None,
            Some(Value::String(s)) if s == "all" => None,
            Some(value) => errors.check(
                serde_yaml::from_value::<Vec<String>>(value)
                    .map(Some)
                    .map_err(|e| CompileError::invalid("roles", e.to_string())),
            )?
            .flatten(),
        };
        spec.strict = section(&mut fm, "strict", errors)?;
        if let Some(imports) = section(&mut fm, "imports", errors)? {
            spec.imports = imports;
        }

        for (old, new) in DEPRECATED_KEYS {
            if let Some(value) = fm.take(old) {
                spec.deprecated.push(Deprecation { field: old.to_string(), replacement: *new });
                spec.warn(*old, format!("deprecated; use '{new}' instead"));
                if !fm.contains_key(new) {
                    spec.passthrough.insert(new.to_string(), value);
                }
            }
        }
        for key in PASSTHROUGH_KEYS {
            if let Some(value) = fm.take(key) {
                spec.passthrough.insert(key.to_string(), value);
            }
        }

        for (key, value) in fm.into_mapping() {
            match key {
                Value::String(key) => {
                    tracing::debug!(workflow = %spec.id, key = %key, "passing through unknown key");
                    spec.unknown.insert(key, value);
                }
                other => errors.push(CompileError::invalid(
                    "frontmatter",
                    format!("keys must be strings, found {}", value_kind(&other)),
                ))?,
            }
        }

        Ok(spec)
    }

    /// Record a warning and log it.
    pub fn warn(&mut self, location: impl Into<String>, message: impl Into<String>) {
        let warning = Warning::new(location, message);
        tracing::warn!(workflow = %self.id, location = %warning.location, "{}", warning.message);
        self.warnings.push(warning);
    }

    /// Strictness after applying the compiler-wide default.
    pub fn is_strict(&self, default: bool) -> bool {
        self.strict.unwrap_or(default)
    }

    /// Whether the graph needs a `pre_activation` job.
    pub fn needs_pre_activation(&self) -> bool {
        self.on.needs_pre_activation() || self.roles.is_some()
    }

    pub fn has_safe_outputs(&self) -> bool {
        self.safe_outputs.as_ref().is_some_and(|s| !s.is_empty())
    }

    pub fn has_safe_inputs(&self) -> bool {
        !self.safe_inputs.is_empty()
    }

    pub fn threat_detection(&self) -> bool {
        self.safe_outputs.as_ref().is_some_and(|s| !s.is_empty() && s.threat_detection)
    }
}

/// Take `key` from the frontmatter and deserialize it, collecting failures.
fn section<T: DeserializeOwned>(
    fm: &mut Frontmatter,
    key: &'static str,
    errors: &mut ErrorCollector,
) -> Result<Option<T>, CompileError> {
    let Some(value) = fm.take(key) else { return Ok(None) };
    let parsed = serde_yaml::from_value::<T>(value).map_err(|e| CompileError::invalid(key, e.to_string()));
    errors.check(parsed)
}

fn markdown_title(markdown: &str) -> Option<String> {
    markdown
        .lines()
        .find_map(|line| line.strip_prefix("# "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
}

fn validate_tracker_id(tracker: &str) -> Result<(), String> {
    if tracker.len() < 8 {
        return Err(format!("'{tracker}' is too short; use at least 8 characters"));
    }
    if !tracker.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_') {
        return Err(format!("'{tracker}' may only contain letters, digits, '-' and '_'"));
    }
    Ok(())
}

#[cfg(test)]
#[path = "workflow_tests.rs"]
mod tests;
