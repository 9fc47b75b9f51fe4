// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Typed `tools:` declarations.
//!
//! Built-in tools get their own types. Any other entry is an MCP server
//! declaration and is kept raw in [`ToolsConfig::custom`] for the MCP
//! renderer to normalize.

use crate::diagnostics::CompileError;
use crate::frontmatter::value_kind;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};

/// Commands granted when `bash:` is declared without a list.
pub const DEFAULT_BASH_COMMANDS: &[&str] =
    &["cat", "date", "echo", "grep", "head", "ls", "pwd", "sort", "tail", "uniq", "wc"];

/// Shell access granted to the agent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BashTool {
    /// Unrestricted shell (`true`, `"*"`, or a list containing `*` / `:*`).
    AllowAll,
    Commands(Vec<String>),
}

impl BashTool {
    fn from_value(value: &Value) -> Result<Option<Self>, String> {
        match value {
            Value::Null => Ok(Some(BashTool::Commands(
                DEFAULT_BASH_COMMANDS.iter().map(|c| c.to_string()).collect(),
            ))),
            Value::Bool(true) => Ok(Some(BashTool::AllowAll)),
            Value::Bool(false) => Ok(None),
            Value::String(s) if is_wildcard(s) => Ok(Some(BashTool::AllowAll)),
            Value::Sequence(items) => {
                let mut commands = Vec::with_capacity(items.len());
                for item in items {
                    let Some(cmd) = item.as_str() else {
                        return Err(format!("commands must be strings, found {}", value_kind(item)));
                    };
                    if is_wildcard(cmd) {
                        return Ok(Some(BashTool::AllowAll));
                    }
                    commands.push(cmd.to_string());
                }
                Ok(Some(BashTool::Commands(commands)))
            }
            other => Err(format!(
                "expected true, \"*\", or a list of commands such as [\"echo\", \"ls\"], found {}",
                value_kind(other)
            )),
        }
    }
}

fn is_wildcard(s: &str) -> bool {
    matches!(s.trim(), "*" | ":*")
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GitHubMode {
    /// Containerized server run next to the agent.
    #[default]
    Local,
    /// Hosted HTTP endpoint.
    Remote,
}

/// The hosted issue-tracker API tool. Enabled unless declared `false`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct GitHubTool {
    #[serde(default)]
    pub mode: GitHubMode,
    /// `None` means every tool is allowed.
    #[serde(default)]
    pub allowed: Option<Vec<String>>,
    #[serde(default)]
    pub toolsets: Vec<String>,
    #[serde(default)]
    pub read_only: bool,
    #[serde(default)]
    pub github_token: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
}

impl GitHubTool {
    pub fn allows_everything(&self) -> bool {
        self.allowed.as_ref().is_none_or(|a| a.iter().any(|t| t == "*"))
    }
}

/// Browser automation add-on.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct PlaywrightTool {
    #[serde(default, alias = "allowed_domains")]
    pub allowed_domains: Vec<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub args: Vec<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheScope {
    #[default]
    Workflow,
    Repo,
}

crate::simple_display! {
    CacheScope {
        Workflow => "workflow",
        Repo => "repo",
    }
}

/// Persistent memory directory restored between runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct CacheMemoryTool {
    #[serde(default)]
    pub scope: CacheScope,
    #[serde(default)]
    pub key: Option<String>,
    #[serde(default)]
    pub retention_days: Option<u32>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SerenaMode {
    #[default]
    Docker,
    Local,
}

crate::simple_display! {
    SerenaMode {
        Docker => "docker",
        Local => "local",
    }
}

/// Semantic code search server.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct SerenaTool {
    #[serde(default)]
    pub mode: SerenaMode,
    #[serde(default)]
    pub languages: Vec<String>,
}

/// All declared tools.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolsConfig {
    pub bash: Option<BashTool>,
    pub edit: bool,
    pub web_fetch: bool,
    pub web_search: bool,
    pub github: Option<GitHubTool>,
    pub playwright: Option<PlaywrightTool>,
    pub cache_memory: Option<CacheMemoryTool>,
    pub serena: Option<SerenaTool>,
    /// Remaining entries: MCP server declarations, unvalidated.
    pub custom: IndexMap<String, Value>,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            bash: None,
            edit: false,
            web_fetch: false,
            web_search: false,
            github: Some(GitHubTool::default()),
            playwright: None,
            cache_memory: None,
            serena: None,
            custom: IndexMap::new(),
        }
    }
}

impl ToolsConfig {
    /// Build from the raw `tools:` mapping. Every malformed entry is reported.
    pub fn from_map(map: &Mapping) -> Result<Self, CompileError> {
        let mut tools = ToolsConfig::default();
        let mut errors = Vec::new();

        for (key, value) in map {
            let Some(name) = key.as_str() else {
                errors.push(CompileError::invalid("tools", "tool names must be strings"));
                continue;
            };
            let location = format!("tools.{name}");
            let result = match name {
                "bash" => BashTool::from_value(value).map(|b| tools.bash = b),
                "edit" => flag(value).map(|f| tools.edit = f),
                "web-fetch" => flag(value).map(|f| tools.web_fetch = f),
                "web-search" => flag(value).map(|f| tools.web_search = f),
                "github" => typed(value).map(|t| tools.github = t),
                "playwright" => typed(value).map(|t| tools.playwright = t),
                "cache-memory" => typed(value).map(|t| tools.cache_memory = t),
                "serena" => typed(value).map(|t| tools.serena = t),
                _ => {
                    tools.custom.insert(name.to_string(), value.clone());
                    Ok(())
                }
            };
            if let Err(message) = result {
                errors.push(CompileError::invalid(location, message));
            }
        }

        match errors.len() {
            0 => Ok(tools),
            1 => Err(errors.remove(0)),
            _ => Err(CompileError::Multiple(errors)),
        }
    }
}

/// `null`, `true`, or an (ignored) options map enable a flag tool.
fn flag(value: &Value) -> Result<bool, String> {
    match value {
        Value::Null | Value::Mapping(_) => Ok(true),
        Value::Bool(b) => Ok(*b),
        other => Err(format!("expected true, false, or an empty value, found {}", value_kind(other))),
    }
}

/// `false` disables; `null`/`true` take defaults; a map is parsed.
fn typed<T>(value: &Value) -> Result<Option<T>, String>
where
    T: Default + for<'de> Deserialize<'de>,
{
    match value {
        Value::Bool(false) => Ok(None),
        Value::Null | Value::Bool(true) => Ok(Some(T::default())),
        Value::Mapping(_) => {
            serde_yaml::from_value(value.clone()).map(Some).map_err(|e| e.to_string())
        }
        other => Err(format!("expected false or a mapping of options, found {}", value_kind(other))),
    }
}

#[cfg(test)]
#[path = "tools_tests.rs"]
mod tests;
