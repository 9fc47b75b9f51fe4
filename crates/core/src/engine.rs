// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Engine selection as declared in the workflow.
//!
//! Short form:
//! ```yaml
//! engine: claude
//! ```
//!
//! Block form:
//! ```yaml
//! engine:
//!   id: codex
//!   model: gpt-5
//!   max-turns: 20
//! ```

use crate::diagnostics::CompileError;
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use std::str::FromStr;

/// The four supported execution engines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineId {
    Claude,
    Codex,
    #[default]
    Copilot,
    Custom,
}

impl EngineId {
    pub const ALL: [EngineId; 4] =
        [EngineId::Claude, EngineId::Codex, EngineId::Copilot, EngineId::Custom];

    pub fn as_str(self) -> &'static str {
        match self {
            EngineId::Claude => "claude",
            EngineId::Codex => "codex",
            EngineId::Copilot => "copilot",
            EngineId::Custom => "custom",
        }
    }
}

impl std::fmt::Display for EngineId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EngineId {
    type Err = CompileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EngineId::ALL.into_iter().find(|id| id.as_str() == s).ok_or_else(|| {
            CompileError::UnknownEngine {
                id: s.to_string(),
                available: EngineId::ALL.map(EngineId::as_str).join(", "),
            }
        })
    }
}

impl<'de> Deserialize<'de> for EngineId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Engine choice plus engine-specific options.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EngineConfig {
    pub id: EngineId,
    pub model: Option<String>,
    pub version: Option<String>,
    pub max_turns: Option<u32>,
    /// Replacement CLI command (custom engine, or an override for the others).
    pub command: Option<String>,
    pub env: IndexMap<String, String>,
    pub args: Vec<String>,
}

impl EngineConfig {
    pub fn new(id: EngineId) -> Self {
        Self { id, ..Self::default() }
    }

    crate::setters! {
        option {
            model: String,
            version: String,
            max_turns: u32,
            command: String,
        }
    }
}

impl<'de> Deserialize<'de> for EngineConfig {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(rename_all = "kebab-case", deny_unknown_fields)]
        struct Block {
            id: String,
            #[serde(default)]
            model: Option<String>,
            #[serde(default)]
            version: Option<String>,
            #[serde(default)]
            max_turns: Option<u32>,
            #[serde(default)]
            command: Option<String>,
            #[serde(default)]
            env: IndexMap<String, String>,
            #[serde(default)]
            args: Vec<String>,
        }

        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Helper {
            Short(String),
            Block(Block),
        }

        match Helper::deserialize(deserializer)? {
            Helper::Short(id) => Ok(EngineConfig::new(id.parse().map_err(serde::de::Error::custom)?)),
            Helper::Block(b) => Ok(EngineConfig {
                id: b.id.parse().map_err(serde::de::Error::custom)?,
                model: b.model,
                version: b.version,
                max_turns: b.max_turns,
                command: b.command,
                env: b.env,
                args: b.args,
            }),
        }
    }
}

/// Engine-specific tool permission flags computed for the agent step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ToolPermissions {
    /// A single coarse "allow every tool" flag.
    AllowAll,
    /// Discrete entries, sorted and deduplicated.
    Allowed(Vec<String>),
}

impl ToolPermissions {
    pub fn entries(&self) -> &[String] {
        match self {
            ToolPermissions::AllowAll => &[],
            ToolPermissions::Allowed(entries) => entries,
        }
    }

    pub fn is_allow_all(&self) -> bool {
        matches!(self, ToolPermissions::AllowAll)
    }
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;
