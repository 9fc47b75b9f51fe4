// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Compiler-wide options.

use awc_core::{EngineId, ErrorMode};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors loading a compiler config file
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[source] toml::de::Error),

    #[error("invalid config '{}': {source}", path.display())]
    ParseFile {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Options applied to every workflow a [`Compiler`](crate::Compiler) compiles.
///
/// ```toml
/// strict = true
/// error-mode = "fail-fast"
/// default-engine = "claude"
///
/// [action-pins]
/// "actions/setup-node@v4" = "39370e3970a6d050c480ffad4ff0ed4d3fdee5af"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct CompilerConfig {
    /// Strictness for workflows that do not set `strict:` themselves.
    pub strict: bool,
    pub error_mode: ErrorMode,
    /// Engine for workflows that do not set `engine:`.
    pub default_engine: EngineId,
    /// Extra `owner/repo@tag` → SHA pins on top of the built-in ones.
    pub action_pins: BTreeMap<String, String>,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            strict: false,
            error_mode: ErrorMode::CollectAll,
            default_engine: EngineId::Copilot,
            action_pins: BTreeMap::new(),
        }
    }
}

impl CompilerConfig {
    awc_core::setters! {
        set {
            strict: bool,
            error_mode: ErrorMode,
            default_engine: EngineId,
        }
    }

    pub fn action_pin(mut self, action: impl Into<String>, sha: impl Into<String>) -> Self {
        self.action_pins.insert(action.into(), sha.into());
        self
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(ConfigError::Parse)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|source| ConfigError::Io { path: path.to_path_buf(), source })?;
        let config: Self = toml::from_str(&content)
            .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })?;
        tracing::debug!(
            path = %path.display(),
            strict = config.strict,
            engine = %config.default_engine,
            "loaded compiler config"
        );
        Ok(config)
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
