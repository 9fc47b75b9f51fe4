// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Safe-output declarations: typed mutation requests the agent may make,
//! each executed later in its own isolated job.

use crate::diagnostics::CompileError;
use crate::frontmatter::value_kind;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};
use std::collections::BTreeMap;

/// Every mutation type, in emission order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SafeOutputKind {
    CreateIssue,
    CreateDiscussion,
    CreatePullRequest,
    AddComment,
    CreatePullRequestReviewComment,
    UpdateIssue,
    AddLabels,
    PushToPullRequestBranch,
    UploadAssets,
    MissingTool,
}

impl SafeOutputKind {
    pub const ALL: [SafeOutputKind; 10] = [
        SafeOutputKind::CreateIssue,
        SafeOutputKind::CreateDiscussion,
        SafeOutputKind::CreatePullRequest,
        SafeOutputKind::AddComment,
        SafeOutputKind::CreatePullRequestReviewComment,
        SafeOutputKind::UpdateIssue,
        SafeOutputKind::AddLabels,
        SafeOutputKind::PushToPullRequestBranch,
        SafeOutputKind::UploadAssets,
        SafeOutputKind::MissingTool,
    ];

    /// Frontmatter key.
    pub fn key(self) -> &'static str {
        match self {
            SafeOutputKind::CreateIssue => "create-issue",
            SafeOutputKind::CreateDiscussion => "create-discussion",
            SafeOutputKind::CreatePullRequest => "create-pull-request",
            SafeOutputKind::AddComment => "add-comment",
            SafeOutputKind::CreatePullRequestReviewComment => "create-pull-request-review-comment",
            SafeOutputKind::UpdateIssue => "update-issue",
            SafeOutputKind::AddLabels => "add-labels",
            SafeOutputKind::PushToPullRequestBranch => "push-to-pull-request-branch",
            SafeOutputKind::UploadAssets => "upload-assets",
            SafeOutputKind::MissingTool => "missing-tool",
        }
    }

    /// Name of the job that executes this kind.
    pub fn job_name(self) -> &'static str {
        match self {
            SafeOutputKind::CreateIssue => "create_issue",
            SafeOutputKind::CreateDiscussion => "create_discussion",
            SafeOutputKind::CreatePullRequest => "create_pull_request",
            SafeOutputKind::AddComment => "add_comment",
            SafeOutputKind::CreatePullRequestReviewComment => "create_pr_review_comment",
            SafeOutputKind::UpdateIssue => "update_issue",
            SafeOutputKind::AddLabels => "add_labels",
            SafeOutputKind::PushToPullRequestBranch => "push_to_pull_request_branch",
            SafeOutputKind::UploadAssets => "upload_assets",
            SafeOutputKind::MissingTool => "missing_tool",
        }
    }

    /// Upper bound on requests when `max` is not declared.
    pub fn default_max(self) -> u32 {
        match self {
            SafeOutputKind::AddLabels | SafeOutputKind::AddComment => 3,
            SafeOutputKind::CreatePullRequestReviewComment => 10,
            SafeOutputKind::UploadAssets => 10,
            SafeOutputKind::MissingTool => 20,
            _ => 1,
        }
    }

    /// Prefix for the job's `AWC_<PREFIX>_*` env variables.
    pub fn env_prefix(self) -> String {
        self.job_name().to_ascii_uppercase()
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.key() == key)
    }
}

impl std::fmt::Display for SafeOutputKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

/// Bounds for one declared safe-output kind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct SafeOutputConfig {
    #[serde(default)]
    pub max: Option<u32>,
    /// `triggering`, `*`, or an explicit number.
    #[serde(default)]
    pub target: Option<String>,
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub title_prefix: Option<String>,
    #[serde(default)]
    pub draft: Option<bool>,
    #[serde(default)]
    pub allowed: Vec<String>,
    #[serde(default)]
    pub github_token: Option<String>,
}

/// A custom tool exposed through the safe-inputs server.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct SafeInputTool {
    pub description: String,
    #[serde(default)]
    pub inputs: IndexMap<String, Value>,
    #[serde(default)]
    pub run: Option<String>,
    #[serde(default)]
    pub script: Option<String>,
    #[serde(default)]
    pub env: IndexMap<String, String>,
}

/// The `safe-outputs:` section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SafeOutputsConfig {
    pub outputs: BTreeMap<SafeOutputKind, SafeOutputConfig>,
    pub staged: bool,
    pub threat_detection: bool,
    pub github_token: Option<String>,
    /// Deprecated keys seen while parsing, with their replacement.
    pub deprecated: Vec<(String, &'static str)>,
}

impl Default for SafeOutputsConfig {
    fn default() -> Self {
        Self {
            outputs: BTreeMap::new(),
            staged: false,
            threat_detection: true,
            github_token: None,
            deprecated: Vec::new(),
        }
    }
}

impl SafeOutputsConfig {
    pub fn with_output(mut self, kind: SafeOutputKind, config: SafeOutputConfig) -> Self {
        self.outputs.insert(kind, config);
        self
    }

    pub fn is_declared(&self, kind: SafeOutputKind) -> bool {
        self.outputs.contains_key(&kind)
    }

    pub fn get(&self, kind: SafeOutputKind) -> Option<&SafeOutputConfig> {
        self.outputs.get(&kind)
    }

    pub fn kinds(&self) -> impl Iterator<Item = SafeOutputKind> + '_ {
        self.outputs.keys().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.outputs.is_empty()
    }

    /// Parse the raw mapping. Unknown keys are errors.
    pub fn from_map(map: &Mapping) -> Result<Self, CompileError> {
        let mut config = SafeOutputsConfig::default();
        let mut errors = Vec::new();

        for (key, value) in map {
            let Some(key) = key.as_str() else {
                errors.push(CompileError::invalid("safe-outputs", "keys must be strings"));
                continue;
            };
            let location = format!("safe-outputs.{key}");
            let result = match key {
                "staged" => bool_value(value).map(|b| config.staged = b),
                "staged-mode" => bool_value(value).map(|b| {
                    config.staged = b;
                    config.deprecated.push((location.clone(), "safe-outputs.staged"));
                }),
                "threat-detection" => threat_detection(value).map(|b| config.threat_detection = b),
                "github-token" => match value {
                    Value::String(s) => {
                        config.github_token = Some(s.clone());
                        Ok(())
                    }
                    other => Err(format!("expected a string, found {}", value_kind(other))),
                },
                other => match SafeOutputKind::from_key(other) {
                    Some(kind) => output_config(value).map(|c| {
                        if let Some(c) = c {
                            config.outputs.insert(kind, c);
                        }
                    }),
                    None => Err(format!(
                        "unknown safe-output type; valid types are: {}",
                        SafeOutputKind::ALL.map(SafeOutputKind::key).join(", ")
                    )),
                },
            };
            if let Err(message) = result {
                errors.push(CompileError::invalid(location, message));
            }
        }

        match errors.len() {
            0 => Ok(config),
            1 => Err(errors.remove(0)),
            _ => Err(CompileError::Multiple(errors)),
        }
    }
}

fn bool_value(value: &Value) -> Result<bool, String> {
    value.as_bool().ok_or_else(|| format!("expected true or false, found {}", value_kind(value)))
}

/// `threat-detection: bool` or `{ enabled: bool, ... }`.
fn threat_detection(value: &Value) -> Result<bool, String> {
    match value {
        Value::Bool(b) => Ok(*b),
        Value::Null => Ok(true),
        Value::Mapping(m) => match m.get("enabled") {
            None => Ok(true),
            Some(v) => bool_value(v),
        },
        other => Err(format!("expected true, false, or a mapping, found {}", value_kind(other))),
    }
}

fn output_config(value: &Value) -> Result<Option<SafeOutputConfig>, String> {
    match value {
        Value::Bool(false) => Ok(None),
        Value::Null | Value::Bool(true) => Ok(Some(SafeOutputConfig::default())),
        Value::Mapping(_) => {
            serde_yaml::from_value(value.clone()).map(Some).map_err(|e| e.to_string())
        }
        other => Err(format!("expected a mapping of options, found {}", value_kind(other))),
    }
}

#[cfg(test)]
#[path = "safe_outputs_tests.rs"]
mod tests;
