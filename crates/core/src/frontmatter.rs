// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Frontmatter boundary: split the `---` fenced YAML header from the
//! markdown body and expose it as a key-value document.

use serde_yaml::{Mapping, Value};
use thiserror::Error;

const FENCE: &str = "---";

/// Errors from the frontmatter boundary.
#[derive(Debug, Error)]
pub enum FrontmatterError {
    #[error("frontmatter opened with '---' on line 1 but never closed")]
    Unterminated,

    #[error("frontmatter must be a mapping of keys to values, found {0}")]
    NotAMapping(&'static str),

    #[error("invalid frontmatter YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Parsed frontmatter document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Frontmatter {
    map: Mapping,
}

impl Frontmatter {
    pub fn from_mapping(map: Mapping) -> Self {
        Self { map }
    }

    /// Parse a YAML document that must be a mapping (or empty).
    pub fn parse(yaml: &str) -> Result<Self, FrontmatterError> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        match serde_yaml::from_str::<Value>(yaml)? {
            Value::Mapping(map) => Ok(Self { map }),
            Value::Null => Ok(Self::default()),
            other => Err(FrontmatterError::NotAMapping(value_kind(&other))),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.map.get(key)
    }

    /// Remove and return a key, leaving the rest for passthrough.
    pub fn take(&mut self, key: &str) -> Option<Value> {
        self.map.remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.map.contains_key(key)
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn into_mapping(self) -> Mapping {
        self.map
    }

    /// Remaining keys as strings, in declaration order. Non-string keys are skipped.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.map.keys().filter_map(Value::as_str)
    }
}

/// Split a workflow source file into frontmatter and markdown body.
///
/// A file without a leading `---` line has empty frontmatter and is all body.
pub fn split_frontmatter(source: &str) -> Result<(Frontmatter, String), FrontmatterError> {
    let source = source.strip_prefix('\u{feff}').unwrap_or(source);
    let mut lines = source.split_inclusive('\n');
    match lines.next() {
        Some(first) if first.trim_end() == FENCE => {}
        _ => return Ok((Frontmatter::default(), source.to_string())),
    }

    let mut yaml = String::new();
    for line in lines.by_ref() {
        if line.trim_end() == FENCE {
            let body: String = lines.collect();
            let body = body.trim_start_matches(['\r', '\n']).to_string();
            return Ok((Frontmatter::parse(&yaml)?, body));
        }
        yaml.push_str(line);
    }
    Err(FrontmatterError::Unterminated)
}

/// Short human name of a YAML value's kind, for error messages.
pub fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a list",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}

#[cfg(test)]
#[path = "frontmatter_tests.rs"]
mod tests;
