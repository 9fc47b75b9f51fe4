// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Structured emitter for MCP config documents.
//!
//! Callers add fields to a [`ServerBlock`] in their fixed order; the
//! builder owns quoting, indentation, and separator placement for both
//! dialects.

use awc_core::McpFormat;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Field {
    Str(String),
    List(Vec<String>),
    Map(BTreeMap<String, String>),
}

/// One server's properties, in emission order. Empty values are skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerBlock {
    name: String,
    fields: Vec<(&'static str, Field)>,
}

impl ServerBlock {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), fields: Vec::new() }
    }

    pub fn str(mut self, key: &'static str, value: impl Into<String>) -> Self {
        self.fields.push((key, Field::Str(value.into())));
        self
    }

    pub fn opt_str(self, key: &'static str, value: Option<impl Into<String>>) -> Self {
        match value {
            Some(v) => self.str(key, v),
            None => self,
        }
    }

    pub fn list(mut self, key: &'static str, values: Vec<String>) -> Self {
        if !values.is_empty() {
            self.fields.push((key, Field::List(values)));
        }
        self
    }

    pub fn map(mut self, key: &'static str, values: BTreeMap<String, String>) -> Self {
        if !values.is_empty() {
            self.fields.push((key, Field::Map(values)));
        }
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Assembles server blocks into a document.
#[derive(Debug, Clone)]
pub struct DocBuilder {
    format: McpFormat,
    inline_lists: bool,
    blocks: Vec<ServerBlock>,
}

impl DocBuilder {
    pub fn new(format: McpFormat, inline_lists: bool) -> Self {
        Self { format, inline_lists, blocks: Vec::new() }
    }

    pub fn push(&mut self, block: ServerBlock) {
        self.blocks.push(block);
    }

    pub fn render(&self) -> String {
        match self.format {
            McpFormat::Json => self.render_json(),
            McpFormat::Toml => self.render_toml(),
        }
    }

    fn render_json(&self) -> String {
        let servers: Vec<String> = self
            .blocks
            .iter()
            .map(|block| {
                let fields: Vec<String> = block
                    .fields
                    .iter()
                    .map(|(key, field)| {
                        format!("      {}: {}", json_str(key), self.json_field(field))
                    })
                    .collect();
                format!("    {}: {{\n{}\n    }}", json_str(&block.name), join_entries(&fields, ","))
            })
            .collect();

        if servers.is_empty() {
            return "{\n  \"mcpServers\": {}\n}\n".to_string();
        }
        format!("{{\n  \"mcpServers\": {{\n{}\n  }}\n}}\n", join_entries(&servers, ","))
    }

    fn json_field(&self, field: &Field) -> String {
        match field {
            Field::Str(s) => json_str(s),
            Field::List(items) => {
                let items: Vec<String> = items.iter().map(|i| json_str(i)).collect();
                if self.inline_lists {
                    format!("[{}]", items.join(", "))
                } else {
                    let lines: Vec<String> = items.iter().map(|i| format!("        {i}")).collect();
                    format!("[\n{}\n      ]", join_entries(&lines, ","))
                }
            }
            Field::Map(entries) => {
                let lines: Vec<String> = entries
                    .iter()
                    .map(|(k, v)| format!("        {}: {}", json_str(k), json_str(v)))
                    .collect();
                format!("{{\n{}\n      }}", join_entries(&lines, ","))
            }
        }
    }

    fn render_toml(&self) -> String {
        let tables: Vec<String> = self
            .blocks
            .iter()
            .map(|block| {
                let mut table = format!("[mcp_servers.{}]\n", toml_key(&block.name));
                for (key, field) in &block.fields {
                    let value = match field {
                        Field::Str(s) => toml_str(s),
                        Field::List(items) => {
                            let items: Vec<String> = items.iter().map(|i| toml_str(i)).collect();
                            format!("[{}]", items.join(", "))
                        }
                        Field::Map(entries) => {
                            let pairs: Vec<String> = entries
                                .iter()
                                .map(|(k, v)| format!("{} = {}", toml_str(k), toml_str(v)))
                                .collect();
                            format!("{{ {} }}", pairs.join(", "))
                        }
                    };
                    table.push_str(&format!("{} = {value}\n", snake_case(key)));
                }
                table
            })
            .collect();
        tables.join("\n")
    }
}

/// Join with a separator after every entry except the last.
fn join_entries(entries: &[String], separator: &str) -> String {
    entries.join(&format!("{separator}\n"))
}

fn json_str(s: &str) -> String {
    serde_json::Value::String(s.to_string()).to_string()
}

fn toml_str(s: &str) -> String {
    toml::Value::String(s.to_string()).to_string()
}

/// Bare table key when possible, quoted otherwise.
fn toml_key(name: &str) -> String {
    if !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-') {
        name.to_string()
    } else {
        toml_str(name)
    }
}

/// `entrypointArgs` → `entrypoint_args`
fn snake_case(key: &str) -> String {
    let mut out = String::with_capacity(key.len() + 4);
    for c in key.chars() {
        if c.is_ascii_uppercase() {
            out.push('_');
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
#[path = "doc_tests.rs"]
mod tests;
