// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Normalization of a raw MCP server declaration into a descriptor.
//!
//! ```yaml
//! mcp-servers:
//!   notion:
//!     container: mcp/notion
//!     env:
//!       NOTION_TOKEN: ${{ secrets.NOTION_TOKEN }}
//!     allowed: [search]
//!   docs:
//!     url: https://docs.example.com/mcp
//! ```

use super::provision::{known_launchers, provision};
use awc_core::frontmatter::value_kind;
use awc_core::CompileError;
use serde_yaml::{Mapping, Value};
use std::collections::BTreeMap;

/// Keys a custom server declaration may carry.
pub const VALID_KEYS: &[&str] = &[
    "allowed",
    "args",
    "command",
    "container",
    "entrypoint",
    "entrypointArgs",
    "env",
    "headers",
    "mounts",
    "network",
    "type",
    "url",
    "version",
];

/// A remote server reached over HTTP.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HttpServer {
    pub url: String,
    pub headers: BTreeMap<String, String>,
    pub allowed: Vec<String>,
}

/// A stdio server run inside a container.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContainerServer {
    pub container: String,
    pub entrypoint: Option<String>,
    pub entrypoint_args: Vec<String>,
    pub mounts: Vec<String>,
    /// Container runtime arguments.
    pub args: Vec<String>,
    pub env: BTreeMap<String, String>,
    /// Env vars forwarded from the host by name.
    pub passthrough_env: Vec<String>,
    pub allowed: Vec<String>,
    /// Per-server egress allow-list, enforced through a proxy.
    pub network: Option<Vec<String>>,
}

/// Normalized server declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum McpDescriptor {
    RemoteHttp(HttpServer),
    ContainerStdio(ContainerServer),
}

impl McpDescriptor {
    /// Transport type name.
    pub fn transport(&self) -> &'static str {
        match self {
            McpDescriptor::RemoteHttp(_) => "http",
            McpDescriptor::ContainerStdio(_) => "stdio",
        }
    }

    pub fn allowed(&self) -> &[String] {
        match self {
            McpDescriptor::RemoteHttp(s) => &s.allowed,
            McpDescriptor::ContainerStdio(s) => &s.allowed,
        }
    }

    /// Normalize a raw declaration.
    ///
    /// Order matters: unknown keys are rejected first, then bare launcher
    /// commands are provisioned into a container, then the transport type
    /// is resolved and its required properties checked.
    pub fn from_declaration(name: &str, decl: &Value) -> Result<Self, CompileError> {
        let location = format!("mcp-servers.{name}");
        let Value::Mapping(map) = decl else {
            return Err(CompileError::invalid(
                location,
                format!("expected a mapping of server properties, found {}", value_kind(decl)),
            ));
        };

        for key in map.keys() {
            let key = key.as_str().unwrap_or_default();
            if !VALID_KEYS.contains(&key) {
                return Err(CompileError::UnknownMcpKey {
                    server: name.to_string(),
                    key: key.to_string(),
                    valid: VALID_KEYS.join(", "),
                });
            }
        }

        let fields = Fields { location: &location, map };
        let mut container = fields.string("container")?;
        let mut entrypoint = fields.string("entrypoint")?;
        let mut entrypoint_args = fields.list("entrypointArgs")?;
        let mut args = fields.list("args")?;

        if let Some(command) = fields.string("command")? {
            if container.is_some() {
                return Err(CompileError::invalid(
                    &location,
                    "set either 'command' or 'container', not both",
                ));
            }
            let Some(provisioned) = provision(&command) else {
                return Err(CompileError::invalid(
                    format!("{location}.command"),
                    format!(
                        "'{command}' cannot be containerized automatically; use one of {} or set \
                         'container' to an image, e.g. container: \"ghcr.io/example/server:latest\"",
                        known_launchers().join(", ")
                    ),
                ));
            };
            container = Some(provisioned.image.to_string());
            entrypoint = Some(provisioned.entrypoint.to_string());
            entrypoint_args = std::mem::take(&mut args);
        }

        let url = fields.string("url")?;
        let transport = match fields.string("type")?.as_deref() {
            Some("http") => "http",
            Some("stdio" | "local") => "stdio",
            Some(other) => {
                return Err(CompileError::invalid(
                    format!("{location}.type"),
                    format!("unknown type '{other}'; expected http or stdio"),
                ))
            }
            None if url.is_some() => "http",
            None if container.is_some() => "stdio",
            None => return Err(CompileError::UnresolvedMcpType { server: name.to_string() }),
        };
        let allowed = fields.list("allowed")?;

        if transport == "http" {
            let Some(url) = url else {
                return Err(CompileError::invalid(&location, "http servers require 'url'"));
            };
            if container.is_some() {
                return Err(CompileError::invalid(
                    &location,
                    "'container' is only valid for stdio servers",
                ));
            }
            return Ok(McpDescriptor::RemoteHttp(HttpServer {
                url,
                headers: fields.string_map("headers")?.0,
                allowed,
            }));
        }

        if url.is_some() {
            return Err(CompileError::invalid(&location, "'url' is only valid for http servers"));
        }
        let Some(mut image) = container else {
            return Err(CompileError::invalid(
                &location,
                "stdio servers require 'container' or a provisionable 'command'",
            ));
        };
        if let Some(version) = fields.string("version")? {
            if !image_has_tag(&image) {
                image = format!("{image}:{version}");
            }
        }
        let (env, passthrough_env) = fields.string_map("env")?;

        Ok(McpDescriptor::ContainerStdio(ContainerServer {
            container: image,
            entrypoint,
            entrypoint_args,
            mounts: fields.list("mounts")?,
            args,
            env,
            passthrough_env,
            allowed,
            network: fields.network()?,
        }))
    }
}

fn image_has_tag(image: &str) -> bool {
    let last = image.rsplit('/').next().unwrap_or(image);
    last.contains(':') || last.contains('@')
}

/// Typed accessors over a raw declaration, with located errors.
struct Fields<'a> {
    location: &'a str,
    map: &'a Mapping,
}

impl Fields<'_> {
    fn error(&self, key: &str, expected: &str, found: &Value) -> CompileError {
        CompileError::invalid(
            format!("{}.{key}", self.location),
            format!("expected {expected}, found {}", value_kind(found)),
        )
    }

    fn string(&self, key: &str) -> Result<Option<String>, CompileError> {
        match self.map.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(value) => scalar(value).map(Some).ok_or_else(|| self.error(key, "a string", value)),
        }
    }

    fn list(&self, key: &str) -> Result<Vec<String>, CompileError> {
        match self.map.get(key) {
            None | Some(Value::Null) => Ok(Vec::new()),
            Some(Value::Sequence(items)) => items
                .iter()
                .map(|item| scalar(item).ok_or_else(|| self.error(key, "a list of strings", item)))
                .collect(),
            Some(value) => Err(self.error(key, "a list of strings", value)),
        }
    }

    /// String map; null values are names to pass through from the host.
    fn string_map(&self, key: &str) -> Result<(BTreeMap<String, String>, Vec<String>), CompileError> {
        let mut values = BTreeMap::new();
        let mut passthrough = Vec::new();
        match self.map.get(key) {
            None | Some(Value::Null) => {}
            Some(Value::Mapping(entries)) => {
                for (k, v) in entries {
                    let Some(k) = k.as_str() else {
                        return Err(self.error(key, "string keys", k));
                    };
                    match v {
                        Value::Null => passthrough.push(k.to_string()),
                        v => {
                            let v = scalar(v).ok_or_else(|| self.error(key, "string values", v))?;
                            values.insert(k.to_string(), v);
                        }
                    }
                }
            }
            Some(value) => return Err(self.error(key, "a mapping", value)),
        }
        Ok((values, passthrough))
    }

    /// `network: { allowed: [...] }`
    fn network(&self) -> Result<Option<Vec<String>>, CompileError> {
        match self.map.get("network") {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Mapping(net)) => {
                let inner = Fields { location: self.location, map: net };
                if let Some(key) = net.keys().filter_map(Value::as_str).find(|k| *k != "allowed") {
                    return Err(CompileError::UnknownMcpKey {
                        server: self.location.trim_start_matches("mcp-servers.").to_string(),
                        key: format!("network.{key}"),
                        valid: "network.allowed".to_string(),
                    });
                }
                inner.list("allowed").map(Some)
            }
            Some(value) => Err(self.error("network", "a mapping such as { allowed: [...] }", value)),
        }
    }
}

/// Strings, numbers, and booleans all render as strings.
fn scalar(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

#[cfg(test)]
#[path = "descriptor_tests.rs"]
mod tests;
