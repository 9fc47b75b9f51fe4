// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! MCP server configuration.
//!
//! Raw declarations are normalized into [`McpDescriptor`]s, merged with the
//! built-in servers, and emitted through [`DocBuilder`] in the engine's
//! JSON or TOML dialect.

mod builtin;
mod descriptor;
mod doc;
mod provision;
mod render;

pub use builtin::{builtin_servers, playwright_domains, DEFAULT_GITHUB_TOKEN};
pub use descriptor::{ContainerServer, HttpServer, McpDescriptor, VALID_KEYS};
pub use doc::{DocBuilder, ServerBlock};
pub use provision::{known_launchers, provision, Provisioned};
pub use render::{proxy_env, render_mcp_config, PROXY_PORT};
