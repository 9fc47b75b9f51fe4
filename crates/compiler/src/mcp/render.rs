// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Render the agent's MCP config document in the engine's dialect.

use super::builtin::builtin_servers;
use super::descriptor::{ContainerServer, HttpServer, McpDescriptor};
use super::doc::{DocBuilder, ServerBlock};
use crate::engine::{Engine, McpDialect};
use crate::expr::{self, ExpressionMap};
use awc_core::{CompileError, ErrorCollector, ErrorMode, RenderedMcpConfig, WorkflowSpec};
use awc_domains::{DomainPolicy, EcosystemTable};
use std::collections::BTreeMap;

/// Port of the per-server egress proxy sidecar.
pub const PROXY_PORT: u16 = 3128;

/// Render every enabled server: built-ins first, then custom servers in
/// declaration order.
///
/// Every invalid custom server is reported. Expressions in any rendered
/// value are lifted into the returned env map, so the document itself
/// never carries `${{`.
pub fn render_mcp_config(
    engine: &dyn Engine,
    spec: &WorkflowSpec,
    table: &EcosystemTable,
) -> Result<RenderedMcpConfig, CompileError> {
    let dialect = engine.dialect();
    let mut servers = builtin_servers(spec, table);

    let mut errors = ErrorCollector::new(ErrorMode::CollectAll);
    for (name, decl) in &spec.mcp_servers {
        if let Some(desc) = errors.check(McpDescriptor::from_declaration(name, decl))? {
            servers.push((name.clone(), desc));
        }
    }
    errors.finish()?;

    let mut secure = Securer { map: ExpressionMap::new() };
    let mut doc = DocBuilder::new(dialect.format, dialect.inline_lists);
    for (name, desc) in &servers {
        let block = match desc {
            McpDescriptor::RemoteHttp(http) => http_block(name, http, dialect, &mut secure),
            McpDescriptor::ContainerStdio(server) => {
                container_block(name, server, dialect, table, &mut secure)
            }
        };
        doc.push(block);
    }

    let document = doc.render();
    tracing::debug!(
        workflow = %spec.id,
        engine = %engine.id(),
        format = %dialect.format,
        servers = servers.len(),
        "rendered mcp config"
    );
    Ok(RenderedMcpConfig {
        format: dialect.format,
        document,
        env: secure.map,
        servers: servers.into_iter().map(|(name, _)| name).collect(),
    })
}

fn http_block(name: &str, http: &HttpServer, dialect: McpDialect, secure: &mut Securer) -> ServerBlock {
    ServerBlock::new(name)
        .opt_str("type", dialect.type_field.then_some("http"))
        .str("url", secure.str(&http.url))
        .map("headers", secure.map(&http.headers))
        .list("tools", tools_field(dialect, &http.allowed))
}

fn container_block(
    name: &str,
    server: &ContainerServer,
    dialect: McpDialect,
    table: &EcosystemTable,
    secure: &mut Securer,
) -> ServerBlock {
    let mut env = secure.map(&server.env);
    for var in &server.passthrough_env {
        env.insert(var.clone(), format!("${{{var}}}"));
    }
    if let Some(allowed) = &server.network {
        env.extend(proxy_env(name, allowed, table));
    }

    ServerBlock::new(name)
        .opt_str("type", dialect.type_field.then_some("stdio"))
        .str("container", secure.str(&server.container))
        .opt_str("entrypoint", server.entrypoint.as_deref().map(|e| secure.str(e)))
        .list("entrypointArgs", secure.list(&server.entrypoint_args))
        .list("mounts", secure.list(&server.mounts))
        .list("args", secure.list(&server.args))
        .map("env", env)
        .list("tools", tools_field(dialect, &server.allowed))
}

/// Env routing a container's traffic through its egress proxy.
pub fn proxy_env(name: &str, allowed: &[String], table: &EcosystemTable) -> BTreeMap<String, String> {
    let proxy = format!("http://{name}-proxy:{PROXY_PORT}");
    let domains = table.resolve_allowed_domains(&DomainPolicy::allowing(allowed.iter().cloned()));
    BTreeMap::from([
        ("AWC_PROXY_ALLOWED_DOMAINS".to_string(), domains.join(",")),
        ("HTTPS_PROXY".to_string(), proxy.clone()),
        ("HTTP_PROXY".to_string(), proxy),
    ])
}

/// `tools` is emitted only by dialects that require it; no allow-list means all.
fn tools_field(dialect: McpDialect, allowed: &[String]) -> Vec<String> {
    match (dialect.tools_field, allowed.is_empty()) {
        (false, _) => Vec::new(),
        (true, true) => vec!["*".to_string()],
        (true, false) => allowed.to_vec(),
    }
}

/// Routes every rendered value through the expression extractor.
struct Securer {
    map: ExpressionMap,
}

impl Securer {
    fn str(&mut self, s: &str) -> String {
        expr::secure(s, &mut self.map)
    }

    fn list(&mut self, items: &[String]) -> Vec<String> {
        items.iter().map(|item| self.str(item)).collect()
    }

    fn map(&mut self, entries: &BTreeMap<String, String>) -> BTreeMap<String, String> {
        entries.iter().map(|(k, v)| (k.clone(), self.str(v))).collect()
    }
}

#[cfg(test)]
#[path = "render_tests.rs"]
mod tests;
