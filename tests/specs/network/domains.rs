// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Which domains the agent may reach.

use crate::prelude::*;
use crate::prelude::assert_eq;

fn domains(frontmatter: &str) -> Vec<String> {
    let project = Project::empty();
    project.file("w.md", &workflow(frontmatter, "# W"));
    let passed = project.compile("w.md").passes();
    passed.compiled().spec.allowed_domains.get().cloned().unwrap()
}

fn has(domains: &[String], domain: &str) -> bool {
    domains.iter().any(|d| d == domain)
}

/// No `network:` means the defaults ecosystem plus the engine's own API.
#[test]
fn undeclared_network_uses_defaults() {
    let domains = domains("on: issues\nengine: claude");
    assert!(has(&domains, "crl3.digicert.com"));
    assert!(has(&domains, "api.anthropic.com"));
}

/// An empty allow-list denies everything except what the engine needs.
#[test]
fn empty_allow_list_keeps_only_engine_domains() {
    let domains = domains("on: issues\nengine: codex\nnetwork:\n  allowed: []");
    assert!(!has(&domains, "crl3.digicert.com"));
    assert!(has(&domains, "api.openai.com"));
}

/// Ecosystem ids expand to their member domains.
#[test]
fn ecosystems_expand() {
    let domains = domains("on: issues\nengine: codex\nnetwork:\n  allowed: [defaults, python]");
    assert!(has(&domains, "pypi.org"));
    assert!(has(&domains, "files.pythonhosted.org"));
    let mut sorted = domains.clone();
    sorted.sort();
    sorted.dedup();
    assert_eq!(domains, sorted);
}

/// HTTP MCP server hosts are reachable without listing them.
#[test]
fn http_server_hosts_are_added() {
    let domains = domains(
        "on: issues\nengine: codex\nnetwork:\n  allowed: []\nmcp-servers:\n  docs:\n    url: https://docs.example.com/mcp",
    );
    assert!(has(&domains, "docs.example.com"));
}

/// A blocked domain wins over every allow source.
#[test]
fn blocked_domains_win() {
    let project = Project::empty();
    project.file(
        "w.md",
        &workflow(
            "on: issues\nengine: codex\nnetwork:\n  allowed: [python]\n  blocked: [pypi.org, \"*.example.com\"]\nmcp-servers:\n  docs:\n    url: https://docs.example.com/mcp",
            "# W",
        ),
    );

    let passed = project.compile("w.md").passes();
    let spec = &passed.compiled().spec;
    let allowed = spec.allowed_domains.get().unwrap();
    assert!(!has(allowed, "pypi.org"));
    assert!(!has(allowed, "docs.example.com"));
    assert!(has(allowed, "pip.pypa.io"));
    assert_eq!(spec.blocked_domains.get().unwrap(), &vec!["*.example.com".to_string(), "pypi.org".to_string()]);
}

/// An unknown shorthand is rejected.
#[test]
fn unknown_shorthand_fails() {
    let project = Project::empty();
    project.file("w.md", &workflow("on: issues\nengine: codex\nnetwork: everything", "# W"));
    project.compile("w.md").fails().error_has("unknown network shorthand 'everything'");
}
