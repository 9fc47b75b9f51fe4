// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Strict mode refuses workflows that give the agent too much reach.

use crate::prelude::*;

fn strict(frontmatter: &str) -> Outcome {
    let project = Project::empty();
    project.file("w.md", &workflow(&format!("strict: true\n{frontmatter}"), "# W"));
    project.compile("w.md")
}

/// Write access goes through safe outputs, never the agent job.
#[test]
fn write_permissions_are_refused() {
    strict("on: issues\nengine: codex\npermissions:\n  contents: write")
        .fails()
        .error_has("permissions.contents: write not allowed; use safe-outputs");
}

/// Read-only workflows with an explicit network pass.
#[test]
fn read_only_workflow_passes() {
    let passed = strict(
        "on: issues\nengine: claude\npermissions:\n  contents: read\nnetwork:\n  allowed: [defaults, python]\nsafe-outputs:\n  add-comment:",
    )
    .passes();
    passed.no_warnings();
    assert!(passed.has_job("add_comment"));
}

/// Every violation is reported together by default.
#[test]
fn violations_are_collected() {
    strict(
        "on: issues\nengine: codex\npermissions:\n  contents: write\n  issues: write\nnetwork:\n  allowed: [\"*\"]",
    )
    .fails()
    .error_count(3)
    .error_has("permissions.issues")
    .error_has("'*' allows every domain");
}

/// Fail-fast mode stops at the first violation.
#[test]
fn fail_fast_stops_early() {
    let project = Project::empty();
    project.file(
        "w.md",
        &workflow("strict: true\non: issues\nengine: codex\npermissions:\n  contents: write\n  issues: write", "# W"),
    );
    let compiler = Compiler::new(
        CompilerConfig::default().error_mode(awc_core::ErrorMode::FailFast),
    )
    .unwrap();
    project.compile_with(&compiler, "w.md").fails().error_count(1);
}

/// Turning the firewall off for a restricted network needs the runtime sandbox instead.
#[test]
fn firewall_cannot_be_turned_off() {
    strict("on: issues\nengine: claude\nnetwork:\n  allowed: [defaults]\n  firewall: false")
        .fails()
        .error_has("the claude engine must run behind the firewall");
}

/// Container servers need a top-level network allow-list.
#[test]
fn container_servers_need_network_allow_list() {
    strict("on: issues\nengine: codex\nmcp-servers:\n  notion:\n    container: mcp/notion")
        .fails()
        .error_has("mcp-servers.notion: container servers need a top-level network allow-list");

    strict("on: issues\nengine: codex\nnetwork:\n  allowed: [python]\nmcp-servers:\n  notion:\n    container: mcp/notion")
        .passes();
}

/// A literal domain that belongs to an ecosystem is allowed with a hint.
#[test]
fn ecosystem_hint_is_a_warning() {
    strict("on: issues\nengine: codex\nnetwork:\n  allowed: [defaults, pypi.org]")
        .passes()
        .warns("consider using 'python'");
}

/// Deprecated fields are refused in strict mode and only flagged otherwise.
#[test]
fn deprecated_fields() {
    strict("on: issues\nengine: codex\nnetwork: defaults\ntimeout_minutes: 20")
        .fails()
        .error_has("timeout_minutes: deprecated field; use 'timeout-minutes' instead");

    let project = Project::empty();
    project.file("w.md", &workflow("on: issues\nengine: codex\ntimeout_minutes: 20", "# W"));
    project.compile("w.md").passes().warns("deprecated; use 'timeout-minutes' instead");
}

/// A config-level default applies to workflows that do not choose.
#[test]
fn configured_default_applies() {
    let project = Project::empty();
    project.file(
        "w.md",
        &workflow("on: issues\nengine: codex\npermissions:\n  contents: write", "# W"),
    );
    let compiler = Compiler::new(CompilerConfig::default().strict(true)).unwrap();
    project.compile_with(&compiler, "w.md").fails().error_has("permissions.contents");
    project.compile("w.md").passes();
}

/// Non-strict workflows are not policed.
#[test]
fn non_strict_allows_writes() {
    let project = Project::empty();
    project.file(
        "w.md",
        &workflow("on: issues\nengine: codex\npermissions:\n  contents: write", "# W"),
    );
    project.compile("w.md").passes().no_warnings();
}
