// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The egress firewall and the runtime sandbox around the agent.

use crate::prelude::*;
use crate::prelude::assert_eq;

fn compile(frontmatter: &str) -> Passed {
    let project = Project::empty();
    project.file("w.md", &workflow(frontmatter, "# W"));
    project.compile("w.md").passes()
}

fn agent_command(passed: &Passed) -> String {
    passed.step("agent", "Run agent")["run"].as_str().unwrap().to_string()
}

/// A restricted network puts a firewall-capable engine behind awf.
#[test]
fn restricted_network_wraps_the_agent() {
    let passed = compile("on: issues\nengine: claude\nnetwork:\n  allowed: [defaults]");
    let command = agent_command(&passed);
    assert!(command.starts_with("sudo -E awf --env-all"), "{command}");
    assert!(command.contains("--allow-domains '"));
    assert!(command.contains("api.anthropic.com"));
    assert!(command.contains(" -- claude --print"));
    passed.step("agent", "Install awf");
    assert_eq!(passed.compiled().spec.firewall_enabled.get(), Some(&true));
}

/// Firewall options are passed to the wrapper.
#[test]
fn firewall_options() {
    let passed = compile(
        "on: issues\nengine: claude\nnetwork:\n  allowed: [defaults]\n  firewall:\n    version: v0.9.1\n    log-level: debug",
    );
    assert!(agent_command(&passed).contains("--log-level 'debug' --"));
    let install = passed.step("agent", "Install awf")["run"].as_str().unwrap();
    assert!(install.contains("v0.9.1"));
}

/// Engines without firewall support run unwrapped.
#[test]
fn codex_runs_unwrapped() {
    let passed = compile("on: issues\nengine: codex\nnetwork:\n  allowed: [defaults]");
    assert!(!agent_command(&passed).contains("awf"));
    passed.lock_lacks("Install awf");
}

/// Without a declared network nothing is wrapped.
#[test]
fn open_network_runs_unwrapped() {
    let passed = compile("on: issues\nengine: claude");
    assert!(agent_command(&passed).starts_with("claude --print"));
}

/// The runtime sandbox replaces the firewall and gets its own settings file.
#[test]
fn runtime_sandbox() {
    let passed = compile(
        "on: issues\nengine: claude\nnetwork:\n  allowed: [python]\n  blocked: [pypi.org]\nsandbox:\n  agent: srt",
    );
    let command = agent_command(&passed);
    assert!(command.starts_with("srt --settings /tmp/awc/sandbox/srt-settings.json -- claude"), "{command}");
    passed.step("agent", "Install srt");
    let settings = passed.step("agent", "Write sandbox settings")["run"].as_str().unwrap();
    assert!(settings.contains("\"allowedDomains\""));
    assert!(settings.contains("\"deniedDomains\""));
    assert!(settings.contains("\"pip.pypa.io\""));
    passed.lock_lacks("sudo -E awf");
}

/// The firewall and the runtime sandbox cannot both be asked for.
#[test]
fn firewall_and_srt_conflict() {
    let project = Project::empty();
    project.file(
        "w.md",
        &workflow("on: issues\nengine: claude\nnetwork:\n  firewall: true\nsandbox:\n  agent: srt", "# W"),
    );
    project.compile("w.md").fails().error_has("'srt' cannot be combined with network.firewall");
}
