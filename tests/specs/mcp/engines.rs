// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Each engine gets its own MCP dialect and command line.

use crate::prelude::*;
use crate::prelude::assert_eq;

const NOTION: &str = r#"mcp-servers:
  notion:
    container: mcp/notion
    env:
      NOTION_TOKEN: ${{ secrets.NOTION_TOKEN }}
    allowed: [search]"#;

fn compile(engine: &str, extra: &str) -> Passed {
    let project = Project::empty();
    project.file("w.md", &workflow(&format!("on: issues\nengine: {engine}\n{extra}"), "# W"));
    project.compile("w.md").passes()
}

fn run<'a>(passed: &'a Passed, step: &str) -> &'a str {
    passed.step("agent", step)["run"].as_str().unwrap()
}

/// Claude reads a JSON config and gets an explicit tool allow-list.
#[test]
fn claude_uses_json_and_allowed_tools() {
    let passed = compile("claude", &format!("tools:\n  bash: [\"git status\"]\n{NOTION}"));
    let write = run(&passed, "Write MCP config");
    assert!(write.contains("cat > /tmp/awc/mcp-config/mcp-servers.json.tmpl"));
    assert!(write.contains("\"mcpServers\""));

    let agent = run(&passed, "Run agent");
    assert!(agent.starts_with("claude --print --mcp-config /tmp/awc/mcp-config/mcp-servers.json"));
    assert!(agent.contains("--allowed-tools"));
    assert!(agent.contains("Bash(git status)"));
    assert!(agent.contains("mcp__notion__search"));
    assert_eq!(
        passed.step("agent", "Run agent")["env"]["ANTHROPIC_API_KEY"].as_str(),
        Some("${{ secrets.ANTHROPIC_API_KEY }}")
    );
}

/// Codex reads a TOML config.
#[test]
fn codex_uses_toml() {
    let passed = compile("codex", NOTION);
    let write = run(&passed, "Write MCP config");
    assert!(write.contains("/tmp/awc/mcp-config/config.toml"));
    assert!(write.contains("[mcp_servers.notion]"));
    assert!(write.contains("[mcp_servers.github]"));
    assert_eq!(passed.compiled().spec.mcp_config.get().unwrap().format, awc_core::McpFormat::Toml);
}

/// Copilot entries carry a transport type and default to every tool.
#[test]
fn copilot_entries_are_typed() {
    let passed = compile(
        "copilot",
        "tools:\n  github: false\nmcp-servers:\n  docs:\n    url: https://docs.example.com/mcp",
    );
    let write = run(&passed, "Write MCP config");
    assert!(write.contains("/home/runner/.copilot/mcp-config.json"));
    assert!(write.contains(r#""type": "http""#));
    assert!(write.contains(r#""tools": ["*"]"#));
}

/// A custom engine runs the declared command with the prompt and config paths.
#[test]
fn custom_engine_runs_declared_command() {
    let passed = compile("\n  id: custom\n  command: ./bin/agent", "");
    let step = passed.step("agent", "Run agent");
    assert!(step["run"].as_str().unwrap().starts_with("./bin/agent"));
    assert_eq!(step["env"]["AWC_PROMPT"].as_str(), Some("/tmp/awc/prompts/prompt.txt"));
    assert_eq!(
        step["env"]["AWC_MCP_CONFIG"].as_str(),
        Some("/tmp/awc/mcp-config/mcp-servers.json")
    );
}

/// An unknown engine id is rejected.
#[test]
fn unknown_engine_fails() {
    let project = Project::empty();
    project.file("w.md", &workflow("on: issues\nengine: gpt-pilot", "# W"));
    project.compile("w.md").fails().error_has("engine");
}
