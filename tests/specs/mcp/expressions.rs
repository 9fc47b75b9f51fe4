// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Template expressions never reach a shell script directly.

use crate::prelude::*;
use crate::prelude::assert_eq;

const SERVERS: &str = r#"on: issues
engine: claude
mcp-servers:
  notion:
    container: mcp/notion
    env:
      NOTION_TOKEN: ${{ secrets.NOTION_TOKEN }}
    allowed: [search]
  docs:
    url: https://docs.example.com/mcp
    headers:
      X-Run: ${{ github.run_id }}"#;

fn compile() -> Passed {
    let project = Project::empty();
    project.file("w.md", &workflow(SERVERS, "# W"));
    project.compile("w.md").passes()
}

/// The MCP config script only sees environment variables.
#[test]
fn config_script_has_no_expressions() {
    let passed = compile();
    let step = passed.step("agent", "Write MCP config");
    let run = step["run"].as_str().unwrap();
    assert!(!run.contains("${{"), "{run}");
    assert!(run.contains("${AWC_SECRET_NOTION_TOKEN}"));
    assert!(run.contains("envsubst"));

    let env = &step["env"];
    assert_eq!(env["AWC_SECRET_NOTION_TOKEN"].as_str(), Some("${{ secrets.NOTION_TOKEN }}"));
    let values: Vec<&str> = env.as_mapping().unwrap().values().filter_map(Value::as_str).collect();
    assert!(values.contains(&"${{ github.run_id }}"));
    assert!(values.contains(&"${{ secrets.AWC_GITHUB_TOKEN || secrets.GITHUB_TOKEN }}"));
}

/// Lifted secrets are masked before the agent runs.
#[test]
fn secrets_are_masked() {
    let passed = compile();
    let step = passed.step("agent", "Redact secrets in logs");
    let run = step["run"].as_str().unwrap();
    assert!(run.contains("::add-mask::$AWC_SECRET_NOTION_TOKEN"));
    assert!(!run.contains("AWC_EXPR_"));
}

/// The same expression used twice maps to one variable.
#[test]
fn repeated_prompt_expressions_share_a_variable() {
    let project = Project::empty();
    project.file(
        "w.md",
        &workflow(
            "on: issues\nengine: codex",
            "Issue ${{ github.event.issue.number }}.\nAgain: ${{ github.event.issue.number }}.\nBy ${{ github.actor }}.",
        ),
    );

    let passed = project.compile("w.md").passes();
    let step = passed.step("activation", "Create prompt");
    assert_eq!(step["env"].as_mapping().unwrap().len(), 2);
    assert!(!step["run"].as_str().unwrap().contains("${{"));
}

/// A prompt without expressions is written verbatim.
#[test]
fn plain_prompt_is_written_directly() {
    let project = Project::empty();
    project.file("w.md", &workflow("on: issues\nengine: codex", "# Plain\n\nNothing to expand."));

    let passed = project.compile("w.md").passes();
    let step = passed.step("activation", "Create prompt");
    let run = step["run"].as_str().unwrap();
    assert!(run.contains("cat > /tmp/awc/prompts/prompt.txt << 'AWC_EOF'"));
    assert!(!run.contains("envsubst"));
    assert!(step["env"].is_null());
}
