// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Full compiles of realistic workflows.

use crate::prelude::*;
use crate::prelude::assert_eq;

const TRIAGE: &str = r#"
name: Issue Triage
on:
  issues:
    types: [opened]
engine: claude
permissions:
  contents: read
  issues: read
tools:
  github:
    allowed: [get_issue, list_labels]
  bash: ["echo", "ls"]
network:
  allowed: [defaults, python]
safe-outputs:
  add-comment:
  add-labels:
    allowed: [bug, question]
"#;

/// A triage workflow produces every job in dependency order.
#[test]
fn triage_workflow_compiles() {
    let project = Project::empty();
    project.file(
        "triage.md",
        &workflow(TRIAGE, "# Triage\n\nRead issue #${{ github.event.issue.number }} and label it."),
    );

    let passed = project.compile("triage.md").passes();
    passed.no_warnings();
    assert_eq!(
        passed.job_names(),
        vec!["activation", "agent", "detection", "add_comment", "add_labels", "safe_outputs"]
    );
    assert_eq!(passed.needs("agent"), vec!["activation"]);
    assert_eq!(passed.needs("safe_outputs"), vec!["add_comment", "add_labels"]);
    assert_eq!(passed.lock()["name"].as_str(), Some("Issue Triage"));
}

/// The prompt body carries no template expressions; they move to step env.
#[test]
fn prompt_expressions_move_to_env() {
    let project = Project::empty();
    project.file("triage.md", &workflow(TRIAGE, "Issue ${{ github.event.issue.number }}"));

    let passed = project.compile("triage.md").passes();
    let step = passed.step("activation", "Create prompt");
    let run = step["run"].as_str().unwrap();
    assert!(!run.contains("${{"), "{run}");
    assert!(run.contains("envsubst"));
    let env = step["env"].as_mapping().unwrap();
    assert_eq!(env.len(), 1);
    assert!(env
        .values()
        .any(|v| v.as_str() == Some("${{ github.event.issue.number }}")));
}

/// Agent steps run in a fixed order.
#[test]
fn agent_steps_follow_fixed_order() {
    let project = Project::empty();
    project.file("triage.md", &workflow(TRIAGE, "# Triage"));

    let passed = project.compile("triage.md").passes();
    let names: Vec<&str> = passed.job("agent")["steps"]
        .as_sequence()
        .unwrap()
        .iter()
        .filter_map(|s| s["name"].as_str())
        .collect();
    let position = |name: &str| names.iter().position(|n| *n == name).unwrap();
    assert!(position("Checkout repository") < position("Download prompt"));
    assert!(position("Download prompt") < position("Write MCP config"));
    assert!(position("Write MCP config") < position("Run agent"));
    assert!(position("Run agent") < position("Collect safe outputs"));
    assert!(position("Collect safe outputs") < position("Upload agent output"));
}

/// Safe-output jobs wait for threat detection to succeed.
#[test]
fn safe_outputs_are_gated_on_detection() {
    let project = Project::empty();
    project.file("triage.md", &workflow(TRIAGE, "# Triage"));

    let passed = project.compile("triage.md").passes();
    assert_eq!(passed.needs("add_labels"), vec!["agent", "detection"]);
    let condition = passed.job("add_labels")["if"].as_str().unwrap();
    assert!(condition.contains("contains(needs.agent.outputs.output_types, 'add-labels')"));
    assert!(condition.contains("needs.detection.outputs.success == 'true'"));
    assert_eq!(passed.job("add_labels")["env"]["AWC_ADD_LABELS_ALLOWED"].as_str(), Some("bug,question"));
}

/// Compiling the same source twice yields the same document.
#[test]
fn compilation_is_deterministic() {
    let project = Project::empty();
    project.file("triage.md", &workflow(TRIAGE, "Issue ${{ github.event.issue.number }}"));

    let first = project.compile("triage.md").passes();
    let second = project.compile("triage.md").passes();
    assert_eq!(first.lock_text(), second.lock_text());
}
