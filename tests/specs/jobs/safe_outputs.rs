// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Jobs that apply the agent's requested changes.

use crate::prelude::*;
use crate::prelude::assert_eq;

fn compile(frontmatter: &str) -> Passed {
    let project = Project::empty();
    project.file("w.md", &workflow(frontmatter, "# W"));
    project.compile("w.md").passes()
}

/// One output type gets one job and no consolidation job.
#[test]
fn single_type() {
    let passed = compile("on: issues\nengine: codex\nsafe-outputs:\n  create-issue:");
    assert_eq!(passed.job_names(), vec!["activation", "agent", "detection", "create_issue"]);
    assert_eq!(passed.needs("create_issue"), vec!["agent", "detection"]);
    assert_eq!(passed.job("create_issue")["permissions"]["issues"].as_str(), Some("write"));
    assert_eq!(passed.job("agent")["permissions"]["contents"].as_str(), Some("read"));
}

/// The agent job itself never gets write access for safe outputs.
#[test]
fn agent_only_collects() {
    let passed = compile("on: issues\nengine: codex\nsafe-outputs:\n  create-issue:");
    assert!(passed.job("agent")["permissions"]["issues"].is_null());
    assert_eq!(
        passed.step("agent", "Collect safe outputs")["env"]["AWC_ALLOWED_OUTPUTS"].as_str(),
        Some("create-issue")
    );
    assert!(passed.job("agent")["outputs"]["output_types"].is_string());
}

/// A comment links back to the issue created in the same run.
#[test]
fn add_comment_waits_for_create_issue() {
    let passed = compile("on: issues\nengine: codex\nsafe-outputs:\n  create-issue:\n  add-comment:");
    assert_eq!(passed.needs("add_comment"), vec!["agent", "detection", "create_issue"]);
    assert_eq!(
        passed.job("add_comment")["env"]["AWC_CREATED_ISSUE_NUMBER"].as_str(),
        Some("${{ needs.create_issue.outputs.issue_number }}")
    );
    assert_eq!(passed.needs("safe_outputs"), vec!["create_issue", "add_comment"]);
    assert_eq!(passed.job("safe_outputs")["if"].as_str(), Some("always()"));
}

/// Turning threat detection off drops the detection job and its gate.
#[test]
fn without_threat_detection() {
    let passed =
        compile("on: issues\nengine: codex\nsafe-outputs:\n  threat-detection: false\n  add-labels:");
    assert!(!passed.has_job("detection"));
    assert_eq!(passed.needs("add_labels"), vec!["agent"]);
    let condition = passed.job("add_labels")["if"].as_str().unwrap();
    assert!(!condition.contains("detection"));
}

/// Per-type limits and settings are passed to the job.
#[test]
fn limits_are_wired() {
    let passed = compile(
        "on: issues\nengine: codex\nsafe-outputs:\n  staged: true\n  create-issue:\n    max: 2\n    title-prefix: \"[bot] \"\n    labels: [automation]",
    );
    let env = &passed.job("create_issue")["env"];
    assert_eq!(env["AWC_CREATE_ISSUE_MAX"].as_str(), Some("2"));
    assert_eq!(env["AWC_CREATE_ISSUE_TITLE_PREFIX"].as_str(), Some("[bot] "));
    assert_eq!(env["AWC_CREATE_ISSUE_LABELS"].as_str(), Some("automation"));
    assert_eq!(env["AWC_SAFE_OUTPUTS_STAGED"].as_str(), Some("true"));
}

/// Without safe outputs the agent collects nothing and nothing follows it.
#[test]
fn no_safe_outputs() {
    let passed = compile("on: issues\nengine: codex");
    assert_eq!(passed.job_names(), vec!["activation", "agent"]);
    assert!(passed.job("agent")["outputs"].is_null());
    passed.lock_lacks("Collect safe outputs");
}
