// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job ordering and gating.

use crate::prelude::*;
use crate::prelude::assert_eq;

/// The smallest workflow runs activation then the agent.
#[test]
fn minimal_workflow() {
    let project = Project::empty();
    project.file("w.md", &workflow("on: issues\nengine: codex", "# W"));

    let passed = project.compile("w.md").passes();
    assert_eq!(passed.job_names(), vec!["activation", "agent"]);
    assert!(!passed.has_job("pre_activation"));
    assert!(passed.job("activation")["if"].is_null());
}

/// A command trigger adds a membership and command check ahead of activation.
#[test]
fn command_trigger_is_gated() {
    let project = Project::empty();
    project.file("bot.md", &workflow("on:\n  command: triage\nengine: codex", "# Bot"));

    let passed = project.compile("bot.md").passes();
    assert_eq!(passed.job_names(), vec!["pre_activation", "activation", "agent"]);
    assert_eq!(passed.needs("activation"), vec!["pre_activation"]);
    assert_eq!(
        passed.job("activation")["if"].as_str(),
        Some("needs.pre_activation.outputs.activated == 'true'")
    );
    assert_eq!(
        passed.step("pre_activation", "Check command position")["env"]["AWC_COMMAND"].as_str(),
        Some("triage")
    );
}

/// Custom jobs that only need `pre_activation` run before activation.
#[test]
fn pre_activation_jobs_run_first() {
    let project = Project::empty();
    project.file(
        "w.md",
        &workflow(
            "on: issues\nengine: codex\njobs:\n  guard:\n    needs: pre_activation\n    steps:\n      - run: ./guard.sh",
            "# W",
        ),
    );

    let passed = project.compile("w.md").passes();
    assert_eq!(passed.job_names(), vec!["pre_activation", "guard", "activation", "agent"]);
    assert_eq!(passed.needs("activation"), vec!["guard", "pre_activation"]);
}

/// Custom jobs default to running after activation; the agent waits only for
/// the ones that do not follow it.
#[test]
fn custom_jobs_around_the_agent() {
    let project = Project::empty();
    project.file(
        "w.md",
        &workflow(
            r#"on: issues
engine: codex
safe-outputs:
  create-issue:
jobs:
  prepare:
    steps:
      - run: ./prepare.sh
  notify:
    needs: [create_issue]
    steps:
      - run: ./notify.sh"#,
            "# W",
        ),
    );

    let passed = project.compile("w.md").passes();
    assert_eq!(passed.needs("prepare"), vec!["activation"]);
    assert_eq!(passed.needs("agent"), vec!["activation", "prepare"]);
    assert_eq!(passed.needs("notify"), vec!["create_issue"]);
    let names = passed.job_names();
    let at = |n: &str| names.iter().position(|x| x == n).unwrap();
    assert!(at("create_issue") < at("notify"));
}

/// A reference to a job that runs later is removed with a warning.
#[test]
fn forward_reference_is_removed() {
    let project = Project::empty();
    project.file(
        "w.md",
        &workflow(
            "on: issues\nengine: codex\nsafe-outputs:\n  create-issue:",
            "Earlier result: ${{ needs.agent.outputs.output }}",
        ),
    );

    let passed = project.compile("w.md").passes();
    passed.warns("does not run before 'activation'");
    let run = passed.step("activation", "Create prompt")["run"].as_str().unwrap();
    assert!(!run.contains("needs.agent"));
}

/// Job names that the runner would reject are renamed.
#[test]
fn invalid_job_names_are_renamed() {
    let project = Project::empty();
    project.file(
        "w.md",
        &workflow(
            "on: issues\nengine: codex\njobs:\n  \"Build Docs\":\n    steps:\n      - run: make docs",
            "# W",
        ),
    );

    let passed = project.compile("w.md").passes();
    passed.warns("renamed to 'build-docs'");
    assert!(passed.has_job("build-docs"));
}

/// A job that needs a job nobody declared fails the compile.
#[test]
fn unknown_needs_fail() {
    let project = Project::empty();
    project.file(
        "w.md",
        &workflow(
            "on: issues\nengine: codex\njobs:\n  lint:\n    needs: [ghost]\n    steps:\n      - run: make lint",
            "# W",
        ),
    );

    project.compile("w.md").fails().error_has("unknown job 'ghost'");
}
