// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use crate::prelude::*;
use crate::prelude::assert_eq;
use awc_compiler::lock_path;
use std::path::{Path, PathBuf};

/// The workflow id is the file name without its extension.
#[test]
fn id_comes_from_file_stem() {
    let project = Project::empty();
    project.file("weekly-report.md", &workflow("on: issues\nengine: codex", "# Report"));

    let passed = project.compile("weekly-report.md").passes();
    assert_eq!(passed.compiled().spec.id, "weekly-report");
}

/// Without `name:`, the first markdown heading names the workflow.
#[test]
fn name_falls_back_to_heading() {
    let project = Project::empty();
    project.file("nightly.md", &workflow("on: issues\nengine: codex", "# Nightly build\n\nCheck it."));

    let passed = project.compile("nightly.md").passes();
    assert_eq!(passed.lock()["name"].as_str(), Some("Nightly build"));
}

/// The header names the source file.
#[test]
fn header_names_the_source() {
    let project = Project::empty();
    project.file("nightly.md", &workflow("on: issues\nengine: codex", "# Nightly"));

    let passed = project.compile("nightly.md").passes();
    assert!(passed
        .lock_text()
        .starts_with("# This file was generated by awc from nightly.md. Do not edit it by hand.\n"));
}

/// A tracker id is carried into the header.
#[test]
fn tracker_id_is_in_header() {
    let project = Project::empty();
    project.file(
        "tracked.md",
        &workflow("on: issues\nengine: codex\ntracker-id: triage-42", "# Tracked"),
    );

    project.compile("tracked.md").passes().lock_has("# tracker-id: triage-42\n");
}

/// A workflow without triggers can still be run by hand.
#[test]
fn no_triggers_means_manual_dispatch() {
    let project = Project::empty();
    project.file("manual.md", &workflow("engine: codex", "# Manual"));

    let passed = project.compile("manual.md").passes();
    assert!(passed.lock()["on"]
        .as_mapping()
        .unwrap()
        .contains_key("workflow_dispatch"));
}

#[test]
fn lock_document_sits_next_to_source() {
    assert_eq!(
        lock_path(Path::new(".github/workflows/triage.md")),
        PathBuf::from(".github/workflows/triage.lock.yml")
    );
}

/// A missing source file is an I/O error naming the path.
#[test]
fn missing_source_fails() {
    let project = Project::empty();
    project.compile("absent.md").fails().error_has("absent.md");
}
