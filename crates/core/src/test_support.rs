// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test helpers for use across crates.
//!
//! Gated behind `#[cfg(any(test, feature = "test-support"))]`.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use crate::{split_frontmatter, ErrorCollector, ErrorMode, WorkflowSpec};

// ── Proptest strategies ─────────────────────────────────────────────────

/// Proptest strategies for workflow inputs.
pub mod strategies {
    use proptest::prelude::*;

    /// A single `${{ ... }}` expression body drawn from realistic contexts.
    pub fn arb_expression_body() -> impl Strategy<Value = String> {
        prop_oneof![
            "[A-Z][A-Z0-9_]{0,12}".prop_map(|s| format!("secrets.{s}")),
            "[a-z_]{1,10}".prop_map(|s| format!("github.event.issue.{s}")),
            ("[a-z_]{1,8}", "[a-z_]{1,8}").prop_map(|(j, o)| format!("needs.{j}.outputs.{o}")),
            "[a-z]{1,8}".prop_map(|s| format!("env.{s}")),
        ]
    }

    /// Free text that never contains expression syntax.
    pub fn arb_plain_text() -> impl Strategy<Value = String> {
        "[a-zA-Z0-9 .,:/_-]{0,24}"
    }

    /// Raw job names including punctuation that needs sanitizing.
    pub fn arb_raw_job_name() -> impl Strategy<Value = String> {
        "[A-Za-z0-9 :.,/'\"_-]{0,24}"
    }
}

// ── Workflow fixtures ───────────────────────────────────────────────────

/// Parse a full workflow source (frontmatter + markdown), panicking on error.
pub fn workflow(id: &str, source: &str) -> WorkflowSpec {
    try_workflow(id, source).unwrap()
}

/// Parse a workflow source, returning collected errors.
pub fn try_workflow(id: &str, source: &str) -> Result<WorkflowSpec, crate::CompileError> {
    let (fm, body) = split_frontmatter(source).expect("valid frontmatter");
    let mut errors = ErrorCollector::new(ErrorMode::CollectAll);
    let spec = WorkflowSpec::from_frontmatter(id, fm, body, &mut errors)?;
    errors.finish()?;
    Ok(spec)
}

/// Parse frontmatter YAML alone with an empty prompt.
pub fn frontmatter(yaml: &str) -> WorkflowSpec {
    workflow("test-workflow", &format!("---\n{yaml}\n---\n# Test\n"))
}
