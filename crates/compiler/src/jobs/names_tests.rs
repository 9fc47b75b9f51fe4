// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use awc_core::is_valid_job_name;
use awc_core::test_support::strategies::arb_raw_job_name;
use proptest::prelude::*;
use yare::parameterized;

#[parameterized(
    punctuation = { "Test:Workflow.Name,Here/There", "test-workflow-name-here-there" },
    quotes = { "\"Build\" 'it'", "build-it" },
    spaces = { "  Run   the   tests  ", "run-the-tests" },
    underscores = { "deploy_prod", "deploy_prod" },
    hyphen_runs = { "a---b", "a-b" },
    unicode = { "café→bar", "caf-bar" },
    digit_leading = { "2nd pass", "job-2nd-pass" },
    empty = { "", "job-3" },
    only_symbols = { "!!!", "job-3" },
)]
fn sanitize(raw: &str, expected: &str) {
    assert_eq!(sanitize_job_name(raw, 3), expected);
}

#[test]
fn already_valid_names_are_unchanged() {
    for name in ["agent", "pre_activation", "create_issue", "lint-2"] {
        assert_eq!(sanitize_job_name(name, 0), name);
    }
}

proptest! {
    #[test]
    fn output_is_always_a_valid_job_name(raw in arb_raw_job_name(), index in 0usize..100) {
        let name = sanitize_job_name(&raw, index);
        prop_assert!(is_valid_job_name(&name), "{raw:?} -> {name:?}");
    }

    #[test]
    fn sanitizing_is_idempotent(raw in arb_raw_job_name()) {
        let once = sanitize_job_name(&raw, 0);
        prop_assert_eq!(sanitize_job_name(&once, 0), once.clone());
    }
}
