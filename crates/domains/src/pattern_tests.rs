// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[yare::parameterized(
    exact               = { "pypi.org",            "pypi.org",                 true },
    exact_mismatch      = { "pypi.org",            "files.pypi.org",           false },
    wildcard_subdomain  = { "*.pythonhosted.org",  "files.pythonhosted.org",   true },
    wildcard_deep       = { "*.pythonhosted.org",  "a.b.pythonhosted.org",     true },
    wildcard_bare       = { "*.pythonhosted.org",  "pythonhosted.org",         true },
    wildcard_lookalike  = { "*.pythonhosted.org",  "evilpythonhosted.org",     false },
    case_insensitive    = { "PyPI.org",            "pypi.ORG",                 true },
)]
fn pattern_matching(pattern: &str, domain: &str, expected: bool) {
    assert_eq!(pattern_matches(pattern, domain), expected);
}

#[yare::parameterized(
    simple          = { "example.com",        true },
    subdomain       = { "api.example.com",    true },
    wildcard        = { "*.example.com",      true },
    hyphenated      = { "my-host.example.com", true },
    bare_star       = { "*",                  false },
    single_label    = { "localhost",          false },
    empty_label     = { "example..com",       false },
    leading_hyphen  = { "-bad.example.com",   false },
    scheme          = { "https://example.com", false },
    inner_wildcard  = { "api.*.example.com",  false },
)]
fn domain_validity(input: &str, expected: bool) {
    assert_eq!(is_valid_domain_pattern(input), expected);
}

#[test]
fn host_matches_any_pattern() {
    let patterns = vec!["pypi.org".to_string(), "*.docker.io".to_string()];
    assert!(host_matches(&patterns, "registry-1.docker.io"));
    assert!(!host_matches(&patterns, "npmjs.org"));
}
