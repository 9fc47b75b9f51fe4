// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Domain pattern matching.
//!
//! A pattern is either an exact host (`pypi.org`) or a leading wildcard
//! (`*.pythonhosted.org`). The wildcard form matches the bare suffix and any
//! subdomain of it.

/// Returns true if `domain` is covered by `pattern`.
pub fn pattern_matches(pattern: &str, domain: &str) -> bool {
    let pattern = pattern.to_ascii_lowercase();
    let domain = domain.to_ascii_lowercase();
    match pattern.strip_prefix("*.") {
        Some(suffix) => {
            domain == suffix
                || domain
                    .strip_suffix(suffix)
                    .is_some_and(|head| head.ends_with('.') && head.len() > 1)
        }
        None => pattern == domain,
    }
}

/// Returns true if any pattern in `patterns` covers `domain`.
pub fn host_matches<'a>(patterns: impl IntoIterator<Item = &'a String>, domain: &str) -> bool {
    patterns.into_iter().any(|p| pattern_matches(p, domain))
}

/// Check that `s` is a syntactically valid domain or leading-wildcard pattern.
///
/// Labels are 1-63 characters of `[a-z0-9-]`, must not start or end with a
/// hyphen, and there must be at least two labels. A bare `*` is not a
/// pattern; callers treat it separately.
pub fn is_valid_domain_pattern(s: &str) -> bool {
    let host = s.strip_prefix("*.").unwrap_or(s);
    if host.is_empty() || host.len() > 253 {
        return false;
    }
    let labels: Vec<&str> = host.split('.').collect();
    if labels.len() < 2 {
        return false;
    }
    labels.iter().all(|label| {
        !label.is_empty()
            && label.len() <= 63
            && !label.starts_with('-')
            && !label.ends_with('-')
            && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
    })
}

#[cfg(test)]
#[path = "pattern_tests.rs"]
mod tests;
