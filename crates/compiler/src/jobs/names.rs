// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Sanitize free-form strings into valid job names.

/// Turn an arbitrary string into a job name matching `^[a-z_][a-z0-9_-]*$`.
///
/// Lowercases, drops quotes, replaces each run of other characters with a
/// single hyphen, and trims hyphens. An empty result becomes `job-{index}`;
/// a digit-leading one is prefixed with `job-`.
pub fn sanitize_job_name(raw: &str, index: usize) -> String {
    let lower = raw.to_lowercase();

    let mut name = String::with_capacity(lower.len());
    let mut last_was_hyphen = false;
    for ch in lower.chars().filter(|c| !matches!(c, '"' | '\'')) {
        if ch.is_ascii_lowercase() || ch.is_ascii_digit() || ch == '_' {
            name.push(ch);
            last_was_hyphen = false;
        } else if !last_was_hyphen {
            name.push('-');
            last_was_hyphen = true;
        }
    }

    let name = name.trim_matches('-');
    match name.chars().next() {
        None => format!("job-{index}"),
        Some(c) if c.is_ascii_digit() => format!("job-{name}"),
        Some(_) => name.to_string(),
    }
}

#[cfg(test)]
#[path = "names_tests.rs"]
mod tests;
