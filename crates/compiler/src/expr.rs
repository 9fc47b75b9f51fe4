// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Expression security.
//!
//! Every `${{ ... }}` template expression headed for a generated document is
//! lifted into an environment variable with a deterministic name. Renderers
//! only ever see the `${VAR}` reference; the variable → expression map goes
//! to the step that sets real env values and to the log-masking step.

use awc_core::Step;
use indexmap::IndexMap;
use regex::Regex;
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::LazyLock;

/// Regex pattern for `${{ expression }}`
// Allow expect here as the regex is compile-time verified to be valid
#[allow(clippy::expect_used)]
pub static EXPR_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)\$\{\{(.*?)\}\}").expect("constant regex pattern is valid")
});

#[allow(clippy::expect_used)]
static SECRET_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^secrets\.([A-Za-z_][A-Za-z0-9_]*)$").expect("constant regex pattern is valid")
});

/// `needs.<job>.outputs.<name>`, bare or inside `${{ }}`
#[allow(clippy::expect_used)]
static NEEDS_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\bneeds\.([A-Za-z_][A-Za-z0-9_-]*)\.outputs\b")
        .expect("constant regex pattern is valid")
});

pub const SECRET_PREFIX: &str = "AWC_SECRET_";
pub const EXPR_PREFIX: &str = "AWC_EXPR_";

/// Synthetic variable name → original expression body (trimmed).
pub type ExpressionMap = BTreeMap<String, String>;

/// Deterministic variable name for one expression body.
///
/// `secrets.NAME` maps to `AWC_SECRET_NAME`; anything else to
/// `AWC_EXPR_` plus the first 8 hex digits of its SHA-256.
pub fn var_name(expr: &str) -> String {
    let expr = expr.trim();
    if let Some(caps) = SECRET_PATTERN.captures(expr) {
        return format!("{SECRET_PREFIX}{}", &caps[1]);
    }
    let digest = Sha256::digest(expr.as_bytes());
    let hex: String = digest.iter().take(4).map(|b| format!("{b:02X}")).collect();
    format!("{EXPR_PREFIX}{hex}")
}

/// Find every distinct expression in `text`.
pub fn extract(text: &str) -> ExpressionMap {
    let mut map = ExpressionMap::new();
    extract_into(text, &mut map);
    map
}

/// Add the expressions in `text` to an existing map.
pub fn extract_into(text: &str, map: &mut ExpressionMap) {
    for caps in EXPR_PATTERN.captures_iter(text) {
        let expr = caps[1].trim();
        if map.values().any(|e| e == expr) {
            continue;
        }
        let base = var_name(expr);
        let mut name = base.clone();
        let mut n = 2;
        while map.get(&name).is_some_and(|e| e != expr) {
            name = format!("{base}_{n}");
            n += 1;
        }
        map.insert(name, expr.to_string());
    }
}

/// Replace each mapped expression with `${VAR}`. Unmapped expressions are left alone.
pub fn substitute(text: &str, map: &ExpressionMap) -> String {
    let reverse: BTreeMap<&str, &str> =
        map.iter().map(|(var, expr)| (expr.as_str(), var.as_str())).collect();
    EXPR_PATTERN
        .replace_all(text, |caps: &regex::Captures| match reverse.get(caps[1].trim()) {
            Some(var) => format!("${{{var}}}"),
            None => caps[0].to_string(),
        })
        .into_owned()
}

/// Extract and substitute in one pass, accumulating into `map`.
pub fn secure(text: &str, map: &mut ExpressionMap) -> String {
    extract_into(text, map);
    substitute(text, map)
}

pub fn contains_expression(text: &str) -> bool {
    EXPR_PATTERN.is_match(text)
}

/// Env block that sets each synthetic variable from its expression.
pub fn env_block(map: &ExpressionMap) -> IndexMap<String, String> {
    map.iter().map(|(var, expr)| (var.clone(), format!("${{{{ {expr} }}}}"))).collect()
}

/// Step that masks resolved secret values in the runner log.
///
/// Returns `None` when no secret expressions were lifted.
pub fn redaction_step(map: &ExpressionMap) -> Option<Step> {
    let secrets: Vec<(&String, &String)> =
        map.iter().filter(|(var, _)| var.starts_with(SECRET_PREFIX)).collect();
    if secrets.is_empty() {
        return None;
    }
    let script: String = secrets
        .iter()
        .map(|(var, _)| format!("if [ -n \"${var}\" ]; then echo \"::add-mask::${var}\"; fi\n"))
        .collect();
    let mut step = Step::run("Redact secrets in logs", script);
    for (var, expr) in secrets {
        step = step.with_env(var.as_str(), format!("${{{{ {expr} }}}}"));
    }
    Some(step)
}

/// Jobs whose outputs `text` references.
pub fn needs_references(text: &str) -> BTreeSet<String> {
    NEEDS_PATTERN.captures_iter(text).map(|caps| caps[1].to_string()).collect()
}

/// Remove every `${{ }}` expression that references the outputs of a job
/// `is_available` rejects. Returns the rewritten text and the removed expressions.
pub fn filter_needs_references(
    text: &str,
    is_available: impl Fn(&str) -> bool,
) -> (String, Vec<String>) {
    let mut removed = Vec::new();
    let filtered = EXPR_PATTERN
        .replace_all(text, |caps: &regex::Captures| {
            let unavailable = needs_references(&caps[1]).iter().any(|job| !is_available(job));
            if unavailable {
                removed.push(caps[0].to_string());
                String::new()
            } else {
                caps[0].to_string()
            }
        })
        .into_owned();
    (filtered, removed)
}

/// A job-level `if:` condition may be a bare expression. Returns `None`
/// when it references an unavailable job and must be dropped.
pub fn filter_condition(condition: &str, is_available: impl Fn(&str) -> bool) -> Option<String> {
    if needs_references(condition).iter().any(|job| !is_available(job)) {
        None
    } else {
        Some(condition.to_string())
    }
}

#[cfg(test)]
#[path = "expr_tests.rs"]
mod tests;
