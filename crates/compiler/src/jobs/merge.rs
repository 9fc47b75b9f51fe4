// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Merge imported jobs, steps, and services into the local declarations.
//!
//! Each fragment is parsed on its own; a malformed fragment is skipped and
//! never fails the compile. On a name collision the local declaration wins.
//! Merging the same fragment twice is a no-op.

use crate::imports::Fragment;
use awc_core::{CustomJob, Step, Warning};
use indexmap::map::Entry;
use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde_yaml::Value;

pub fn merge_jobs(target: &mut IndexMap<String, CustomJob>, fragments: &[Fragment]) -> Vec<Warning> {
    merge_maps(target, fragments, "jobs")
}

pub fn merge_services(target: &mut IndexMap<String, Value>, fragments: &[Fragment]) -> Vec<Warning> {
    merge_maps(target, fragments, "services")
}

/// Imported steps run before local ones. Steps are identified by `id`,
/// then `name`; anonymous steps by their full content.
pub fn merge_steps(target: &mut Vec<Step>, fragments: &[Fragment]) -> Vec<Warning> {
    let mut warnings = Vec::new();
    let mut imported: Vec<Step> = Vec::new();

    for fragment in fragments {
        let Some(steps) = parse::<Vec<Step>>(fragment, "steps") else { continue };
        for step in steps {
            if target.contains(&step) || imported.contains(&step) {
                continue;
            }
            if let Some(key) = step_key(&step) {
                if target.iter().any(|s| step_key(s).as_ref() == Some(&key)) {
                    warnings.push(local_override("steps", &key, fragment));
                    continue;
                }
                if imported.iter().any(|s| step_key(s).as_ref() == Some(&key)) {
                    continue;
                }
            }
            imported.push(step);
        }
    }

    if !imported.is_empty() {
        imported.append(target);
        *target = imported;
    }
    warnings
}

fn step_key(step: &Step) -> Option<String> {
    step.id.clone().or_else(|| step.name.clone())
}

fn merge_maps<V: DeserializeOwned + PartialEq>(
    target: &mut IndexMap<String, V>,
    fragments: &[Fragment],
    section: &'static str,
) -> Vec<Warning> {
    let mut warnings = Vec::new();
    let local: Vec<String> = target.keys().cloned().collect();

    for fragment in fragments {
        let Some(entries) = parse::<IndexMap<String, V>>(fragment, section) else { continue };
        for (name, value) in entries {
            match target.entry(name) {
                Entry::Occupied(e) if e.get() == &value => {}
                Entry::Occupied(e) if local.contains(e.key()) => {
                    warnings.push(local_override(section, e.key(), fragment));
                }
                Entry::Occupied(e) => {
                    tracing::debug!(section, name = %e.key(), source = %fragment.source, "earlier import wins");
                }
                Entry::Vacant(e) => {
                    e.insert(value);
                }
            }
        }
    }
    warnings
}

/// YAML is a superset of JSON, so one parser covers both.
fn parse<T: DeserializeOwned>(fragment: &Fragment, section: &'static str) -> Option<T> {
    match serde_yaml::from_str::<T>(&fragment.text) {
        Ok(parsed) => Some(parsed),
        Err(e) => {
            tracing::warn!(section, source = %fragment.source, error = %e, "skipping malformed import fragment");
            None
        }
    }
}

fn local_override(section: &str, name: &str, fragment: &Fragment) -> Warning {
    Warning::new(
        format!("{section}.{name}"),
        format!("local declaration overrides the one imported from {}", fragment.source),
    )
}

#[cfg(test)]
#[path = "merge_tests.rs"]
mod tests;
