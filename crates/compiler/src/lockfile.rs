// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Render the compiled workflow as a lock document.

use awc_core::{CompileError, JobGraph, WorkflowSpec};
use serde_yaml::{Mapping, Value};

/// Top-level keys copied from the frontmatter, in emission order.
const TOP_LEVEL_PASSTHROUGH: &[&str] = &["run-name", "concurrency", "env"];

/// Serialize the workflow and its job graph.
///
/// Jobs are emitted in dependency order so the document reads top-down.
pub fn render_lockfile(spec: &WorkflowSpec, graph: &JobGraph, source: &str) -> Result<String, CompileError> {
    let mut doc = Mapping::new();
    doc.insert("name".into(), spec.name.clone().into());
    doc.insert("on".into(), triggers(spec));
    doc.insert("permissions".into(), Value::Mapping(Mapping::new()));
    for key in TOP_LEVEL_PASSTHROUGH {
        if let Some(value) = spec.passthrough.get(*key) {
            doc.insert((*key).into(), value.clone());
        }
    }

    let mut jobs = Mapping::new();
    for job in graph.ordered()? {
        let value = serde_yaml::to_value(job)
            .map_err(|e| CompileError::JobGraph(format!("failed to serialize job '{}': {e}", job.name)))?;
        jobs.insert(job.name.clone().into(), value);
    }
    doc.insert("jobs".into(), Value::Mapping(jobs));

    let body = serde_yaml::to_string(&doc)
        .map_err(|e| CompileError::JobGraph(format!("failed to serialize workflow: {e}")))?;
    tracing::debug!(workflow = %spec.id, jobs = graph.len(), bytes = body.len(), "rendered lock document");
    Ok(format!("{}{body}", header(spec, source)))
}

fn header(spec: &WorkflowSpec, source: &str) -> String {
    let mut header = format!(
        "# This file was generated by awc from {source}. Do not edit it by hand.\n\
         # To update it, edit the workflow and recompile.\n"
    );
    if let Some(tracker) = &spec.tracker_id {
        header.push_str(&format!("# tracker-id: {tracker}\n"));
    }
    header.push('\n');
    header
}

/// `on:` events. A workflow with no events can still be started by hand.
fn triggers(spec: &WorkflowSpec) -> Value {
    if spec.on.events.is_empty() {
        let mut manual = Mapping::new();
        manual.insert("workflow_dispatch".into(), Value::Null);
        return Value::Mapping(manual);
    }
    Value::Mapping(spec.on.events.clone())
}

#[cfg(test)]
#[path = "lockfile_tests.rs"]
mod tests;
