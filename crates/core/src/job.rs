// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Jobs, steps, and the dependency graph between them.

use crate::diagnostics::CompileError;
use crate::permissions::Permissions;
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use serde_yaml::Value;
use std::collections::{BTreeMap, BTreeSet};

/// One step inside a job.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Step {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, rename = "if", skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uses: Option<String>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub with: IndexMap<String, Value>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub env: IndexMap<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run: Option<String>,
    /// Other step keys (`shell`, `working-directory`, `continue-on-error`, ...).
    #[serde(flatten)]
    pub extra: IndexMap<String, Value>,
}

impl Step {
    pub fn run(name: impl Into<String>, script: impl Into<String>) -> Self {
        Self { name: Some(name.into()), run: Some(script.into()), ..Self::default() }
    }

    pub fn uses(name: impl Into<String>, action: impl Into<String>) -> Self {
        Self { name: Some(name.into()), uses: Some(action.into()), ..Self::default() }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_if(mut self, condition: impl Into<String>) -> Self {
        self.condition = Some(condition.into());
        self
    }

    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), Value::String(value.into()));
        self
    }

    pub fn with_input(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.with.insert(key.into(), value.into());
        self
    }

    /// Every string this step carries that a runner evaluates.
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.condition
            .iter()
            .chain(self.run.iter())
            .map(String::as_str)
            .chain(self.with.values().chain(self.env.values()).filter_map(Value::as_str))
    }
}

/// Position of a job in the fixed phase ordering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum JobPhase {
    PreActivation,
    Activation,
    /// User-declared job placed after activation.
    #[default]
    Custom,
    Agent,
    Detection,
    SafeOutput,
    Consolidation,
}

crate::simple_display! {
    JobPhase {
        PreActivation => "pre-activation",
        Activation => "activation",
        Custom => "custom",
        Agent => "agent",
        Detection => "detection",
        SafeOutput => "safe-output",
        Consolidation => "consolidation",
    }
}

/// A job in the generated graph.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct Job {
    #[serde(skip)]
    pub name: String,
    #[serde(skip)]
    pub phase: JobPhase,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub needs: Vec<String>,
    #[serde(rename = "if", skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
    pub runs_on: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub permissions: Option<Permissions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_minutes: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub container: Option<Value>,
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub services: IndexMap<String, Value>,
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub env: IndexMap<String, String>,
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub outputs: IndexMap<String, String>,
    pub steps: Vec<Step>,
    #[serde(flatten)]
    pub extra: IndexMap<String, Value>,
}

pub const DEFAULT_RUNNER: &str = "ubuntu-latest";

impl Job {
    pub fn new(name: impl Into<String>, phase: JobPhase) -> Self {
        Self {
            name: name.into(),
            phase,
            needs: Vec::new(),
            condition: None,
            runs_on: Value::String(DEFAULT_RUNNER.to_string()),
            permissions: None,
            timeout_minutes: None,
            container: None,
            services: IndexMap::new(),
            env: IndexMap::new(),
            outputs: IndexMap::new(),
            steps: Vec::new(),
            extra: IndexMap::new(),
        }
    }

    pub fn needs(mut self, job: impl Into<String>) -> Self {
        let job = job.into();
        if !self.needs.contains(&job) {
            self.needs.push(job);
        }
        self
    }

    pub fn condition(mut self, condition: impl Into<String>) -> Self {
        self.condition = Some(condition.into());
        self
    }

    pub fn permissions(mut self, permissions: Permissions) -> Self {
        self.permissions = Some(permissions);
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    pub fn output(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.outputs.insert(key.into(), value.into());
        self
    }

    pub fn step(mut self, step: Step) -> Self {
        self.steps.push(step);
        self
    }

    /// Every string a runner evaluates in this job: `if`, env, outputs, and steps.
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.condition
            .iter()
            .map(String::as_str)
            .chain(self.env.values().map(String::as_str))
            .chain(self.outputs.values().map(String::as_str))
            .chain(self.steps.iter().flat_map(Step::texts))
    }
}

/// A job declared under `jobs:` in the frontmatter.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct CustomJob {
    #[serde(default, deserialize_with = "one_or_many", skip_serializing_if = "Vec::is_empty")]
    pub needs: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub runs_on: Option<Value>,
    #[serde(default, rename = "if", skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permissions: Option<Permissions>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_minutes: Option<u32>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub env: IndexMap<String, String>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub outputs: IndexMap<String, String>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub services: IndexMap<String, Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub steps: Vec<Step>,
    #[serde(flatten)]
    pub extra: IndexMap<String, Value>,
}

/// `needs: a` or `needs: [a, b]`.
fn one_or_many<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Helper {
        One(String),
        Many(Vec<String>),
    }

    Ok(match Helper::deserialize(deserializer)? {
        Helper::One(s) => vec![s],
        Helper::Many(v) => v,
    })
}

/// Runner identifier grammar: `^[a-z_][a-z0-9_-]*$`.
pub fn is_valid_job_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_lowercase() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '-')
}

/// Named jobs with `needs` edges.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JobGraph {
    jobs: IndexMap<String, Job>,
}

impl JobGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a job. Names must be valid and unique.
    pub fn insert(&mut self, job: Job) -> Result<(), CompileError> {
        if !is_valid_job_name(&job.name) {
            return Err(CompileError::JobGraph(format!(
                "invalid job name '{}'; names must match ^[a-z_][a-z0-9_-]*$",
                job.name
            )));
        }
        if self.jobs.contains_key(&job.name) {
            return Err(CompileError::JobGraph(format!("duplicate job name '{}'", job.name)));
        }
        self.jobs.insert(job.name.clone(), job);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Job> {
        self.jobs.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Job> {
        self.jobs.get_mut(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.jobs.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.jobs.keys().map(String::as_str)
    }

    pub fn jobs(&self) -> impl Iterator<Item = &Job> {
        self.jobs.values()
    }

    /// Kahn's algorithm. Ties are broken by name so output is stable.
    pub fn topological_order(&self) -> Result<Vec<&str>, CompileError> {
        let mut in_degree: BTreeMap<&str, usize> = BTreeMap::new();
        let mut dependents: BTreeMap<&str, Vec<&str>> = BTreeMap::new();

        for (name, job) in &self.jobs {
            in_degree.entry(name.as_str()).or_insert(0);
            for need in &job.needs {
                if !self.jobs.contains_key(need) {
                    return Err(CompileError::JobGraph(format!(
                        "job '{name}' needs unknown job '{need}'"
                    )));
                }
                *in_degree.entry(name.as_str()).or_insert(0) += 1;
                dependents.entry(need.as_str()).or_default().push(name.as_str());
            }
        }

        let mut ready: BTreeSet<&str> =
            in_degree.iter().filter(|(_, d)| **d == 0).map(|(n, _)| *n).collect();
        let mut order = Vec::with_capacity(self.jobs.len());

        while let Some(next) = ready.pop_first() {
            order.push(next);
            for dependent in dependents.get(next).into_iter().flatten() {
                if let Some(degree) = in_degree.get_mut(dependent) {
                    *degree -= 1;
                    if *degree == 0 {
                        ready.insert(*dependent);
                    }
                }
            }
        }

        if order.len() != self.jobs.len() {
            let stuck: Vec<&str> =
                in_degree.iter().filter(|(_, d)| **d > 0).map(|(n, _)| *n).collect();
            return Err(CompileError::JobGraph(format!(
                "dependency cycle between jobs: {}",
                stuck.join(", ")
            )));
        }
        Ok(order)
    }

    /// Every job `name` depends on, directly or transitively.
    pub fn ancestors(&self, name: &str) -> BTreeSet<String> {
        let mut seen = BTreeSet::new();
        let mut stack: Vec<&str> = vec![name];
        while let Some(current) = stack.pop() {
            let Some(job) = self.jobs.get(current) else { continue };
            for need in &job.needs {
                if seen.insert(need.clone()) {
                    stack.push(need);
                }
            }
        }
        seen
    }

    pub fn depends_on(&self, job: &str, dependency: &str) -> bool {
        self.ancestors(job).contains(dependency)
    }

    /// Check names, `needs` targets, and acyclicity.
    pub fn validate(&self) -> Result<(), CompileError> {
        if let Some(bad) = self.jobs.keys().find(|n| !is_valid_job_name(n)) {
            return Err(CompileError::JobGraph(format!("invalid job name '{bad}'")));
        }
        self.topological_order().map(|_| ())
    }

    /// Jobs in dependency order.
    pub fn ordered(&self) -> Result<Vec<&Job>, CompileError> {
        Ok(self.topological_order()?.into_iter().filter_map(|n| self.jobs.get(n)).collect())
    }
}

#[cfg(test)]
#[path = "job_tests.rs"]
mod tests;
