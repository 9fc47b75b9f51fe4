// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Assemble the job graph from a fully-derived workflow.
//!
//! Reads the domain, firewall, tool-permission, and MCP slots written by
//! earlier phases. Any `needs.<job>.outputs` reference in user content
//! that points at a job the consumer does not depend on is removed with a
//! warning.

use super::{
    safe_output_jobs, sanitize_job_name, ACTIVATION_JOB, AGENT_JOB, AGENT_OUTPUT_ARTIFACT,
    DETECTION_JOB, PRE_ACTIVATION_JOB, REGISTRY, SAFE_OUTPUTS_JOB,
};
use crate::cache::ActionPinCache;
use crate::engine::{Engine, PROMPT_PATH};
use crate::expr::{self, ExpressionMap};
use crate::network::{srt_settings, wrap_command, wrapper_install_steps, SRT_SETTINGS_PATH};
use awc_core::{
    CacheScope, CompileError, CustomJob, Job, JobGraph, JobPhase, PermissionLevel, Permissions,
    Step, ToolPermissions, Warning, WorkflowSpec,
};
use indexmap::IndexMap;
use serde_yaml::Value;
use std::collections::BTreeSet;

const PROMPT_ARTIFACT: &str = "prompt";
const PROMPT_DIR: &str = "/tmp/awc/prompts";
const SAFE_OUTPUTS_FILE: &str = "/tmp/awc/safeoutputs/outputs.jsonl";
const AGENT_OUTPUT_PATH: &str = "/tmp/awc/safeoutputs/agent_output.json";
const CACHE_MEMORY_DIR: &str = "/tmp/awc/cache-memory";
const SCRIPTS_DIR: &str = "/tmp/awc/scripts";

/// Roles checked for command triggers when `roles:` is not declared.
const DEFAULT_COMMAND_ROLES: &[&str] = &["admin", "maintainer", "write"];

/// Output of the job-graph phase.
#[derive(Debug)]
pub struct BuiltGraph {
    pub graph: JobGraph,
    pub warnings: Vec<Warning>,
}

pub fn build_job_graph(
    spec: &WorkflowSpec,
    engine: &dyn Engine,
    pins: &ActionPinCache,
) -> Result<BuiltGraph, CompileError> {
    let mut builder = Builder { spec, engine, pins, warnings: Vec::new() };
    let graph = builder.build()?;
    tracing::debug!(workflow = %spec.id, jobs = graph.len(), "built job graph");
    Ok(BuiltGraph { graph, warnings: builder.warnings })
}

struct Builder<'a> {
    spec: &'a WorkflowSpec,
    engine: &'a dyn Engine,
    pins: &'a ActionPinCache,
    warnings: Vec<Warning>,
}

impl Builder<'_> {
    fn build(&mut self) -> Result<JobGraph, CompileError> {
        let (early, late): (Vec<Job>, Vec<Job>) =
            self.custom_jobs().into_iter().partition(is_pre_activation_class);
        let user_jobs: Vec<String> =
            early.iter().chain(late.iter()).map(|job| job.name.clone()).collect();
        let mut graph = JobGraph::new();

        let custom_needs_gate =
            late.iter().any(|job| job.needs.iter().any(|n| n == PRE_ACTIVATION_JOB));
        if self.spec.needs_pre_activation() || !early.is_empty() || custom_needs_gate {
            graph.insert(self.pre_activation_job())?;
        }
        for mut job in early {
            job.phase = JobPhase::PreActivation;
            graph.insert(job)?;
        }

        // Everything inserted so far runs before activation.
        let before_activation: BTreeSet<String> = graph.names().map(str::to_string).collect();
        graph.insert(self.activation_job(&before_activation))?;

        let post_agent = post_agent_jobs(&late);
        let pre_agent: Vec<String> = late
            .iter()
            .filter(|job| !post_agent.contains(&job.name))
            .map(|job| job.name.clone())
            .collect();
        for job in late {
            graph.insert(job)?;
        }

        graph.insert(self.agent_job(&pre_agent))?;
        let threat_detection = self.spec.threat_detection();
        if threat_detection {
            graph.insert(self.detection_job())?;
        }
        if let Some(config) = self.spec.safe_outputs.as_ref().filter(|s| !s.is_empty()) {
            for job in safe_output_jobs(config, threat_detection, self.pins) {
                graph.insert(job)?;
            }
        }

        // Custom jobs never run before activation.
        for name in &user_jobs {
            if before_activation.contains(name) || graph.depends_on(name, ACTIVATION_JOB) {
                continue;
            }
            if let Some(job) = graph.get_mut(name) {
                job.needs.push(ACTIVATION_JOB.to_string());
            }
        }

        for name in user_jobs.iter().map(String::as_str).chain([AGENT_JOB]) {
            let available = graph.ancestors(name);
            if let Some(job) = graph.get_mut(name) {
                let removed = filter_job(job, &available);
                for expression in removed {
                    self.warnings.push(forward_reference(&format!("jobs.{name}"), name, &expression));
                }
            }
        }

        graph.validate()?;
        Ok(graph)
    }

    /// Declared jobs with sanitized names and defaulted `needs`.
    fn custom_jobs(&mut self) -> Vec<Job> {
        let spec = self.spec;
        let renames: IndexMap<&str, String> = spec
            .jobs
            .keys()
            .enumerate()
            .map(|(i, name)| (name.as_str(), sanitize_job_name(name, i)))
            .collect();
        for (old, new) in &renames {
            if old != new {
                self.warnings.push(Warning::new(
                    format!("jobs.{old}"),
                    format!("not a valid job name; renamed to '{new}'"),
                ));
            }
        }
        let rename = |name: &str| renames.get(name).cloned().unwrap_or_else(|| name.to_string());

        spec.jobs
            .iter()
            .map(|(name, custom)| {
                let needs: Vec<String> = if custom.needs.is_empty() {
                    vec![ACTIVATION_JOB.to_string()]
                } else {
                    custom.needs.iter().map(|n| rename(n.as_str())).collect()
                };
                custom_job(rename(name.as_str()), needs, custom)
            })
            .collect()
    }

    fn checkout(&self) -> Step {
        Step::uses("Checkout repository", self.pins.resolve("actions/checkout@v4"))
    }

    fn pre_activation_job(&self) -> Job {
        let spec = self.spec;
        let mut job = Job::new(PRE_ACTIVATION_JOB, JobPhase::PreActivation)
            .permissions(Permissions::scoped([("contents", PermissionLevel::Read)]));
        let mut checks: Vec<&str> = Vec::new();

        let roles = spec.roles.clone().or_else(|| {
            spec.on.command.as_ref().map(|_| DEFAULT_COMMAND_ROLES.iter().map(|r| r.to_string()).collect())
        });
        if let Some(roles) = roles {
            job = job.step(
                Step::run("Check team membership", format!("node {SCRIPTS_DIR}/check_membership.cjs"))
                    .with_id("check_membership")
                    .with_env("AWC_REQUIRED_ROLES", roles.join(",")),
            );
            checks.push("steps.check_membership.outputs.is_team_member == 'true'");
        }
        if let Some(stop_after) = &spec.on.stop_after {
            job = job.step(
                Step::run("Check stop time", format!("node {SCRIPTS_DIR}/check_stop_time.cjs"))
                    .with_id("check_stop_time")
                    .with_env("AWC_STOP_TIME", stop_after.as_str())
                    .with_env("AWC_WORKFLOW_NAME", spec.name.as_str()),
            );
            checks.push("steps.check_stop_time.outputs.stop_time_ok == 'true'");
        }
        if let Some(command) = &spec.on.command {
            job = job
                .step(
                    Step::run("Check command position", format!("node {SCRIPTS_DIR}/check_command.cjs"))
                        .with_id("check_command")
                        .with_env("AWC_COMMAND", command.name.as_str()),
                )
                .output("matched_command", "${{ steps.check_command.outputs.matched_command }}");
            checks.push("steps.check_command.outputs.command_matched == 'true'");
        }

        let activated = if checks.is_empty() { "'true'".to_string() } else { checks.join(" && ") };
        job.output("activated", format!("${{{{ {activated} }}}}"))
    }

    fn activation_job(&mut self, before: &BTreeSet<String>) -> Job {
        let spec = self.spec;
        let mut job = Job::new(ACTIVATION_JOB, JobPhase::Activation);
        for need in before {
            job = job.needs(need.as_str());
        }

        let mut conditions = Vec::new();
        if before.contains(PRE_ACTIVATION_JOB) {
            conditions.push(format!("needs.{PRE_ACTIVATION_JOB}.outputs.activated == 'true'"));
        }
        if let Some(extra) = spec.passthrough.get("if").and_then(Value::as_str) {
            let extra = strip_braces(extra);
            match expr::filter_condition(&extra, |name| before.contains(name)) {
                Some(condition) => conditions.push(condition),
                None => self.warnings.push(forward_reference("if", ACTIVATION_JOB, &extra)),
            }
        }
        if !conditions.is_empty() {
            job = job.condition(conditions.join(" && "));
        }

        let mut permissions = Permissions::scoped([("contents", PermissionLevel::Read)]);
        job = job.step(
            self.checkout()
                .with_input("sparse-checkout", ".github")
                .with_input("persist-credentials", false),
        );
        if let Some(reaction) = &spec.on.reaction {
            for scope in ["issues", "pull-requests", "discussions"] {
                permissions = permissions.with_at_least(scope, PermissionLevel::Write);
            }
            job = job
                .step(
                    Step::run("Add reaction", format!("node {SCRIPTS_DIR}/add_reaction.cjs"))
                        .with_id("react")
                        .with_env("AWC_REACTION", reaction.as_str()),
                )
                .output("comment_id", "${{ steps.react.outputs.comment-id }}");
        }
        job = job.permissions(permissions);

        let (markdown, removed) =
            expr::filter_needs_references(&spec.markdown, |name| before.contains(name));
        for expression in removed {
            self.warnings.push(forward_reference("markdown", ACTIVATION_JOB, &expression));
        }
        let mut vars = ExpressionMap::new();
        let prompt = expr::secure(&markdown, &mut vars);

        job.step(write_file_step("Create prompt", PROMPT_PATH, &prompt, &vars)).step(
            Step::uses("Upload prompt", self.pins.resolve("actions/upload-artifact@v4"))
                .with_input("name", PROMPT_ARTIFACT)
                .with_input("path", PROMPT_DIR),
        )
    }

    fn agent_job(&self, pre_agent: &[String]) -> Job {
        let spec = self.spec;
        let mut job = Job::new(AGENT_JOB, JobPhase::Agent).needs(ACTIVATION_JOB);
        for need in pre_agent {
            job = job.needs(need.as_str());
        }
        job = job.permissions(
            spec.permissions
                .clone()
                .unwrap_or_else(|| Permissions::scoped([("contents", PermissionLevel::Read)])),
        );
        if let Some(runs_on) = spec.passthrough.get("runs-on") {
            job.runs_on = runs_on.clone();
        }
        job.timeout_minutes = spec
            .passthrough
            .get("timeout-minutes")
            .and_then(Value::as_u64)
            .and_then(|t| u32::try_from(t).ok());
        job.container = spec.passthrough.get("container").cloned();
        if let Some(environment) = spec.passthrough.get("environment") {
            job.extra.insert("environment".to_string(), environment.clone());
        }
        job.services = spec.services.clone();
        if spec.has_safe_outputs() {
            job = job.env("AWC_SAFE_OUTPUTS", SAFE_OUTPUTS_FILE);
        }

        job = job.step(self.checkout().with_input("persist-credentials", false)).step(
            Step::uses("Download prompt", self.pins.resolve("actions/download-artifact@v4"))
                .with_input("name", PROMPT_ARTIFACT)
                .with_input("path", PROMPT_DIR),
        );
        for step in self.cache_steps() {
            job = job.step(step);
        }
        for step in &spec.steps {
            job = job.step(step.clone());
        }
        for step in self.engine.installation_steps(&spec.engine) {
            job = job.step(step);
        }
        let firewall = spec.firewall_enabled.get().copied().unwrap_or(false);
        let allowed = spec.allowed_domains.get().map(Vec::as_slice).unwrap_or_default();
        for step in wrapper_install_steps(spec, firewall) {
            job = job.step(step);
        }
        if !firewall && spec.sandbox.uses_runtime_sandbox() {
            let blocked = spec.blocked_domains.get().map(Vec::as_slice).unwrap_or_default();
            job = job.step(write_file_step(
                "Write sandbox settings",
                SRT_SETTINGS_PATH,
                &srt_settings(allowed, blocked),
                &ExpressionMap::new(),
            ));
        }

        if let Some(mcp) = spec.mcp_config.get() {
            job = job.step(write_file_step(
                "Write MCP config",
                self.engine.mcp_config_path(),
                &mcp.document,
                &mcp.env,
            ));
            if let Some(redact) = expr::redaction_step(&mcp.env) {
                job = job.step(redact);
            }
        }

        let permissions =
            spec.tool_permissions.get().cloned().unwrap_or(ToolPermissions::Allowed(Vec::new()));
        if let Some(invocation) = self.engine.invocation(&spec.engine, &permissions) {
            let command = wrap_command(spec, firewall, allowed, &invocation.command);
            let mut step = Step::run("Run agent", command).with_id("agentic_execution");
            for (key, value) in invocation.env {
                step = step.with_env(key, value);
            }
            job = job.step(step);
        }

        if let Some(config) = spec.safe_outputs.as_ref().filter(|s| !s.is_empty()) {
            let kinds: Vec<&str> = config.kinds().map(|k| k.key()).collect();
            job = job
                .step(
                    Step::run("Collect safe outputs", format!("node {SCRIPTS_DIR}/collect_output.cjs"))
                        .with_id("collect_output")
                        .with_if("always()")
                        .with_env("AWC_SAFE_OUTPUTS", SAFE_OUTPUTS_FILE)
                        .with_env("AWC_ALLOWED_OUTPUTS", kinds.join(",")),
                )
                .step(
                    Step::uses("Upload agent output", self.pins.resolve("actions/upload-artifact@v4"))
                        .with_if("always()")
                        .with_input("name", AGENT_OUTPUT_ARTIFACT)
                        .with_input("path", AGENT_OUTPUT_PATH)
                        .with_input("if-no-files-found", "warn"),
                )
                .output("output", "${{ steps.collect_output.outputs.output }}")
                .output("output_types", "${{ steps.collect_output.outputs.output_types }}");
        }

        for step in &spec.post_steps {
            job = job.step(step.clone());
        }
        job
    }

    /// `tools.cache-memory` and passthrough `cache:` entries.
    fn cache_steps(&self) -> Vec<Step> {
        let spec = self.spec;
        let action = self.pins.resolve("actions/cache@v4");
        let mut steps = Vec::new();
        if let Some(memory) = &spec.tools.cache_memory {
            let key = memory.key.clone().unwrap_or_else(|| match memory.scope {
                CacheScope::Workflow => format!("memory-{}-${{{{ github.run_id }}}}", spec.id),
                CacheScope::Repo => "memory-repo-${{ github.run_id }}".to_string(),
            });
            let restore = match memory.scope {
                CacheScope::Workflow => format!("memory-{}-", spec.id),
                CacheScope::Repo => "memory-repo-".to_string(),
            };
            steps.push(Step::run("Create cache-memory directory", format!("mkdir -p {CACHE_MEMORY_DIR}")));
            steps.push(
                Step::uses("Cache memory", action.as_str())
                    .with_input("key", key)
                    .with_input("path", CACHE_MEMORY_DIR)
                    .with_input("restore-keys", restore),
            );
        }
        let entries = match spec.passthrough.get("cache") {
            Some(Value::Sequence(items)) => items.clone(),
            Some(entry @ Value::Mapping(_)) => vec![entry.clone()],
            _ => Vec::new(),
        };
        for entry in entries {
            let Value::Mapping(inputs) = entry else { continue };
            let mut step = Step::uses("Cache", action.as_str());
            for (key, value) in inputs {
                if let Some(key) = key.as_str() {
                    step = step.with_input(key, value);
                }
            }
            steps.push(step);
        }
        steps
    }

    fn detection_job(&self) -> Job {
        let spec = self.spec;
        Job::new(DETECTION_JOB, JobPhase::Detection)
            .needs(AGENT_JOB)
            .condition(format!("needs.{AGENT_JOB}.outputs.output_types != ''"))
            .permissions(Permissions::default())
            .step(
                Step::uses("Download agent output", self.pins.resolve("actions/download-artifact@v4"))
                    .with_input("name", AGENT_OUTPUT_ARTIFACT)
                    .with_input("path", "/tmp/awc/threat-detection/"),
            )
            .step(
                Step::run("Run threat detection", format!("node {SCRIPTS_DIR}/detect_threats.cjs"))
                    .with_id("detection")
                    .with_env("AWC_WORKFLOW_NAME", spec.name.as_str())
                    .with_env("AWC_WORKFLOW_DESCRIPTION", spec.description.clone().unwrap_or_default()),
            )
            .output("success", "${{ steps.detection.outputs.success }}")
    }
}

fn custom_job(name: String, needs: Vec<String>, custom: &CustomJob) -> Job {
    let mut job = Job::new(name, JobPhase::Custom);
    for need in needs {
        job = job.needs(need);
    }
    if let Some(runs_on) = &custom.runs_on {
        job.runs_on = runs_on.clone();
    }
    job.condition = custom.condition.clone();
    job.permissions = custom.permissions.clone();
    job.timeout_minutes = custom.timeout_minutes;
    job.env = custom.env.clone();
    job.outputs = custom.outputs.clone();
    job.services = custom.services.clone();
    job.steps = custom.steps.clone();
    job.extra = custom.extra.clone();
    job
}

/// Needs `pre_activation` and none of the later compiler jobs.
fn is_pre_activation_class(job: &Job) -> bool {
    job.needs.iter().any(|n| n == PRE_ACTIVATION_JOB)
        && !job.needs.iter().any(|n| [ACTIVATION_JOB, AGENT_JOB, DETECTION_JOB].contains(&n.as_str()))
}

/// Custom jobs that (transitively) follow the agent. The agent waits for the rest.
fn post_agent_jobs(custom: &[Job]) -> BTreeSet<String> {
    let mut downstream: BTreeSet<String> = [AGENT_JOB, DETECTION_JOB, SAFE_OUTPUTS_JOB]
        .iter()
        .chain(REGISTRY.iter().map(|row| &row.job_name))
        .map(|s| s.to_string())
        .collect();
    let mut post = BTreeSet::new();
    loop {
        let mut changed = false;
        for job in custom {
            if !post.contains(&job.name) && job.needs.iter().any(|n| downstream.contains(n)) {
                post.insert(job.name.clone());
                downstream.insert(job.name.clone());
                changed = true;
            }
        }
        if !changed {
            return post;
        }
    }
}

/// Drop references to unavailable jobs from every string in `job`.
fn filter_job(job: &mut Job, available: &BTreeSet<String>) -> Vec<String> {
    let mut removed = Vec::new();
    filter_condition(&mut job.condition, available, &mut removed);
    for value in job.env.values_mut().chain(job.outputs.values_mut()) {
        filter_text(value, available, &mut removed);
    }
    for step in &mut job.steps {
        filter_condition(&mut step.condition, available, &mut removed);
        if let Some(run) = &mut step.run {
            filter_text(run, available, &mut removed);
        }
        for value in step.with.values_mut().chain(step.env.values_mut()) {
            if let Value::String(text) = value {
                filter_text(text, available, &mut removed);
            }
        }
    }
    removed
}

fn filter_text(text: &mut String, available: &BTreeSet<String>, removed: &mut Vec<String>) {
    let (filtered, dropped) = expr::filter_needs_references(text, |name| available.contains(name));
    if !dropped.is_empty() {
        *text = filtered;
        removed.extend(dropped);
    }
}

fn filter_condition(condition: &mut Option<String>, available: &BTreeSet<String>, removed: &mut Vec<String>) {
    let Some(text) = condition.as_deref() else { return };
    if expr::filter_condition(text, |name| available.contains(name)).is_none() {
        removed.push(text.to_string());
        *condition = None;
    }
}

fn forward_reference(location: &str, consumer: &str, expression: &str) -> Warning {
    Warning::new(
        location,
        format!("removed '{expression}': it references a job that does not run before '{consumer}'"),
    )
}

/// `${{ x }}` → `x`, for conditions that get combined. Each expression
/// inside a compound condition is parenthesized in place.
fn strip_braces(condition: &str) -> String {
    let trimmed = condition.trim();
    let mut matches = expr::EXPR_PATTERN.captures_iter(trimmed);
    match (matches.next(), matches.next()) {
        (Some(only), None) if only[0].len() == trimmed.len() => only[1].trim().to_string(),
        (None, _) => trimmed.to_string(),
        _ => expr::EXPR_PATTERN
            .replace_all(trimmed, |caps: &regex::Captures| format!("({})", caps[1].trim()))
            .into_owned(),
    }
}

/// Write `content` through a quoted heredoc, then substitute only the
/// lifted expression variables.
fn write_file_step(name: &str, path: &str, content: &str, vars: &ExpressionMap) -> Step {
    let dir = path.rsplit_once('/').map(|(dir, _)| dir).unwrap_or(".");
    let mut delimiter = "AWC_EOF".to_string();
    while content.lines().any(|line| line == delimiter) {
        delimiter.push('_');
    }
    let body = content.strip_suffix('\n').unwrap_or(content);

    let script = if vars.is_empty() {
        format!("mkdir -p {dir}\ncat > {path} << '{delimiter}'\n{body}\n{delimiter}\n")
    } else {
        let names: Vec<String> = vars.keys().map(|var| format!("${{{var}}}")).collect();
        format!(
            "mkdir -p {dir}\ncat > {path}.tmpl << '{delimiter}'\n{body}\n{delimiter}\n\
             envsubst '{}' < {path}.tmpl > {path}\nrm {path}.tmpl\n",
            names.join(" ")
        )
    };

    let mut step = Step::run(name, script);
    for (var, value) in expr::env_block(vars) {
        step = step.with_env(var, value);
    }
    step
}

#[cfg(test)]
#[path = "builder_tests.rs"]
mod tests;
