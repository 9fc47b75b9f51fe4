// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Safe-output jobs.
//!
//! Each declared mutation type runs in its own job after the agent (and
//! the detection job when threat detection is on), reading the agent's
//! recorded output. The registry below is the single source of which
//! kinds exist and how their jobs are built.

use super::{AGENT_JOB, DETECTION_JOB, SAFE_OUTPUTS_JOB};
use crate::cache::ActionPinCache;
use awc_core::{
    Job, JobPhase, PermissionLevel, Permissions, SafeOutputConfig, SafeOutputKind,
    SafeOutputsConfig, Step,
};

/// Artifact holding the agent's recorded safe-output requests.
pub const AGENT_OUTPUT_ARTIFACT: &str = "agent_output.json";
const AGENT_OUTPUT_DIR: &str = "/tmp/awc/safeoutputs/";

type Predicate = fn(&SafeOutputsConfig) -> bool;

/// One registry row.
pub struct SafeOutputJob {
    pub kind: SafeOutputKind,
    pub job_name: &'static str,
    pub enabled: Predicate,
    /// Scopes the job writes to.
    pub writes: &'static [&'static str],
    /// Step outputs re-exported as job outputs.
    pub outputs: &'static [&'static str],
}

/// Every safe-output job, in emission order.
pub static REGISTRY: [SafeOutputJob; 10] = [
    SafeOutputJob {
        kind: SafeOutputKind::CreateIssue,
        job_name: "create_issue",
        enabled: |c| c.is_declared(SafeOutputKind::CreateIssue),
        writes: &["issues"],
        outputs: &["issue_number", "issue_url"],
    },
    SafeOutputJob {
        kind: SafeOutputKind::CreateDiscussion,
        job_name: "create_discussion",
        enabled: |c| c.is_declared(SafeOutputKind::CreateDiscussion),
        writes: &["discussions"],
        outputs: &["discussion_number", "discussion_url"],
    },
    SafeOutputJob {
        kind: SafeOutputKind::CreatePullRequest,
        job_name: "create_pull_request",
        enabled: |c| c.is_declared(SafeOutputKind::CreatePullRequest),
        writes: &["contents", "issues", "pull-requests"],
        outputs: &["pull_request_number", "pull_request_url", "branch_name"],
    },
    SafeOutputJob {
        kind: SafeOutputKind::AddComment,
        job_name: "add_comment",
        enabled: |c| c.is_declared(SafeOutputKind::AddComment),
        writes: &["issues", "pull-requests", "discussions"],
        outputs: &["comment_id", "comment_url"],
    },
    SafeOutputJob {
        kind: SafeOutputKind::CreatePullRequestReviewComment,
        job_name: "create_pr_review_comment",
        enabled: |c| c.is_declared(SafeOutputKind::CreatePullRequestReviewComment),
        writes: &["pull-requests"],
        outputs: &["review_comment_id", "review_comment_url"],
    },
    SafeOutputJob {
        kind: SafeOutputKind::UpdateIssue,
        job_name: "update_issue",
        enabled: |c| c.is_declared(SafeOutputKind::UpdateIssue),
        writes: &["issues"],
        outputs: &["issue_number", "issue_url"],
    },
    SafeOutputJob {
        kind: SafeOutputKind::AddLabels,
        job_name: "add_labels",
        enabled: |c| c.is_declared(SafeOutputKind::AddLabels),
        writes: &["issues", "pull-requests"],
        outputs: &["labels_added"],
    },
    SafeOutputJob {
        kind: SafeOutputKind::PushToPullRequestBranch,
        job_name: "push_to_pull_request_branch",
        enabled: |c| c.is_declared(SafeOutputKind::PushToPullRequestBranch),
        writes: &["contents", "pull-requests"],
        outputs: &["commit_sha", "push_url"],
    },
    SafeOutputJob {
        kind: SafeOutputKind::UploadAssets,
        job_name: "upload_assets",
        enabled: |c| c.is_declared(SafeOutputKind::UploadAssets),
        writes: &["contents"],
        outputs: &["branch_name", "published_count"],
    },
    SafeOutputJob {
        kind: SafeOutputKind::MissingTool,
        job_name: "missing_tool",
        enabled: |c| c.is_declared(SafeOutputKind::MissingTool),
        writes: &[],
        outputs: &["tools_reported", "total_count"],
    },
];

/// Kinds whose results `add_comment` links back to.
const COMMENT_UPSTREAMS: &[SafeOutputKind] = &[
    SafeOutputKind::CreateIssue,
    SafeOutputKind::CreateDiscussion,
    SafeOutputKind::CreatePullRequest,
];

/// Build the jobs for every enabled kind, plus the consolidation job
/// when more than one kind is enabled.
pub fn safe_output_jobs(
    config: &SafeOutputsConfig,
    threat_detection: bool,
    pins: &ActionPinCache,
) -> Vec<Job> {
    let enabled: Vec<&SafeOutputJob> = REGISTRY.iter().filter(|row| (row.enabled)(config)).collect();
    let mut jobs: Vec<Job> = enabled
        .iter()
        .filter_map(|row| {
            let declared = config.get(row.kind)?;
            Some(build_job(row, declared, config, threat_detection, pins))
        })
        .collect();

    if jobs.len() > 1 {
        let mut consolidation = Job::new(SAFE_OUTPUTS_JOB, JobPhase::Consolidation)
            .condition("always()")
            .permissions(Permissions::scoped([("contents", PermissionLevel::Read)]))
            .step(Step::run(
                "Summarize safe outputs",
                "echo \"## Safe outputs\" >> \"$GITHUB_STEP_SUMMARY\"",
            ));
        for job in &jobs {
            consolidation = consolidation.needs(job.name.clone());
        }
        jobs.push(consolidation);
    }
    jobs
}

fn build_job(
    row: &SafeOutputJob,
    declared: &SafeOutputConfig,
    config: &SafeOutputsConfig,
    threat_detection: bool,
    pins: &ActionPinCache,
) -> Job {
    let prefix = format!("AWC_{}", row.kind.env_prefix());
    let mut condition = format!(
        "!cancelled() && contains(needs.{AGENT_JOB}.outputs.output_types, '{}')",
        row.kind.key()
    );
    let mut job = Job::new(row.job_name, JobPhase::SafeOutput).needs(AGENT_JOB);
    if threat_detection {
        job = job.needs(DETECTION_JOB);
        condition.push_str(&format!(" && needs.{DETECTION_JOB}.outputs.success == 'true'"));
    }

    let permissions = row.writes.iter().fold(
        Permissions::scoped([("contents", PermissionLevel::Read)]),
        |perms, scope| perms.with_at_least(scope, PermissionLevel::Write),
    );

    job = job
        .condition(condition)
        .permissions(permissions)
        .env("AWC_AGENT_OUTPUT", format!("${{{{ needs.{AGENT_JOB}.outputs.output }}}}"))
        .env(format!("{prefix}_MAX"), declared.max.unwrap_or(row.kind.default_max()).to_string());
    if let Some(target) = &declared.target {
        job = job.env(format!("{prefix}_TARGET"), target.clone());
    }
    if !declared.labels.is_empty() {
        job = job.env(format!("{prefix}_LABELS"), declared.labels.join(","));
    }
    if let Some(title_prefix) = &declared.title_prefix {
        job = job.env(format!("{prefix}_TITLE_PREFIX"), title_prefix.clone());
    }
    if let Some(draft) = declared.draft {
        job = job.env(format!("{prefix}_DRAFT"), draft.to_string());
    }
    if !declared.allowed.is_empty() {
        job = job.env(format!("{prefix}_ALLOWED"), declared.allowed.join(","));
    }
    if config.staged {
        job = job.env("AWC_SAFE_OUTPUTS_STAGED", "true");
    }

    if row.kind == SafeOutputKind::AddComment {
        for upstream in COMMENT_UPSTREAMS.iter().filter(|k| config.is_declared(**k)) {
            let name = upstream.job_name();
            job = job.needs(name);
            if let Some(upstream_row) = REGISTRY.iter().find(|r| r.kind == *upstream) {
                for output in upstream_row.outputs.iter().take(2) {
                    job = job.env(
                        format!("AWC_CREATED_{}", output.to_ascii_uppercase()),
                        format!("${{{{ needs.{name}.outputs.{output} }}}}"),
                    );
                }
            }
        }
    }

    let token = declared
        .github_token
        .as_ref()
        .or(config.github_token.as_ref())
        .cloned()
        .unwrap_or_else(|| "${{ secrets.GITHUB_TOKEN }}".to_string());

    job = job
        .step(
            Step::uses("Download agent output", pins.resolve("actions/download-artifact@v4"))
                .with_input("name", AGENT_OUTPUT_ARTIFACT)
                .with_input("path", AGENT_OUTPUT_DIR),
        )
        .step(
            Step::run(
                format!("Process {}", row.kind.key()),
                format!("node {AGENT_OUTPUT_DIR}{}.cjs", row.job_name),
            )
            .with_id("process")
            .with_env("GITHUB_TOKEN", token),
        );
    for output in row.outputs {
        job = job.output(*output, format!("${{{{ steps.process.outputs.{output} }}}}"));
    }
    job
}

#[cfg(test)]
#[path = "safe_outputs_tests.rs"]
mod tests;
