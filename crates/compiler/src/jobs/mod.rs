// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job graph construction.
//!
//! Jobs are laid out in fixed phases:
//! `pre_activation → activation → agent → detection → safe-output jobs →
//! safe_outputs`. User-declared jobs slot in after activation, or before
//! it when they only depend on `pre_activation`.

mod builder;
mod merge;
mod names;
mod safe_outputs;

pub use builder::{build_job_graph, BuiltGraph};
pub use merge::{merge_jobs, merge_services, merge_steps};
pub use names::sanitize_job_name;
pub use safe_outputs::{safe_output_jobs, SafeOutputJob, AGENT_OUTPUT_ARTIFACT, REGISTRY};

pub const PRE_ACTIVATION_JOB: &str = "pre_activation";
pub const ACTIVATION_JOB: &str = "activation";
pub const AGENT_JOB: &str = "agent";
pub const DETECTION_JOB: &str = "detection";
/// Consolidation job, present when more than one safe-output type is declared.
pub const SAFE_OUTPUTS_JOB: &str = "safe_outputs";

/// Names the compiler reserves for its own jobs.
pub const RESERVED_JOB_NAMES: &[&str] =
    &[PRE_ACTIVATION_JOB, ACTIVATION_JOB, AGENT_JOB, DETECTION_JOB, SAFE_OUTPUTS_JOB];
