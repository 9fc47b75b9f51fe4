// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Import resolution seam.
//!
//! Reading and fetching `imports:` targets happens outside the compiler.
//! A resolver hands back the fragments it already read; the compiler only
//! merges them.

use awc_core::{CompileError, WorkflowSpec};

/// One imported section body, as YAML or JSON text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    /// Where the fragment came from, for diagnostics.
    pub source: String,
    pub text: String,
}

impl Fragment {
    pub fn new(source: impl Into<String>, text: impl Into<String>) -> Self {
        Self { source: source.into(), text: text.into() }
    }
}

/// Imported `jobs:`, `steps:`, and `services:` fragments, in import order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportedFragments {
    pub jobs: Vec<Fragment>,
    pub steps: Vec<Fragment>,
    pub services: Vec<Fragment>,
}

impl ImportedFragments {
    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty() && self.steps.is_empty() && self.services.is_empty()
    }
}

pub trait ImportResolver: Send + Sync {
    /// Fragments for the workflow's `imports:` list.
    fn resolve(&self, spec: &WorkflowSpec) -> Result<ImportedFragments, CompileError>;
}

/// Resolver for workflows compiled without import support.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoImports;

impl ImportResolver for NoImports {
    fn resolve(&self, spec: &WorkflowSpec) -> Result<ImportedFragments, CompileError> {
        if !spec.imports.is_empty() {
            tracing::debug!(workflow = %spec.id, count = spec.imports.len(), "imports ignored");
        }
        Ok(ImportedFragments::default())
    }
}

/// Resolver returning a fixed set of fragments.
#[derive(Debug, Clone, Default)]
pub struct StaticImports(pub ImportedFragments);

impl ImportResolver for StaticImports {
    fn resolve(&self, _spec: &WorkflowSpec) -> Result<ImportedFragments, CompileError> {
        Ok(self.0.clone())
    }
}
