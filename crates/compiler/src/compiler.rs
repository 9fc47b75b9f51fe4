// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Compilation entry point.
//!
//! Phases run in a fixed order over one [`WorkflowSpec`]:
//! frontmatter → imports → network → tool permissions → MCP config →
//! strict mode → advisories → job graph. Each derived slot is written by
//! exactly one phase.

use crate::advisory::{check_packages, PackageRegistry};
use crate::cache::{ActionPinCache, RepoFeatureCache};
use crate::config::CompilerConfig;
use crate::engine::{compute_tool_permissions, Engine, EngineRegistry};
use crate::imports::{ImportResolver, NoImports};
use crate::jobs::{build_job_graph, merge_jobs, merge_services, merge_steps};
use crate::lockfile::render_lockfile;
use crate::mcp::render_mcp_config;
use crate::network::{blocked_domains, engine_allowed_domains, firewall_enabled};
use crate::strict::{check_sandbox_conflicts, validate_strict};
use awc_core::{
    split_frontmatter, CompileError, EngineConfig, ErrorCollector, SafeOutputKind, Warning,
    WorkflowSpec,
};
use awc_domains::EcosystemTable;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// A compiled workflow and its lock document.
#[derive(Debug)]
pub struct Compiled {
    pub spec: WorkflowSpec,
    pub lockfile: String,
}

impl Compiled {
    pub fn warnings(&self) -> &[Warning] {
        &self.spec.warnings
    }
}

/// Where the lock document for `source` is written: `x.md` → `x.lock.yml`.
pub fn lock_path(source: &Path) -> PathBuf {
    source.with_extension("lock.yml")
}

pub struct Compiler {
    config: CompilerConfig,
    engines: EngineRegistry,
    table: Arc<EcosystemTable>,
    pins: Arc<ActionPinCache>,
    repo_features: Arc<RepoFeatureCache>,
    repository: Option<String>,
    imports: Arc<dyn ImportResolver>,
    registry: Option<Arc<dyn PackageRegistry>>,
}

impl Compiler {
    /// Compiler with the bundled ecosystem table and built-in engines.
    pub fn new(config: CompilerConfig) -> Result<Self, CompileError> {
        let table = EcosystemTable::bundled()
            .map_err(|e| CompileError::invalid("ecosystems", e.to_string()))?;
        Ok(Self::with_table(config, Arc::new(table)))
    }

    pub fn with_table(config: CompilerConfig, table: Arc<EcosystemTable>) -> Self {
        let pins = ActionPinCache::with_defaults();
        for (action, sha) in &config.action_pins {
            pins.insert(action.as_str(), sha.as_str());
        }
        Self {
            config,
            engines: EngineRegistry::builtin(),
            table,
            pins: Arc::new(pins),
            repo_features: Arc::new(RepoFeatureCache::new()),
            repository: None,
            imports: Arc::new(NoImports),
            registry: None,
        }
    }

    pub fn with_imports(mut self, imports: Arc<dyn ImportResolver>) -> Self {
        self.imports = imports;
        self
    }

    /// Enable advisory package checks for launcher-based MCP servers.
    pub fn with_package_registry(mut self, registry: Arc<dyn PackageRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Repository the workflows will run in, for feature checks.
    pub fn with_repository(mut self, repository: impl Into<String>) -> Self {
        self.repository = Some(repository.into());
        self
    }

    pub fn config(&self) -> &CompilerConfig {
        &self.config
    }

    pub fn action_pins(&self) -> &ActionPinCache {
        &self.pins
    }

    pub fn repo_features(&self) -> &RepoFeatureCache {
        &self.repo_features
    }

    /// Parse and derive a workflow file. The id is the file name without extension.
    pub fn parse_workflow_file(&self, path: &Path) -> Result<WorkflowSpec, CompileError> {
        let source = std::fs::read_to_string(path)
            .map_err(|source| CompileError::Io { path: path.to_path_buf(), source })?;
        self.parse_str(&workflow_id(path), &source)
    }

    /// Parse and derive a workflow from source text.
    pub fn parse_str(&self, id: &str, source: &str) -> Result<WorkflowSpec, CompileError> {
        let mut errors = ErrorCollector::new(self.config.error_mode);
        let (fm, markdown) =
            split_frontmatter(source).map_err(|e| CompileError::invalid("frontmatter", e.to_string()))?;
        let declares_engine = fm.contains_key("engine");
        let mut spec = WorkflowSpec::from_frontmatter(id, fm, markdown, &mut errors)?;
        if !declares_engine {
            spec.engine = EngineConfig::new(self.config.default_engine);
        }
        let engine = self.engines.get(spec.engine.id)?;
        tracing::debug!(workflow = %spec.id, engine = %spec.engine.id, "compiling workflow");

        let fragments = self.imports.resolve(&spec)?;
        if !fragments.is_empty() {
            let mut warnings = merge_jobs(&mut spec.jobs, &fragments.jobs);
            warnings.extend(merge_steps(&mut spec.steps, &fragments.steps));
            warnings.extend(merge_services(&mut spec.services, &fragments.services));
            record(&mut spec, warnings);
        }

        errors.check(check_sandbox_conflicts(&spec))?;
        self.derive(&mut spec, engine.as_ref(), &mut errors)?;

        if spec.is_strict(self.config.strict) {
            if let Some(report) =
                errors.check(validate_strict(&spec, engine.as_ref(), &self.table, self.config.error_mode))?
            {
                record(&mut spec, report.warnings);
            }
        }
        if let Some(registry) = &self.registry {
            let warnings = check_packages(&spec, registry.as_ref());
            record(&mut spec, warnings);
        }
        let warnings = self.check_repo_features(&spec);
        record(&mut spec, warnings);

        if let Some(built) = errors.check(build_job_graph(&spec, engine.as_ref(), &self.pins))? {
            record(&mut spec, built.warnings);
            spec.job_graph.set("job_graph", built.graph)?;
        }

        errors.finish()?;
        tracing::debug!(
            workflow = %spec.id,
            warnings = spec.warnings.len(),
            "compiled workflow"
        );
        Ok(spec)
    }

    /// Compile a workflow file into its lock document.
    pub fn compile_file(&self, path: &Path) -> Result<Compiled, CompileError> {
        let spec = self.parse_workflow_file(path)?;
        let source = path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
        self.finish(spec, &source)
    }

    /// Compile source text into a lock document.
    pub fn compile_str(&self, id: &str, source: &str) -> Result<Compiled, CompileError> {
        let spec = self.parse_str(id, source)?;
        self.finish(spec, &format!("{id}.md"))
    }

    fn finish(&self, spec: WorkflowSpec, source: &str) -> Result<Compiled, CompileError> {
        let Some(graph) = spec.job_graph.get() else {
            return Err(CompileError::JobGraph("workflow has no job graph".to_string()));
        };
        let lockfile = render_lockfile(&spec, graph, source)?;
        Ok(Compiled { spec, lockfile })
    }

    /// Network, tool-permission, and MCP slots.
    fn derive(
        &self,
        spec: &mut WorkflowSpec,
        engine: &dyn Engine,
        errors: &mut ErrorCollector,
    ) -> Result<(), CompileError> {
        let allowed = engine_allowed_domains(engine, spec, &self.table);
        let blocked = blocked_domains(spec, &self.table);
        let firewall = firewall_enabled(engine, spec);
        tracing::debug!(
            workflow = %spec.id,
            allowed = allowed.len(),
            blocked = blocked.len(),
            firewall,
            "resolved network"
        );
        spec.allowed_domains.set("allowed_domains", allowed)?;
        spec.blocked_domains.set("blocked_domains", blocked)?;
        spec.firewall_enabled.set("firewall_enabled", firewall)?;

        let permissions = compute_tool_permissions(engine, spec);
        spec.tool_permissions.set("tool_permissions", permissions)?;

        if let Some(mcp) = errors.check(render_mcp_config(engine, spec, &self.table))? {
            spec.mcp_config.set("mcp_config", mcp)?;
        }
        Ok(())
    }

    fn check_repo_features(&self, spec: &WorkflowSpec) -> Vec<Warning> {
        let (Some(repo), Some(outputs)) = (&self.repository, &spec.safe_outputs) else {
            return Vec::new();
        };
        let Some(features) = self.repo_features.get(repo) else { return Vec::new() };
        let mut warnings = Vec::new();
        let disabled = [
            (SafeOutputKind::CreateIssue, features.issues, "issues"),
            (SafeOutputKind::CreateDiscussion, features.discussions, "discussions"),
        ];
        for (kind, enabled, feature) in disabled {
            if outputs.is_declared(kind) && !enabled {
                warnings.push(Warning::new(
                    format!("safe-outputs.{}", kind.key()),
                    format!("{repo} has {feature} disabled; the {} job will fail", kind.job_name()),
                ));
            }
        }
        warnings
    }
}

fn workflow_id(path: &Path) -> String {
    path.file_stem().map(|s| s.to_string_lossy().into_owned()).unwrap_or_default()
}

/// Log and keep warnings from a phase.
fn record(spec: &mut WorkflowSpec, warnings: Vec<Warning>) {
    for warning in warnings {
        spec.warn(warning.location, warning.message);
    }
}

#[cfg(test)]
#[path = "compiler_tests.rs"]
mod tests;
