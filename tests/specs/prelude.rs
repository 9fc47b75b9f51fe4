// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared fixtures for the behavioral specs.

#![allow(dead_code)]

pub use awc_compiler::{Compiled, Compiler, CompilerConfig};
pub use awc_core::{CompileError, EngineId};
pub use serde_yaml::Value;
pub use similar_asserts::assert_eq;

use std::path::PathBuf;
use std::sync::Once;
use tempfile::TempDir;

static TRACING: Once = Once::new();

/// Route compiler logs to the test harness. Filter with `RUST_LOG`.
fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// A temporary directory holding workflow sources.
pub struct Project {
    dir: TempDir,
}

impl Project {
    pub fn empty() -> Self {
        init_tracing();
        Self { dir: tempfile::tempdir().unwrap() }
    }

    pub fn path(&self, rel: &str) -> PathBuf {
        self.dir.path().join(rel)
    }

    /// Write a file, creating parent directories.
    pub fn file(&self, rel: &str, content: &str) -> &Self {
        let path = self.path(rel);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(path, content).unwrap();
        self
    }

    pub fn compile(&self, rel: &str) -> Outcome {
        self.compile_with(&Compiler::new(CompilerConfig::default()).unwrap(), rel)
    }

    pub fn compile_with(&self, compiler: &Compiler, rel: &str) -> Outcome {
        Outcome { source: rel.to_string(), result: compiler.compile_file(&self.path(rel)) }
    }
}

/// Result of compiling one workflow file.
pub struct Outcome {
    source: String,
    result: Result<Compiled, CompileError>,
}

impl Outcome {
    #[track_caller]
    pub fn passes(self) -> Passed {
        match self.result {
            Ok(compiled) => {
                let lock = serde_yaml::from_str(&compiled.lockfile).unwrap();
                Passed { compiled, lock }
            }
            Err(e) => panic!("expected {} to compile, got:\n{e}", self.source),
        }
    }

    #[track_caller]
    pub fn fails(self) -> Failed {
        match self.result {
            Ok(_) => panic!("expected {} to fail to compile", self.source),
            Err(error) => Failed { error },
        }
    }
}

pub struct Passed {
    compiled: Compiled,
    lock: Value,
}

impl Passed {
    pub fn compiled(&self) -> &Compiled {
        &self.compiled
    }

    pub fn lock(&self) -> &Value {
        &self.lock
    }

    pub fn lock_text(&self) -> &str {
        &self.compiled.lockfile
    }

    #[track_caller]
    pub fn job(&self, name: &str) -> &Value {
        let job = &self.lock["jobs"][name];
        assert!(!job.is_null(), "no job '{name}' in:\n{}", self.compiled.lockfile);
        job
    }

    pub fn has_job(&self, name: &str) -> bool {
        !self.lock["jobs"][name].is_null()
    }

    /// Job names in document order.
    pub fn job_names(&self) -> Vec<String> {
        self.lock["jobs"]
            .as_mapping()
            .map(|jobs| jobs.keys().filter_map(Value::as_str).map(str::to_string).collect())
            .unwrap_or_default()
    }

    /// `needs` of a job as strings.
    pub fn needs(&self, name: &str) -> Vec<String> {
        self.job(name)["needs"]
            .as_sequence()
            .map(|needs| needs.iter().filter_map(Value::as_str).map(str::to_string).collect())
            .unwrap_or_default()
    }

    /// The first step of `job` with the given name.
    #[track_caller]
    pub fn step(&self, job: &str, name: &str) -> &Value {
        self.job(job)["steps"]
            .as_sequence()
            .and_then(|steps| steps.iter().find(|s| s["name"].as_str() == Some(name)))
            .unwrap_or_else(|| panic!("no step '{name}' in job '{job}'"))
    }

    #[track_caller]
    pub fn lock_has(&self, needle: &str) -> &Self {
        assert!(
            self.compiled.lockfile.contains(needle),
            "lock document does not contain '{needle}':\n{}",
            self.compiled.lockfile
        );
        self
    }

    #[track_caller]
    pub fn lock_lacks(&self, needle: &str) -> &Self {
        assert!(
            !self.compiled.lockfile.contains(needle),
            "lock document unexpectedly contains '{needle}'"
        );
        self
    }

    #[track_caller]
    pub fn warns(&self, needle: &str) -> &Self {
        let warnings = self.compiled.warnings();
        assert!(
            warnings.iter().any(|w| w.to_string().contains(needle)),
            "no warning containing '{needle}' in {warnings:?}"
        );
        self
    }

    #[track_caller]
    pub fn no_warnings(&self) -> &Self {
        let warnings = self.compiled.warnings();
        assert!(warnings.is_empty(), "unexpected warnings: {warnings:?}");
        self
    }
}

pub struct Failed {
    error: CompileError,
}

impl Failed {
    pub fn error(&self) -> &CompileError {
        &self.error
    }

    #[track_caller]
    pub fn error_has(&self, needle: &str) -> &Self {
        let message = self.error.to_string();
        assert!(message.contains(needle), "error does not contain '{needle}':\n{message}");
        self
    }

    #[track_caller]
    pub fn error_count(&self, count: usize) -> &Self {
        assert_eq!(self.error.count(), count, "errors:\n{}", self.error);
        self
    }
}

/// Join frontmatter and a markdown body into a workflow source.
pub fn workflow(frontmatter: &str, body: &str) -> String {
    format!("---\n{}\n---\n{body}\n", frontmatter.trim())
}
