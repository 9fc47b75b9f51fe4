// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::advisory::{FakePackageRegistry, PackageIndex};
use crate::cache::RepoFeatures;
use crate::imports::{Fragment, ImportedFragments, StaticImports};
use awc_core::{EngineId, ErrorMode, McpFormat, ToolPermissions};
use std::io::Write;

fn compiler() -> Compiler {
    Compiler::new(CompilerConfig::default()).unwrap()
}

const TRIAGE: &str = r#"---
name: Issue Triage
on: issues
engine: claude
permissions:
  contents: read
  issues: read
tools:
  bash: ["echo", "ls"]
safe-outputs:
  add-comment:
---
# Triage

Label issue #${{ github.event.issue.number }}.
"#;

#[test]
fn every_derived_slot_is_populated() {
    let spec = compiler().parse_str("triage", TRIAGE).unwrap();
    assert_eq!(spec.name, "Issue Triage");
    assert_eq!(spec.engine.id, EngineId::Claude);
    assert!(spec.allowed_domains.get().is_some_and(|d| !d.is_empty()));
    assert!(spec.blocked_domains.get().is_some_and(Vec::is_empty));
    assert_eq!(spec.firewall_enabled.get(), Some(&false));
    assert_eq!(spec.mcp_config.get().unwrap().format, McpFormat::Json);
    assert!(spec.job_graph.get().unwrap().contains("add_comment"));

    let Some(ToolPermissions::Allowed(entries)) = spec.tool_permissions.get() else {
        panic!("expected an allow-list");
    };
    assert!(entries.contains(&"Bash(echo)".to_string()));
    assert!(entries.contains(&"Bash(ls)".to_string()));
}

#[test]
fn file_id_comes_from_stem() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("weekly-report.md");
    std::fs::write(&path, TRIAGE).unwrap();

    let spec = compiler().parse_workflow_file(&path).unwrap();
    assert_eq!(spec.id, "weekly-report");
    assert_eq!(spec.name, "Issue Triage");
}

#[test]
fn missing_file_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = compiler().parse_workflow_file(&dir.path().join("absent.md")).unwrap_err();
    assert!(matches!(err, CompileError::Io { .. }));
    assert!(err.to_string().contains("absent.md"));
}

#[test]
fn compile_file_renders_lock_document() {
    let mut file = tempfile::Builder::new().suffix(".md").tempfile().unwrap();
    file.write_all(TRIAGE.as_bytes()).unwrap();

    let compiled = compiler().compile_file(file.path()).unwrap();
    assert!(compiled.lockfile.starts_with("# This file was generated by awc"));
    assert!(compiled.lockfile.contains("add_comment:"));
    assert!(compiled.warnings().is_empty());
}

#[test]
fn lock_path_replaces_extension() {
    assert_eq!(lock_path(Path::new("wf/triage.md")), PathBuf::from("wf/triage.lock.yml"));
}

#[test]
fn undeclared_engine_uses_configured_default() {
    let config = CompilerConfig::default().default_engine(EngineId::Codex);
    let compiler = Compiler::new(config).unwrap();
    let spec = compiler.parse_str("plain", "---\non: issues\n---\n# Plain\n").unwrap();
    assert_eq!(spec.engine.id, EngineId::Codex);
    assert_eq!(spec.mcp_config.get().unwrap().format, McpFormat::Toml);

    let spec = compiler.parse_str("triage", TRIAGE).unwrap();
    assert_eq!(spec.engine.id, EngineId::Claude);
}

#[test]
fn configured_strictness_applies_unless_overridden() {
    let compiler = Compiler::new(CompilerConfig::default().strict(true)).unwrap();
    let source = "---\non: issues\nengine: codex\npermissions:\n  contents: write\n---\n# W\n";
    let err = compiler.parse_str("w", source).unwrap_err();
    assert!(matches!(err, CompileError::Strict { .. }));

    let relaxed = source.replace("engine: codex", "engine: codex\nstrict: false");
    assert!(compiler.parse_str("w", &relaxed).is_ok());
}

#[test]
fn errors_from_several_phases_are_collected() {
    let source = r#"---
on: issues
engine: codex
strict: true
permissions:
  issues: write
mcp-servers:
  notion:
    contianer: mcp/notion
---
# W
"#;
    let err = compiler().parse_str("w", source).unwrap_err();
    assert_eq!(err.count(), 2);
    let msg = err.to_string();
    assert!(msg.contains("unknown property 'contianer'"));
    assert!(msg.contains("permissions.issues"));
}

#[test]
fn fail_fast_reports_one_error() {
    let compiler = Compiler::new(CompilerConfig::default().error_mode(ErrorMode::FailFast)).unwrap();
    let source = "---\non: issues\nengine: codex\nstrict: true\npermissions:\n  issues: write\n  contents: write\n---\n# W\n";
    assert_eq!(compiler.parse_str("w", source).unwrap_err().count(), 1);
}

#[test]
fn imports_are_merged_with_local_precedence() {
    let fragments = ImportedFragments {
        jobs: vec![Fragment::new("shared.md", "lint:\n  runs-on: shared\ntest:\n  steps:\n    - run: make test")],
        steps: vec![Fragment::new("shared.md", "- name: Setup\n  run: ./setup.sh")],
        services: Vec::new(),
    };
    let compiler = compiler().with_imports(Arc::new(StaticImports(fragments)));
    let source = "---\non: issues\nengine: codex\nimports: [shared.md]\njobs:\n  lint:\n    runs-on: local\n    steps:\n      - run: make lint\n---\n# W\n";
    let spec = compiler.parse_str("w", source).unwrap();

    assert_eq!(spec.jobs.keys().collect::<Vec<_>>(), vec!["lint", "test"]);
    assert_eq!(spec.steps.len(), 1);
    assert_eq!(spec.warnings.len(), 1);
    assert_eq!(spec.warnings[0].location, "jobs.lint");
    assert!(spec.job_graph.get().unwrap().contains("test"));
}

#[test]
fn package_advisories_become_warnings() {
    let registry = FakePackageRegistry::new().with_package(PackageIndex::Npm, "known-server");
    let compiler = compiler().with_package_registry(Arc::new(registry));
    let source = "---\non: issues\nengine: codex\nmcp-servers:\n  ghost:\n    command: npx\n    args: [ghost-server]\n    allowed: [run]\n---\n# W\n";
    let spec = compiler.parse_str("w", source).unwrap();
    assert_eq!(spec.warnings.len(), 1);
    assert!(spec.warnings[0].message.contains("'ghost-server' was not found on npm"));
}

#[test]
fn disabled_repo_features_warn() {
    let compiler = compiler().with_repository("acme/widgets");
    compiler.repo_features().insert("acme/widgets", RepoFeatures { discussions: false, issues: true });
    let source = "---\non: issues\nengine: codex\nsafe-outputs:\n  create-discussion:\n  create-issue:\n---\n# W\n";
    let spec = compiler.parse_str("w", source).unwrap();
    assert_eq!(spec.warnings.len(), 1);
    assert_eq!(spec.warnings[0].location, "safe-outputs.create-discussion");
}

#[test]
fn extra_action_pins_are_applied() {
    let config = CompilerConfig::default().action_pin("actions/setup-node@v4", "abc123");
    let compiler = Compiler::new(config).unwrap();
    assert_eq!(compiler.action_pins().resolve("actions/setup-node@v4"), "actions/setup-node@abc123");
}

#[test]
fn firewall_and_srt_conflict_outside_strict_mode() {
    let source = "---\non: issues\nengine: claude\nnetwork:\n  firewall: true\nsandbox:\n  agent: srt\n---\n# W\n";
    let err = compiler().parse_str("w", source).unwrap_err();
    assert!(err.to_string().contains("cannot be combined"));
}

#[test]
fn broken_frontmatter_is_reported() {
    let err = compiler().parse_str("w", "---\non: issues\n# never closed\n").unwrap_err();
    assert!(err.to_string().starts_with("frontmatter:"));
}
