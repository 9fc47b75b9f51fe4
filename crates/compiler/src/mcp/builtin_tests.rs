// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use awc_core::test_support::frontmatter;

fn table() -> EcosystemTable {
    EcosystemTable::bundled().unwrap()
}

fn names(yaml: &str) -> Vec<String> {
    builtin_servers(&frontmatter(yaml), &table()).into_iter().map(|(name, _)| name).collect()
}

fn server(yaml: &str, name: &str) -> McpDescriptor {
    builtin_servers(&frontmatter(yaml), &table())
        .into_iter()
        .find(|(n, _)| n == name)
        .map(|(_, desc)| desc)
        .unwrap()
}

#[test]
fn github_is_on_by_default() {
    assert_eq!(names("engine: claude"), vec!["github"]);
    assert!(names("tools:\n  github: false").is_empty());
}

#[test]
fn emission_order_is_fixed() {
    let yaml = "tools:\n  serena:\n  playwright:\nsafe-inputs:\n  greet:\n    description: hi\n    run: echo hi\nsafe-outputs:\n  create-issue:";
    assert_eq!(names(yaml), vec!["github", "playwright", "serena", "safeoutputs", "safeinputs"]);
}

#[test]
fn github_local_uses_pinned_image_and_default_token() {
    let McpDescriptor::ContainerStdio(github) = server("engine: claude", "github") else {
        panic!("expected container server");
    };
    assert_eq!(github.container, format!("{GITHUB_MCP_IMAGE}:{GITHUB_MCP_VERSION}"));
    assert_eq!(github.env["GITHUB_PERSONAL_ACCESS_TOKEN"], DEFAULT_GITHUB_TOKEN);
    assert_eq!(github.env["GITHUB_TOOLSETS"], "default");
    assert!(!github.env.contains_key("GITHUB_READ_ONLY"));
}

#[test]
fn github_remote_read_only() {
    let yaml = "tools:\n  github:\n    mode: remote\n    read-only: true\n    github-token: ${{ secrets.MY_PAT }}";
    let McpDescriptor::RemoteHttp(github) = server(yaml, "github") else {
        panic!("expected http server");
    };
    assert_eq!(github.url, GITHUB_REMOTE_READONLY_URL);
    assert_eq!(github.headers["Authorization"], "Bearer ${{ secrets.MY_PAT }}");
}

#[test]
fn github_allow_list_is_carried() {
    let desc = server("tools:\n  github:\n    allowed: [get_issue, list_issues]", "github");
    assert_eq!(desc.allowed(), ["get_issue".to_string(), "list_issues".to_string()]);
    assert!(server("tools:\n  github:\n    allowed: [\"*\"]", "github").allowed().is_empty());
}

#[test]
fn playwright_expands_ecosystems() {
    let McpDescriptor::ContainerStdio(pw) =
        server("tools:\n  playwright:\n    allowed_domains: [github, example.com]", "playwright")
    else {
        panic!("expected container server");
    };
    let hosts = &pw.entrypoint_args[3];
    assert!(hosts.contains("example.com"));
    assert!(hosts.contains("codeload.github.com"));
}

#[test]
fn playwright_defaults_to_localhost() {
    let pw = PlaywrightTool::default();
    assert_eq!(playwright_domains(&pw, &table()), vec!["localhost", "127.0.0.1"]);
}

#[test]
fn safe_outputs_server_mounts_scratch_dir() {
    let McpDescriptor::ContainerStdio(so) =
        server("safe-outputs:\n  staged: true\n  add-comment:", "safeoutputs")
    else {
        panic!("expected container server");
    };
    assert_eq!(so.entrypoint.as_deref(), Some("node"));
    assert_eq!(so.mounts, vec![AWC_TMP_MOUNT]);
    assert_eq!(so.env["AWC_SAFE_OUTPUTS_STAGED"], "true");
    assert!(so.passthrough_env.contains(&"GITHUB_REPOSITORY".to_string()));
}

#[test]
fn safe_inputs_allow_their_tools() {
    let yaml = "safe-inputs:\n  greet:\n    description: hi\n    run: echo hi\n    env:\n      TOKEN: ${{ secrets.T }}";
    let McpDescriptor::ContainerStdio(si) = server(yaml, "safeinputs") else {
        panic!("expected container server");
    };
    assert_eq!(si.allowed, vec!["greet"]);
    assert_eq!(si.env["TOKEN"], "${{ secrets.T }}");
}
