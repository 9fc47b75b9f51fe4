// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use yare::parameterized;

#[parameterized(
    npx = { "npx", "node:lts-alpine", "npx" },
    uvx = { "uvx", "ghcr.io/astral-sh/uv:python3.12-alpine", "uvx" },
    python = { "python", "python:3.12-alpine", "python" },
    python3 = { "python3", "python:3.12-alpine", "python3" },
    node = { "node", "node:lts-alpine", "node" },
)]
fn known_launchers_resolve(command: &str, image: &str, entrypoint: &str) {
    let provisioned = provision(command).unwrap();
    assert_eq!(provisioned.image, image);
    assert_eq!(provisioned.entrypoint, entrypoint);
}

#[parameterized(
    docker = { "docker" },
    path = { "/usr/bin/npx" },
    script = { "./server.sh" },
)]
fn unknown_commands_do_not_resolve(command: &str) {
    assert_eq!(provision(command), None);
}

#[test]
fn launchers_are_listed_sorted() {
    assert_eq!(known_launchers(), vec!["node", "npx", "python", "python3", "uvx"]);
}
