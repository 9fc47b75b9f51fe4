// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Auto-provisioning: bare launcher commands resolve to a well-known image.

/// A container image and entrypoint standing in for a bare command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Provisioned {
    pub image: &'static str,
    pub entrypoint: &'static str,
}

const KNOWN_LAUNCHERS: &[(&str, Provisioned)] = &[
    ("node", Provisioned { image: "node:lts-alpine", entrypoint: "node" }),
    ("npx", Provisioned { image: "node:lts-alpine", entrypoint: "npx" }),
    ("python", Provisioned { image: "python:3.12-alpine", entrypoint: "python" }),
    ("python3", Provisioned { image: "python:3.12-alpine", entrypoint: "python3" }),
    ("uvx", Provisioned { image: "ghcr.io/astral-sh/uv:python3.12-alpine", entrypoint: "uvx" }),
];

/// Resolve a bare command name. Paths and unknown commands return `None`.
pub fn provision(command: &str) -> Option<Provisioned> {
    KNOWN_LAUNCHERS.iter().find(|(name, _)| *name == command.trim()).map(|(_, p)| *p)
}

/// Launcher names that can be provisioned, for diagnostics.
pub fn known_launchers() -> Vec<&'static str> {
    KNOWN_LAUNCHERS.iter().map(|(name, _)| *name).collect()
}

#[cfg(test)]
#[path = "provision_tests.rs"]
mod tests;
