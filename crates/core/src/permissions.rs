// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Token permission grants for the workflow and its jobs.
//!
//! Accepts the shorthand strings `read-all` / `write-all` or a map of
//! scope → `read` | `write` | `none`.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize, Serializer};

/// Scopes whose `write` grant strict mode refuses. Mutations on these go
/// through safe-output jobs instead.
pub const SENSITIVE_SCOPES: [&str; 3] = ["contents", "issues", "pull-requests"];

/// Scopes the runner recognizes.
pub const KNOWN_SCOPES: &[&str] = &[
    "actions",
    "attestations",
    "checks",
    "contents",
    "deployments",
    "discussions",
    "id-token",
    "issues",
    "models",
    "packages",
    "pages",
    "pull-requests",
    "repository-projects",
    "security-events",
    "statuses",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PermissionLevel {
    None,
    Read,
    Write,
}

crate::simple_display! {
    PermissionLevel {
        None => "none",
        Read => "read",
        Write => "write",
    }
}

/// A permission grant.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "RawPermissions")]
pub enum Permissions {
    ReadAll,
    WriteAll,
    Scoped(IndexMap<String, PermissionLevel>),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawPermissions {
    Shorthand(String),
    Scoped(IndexMap<String, PermissionLevel>),
}

impl TryFrom<RawPermissions> for Permissions {
    type Error = String;

    fn try_from(raw: RawPermissions) -> Result<Self, Self::Error> {
        match raw {
            RawPermissions::Shorthand(s) => match s.as_str() {
                "read-all" => Ok(Permissions::ReadAll),
                "write-all" => Ok(Permissions::WriteAll),
                other => Err(format!(
                    "unknown permission shorthand '{other}'; expected 'read-all', 'write-all', \
                     or a map such as {{ contents: read }}"
                )),
            },
            RawPermissions::Scoped(map) => {
                if let Some(unknown) = map.keys().find(|k| !KNOWN_SCOPES.contains(&k.as_str())) {
                    return Err(format!(
                        "unknown permission scope '{unknown}'; valid scopes are: {}",
                        KNOWN_SCOPES.join(", ")
                    ));
                }
                Ok(Permissions::Scoped(map))
            }
        }
    }
}

impl Serialize for Permissions {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Permissions::ReadAll => serializer.serialize_str("read-all"),
            Permissions::WriteAll => serializer.serialize_str("write-all"),
            Permissions::Scoped(map) => map.serialize(serializer),
        }
    }
}

impl Default for Permissions {
    fn default() -> Self {
        Permissions::Scoped(IndexMap::new())
    }
}

impl Permissions {
    /// Build a scoped grant from `(scope, level)` pairs.
    pub fn scoped<'a>(entries: impl IntoIterator<Item = (&'a str, PermissionLevel)>) -> Self {
        Permissions::Scoped(entries.into_iter().map(|(k, v)| (k.to_string(), v)).collect())
    }

    /// Effective level for one scope.
    pub fn level(&self, scope: &str) -> PermissionLevel {
        match self {
            Permissions::ReadAll => PermissionLevel::Read,
            Permissions::WriteAll => PermissionLevel::Write,
            Permissions::Scoped(map) => map.get(scope).copied().unwrap_or(PermissionLevel::None),
        }
    }

    /// Which of `scopes` are granted `write`, in the order given.
    pub fn scopes_with_write<'a>(&self, scopes: &[&'a str]) -> Vec<&'a str> {
        scopes.iter().copied().filter(|s| self.level(s) == PermissionLevel::Write).collect()
    }

    /// Return a copy with `scope` raised to at least `level`.
    pub fn with_at_least(&self, scope: &str, level: PermissionLevel) -> Self {
        match self {
            Permissions::WriteAll => Permissions::WriteAll,
            Permissions::ReadAll if level <= PermissionLevel::Read => Permissions::ReadAll,
            Permissions::ReadAll => {
                let mut map: IndexMap<String, PermissionLevel> =
                    KNOWN_SCOPES.iter().map(|s| (s.to_string(), PermissionLevel::Read)).collect();
                map.insert(scope.to_string(), level);
                Permissions::Scoped(map)
            }
            Permissions::Scoped(map) => {
                let mut map = map.clone();
                let entry = map.entry(scope.to_string()).or_insert(PermissionLevel::None);
                *entry = (*entry).max(level);
                Permissions::Scoped(map)
            }
        }
    }
}

#[cfg(test)]
#[path = "permissions_tests.rs"]
mod tests;
