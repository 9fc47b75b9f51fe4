// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Allow/block list resolution against the ecosystem table.

use crate::pattern::host_matches;
use crate::table::EcosystemTable;
use serde::{Deserialize, Serialize};

/// The implicit ecosystem used when no allow-list is declared.
pub const DEFAULTS_ECOSYSTEM: &str = "defaults";

/// Declared network allow/block lists.
///
/// `allowed: None` means "not declared" and resolves to the defaults
/// ecosystem. `allowed: Some(vec![])` is an explicit deny-all.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainPolicy {
    #[serde(default)]
    pub allowed: Option<Vec<String>>,
    #[serde(default)]
    pub blocked: Vec<String>,
}

impl DomainPolicy {
    /// Policy with an explicit allow-list.
    pub fn allowing<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self { allowed: Some(entries.into_iter().map(Into::into).collect()), blocked: Vec::new() }
    }

    /// True when the allow-list contains a bare `*`.
    pub fn allows_everything(&self) -> bool {
        self.allowed.as_ref().is_some_and(|a| a.iter().any(|e| e == "*"))
    }
}

impl EcosystemTable {
    /// Resolve the allow-list to a sorted, unique domain list.
    pub fn resolve_allowed_domains(&self, policy: &DomainPolicy) -> Vec<String> {
        match &policy.allowed {
            None => self.domains(DEFAULTS_ECOSYSTEM).map(<[String]>::to_vec).unwrap_or_default(),
            Some(entries) => self.expand(entries).into_iter().collect(),
        }
    }

    /// Resolve the block-list to a sorted, unique domain list.
    pub fn resolve_blocked_domains(&self, policy: &DomainPolicy) -> Vec<String> {
        self.expand(&policy.blocked).into_iter().collect()
    }

    /// The allow-list after merging `extra` domains and removing anything
    /// covered by the block-list.
    ///
    /// Blocking is applied last, after full expansion, so a blocked domain
    /// wins over any ecosystem that would otherwise allow it.
    pub fn effective_allowed_domains<I, S>(&self, policy: &DomainPolicy, extra: I) -> Vec<String>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut allowed: std::collections::BTreeSet<String> =
            self.resolve_allowed_domains(policy).into_iter().collect();
        allowed.extend(extra.into_iter().map(Into::into));
        let blocked = self.resolve_blocked_domains(policy);
        allowed.into_iter().filter(|domain| !host_matches(&blocked, domain)).collect()
    }
}

#[cfg(test)]
#[path = "policy_tests.rs"]
mod tests;
