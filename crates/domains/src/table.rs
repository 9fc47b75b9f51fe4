// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The ecosystem table: identifier → curated domain pattern set.

use crate::pattern::{is_valid_domain_pattern, pattern_matches};
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;

const BUNDLED_ECOSYSTEMS: &str = include_str!("../data/ecosystems.json");

/// Lookup order for [`EcosystemTable::ecosystem_of`].
///
/// Sub-ecosystems come before the ecosystem they were carved out of
/// (`node-cdns` before `node`, `linux-distros` before `defaults`). Ecosystems
/// missing from this list are checked afterwards in lexicographic order.
pub const ECOSYSTEM_PRIORITY: &[&str] = &[
    "node-cdns",
    "node",
    "python",
    "go",
    "rust",
    "java",
    "dotnet",
    "ruby",
    "php",
    "dart",
    "swift",
    "terraform",
    "containers",
    "playwright",
    "github",
    "linux-distros",
    "defaults",
];

/// Errors from loading an ecosystem table.
#[derive(Debug, Error)]
pub enum EcosystemError {
    #[error("invalid ecosystem data: {0}")]
    Json(#[from] serde_json::Error),
    #[error("ecosystem '{0}' has no domains")]
    Empty(String),
    #[error("ecosystem '{ecosystem}' contains invalid domain pattern '{pattern}'")]
    InvalidPattern { ecosystem: String, pattern: String },
}

/// Immutable mapping from ecosystem identifier to a sorted, deduplicated
/// set of domain patterns.
#[derive(Debug, Clone)]
pub struct EcosystemTable {
    ecosystems: BTreeMap<String, Vec<String>>,
    lookup_order: Vec<String>,
}

impl EcosystemTable {
    /// Load the table bundled with this crate.
    pub fn bundled() -> Result<Self, EcosystemError> {
        Self::from_json(BUNDLED_ECOSYSTEMS)
    }

    /// Parse a table from its JSON form (`{ "python": ["pypi.org", ...] }`).
    pub fn from_json(content: &str) -> Result<Self, EcosystemError> {
        let raw: BTreeMap<String, Vec<String>> = serde_json::from_str(content)?;
        let mut ecosystems = BTreeMap::new();
        for (id, patterns) in raw {
            if patterns.is_empty() {
                return Err(EcosystemError::Empty(id));
            }
            let mut set = BTreeSet::new();
            for pattern in patterns {
                let pattern = pattern.trim().to_ascii_lowercase();
                if !is_valid_domain_pattern(&pattern) {
                    return Err(EcosystemError::InvalidPattern { ecosystem: id, pattern });
                }
                set.insert(pattern);
            }
            ecosystems.insert(id, set.into_iter().collect());
        }

        let mut lookup_order: Vec<String> = ECOSYSTEM_PRIORITY
            .iter()
            .filter(|id| ecosystems.contains_key(**id))
            .map(|id| id.to_string())
            .collect();
        // BTreeMap keys are already in lexicographic order
        for id in ecosystems.keys() {
            if !ECOSYSTEM_PRIORITY.contains(&id.as_str()) {
                lookup_order.push(id.clone());
            }
        }

        tracing::debug!(ecosystems = ecosystems.len(), "loaded ecosystem table");
        Ok(Self { ecosystems, lookup_order })
    }

    /// Returns true if `id` names a known ecosystem.
    pub fn is_ecosystem(&self, id: &str) -> bool {
        self.ecosystems.contains_key(id)
    }

    /// Domain patterns for ecosystem `id`, sorted.
    pub fn domains(&self, id: &str) -> Option<&[String]> {
        self.ecosystems.get(id).map(Vec::as_slice)
    }

    /// All ecosystem identifiers in lexicographic order.
    pub fn ecosystem_ids(&self) -> impl Iterator<Item = &str> {
        self.ecosystems.keys().map(String::as_str)
    }

    /// The ecosystem a domain belongs to.
    ///
    /// Deterministic when a domain appears in several ecosystems: the first
    /// match in [`ECOSYSTEM_PRIORITY`] order wins.
    pub fn ecosystem_of(&self, domain: &str) -> Option<&str> {
        self.lookup_order
            .iter()
            .find(|id| {
                self.ecosystems
                    .get(id.as_str())
                    .is_some_and(|patterns| patterns.iter().any(|p| pattern_matches(p, domain)))
            })
            .map(String::as_str)
    }

    /// Expand a list of entries: ecosystem identifiers expand to their full
    /// domain set, anything else is kept as a literal domain.
    pub(crate) fn expand<'a>(&self, entries: impl IntoIterator<Item = &'a String>) -> BTreeSet<String> {
        let mut out = BTreeSet::new();
        for entry in entries {
            match self.ecosystems.get(entry) {
                Some(domains) => out.extend(domains.iter().cloned()),
                None => {
                    out.insert(entry.clone());
                }
            }
        }
        out
    }
}

#[cfg(test)]
#[path = "table_tests.rs"]
mod tests;
