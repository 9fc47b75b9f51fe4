// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Process-wide caches shared across compilation runs.

use parking_lot::Mutex;
use std::collections::{BTreeMap, HashMap};

/// Commit pins for the actions generated jobs use.
const DEFAULT_PINS: &[(&str, &str)] = &[
    ("actions/cache@v4", "5a3ec84eff668545956fd18022155c47e93e2684"),
    ("actions/checkout@v4", "11bd71901bbe5b1630ceea73d27597364c9af683"),
    ("actions/download-artifact@v4", "d3f86a106a0bac45b974a628896c90dbdf5c8093"),
    ("actions/upload-artifact@v4", "ea165f8d65b6e75b540449e92b4886f43607fa02"),
];

/// `owner/repo@tag` → commit SHA.
#[derive(Debug)]
pub struct ActionPinCache {
    pins: Mutex<BTreeMap<String, String>>,
}

impl Default for ActionPinCache {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl ActionPinCache {
    /// Cache holding no pins; every action resolves to itself.
    pub fn empty() -> Self {
        Self { pins: Mutex::new(BTreeMap::new()) }
    }

    pub fn with_defaults() -> Self {
        let pins = DEFAULT_PINS.iter().map(|(a, sha)| (a.to_string(), sha.to_string())).collect();
        Self { pins: Mutex::new(pins) }
    }

    pub fn insert(&self, action: impl Into<String>, sha: impl Into<String>) {
        self.pins.lock().insert(action.into(), sha.into());
    }

    /// The pinned reference for `owner/repo@tag`, or the reference unchanged.
    pub fn resolve(&self, action: &str) -> String {
        let pins = self.pins.lock();
        match (pins.get(action), action.split_once('@')) {
            (Some(sha), Some((repo, _))) => format!("{repo}@{sha}"),
            _ => action.to_string(),
        }
    }

    pub fn len(&self) -> usize {
        self.pins.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.pins.lock().is_empty()
    }

    pub fn clear(&self) {
        self.pins.lock().clear();
    }
}

/// Repository features that change what a workflow may do.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RepoFeatures {
    pub discussions: bool,
    pub issues: bool,
}

/// `owner/repo` → features, filled by whoever queried the host.
#[derive(Debug, Default)]
pub struct RepoFeatureCache {
    features: Mutex<HashMap<String, RepoFeatures>>,
}

impl RepoFeatureCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, repo: &str) -> Option<RepoFeatures> {
        self.features.lock().get(repo).copied()
    }

    pub fn insert(&self, repo: impl Into<String>, features: RepoFeatures) {
        self.features.lock().insert(repo.into(), features);
    }

    pub fn clear(&self) {
        self.features.lock().clear();
    }
}

#[cfg(test)]
#[path = "cache_tests.rs"]
mod tests;
