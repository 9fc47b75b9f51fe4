// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! awc-domains: network domain ecosystems and allow/block list resolution
//!
//! An ecosystem identifier (`python`, `node`, `containers`, ...) expands to
//! the curated set of domains that ecosystem's package infrastructure needs.
//! The table is bundled as `data/ecosystems.json`, loaded once into an
//! immutable [`EcosystemTable`], and shared by reference.

mod pattern;
mod policy;
mod table;

pub use pattern::{host_matches, is_valid_domain_pattern, pattern_matches};
pub use policy::{DomainPolicy, DEFAULTS_ECOSYSTEM};
pub use table::{EcosystemError, EcosystemTable, ECOSYSTEM_PRIORITY};
