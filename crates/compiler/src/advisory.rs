// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Advisory package-existence checks for launcher-based MCP servers.
//!
//! A server declared as `command: npx` or `command: uvx` names a package
//! in its first argument. The registry lookup is best effort: one attempt,
//! and any outcome other than "exists" becomes a warning.

use awc_core::{Warning, WorkflowSpec};
use serde_yaml::Value;
use thiserror::Error;

/// Errors from registry lookups
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("lookup failed: {0}")]
    LookupFailed(String),
}

/// Public package index a launcher installs from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PackageIndex {
    Npm,
    PyPi,
}

awc_core::simple_display! {
    PackageIndex {
        Npm => "npm",
        PyPi => "PyPI",
    }
}

impl PackageIndex {
    fn for_launcher(command: &str) -> Option<Self> {
        match command {
            "npx" => Some(PackageIndex::Npm),
            "uvx" => Some(PackageIndex::PyPi),
            _ => None,
        }
    }
}

/// Adapter for checking that a package exists on a public index
pub trait PackageRegistry: Send + Sync {
    fn exists(&self, index: PackageIndex, package: &str) -> Result<bool, RegistryError>;
}

/// Check every launcher-based MCP server's package.
pub fn check_packages(spec: &WorkflowSpec, registry: &dyn PackageRegistry) -> Vec<Warning> {
    let mut warnings = Vec::new();
    for (name, decl) in &spec.mcp_servers {
        let Some((index, package)) = launcher_package(decl) else { continue };
        let location = format!("mcp-servers.{name}");
        match registry.exists(index, &package) {
            Ok(true) => tracing::debug!(server = %name, %package, %index, "package found"),
            Ok(false) => warnings.push(Warning::new(
                location,
                format!("package '{package}' was not found on {index}"),
            )),
            Err(e) => {
                tracing::debug!(server = %name, %package, error = %e, "package check failed");
                warnings.push(Warning::new(
                    location,
                    format!("could not verify package '{package}' on {index}: {e}"),
                ));
            }
        }
    }
    warnings
}

/// The package a launcher declaration installs, with any `@version` suffix removed.
fn launcher_package(decl: &Value) -> Option<(PackageIndex, String)> {
    let index = PackageIndex::for_launcher(decl.get("command")?.as_str()?)?;
    let package = decl
        .get("args")?
        .as_sequence()?
        .iter()
        .filter_map(Value::as_str)
        .find(|arg| !arg.is_empty() && !arg.starts_with('-'))?;
    let name = match index {
        // Keep the scope marker on `@scope/pkg@1.0`.
        PackageIndex::Npm => match package.char_indices().skip(1).find(|&(_, c)| c == '@') {
            Some((at, _)) => &package[..at],
            None => package,
        },
        PackageIndex::PyPi => package.split(['=', '<', '>', '[']).next().unwrap_or(package),
    };
    Some((index, name.to_string()))
}

#[cfg(any(test, feature = "test-support"))]
mod fake {
    use super::{PackageIndex, PackageRegistry, RegistryError};
    use parking_lot::Mutex;
    use std::collections::HashSet;

    /// Recorded lookup
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct LookupCall {
        pub index: PackageIndex,
        pub package: String,
    }

    /// In-memory registry with a fixed set of known packages.
    #[derive(Default)]
    pub struct FakePackageRegistry {
        known: HashSet<(PackageIndex, String)>,
        offline: bool,
        calls: Mutex<Vec<LookupCall>>,
    }

    impl FakePackageRegistry {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_package(mut self, index: PackageIndex, package: &str) -> Self {
            self.known.insert((index, package.to_string()));
            self
        }

        /// Every lookup fails.
        pub fn offline() -> Self {
            Self { offline: true, ..Self::default() }
        }

        pub fn calls(&self) -> Vec<LookupCall> {
            self.calls.lock().clone()
        }
    }

    impl PackageRegistry for FakePackageRegistry {
        fn exists(&self, index: PackageIndex, package: &str) -> Result<bool, RegistryError> {
            self.calls.lock().push(LookupCall { index, package: package.to_string() });
            if self.offline {
                return Err(RegistryError::LookupFailed("network unreachable".to_string()));
            }
            Ok(self.known.contains(&(index, package.to_string())))
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakePackageRegistry, LookupCall};

#[cfg(test)]
#[path = "advisory_tests.rs"]
mod tests;
