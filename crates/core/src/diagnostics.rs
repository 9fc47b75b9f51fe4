// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Compilation errors, warnings, and the error collector.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort compilation of a workflow document.
#[derive(Debug, Error)]
pub enum CompileError {
    #[error("{location}: {message}")]
    InvalidFormat { location: String, message: String },

    #[error(
        "mcp-servers.{server}: unknown property '{key}'; valid properties are: {valid}"
    )]
    UnknownMcpKey { server: String, key: String, valid: String },

    #[error(
        "mcp-servers.{server}: cannot determine the server type; set 'url' for an http \
         server, or 'command'/'container' for a stdio server\n\n\
         Example:\nmcp-servers:\n  {server}:\n    container: \"ghcr.io/example/server:latest\""
    )]
    UnresolvedMcpType { server: String },

    #[error("strict mode: {location}: {message}")]
    Strict { location: String, message: String },

    #[error("job graph: {0}")]
    JobGraph(String),

    #[error("unknown engine '{id}'; available engines: {available}")]
    UnknownEngine { id: String, available: String },

    #[error("internal: '{0}' was written by more than one phase")]
    PhaseViolation(&'static str),

    #[error("failed to read '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{}", join_errors(.0))]
    Multiple(Vec<CompileError>),
}

fn join_errors(errors: &[CompileError]) -> String {
    errors.iter().map(ToString::to_string).collect::<Vec<_>>().join("\n")
}

impl CompileError {
    /// Shorthand for [`CompileError::InvalidFormat`].
    pub fn invalid(location: impl Into<String>, message: impl Into<String>) -> Self {
        CompileError::InvalidFormat { location: location.into(), message: message.into() }
    }

    /// Shorthand for [`CompileError::Strict`].
    pub fn strict(location: impl Into<String>, message: impl Into<String>) -> Self {
        CompileError::Strict { location: location.into(), message: message.into() }
    }

    /// Number of individual errors carried (1 unless `Multiple`).
    pub fn count(&self) -> usize {
        match self {
            CompileError::Multiple(errors) => errors.iter().map(CompileError::count).sum(),
            _ => 1,
        }
    }
}

/// A non-fatal diagnostic. Compilation continues.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Warning {
    pub location: String,
    pub message: String,
}

impl Warning {
    pub fn new(location: impl Into<String>, message: impl Into<String>) -> Self {
        Self { location: location.into(), message: message.into() }
    }
}

impl std::fmt::Display for Warning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.location, self.message)
    }
}

/// How the collector reacts to the first error.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorMode {
    /// Return immediately on the first error.
    FailFast,
    /// Accumulate every error and report them together.
    #[default]
    CollectAll,
}

crate::simple_display! {
    ErrorMode {
        FailFast => "fail-fast",
        CollectAll => "collect-all",
    }
}

/// Accumulates errors across compilation phases.
#[derive(Debug, Default)]
pub struct ErrorCollector {
    mode: ErrorMode,
    errors: Vec<CompileError>,
}

impl ErrorCollector {
    pub fn new(mode: ErrorMode) -> Self {
        Self { mode, errors: Vec::new() }
    }

    pub fn mode(&self) -> ErrorMode {
        self.mode
    }

    /// Record an error. In fail-fast mode the error is handed straight back.
    pub fn push(&mut self, err: CompileError) -> Result<(), CompileError> {
        match self.mode {
            ErrorMode::FailFast => Err(err),
            ErrorMode::CollectAll => {
                match err {
                    CompileError::Multiple(errors) => self.errors.extend(errors),
                    err => self.errors.push(err),
                }
                Ok(())
            }
        }
    }

    /// Unwrap a phase result, recording its error.
    ///
    /// Returns `Ok(None)` when the error was collected so the caller can
    /// carry on with the next independent check.
    pub fn check<T>(&mut self, result: Result<T, CompileError>) -> Result<Option<T>, CompileError> {
        match result {
            Ok(value) => Ok(Some(value)),
            Err(err) => self.push(err).map(|()| None),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Combine everything collected into a single result.
    pub fn finish(mut self) -> Result<(), CompileError> {
        match self.errors.len() {
            0 => Ok(()),
            1 => Err(self.errors.remove(0)),
            _ => Err(CompileError::Multiple(self.errors)),
        }
    }
}

#[cfg(test)]
#[path = "diagnostics_tests.rs"]
mod tests;
