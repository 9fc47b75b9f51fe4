// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Write-once cell for IR fields derived by a single phase.

use crate::diagnostics::CompileError;

#[derive(Debug, Clone, PartialEq)]
pub struct Slot<T> {
    value: Option<T>,
}

impl<T> Default for Slot<T> {
    fn default() -> Self {
        Self { value: None }
    }
}

impl<T> Slot<T> {
    /// Store the value. A second write is a phase-ordering bug.
    pub fn set(&mut self, field: &'static str, value: T) -> Result<(), CompileError> {
        if self.value.is_some() {
            return Err(CompileError::PhaseViolation(field));
        }
        self.value = Some(value);
        Ok(())
    }

    pub fn get(&self) -> Option<&T> {
        self.value.as_ref()
    }

    pub fn is_set(&self) -> bool {
        self.value.is_some()
    }

    pub fn into_inner(self) -> Option<T> {
        self.value
    }
}

#[cfg(test)]
#[path = "slot_tests.rs"]
mod tests;
