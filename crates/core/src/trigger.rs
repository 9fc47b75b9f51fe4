// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The `on:` trigger section.
//!
//! `command`, `reaction`, and `stop-after` are compiler extensions that need
//! pre-activation bookkeeping. Every other key is a runner event and passes
//! through untouched.

use crate::frontmatter::value_kind;
use serde::Serialize;
use serde_yaml::{Mapping, Value};

/// Reactions the runner can add to the triggering item.
pub const VALID_REACTIONS: &[&str] =
    &["+1", "-1", "laugh", "confused", "heart", "hooray", "rocket", "eyes"];

/// Events a command trigger listens on when none are given.
pub const DEFAULT_COMMAND_EVENTS: &[&str] =
    &["issues", "issue_comment", "pull_request", "pull_request_review_comment"];

/// A `/name` slash-command trigger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandTrigger {
    pub name: String,
    pub events: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TriggerConfig {
    pub command: Option<CommandTrigger>,
    pub reaction: Option<String>,
    pub stop_after: Option<String>,
    /// Runner events, passed through in declaration order.
    pub events: Mapping,
}

impl TriggerConfig {
    /// Whether any declared trigger feature needs the pre-activation job.
    pub fn needs_pre_activation(&self) -> bool {
        self.command.is_some() || self.reaction.is_some() || self.stop_after.is_some()
    }

    /// Parse the raw `on:` value.
    pub fn from_value(value: &Value) -> Result<Self, String> {
        let mut trigger = TriggerConfig::default();
        match value {
            Value::Null => {}
            Value::String(event) => {
                trigger.events.insert(Value::String(event.clone()), Value::Null);
            }
            Value::Sequence(events) => {
                for event in events {
                    let Some(event) = event.as_str() else {
                        return Err(format!("event names must be strings, found {}", value_kind(event)));
                    };
                    trigger.events.insert(Value::String(event.to_string()), Value::Null);
                }
            }
            Value::Mapping(map) => {
                for (key, value) in map {
                    match key.as_str() {
                        Some("command") => trigger.command = Some(command(value)?),
                        Some("reaction") => trigger.reaction = Some(reaction(value)?),
                        Some("stop-after") => {
                            let Some(s) = scalar_string(value) else {
                                return Err(format!(
                                    "stop-after: expected a date or relative time such as \"+48h\", found {}",
                                    value_kind(value)
                                ));
                            };
                            trigger.stop_after = Some(s);
                        }
                        _ => {
                            trigger.events.insert(key.clone(), value.clone());
                        }
                    }
                }
            }
            other => {
                return Err(format!(
                    "expected an event name, a list of events, or a mapping, found {}",
                    value_kind(other)
                ))
            }
        }

        if let Some(cmd) = &trigger.command {
            for event in &cmd.events {
                trigger.events.entry(Value::String(event.clone())).or_insert(Value::Null);
            }
        }
        Ok(trigger)
    }
}

fn command(value: &Value) -> Result<CommandTrigger, String> {
    let default_events = || DEFAULT_COMMAND_EVENTS.iter().map(|e| e.to_string()).collect();
    let trigger = match value {
        Value::String(name) => CommandTrigger { name: name.clone(), events: default_events() },
        Value::Mapping(map) => {
            let Some(name) = map.get("name").and_then(Value::as_str) else {
                return Err("command: a 'name' is required, e.g. { name: triage }".to_string());
            };
            let events = match map.get("events") {
                None => default_events(),
                Some(Value::Sequence(seq)) => {
                    seq.iter().filter_map(Value::as_str).map(str::to_string).collect()
                }
                Some(Value::String(s)) => vec![s.clone()],
                Some(other) => {
                    return Err(format!("command.events: expected a list, found {}", value_kind(other)))
                }
            };
            CommandTrigger { name: name.to_string(), events }
        }
        other => {
            return Err(format!("command: expected a name or mapping, found {}", value_kind(other)))
        }
    };
    let name = trigger.name.trim_start_matches('/');
    if name.is_empty() || name.chars().any(char::is_whitespace) {
        return Err(format!("command: invalid command name '{}'", trigger.name));
    }
    Ok(CommandTrigger { name: name.to_string(), events: trigger.events })
}

fn reaction(value: &Value) -> Result<String, String> {
    let Some(r) = scalar_string(value) else {
        return Err(format!("reaction: expected a string, found {}", value_kind(value)));
    };
    if !VALID_REACTIONS.contains(&r.as_str()) {
        return Err(format!(
            "reaction: unknown reaction '{r}'; valid reactions are: {}",
            VALID_REACTIONS.join(", ")
        ));
    }
    Ok(r)
}

/// YAML parses `+1` as a number; accept scalars as strings.
fn scalar_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(if n.as_i64().is_some_and(|i| i > 0) { format!("+{n}") } else { n.to_string() }),
        _ => None,
    }
}

#[cfg(test)]
#[path = "trigger_tests.rs"]
mod tests;
