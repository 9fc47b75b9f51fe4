// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Network policy and agent sandbox declarations.

use awc_domains::{DomainPolicy, DEFAULTS_ECOSYSTEM};
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};

/// Egress firewall options. `firewall: true` is the same as an empty block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FirewallConfig {
    pub enabled: bool,
    pub version: Option<String>,
    pub args: Vec<String>,
    pub log_level: Option<String>,
}

impl FirewallConfig {
    pub fn enabled() -> Self {
        Self { enabled: true, version: None, args: Vec::new(), log_level: None }
    }

    pub fn disabled() -> Self {
        Self { enabled: false, ..Self::enabled() }
    }
}

impl<'de> Deserialize<'de> for FirewallConfig {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(rename_all = "kebab-case", deny_unknown_fields)]
        struct Block {
            #[serde(default)]
            version: Option<String>,
            #[serde(default)]
            args: Vec<String>,
            #[serde(default)]
            log_level: Option<String>,
        }

        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Helper {
            Toggle(bool),
            Block(Block),
        }

        Ok(match Helper::deserialize(deserializer)? {
            Helper::Toggle(true) => FirewallConfig::enabled(),
            Helper::Toggle(false) => FirewallConfig::disabled(),
            Helper::Block(b) => FirewallConfig {
                enabled: true,
                version: b.version,
                args: b.args,
                log_level: b.log_level,
            },
        })
    }
}

/// The `network:` section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NetworkPolicy {
    pub domains: DomainPolicy,
    pub firewall: Option<FirewallConfig>,
}

impl NetworkPolicy {
    /// True when egress is restricted to some list (anything but a bare `*`).
    pub fn is_restricted(&self) -> bool {
        !self.domains.allows_everything()
    }

    pub fn firewall_disabled(&self) -> bool {
        self.firewall.as_ref().is_some_and(|f| !f.enabled)
    }

    pub fn firewall_requested(&self) -> bool {
        self.firewall.as_ref().is_some_and(|f| f.enabled)
    }
}

impl<'de> Deserialize<'de> for NetworkPolicy {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(deny_unknown_fields)]
        struct Block {
            #[serde(default)]
            allowed: Option<Vec<String>>,
            #[serde(default)]
            blocked: Vec<String>,
            #[serde(default)]
            firewall: Option<FirewallConfig>,
        }

        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Helper {
            Short(String),
            Block(Block),
        }

        match Helper::deserialize(deserializer)? {
            Helper::Short(s) if s == DEFAULTS_ECOSYSTEM => Ok(NetworkPolicy {
                domains: DomainPolicy::allowing([DEFAULTS_ECOSYSTEM]),
                firewall: None,
            }),
            Helper::Short(s) => Err(serde::de::Error::custom(format!(
                "unknown network shorthand '{s}'; use 'defaults' or a block such as \
                 {{ allowed: [defaults, python] }}"
            ))),
            Helper::Block(b) => Ok(NetworkPolicy {
                domains: DomainPolicy { allowed: b.allowed, blocked: b.blocked },
                firewall: b.firewall,
            }),
        }
    }
}

/// Isolation mechanism wrapped around the agent process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentSandbox {
    /// Egress firewall container.
    Awf,
    /// Runtime sandbox. Mutually exclusive with the firewall.
    Srt,
    /// Explicitly disabled.
    Disabled,
}

crate::simple_display! {
    AgentSandbox {
        Awf => "awf",
        Srt => "srt",
        Disabled => "false",
    }
}

impl<'de> Deserialize<'de> for AgentSandbox {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Helper {
            Toggle(bool),
            Name(String),
        }

        match Helper::deserialize(deserializer)? {
            Helper::Toggle(false) => Ok(AgentSandbox::Disabled),
            Helper::Toggle(true) => Ok(AgentSandbox::Awf),
            Helper::Name(s) => match s.as_str() {
                "awf" => Ok(AgentSandbox::Awf),
                "srt" => Ok(AgentSandbox::Srt),
                "false" => Ok(AgentSandbox::Disabled),
                other => Err(serde::de::Error::custom(format!(
                    "unknown agent sandbox '{other}'; expected awf, srt, or false"
                ))),
            },
        }
    }
}

/// The `sandbox:` section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SandboxConfig {
    #[serde(default)]
    pub agent: Option<AgentSandbox>,
    /// Extra settings forwarded to the sandbox runtime.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub config: IndexMap<String, serde_yaml::Value>,
}

impl SandboxConfig {
    pub fn uses_runtime_sandbox(&self) -> bool {
        self.agent == Some(AgentSandbox::Srt)
    }

    pub fn is_disabled(&self) -> bool {
        self.agent == Some(AgentSandbox::Disabled)
    }
}

#[cfg(test)]
#[path = "network_tests.rs"]
mod tests;
