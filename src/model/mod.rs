//! Configuration model
//!
//! Statically typed declared state for every resource kind. Field types are
//! fixed at compile time, defaults are materialized by serde while the
//! document is parsed, and value constraints are checked with `validator`
//! before anything reaches the translator.

pub mod mirror_session;
pub mod security_policy;
pub mod syslog_policy;

use std::collections::BTreeSet;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::{Error, Result};

pub use mirror_session::{CollectorConfig, MirrorSessionConfig};
pub use security_policy::{ProtoPortConfig, RuleConfig, SecurityPolicyConfig};
pub use syslog_policy::{
    PsmTargetConfig, SyslogConfigBlock, SyslogExportPolicyConfig, SyslogTargetConfig,
};

/// A declared-state document listing every object the operator wants to exist
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DeclaredState {
    #[serde(default)]
    pub mirror_sessions: Vec<MirrorSessionConfig>,

    #[serde(default)]
    pub security_policies: Vec<SecurityPolicyConfig>,

    #[serde(default)]
    pub syslog_export_policies: Vec<SyslogExportPolicyConfig>,
}

impl DeclaredState {
    /// Parse a YAML document and check that names are unique per kind
    pub fn from_yaml(contents: &str) -> Result<Self> {
        let declared: DeclaredState = serde_yaml::from_str(contents)?;
        declared.check_unique_names()?;
        Ok(declared)
    }

    /// Load a YAML document from disk
    pub fn load(path: &Path) -> Result<Self> {
        debug!(path = %path.display(), "Loading declared state");
        let contents = std::fs::read_to_string(path).map_err(|e| {
            Error::io(format!("Failed to read declared state: {}", path.display()), e)
        })?;
        Self::from_yaml(&contents)
    }

    fn check_unique_names(&self) -> Result<()> {
        ensure_unique("mirror_sessions", self.mirror_sessions.iter().map(|c| c.name.as_str()))?;
        ensure_unique(
            "security_policies",
            self.security_policies.iter().map(|c| c.policy_name.as_str()),
        )?;
        ensure_unique(
            "syslog_export_policies",
            self.syslog_export_policies.iter().map(|c| c.name.as_str()),
        )?;
        Ok(())
    }
}

fn ensure_unique<'a>(kind: &str, names: impl Iterator<Item = &'a str>) -> Result<()> {
    let mut seen = BTreeSet::new();
    for name in names {
        if !seen.insert(name) {
            return Err(Error::configuration_field(
                format!("'{}' is declared more than once", name),
                kind,
            ));
        }
    }
    Ok(())
}
