//! # State File
//!
//! Local record of every tracked object, keyed by declared name per kind.
//! Saves go through a temporary file in the same directory followed by a
//! rename, so a crash never leaves a half-written file behind.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::{Error, Result};
use crate::model::{
    DeclaredState, MirrorSessionConfig, SecurityPolicyConfig, SyslogExportPolicyConfig,
};
use crate::reconcile::{RecordOf, RecordedState};
use crate::translate::{MirrorSessions, PolicyResource, SecurityPolicies, SyslogExportPolicies};

/// Current state file format version
pub const STATE_VERSION: u32 = 1;

/// Default state file name
pub const DEFAULT_STATE_FILE: &str = "psm-reconciler.state.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateFile {
    pub version: u32,

    #[serde(default)]
    pub mirror_sessions: BTreeMap<String, RecordedState<MirrorSessionConfig>>,

    #[serde(default)]
    pub security_policies: BTreeMap<String, RecordedState<SecurityPolicyConfig>>,

    #[serde(default)]
    pub syslog_export_policies: BTreeMap<String, RecordedState<SyslogExportPolicyConfig>>,
}

impl Default for StateFile {
    fn default() -> Self {
        Self {
            version: STATE_VERSION,
            mirror_sessions: BTreeMap::new(),
            security_policies: BTreeMap::new(),
            syslog_export_policies: BTreeMap::new(),
        }
    }
}

impl StateFile {
    /// Load from disk; a missing file is an empty state
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "No state file, starting empty");
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path)
            .map_err(|e| Error::io(format!("Failed to read state file: {}", path.display()), e))?;
        let state: StateFile = serde_json::from_str(&contents).map_err(|e| {
            Error::serialization(format!("Failed to parse state file: {}", path.display()), e)
        })?;

        if state.version != STATE_VERSION {
            return Err(Error::configuration_field(
                format!(
                    "Unsupported state file version {} (expected {})",
                    state.version, STATE_VERSION
                ),
                "version",
            ));
        }
        Ok(state)
    }

    /// Write to a temporary sibling file, then rename over `path`
    pub fn save(&self, path: &Path) -> Result<()> {
        let contents = serde_json::to_string_pretty(self)
            .map_err(|e| Error::serialization("Failed to encode state file", e))?;

        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(dir)
            .map_err(|e| Error::io(format!("Failed to create directory: {}", dir.display()), e))?;

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| DEFAULT_STATE_FILE.to_string());
        let temp = dir.join(format!(".{}.{}.tmp", file_name, uuid::Uuid::new_v4()));

        std::fs::write(&temp, contents)
            .map_err(|e| Error::io(format!("Failed to write state file: {}", temp.display()), e))?;
        std::fs::rename(&temp, path).map_err(|e| {
            let _ = std::fs::remove_file(&temp);
            Error::io(format!("Failed to replace state file: {}", path.display()), e)
        })?;

        debug!(path = %path.display(), objects = self.len(), "State saved");
        Ok(())
    }

    /// Number of tracked objects across all kinds
    pub fn len(&self) -> usize {
        self.mirror_sessions.len() + self.security_policies.len() + self.syslog_export_policies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A resource kind with its own section in the state file and in the
/// declared-state document
pub trait StoredKind: PolicyResource {
    /// Section key, e.g. `mirror_sessions`
    const SECTION: &'static str;

    fn records(state: &StateFile) -> &BTreeMap<String, RecordOf<Self>>;

    fn records_mut(state: &mut StateFile) -> &mut BTreeMap<String, RecordOf<Self>>;

    fn declared(declared: &DeclaredState) -> &[Self::Config];
}

impl StoredKind for MirrorSessions {
    const SECTION: &'static str = "mirror_sessions";

    fn records(state: &StateFile) -> &BTreeMap<String, RecordOf<Self>> {
        &state.mirror_sessions
    }

    fn records_mut(state: &mut StateFile) -> &mut BTreeMap<String, RecordOf<Self>> {
        &mut state.mirror_sessions
    }

    fn declared(declared: &DeclaredState) -> &[MirrorSessionConfig] {
        &declared.mirror_sessions
    }
}

impl StoredKind for SecurityPolicies {
    const SECTION: &'static str = "security_policies";

    fn records(state: &StateFile) -> &BTreeMap<String, RecordOf<Self>> {
        &state.security_policies
    }

    fn records_mut(state: &mut StateFile) -> &mut BTreeMap<String, RecordOf<Self>> {
        &mut state.security_policies
    }

    fn declared(declared: &DeclaredState) -> &[SecurityPolicyConfig] {
        &declared.security_policies
    }
}

impl StoredKind for SyslogExportPolicies {
    const SECTION: &'static str = "syslog_export_policies";

    fn records(state: &StateFile) -> &BTreeMap<String, RecordOf<Self>> {
        &state.syslog_export_policies
    }

    fn records_mut(state: &mut StateFile) -> &mut BTreeMap<String, RecordOf<Self>> {
        &mut state.syslog_export_policies
    }

    fn declared(declared: &DeclaredState) -> &[SyslogExportPolicyConfig] {
        &declared.syslog_export_policies
    }
}
