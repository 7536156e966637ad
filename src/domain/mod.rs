//! Domain layer
//!
//! Canonical server-side representation of policy objects: a `meta` block
//! shared by every kind, a kind-specific `spec`, and a server-computed
//! `status` that only ever flows from the server to local state.
//!
//! ## Module Organization
//!
//! - `mirror_session`: traffic mirroring sessions (monitoring group)
//! - `network_security_policy`: ordered security rule sets (security group)
//! - `syslog_policy`: syslog export policies (monitoring group)

pub mod mirror_session;
pub mod network_security_policy;
pub mod syslog_policy;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::validation::deserialize_string_map;

pub use mirror_session::{Collector, ExportConfig, MirrorSessionSpec};
pub use network_security_policy::{
    NetworkSecurityPolicySpec, NetworkSecurityPolicyStatus, PdtStatus, PropagationStatus,
    ProtoPort, Rule, RuleStatus,
};
pub use syslog_policy::{
    PsmTarget, ServerCertVerification, SyslogConfig, SyslogPolicySpec, SyslogTarget,
};

/// The only tenant this deployment routes to
pub const DEFAULT_TENANT: &str = "default";

/// Namespace used for namespaced objects
pub const DEFAULT_NAMESPACE: &str = "default";

/// Object metadata. `uuid` is assigned by the server and never changes for
/// the life of the object; `name` is immutable once the object exists.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ObjectMeta {
    pub name: String,

    #[serde(default)]
    pub tenant: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generation_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_version: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,

    #[serde(
        default,
        deserialize_with = "deserialize_string_map",
        skip_serializing_if = "BTreeMap::is_empty"
    )]
    pub labels: BTreeMap<String, String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub self_link: Option<String>,
}

impl ObjectMeta {
    /// Metadata for a new object in the given tenant
    pub fn new<N: Into<String>, T: Into<String>>(name: N, tenant: T) -> Self {
        Self { name: name.into(), tenant: tenant.into(), ..Default::default() }
    }

    /// Set the namespace
    pub fn with_namespace<S: Into<String>>(mut self, namespace: S) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    /// Server-issued identity, ignoring empty strings
    pub fn uuid(&self) -> Option<&str> {
        self.uuid.as_deref().filter(|u| !u.is_empty())
    }
}

/// A policy object as the server represents it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct DomainObject<S, St> {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_version: Option<String>,

    pub meta: ObjectMeta,

    pub spec: S,

    #[serde(default = "Option::default", skip_serializing_if = "Option::is_none")]
    pub status: Option<St>,
}

impl<S, St> DomainObject<S, St> {
    /// Build an object for writing; status is always empty
    pub fn new(meta: ObjectMeta, spec: S) -> Self {
        Self { kind: None, api_version: None, meta, spec, status: None }
    }
}

/// Static description of one resource kind on the server
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceDescriptor {
    /// Kind name used in logs and errors, e.g. "Mirror Session"
    pub display_name: &'static str,
    /// API group segment, e.g. "monitoring"
    pub api_group: &'static str,
    /// Collection segment, e.g. "MirrorSession"
    pub collection: &'static str,
}

impl ResourceDescriptor {
    /// `/configs/<group>/v1/tenant/<tenant>/<collection>`
    pub fn collection_path(&self, tenant: &str) -> String {
        format!("/configs/{}/v1/tenant/{}/{}", self.api_group, tenant, self.collection)
    }

    /// `/configs/<group>/v1/tenant/<tenant>/<collection>/<identity>`
    pub fn object_path(&self, tenant: &str, identity: &str) -> String {
        format!("{}/{}", self.collection_path(tenant), identity)
    }
}
