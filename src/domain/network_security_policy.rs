//! Network security policy (rule set) wire types
//!
//! Rules are evaluated by the server in list order, so the order of
//! [`NetworkSecurityPolicySpec::rules`] is part of the object's meaning.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::validation::{deserialize_string_map, null_as_empty};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct NetworkSecurityPolicySpec {
    #[serde(default)]
    pub attach_tenant: bool,

    #[serde(default, deserialize_with = "null_as_empty")]
    pub rules: Vec<Rule>,

    /// Server-computed; never sent on write
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<i64>,

    #[serde(default, deserialize_with = "null_as_empty")]
    pub policy_distribution_targets: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Rule {
    #[serde(default)]
    pub name: String,

    pub action: String,

    #[serde(default)]
    pub description: String,

    #[serde(
        default,
        deserialize_with = "null_as_empty",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub apps: Vec<String>,

    #[serde(default)]
    pub disable: bool,

    #[serde(
        default,
        deserialize_with = "null_as_empty",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub from_ip_addresses: Vec<String>,

    #[serde(
        default,
        deserialize_with = "null_as_empty",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub to_ip_addresses: Vec<String>,

    #[serde(
        default,
        rename = "from-ipcollections",
        deserialize_with = "null_as_empty",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub from_ip_collections: Vec<String>,

    #[serde(
        default,
        rename = "to-ipcollections",
        deserialize_with = "null_as_empty",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub to_ip_collections: Vec<String>,

    #[serde(
        default,
        deserialize_with = "null_as_empty",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub from_workload_groups: Vec<String>,

    #[serde(
        default,
        deserialize_with = "null_as_empty",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub to_workload_groups: Vec<String>,

    #[serde(
        default,
        deserialize_with = "deserialize_string_map",
        skip_serializing_if = "BTreeMap::is_empty"
    )]
    pub labels: BTreeMap<String, String>,

    #[serde(
        default,
        deserialize_with = "null_as_empty",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub proto_ports: Vec<ProtoPort>,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub rule_profile: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtoPort {
    pub protocol: String,
    #[serde(default)]
    pub ports: String,
}

/// Read-only status computed by the server
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct NetworkSecurityPolicyStatus {
    #[serde(default)]
    pub propagation_status: PropagationStatus,

    #[serde(default, deserialize_with = "null_as_empty")]
    pub rule_status: Vec<RuleStatus>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct PropagationStatus {
    #[serde(default)]
    pub generation_id: String,
    #[serde(default)]
    pub updated: i64,
    #[serde(default)]
    pub pending: i64,
    #[serde(default)]
    pub min_version: String,
    #[serde(default)]
    pub status: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub pdt_status: Vec<PdtStatus>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct PdtStatus {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub updated: i64,
    #[serde(default)]
    pub pending: i64,
    #[serde(default)]
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RuleStatus {
    #[serde(default)]
    pub rule_hash: String,
}
