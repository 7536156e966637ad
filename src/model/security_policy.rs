//! Declared configuration for network security policies (ordered rule sets)

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::validation::{
    deserialize_string_map, validate_no_blank_entries, validate_not_blank, validate_object_name,
    validate_rule_action,
};

fn default_tenant() -> String {
    "default".to_string()
}

fn default_target() -> String {
    "default".to_string()
}

/// A security rule set. `policy_name`, `tenant` and the distribution target
/// cannot be changed in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct SecurityPolicyConfig {
    #[validate(custom(function = "validate_object_name"))]
    pub policy_name: String,

    #[serde(default = "default_tenant")]
    #[validate(custom(function = "validate_not_blank"))]
    pub tenant: String,

    #[serde(default = "default_target")]
    #[validate(custom(function = "validate_not_blank"))]
    pub policy_distribution_target: String,

    /// Evaluated in order by the server
    #[serde(default, alias = "rule")]
    #[validate(nested)]
    pub rules: Vec<RuleConfig>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct RuleConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, message = "rule_name must not be empty when set"))]
    pub rule_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, message = "description must not be empty when set"))]
    pub description: Option<String>,

    #[serde(
        default,
        deserialize_with = "deserialize_string_map",
        skip_serializing_if = "BTreeMap::is_empty"
    )]
    pub labels: BTreeMap<String, String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, message = "rule_profile must not be empty when set"))]
    pub rule_profile: Option<String>,

    #[validate(custom(function = "validate_rule_action"))]
    pub action: String,

    #[serde(default)]
    pub disable: bool,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    #[validate(custom(function = "validate_no_blank_entries"))]
    pub apps: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    #[validate(nested)]
    pub proto_ports: Vec<ProtoPortConfig>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    #[validate(custom(function = "validate_no_blank_entries"))]
    pub from_ip_collections: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    #[validate(custom(function = "validate_no_blank_entries"))]
    pub to_ip_collections: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    #[validate(custom(function = "validate_no_blank_entries"))]
    pub from_ip_addresses: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    #[validate(custom(function = "validate_no_blank_entries"))]
    pub to_ip_addresses: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    #[validate(custom(function = "validate_no_blank_entries"))]
    pub from_workloadgroups: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    #[validate(custom(function = "validate_no_blank_entries"))]
    pub to_workloadgroups: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct ProtoPortConfig {
    #[validate(custom(function = "validate_not_blank"))]
    pub protocol: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, message = "ports must not be empty when set"))]
    pub ports: Option<String>,
}
