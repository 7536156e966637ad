//! Declared configuration for mirror sessions

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::validation::{
    validate_collector_type, validate_destination, validate_mirror_session_name, validate_not_blank,
};

fn default_packet_size() -> u32 {
    2048
}

fn default_target() -> String {
    "default".to_string()
}

/// A mirrored-traffic session exporting packets to one or more collectors
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct MirrorSessionConfig {
    /// Session name; changing it replaces the session
    #[validate(custom(function = "validate_mirror_session_name"))]
    pub name: String,

    #[validate(range(min = 1, max = 1023, message = "span_id must be between 1 and 1023"))]
    pub span_id: u32,

    #[serde(default = "default_packet_size")]
    #[validate(range(min = 64, max = 2048, message = "packet_size must be between 64 and 2048"))]
    pub packet_size: u32,

    #[serde(default)]
    pub disabled: bool,

    #[serde(default = "default_target")]
    #[validate(custom(function = "validate_not_blank"))]
    pub policy_distribution_target: String,

    #[serde(alias = "collector")]
    #[validate(length(min = 1, message = "at least one collector is required"))]
    #[validate(nested)]
    pub collectors: Vec<CollectorConfig>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct CollectorConfig {
    #[serde(rename = "type")]
    #[validate(custom(function = "validate_collector_type"))]
    pub collector_type: String,

    #[validate(custom(function = "validate_destination"))]
    pub destination: String,

    #[serde(default = "default_target")]
    #[validate(custom(function = "validate_not_blank"))]
    pub virtual_router: String,
}
