//! Declared configuration for syslog export policies

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::validation::{
    validate_destination, validate_no_blank_entries, validate_not_blank, validate_object_name,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct SyslogExportPolicyConfig {
    #[validate(custom(function = "validate_object_name"))]
    pub name: String,

    #[validate(custom(function = "validate_not_blank"))]
    pub format: String,

    #[validate(length(min = 1, message = "at least one filter is required"))]
    #[validate(custom(function = "validate_no_blank_entries"))]
    pub filter: Vec<String>,

    #[serde(alias = "syslogconfig")]
    #[validate(nested)]
    pub syslog_config: SyslogConfigBlock,

    #[serde(default)]
    pub psm_target: PsmTargetConfig,

    #[validate(length(min = 1, message = "at least one target is required"))]
    #[validate(nested)]
    pub targets: Vec<SyslogTargetConfig>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct SyslogConfigBlock {
    #[serde(alias = "facility")]
    #[validate(custom(function = "validate_not_blank"))]
    pub facility_override: String,

    #[serde(default)]
    pub disable_batching: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PsmTargetConfig {
    #[serde(default)]
    pub enable: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct SyslogTargetConfig {
    #[validate(custom(function = "validate_destination"))]
    pub destination: String,

    /// e.g. `udp/514` or `tcp/6514`
    #[validate(custom(function = "validate_not_blank"))]
    pub transport: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, message = "trusted_certs must not be empty when set"))]
    pub trusted_certs: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, message = "client_certificate must not be empty when set"))]
    pub client_certificate: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, message = "hostname_verification must not be empty when set"))]
    pub hostname_verification: Option<String>,

    #[serde(default)]
    pub skip_cert_verification: bool,
}
