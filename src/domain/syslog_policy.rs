//! Syslog export policy wire types

use serde::{Deserialize, Serialize};

use crate::validation::null_as_empty;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct SyslogPolicySpec {
    pub format: String,

    #[serde(default, deserialize_with = "null_as_empty")]
    pub filter: Vec<String>,

    #[serde(default)]
    pub config: SyslogConfig,

    #[serde(default)]
    pub psm_target: PsmTarget,

    #[serde(default, deserialize_with = "null_as_empty")]
    pub targets: Vec<SyslogTarget>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct SyslogConfig {
    #[serde(default)]
    pub facility_override: String,

    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub disable_batching: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PsmTarget {
    #[serde(default)]
    pub enable: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct SyslogTarget {
    pub destination: String,

    pub transport: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trusted_certs: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_certificate: Option<String>,

    #[serde(
        default,
        rename = "server-certificate-verification-options",
        skip_serializing_if = "Option::is_none"
    )]
    pub verification: Option<ServerCertVerification>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ServerCertVerification {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hostname: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skip_server_cert_verification: Option<bool>,
}
