//! Syslog export policy translation

use validator::ValidationError;

use crate::domain::{
    DomainObject, ObjectMeta, PsmTarget, ResourceDescriptor, ServerCertVerification,
    SyslogConfig, SyslogPolicySpec, SyslogTarget, DEFAULT_TENANT,
};
use crate::model::{
    PsmTargetConfig, SyslogConfigBlock, SyslogExportPolicyConfig, SyslogTargetConfig,
};
use crate::validation::validate_object_name;

use super::PolicyResource;

/// Marker type for syslog export policies
#[derive(Debug, Clone, Copy, Default)]
pub struct SyslogExportPolicies;

impl PolicyResource for SyslogExportPolicies {
    type Config = SyslogExportPolicyConfig;
    type Spec = SyslogPolicySpec;
    type Status = serde_json::Value;

    const DESCRIPTOR: ResourceDescriptor = ResourceDescriptor {
        display_name: "Syslog Policy",
        api_group: "monitoring",
        collection: "fwlogPolicy",
    };

    const NAME_FIELD: &'static str = "name";

    fn declared_name(config: &SyslogExportPolicyConfig) -> &str {
        &config.name
    }

    fn validate_name(name: &str) -> Result<(), ValidationError> {
        validate_object_name(name)
    }

    fn build_domain(config: &SyslogExportPolicyConfig) -> DomainObject<SyslogPolicySpec, serde_json::Value> {
        let meta = ObjectMeta::new(&config.name, DEFAULT_TENANT);

        let spec = SyslogPolicySpec {
            format: config.format.clone(),
            filter: config.filter.clone(),
            config: SyslogConfig {
                facility_override: config.syslog_config.facility_override.clone(),
                disable_batching: config.syslog_config.disable_batching,
            },
            psm_target: PsmTarget { enable: config.psm_target.enable },
            targets: config.targets.iter().map(target_to_domain).collect(),
        };

        DomainObject::new(meta, spec)
    }

    fn from_domain(object: &DomainObject<SyslogPolicySpec, serde_json::Value>) -> SyslogExportPolicyConfig {
        let spec = &object.spec;
        SyslogExportPolicyConfig {
            name: object.meta.name.clone(),
            format: spec.format.clone(),
            filter: spec.filter.clone(),
            syslog_config: SyslogConfigBlock {
                facility_override: spec.config.facility_override.clone(),
                disable_batching: spec.config.disable_batching,
            },
            psm_target: PsmTargetConfig { enable: spec.psm_target.enable },
            targets: spec.targets.iter().map(target_from_domain).collect(),
        }
    }

    fn force_new_changes(
        prior: &SyslogExportPolicyConfig,
        desired: &SyslogExportPolicyConfig,
    ) -> Vec<&'static str> {
        let mut fields = Vec::new();
        if prior.name != desired.name {
            fields.push("name");
        }
        fields
    }
}

/// Verification options are sent only when a hostname is set or
/// verification is skipped; the skip flag itself only when true.
fn target_to_domain(target: &SyslogTargetConfig) -> SyslogTarget {
    let verification = if target.hostname_verification.is_some() || target.skip_cert_verification {
        Some(ServerCertVerification {
            hostname: target.hostname_verification.clone(),
            skip_server_cert_verification: target.skip_cert_verification.then_some(true),
        })
    } else {
        None
    };

    SyslogTarget {
        destination: target.destination.clone(),
        transport: target.transport.clone(),
        trusted_certs: target.trusted_certs.clone(),
        client_certificate: target.client_certificate.clone(),
        verification,
    }
}

fn target_from_domain(target: &SyslogTarget) -> SyslogTargetConfig {
    let verification = target.verification.as_ref();
    SyslogTargetConfig {
        destination: target.destination.clone(),
        transport: target.transport.clone(),
        trusted_certs: target.trusted_certs.clone().filter(|s| !s.is_empty()),
        client_certificate: target.client_certificate.clone().filter(|s| !s.is_empty()),
        hostname_verification: verification
            .and_then(|v| v.hostname.clone())
            .filter(|s| !s.is_empty()),
        skip_cert_verification: verification
            .and_then(|v| v.skip_server_cert_verification)
            .unwrap_or(false),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::translate::{from_domain, to_domain};
    use proptest::prelude::*;

    fn policy() -> SyslogExportPolicyConfig {
        SyslogExportPolicyConfig {
            name: "fw-syslog".to_string(),
            format: "syslog-rfc5424".to_string(),
            filter: vec!["FWLOG_ALL".to_string()],
            syslog_config: SyslogConfigBlock {
                facility_override: "LOG_USER".to_string(),
                disable_batching: false,
            },
            psm_target: PsmTargetConfig { enable: true },
            targets: vec![SyslogTargetConfig {
                destination: "10.1.1.1".to_string(),
                transport: "tcp/6514".to_string(),
                trusted_certs: Some("ca-bundle".to_string()),
                client_certificate: None,
                hostname_verification: None,
                skip_cert_verification: true,
            }],
        }
    }

    #[test]
    fn test_verification_options() {
        let object = to_domain::<SyslogExportPolicies>(&policy()).unwrap();
        let verification = object.spec.targets[0].verification.as_ref().unwrap();
        assert_eq!(verification.hostname, None);
        assert_eq!(verification.skip_server_cert_verification, Some(true));

        let mut config = policy();
        config.targets[0].skip_cert_verification = false;
        let object = to_domain::<SyslogExportPolicies>(&config).unwrap();
        assert!(object.spec.targets[0].verification.is_none());
    }

    #[test]
    fn test_meta_uses_fixed_tenant() {
        let object = to_domain::<SyslogExportPolicies>(&policy()).unwrap();
        assert_eq!(object.meta.name, "fw-syslog");
        assert_eq!(object.meta.tenant, "default");
        assert_eq!(object.meta.namespace, None);
    }

    #[test]
    fn test_empty_targets_rejected_before_translation() {
        let mut config = policy();
        config.targets.clear();
        assert!(to_domain::<SyslogExportPolicies>(&config).unwrap_err().is_configuration());
    }

    #[test]
    fn test_round_trip() {
        let object = to_domain::<SyslogExportPolicies>(&policy()).unwrap();
        assert_eq!(from_domain::<SyslogExportPolicies>(&object), policy());
    }

    fn target() -> impl Strategy<Value = SyslogTargetConfig> {
        (
            "[0-9]{1,3}\\.[0-9]{1,3}\\.[0-9]{1,3}\\.[0-9]{1,3}",
            prop::sample::select(vec!["udp/514", "tcp/514", "tcp/6514"]),
            prop::option::of("[a-z][a-z0-9-]{0,8}"),
            prop::option::of("[a-z][a-z0-9-]{0,8}"),
            prop::option::of("[a-z][a-z0-9.]{0,12}"),
            any::<bool>(),
        )
            .prop_map(|(destination, transport, trusted, client, hostname, skip)| SyslogTargetConfig {
                destination,
                transport: transport.to_string(),
                trusted_certs: trusted,
                client_certificate: client,
                hostname_verification: hostname,
                skip_cert_verification: skip,
            })
    }

    proptest! {
        #[test]
        fn prop_round_trip(
            filter in prop::collection::vec("[A-Z_]{3,12}", 1..4),
            disable_batching in any::<bool>(),
            enable in any::<bool>(),
            targets in prop::collection::vec(target(), 1..4),
        ) {
            let config = SyslogExportPolicyConfig {
                name: "fw-syslog".to_string(),
                format: "syslog-bsd".to_string(),
                filter,
                syslog_config: SyslogConfigBlock {
                    facility_override: "LOG_LOCAL0".to_string(),
                    disable_batching,
                },
                psm_target: PsmTargetConfig { enable },
                targets,
            };
            let object = to_domain::<SyslogExportPolicies>(&config).unwrap();
            prop_assert_eq!(from_domain::<SyslogExportPolicies>(&object), config);
        }
    }
}
