//! Network security policy translation. Rules keep their declared order.

use validator::ValidationError;

use crate::domain::{
    DomainObject, NetworkSecurityPolicySpec, NetworkSecurityPolicyStatus, ObjectMeta, ProtoPort,
    ResourceDescriptor, Rule,
};
use crate::model::{ProtoPortConfig, RuleConfig, SecurityPolicyConfig};
use crate::validation::validate_object_name;

use super::{first_target, non_empty, PolicyResource};

/// Marker type for network security policies
#[derive(Debug, Clone, Copy, Default)]
pub struct SecurityPolicies;

impl PolicyResource for SecurityPolicies {
    type Config = SecurityPolicyConfig;
    type Spec = NetworkSecurityPolicySpec;
    type Status = NetworkSecurityPolicyStatus;

    const DESCRIPTOR: ResourceDescriptor = ResourceDescriptor {
        display_name: "Security Policy",
        api_group: "security",
        collection: "networksecuritypolicies",
    };

    const NAME_FIELD: &'static str = "policy_name";

    fn declared_name(config: &SecurityPolicyConfig) -> &str {
        &config.policy_name
    }

    fn validate_name(name: &str) -> Result<(), ValidationError> {
        validate_object_name(name)
    }

    fn build_domain(
        config: &SecurityPolicyConfig,
    ) -> DomainObject<NetworkSecurityPolicySpec, NetworkSecurityPolicyStatus> {
        let meta = ObjectMeta::new(&config.policy_name, &config.tenant);

        let spec = NetworkSecurityPolicySpec {
            attach_tenant: true,
            rules: config.rules.iter().map(rule_to_domain).collect(),
            priority: None,
            policy_distribution_targets: vec![config.policy_distribution_target.clone()],
        };

        DomainObject::new(meta, spec)
    }

    fn from_domain(
        object: &DomainObject<NetworkSecurityPolicySpec, NetworkSecurityPolicyStatus>,
    ) -> SecurityPolicyConfig {
        SecurityPolicyConfig {
            policy_name: object.meta.name.clone(),
            tenant: if object.meta.tenant.is_empty() {
                "default".to_string()
            } else {
                object.meta.tenant.clone()
            },
            policy_distribution_target: first_target(&object.spec.policy_distribution_targets),
            rules: object.spec.rules.iter().map(rule_from_domain).collect(),
        }
    }

    fn force_new_changes(prior: &SecurityPolicyConfig, desired: &SecurityPolicyConfig) -> Vec<&'static str> {
        let mut fields = Vec::new();
        if prior.policy_name != desired.policy_name {
            fields.push("policy_name");
        }
        if prior.tenant != desired.tenant {
            fields.push("tenant");
        }
        if prior.policy_distribution_target != desired.policy_distribution_target {
            fields.push("policy_distribution_target");
        }
        fields
    }
}

fn rule_to_domain(rule: &RuleConfig) -> Rule {
    Rule {
        name: rule.rule_name.clone().unwrap_or_default(),
        action: rule.action.clone(),
        description: rule.description.clone().unwrap_or_default(),
        apps: rule.apps.clone(),
        disable: rule.disable,
        from_ip_addresses: rule.from_ip_addresses.clone(),
        to_ip_addresses: rule.to_ip_addresses.clone(),
        from_ip_collections: rule.from_ip_collections.clone(),
        to_ip_collections: rule.to_ip_collections.clone(),
        from_workload_groups: rule.from_workloadgroups.clone(),
        to_workload_groups: rule.to_workloadgroups.clone(),
        labels: rule.labels.clone(),
        proto_ports: rule
            .proto_ports
            .iter()
            .map(|pp| ProtoPort {
                protocol: pp.protocol.clone(),
                ports: pp.ports.clone().unwrap_or_default(),
            })
            .collect(),
        rule_profile: rule.rule_profile.clone().unwrap_or_default(),
    }
}

fn rule_from_domain(rule: &Rule) -> RuleConfig {
    RuleConfig {
        rule_name: non_empty(&rule.name),
        description: non_empty(&rule.description),
        labels: rule.labels.clone(),
        rule_profile: non_empty(&rule.rule_profile),
        action: rule.action.clone(),
        disable: rule.disable,
        apps: rule.apps.clone(),
        proto_ports: rule
            .proto_ports
            .iter()
            .map(|pp| ProtoPortConfig { protocol: pp.protocol.clone(), ports: non_empty(&pp.ports) })
            .collect(),
        from_ip_collections: rule.from_ip_collections.clone(),
        to_ip_collections: rule.to_ip_collections.clone(),
        from_ip_addresses: rule.from_ip_addresses.clone(),
        to_ip_addresses: rule.to_ip_addresses.clone(),
        from_workloadgroups: rule.from_workload_groups.clone(),
        to_workloadgroups: rule.to_workload_groups.clone(),
    }
}
