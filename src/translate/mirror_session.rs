//! Mirror session translation

use validator::ValidationError;

use crate::domain::{
    Collector, DomainObject, ExportConfig, MirrorSessionSpec, ObjectMeta, ResourceDescriptor,
    DEFAULT_NAMESPACE, DEFAULT_TENANT,
};
use crate::model::{CollectorConfig, MirrorSessionConfig};
use crate::validation::validate_mirror_session_name;

use super::{first_target, PolicyResource};

/// Marker type for mirror sessions
#[derive(Debug, Clone, Copy, Default)]
pub struct MirrorSessions;

impl PolicyResource for MirrorSessions {
    type Config = MirrorSessionConfig;
    type Spec = MirrorSessionSpec;
    type Status = serde_json::Value;

    const DESCRIPTOR: ResourceDescriptor = ResourceDescriptor {
        display_name: "Mirror Session",
        api_group: "monitoring",
        collection: "MirrorSession",
    };

    const NAME_FIELD: &'static str = "name";

    fn declared_name(config: &MirrorSessionConfig) -> &str {
        &config.name
    }

    fn validate_name(name: &str) -> Result<(), ValidationError> {
        validate_mirror_session_name(name)
    }

    fn build_domain(config: &MirrorSessionConfig) -> DomainObject<MirrorSessionSpec, serde_json::Value> {
        let meta = ObjectMeta::new(&config.name, DEFAULT_TENANT).with_namespace(DEFAULT_NAMESPACE);

        let spec = MirrorSessionSpec {
            packet_size: config.packet_size,
            start_condition: serde_json::Map::new(),
            collectors: config
                .collectors
                .iter()
                .map(|c| Collector {
                    collector_type: c.collector_type.clone(),
                    export_config: ExportConfig {
                        destination: c.destination.clone(),
                        virtual_router: c.virtual_router.clone(),
                    },
                })
                .collect(),
            match_rules: None,
            span_id: config.span_id,
            disabled: config.disabled,
            policy_distribution_targets: vec![config.policy_distribution_target.clone()],
        };

        DomainObject::new(meta, spec)
    }

    fn from_domain(object: &DomainObject<MirrorSessionSpec, serde_json::Value>) -> MirrorSessionConfig {
        let spec = &object.spec;
        MirrorSessionConfig {
            name: object.meta.name.clone(),
            span_id: spec.span_id,
            packet_size: spec.packet_size,
            disabled: spec.disabled,
            policy_distribution_target: first_target(&spec.policy_distribution_targets),
            collectors: spec
                .collectors
                .iter()
                .map(|c| CollectorConfig {
                    collector_type: c.collector_type.clone(),
                    destination: c.export_config.destination.clone(),
                    virtual_router: c.export_config.virtual_router.clone(),
                })
                .collect(),
        }
    }

    fn force_new_changes(prior: &MirrorSessionConfig, desired: &MirrorSessionConfig) -> Vec<&'static str> {
        let mut fields = Vec::new();
        if prior.name != desired.name {
            fields.push("name");
        }
        fields
    }
}
