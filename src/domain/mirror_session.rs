//! Mirror session wire types

use serde::{Deserialize, Serialize};

use crate::validation::null_as_empty;

/// Mirror session spec as sent to and returned by the server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct MirrorSessionSpec {
    pub packet_size: u32,

    /// Always sent as an empty object; sessions start immediately
    #[serde(default)]
    pub start_condition: serde_json::Map<String, serde_json::Value>,

    #[serde(default, deserialize_with = "null_as_empty")]
    pub collectors: Vec<Collector>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub match_rules: Option<serde_json::Value>,

    pub span_id: u32,

    #[serde(default)]
    pub disabled: bool,

    #[serde(default, deserialize_with = "null_as_empty")]
    pub policy_distribution_targets: Vec<String>,
}

/// Export destination for mirrored packets
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Collector {
    #[serde(rename = "type")]
    pub collector_type: String,
    pub export_config: ExportConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ExportConfig {
    pub destination: String,
    #[serde(default)]
    pub virtual_router: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_spec_wire_format() {
        let spec = MirrorSessionSpec {
            packet_size: 2048,
            start_condition: Default::default(),
            collectors: vec![Collector {
                collector_type: "erspan_type_3".to_string(),
                export_config: ExportConfig {
                    destination: "10.0.0.5".to_string(),
                    virtual_router: "default".to_string(),
                },
            }],
            match_rules: None,
            span_id: 100,
            disabled: false,
            policy_distribution_targets: vec!["default".to_string()],
        };

        let value = serde_json::to_value(&spec).unwrap();
        assert_eq!(
            value,
            json!({
                "packet-size": 2048,
                "start-condition": {},
                "collectors": [{
                    "type": "erspan_type_3",
                    "export-config": {"destination": "10.0.0.5", "virtual-router": "default"}
                }],
                "span-id": 100,
                "disabled": false,
                "policy-distribution-targets": ["default"]
            })
        );
    }

    #[test]
    fn test_spec_decoding_tolerates_null_lists() {
        let spec: MirrorSessionSpec = serde_json::from_value(json!({
            "packet-size": 2048,
            "start-condition": {},
            "collectors": null,
            "span-id": 100,
            "disabled": false,
            "policy-distribution-targets": null
        }))
        .unwrap();
        assert!(spec.collectors.is_empty());
        assert!(spec.policy_distribution_targets.is_empty());
    }
}
