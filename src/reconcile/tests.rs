use reqwest::Method;
use serde_json::json;
use tokio_util::sync::CancellationToken;

use super::*;
use crate::model::{
    CollectorConfig, MirrorSessionConfig, ProtoPortConfig, RuleConfig, SecurityPolicyConfig,
};
use crate::translate::{MirrorSessions, SecurityPolicies};
use crate::transport::testing::ScriptedTransport;

const POLICY_PATH: &str = "/configs/security/v1/tenant/default/networksecuritypolicies";

fn span_test() -> MirrorSessionConfig {
    MirrorSessionConfig {
        name: "span-test".to_string(),
        span_id: 100,
        packet_size: 2048,
        disabled: false,
        policy_distribution_target: "default".to_string(),
        collectors: vec![CollectorConfig {
            collector_type: "erspan_type_3".to_string(),
            destination: "10.0.0.5".to_string(),
            virtual_router: "default".to_string(),
        }],
    }
}

fn mirror_json(uuid: &str) -> serde_json::Value {
    json!({
        "kind": "MirrorSession",
        "meta": {"name": "span-test", "tenant": "default", "namespace": "default", "uuid": uuid},
        "spec": {
            "packet-size": 2048,
            "start-condition": {},
            "collectors": [{"type": "erspan_type_3", "export-config": {"destination": "10.0.0.5", "virtual-router": "default"}}],
            "span-id": 100,
            "disabled": false,
            "policy-distribution-targets": ["default"]
        }
    })
}

fn web_policy() -> SecurityPolicyConfig {
    SecurityPolicyConfig {
        policy_name: "web".to_string(),
        tenant: "default".to_string(),
        policy_distribution_target: "default".to_string(),
        rules: vec![
            RuleConfig {
                rule_name: Some("allow-https".to_string()),
                action: "permit".to_string(),
                apps: vec!["HTTPS".to_string()],
                from_ip_addresses: vec!["10.0.0.0/8".to_string()],
                ..Default::default()
            },
            RuleConfig {
                action: "deny".to_string(),
                proto_ports: vec![ProtoPortConfig {
                    protocol: "tcp".to_string(),
                    ports: Some("23".to_string()),
                }],
                ..Default::default()
            },
        ],
    }
}

/// Server copy of a security policy config with the given uuid
fn policy_json(config: &SecurityPolicyConfig, uuid: &str) -> serde_json::Value {
    let object = to_domain::<SecurityPolicies>(config).unwrap();
    let mut value = serde_json::to_value(&object).unwrap();
    value["meta"]["uuid"] = json!(uuid);
    value["spec"]["priority"] = json!(10);
    value["status"] = json!({
        "propagation-status": {"generation-id": "1", "updated": 1, "pending": 0, "status": "complete"},
        "rule-status": [{"rule-hash": "a1"}, {"rule-hash": "b2"}]
    });
    value
}

fn web_record(uuid: &str) -> RecordOf<SecurityPolicies> {
    RecordedState {
        id: uuid.to_string(),
        name: "web".to_string(),
        config: web_policy(),
        meta: crate::domain::ObjectMeta::new("web", "default"),
        status: None,
        synced_at: chrono::Utc::now(),
    }
}

fn reconciler<K: PolicyResource>(transport: &ScriptedTransport) -> Reconciler<'_, K> {
    Reconciler::new(transport, CancellationToken::new())
}

#[tokio::test]
async fn test_create_records_server_uuid() {
    let transport = ScriptedTransport::new().ok_json(mirror_json("abc-123"));

    let outcome =
        reconciler::<MirrorSessions>(&transport).apply(None, Some(&span_test())).await.unwrap();

    assert_eq!(outcome.action, Action::Create);
    let record = outcome.record.unwrap();
    assert_eq!(record.id, "abc-123");
    assert_eq!(record.name, "span-test");
    assert_eq!(record.config, span_test());

    let body = transport.body_json(0);
    let collectors = body["spec"]["collectors"].as_array().unwrap();
    assert_eq!(collectors.len(), 1);
    assert_eq!(collectors[0]["export-config"]["destination"], "10.0.0.5");
}

#[tokio::test]
async fn test_invalid_rule_action_fails_before_any_request() {
    let mut config = web_policy();
    config.rules[1].action = "reject".to_string();
    let transport = ScriptedTransport::new();

    let error =
        reconciler::<SecurityPolicies>(&transport).apply(None, Some(&config)).await.unwrap_err();

    match error {
        Error::Configuration { field, .. } => assert_eq!(field.as_deref(), Some("rules[1].action")),
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(transport.requests().is_empty());
}

#[tokio::test]
async fn test_invalid_declaration_skips_refresh() {
    let mut config = web_policy();
    config.rules[0].action = "allow".to_string();
    let transport = ScriptedTransport::new();
    let prior = web_record("uuid-1");

    let error = reconciler::<SecurityPolicies>(&transport)
        .apply(Some(&prior), Some(&config))
        .await
        .unwrap_err();
    assert!(error.is_configuration());
    assert!(transport.requests().is_empty());
}

#[tokio::test]
async fn test_read_not_found_clears_record() {
    let transport = ScriptedTransport::new().reply(404, "");
    let prior = web_record("uuid-1");

    let refreshed = reconciler::<SecurityPolicies>(&transport).read(&prior).await.unwrap();
    assert!(refreshed.is_none());
}

#[tokio::test]
async fn test_drift_recreates_declared_object() {
    let transport = ScriptedTransport::new()
        .reply(404, "")
        .ok_json(policy_json(&web_policy(), "uuid-2"));
    let prior = web_record("uuid-1");

    let outcome = reconciler::<SecurityPolicies>(&transport)
        .apply(Some(&prior), Some(&web_policy()))
        .await
        .unwrap();

    assert_eq!(outcome.action, Action::Create);
    assert_eq!(outcome.record.unwrap().id, "uuid-2");
    assert_eq!(
        transport.calls(),
        vec![(Method::GET, format!("{}/web", POLICY_PATH)), (Method::POST, POLICY_PATH.to_string())]
    );
}

#[tokio::test]
async fn test_force_new_change_deletes_then_creates() {
    let mut desired = web_policy();
    desired.policy_distribution_target = "dsc-group".to_string();

    let transport = ScriptedTransport::new()
        .ok_json(policy_json(&web_policy(), "uuid-1"))
        .reply(200, "{}")
        .ok_json(policy_json(&desired, "uuid-2"));
    let prior = web_record("uuid-1");

    let outcome = reconciler::<SecurityPolicies>(&transport)
        .apply(Some(&prior), Some(&desired))
        .await
        .unwrap();

    assert_eq!(outcome.action, Action::Replace { fields: vec!["policy_distribution_target"] });
    let record = outcome.record.unwrap();
    assert_eq!(record.id, "uuid-2");
    assert_eq!(record.config, desired);

    let calls = transport.calls();
    assert_eq!(
        calls,
        vec![
            (Method::GET, format!("{}/web", POLICY_PATH)),
            (Method::DELETE, format!("{}/web", POLICY_PATH)),
            (Method::POST, POLICY_PATH.to_string()),
        ]
    );
    assert!(calls.iter().all(|(method, _)| *method != Method::PUT));
}

#[tokio::test]
async fn test_update_rejects_force_new_change_locally() {
    let mut desired = web_policy();
    desired.tenant = "other".to_string();
    let transport = ScriptedTransport::new();

    let error = reconciler::<SecurityPolicies>(&transport)
        .update(&web_record("uuid-1"), &desired)
        .await
        .unwrap_err();

    match error {
        Error::Configuration { field, .. } => assert_eq!(field.as_deref(), Some("tenant")),
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(transport.requests().is_empty());
}

#[tokio::test]
async fn test_update_sends_full_replacement() {
    let mut desired = web_policy();
    desired.rules[0].apps.clear();

    let transport = ScriptedTransport::new()
        .ok_json(policy_json(&web_policy(), "uuid-1"))
        .ok_json(policy_json(&desired, "uuid-1"));
    let prior = web_record("uuid-1");

    let outcome = reconciler::<SecurityPolicies>(&transport)
        .apply(Some(&prior), Some(&desired))
        .await
        .unwrap();
    assert_eq!(outcome.action, Action::Update);

    let body = transport.body_json(1);
    assert_eq!(transport.calls()[1], (Method::PUT, format!("{}/web", POLICY_PATH)));
    let rules = body["spec"]["rules"].as_array().unwrap();
    assert_eq!(rules.len(), 2);
    assert!(rules[0].get("apps").is_none());
    assert_eq!(rules[0]["from-ip-addresses"], json!(["10.0.0.0/8"]));
    assert_eq!(rules[1]["proto-ports"], json!([{"protocol": "tcp", "ports": "23"}]));
    assert_eq!(body["spec"]["policy-distribution-targets"], json!(["default"]));
    assert!(body["spec"].get("priority").is_none());
    assert!(body.get("status").is_none());
}

#[tokio::test]
async fn test_unchanged_object_is_noop() {
    let transport = ScriptedTransport::new().ok_json(policy_json(&web_policy(), "uuid-1"));
    let prior = web_record("uuid-1");

    let outcome = reconciler::<SecurityPolicies>(&transport)
        .apply(Some(&prior), Some(&web_policy()))
        .await
        .unwrap();

    assert_eq!(outcome.action, Action::NoOp);
    let record = outcome.record.unwrap();
    assert_eq!(record.id, "uuid-1");
    assert!(record.status.is_some());
    assert_eq!(transport.requests().len(), 1);
}

#[tokio::test]
async fn test_removed_declaration_deletes() {
    let transport = ScriptedTransport::new()
        .ok_json(policy_json(&web_policy(), "uuid-1"))
        .reply(200, "{}");
    let prior = web_record("uuid-1");

    let outcome =
        reconciler::<SecurityPolicies>(&transport).apply(Some(&prior), None).await.unwrap();

    assert_eq!(outcome.action, Action::Delete);
    assert!(outcome.record.is_none());
}

#[tokio::test]
async fn test_delete_tolerates_not_found() {
    let transport = ScriptedTransport::new().reply(404, "");
    let outcome = reconciler::<SecurityPolicies>(&transport)
        .delete(&web_record("uuid-1"))
        .await
        .unwrap();
    assert_eq!(outcome, DeleteOutcome::AlreadyAbsent);
}

#[tokio::test]
async fn test_import_seeds_record() {
    let transport = ScriptedTransport::new().ok_json(mirror_json("abc-123"));
    let record = reconciler::<MirrorSessions>(&transport).import("span-test").await.unwrap();
    assert_eq!(record.id, "abc-123");
    assert_eq!(record.config, span_test());
    assert_eq!(
        transport.calls(),
        vec![(Method::GET, "/configs/monitoring/v1/tenant/default/MirrorSession/span-test".to_string())]
    );
}

#[tokio::test]
async fn test_import_missing_object_fails() {
    let transport = ScriptedTransport::new().reply(404, "");
    let error = reconciler::<MirrorSessions>(&transport).import("ghost").await.unwrap_err();
    assert!(matches!(error, Error::NotFound { .. }));
}

#[tokio::test]
async fn test_import_rejects_name_outside_pattern() {
    let transport = ScriptedTransport::new();
    let error = reconciler::<MirrorSessions>(&transport)
        .import("../../security/v1/x")
        .await
        .unwrap_err();

    assert!(error.is_configuration());
    assert!(transport.requests().is_empty());

    let error = reconciler::<SecurityPolicies>(&transport).import("web/rules").await.unwrap_err();
    assert!(error.is_configuration());
    assert!(transport.requests().is_empty());
}

#[tokio::test]
async fn test_remote_rejection_is_fatal() {
    let mut desired = web_policy();
    desired.rules.pop();
    let body = r#"{"message":"rule references unknown app"}"#;

    let transport = ScriptedTransport::new()
        .ok_json(policy_json(&web_policy(), "uuid-1"))
        .reply(412, body);
    let prior = web_record("uuid-1");

    let error = reconciler::<SecurityPolicies>(&transport)
        .apply(Some(&prior), Some(&desired))
        .await
        .unwrap_err();

    assert_eq!(error.status_code(), Some(412));
    assert!(error.to_string().contains("rule references unknown app"));
    assert_eq!(prior.id, "uuid-1");
    assert_eq!(prior.config, web_policy());
}

#[tokio::test]
async fn test_missing_uuid_is_invalid_response() {
    let mut response = mirror_json("");
    response["meta"].as_object_mut().unwrap().remove("uuid");
    let transport = ScriptedTransport::new().ok_json(response);

    let error = reconciler::<MirrorSessions>(&transport).create(&span_test()).await.unwrap_err();
    assert!(matches!(error, Error::InvalidResponse { .. }));
}

#[tokio::test]
async fn test_read_of_replaced_object_is_drift() {
    let transport = ScriptedTransport::new().ok_json(policy_json(&web_policy(), "uuid-9"));
    let refreshed = reconciler::<SecurityPolicies>(&transport)
        .read(&web_record("uuid-1"))
        .await
        .unwrap();
    assert!(refreshed.is_none());
}

#[tokio::test]
async fn test_update_response_with_changed_uuid_is_invalid_response() {
    let mut desired = web_policy();
    desired.rules.pop();
    let transport = ScriptedTransport::new().ok_json(policy_json(&desired, "uuid-9"));

    let error = reconciler::<SecurityPolicies>(&transport)
        .update(&web_record("uuid-1"), &desired)
        .await
        .unwrap_err();
    assert!(matches!(error, Error::InvalidResponse { .. }));
}

#[tokio::test]
async fn test_cancelled_before_exchange() {
    let transport = ScriptedTransport::new().ok_json(mirror_json("abc-123"));
    let cancel = CancellationToken::new();
    cancel.cancel();

    let error = Reconciler::<MirrorSessions>::new(&transport, cancel)
        .apply(None, Some(&span_test()))
        .await
        .unwrap_err();

    assert!(error.is_cancelled());
    assert!(transport.requests().is_empty());
}

#[test]
fn test_plan() {
    type R<'a> = Reconciler<'a, SecurityPolicies>;
    let prior = web_record("uuid-1");

    assert_eq!(R::plan(None, None), Action::NoOp);
    assert_eq!(R::plan(None, Some(&web_policy())), Action::Create);
    assert_eq!(R::plan(Some(&prior), None), Action::Delete);
    assert_eq!(R::plan(Some(&prior), Some(&web_policy())), Action::NoOp);

    let mut changed = web_policy();
    changed.rules.reverse();
    assert_eq!(R::plan(Some(&prior), Some(&changed)), Action::Update);

    changed.policy_name = "web-2".to_string();
    assert_eq!(
        R::plan(Some(&prior), Some(&changed)),
        Action::Replace { fields: vec!["policy_name"] }
    );
}

#[test]
fn test_action_display() {
    assert_eq!(Action::Replace { fields: vec!["name"] }.to_string(), "replace (name)");
    assert_eq!(Action::NoOp.to_string(), "no-op");
    assert_eq!(LifecycleState::Deleting.to_string(), "deleting");
}
