use serde_json::{Value, json};

use zos_lens::rmb::WorkloadType;

use crate::scripted_bus::{ScriptedBus, ScriptedConnector, ready_lens};

fn listed() -> Value {
    json!([
        { "twin_id": 192, "contract_id": 248_280, "workloads": [{ "type": "network", "name": "chainnetwork", "state": "ok" }] },
        { "twin_id": 192, "contract_id": 248_281, "workloads": [{ "type": "bogus", "name": "chain", "state": "degraded" }] }
    ])
}

fn detail() -> Value {
    json!({
        "version": 1,
        "twin_id": 192,
        "contract_id": 248_281,
        "metadata": "{\"type\":\"vm\"}",
        "description": "",
        "expiration": 0,
        "signature_requirement": { "requests": [], "weight_required": 1, "signatures": [], "signature_style": "" },
        "workloads": [{ "version": 0, "name": "chain", "type": "zmachine", "data": {}, "result": { "created": 1, "state": "ok" } }]
    })
}

#[tokio::test]
async fn every_list_envelope_yields_the_same_deployments() {
    let bus = ScriptedBus::new()
        .reply(json!({ "deployments": listed() }))
        .reply(json!({ "result": { "deployments": listed() } }))
        .reply(listed())
        .reply(json!({ "result": listed() }));
    let mut lens = ready_lens(ScriptedConnector::new(bus)).await;

    let mut lists = Vec::new();
    for _ in 0..4 {
        lists.push(lens.list_deployments().await.unwrap());
    }

    assert_eq!(lists[0].deployments.len(), 2);
    assert_eq!(lists[0].deployments[1].workloads[0].workload_type, WorkloadType::Network);
    assert!(lists.iter().all(|list| *list == lists[0]));
}

#[tokio::test]
async fn every_detail_envelope_yields_the_same_detail() {
    let bus = ScriptedBus::new()
        .reply(json!({ "deployment": detail() }))
        .reply(json!({ "result": { "deployment": detail() } }))
        .reply(json!({ "result": detail() }))
        .reply(detail());
    let mut lens = ready_lens(ScriptedConnector::new(bus)).await;

    let mut details = Vec::new();
    for _ in 0..4 {
        details.push(lens.get_deployment_detail(192, 248_281).await.unwrap());
    }

    assert_eq!(details[0].contract_id, 248_281);
    assert_eq!(details[0].metadata, "{\"type\":\"vm\"}");
    assert!(details.iter().all(|d| *d == details[0]));
}

#[tokio::test]
async fn health_envelopes_agree() {
    let report = json!({
        "deployment_id": "192:248281",
        "workloads": [{
            "workload_id": "192-248281-chain",
            "type": "zmachine",
            "name": "chain",
            "status": "unhealthy",
            "checks": [{ "name": "vm.running", "ok": false, "message": "vm not running", "evidence": { "pid": null } }]
        }]
    });
    let bus = ScriptedBus::new()
        .reply(report.clone())
        .reply(json!({ "result": report }));
    let mut lens = ready_lens(ScriptedConnector::new(bus)).await;

    let direct = lens.get_deployment_health(192, 248_281).await.unwrap();
    let nested = lens.get_deployment_health(192, 248_281).await.unwrap();

    assert_eq!(direct, nested);
    assert_eq!(direct.deployment, "192:248281");
    assert_eq!(direct.workloads[0].status.as_str(), "unhealthy");
    assert!(!direct.is_healthy());
}
