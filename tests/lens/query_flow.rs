use serde_json::json;

use zos_lens::LensState;
use zos_lens::rmb::{WorkloadState, WorkloadType};

use crate::scripted_bus::{ScriptedBus, ScriptedConnector, TWIN_ID, lens_over, ready_lens};

#[tokio::test]
async fn listing_twin_89_returns_the_hosted_deployment() {
    let bus = ScriptedBus::new().reply(json!({
        "result": {
            "deployments": [{
                "twin_id": 89,
                "contract_id": 252_974,
                "workloads": [{ "type": "network", "name": "nwtu91y", "state": "ok" }]
            }]
        }
    }));
    let mut lens = ready_lens(ScriptedConnector::new(bus.clone())).await;

    let list = lens.list_deployments().await.unwrap();

    assert_eq!(list.deployments.len(), 1);
    let deployment = &list.deployments[0];
    assert_eq!(deployment.twin_id, 89);
    assert_eq!(deployment.contract_id, 252_974);
    assert_eq!(deployment.workloads[0].workload_type, WorkloadType::Network);
    assert_eq!(deployment.workloads[0].name, "nwtu91y");
    assert_eq!(deployment.workloads[0].state, WorkloadState::Ok);

    let sent = bus.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].command, "zos.debug.deployment.list");
    assert_eq!(sent[0].payload, "");
    assert_eq!(sent[0].destination, TWIN_ID);
    assert!((sent[0].expiration_hours - 1.0).abs() < f64::EPSILON);
    assert_eq!(sent[0].retries, 1);
}

#[tokio::test]
async fn listing_without_phrase_sends_nothing() {
    let bus = ScriptedBus::new();
    let connector = ScriptedConnector::new(bus.clone());
    let mut lens = lens_over(connector.clone());
    assert_eq!(lens.state(), LensState::NoIdentity);

    let list = lens.list_deployments().await.unwrap();

    assert!(list.is_empty());
    assert!(bus.sent().is_empty());
    assert_eq!(connector.builds(), 0);
}

#[tokio::test]
async fn info_sends_verbose_workload_payload() {
    let bus = ScriptedBus::new().reply(json!({
        "deployment": "89:252975",
        "workload": "vmk21f2",
        "info": { "state": "running" },
        "logs": "booted"
    }));
    let mut lens = ready_lens(ScriptedConnector::new(bus.clone())).await;

    let info = lens.get_workload_info(89, 252_975, "vmk21f2").await.unwrap();

    assert_eq!(info.workload, "vmk21f2");
    assert_eq!(info.info["state"], "running");
    assert_eq!(info.logs, "booted");
    let payload: serde_json::Value = serde_json::from_str(&bus.sent()[0].payload).unwrap();
    assert_eq!(
        payload,
        json!({ "deployment": "89:252975", "workload": "vmk21f2", "verbose": true })
    );
}

#[tokio::test]
async fn history_preserves_unknown_types_and_order() {
    let bus = ScriptedBus::new().reply(json!({
        "result": [
            { "seq": 2, "type": "bogus", "name": "a", "created": 20, "state": "ok" },
            { "seq": 1, "type": "zmachine", "name": "a", "created": 10 }
        ]
    }));
    let mut lens = ready_lens(ScriptedConnector::new(bus)).await;

    let history = lens.get_deployment_history(89, 7).await.unwrap();

    assert_eq!(history.deployment, "89:7");
    assert_eq!(history.history[0].seq, 2);
    assert_eq!(history.history[0].entry_type, "bogus");
    assert_eq!(history.history[1].state.as_str(), "unknown");
}

#[tokio::test]
async fn new_phrase_replaces_the_session() {
    let bus = ScriptedBus::new();
    let connector = ScriptedConnector::new(bus.clone());
    let mut lens = ready_lens(connector.clone()).await;
    assert_eq!(bus.connects(), 1);

    lens.set_mnemonic(Some("another phrase".into())).await;

    assert_eq!(connector.builds(), 2);
    assert_eq!(bus.disconnects(), 1);
    assert_eq!(bus.connects(), 2);
    assert!(lens.is_connected());
}

#[tokio::test]
async fn disconnect_twice_is_harmless() {
    let bus = ScriptedBus::new();
    let mut lens = ready_lens(ScriptedConnector::new(bus.clone())).await;

    lens.disconnect().await;
    lens.disconnect().await;

    assert!(!lens.is_connected());
    assert_eq!(bus.disconnects(), 1);
}

#[tokio::test]
async fn switching_network_reconnects_lazily() {
    let bus = ScriptedBus::new().reply(json!({ "deployments": [] }));
    let connector = ScriptedConnector::new(bus.clone());
    let mut lens = ready_lens(connector.clone()).await;

    lens.set_network(zos_lens::config::NetworkEnv::Dev).await;
    assert!(!lens.is_connected());
    assert_eq!(lens.state(), LensState::Ready);

    lens.list_deployments().await.unwrap();

    assert!(lens.is_connected());
    assert_eq!(connector.builds(), 2);
}
