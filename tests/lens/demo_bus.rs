use std::sync::Arc;
use std::time::Duration;

use zos_lens::config::NetworkEnv;
use zos_lens::rmb::{DemoConnector, RequestOptions, SessionSettings};
use zos_lens::{Lens, NodeSelection};

async fn demo_lens() -> Lens {
    let mut lens = Lens::new(
        Arc::new(DemoConnector::new(Duration::ZERO)),
        NetworkEnv::Test,
        SessionSettings::default(),
        RequestOptions::default(),
    );
    lens.set_mnemonic(Some("demo words".into())).await;
    lens.select_node(Some(NodeSelection {
        node_id: 11,
        twin_id: 89,
    }));
    lens
}

#[tokio::test]
async fn demo_bus_serves_every_operation() {
    let mut lens = demo_lens().await;

    let list = lens.list_deployments().await.unwrap();
    assert_eq!(list.deployments.len(), 5);

    let detail = lens.get_deployment_detail(89, 252_974).await.unwrap();
    assert_eq!(detail.contract_id, 252_974);
    assert_eq!(detail.signature_requirement.signatures.len(), 1);

    let history = lens.get_deployment_history(89, 252_974).await.unwrap();
    assert_eq!(history.deployment, "89:252974");
    assert_eq!(history.history.len(), 2);

    let health = lens.get_deployment_health(89, 252_974).await.unwrap();
    assert!(health.is_healthy());

    let info = lens.get_workload_info(89, 252_974, "example-network").await.unwrap();
    assert_eq!(info.workload, "example-network");
    assert!(!info.logs.is_empty());
}
