use serde_json::json;

use zos_lens::LensError;
use zos_lens::error::{ConfigError, RmbError, SessionError};

use crate::scripted_bus::{ScriptedBus, ScriptedConnector, lens_over, ready_lens};

const FORBIDDEN: &str = "403 Forbidden: admin required";

#[tokio::test]
async fn forbidden_is_unauthorized_for_every_operation() {
    let bus = ScriptedBus::new()
        .fail(FORBIDDEN)
        .fail(FORBIDDEN)
        .fail(FORBIDDEN)
        .fail(FORBIDDEN)
        .fail(FORBIDDEN);
    let mut lens = ready_lens(ScriptedConnector::new(bus)).await;

    let outcomes = [
        ("list deployments", lens.list_deployments().await.map(|_| ())),
        ("deployment detail", lens.get_deployment_detail(89, 1).await.map(|_| ())),
        ("deployment history", lens.get_deployment_history(89, 1).await.map(|_| ())),
        ("workload info", lens.get_workload_info(89, 1, "vm").await.map(|_| ())),
        ("deployment health", lens.get_deployment_health(89, 1).await.map(|_| ())),
    ];

    for (expected, outcome) in outcomes {
        match outcome {
            Err(LensError::Unauthorized { operation }) => assert_eq!(operation, expected),
            other => panic!("{expected}: expected Unauthorized, got {other:?}"),
        }
    }
}

#[tokio::test]
async fn unauthorized_message_explains_admin_requirement() {
    let bus = ScriptedBus::new().fail("permission denied");
    let mut lens = ready_lens(ScriptedConnector::new(bus)).await;

    let err = lens.get_deployment_detail(89, 1).await.unwrap_err();

    assert!(err.is_unauthorized());
    assert!(err.to_string().contains("admin privileges"));
}

#[tokio::test]
async fn pending_string_reply_is_an_invalid_response() {
    let bus = ScriptedBus::new().reply(json!("pending"));
    let mut lens = ready_lens(ScriptedConnector::new(bus)).await;

    let err = lens.get_deployment_detail(89, 252_974).await.unwrap_err();

    assert!(matches!(
        err,
        LensError::Rmb(RmbError::InvalidResponse { ref command, .. })
            if command == "zos.debug.deployment.get"
    ));
}

#[tokio::test]
async fn error_object_reply_is_not_an_empty_detail() {
    let bus = ScriptedBus::new().reply(json!({ "error": "deployment not found" }));
    let mut lens = ready_lens(ScriptedConnector::new(bus)).await;

    let err = lens.get_deployment_detail(89, 1).await.unwrap_err();

    assert!(matches!(
        err,
        LensError::Rmb(RmbError::InvalidResponse { ref reason, .. }) if reason == "no recognized envelope"
    ));
}

#[tokio::test]
async fn list_degrades_on_unusable_replies() {
    let bus = ScriptedBus::new()
        .reply(json!(null))
        .reply(json!("pending"))
        .fail("relay timeout");
    let mut lens = ready_lens(ScriptedConnector::new(bus)).await;

    for _ in 0..3 {
        assert!(lens.list_deployments().await.unwrap().is_empty());
    }
}

#[tokio::test]
async fn detail_without_target_is_a_configuration_error() {
    let bus = ScriptedBus::new();
    let mut lens = lens_over(ScriptedConnector::new(bus.clone()));
    lens.set_mnemonic(Some("words".into())).await;

    let err = lens.get_deployment_history(89, 1).await.unwrap_err();

    assert!(err.is_configuration());
    assert!(matches!(err, LensError::Config(ConfigError::MissingTarget { .. })));
    assert!(bus.sent().is_empty());
}

#[tokio::test]
async fn refused_connect_surfaces_on_detail_but_not_on_list() {
    let bus = ScriptedBus::new();
    let connector = ScriptedConnector::refusing(bus.clone(), "Invalid mnemonic");
    let mut lens = ready_lens(connector.clone()).await;
    assert!(!lens.is_connected());

    assert!(lens.list_deployments().await.unwrap().is_empty());
    let err = lens.get_deployment_detail(89, 1).await.unwrap_err();

    assert!(matches!(err, LensError::Session(SessionError::InvalidMnemonic)));
    // One attempt when the phrase was set, then one per query.
    assert_eq!(connector.builds(), 3);
    assert!(bus.sent().is_empty());
}
