//! Deployment queries against the selected node.

use crate::config::{Config, NetworkEnv};
use crate::error::{self, ConfigError, LensError, Result, RmbError};
use crate::rmb::{
    Command, DeploymentDetail, DeploymentHealth, DeploymentHistory, DeploymentList, Operation,
    RequestOptions, RmbConnector, RmbWrapper, SessionManager, SessionSettings, WorkloadInfo,
    normalize,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use zeroize::Zeroizing;

/// The node being inspected and the twin its debug API answers on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeSelection {
    pub node_id: u32,
    pub twin_id: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum LensState {
    /// No secret phrase.
    NoIdentity,
    /// Phrase present, no node selected.
    NoTarget,
    Ready,
}

/// Public entry point for querying the deployments hosted on one node.
///
/// Holds the identity and the target; the bus session is created lazily on
/// the first query and rebuilt whenever the identity or network changes.
pub struct Lens {
    session: SessionManager,
    mnemonic: Option<Zeroizing<String>>,
    selection: Option<NodeSelection>,
    options: RequestOptions,
}

impl Lens {
    pub fn new(
        connector: Arc<dyn RmbConnector>,
        network: NetworkEnv,
        settings: SessionSettings,
        options: RequestOptions,
    ) -> Self {
        Self {
            session: SessionManager::new(connector, network, settings),
            mnemonic: None,
            selection: None,
            options,
        }
    }

    /// Seed identity, target and bus settings from persisted config.
    ///
    /// Nothing is connected yet.
    pub fn from_config(config: &Config, connector: Arc<dyn RmbConnector>) -> Self {
        let mut lens = Self::new(
            connector,
            config.network,
            SessionSettings::from_config(&config.rmb),
            RequestOptions::from_config(&config.rmb),
        );
        lens.mnemonic = config
            .mnemonic
            .as_deref()
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .map(|m| Zeroizing::new(m.to_string()));
        lens.selection = match (config.selected_node_id, config.selected_twin_id) {
            (Some(node_id), Some(twin_id)) => Some(NodeSelection { node_id, twin_id }),
            _ => None,
        };
        lens
    }

    pub fn state(&self) -> LensState {
        match (&self.mnemonic, &self.selection) {
            (None, _) => LensState::NoIdentity,
            (Some(_), None) => LensState::NoTarget,
            (Some(_), Some(_)) => LensState::Ready,
        }
    }

    pub fn network(&self) -> NetworkEnv {
        self.session.network()
    }

    pub fn selection(&self) -> Option<NodeSelection> {
        self.selection
    }

    pub fn is_connected(&self) -> bool {
        self.session.is_connected()
    }

    /// Replace the identity. A failed connect is only logged; the next query
    /// tries again.
    pub async fn set_mnemonic(&mut self, mnemonic: Option<String>) {
        self.session.reset().await;
        self.mnemonic = mnemonic
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty())
            .map(Zeroizing::new);

        let Some(mnemonic) = self.mnemonic.clone() else {
            tracing::info!("Identity cleared");
            return;
        };
        if let Err(e) = self.session.initialize(mnemonic.as_str()).await {
            tracing::warn!("RMB client not ready yet, will retry on next query: {e}");
        }
    }

    pub fn select_node(&mut self, selection: Option<NodeSelection>) {
        if let Some(sel) = selection {
            tracing::info!(node_id = sel.node_id, twin_id = sel.twin_id, "Node selected");
        }
        self.selection = selection;
    }

    pub async fn set_network(&mut self, network: NetworkEnv) {
        self.session.set_network(network).await;
    }

    /// Tear down the bus session, keeping identity and target.
    pub async fn disconnect(&mut self) {
        self.session.disconnect().await;
    }

    // ── Operations ──────────────────────────────────────────────────────

    /// Deployments hosted on the selected node.
    ///
    /// Without identity or target this is an empty listing and nothing is
    /// sent. Transport failures also degrade to empty; only a privilege
    /// rejection is surfaced.
    pub async fn list_deployments(&mut self) -> Result<DeploymentList> {
        let operation = Operation::ListDeployments;
        let Some(selection) = self.selection.filter(|_| self.mnemonic.is_some()) else {
            tracing::debug!(state = %self.state(), "Skipping {operation}: lens not ready");
            return Ok(DeploymentList::empty());
        };

        let payload = Command::list_payload();
        let outcome = self
            .exchange(operation, selection.twin_id, &payload)
            .await
            .map_err(|e| Self::escalate(operation, e));
        match outcome {
            Ok(raw) => Ok(normalize::normalize_list(&raw)),
            Err(e) if Self::degrades(operation, &e) => {
                tracing::warn!(twin_id = selection.twin_id, "Failed to {operation}: {e}");
                Ok(DeploymentList::empty())
            }
            Err(e) => Err(e),
        }
    }

    pub async fn get_deployment_detail(
        &mut self,
        twin_id: u32,
        contract_id: u64,
    ) -> Result<DeploymentDetail> {
        let payload = Command::deployment_payload(twin_id, contract_id);
        self.query(Operation::DeploymentDetail, &payload, normalize::normalize_detail)
            .await
    }

    pub async fn get_deployment_history(
        &mut self,
        twin_id: u32,
        contract_id: u64,
    ) -> Result<DeploymentHistory> {
        let deployment_id = Command::deployment_id(twin_id, contract_id);
        let payload = Command::deployment_payload(twin_id, contract_id);
        self.query(Operation::DeploymentHistory, &payload, |raw| {
            normalize::normalize_history(raw, &deployment_id)
        })
        .await
    }

    pub async fn get_workload_info(
        &mut self,
        twin_id: u32,
        contract_id: u64,
        workload: &str,
    ) -> Result<WorkloadInfo> {
        let deployment_id = Command::deployment_id(twin_id, contract_id);
        let payload = Command::info_payload(twin_id, contract_id, workload);
        self.query(Operation::WorkloadInfo, &payload, |raw| {
            normalize::normalize_info(raw, &deployment_id, workload)
        })
        .await
    }

    pub async fn get_deployment_health(
        &mut self,
        twin_id: u32,
        contract_id: u64,
    ) -> Result<DeploymentHealth> {
        let deployment_id = Command::deployment_id(twin_id, contract_id);
        let payload = Command::deployment_payload(twin_id, contract_id);
        self.query(Operation::DeploymentHealth, &payload, |raw| {
            normalize::normalize_health(raw, &deployment_id)
        })
        .await
    }

    // ── Internals ───────────────────────────────────────────────────────

    /// Detail-class pipeline: every failure reaches the caller.
    async fn query<T>(
        &mut self,
        operation: Operation,
        payload: &str,
        decode: impl FnOnce(&Value) -> std::result::Result<T, RmbError>,
    ) -> Result<T> {
        let twin_id = self.target(operation)?;
        let outcome = match self.exchange(operation, twin_id, payload).await {
            Ok(raw) => decode(&raw).map_err(LensError::from),
            Err(e) => Err(e),
        };
        outcome.map_err(|e| Self::escalate(operation, e))
    }

    fn target(&self, operation: Operation) -> std::result::Result<u32, ConfigError> {
        if self.mnemonic.is_none() {
            return Err(ConfigError::MissingIdentity {
                operation: operation.to_string(),
            });
        }
        self.selection
            .map(|sel| sel.twin_id)
            .ok_or_else(|| ConfigError::MissingTarget {
                operation: operation.to_string(),
            })
    }

    /// Connect if needed, then run one request/response exchange.
    async fn exchange(&mut self, operation: Operation, twin_id: u32, payload: &str) -> Result<Value> {
        if !self.session.is_connected() {
            let mnemonic = self
                .mnemonic
                .clone()
                .ok_or(ConfigError::MissingMnemonic)?;
            self.session.initialize(mnemonic.as_str()).await?;
        }
        let wrapper = RmbWrapper::new(self.session.handle()?);
        let raw = wrapper
            .request(operation.command().as_str(), payload, twin_id, self.options)
            .await?;
        Ok(raw)
    }

    /// List-class operations swallow every failure except a privilege rejection.
    fn degrades(operation: Operation, err: &LensError) -> bool {
        operation.is_list_class() && !err.is_unauthorized()
    }

    fn escalate(operation: Operation, err: LensError) -> LensError {
        Self::privilege_failure(operation, &err).unwrap_or(err)
    }

    fn privilege_failure(operation: Operation, err: &LensError) -> Option<LensError> {
        if err.is_unauthorized() {
            return None;
        }
        error::is_unauthorized(&err.to_string()).then(|| {
            tracing::error!("{operation} rejected by node: {err}");
            LensError::Unauthorized {
                operation: operation.to_string(),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rmb::{BusFuture, ClientParams, RmbClient};
    use serde_json::json;
    use std::sync::Mutex;

    /// Replies with one fixed value or one fixed error.
    struct CannedBus {
        reply: std::result::Result<Value, String>,
        sent: Mutex<Vec<(String, String, u32)>>,
    }

    impl RmbClient for CannedBus {
        fn connect(&self) -> BusFuture<'_, ()> {
            Box::pin(async { Ok(()) })
        }

        fn disconnect(&self) -> BusFuture<'_, ()> {
            Box::pin(async { Ok(()) })
        }

        fn send<'a>(
            &'a self,
            command: &'a str,
            payload: &'a str,
            destination: u32,
            _expiration_hours: f64,
            _retries: u32,
        ) -> BusFuture<'a, String> {
            Box::pin(async move {
                self.sent
                    .lock()
                    .unwrap()
                    .push((command.to_string(), payload.to_string(), destination));
                Ok("r".to_string())
            })
        }

        fn read<'a>(&'a self, _request_id: &'a str) -> BusFuture<'a, Value> {
            let reply = self.reply.clone();
            Box::pin(async move { reply.map_err(|e| anyhow::anyhow!(e)) })
        }
    }

    struct CannedConnector {
        bus: Arc<CannedBus>,
        refuse: Option<&'static str>,
    }

    impl RmbConnector for CannedConnector {
        fn name(&self) -> &str {
            "canned"
        }

        fn build(&self, _params: &ClientParams) -> anyhow::Result<Arc<dyn RmbClient>> {
            if let Some(reason) = self.refuse {
                anyhow::bail!(reason);
            }
            Ok(self.bus.clone() as Arc<dyn RmbClient>)
        }
    }

    fn lens_with(
        reply: std::result::Result<Value, String>,
        refuse: Option<&'static str>,
    ) -> (Lens, Arc<CannedBus>) {
        let bus = Arc::new(CannedBus {
            reply,
            sent: Mutex::new(Vec::new()),
        });
        let connector = Arc::new(CannedConnector {
            bus: bus.clone(),
            refuse,
        });
        let lens = Lens::new(
            connector,
            NetworkEnv::Main,
            SessionSettings::default(),
            RequestOptions::default(),
        );
        (lens, bus)
    }

    fn twin_89() -> Option<NodeSelection> {
        Some(NodeSelection {
            node_id: 11,
            twin_id: 89,
        })
    }

    #[tokio::test]
    async fn state_follows_identity_and_target() {
        let (mut lens, _) = lens_with(Ok(json!({})), None);
        assert_eq!(lens.state(), LensState::NoIdentity);

        lens.set_mnemonic(Some("  alpha beta  ".into())).await;
        assert_eq!(lens.state(), LensState::NoTarget);
        assert!(lens.is_connected());

        lens.select_node(twin_89());
        assert_eq!(lens.state(), LensState::Ready);

        lens.set_mnemonic(None).await;
        assert_eq!(lens.state(), LensState::NoIdentity);
        assert!(!lens.is_connected());
    }

    #[tokio::test]
    async fn failed_initialize_on_set_is_not_returned() {
        let (mut lens, _) = lens_with(Ok(json!({})), Some("Invalid mnemonic"));

        lens.set_mnemonic(Some("alpha".into())).await;

        assert_eq!(lens.state(), LensState::NoTarget);
        assert!(!lens.is_connected());
    }

    #[tokio::test]
    async fn detail_requires_identity_then_target() {
        let (mut lens, bus) = lens_with(Ok(json!({})), None);

        let err = lens.get_deployment_detail(89, 1).await.unwrap_err();
        assert!(matches!(err, LensError::Config(ConfigError::MissingIdentity { .. })));

        lens.set_mnemonic(Some("alpha".into())).await;
        let err = lens.get_deployment_health(89, 1).await.unwrap_err();
        assert!(matches!(
            err,
            LensError::Config(ConfigError::MissingTarget { ref operation }) if operation == "deployment health"
        ));
        assert!(bus.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn detail_targets_selected_twin_with_deployment_payload() {
        let (mut lens, bus) = lens_with(
            Ok(json!({ "history": [{ "seq": 1, "type": "zdb", "state": "ok" }] })),
            None,
        );
        lens.set_mnemonic(Some("alpha".into())).await;
        lens.select_node(twin_89());

        let history = lens.get_deployment_history(89, 252_974).await.unwrap();

        assert_eq!(history.deployment, "89:252974");
        let sent = bus.sent.lock().unwrap();
        assert_eq!(sent[0].0, "zos.debug.deployment.history");
        assert_eq!(sent[0].1, r#"{"deployment":"89:252974"}"#);
        assert_eq!(sent[0].2, 89);
    }

    #[tokio::test]
    async fn list_swallows_transport_failures() {
        let (mut lens, _) = lens_with(Err("relay timeout".into()), None);
        lens.set_mnemonic(Some("alpha".into())).await;
        lens.select_node(twin_89());

        let list = lens.list_deployments().await.unwrap();

        assert!(list.is_empty());
    }

    #[tokio::test]
    async fn detail_propagates_transport_failures() {
        let (mut lens, _) = lens_with(Err("relay timeout".into()), None);
        lens.set_mnemonic(Some("alpha".into())).await;
        lens.select_node(twin_89());

        let err = lens.get_workload_info(89, 1, "vm").await.unwrap_err();

        assert!(matches!(err, LensError::Rmb(RmbError::RequestFailed { .. })));
    }

    #[test]
    fn only_listing_degrades_and_never_on_privilege() {
        let transport = LensError::Rmb(RmbError::RequestFailed {
            command: "zos.debug.deployment.list".into(),
            destination: 89,
            cause: "relay timeout".into(),
        });
        let rejected = Lens::escalate(
            Operation::ListDeployments,
            LensError::Rmb(RmbError::RequestFailed {
                command: "zos.debug.deployment.list".into(),
                destination: 89,
                cause: "403 Forbidden".into(),
            }),
        );

        assert!(Lens::degrades(Operation::ListDeployments, &transport));
        assert!(!Lens::degrades(Operation::DeploymentDetail, &transport));
        assert!(!Lens::degrades(Operation::WorkloadInfo, &transport));
        assert!(rejected.is_unauthorized());
        assert!(!Lens::degrades(Operation::ListDeployments, &rejected));
    }

    #[tokio::test]
    async fn lazy_initialize_retries_on_query() {
        let (mut lens, _) = lens_with(Ok(json!({ "deployments": [] })), None);
        lens.set_mnemonic(Some("alpha".into())).await;
        lens.select_node(twin_89());
        lens.disconnect().await;
        assert!(!lens.is_connected());

        lens.list_deployments().await.unwrap();

        assert!(lens.is_connected());
    }

    #[test]
    fn from_config_requires_both_ids_for_a_selection() {
        let connector = Arc::new(crate::rmb::DemoConnector::default());
        let mut config = Config {
            mnemonic: Some("alpha".into()),
            selected_node_id: Some(11),
            ..Config::default()
        };
        assert_eq!(Lens::from_config(&config, connector.clone()).state(), LensState::NoTarget);

        config.selected_twin_id = Some(89);
        let lens = Lens::from_config(&config, connector);
        assert_eq!(lens.state(), LensState::Ready);
        assert_eq!(lens.selection(), twin_89());
    }
}
