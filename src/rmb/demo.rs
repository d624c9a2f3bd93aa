//! A bus that answers from canned data, for trying the tool without a relay.

use super::client::{BusFuture, ClientParams, RmbClient, RmbConnector};
use super::command::Command;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Builds [`DemoRmbClient`]s; every handle shares the configured latency.
#[derive(Debug, Clone, Default)]
pub struct DemoConnector {
    latency: Duration,
}

impl DemoConnector {
    pub fn new(latency: Duration) -> Self {
        Self { latency }
    }
}

impl RmbConnector for DemoConnector {
    fn name(&self) -> &str {
        "demo"
    }

    fn build(&self, params: &ClientParams) -> anyhow::Result<Arc<dyn RmbClient>> {
        tracing::info!(
            relay = params.relay_url.as_str(),
            session = params.session.as_str(),
            "Using demo RMB client (canned replies)"
        );
        Ok(Arc::new(DemoRmbClient::new(self.latency)))
    }
}

struct PendingReply {
    command: String,
    payload: String,
}

pub struct DemoRmbClient {
    latency: Duration,
    pending: Mutex<HashMap<String, PendingReply>>,
}

impl DemoRmbClient {
    pub fn new(latency: Duration) -> Self {
        Self {
            latency,
            pending: Mutex::new(HashMap::new()),
        }
    }

    fn lock_pending(&self) -> std::sync::MutexGuard<'_, HashMap<String, PendingReply>> {
        self.pending
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl RmbClient for DemoRmbClient {
    fn connect(&self) -> BusFuture<'_, ()> {
        Box::pin(async { Ok(()) })
    }

    fn disconnect(&self) -> BusFuture<'_, ()> {
        Box::pin(async move {
            self.lock_pending().clear();
            Ok(())
        })
    }

    fn send<'a>(
        &'a self,
        command: &'a str,
        payload: &'a str,
        _destination: u32,
        _expiration_hours: f64,
        _retries: u32,
    ) -> BusFuture<'a, String> {
        Box::pin(async move {
            let request_id = uuid::Uuid::new_v4().to_string();
            self.lock_pending().insert(
                request_id.clone(),
                PendingReply {
                    command: command.to_string(),
                    payload: payload.to_string(),
                },
            );
            Ok(request_id)
        })
    }

    fn read<'a>(&'a self, request_id: &'a str) -> BusFuture<'a, Value> {
        Box::pin(async move {
            let pending = self
                .lock_pending()
                .remove(request_id)
                .ok_or_else(|| anyhow::anyhow!("unknown request id {request_id}"))?;
            if !self.latency.is_zero() {
                tokio::time::sleep(self.latency).await;
            }
            canned_reply(&pending.command, &pending.payload)
        })
    }
}

fn requested_deployment(payload: &str) -> anyhow::Result<(u32, u64)> {
    let body: Value = serde_json::from_str(payload)?;
    let id = body
        .get("deployment")
        .and_then(Value::as_str)
        .ok_or_else(|| anyhow::anyhow!("payload carries no deployment id"))?;
    let (twin, contract) = id
        .split_once(':')
        .ok_or_else(|| anyhow::anyhow!("malformed deployment id {id}"))?;
    Ok((twin.parse()?, contract.parse()?))
}

fn canned_reply(command: &str, payload: &str) -> anyhow::Result<Value> {
    if command == Command::DeploymentList.as_str() {
        return Ok(demo_deployments());
    }

    let (twin_id, contract_id) = requested_deployment(payload)?;
    let deployment = Command::deployment_id(twin_id, contract_id);

    if command == Command::DeploymentGet.as_str() {
        Ok(demo_detail(twin_id, contract_id))
    } else if command == Command::DeploymentHistory.as_str() {
        Ok(json!({
            "deployment": deployment,
            "history": [
                { "seq": 1, "type": "network", "name": "example-network", "created": 1_717_000_000, "state": "init", "message": "" },
                { "seq": 2, "type": "network", "name": "example-network", "created": 1_717_000_005, "state": "ok", "message": "" }
            ]
        }))
    } else if command == Command::DeploymentHealth.as_str() {
        Ok(json!({
            "deployment_id": deployment,
            "workloads": [{
                "workload_id": format!("{twin_id}-{contract_id}-example-network"),
                "type": "network",
                "name": "example-network",
                "status": "healthy",
                "checks": [{ "name": "network.bridge", "ok": true, "message": "bridge present", "evidence": {} }]
            }]
        }))
    } else if command == Command::DeploymentInfo.as_str() {
        Ok(json!({
            "result": {
                "info": { "state": "running", "cpu": 1, "memory": 2048 },
                "logs": "demo: workload started"
            }
        }))
    } else {
        anyhow::bail!("unsupported command {command}")
    }
}

fn demo_deployments() -> Value {
    json!({
        "deployments": [
            { "twin_id": 41, "contract_id": 257_069, "workloads": [{ "type": "zdb", "name": "zdbvmproject0", "state": "ok" }] },
            { "twin_id": 89, "contract_id": 252_974, "workloads": [{ "type": "network", "name": "nwtu91y", "state": "ok" }] },
            { "twin_id": 89, "contract_id": 252_975, "workloads": [{ "type": "zmachine", "name": "vmk21f2", "state": "ok" }] },
            { "twin_id": 192, "contract_id": 248_280, "workloads": [{ "type": "network", "name": "chainnetwork", "state": "ok" }] },
            { "twin_id": 192, "contract_id": 248_281, "workloads": [{ "type": "zmachine", "name": "chain", "state": "ok" }] }
        ]
    })
}

fn demo_detail(twin_id: u32, contract_id: u64) -> Value {
    let created = chrono::Utc::now().timestamp();
    json!({
        "deployment": {
            "version": 0,
            "twin_id": twin_id,
            "contract_id": contract_id,
            "metadata": json!({ "version": 3, "type": "network", "name": "example-network", "projectName": "example-project" }).to_string(),
            "description": "Example deployment",
            "expiration": 0,
            "signature_requirement": {
                "requests": [{ "twin_id": twin_id, "required": false, "weight": 1 }],
                "weight_required": 1,
                "signatures": [{
                    "twin_id": twin_id,
                    "signature": "82b6ec4453166a79e860e50b4b18aa9e9daab8125da8ba5648bc67854fc60d63bb31f305117d19d0f0209dfaed2c0aabecf5a42c7d03ea681b468d72c729d988",
                    "signature_type": "sr25519"
                }],
                "signature_style": ""
            },
            "workloads": [{
                "version": 0,
                "name": "example-network",
                "type": "network",
                "data": { "ip_range": "10.20.0.0/16", "subnet": "10.20.2.0/24" },
                "metadata": json!({ "version": 3, "user_accesses": [] }).to_string(),
                "description": "Example workload",
                "result": { "created": created, "state": "ok", "message": "", "data": null }
            }]
        }
    })
}
