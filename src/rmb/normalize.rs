//! Maps raw bus replies into the domain types.
//!
//! Nodes of different versions wrap the same payload differently: directly,
//! one level down under `result`, and for listings under `deployments` at
//! either level. Each command family probes an ordered list of extraction
//! strategies and takes the first structural match, so callers never see the
//! envelope.

use super::command::Command;
use super::types::{
    Deployment, DeploymentDetail, DeploymentHealth, DeploymentHistory, DeploymentHistoryEntry,
    DeploymentList, Workload, WorkloadHealth, WorkloadInfo, WorkloadState, WorkloadType,
};
use crate::error::RmbError;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::str::FromStr;

/// A named way of locating the payload inside a reply.
struct Strategy {
    name: &'static str,
    extract: for<'a> fn(&'a Value, &str) -> Option<&'a Value>,
}

fn top_level_deployments<'a>(raw: &'a Value, _field: &str) -> Option<&'a Value> {
    raw.get("deployments").filter(|v| v.is_array())
}

fn result_deployments<'a>(raw: &'a Value, _field: &str) -> Option<&'a Value> {
    raw.get("result")
        .and_then(|result| result.get("deployments"))
        .filter(|v| v.is_array())
}

fn bare_array<'a>(raw: &'a Value, _field: &str) -> Option<&'a Value> {
    Some(raw).filter(|v| v.is_array())
}

fn result_array<'a>(raw: &'a Value, _field: &str) -> Option<&'a Value> {
    raw.get("result").filter(|v| v.is_array())
}

fn direct_field<'a>(raw: &'a Value, field: &str) -> Option<&'a Value> {
    Some(raw).filter(|v| v.get(field).is_some())
}

fn nested_result<'a>(raw: &'a Value, _field: &str) -> Option<&'a Value> {
    raw.get("result").filter(|v| is_structured(v))
}

fn whole_reply<'a>(raw: &'a Value, _field: &str) -> Option<&'a Value> {
    Some(raw).filter(|v| is_structured(v))
}

const LIST_STRATEGIES: &[Strategy] = &[
    Strategy {
        name: "deployments",
        extract: top_level_deployments,
    },
    Strategy {
        name: "result.deployments",
        extract: result_deployments,
    },
    Strategy {
        name: "array",
        extract: bare_array,
    },
    Strategy {
        name: "result array",
        extract: result_array,
    },
];

const DETAIL_STRATEGIES: &[Strategy] = &[
    Strategy {
        name: "direct",
        extract: direct_field,
    },
    Strategy {
        name: "result",
        extract: nested_result,
    },
    Strategy {
        name: "whole",
        extract: whole_reply,
    },
];

fn is_structured(value: &Value) -> bool {
    value.is_object() || value.is_array()
}

fn probe<'a>(strategies: &[Strategy], raw: &'a Value, field: &str) -> Option<&'a Value> {
    strategies.iter().find_map(|strategy| {
        let found = (strategy.extract)(raw, field);
        if found.is_some() {
            tracing::trace!(strategy = strategy.name, field, "Matched reply envelope");
        }
        found
    })
}

fn describe(raw: &Value) -> String {
    match raw {
        Value::Null => "reply is empty".to_string(),
        Value::String(text) => format!("reply is a bare string: {text:?}"),
        Value::Bool(_) | Value::Number(_) => format!("reply is a scalar: {raw}"),
        Value::Array(_) | Value::Object(_) => "no recognized envelope".to_string(),
    }
}

fn invalid(command: Command, reason: impl Into<String>) -> RmbError {
    RmbError::InvalidResponse {
        command: command.as_str().to_string(),
        reason: reason.into(),
    }
}

/// Locate the payload of a detail-class reply; `field` identifies the
/// directly-addressed shape.
fn detail_payload<'a>(command: Command, raw: &'a Value, field: &str) -> Result<&'a Value, RmbError> {
    probe(DETAIL_STRATEGIES, raw, field).ok_or_else(|| invalid(command, describe(raw)))
}

fn decode<T: for<'de> Deserialize<'de>>(command: Command, value: &Value) -> Result<T, RmbError> {
    T::deserialize(value).map_err(|e| invalid(command, e.to_string()))
}

fn str_field<'a>(payload: &'a Value, keys: &[&str]) -> Option<&'a str> {
    keys.iter().find_map(|key| payload.get(*key).and_then(Value::as_str))
}

// ── Listing ──────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct ListedDeploymentWire {
    #[serde(default)]
    twin_id: Option<u32>,
    #[serde(default)]
    contract_id: Option<u64>,
    #[serde(default)]
    workloads: Option<Vec<Value>>,
}

#[derive(Deserialize)]
struct ListedWorkloadWire {
    #[serde(rename = "type", default)]
    workload_type: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    state: Option<String>,
}

/// Normalize a workload from a listing.
///
/// Listings only ever report the closed type set: anything outside it is
/// coerced to `network`. Detail, history and health paths keep the node's
/// string as-is instead.
pub fn normalize_listed_workload(value: &Value) -> Option<Workload> {
    let wire = ListedWorkloadWire::deserialize(value).ok()?;
    let workload_type = wire
        .workload_type
        .as_deref()
        .and_then(|t| WorkloadType::from_str(t).ok())
        .unwrap_or(WorkloadType::Network);

    Some(Workload {
        workload_type,
        name: wire.name.unwrap_or_default(),
        state: wire
            .state
            .map_or_else(WorkloadState::unknown, WorkloadState::from),
    })
}

/// Field deserializer for `type` on the detail, history and health paths.
///
/// The node's string is kept verbatim, unknown kinds included; `null` reads
/// as empty.
pub fn preserve_workload_type<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

fn normalize_listed_deployment(value: &Value) -> Option<Deployment> {
    if !value.is_object() {
        tracing::warn!("Skipping non-object entry in deployment listing: {value}");
        return None;
    }
    let wire = match ListedDeploymentWire::deserialize(value) {
        Ok(wire) => wire,
        Err(e) => {
            tracing::warn!("Skipping malformed entry in deployment listing: {e}");
            return None;
        }
    };

    Some(Deployment {
        twin_id: wire.twin_id.unwrap_or_default(),
        contract_id: wire.contract_id.unwrap_or_default(),
        workloads: wire
            .workloads
            .unwrap_or_default()
            .iter()
            .filter_map(normalize_listed_workload)
            .collect(),
    })
}

/// A node may host nothing, so an unrecognized listing is an empty one.
pub fn normalize_list(raw: &Value) -> DeploymentList {
    let Some(entries) = probe(LIST_STRATEGIES, raw, "deployments").and_then(Value::as_array)
    else {
        tracing::debug!("Deployment listing had no recognized envelope ({})", describe(raw));
        return DeploymentList::empty();
    };

    DeploymentList {
        deployments: entries
            .iter()
            .filter_map(normalize_listed_deployment)
            .collect(),
    }
}

// ── Detail ───────────────────────────────────────────────────────────────────

/// A detail object must carry at least one of these to count as a deployment.
const DETAIL_KEYS: &[&str] = &["contract_id", "twin_id", "workloads", "signature_requirement"];

pub fn normalize_detail(raw: &Value) -> Result<DeploymentDetail, RmbError> {
    let command = Command::DeploymentGet;
    let payload = detail_payload(command, raw, "deployment")?;
    let detail = payload
        .get("deployment")
        .filter(|v| v.is_object())
        .unwrap_or(payload);

    if !detail.is_object() {
        return Err(invalid(command, "deployment is not an object"));
    }
    if !DETAIL_KEYS.iter().any(|key| detail.get(*key).is_some()) {
        return Err(invalid(command, "no recognized envelope"));
    }
    decode(command, detail)
}

// ── History ──────────────────────────────────────────────────────────────────

pub fn normalize_history(raw: &Value, deployment_id: &str) -> Result<DeploymentHistory, RmbError> {
    let command = Command::DeploymentHistory;
    let payload = detail_payload(command, raw, "history")?;

    let entries = match payload {
        Value::Array(_) => Some(payload),
        _ => match payload.get("history") {
            Some(Value::Null) => None,
            Some(history @ Value::Array(_)) => Some(history),
            Some(_) => return Err(invalid(command, "history is not an array")),
            None => return Err(invalid(command, "reply carries no history")),
        },
    };
    let history: Vec<DeploymentHistoryEntry> = match entries {
        Some(entries) => decode(command, entries)?,
        None => Vec::new(),
    };

    Ok(DeploymentHistory {
        deployment: str_field(payload, &["deployment"])
            .unwrap_or(deployment_id)
            .to_string(),
        history,
    })
}

// ── Workload info ────────────────────────────────────────────────────────────

pub fn normalize_info(
    raw: &Value,
    deployment_id: &str,
    workload: &str,
) -> Result<WorkloadInfo, RmbError> {
    let command = Command::DeploymentInfo;
    let payload = detail_payload(command, raw, "info")?;

    let info = payload.get("info").unwrap_or(payload).clone();
    Ok(WorkloadInfo {
        deployment: str_field(payload, &["deployment"])
            .unwrap_or(deployment_id)
            .to_string(),
        workload: str_field(payload, &["workload"])
            .unwrap_or(workload)
            .to_string(),
        info,
        logs: str_field(payload, &["logs"]).unwrap_or_default().to_string(),
    })
}

// ── Health ───────────────────────────────────────────────────────────────────

pub fn normalize_health(raw: &Value, deployment_id: &str) -> Result<DeploymentHealth, RmbError> {
    let command = Command::DeploymentHealth;
    let payload = detail_payload(command, raw, "workloads")?;

    let entries = match payload {
        Value::Array(_) => Some(payload),
        _ => match payload.get("workloads") {
            Some(Value::Null) => None,
            Some(workloads @ Value::Array(_)) => Some(workloads),
            Some(_) => return Err(invalid(command, "workloads is not an array")),
            None => return Err(invalid(command, "reply carries no workload health")),
        },
    };
    let workloads: Vec<WorkloadHealth> = match entries {
        Some(entries) => decode(command, entries)?,
        None => Vec::new(),
    };

    Ok(DeploymentHealth {
        deployment: str_field(payload, &["deployment", "deployment_id"])
            .unwrap_or(deployment_id)
            .to_string(),
        workloads,
    })
}
