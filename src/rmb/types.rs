//! Domain types returned by the deployment queries.
//!
//! Field names follow the node's snake_case wire schema so that a normalized
//! value serializes back into the shape operators already know from the node.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Go nodes emit `null` for empty slices and unset strings.
fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn nullable_state<'de, D>(deserializer: D) -> Result<WorkloadState, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?
        .map_or_else(WorkloadState::unknown, WorkloadState::from))
}

// ── Workload type ────────────────────────────────────────────────────────────

/// The closed set of workload kinds a listing is allowed to report.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum WorkloadType {
    Zdb,
    Network,
    Zmachine,
    Zmount,
    Ip,
}

// ── Workload state ───────────────────────────────────────────────────────────

/// Open string union: the well-known states plus whatever else a node reports.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum WorkloadState {
    Ok,
    Failed,
    Degraded,
    Other(String),
}

impl WorkloadState {
    /// Substituted when a record carries no state at all.
    pub fn unknown() -> Self {
        Self::Other("unknown".to_string())
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Ok => "ok",
            Self::Failed => "failed",
            Self::Degraded => "degraded",
            Self::Other(other) => other,
        }
    }
}

impl From<String> for WorkloadState {
    fn from(value: String) -> Self {
        match value.as_str() {
            "ok" => Self::Ok,
            "failed" => Self::Failed,
            "degraded" => Self::Degraded,
            _ => Self::Other(value),
        }
    }
}

impl From<&str> for WorkloadState {
    fn from(value: &str) -> Self {
        Self::from(value.to_string())
    }
}

impl From<WorkloadState> for String {
    fn from(value: WorkloadState) -> Self {
        match value {
            WorkloadState::Other(other) => other,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for WorkloadState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Listing ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Workload {
    #[serde(rename = "type")]
    pub workload_type: WorkloadType,
    pub name: String,
    pub state: WorkloadState,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deployment {
    pub twin_id: u32,
    pub contract_id: u64,
    pub workloads: Vec<Workload>,
}

impl Deployment {
    pub fn deployment_id(&self) -> String {
        super::Command::deployment_id(self.twin_id, self.contract_id)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentList {
    pub deployments: Vec<Deployment>,
}

impl DeploymentList {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.deployments.is_empty()
    }
}

// ── Detail ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignatureRequest {
    pub twin_id: u32,
    pub required: bool,
    pub weight: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Signature {
    pub twin_id: u32,
    #[serde(deserialize_with = "nullable")]
    pub signature: String,
    #[serde(deserialize_with = "nullable")]
    pub signature_type: String,
}

/// Carried through untouched; signatures are never checked here.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignatureRequirement {
    #[serde(deserialize_with = "nullable")]
    pub requests: Vec<SignatureRequest>,
    pub weight_required: u32,
    #[serde(deserialize_with = "nullable")]
    pub signatures: Vec<Signature>,
    #[serde(deserialize_with = "nullable")]
    pub signature_style: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkloadResult {
    /// Unix seconds.
    pub created: i64,
    #[serde(deserialize_with = "nullable_state")]
    pub state: WorkloadState,
    #[serde(deserialize_with = "nullable")]
    pub message: String,
    pub data: Value,
}

impl Default for WorkloadResult {
    fn default() -> Self {
        Self {
            created: 0,
            state: WorkloadState::unknown(),
            message: String::new(),
            data: Value::Null,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkloadDetail {
    pub version: u32,
    #[serde(deserialize_with = "nullable")]
    pub name: String,
    /// Kept verbatim; see [`WorkloadDetail::known_type`].
    #[serde(rename = "type", deserialize_with = "super::normalize::preserve_workload_type")]
    pub workload_type: String,
    pub data: Value,
    #[serde(deserialize_with = "nullable")]
    pub metadata: String,
    #[serde(deserialize_with = "nullable")]
    pub description: String,
    #[serde(deserialize_with = "nullable")]
    pub result: WorkloadResult,
}

impl WorkloadDetail {
    pub fn known_type(&self) -> Option<WorkloadType> {
        WorkloadType::from_str(&self.workload_type).ok()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeploymentDetail {
    pub version: u32,
    pub twin_id: u32,
    pub contract_id: u64,
    /// Opaque serialized blob owned by whoever deployed the contract.
    #[serde(deserialize_with = "nullable")]
    pub metadata: String,
    #[serde(deserialize_with = "nullable")]
    pub description: String,
    pub expiration: u64,
    #[serde(deserialize_with = "nullable")]
    pub signature_requirement: SignatureRequirement,
    #[serde(deserialize_with = "nullable")]
    pub workloads: Vec<WorkloadDetail>,
}

// ── History ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeploymentHistoryEntry {
    pub seq: u32,
    #[serde(rename = "type", deserialize_with = "super::normalize::preserve_workload_type")]
    pub entry_type: String,
    #[serde(deserialize_with = "nullable")]
    pub name: String,
    pub created: i64,
    #[serde(deserialize_with = "nullable_state")]
    pub state: WorkloadState,
    #[serde(deserialize_with = "nullable")]
    pub message: String,
}

impl Default for DeploymentHistoryEntry {
    fn default() -> Self {
        Self {
            seq: 0,
            entry_type: String::new(),
            name: String::new(),
            created: 0,
            state: WorkloadState::unknown(),
            message: String::new(),
        }
    }
}

/// Entries stay in the order the node sent them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeploymentHistory {
    pub deployment: String,
    pub history: Vec<DeploymentHistoryEntry>,
}

// ── Workload info ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkloadInfo {
    pub deployment: String,
    pub workload: String,
    /// Whatever the node's inspector returned for this workload.
    pub info: Value,
    pub logs: String,
}

// ── Health ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthCheck {
    #[serde(deserialize_with = "nullable")]
    pub name: String,
    pub ok: bool,
    #[serde(deserialize_with = "nullable")]
    pub message: String,
    pub evidence: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkloadHealth {
    #[serde(deserialize_with = "nullable")]
    pub workload_id: String,
    #[serde(rename = "type", deserialize_with = "super::normalize::preserve_workload_type")]
    pub workload_type: String,
    #[serde(deserialize_with = "nullable")]
    pub name: String,
    #[serde(deserialize_with = "nullable_state")]
    pub status: WorkloadState,
    #[serde(deserialize_with = "nullable")]
    pub checks: Vec<HealthCheck>,
}

impl Default for WorkloadHealth {
    fn default() -> Self {
        Self {
            workload_id: String::new(),
            workload_type: String::new(),
            name: String::new(),
            status: WorkloadState::unknown(),
            checks: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeploymentHealth {
    pub deployment: String,
    pub workloads: Vec<WorkloadHealth>,
}

impl DeploymentHealth {
    pub fn is_healthy(&self) -> bool {
        self.workloads
            .iter()
            .all(|w| w.checks.iter().all(|check| check.ok))
    }
}
