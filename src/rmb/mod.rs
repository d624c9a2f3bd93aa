// ── Bus seam ─────────────────────────────────────────────────────────────────
pub mod client;
pub mod demo;

// ── Request / response pipeline ─────────────────────────────────────────────
pub mod command;
pub mod normalize;
pub mod request;
pub mod session;
pub mod types;

// ── Re-exports ──────────────────────────────────────────────────────────────
pub use client::{BusFuture, ClientParams, KeyType, RmbClient, RmbConnector};
pub use command::{Command, Operation};
pub use demo::{DemoConnector, DemoRmbClient};
pub use request::{RequestOptions, RmbWrapper};
pub use session::{ConnectionState, SessionManager, SessionSettings};
pub use types::{
    Deployment, DeploymentDetail, DeploymentHealth, DeploymentHistory, DeploymentHistoryEntry,
    DeploymentList, HealthCheck, SignatureRequest, SignatureRequirement, Signature, Workload,
    WorkloadDetail, WorkloadHealth, WorkloadInfo, WorkloadResult, WorkloadState, WorkloadType,
};
