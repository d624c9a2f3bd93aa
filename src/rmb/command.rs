use serde_json::json;

/// Debug commands a node answers over the bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::IntoStaticStr)]
pub enum Command {
    #[strum(serialize = "zos.debug.deployment.list")]
    DeploymentList,
    #[strum(serialize = "zos.debug.deployment.get")]
    DeploymentGet,
    #[strum(serialize = "zos.debug.deployment.history")]
    DeploymentHistory,
    #[strum(serialize = "zos.debug.deployment.info")]
    DeploymentInfo,
    #[strum(serialize = "zos.debug.deployment.health")]
    DeploymentHealth,
}

impl Command {
    pub fn as_str(self) -> &'static str {
        self.into()
    }

    /// Deployment ids on the wire are `"<twin>:<contract>"`.
    pub fn deployment_id(twin_id: u32, contract_id: u64) -> String {
        format!("{twin_id}:{contract_id}")
    }

    pub fn list_payload() -> String {
        String::new()
    }

    /// Payload shared by `get`, `history` and `health`.
    pub fn deployment_payload(twin_id: u32, contract_id: u64) -> String {
        json!({ "deployment": Self::deployment_id(twin_id, contract_id) }).to_string()
    }

    pub fn info_payload(twin_id: u32, contract_id: u64, workload: &str) -> String {
        json!({
            "deployment": Self::deployment_id(twin_id, contract_id),
            "workload": workload,
            "verbose": true,
        })
        .to_string()
    }
}

/// Facade operations, named for logs and error messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum Operation {
    #[strum(serialize = "list deployments")]
    ListDeployments,
    #[strum(serialize = "deployment detail")]
    DeploymentDetail,
    #[strum(serialize = "deployment history")]
    DeploymentHistory,
    #[strum(serialize = "workload info")]
    WorkloadInfo,
    #[strum(serialize = "deployment health")]
    DeploymentHealth,
}

impl Operation {
    pub fn command(self) -> Command {
        match self {
            Self::ListDeployments => Command::DeploymentList,
            Self::DeploymentDetail => Command::DeploymentGet,
            Self::DeploymentHistory => Command::DeploymentHistory,
            Self::WorkloadInfo => Command::DeploymentInfo,
            Self::DeploymentHealth => Command::DeploymentHealth,
        }
    }

    /// List-class operations degrade to empty results; the rest propagate.
    pub fn is_list_class(self) -> bool {
        matches!(self, Self::ListDeployments)
    }
}
