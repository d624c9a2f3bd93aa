use serde::{Deserialize, Serialize};

/// Grid environments the client can target.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum NetworkEnv {
    Dev,
    Test,
    Qa,
    #[default]
    Main,
}

/// Endpoints of one grid environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NetworkConfig {
    pub name: &'static str,
    pub grid_proxy_url: &'static str,
    pub graphql_url: &'static str,
    pub substrate_url: &'static str,
    pub relay_url: &'static str,
    pub activation_service_url: &'static str,
}

const DEVNET: NetworkConfig = NetworkConfig {
    name: "Devnet",
    grid_proxy_url: "https://gridproxy.dev.grid.tf",
    graphql_url: "https://graphql.dev.grid.tf/graphql",
    substrate_url: "wss://tfchain.dev.grid.tf",
    relay_url: "wss://relay.dev.grid.tf",
    activation_service_url: "https://activation.dev.grid.tf/activation/activate",
};

const TESTNET: NetworkConfig = NetworkConfig {
    name: "Testnet",
    grid_proxy_url: "https://gridproxy.test.grid.tf",
    graphql_url: "https://graphql.test.grid.tf/graphql",
    substrate_url: "wss://tfchain.test.grid.tf",
    relay_url: "wss://relay.test.grid.tf",
    activation_service_url: "https://activation.test.grid.tf/activation/activate",
};

const QANET: NetworkConfig = NetworkConfig {
    name: "QAnet",
    grid_proxy_url: "https://gridproxy.qa.grid.tf",
    graphql_url: "https://graphql.qa.grid.tf/graphql",
    substrate_url: "wss://tfchain.qa.grid.tf",
    relay_url: "wss://relay.qa.grid.tf",
    activation_service_url: "https://activation.qa.grid.tf/activation/activate",
};

const MAINNET: NetworkConfig = NetworkConfig {
    name: "Mainnet",
    grid_proxy_url: "https://gridproxy.grid.tf",
    graphql_url: "https://graphql.grid.tf/graphql",
    substrate_url: "wss://tfchain.grid.tf",
    relay_url: "wss://relay.grid.tf",
    activation_service_url: "https://activation.grid.tf/activation/activate",
};

impl NetworkEnv {
    pub const ALL: [NetworkEnv; 4] = [Self::Dev, Self::Test, Self::Qa, Self::Main];

    pub fn config(self) -> &'static NetworkConfig {
        match self {
            Self::Dev => &DEVNET,
            Self::Test => &TESTNET,
            Self::Qa => &QANET,
            Self::Main => &MAINNET,
        }
    }

    /// `(env, human label)` pairs for selection menus.
    pub fn all() -> Vec<(NetworkEnv, &'static str)> {
        Self::ALL
            .iter()
            .map(|env| (*env, env.config().name))
            .collect()
    }
}
