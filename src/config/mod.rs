mod crypto;
mod env_overrides;
mod loader;
pub mod network;
#[cfg(test)]
mod test_env;

pub use env_overrides::EnvShadow;
pub use network::{NetworkConfig, NetworkEnv};

use crate::rmb::client::KeyType;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

// ── Top-level config ──────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Path to config.toml - computed from home, not serialized
    #[serde(skip)]
    pub config_path: PathBuf,

    #[serde(default)]
    pub network: NetworkEnv,

    /// Secret phrase; stored encrypted when `secrets.encrypt` is on
    #[serde(default)]
    pub mnemonic: Option<String>,

    #[serde(default)]
    pub selected_node_id: Option<u32>,

    #[serde(default)]
    pub selected_twin_id: Option<u32>,

    #[serde(default)]
    pub rmb: RmbConfig,

    #[serde(default)]
    pub directory: DirectoryConfig,

    #[serde(default)]
    pub secrets: SecretsConfig,

    /// File values replaced by environment overrides at load time
    #[serde(skip)]
    pub env_shadow: EnvShadow,
}

// ── RMB ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RmbConfig {
    /// Session label presented to the relay
    #[serde(default = "default_session_label")]
    pub session: String,
    #[serde(default)]
    pub key_type: KeyType,
    /// Retry count handed to the bus client at construction
    #[serde(default = "default_client_retries")]
    pub client_retries: u32,
    /// Request expiration in minutes (default: 60)
    #[serde(default = "default_expiration_minutes")]
    pub expiration_minutes: u32,
    /// Per-request retries passed through to `send` (default: 1)
    #[serde(default = "default_request_retries")]
    pub retries: u32,
    /// Upper bound the CLI waits for a reply (default: 120)
    #[serde(default = "default_read_timeout_secs")]
    pub read_timeout_secs: u64,
    /// Serve canned replies instead of talking to a relay
    #[serde(default)]
    pub demo: bool,
}

fn default_session_label() -> String {
    "zos_lens_session".into()
}

fn default_client_retries() -> u32 {
    3
}

fn default_expiration_minutes() -> u32 {
    60
}

fn default_request_retries() -> u32 {
    1
}

fn default_read_timeout_secs() -> u64 {
    120
}

impl Default for RmbConfig {
    fn default() -> Self {
        Self {
            session: default_session_label(),
            key_type: KeyType::default(),
            client_retries: default_client_retries(),
            expiration_minutes: default_expiration_minutes(),
            retries: default_request_retries(),
            read_timeout_secs: default_read_timeout_secs(),
            demo: false,
        }
    }
}

// ── Grid directory ───────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectoryConfig {
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    #[serde(default = "default_directory_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_page_size() -> u32 {
    50
}

fn default_directory_timeout_secs() -> u64 {
    30
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            timeout_secs: default_directory_timeout_secs(),
        }
    }
}

// ── Secrets ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecretsConfig {
    /// Encrypt the secret phrase at rest (default: true)
    #[serde(default = "default_true")]
    pub encrypt: bool,
}

fn default_true() -> bool {
    true
}

impl Default for SecretsConfig {
    fn default() -> Self {
        Self { encrypt: true }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            config_path: PathBuf::new(),
            network: NetworkEnv::default(),
            mnemonic: None,
            selected_node_id: None,
            selected_twin_id: None,
            rmb: RmbConfig::default(),
            directory: DirectoryConfig::default(),
            secrets: SecretsConfig::default(),
            env_shadow: EnvShadow::default(),
        }
    }
}

impl Config {
    pub fn network_config(&self) -> &'static NetworkConfig {
        self.network.config()
    }

    pub fn validate(&self) -> Result<()> {
        if self.rmb.expiration_minutes == 0 {
            anyhow::bail!("rmb.expiration_minutes must be greater than zero");
        }
        if self.rmb.session.trim().is_empty() {
            anyhow::bail!("rmb.session must not be empty");
        }
        if self.selected_twin_id.is_some() && self.selected_node_id.is_none() {
            anyhow::bail!("selected_twin_id is set without selected_node_id");
        }
        Ok(())
    }
}
