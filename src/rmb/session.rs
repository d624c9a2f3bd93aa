use super::client::{ClientParams, KeyType, RmbClient, RmbConnector};
use crate::config::{NetworkEnv, RmbConfig};
use crate::error::{ConfigError, LensError, SessionError, classify_connect_error};
use std::sync::Arc;
use zeroize::Zeroizing;

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
}

/// Fixed construction parameters for every bus handle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSettings {
    pub session: String,
    pub key_type: KeyType,
    pub retries: u32,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self::from_config(&RmbConfig::default())
    }
}

impl SessionSettings {
    pub fn from_config(config: &RmbConfig) -> Self {
        Self {
            session: config.session.clone(),
            key_type: config.key_type,
            retries: config.client_retries,
        }
    }
}

/// Owns the one authenticated bus handle of a [`crate::Lens`].
///
/// The handle is only ever `Some` while the state is `Connected`; a failed
/// initialize leaves nothing behind.
pub struct SessionManager {
    connector: Arc<dyn RmbConnector>,
    network: NetworkEnv,
    settings: SessionSettings,
    mnemonic: Option<Zeroizing<String>>,
    state: ConnectionState,
    handle: Option<Arc<dyn RmbClient>>,
}

impl SessionManager {
    pub fn new(
        connector: Arc<dyn RmbConnector>,
        network: NetworkEnv,
        settings: SessionSettings,
    ) -> Self {
        Self {
            connector,
            network,
            settings,
            mnemonic: None,
            state: ConnectionState::Disconnected,
            handle: None,
        }
    }

    pub fn network(&self) -> NetworkEnv {
        self.network
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn is_connected(&self) -> bool {
        self.state == ConnectionState::Connected && self.handle.is_some()
    }

    /// Build and connect a fresh handle for `mnemonic` on the active network.
    pub async fn initialize(&mut self, mnemonic: &str) -> Result<(), LensError> {
        let mnemonic = mnemonic.trim();
        if mnemonic.is_empty() {
            return Err(ConfigError::MissingMnemonic.into());
        }

        if self.handle.is_some() {
            self.disconnect().await;
        }

        let endpoints = self.network.config();
        let params = ClientParams {
            chain_url: endpoints.substrate_url.to_string(),
            relay_url: endpoints.relay_url.to_string(),
            mnemonic: Zeroizing::new(mnemonic.to_string()),
            session: self.settings.session.clone(),
            key_type: self.settings.key_type,
            retries: self.settings.retries,
        };
        self.state = ConnectionState::Connecting;

        let connected = async {
            let client = self.connector.build(&params)?;
            client.connect().await?;
            anyhow::Ok(client)
        }
        .await;

        match connected {
            Ok(client) => {
                self.mnemonic = Some(params.mnemonic.clone());
                self.handle = Some(client);
                self.state = ConnectionState::Connected;
                tracing::info!(
                    network = %self.network,
                    connector = self.connector.name(),
                    "RMB client connected"
                );
                Ok(())
            }
            Err(e) => {
                self.mnemonic = None;
                self.handle = None;
                self.state = ConnectionState::Disconnected;
                let message = format!("{e:#}");
                tracing::error!(network = %self.network, "Failed to initialize RMB client: {message}");
                Err(classify_connect_error(&message, &self.network.to_string()).into())
            }
        }
    }

    /// Drop the handle. Never fails: errors from the bus are only logged.
    pub async fn disconnect(&mut self) {
        let Some(handle) = self.handle.take() else {
            self.state = ConnectionState::Disconnected;
            return;
        };
        self.state = ConnectionState::Disconnected;

        match handle.disconnect().await {
            Ok(()) => tracing::info!("RMB client disconnected"),
            Err(e) => tracing::warn!("Failed to disconnect RMB client: {e:#}"),
        }
    }

    /// Disconnect and forget the identity.
    pub async fn reset(&mut self) {
        self.disconnect().await;
        self.mnemonic = None;
    }

    /// Point the session at another network; the current handle is torn down.
    pub async fn set_network(&mut self, network: NetworkEnv) {
        if network == self.network {
            return;
        }
        self.reset().await;
        self.network = network;
    }

    pub fn handle(&self) -> Result<Arc<dyn RmbClient>, SessionError> {
        match (&self.handle, self.state) {
            (Some(handle), ConnectionState::Connected) => Ok(Arc::clone(handle)),
            _ => Err(SessionError::NotConnected),
        }
    }

    pub fn has_identity(&self) -> bool {
        self.mnemonic.is_some()
    }
}
