use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use zeroize::Zeroizing;

/// Boxed future returned by bus operations.
pub type BusFuture<'a, T> = Pin<Box<dyn Future<Output = anyhow::Result<T>> + Send + 'a>>;

/// Signature scheme used to derive the session keypair from the phrase.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, strum::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum KeyType {
    #[default]
    Sr25519,
    Ed25519,
}

/// Everything a bus implementation needs to build an authenticated handle.
#[derive(Clone)]
pub struct ClientParams {
    pub chain_url: String,
    pub relay_url: String,
    pub mnemonic: Zeroizing<String>,
    pub session: String,
    pub key_type: KeyType,
    pub retries: u32,
}

impl std::fmt::Debug for ClientParams {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientParams")
            .field("chain_url", &self.chain_url)
            .field("relay_url", &self.relay_url)
            .field("mnemonic", &"[REDACTED]")
            .field("session", &self.session)
            .field("key_type", &self.key_type)
            .field("retries", &self.retries)
            .finish()
    }
}

/// The message-bus primitive: a two-phase, store-and-forward RPC.
///
/// `send` hands the message to the relay and returns the bus-assigned request
/// id; `read` waits for the reply addressed to that id. The envelope format,
/// signing and relay discovery are the implementation's concern.
pub trait RmbClient: Send + Sync {
    fn connect(&self) -> BusFuture<'_, ()>;

    fn disconnect(&self) -> BusFuture<'_, ()>;

    fn send<'a>(
        &'a self,
        command: &'a str,
        payload: &'a str,
        destination: u32,
        expiration_hours: f64,
        retries: u32,
    ) -> BusFuture<'a, String>;

    fn read<'a>(&'a self, request_id: &'a str) -> BusFuture<'a, Value>;
}

/// Builds bus handles; one call per session.
pub trait RmbConnector: Send + Sync {
    /// Short identifier for logs (e.g. "demo", "relay").
    fn name(&self) -> &str;

    fn build(&self, params: &ClientParams) -> anyhow::Result<Arc<dyn RmbClient>>;
}
