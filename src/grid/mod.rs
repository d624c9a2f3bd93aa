//! Node and farm lookups through gridproxy.

pub mod proxy;
pub mod types;

pub use proxy::GridProxyClient;
pub use types::{Farm, FarmFilter, Node, NodeFilter, NodePage, PublicConfig, PublicIp};

use crate::config::{DirectoryConfig, NetworkEnv};

/// Hands out a [`GridProxyClient`] for the active network, rebuilding it
/// when the network's gridproxy URL changes.
pub struct GridDirectory {
    config: DirectoryConfig,
    client: Option<GridProxyClient>,
}

impl GridDirectory {
    pub fn new(config: DirectoryConfig) -> Self {
        Self {
            config,
            client: None,
        }
    }

    pub fn client(&mut self, network: NetworkEnv) -> &GridProxyClient {
        self.client_for_url(network.config().grid_proxy_url)
    }

    pub fn client_for_url(&mut self, url: &str) -> &GridProxyClient {
        let stale = self
            .client
            .as_ref()
            .is_none_or(|client| client.base_url() != url.trim_end_matches('/'));
        if stale {
            tracing::debug!(url, "Creating gridproxy client");
            self.client = Some(GridProxyClient::new(url, &self.config));
        }
        self.client.get_or_insert_with(|| GridProxyClient::new(url, &self.config))
    }

    pub fn reset(&mut self) {
        self.client = None;
    }
}
