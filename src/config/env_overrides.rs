use super::{Config, NetworkEnv};
use std::str::FromStr;

/// A value from the config file that an environment variable replaced.
#[derive(Debug, Clone)]
struct Overridden<T> {
    file: T,
    env: T,
}

impl<T: Clone + PartialEq> Overridden<T> {
    fn record(slot: &mut T, env: T) -> Self {
        let file = std::mem::replace(slot, env.clone());
        Self { file, env }
    }

    /// Put the file value back unless the caller changed the field since.
    fn restore(&self, slot: &mut T) {
        if *slot == self.env {
            *slot = self.file.clone();
        }
    }
}

/// File values shadowed by `ZOS_LENS_*` overrides; `save` writes these
/// instead of the environment's.
#[derive(Debug, Clone, Default)]
pub struct EnvShadow {
    mnemonic: Option<Overridden<Option<String>>>,
    network: Option<Overridden<NetworkEnv>>,
    selected_node_id: Option<Overridden<Option<u32>>>,
    selected_twin_id: Option<Overridden<Option<u32>>>,
}

impl EnvShadow {
    pub fn is_empty(&self) -> bool {
        self.mnemonic.is_none()
            && self.network.is_none()
            && self.selected_node_id.is_none()
            && self.selected_twin_id.is_none()
    }

    pub(super) fn restore_file_values(&self, config: &mut Config) {
        if let Some(o) = &self.mnemonic {
            o.restore(&mut config.mnemonic);
        }
        if let Some(o) = &self.network {
            o.restore(&mut config.network);
        }
        if let Some(o) = &self.selected_node_id {
            o.restore(&mut config.selected_node_id);
        }
        if let Some(o) = &self.selected_twin_id {
            o.restore(&mut config.selected_twin_id);
        }
    }
}

impl Config {
    pub fn apply_env_overrides(&mut self) {
        if let Ok(mnemonic) = std::env::var("ZOS_LENS_MNEMONIC")
            && !mnemonic.trim().is_empty()
        {
            let env = Some(mnemonic.trim().to_string());
            self.env_shadow.mnemonic = Some(Overridden::record(&mut self.mnemonic, env));
        }

        if let Ok(network) = std::env::var("ZOS_LENS_NETWORK") {
            match NetworkEnv::from_str(network.trim()) {
                Ok(env) => {
                    self.env_shadow.network = Some(Overridden::record(&mut self.network, env));
                }
                Err(_) => tracing::warn!(network = network.as_str(), "Ignoring unknown ZOS_LENS_NETWORK"),
            }
        }

        if let Ok(node_str) = std::env::var("ZOS_LENS_NODE_ID")
            && let Ok(node_id) = node_str.trim().parse::<u32>()
        {
            self.env_shadow.selected_node_id =
                Some(Overridden::record(&mut self.selected_node_id, Some(node_id)));
        }

        if let Ok(twin_str) = std::env::var("ZOS_LENS_TWIN_ID")
            && let Ok(twin_id) = twin_str.trim().parse::<u32>()
        {
            self.env_shadow.selected_twin_id =
                Some(Overridden::record(&mut self.selected_twin_id, Some(twin_id)));
        }
    }
}
