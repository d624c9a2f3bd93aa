use super::client::RmbClient;
use crate::config::RmbConfig;
use crate::error::RmbError;
use serde_json::Value;
use std::sync::Arc;

/// Expiration and retry settings handed to the bus with every request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestOptions {
    pub expiration_minutes: u32,
    pub retries: u32,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            expiration_minutes: 60,
            retries: 1,
        }
    }
}

impl RequestOptions {
    pub fn from_config(config: &RmbConfig) -> Self {
        Self {
            expiration_minutes: config.expiration_minutes,
            retries: config.retries,
        }
    }

    /// The bus expresses expiration in hours.
    pub fn expiration_hours(&self) -> f64 {
        f64::from(self.expiration_minutes) / 60.0
    }
}

/// Runs the bus's submit-then-fetch exchange as one call.
pub struct RmbWrapper {
    client: Arc<dyn RmbClient>,
}

impl RmbWrapper {
    pub fn new(client: Arc<dyn RmbClient>) -> Self {
        Self { client }
    }

    /// Send `command` to `destination` and wait for its reply.
    ///
    /// A failure in either phase surfaces as a single
    /// [`RmbError::RequestFailed`]. Retries are the bus's job; `options.retries`
    /// is only passed through.
    pub async fn request(
        &self,
        command: &str,
        payload: &str,
        destination: u32,
        options: RequestOptions,
    ) -> Result<Value, RmbError> {
        let exchange = async {
            let request_id = self
                .client
                .send(
                    command,
                    payload,
                    destination,
                    options.expiration_hours(),
                    options.retries,
                )
                .await?;
            tracing::debug!(command, destination, request_id = request_id.as_str(), "RMB request sent");
            self.client.read(&request_id).await
        };

        exchange.await.map_err(|e| {
            tracing::error!(
                command,
                destination,
                payload,
                "Failed to send RMB request: {e:#}"
            );
            RmbError::RequestFailed {
                command: command.to_string(),
                destination,
                cause: format!("{e:#}"),
            }
        })
    }
}
