use super::types::{Farm, FarmFilter, Node, NodeFilter, NodePage};
use crate::config::DirectoryConfig;
use crate::error::DirectoryError;
use reqwest::Client;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::time::Duration;

const FARM_NODES_PAGE_SIZE: u32 = 100;

/// Gridproxy answers list endpoints either with a bare array (total in the
/// `count` header) or with a `{data, count}` object.
#[derive(Deserialize)]
#[serde(untagged)]
enum Paged<T> {
    Items(Vec<T>),
    Page {
        #[serde(default)]
        data: Option<Vec<T>>,
        #[serde(default)]
        count: Option<u64>,
    },
}

impl<T> Paged<T> {
    fn into_parts(self) -> (Vec<T>, Option<u64>) {
        match self {
            Self::Items(items) => (items, None),
            Self::Page { data, count } => (data.unwrap_or_default(), count),
        }
    }
}

/// HTTP client for one network's gridproxy.
pub struct GridProxyClient {
    base_url: String,
    page_size: u32,
    client: Client,
}

impl GridProxyClient {
    pub fn new(base_url: &str, config: &DirectoryConfig) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            page_size: config.page_size,
            client: Client::builder()
                .timeout(Duration::from_secs(config.timeout_secs))
                .connect_timeout(Duration::from_secs(10))
                .pool_idle_timeout(Duration::from_secs(90))
                .build()
                .unwrap_or_else(|_| Client::new()),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn fetch<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<(T, Option<u64>), DirectoryError> {
        let url = format!("{}{path}", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(query)
            .send()
            .await
            .map_err(|e| DirectoryError::Request {
                url: url.clone(),
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DirectoryError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let header_count = response
            .headers()
            .get("count")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u64>().ok());
        let body = response
            .json::<T>()
            .await
            .map_err(|e| DirectoryError::Decode(e.to_string()))?;
        Ok((body, header_count))
    }

    /// Nodes that are currently up, filtered and paginated.
    pub async fn list_nodes(&self, filter: &NodeFilter) -> Result<NodePage, DirectoryError> {
        let mut query = vec![
            ("status", "up".to_string()),
            ("page", filter.page.unwrap_or(1).to_string()),
            ("size", filter.size.unwrap_or(self.page_size).to_string()),
            ("ret_count", "true".to_string()),
        ];
        if let Some(node_id) = filter.node_id {
            query.push(("node_id", node_id.to_string()));
        }
        if let Some(farm_id) = filter.farm_id {
            query.push(("farm_ids", farm_id.to_string()));
        }
        if let Some(country) = &filter.country {
            query.push(("country", country.clone()));
        }
        if let Some(city) = &filter.city {
            query.push(("city", city.clone()));
        }

        let (body, header_count) = self.fetch::<Paged<Node>>("/nodes", &query).await?;
        let (data, body_count) = body.into_parts();
        let count = header_count
            .or(body_count)
            .unwrap_or(data.len() as u64);
        Ok(NodePage { data, count })
    }

    /// `None` on any failure; the failure is logged.
    pub async fn node_by_id(&self, node_id: u32) -> Option<Node> {
        match self.fetch::<Node>(&format!("/nodes/{node_id}"), &[]).await {
            Ok((node, _)) => Some(node),
            Err(e) => {
                tracing::error!(node_id, "Failed to fetch node: {e}");
                None
            }
        }
    }

    pub async fn list_farms(&self, filter: &FarmFilter) -> Result<Vec<Farm>, DirectoryError> {
        let mut query = vec![
            ("page", filter.page.unwrap_or(1).to_string()),
            ("size", filter.size.unwrap_or(self.page_size).to_string()),
        ];
        if let Some(name) = &filter.name {
            query.push(("name", name.clone()));
        }
        if let Some(farm_id) = filter.farm_id {
            query.push(("farm_id", farm_id.to_string()));
        }

        let (body, _) = self.fetch::<Paged<Farm>>("/farms", &query).await?;
        Ok(body.into_parts().0)
    }

    /// `None` when the farm does not exist or the lookup fails.
    pub async fn farm_by_id(&self, farm_id: u32) -> Option<Farm> {
        let filter = FarmFilter {
            farm_id: Some(farm_id),
            page: Some(1),
            size: Some(1),
            ..FarmFilter::default()
        };
        match self.list_farms(&filter).await {
            Ok(farms) => farms.into_iter().next(),
            Err(e) => {
                tracing::error!(farm_id, "Failed to fetch farm: {e}");
                None
            }
        }
    }

    pub async fn nodes_by_farm(&self, farm_id: u32) -> Result<Vec<Node>, DirectoryError> {
        let query = [
            ("farm_ids", farm_id.to_string()),
            ("page", "1".to_string()),
            ("size", FARM_NODES_PAGE_SIZE.to_string()),
        ];
        let (body, _) = self.fetch::<Paged<Node>>("/nodes", &query).await?;
        Ok(body.into_parts().0)
    }
}
