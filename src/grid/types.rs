//! Gridproxy records. Field names follow gridproxy's camelCase JSON.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PublicConfig {
    pub ipv4: String,
    pub ipv6: String,
    pub gw4: String,
    pub gw6: String,
    pub domain: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Node {
    pub node_id: u32,
    pub farm_id: u32,
    /// The twin a node's debug API answers on.
    pub twin_id: u32,
    pub country: String,
    pub city: String,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_config: Option<PublicConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PublicIp {
    pub id: String,
    pub ip: String,
    pub farm_id: u32,
    pub contract_id: u64,
    pub gateway: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Farm {
    pub farm_id: u32,
    pub name: String,
    pub twin_id: u32,
    pub pricing_policy_id: u32,
    pub certification_type: String,
    pub stellar_address: String,
    pub public_ips: Vec<PublicIp>,
}

/// One page of nodes plus the total matching count.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodePage {
    pub data: Vec<Node>,
    pub count: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeFilter {
    pub node_id: Option<u32>,
    pub farm_id: Option<u32>,
    pub country: Option<String>,
    pub city: Option<String>,
    pub page: Option<u32>,
    pub size: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FarmFilter {
    pub name: Option<String>,
    pub farm_id: Option<u32>,
    pub page: Option<u32>,
    pub size: Option<u32>,
}
