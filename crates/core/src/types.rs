//! Domain types for the cloud load-balancer API.
//!
//! Field names follow the service's camelCase JSON. Optional fields that the
//! service may omit decode as `None` and are skipped again on output.

use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Access lists
// ---------------------------------------------------------------------------

/// Whether an access-list rule admits or rejects its address.
///
/// Closed set: any other value on the wire fails to decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccessType {
    Allow,
    Deny,
}

impl AccessType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Allow => "ALLOW",
            Self::Deny => "DENY",
        }
    }
}

impl fmt::Display for AccessType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One allow/deny rule attached to a load balancer.
///
/// `id` is assigned by the service and only unique within the owning
/// load balancer's access list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessListEntry {
    pub address: String,
    #[serde(rename = "type")]
    pub access_type: AccessType,
    pub id: u64,
}

/// A rule to append to an access list. Never carries an id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessListCreateOpts {
    pub address: String,
    #[serde(rename = "type")]
    pub access_type: AccessType,
}

impl AccessListCreateOpts {
    pub fn allow(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            access_type: AccessType::Allow,
        }
    }

    pub fn deny(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            access_type: AccessType::Deny,
        }
    }
}

// ---------------------------------------------------------------------------
// Nodes
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NodeCondition {
    Enabled,
    Disabled,
    Draining,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NodeType {
    Primary,
    Secondary,
}

/// A back-end server behind a load balancer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    pub id: u64,
    pub address: String,
    pub port: u16,
    pub condition: NodeCondition,
    /// `ONLINE` / `OFFLINE`, reported by health monitoring.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub node_type: Option<NodeType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeCreateOpts {
    pub address: String,
    pub port: u16,
    pub condition: NodeCondition,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub node_type: Option<NodeType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<u32>,
}

// ---------------------------------------------------------------------------
// Virtual IPs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VirtualIpType {
    Public,
    Servicenet,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IpVersion {
    Ipv4,
    Ipv6,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VirtualIp {
    pub id: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(rename = "type")]
    pub vip_type: VirtualIpType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip_version: Option<IpVersion>,
}

/// Either a new VIP (`vip_type` + `ip_version`) or a reference to an
/// existing shared VIP (`id`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VirtualIpCreateOpts {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub vip_type: Option<VirtualIpType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip_version: Option<IpVersion>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
}

// ---------------------------------------------------------------------------
// Load balancers
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timestamp {
    pub time: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceAddresses {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ipv4_public: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ipv4_servicenet: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ipv6_public: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cluster {
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionLogging {
    pub enabled: bool,
}

/// A load balancer as reported by the service.
///
/// List responses carry a summary view, so everything beyond identity and
/// listener settings is optional.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadBalancer {
    pub id: u64,
    pub name: String,
    pub protocol: String,
    pub port: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub algorithm: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub half_closed: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub nodes: Vec<Node>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub virtual_ips: Vec<VirtualIp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_addresses: Option<SourceAddresses>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cluster: Option<Cluster>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<Timestamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated: Option<Timestamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connection_logging: Option<ConnectionLogging>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadBalancerCreateOpts {
    pub name: String,
    pub protocol: String,
    pub port: u16,
    pub virtual_ips: Vec<VirtualIpCreateOpts>,
    pub nodes: Vec<NodeCreateOpts>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub algorithm: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub half_closed: Option<bool>,
}

/// Filters for listing load balancers. Unset fields are not sent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListOpts {
    pub status: Option<String>,
    pub node_address: Option<String>,
    pub changes_since: Option<String>,
    pub limit: Option<u32>,
    pub marker: Option<u64>,
}

impl ListOpts {
    /// Query pairs in the service's parameter names.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(status) = &self.status {
            pairs.push(("status", status.clone()));
        }
        if let Some(address) = &self.node_address {
            pairs.push(("nodeaddress", address.clone()));
        }
        if let Some(since) = &self.changes_since {
            pairs.push(("changes-since", since.clone()));
        }
        if let Some(limit) = self.limit {
            pairs.push(("limit", limit.to_string()));
        }
        if let Some(marker) = self.marker {
            pairs.push(("marker", marker.to_string()));
        }
        pairs
    }
}
