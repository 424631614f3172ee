//! Workload, node and endpoint types.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A workload pinned to a node, as seen by the cache.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Workload {
    /// Workload name.
    pub name: String,
    /// Namespace the workload lives in.
    #[serde(default)]
    pub namespace: String,
    /// True when the workload shares the node's network namespace.
    #[serde(default)]
    pub host_network: bool,
    /// Arbitrary key/value metadata.
    #[serde(default)]
    pub annotations: BTreeMap<String, String>,
    /// The workload's own address, IPv4 or IPv6 in textual form.
    #[serde(default)]
    pub pod_ip: String,
    /// Name of the node the workload is scheduled on.
    #[serde(default)]
    pub node_name: String,
}

impl Workload {
    /// Look up an annotation value by key.
    pub fn annotation(&self, key: &str) -> Option<&str> {
        self.annotations.get(key).map(String::as_str)
    }
}

/// Kind of address a node reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeAddressType {
    /// Address reachable from outside the cluster.
    #[serde(rename = "ExternalIP")]
    ExternalIp,
    /// Address only routable inside the cluster network.
    #[serde(rename = "InternalIP")]
    InternalIp,
    /// Hostname of the node.
    Hostname,
    /// DNS name resolvable inside the cluster.
    #[serde(rename = "InternalDNS")]
    InternalDns,
    /// DNS name resolvable from outside the cluster.
    #[serde(rename = "ExternalDNS")]
    ExternalDns,
    /// Any address type not listed above.
    #[serde(other)]
    Other,
}

/// One entry of a node's address list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeAddress {
    /// Address kind.
    #[serde(rename = "type")]
    pub address_type: NodeAddressType,
    /// Address value.
    pub address: String,
}

impl NodeAddress {
    /// Build a node address.
    pub fn new(address_type: NodeAddressType, address: impl Into<String>) -> Self {
        Self {
            address_type,
            address: address.into(),
        }
    }
}

/// A cluster host.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    /// Node name, joined against [`Workload::node_name`].
    pub name: String,
    /// Addresses in the order the node reports them.
    #[serde(default)]
    pub addresses: Vec<NodeAddress>,
}

/// DNS record type of an endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RecordType {
    /// IPv4 address record.
    A,
    /// IPv6 address record.
    #[allow(clippy::upper_case_acronyms)]
    AAAA,
}

impl RecordType {
    /// Record type name as it appears on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordType::A => "A",
            RecordType::AAAA => "AAAA",
        }
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A desired DNS record handed to the reconciler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoint {
    /// Fully qualified domain name, as written in the annotation.
    pub dns_name: String,
    /// A or AAAA.
    pub record_type: RecordType,
    /// Target addresses in the order they were contributed.
    pub targets: Vec<String>,
}

impl Endpoint {
    /// Build an endpoint.
    pub fn new(dns_name: impl Into<String>, record_type: RecordType, targets: Vec<String>) -> Self {
        Self {
            dns_name: dns_name.into(),
            record_type,
            targets,
        }
    }
}

/// Address family test used throughout resolution: anything containing a
/// colon is IPv6.
pub fn is_ipv6(address: &str) -> bool {
    address.contains(':')
}
