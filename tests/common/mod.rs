//! Shared test infrastructure for source integration tests.

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::Arc;

use hostnet_dns::{
    Compatibility, Endpoint, HostNetworkSource, Node, NodeAddress, NodeAddressType, ObjectCache,
    RecordType, Source, SourceConfig, Workload,
};

// --- Constants ---

pub const NAMESPACE: &str = "kube-system";

// --- Cluster builder ---

pub struct ClusterBuilder {
    cache: ObjectCache,
    workload_counter: u32,
}

impl ClusterBuilder {
    pub fn new() -> Self {
        Self {
            cache: ObjectCache::new(),
            workload_counter: 0,
        }
    }

    /// Add a node with `(type, address)` pairs in order.
    pub fn add_node(&mut self, name: &str, addresses: &[(NodeAddressType, &str)]) {
        self.cache.upsert_node(Node {
            name: name.to_string(),
            addresses: addresses
                .iter()
                .map(|(t, a)| NodeAddress::new(*t, *a))
                .collect(),
        });
    }

    /// Add a host-network workload. Returns its name.
    pub fn add_host_workload(
        &mut self,
        pod_ip: &str,
        node_name: &str,
        annotations: &[(&str, &str)],
    ) -> String {
        self.add_workload(true, NAMESPACE, pod_ip, node_name, annotations)
    }

    /// Add a workload with full control over its fields. Returns its name.
    pub fn add_workload(
        &mut self,
        host_network: bool,
        namespace: &str,
        pod_ip: &str,
        node_name: &str,
        annotations: &[(&str, &str)],
    ) -> String {
        self.workload_counter += 1;
        let name = format!("p{}", self.workload_counter);
        let annotations: BTreeMap<String, String> = annotations
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        self.cache.upsert_workload(Workload {
            name: name.clone(),
            namespace: namespace.to_string(),
            host_network,
            annotations,
            pod_ip: pod_ip.to_string(),
            node_name: node_name.to_string(),
        });
        name
    }

    /// Mark the cache as synced and return it.
    pub fn build(self) -> ObjectCache {
        self.cache.mark_workloads_synced();
        self.cache.mark_nodes_synced();
        self.cache
    }

    /// Return the cache WITHOUT marking it synced.
    pub fn build_not_synced(self) -> ObjectCache {
        self.cache
    }
}

// --- Source construction ---

pub fn source_config(compatibility: Compatibility) -> SourceConfig {
    SourceConfig {
        compatibility,
        ..Default::default()
    }
}

pub async fn build_source(cache: &ObjectCache, config: &SourceConfig) -> HostNetworkSource {
    HostNetworkSource::new(config, Arc::new(cache.clone()), Arc::new(cache.clone()))
        .await
        .expect("failed to build source")
}

pub async fn resolve(cache: &ObjectCache, compatibility: Compatibility) -> Vec<Endpoint> {
    build_source(cache, &source_config(compatibility))
        .await
        .endpoints()
        .await
        .expect("resolution failed")
}

// --- Endpoint helpers ---

/// Targets of the endpoint with the given name and type, if any.
pub fn targets(endpoints: &[Endpoint], name: &str, record_type: RecordType) -> Option<Vec<String>> {
    endpoints
        .iter()
        .find(|e| e.dns_name == name && e.record_type == record_type)
        .map(|e| e.targets.clone())
}

/// Endpoints sorted by (name, type) for order-insensitive comparison.
pub fn sorted(mut endpoints: Vec<Endpoint>) -> Vec<Endpoint> {
    endpoints.sort_by(|a, b| {
        a.dns_name
            .cmp(&b.dns_name)
            .then(a.record_type.cmp(&b.record_type))
    });
    endpoints
}

/// Assert an endpoint exists with exactly these targets, in order.
pub fn assert_targets(
    endpoints: &[Endpoint],
    name: &str,
    record_type: RecordType,
    expected: &[&str],
) {
    let actual = targets(endpoints, name, record_type)
        .unwrap_or_else(|| panic!("no {} endpoint for {}: {:?}", record_type, name, endpoints));
    assert_eq!(
        actual, expected,
        "{} {} targets mismatch.\nactual:   {:?}\nexpected: {:?}",
        name, record_type, actual, expected
    );
}
