//! Endpoint source for host-network workloads.
//!
//! Each pass walks every cached workload and turns its hostname annotations
//! into A/AAAA endpoints:
//!
//! - the internal hostname annotation maps a domain to the workload's own
//!   address;
//! - the hostname annotation maps a domain to the addresses of the node the
//!   workload runs on (external addresses of either family, internal
//!   addresses only when they are IPv6);
//! - under `kops-dns-controller` compatibility the legacy keys are read as
//!   well, into the same set of domains.
//!
//! Endpoint order is unspecified and may differ between calls. Targets keep
//! the order in which workloads and node addresses were visited.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::annotations::{AnnotationKeys, Compatibility};
use crate::cache::{wait_for_cache_sync, NodeCache, WorkloadCache};
use crate::config::SourceConfig;
use crate::error::SourceError;
use crate::metrics::{self, ResolveResult, Timer};
use crate::model::{is_ipv6, Endpoint, NodeAddress, NodeAddressType, RecordType, Workload};

/// Callback registered for change notifications.
pub type EventHandler = Box<dyn Fn() + Send + Sync>;

/// Something that produces the desired set of DNS endpoints on demand.
#[async_trait]
pub trait Source: Send + Sync {
    /// Compute the full endpoint set from current state.
    async fn endpoints(&self) -> Result<Vec<Endpoint>, SourceError>;

    /// Register a handler to be called when the endpoint set may have changed.
    fn add_event_handler(&self, handler: EventHandler);
}

/// Targets collected for one domain during a pass.
#[derive(Debug, Default)]
struct DomainTargets {
    ipv4: Vec<String>,
    ipv6: Vec<String>,
}

impl DomainTargets {
    fn push(&mut self, address: &str) {
        if is_ipv6(address) {
            self.ipv6.push(address.to_string());
        } else {
            self.ipv4.push(address.to_string());
        }
    }
}

/// Node addresses eligible for the hostname annotation: any external
/// address, and internal addresses only when they are IPv6.
fn is_published(address: &NodeAddress) -> bool {
    match address.address_type {
        NodeAddressType::ExternalIp => true,
        NodeAddressType::InternalIp => is_ipv6(&address.address),
        _ => false,
    }
}

/// Source deriving endpoints from workload annotations and node addresses.
pub struct HostNetworkSource {
    workloads: Arc<dyn WorkloadCache>,
    nodes: Arc<dyn NodeCache>,
    namespace: Option<String>,
    compatibility: Compatibility,
}

impl HostNetworkSource {
    /// Create a source over the given caches.
    ///
    /// Waits for both caches to finish their initial sync and fails with
    /// [`SourceError::CacheSyncTimeout`] if they do not within the
    /// configured timeout.
    pub async fn new(
        config: &SourceConfig,
        workloads: Arc<dyn WorkloadCache>,
        nodes: Arc<dyn NodeCache>,
    ) -> Result<Self, SourceError> {
        config.validate()?;

        info!(
            namespace = config.namespace_scope().unwrap_or("<all>"),
            compatibility = %config.compatibility,
            "Waiting for cache sync..."
        );
        wait_for_cache_sync(workloads.as_ref(), nodes.as_ref(), config.sync_timeout()).await?;
        info!("Cache sync complete");

        Ok(Self {
            workloads,
            nodes,
            namespace: config.namespace_scope().map(String::from),
            compatibility: config.compatibility,
        })
    }

    /// Compatibility mode this source was built with.
    pub fn compatibility(&self) -> Compatibility {
        self.compatibility
    }

    /// Add contributions of one annotation key pair on `workload`.
    fn collect(
        &self,
        workload: &Workload,
        keys: &AnnotationKeys,
        domains: &mut HashMap<String, DomainTargets>,
    ) {
        if let Some(domain) = workload.annotation(keys.internal_hostname) {
            domains
                .entry(domain.to_string())
                .or_default()
                .push(&workload.pod_ip);
        }

        if let Some(domain) = workload.annotation(keys.hostname) {
            let targets = domains.entry(domain.to_string()).or_default();

            match self.nodes.get(&workload.node_name) {
                Some(node) => {
                    for address in node.addresses.iter().filter(|a| is_published(a)) {
                        targets.push(&address.address);
                    }
                }
                None => {
                    debug!(
                        workload = %workload.name,
                        node = %workload.node_name,
                        domain,
                        "node not found, no addresses for hostname"
                    );
                    metrics::record_node_miss();
                }
            }
        }
    }
}

#[async_trait]
impl Source for HostNetworkSource {
    async fn endpoints(&self) -> Result<Vec<Endpoint>, SourceError> {
        let timer = Timer::start();

        let workloads = match self.workloads.list(self.namespace.as_deref()).await {
            Ok(workloads) => workloads,
            Err(e) => {
                warn!("Failed to list workloads: {}", e);
                metrics::record_resolve(ResolveResult::Error, timer.elapsed());
                return Err(e.into());
            }
        };

        let mut domains: HashMap<String, DomainTargets> = HashMap::new();
        let mut skipped = 0;

        for workload in &workloads {
            if !workload.host_network {
                debug!(workload = %workload.name, "skipping workload, host_network=false");
                skipped += 1;
                continue;
            }

            for keys in self.compatibility.key_sets() {
                self.collect(workload, keys, &mut domains);
            }
        }

        let mut endpoints = Vec::with_capacity(domains.len());
        for (domain, DomainTargets { ipv4, ipv6 }) in domains {
            if !ipv4.is_empty() {
                endpoints.push(Endpoint::new(domain.clone(), RecordType::A, ipv4));
            }
            if !ipv6.is_empty() {
                endpoints.push(Endpoint::new(domain, RecordType::AAAA, ipv6));
            }
        }

        let a_count = endpoints
            .iter()
            .filter(|e| e.record_type == RecordType::A)
            .count();
        metrics::record_endpoints(RecordType::A, a_count);
        metrics::record_endpoints(RecordType::AAAA, endpoints.len() - a_count);
        metrics::record_skipped_workloads(skipped);
        metrics::record_resolve(ResolveResult::Success, timer.elapsed());

        debug!(
            workloads = workloads.len(),
            skipped,
            endpoints = endpoints.len(),
            "resolved endpoints"
        );

        Ok(endpoints)
    }

    fn add_event_handler(&self, _handler: EventHandler) {
        // Consumers re-run endpoints() on their own schedule.
        debug!("ignoring event handler registration");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotations::{HOSTNAME_KEY, INTERNAL_HOSTNAME_KEY, LEGACY_HOSTNAME_KEY};
    use crate::cache::ObjectCache;
    use crate::error::CacheError;
    use crate::model::Node;

    fn make_workload(name: &str, ip: &str, node: &str, annotations: &[(&str, &str)]) -> Workload {
        Workload {
            name: name.to_string(),
            namespace: "kube-system".to_string(),
            host_network: true,
            annotations: annotations
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            pod_ip: ip.to_string(),
            node_name: node.to_string(),
        }
    }

    async fn make_source(cache: &ObjectCache, compatibility: &str) -> HostNetworkSource {
        cache.mark_workloads_synced();
        cache.mark_nodes_synced();
        let config = SourceConfig {
            compatibility: Compatibility::from(compatibility),
            ..Default::default()
        };
        HostNetworkSource::new(&config, Arc::new(cache.clone()), Arc::new(cache.clone()))
            .await
            .unwrap()
    }

    fn find<'a>(endpoints: &'a [Endpoint], name: &str, rtype: RecordType) -> Option<&'a Endpoint> {
        endpoints
            .iter()
            .find(|e| e.dns_name == name && e.record_type == rtype)
    }

    #[test]
    fn test_is_published() {
        let ext_v4 = NodeAddress::new(NodeAddressType::ExternalIp, "1.2.3.4");
        let int_v4 = NodeAddress::new(NodeAddressType::InternalIp, "10.0.0.1");
        let int_v6 = NodeAddress::new(NodeAddressType::InternalIp, "2001:db8::1");
        let host = NodeAddress::new(NodeAddressType::Hostname, "node-1");

        assert!(is_published(&ext_v4));
        assert!(!is_published(&int_v4));
        assert!(is_published(&int_v6));
        assert!(!is_published(&host));
    }

    #[test]
    fn test_domain_targets_partition() {
        let mut targets = DomainTargets::default();
        targets.push("10.0.0.1");
        targets.push("fd00::1");
        targets.push("10.0.0.1");

        assert_eq!(targets.ipv4, vec!["10.0.0.1", "10.0.0.1"]);
        assert_eq!(targets.ipv6, vec!["fd00::1"]);
    }

    #[tokio::test]
    async fn test_internal_hostname_uses_pod_ip() {
        let cache = ObjectCache::new();
        cache.upsert_workload(make_workload(
            "p1",
            "10.0.0.5",
            "n1",
            &[(INTERNAL_HOSTNAME_KEY, "svc.internal")],
        ));
        let source = make_source(&cache, "").await;

        let endpoints = source.endpoints().await.unwrap();
        assert_eq!(
            endpoints,
            vec![Endpoint::new(
                "svc.internal",
                RecordType::A,
                vec!["10.0.0.5".to_string()]
            )]
        );
    }

    #[tokio::test]
    async fn test_hostname_uses_node_addresses_in_order() {
        let cache = ObjectCache::new();
        cache.upsert_node(Node {
            name: "n1".to_string(),
            addresses: vec![
                NodeAddress::new(NodeAddressType::InternalIp, "10.0.0.1"),
                NodeAddress::new(NodeAddressType::ExternalIp, "203.0.113.2"),
                NodeAddress::new(NodeAddressType::ExternalIp, "203.0.113.1"),
                NodeAddress::new(NodeAddressType::InternalIp, "2001:db8::1"),
                NodeAddress::new(NodeAddressType::Hostname, "n1.example"),
            ],
        });
        cache.upsert_workload(make_workload(
            "p1",
            "10.0.0.5",
            "n1",
            &[(HOSTNAME_KEY, "api.example.com")],
        ));
        let source = make_source(&cache, "").await;

        let endpoints = source.endpoints().await.unwrap();
        assert_eq!(endpoints.len(), 2);
        assert_eq!(
            find(&endpoints, "api.example.com", RecordType::A).unwrap().targets,
            vec!["203.0.113.2", "203.0.113.1"]
        );
        assert_eq!(
            find(&endpoints, "api.example.com", RecordType::AAAA).unwrap().targets,
            vec!["2001:db8::1"]
        );
    }

    #[tokio::test]
    async fn test_missing_node_contributes_nothing() {
        let cache = ObjectCache::new();
        cache.upsert_workload(make_workload(
            "p1",
            "10.0.0.5",
            "gone",
            &[(HOSTNAME_KEY, "api.example.com")],
        ));
        let source = make_source(&cache, "").await;

        assert!(source.endpoints().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_legacy_keys_only_under_compatibility() {
        let cache = ObjectCache::new();
        cache.upsert_node(Node {
            name: "n1".to_string(),
            addresses: vec![NodeAddress::new(NodeAddressType::ExternalIp, "203.0.113.1")],
        });
        cache.upsert_workload(make_workload(
            "p1",
            "10.0.0.5",
            "n1",
            &[(LEGACY_HOSTNAME_KEY, "legacy.example.com")],
        ));

        let plain = make_source(&cache, "").await;
        assert!(plain.endpoints().await.unwrap().is_empty());

        let compat = make_source(&cache, "kops-dns-controller").await;
        assert_eq!(compat.compatibility(), Compatibility::KopsDnsController);
        assert_eq!(
            compat.endpoints().await.unwrap(),
            vec![Endpoint::new(
                "legacy.example.com",
                RecordType::A,
                vec!["203.0.113.1".to_string()]
            )]
        );
    }

    struct FailingCache(CacheError);

    #[async_trait]
    impl WorkloadCache for FailingCache {
        async fn list(&self, _namespace: Option<&str>) -> Result<Vec<Workload>, CacheError> {
            Err(self.0.clone())
        }

        fn has_synced(&self) -> bool {
            true
        }
    }

    #[tokio::test]
    async fn test_list_failure_propagates() {
        let nodes = ObjectCache::new();
        nodes.mark_nodes_synced();
        let source = HostNetworkSource::new(
            &SourceConfig::default(),
            Arc::new(FailingCache(CacheError::Cancelled)),
            Arc::new(nodes),
        )
        .await
        .unwrap();

        let err = source.endpoints().await.unwrap_err();
        assert!(matches!(err, SourceError::Cache(CacheError::Cancelled)));
    }

    #[tokio::test]
    async fn test_add_event_handler_is_noop() {
        let cache = ObjectCache::new();
        let source = make_source(&cache, "").await;
        source.add_event_handler(Box::new(|| panic!("handler must not be called")));
        assert!(source.endpoints().await.unwrap().is_empty());
    }
}
