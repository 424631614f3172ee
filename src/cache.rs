//! Read interfaces over the workload and node caches, plus an in-memory
//! implementation of both.
//!
//! The source only ever reads point-in-time snapshots through
//! [`WorkloadCache`] and [`NodeCache`]; how the objects get there is up to the
//! implementation.

use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::debug;

use crate::error::{CacheError, SourceError};
use crate::metrics;
use crate::model::{Node, Workload};

/// Poll interval while waiting for caches to sync.
const SYNC_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Read access to cached workloads.
#[async_trait]
pub trait WorkloadCache: Send + Sync {
    /// List workloads in `namespace`, or in every namespace when `None`.
    async fn list(&self, namespace: Option<&str>) -> Result<Vec<Workload>, CacheError>;

    /// True once the initial population has completed.
    fn has_synced(&self) -> bool;
}

/// Read access to cached nodes.
pub trait NodeCache: Send + Sync {
    /// Get a node by name. A miss is not an error.
    fn get(&self, name: &str) -> Option<Node>;

    /// True once the initial population has completed.
    fn has_synced(&self) -> bool;
}

/// Block until both caches report synced, or fail after `timeout`.
pub async fn wait_for_cache_sync(
    workloads: &dyn WorkloadCache,
    nodes: &dyn NodeCache,
    timeout: Duration,
) -> Result<(), SourceError> {
    if workloads.has_synced() && nodes.has_synced() {
        return Ok(());
    }

    let poll = async {
        loop {
            sleep(SYNC_POLL_INTERVAL).await;
            if workloads.has_synced() && nodes.has_synced() {
                return;
            }
        }
    };

    tokio::time::timeout(timeout, poll)
        .await
        .map_err(|_| SourceError::CacheSyncTimeout(timeout))
}

/// Thread-safe in-memory object cache.
#[derive(Debug, Clone, Default)]
pub struct ObjectCache {
    inner: Arc<RwLock<ObjectCacheInner>>,
}

#[derive(Debug, Default)]
struct ObjectCacheInner {
    /// (namespace, name) -> Workload
    workloads: HashMap<(String, String), Workload>,

    /// name -> Node
    nodes: HashMap<String, Node>,

    /// True after the workload set has been fully populated
    workloads_synced: bool,

    /// True after the node set has been fully populated
    nodes_synced: bool,
}

impl ObjectCache {
    /// Create an empty, unsynced cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or update a workload.
    pub fn upsert_workload(&self, workload: Workload) {
        let mut inner = self.inner.write();
        debug!(
            namespace = %workload.namespace,
            workload = %workload.name,
            host_network = workload.host_network,
            "upserting workload"
        );
        inner
            .workloads
            .insert((workload.namespace.clone(), workload.name.clone()), workload);
    }

    /// Remove a workload by namespace and name.
    pub fn remove_workload(&self, namespace: &str, name: &str) {
        let mut inner = self.inner.write();
        if inner
            .workloads
            .remove(&(namespace.to_string(), name.to_string()))
            .is_some()
        {
            debug!(namespace, workload = name, "removed workload");
        }
    }

    /// Insert or update a node.
    pub fn upsert_node(&self, node: Node) {
        let mut inner = self.inner.write();
        debug!(node = %node.name, addresses = node.addresses.len(), "upserting node");
        inner.nodes.insert(node.name.clone(), node);
    }

    /// Remove a node by name.
    pub fn remove_node(&self, name: &str) {
        let mut inner = self.inner.write();
        if inner.nodes.remove(name).is_some() {
            debug!(node = name, "removed node");
        }
    }

    /// Mark the workload set as fully populated.
    pub fn mark_workloads_synced(&self) {
        let mut inner = self.inner.write();
        inner.workloads_synced = true;
        debug!(
            workloads_synced = inner.workloads_synced,
            nodes_synced = inner.nodes_synced,
            "workload cache synced"
        );
    }

    /// Mark the node set as fully populated.
    pub fn mark_nodes_synced(&self) {
        let mut inner = self.inner.write();
        inner.nodes_synced = true;
        debug!(
            workloads_synced = inner.workloads_synced,
            nodes_synced = inner.nodes_synced,
            "node cache synced"
        );
    }

    /// True when both object sets are populated.
    pub fn is_synced(&self) -> bool {
        let inner = self.inner.read();
        inner.workloads_synced && inner.nodes_synced
    }

    /// Drop every object and the sync flags (for a full resync).
    pub fn clear(&self) {
        let mut inner = self.inner.write();
        inner.workloads.clear();
        inner.nodes.clear();
        inner.workloads_synced = false;
        inner.nodes_synced = false;
        debug!("cleared object cache for resync");
    }

    /// Swap in a complete object set and mark both sides synced.
    ///
    /// Readers see either the previous contents or the new ones, never a
    /// partially applied set.
    pub fn replace_all(&self, workloads: Vec<Workload>, nodes: Vec<Node>) {
        let workloads: HashMap<(String, String), Workload> = workloads
            .into_iter()
            .map(|w| ((w.namespace.clone(), w.name.clone()), w))
            .collect();
        let nodes: HashMap<String, Node> = nodes.into_iter().map(|n| (n.name.clone(), n)).collect();

        let mut inner = self.inner.write();
        inner.workloads = workloads;
        inner.nodes = nodes;
        inner.workloads_synced = true;
        inner.nodes_synced = true;
        debug!(
            workloads = inner.workloads.len(),
            nodes = inner.nodes.len(),
            "replaced object cache contents"
        );
    }

    /// Number of cached workloads.
    pub fn workloads_count(&self) -> usize {
        self.inner.read().workloads.len()
    }

    /// Number of cached nodes.
    pub fn nodes_count(&self) -> usize {
        self.inner.read().nodes.len()
    }

    /// Emit current cache metrics.
    pub fn emit_metrics(&self) {
        let inner = self.inner.read();
        metrics::record_cache_counts(inner.workloads.len(), inner.nodes.len());
        metrics::record_synced_state(inner.workloads_synced, inner.nodes_synced);
    }
}

#[async_trait]
impl WorkloadCache for ObjectCache {
    async fn list(&self, namespace: Option<&str>) -> Result<Vec<Workload>, CacheError> {
        let inner = self.inner.read();
        let workloads = inner
            .workloads
            .values()
            .filter(|w| namespace.is_none_or(|ns| w.namespace == ns))
            .cloned()
            .collect();
        Ok(workloads)
    }

    fn has_synced(&self) -> bool {
        self.inner.read().workloads_synced
    }
}

impl NodeCache for ObjectCache {
    fn get(&self, name: &str) -> Option<Node> {
        self.inner.read().nodes.get(name).cloned()
    }

    fn has_synced(&self) -> bool {
        self.inner.read().nodes_synced
    }
}
