//! Load workloads and nodes from a JSON snapshot file.
//!
//! ```json
//! {
//!   "workloads": [
//!     {
//!       "name": "ingress-0",
//!       "namespace": "kube-system",
//!       "host_network": true,
//!       "annotations": {
//!         "external-dns.alpha.kubernetes.io/hostname": "ingress.example.com"
//!       },
//!       "pod_ip": "10.0.0.5",
//!       "node_name": "node-a"
//!     }
//!   ],
//!   "nodes": [
//!     {
//!       "name": "node-a",
//!       "addresses": [{ "type": "ExternalIP", "address": "203.0.113.10" }]
//!     }
//!   ]
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

use crate::cache::ObjectCache;
use crate::error::SourceError;
use crate::model::{Node, Workload};

/// A full set of workloads and nodes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Snapshot {
    /// Workloads, in any namespace.
    #[serde(default)]
    pub workloads: Vec<Workload>,

    /// Nodes.
    #[serde(default)]
    pub nodes: Vec<Node>,
}

impl Snapshot {
    /// Read and decode a snapshot file.
    pub fn from_path(path: &Path) -> Result<Self, SourceError> {
        let raw = std::fs::read_to_string(path)?;
        let snapshot: Snapshot = serde_json::from_str(&raw)?;
        debug!(
            path = %path.display(),
            workloads = snapshot.workloads.len(),
            nodes = snapshot.nodes.len(),
            "loaded snapshot"
        );
        Ok(snapshot)
    }

    /// Replace the contents of `cache` with this snapshot and mark it synced.
    ///
    /// The swap is atomic: concurrent readers never observe an empty or
    /// unsynced cache while a reload is in progress.
    pub fn apply(self, cache: &ObjectCache) {
        cache.replace_all(self.workloads, self.nodes);
    }
}
