//! hostnet-dns - DNS endpoints for host-network workloads, derived from
//! workload annotations and node addresses.
//!
//! A reconciler periodically pulls the desired DNS record set from a
//! [`Source`] and pushes it to a DNS provider. This crate provides the source
//! for workloads that share their node's network namespace: there is no DNS
//! database, every record is recomputed from the cached workload and node
//! objects on each call.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────┐
//! │  Workload cache  │──┐
//! └──────────────────┘  │   ┌────────────────────┐     ┌───────────────┐
//!                       ├──▶│ HostNetworkSource  │────▶│ Vec<Endpoint> │
//! ┌──────────────────┐  │   │   .endpoints()     │     └───────────────┘
//! │    Node cache    │──┘   └────────────────────┘
//! └──────────────────┘
//! ```
//!
//! ## Annotations
//!
//! ```text
//! external-dns.alpha.kubernetes.io/internal-hostname: db.internal
//!   → A/AAAA db.internal -> workload address
//! external-dns.alpha.kubernetes.io/hostname: api.example.com
//!   → A/AAAA api.example.com -> node ExternalIP addresses (+ InternalIP if IPv6)
//! ```
//!
//! With `compatibility = "kops-dns-controller"`, `dns.alpha.kubernetes.io/internal`
//! and `dns.alpha.kubernetes.io/external` are honoured the same way.
//!
//! ## Example Usage
//!
//! ```rust,ignore
//! use hostnet_dns::{HostNetworkSource, ObjectCache, Source, SourceConfig};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() {
//!     let cache = ObjectCache::new();
//!     // ... populate the cache, then:
//!     cache.mark_workloads_synced();
//!     cache.mark_nodes_synced();
//!
//!     let source = HostNetworkSource::new(
//!         &SourceConfig::default(),
//!         Arc::new(cache.clone()),
//!         Arc::new(cache),
//!     )
//!     .await
//!     .unwrap();
//!
//!     for endpoint in source.endpoints().await.unwrap() {
//!         println!("{} {} {:?}", endpoint.dns_name, endpoint.record_type, endpoint.targets);
//!     }
//! }
//! ```

#![warn(missing_docs)]

pub mod annotations;
pub mod cache;
pub mod config;
pub mod error;
pub mod metrics;
pub mod model;
pub mod snapshot;
pub mod source;
pub mod telemetry;

// Re-export main types
pub use annotations::Compatibility;
pub use cache::{NodeCache, ObjectCache, WorkloadCache};
pub use config::{Config, SourceConfig, TelemetryConfig};
pub use error::{CacheError, SourceError};
pub use model::{Endpoint, Node, NodeAddress, NodeAddressType, RecordType, Workload};
pub use snapshot::Snapshot;
pub use source::{HostNetworkSource, Source};
