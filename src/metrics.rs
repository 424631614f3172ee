//! Metrics instrumentation for hostnet-dns.
//!
//! All metrics are prefixed with `hostnet_dns.`

use metrics::{counter, gauge, histogram};
use std::time::Instant;

use crate::model::RecordType;

/// Record one resolution pass.
pub fn record_resolve(result: ResolveResult, duration: std::time::Duration) {
    let result_str = match result {
        ResolveResult::Success => "success",
        ResolveResult::Error => "error",
    };

    counter!("hostnet_dns.resolve.count", "result" => result_str).increment(1);
    histogram!("hostnet_dns.resolve.duration.seconds").record(duration.as_secs_f64());
}

/// Outcome of a resolution pass.
#[derive(Debug, Clone, Copy)]
pub enum ResolveResult {
    /// Endpoints were produced.
    Success,
    /// Workload listing failed.
    Error,
}

/// Record endpoints produced by a pass, per record type.
pub fn record_endpoints(record_type: RecordType, count: usize) {
    gauge!("hostnet_dns.resolve.endpoints", "type" => record_type.as_str()).set(count as f64);
}

/// Record workloads skipped because they do not use host networking.
pub fn record_skipped_workloads(count: usize) {
    counter!("hostnet_dns.resolve.workloads_skipped.count").increment(count as u64);
}

/// Record a node lookup that found nothing.
pub fn record_node_miss() {
    counter!("hostnet_dns.resolve.node_miss.count").increment(1);
}

/// Record cache object counts.
pub fn record_cache_counts(workloads: usize, nodes: usize) {
    gauge!("hostnet_dns.cache.workloads.count").set(workloads as f64);
    gauge!("hostnet_dns.cache.nodes.count").set(nodes as f64);
}

/// Record cache sync state.
pub fn record_synced_state(workloads_synced: bool, nodes_synced: bool) {
    gauge!("hostnet_dns.cache.workloads_synced").set(if workloads_synced { 1.0 } else { 0.0 });
    gauge!("hostnet_dns.cache.nodes_synced").set(if nodes_synced { 1.0 } else { 0.0 });
}

/// Helper for timing operations.
pub struct Timer {
    start: Instant,
}

impl Timer {
    /// Start a new timer.
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Get elapsed duration since timer start.
    pub fn elapsed(&self) -> std::time::Duration {
        self.start.elapsed()
    }
}
