//! hostnet-dns binary entry point.

use clap::Parser;
use hostnet_dns::{telemetry, Config, HostNetworkSource, ObjectCache, Snapshot, Source};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

/// Resolve DNS endpoints for host-network workloads from a cluster snapshot.
#[derive(Parser, Debug)]
#[command(name = "hostnet-dns")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to configuration file (TOML). Missing file means defaults.
    #[arg(short, long, default_value = "hostnet-dns.toml")]
    config: PathBuf,

    /// Path to the workload/node snapshot (JSON).
    #[arg(short, long)]
    snapshot: PathBuf,

    /// Reload the snapshot and resolve again every N seconds until Ctrl-C.
    #[arg(short, long, value_parser = clap::value_parser!(u64).range(1..))]
    interval: Option<u64>,
}

/// Print endpoints as JSON lines on stdout.
async fn resolve_and_print(source: &HostNetworkSource) -> Result<(), Box<dyn std::error::Error>> {
    let endpoints = source.endpoints().await?;
    info!(endpoints = endpoints.len(), "resolved endpoints");
    for endpoint in &endpoints {
        println!("{}", serde_json::to_string(endpoint)?);
    }
    Ok(())
}

fn reload(path: &Path, cache: &ObjectCache) -> Result<(), Box<dyn std::error::Error>> {
    Snapshot::from_path(path)?.apply(cache);
    cache.emit_metrics();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Load configuration
    let config: Config = config::Config::builder()
        .add_source(config::File::from(args.config.clone()).required(false))
        .add_source(
            config::Environment::with_prefix("HOSTNET_DNS")
                .separator("__")
                .try_parsing(true),
        )
        .build()?
        .try_deserialize()?;

    // Initialize telemetry
    telemetry::init(&config.telemetry).map_err(|e| e as Box<dyn std::error::Error>)?;

    info!(
        config_file = %args.config.display(),
        snapshot = %args.snapshot.display(),
        namespace = %config.source.namespace,
        compatibility = %config.source.compatibility,
        "Starting hostnet-dns"
    );

    let cache = ObjectCache::new();
    reload(&args.snapshot, &cache)?;

    let source =
        HostNetworkSource::new(&config.source, Arc::new(cache.clone()), Arc::new(cache.clone()))
            .await?;

    resolve_and_print(&source).await?;

    let Some(secs) = args.interval else {
        return Ok(());
    };

    let mut interval = tokio::time::interval(Duration::from_secs(secs));
    interval.tick().await;

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Shutdown requested");
                break;
            }
            _ = interval.tick() => {
                if let Err(e) = reload(&args.snapshot, &cache) {
                    warn!("Failed to reload snapshot, keeping previous state: {}", e);
                    continue;
                }
                if let Err(e) = resolve_and_print(&source).await {
                    error!("Resolution failed: {}", e);
                }
            }
        }
    }

    info!("hostnet-dns shutdown complete");
    Ok(())
}
