//! Discovery Orchestrator binary: runs the three-tier discovery cycle on a timer.

use std::sync::Arc;

use ipguard_bus::BusClient;
use ipguard_discovery::{orchestrator::CycleContext, run_cycle, DiscoveryConfig};
use ipguard_platform::InMemoryPlatformClient;
use ipguard_store::{ChannelRepository, FirestoreClient, KeywordRepository, QuotaRepository, StoreConfig, VideoRepository};
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(fmt::layer().json())
        .with(EnvFilter::from_default_env().add_directive("ipguard=info".parse().unwrap()))
        .init();

    info!("starting discovery-orchestrator");

    let discovery_config = match DiscoveryConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            error!(error = %e, "invalid discovery configuration");
            std::process::exit(1);
        }
    };

    let store_config = match StoreConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            error!(error = %e, "invalid store configuration");
            std::process::exit(1);
        }
    };

    let catalog = match ipguard_discovery::ip_catalog::load_from_path(&discovery_config.ip_catalog_path) {
        Ok(c) => c,
        Err(e) => {
            error!(error = %e, "failed to load IP catalog");
            std::process::exit(1);
        }
    };

    let firestore = match FirestoreClient::new(store_config.gcp_project_id.clone(), store_config.firestore_database_id.clone()).await {
        Ok(c) => c,
        Err(e) => {
            error!(error = %e, "failed to initialize Firestore client");
            std::process::exit(1);
        }
    };

    let redis_url = std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://127.0.0.1:6379".to_string());
    let bus = match BusClient::connect(&redis_url).await {
        Ok(b) => b,
        Err(e) => {
            error!(error = %e, "failed to connect to bus");
            std::process::exit(1);
        }
    };

    // The concrete video-platform integration is a caller-supplied collaborator; deployments
    // wire a real `PlatformClient` here. The in-memory fixture keeps this binary runnable
    // standalone and is seeded empty, so the orchestrator will simply process zero videos
    // per cycle until a real client is plugged in.
    let platform = InMemoryPlatformClient::new(vec![]);

    let quota = QuotaRepository::named(&firestore, "discovery", discovery_config.daily_quota);
    let videos = VideoRepository::new(&firestore);
    let channels = ChannelRepository::new(&firestore);
    let keywords = KeywordRepository::new(&firestore);
    let keyword_registry = ipguard_discovery::KeywordRegistry::new(&keywords);
    let channel_registry = ipguard_discovery::ChannelRegistry::new(&channels);

    let shutdown = Arc::new(tokio::sync::Notify::new());
    let shutdown_signal = shutdown.clone();
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        info!("received shutdown signal");
        shutdown_signal.notify_one();
    });

    let mut ticker = tokio::time::interval(discovery_config.discovery_interval);
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let ctx = CycleContext {
                    catalog: &catalog,
                    quota: &quota,
                    videos: &videos,
                    channels: &channels,
                    keyword_registry: &keyword_registry,
                    channel_registry: &channel_registry,
                    bus: &bus,
                    platform: &platform,
                    config: &discovery_config,
                };
                match tokio::time::timeout(discovery_config.cycle_deadline, run_cycle(&ctx)).await {
                    Ok(Ok(report)) => info!(?report, "cycle finished"),
                    Ok(Err(e)) => error!(error = %e, "cycle failed"),
                    Err(_) => error!("cycle deadline exceeded, letting in-flight work finish on its own"),
                }
            }
            _ = shutdown.notified() => {
                info!("shutting down discovery-orchestrator");
                break;
            }
        }
    }
}
